use uuid::Uuid;

use super::types::SqlParam;

/// Accumulates AND-ed WHERE conditions with positional `$n` placeholders.
pub struct FilterWhere {
    conditions: Vec<String>,
    params: Vec<SqlParam>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self {
            conditions: vec![],
            params: vec![],
        }
    }

    fn next_placeholder(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    pub fn owner(&mut self, owner_id: Uuid) -> &mut Self {
        let p = self.next_placeholder(SqlParam::Uuid(owner_id));
        self.conditions.push(format!("\"owner_id\" = {}", p));
        self
    }

    pub fn completed(&mut self, is_completed: bool) -> &mut Self {
        let p = self.next_placeholder(SqlParam::Bool(is_completed));
        self.conditions.push(format!("\"is_completed\" = {}", p));
        self
    }

    /// Case-insensitive literal substring match on the title
    pub fn title_contains(&mut self, needle: &str) -> &mut Self {
        let pattern = format!("%{}%", escape_like(needle));
        let p = self.next_placeholder(SqlParam::Text(pattern));
        self.conditions.push(format!("\"title\" ILIKE {} ESCAPE '\\'", p));
        self
    }

    /// Placeholder index the next parameter will get
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }

    pub fn finish(self) -> (String, Vec<SqlParam>) {
        let clause = if self.conditions.is_empty() {
            "1=1".to_string()
        } else {
            self.conditions.join(" AND ")
        };
        (clause, self.params)
    }
}

impl Default for FilterWhere {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape LIKE metacharacters so user input matches literally
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
