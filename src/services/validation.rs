// services/validation.rs - request body validation for todo create/update
//
// Each operation has one explicit function that takes the raw JSON body and
// returns either a typed input or every field-level problem found.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::database::models::Todo;

pub const TITLE_MAX_CHARS: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// One or more invalid fields, in the order they were checked
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", headline(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first problem found, used as the headline message
    pub fn message(&self) -> &str {
        headline(&self.errors)
    }

    pub fn field_errors(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for e in &self.errors {
            map.entry(e.field.clone()).or_insert_with(|| e.message.clone());
        }
        map
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn headline(errors: &[FieldError]) -> &str {
    errors
        .first()
        .map(|e| e.message.as_str())
        .unwrap_or("Validation failed")
}

/// Validated input for a new todo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub is_completed: bool,
}

/// Fields present in an update request. Absent fields stay untouched;
/// identity and creation time are not representable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

impl TodoPatch {
    /// Merge into `todo` and bump `updated_at`
    pub fn apply(&self, todo: &mut Todo, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(description) = &self.description {
            todo.description = description.clone();
        }
        if let Some(is_completed) = self.is_completed {
            todo.is_completed = is_completed;
        }
        todo.updated_at = now;
    }
}

/// Validate a create body: `{title, description?, isCompleted?}`.
/// Unknown keys (e.g. `ownerId`) are ignored.
pub fn validate_create(body: &Value) -> Result<NewTodo, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(obj) = as_object(body, &mut errors) else {
        return Err(errors);
    };

    let title = match obj.get("title") {
        None => {
            errors.add("title", "\"title\" is required");
            None
        }
        Some(v) => check_title(v, &mut errors),
    };
    let description = check_description(obj.get("description"), &mut errors);
    let is_completed = check_is_completed(obj.get("isCompleted"), &mut errors);

    let input = NewTodo {
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        is_completed: is_completed.unwrap_or(false),
    };
    errors.into_result(input)
}

/// Validate an update body; every field optional
pub fn validate_update(body: &Value) -> Result<TodoPatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(obj) = as_object(body, &mut errors) else {
        return Err(errors);
    };

    let patch = TodoPatch {
        title: obj.get("title").and_then(|v| check_title(v, &mut errors)),
        description: check_description(obj.get("description"), &mut errors),
        is_completed: check_is_completed(obj.get("isCompleted"), &mut errors),
    };
    errors.into_result(patch)
}

fn as_object<'a>(body: &'a Value, errors: &mut ValidationErrors) -> Option<&'a Map<String, Value>> {
    match body {
        Value::Object(obj) => Some(obj),
        _ => {
            errors.add("body", "\"value\" must be of type object");
            None
        }
    }
}

/// Trimmed title, 1..=150 chars
fn check_title(value: &Value, errors: &mut ValidationErrors) -> Option<String> {
    let Value::String(raw) = value else {
        errors.add("title", "\"title\" must be a string");
        return None;
    };
    let title = raw.trim();
    if title.is_empty() {
        errors.add("title", "\"title\" is not allowed to be empty");
        return None;
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        errors.add(
            "title",
            format!("\"title\" length must be less than or equal to {} characters long", TITLE_MAX_CHARS),
        );
        return None;
    }
    Some(title.to_string())
}

/// String, empty string or null; null normalizes to ""
fn check_description(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<String> {
    match value? {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        _ => {
            errors.add("description", "\"description\" must be a string");
            None
        }
    }
}

fn check_is_completed(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        _ => {
            errors.add("isCompleted", "\"isCompleted\" must be a boolean");
            None
        }
    }
}
