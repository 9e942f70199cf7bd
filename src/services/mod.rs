pub mod todo_service;
pub mod validation;

pub use todo_service::{TodoError, TodoService};
pub use validation::{validate_create, validate_update, NewTodo, TodoPatch, ValidationErrors};
