pub mod todo;

pub use todo::{Todo, TodoStats};
