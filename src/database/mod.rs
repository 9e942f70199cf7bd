pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use manager::{DatabaseManager, DatabaseError};
pub use memory::MemoryTodoStore;
pub use models::{Todo, TodoStats};
pub use repository::TodoRepository;
pub use store::TodoStore;
