pub mod types;
pub mod filter;
pub mod filter_where;

pub use types::*;
pub use filter::TodoFilter;
