pub mod filter;
pub mod types;
pub mod update;

pub use filter::RangeFilter;
pub use types::{ColumnMap, QueryFragment};
pub use update::PartialUpdate;
