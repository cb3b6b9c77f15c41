pub mod error;
pub mod row;
