pub mod data_type;
pub mod digest;
pub mod value;
