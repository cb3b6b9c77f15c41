pub mod assembler;
pub mod context;
pub mod control;
pub mod executor;
pub mod integrity;
pub mod performance;
