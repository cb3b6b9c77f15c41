pub mod adapter;
pub mod checksum;
pub mod error;
pub mod executor;
pub mod provider;
pub mod sql;
