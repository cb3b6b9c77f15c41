pub mod error;
pub mod metrics;
pub mod pool;
pub mod retry;
pub mod state;
pub mod stats;
