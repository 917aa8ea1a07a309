pub mod engine;
pub mod error;
pub mod outcome;
pub mod snapshot;
