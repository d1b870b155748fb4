pub mod capture;
pub mod config;
pub mod error;
pub mod execution;
pub mod guide;
pub mod queue;
pub mod recording;
