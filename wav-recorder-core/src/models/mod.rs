pub mod config;
pub mod error;
pub mod message;
pub mod recording_result;
pub mod state;
