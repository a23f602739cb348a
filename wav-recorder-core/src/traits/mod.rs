pub mod capture_processor;
pub mod recorder_delegate;
