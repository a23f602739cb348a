pub mod capture_context;
pub mod controller;
