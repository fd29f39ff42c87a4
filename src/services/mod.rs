pub mod terminal;
pub mod tracing_setup;
