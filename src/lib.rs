pub mod app;
pub mod config;
pub mod config_io;
pub mod model;
pub mod primitives;
pub mod services;
pub mod view;
