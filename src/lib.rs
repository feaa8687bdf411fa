pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod roster;
pub mod service;
pub mod source;
