pub mod alerts;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod geo;
pub mod model;
pub mod sources;
