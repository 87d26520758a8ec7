pub mod analytics;
pub mod api;
pub mod channel;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod orderbook;
