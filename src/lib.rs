pub mod app;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod interface;
pub mod logging;
pub mod model;
pub mod session;
