pub mod actions;
pub mod client;
pub mod config;
pub mod gateway;
