pub mod cache;
pub mod cli;
pub mod config;
pub mod log;
