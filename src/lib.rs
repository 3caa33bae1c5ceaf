pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod utils;

pub use app::{execute, run};
