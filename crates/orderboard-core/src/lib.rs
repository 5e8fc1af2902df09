pub mod board;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod date;
pub mod error;
pub mod export;
pub mod fetch;
pub mod fields;
pub mod filter;
pub mod io;
pub mod pipeline;
pub mod types;

pub use error::{BoardError, Result};
