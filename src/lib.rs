//! funcloc - function size measurement
//!
//! Measures every function-like symbol in a document in lines of code,
//! classifies it into a low, medium or high tier and keeps the result
//! current while the document is edited.

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod render;
pub mod reporters;
pub mod scheduler;
pub mod server;

pub use error::{FuncLocError, Result};
