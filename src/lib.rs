pub mod config;
mod error;
pub mod models;
pub mod order_service;
pub mod routes;
pub mod storage;
pub mod utils;

pub use error::{AppError, Result};
