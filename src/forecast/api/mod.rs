// src/forecast/api/mod.rs
pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;

pub use auth::{AuthContext, AuthError};
pub use client::ForecastApi;
pub use error::ApiError;
