//! Buildboard - local-first backend for a CI build results dashboard.
//!
//! The pipeline API is polled in the background and its snapshots cached in
//! SQLite; the frontend reads cached listings through the command layer and
//! derives everything it renders (percentages, severity bands, filtered
//! trees) through the pure view-model layer in [`dashboard`].

pub mod commands;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::ApiConfig;
pub use error::AppError;
