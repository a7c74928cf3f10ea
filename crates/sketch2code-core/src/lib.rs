//! Core types, config, and errors for Sketch2Code.

pub mod config;
pub mod error;
pub mod types;
