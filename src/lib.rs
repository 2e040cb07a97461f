// src/lib.rs

pub mod adapters;
pub mod config;
pub mod core;
pub mod logging;
