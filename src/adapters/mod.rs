// src/adapters/mod.rs

// Concrete collaborators for the engine's ports: files on disk, reqwest,
// and the shared state the terminal front end renders from.

pub mod browser;
pub mod cookies;
pub mod http;
pub mod storage;
