// src/core/mod.rs

// The engine: everything that decides what a domain's state is. It talks to
// the outside world only through the traits in `ports`.

/// Data structures shared across the engine and its collaborators,
/// such as `DomainState`, `Snapshot` and `Badge`.
pub mod models;

pub mod error;

/// Host extraction and second-level-domain rules.
pub mod domain;

/// Interfaces to the browser, storage, cookies, HTTP, notifications and UI.
pub mod ports;

pub mod store;
pub mod propagation;
pub mod ui_sync;
pub mod controller;

/// Reading the scanning service's responses.
pub mod verdict;

pub mod dispatcher;
pub mod engine;

pub use error::{Error, Result};
