// src/ui/widgets/mod.rs

pub mod disclaimer_popup;
pub mod domain_table;
pub mod footer;
pub mod input;
pub mod log_view;
pub mod summary;
