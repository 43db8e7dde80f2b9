//! Process wiring for the health recorder binary

pub mod api;
pub mod config;
