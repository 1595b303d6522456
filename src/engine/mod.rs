//! Core engine modules for TaskFi.

pub mod auth;
pub mod config;
pub mod db;
pub mod ingest;
pub mod record;
pub mod repo;
pub mod source;
pub mod state;
pub mod types;
