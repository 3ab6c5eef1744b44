//! Transcript-to-action-item extraction service.
//!
//! A transcript goes through the processor (LLM extraction with a
//! deterministic line-marker fallback) and lands in the session store:
//! an ephemeral bounded local history, or a SQLite-backed workspace once
//! one is selected. The axum API under `/api` exposes processing, the
//! local-to-workspace save saga, and item/transcript/workspace CRUD.

pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod extract;
pub mod models;
pub mod store;
