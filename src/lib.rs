//! Store visit image processing service
//!
//! Accepts batches of store visits, measures every referenced image in the
//! background and lets callers poll each job for its outcome.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
