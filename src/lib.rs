//! MISP IOC retrieval and normalization service
//!
//! Queries a MISP instance for recent indicators of compromise, projects the
//! loosely-typed attribute records onto a stable output schema, and exposes
//! the result through a small HTTP tool surface.

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod summary;
