//! harmony - Harmony exercise task store
//!
//! This library backs the `harmony` CLI: a validated data model for
//! harmony exercise tasks, a storage-agnostic repository keeping the whole
//! collection in a single JSON envelope, and a small client for the remote
//! task service.
//!
//! # Core Concepts
//!
//! - **Tasks**: a musical score, a description, and one or more answers,
//!   with optional title, difficulty and tags
//! - **Validation**: every record is checked on save and on load, so
//!   corrupted storage never reaches callers
//! - **Envelope**: the persisted blob holds the task collection plus a
//!   metadata header (version, last update, record count)
//! - **Blob store**: the repository talks to storage through a two-method
//!   capability, so the backing medium is swappable
//!
//! # Module Organization
//!
//! - `api`: read-only client for the remote task service
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `harmony.toml`
//! - `error`: error types and result aliases
//! - `model`: the `HarmonyTask` data model and its validator
//! - `output`: shared CLI output formatting
//! - `repository`: the task persistence contract and its JSON implementation
//! - `store`: blob store capability backing the repository

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod repository;
pub mod store;

pub use error::{Error, Result};
