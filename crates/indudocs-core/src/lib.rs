//! # InduDocs Core
//!
//! Shared logic for InduDocs: data models, the access-scoped document
//! filter, CRUD mutators, the session state machine, the recovery flow and
//! the assistant call sites built on the [`assistant::TextCompletion`]
//! trait.
//!
//! This crate contains no tokio, filesystem I/O or HTTP client. Storage is
//! reached through the [`store::KeyValueStore`] trait and text generation
//! through [`assistant::TextCompletion`], so every piece can be exercised
//! with in-memory stand-ins.

pub mod assistant;
pub mod filter;
pub mod models;
pub mod mutate;
pub mod recovery;
pub mod seed;
pub mod session;
pub mod store;
