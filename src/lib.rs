//! # InduDocs
//!
//! Role-scoped distribution of industrial safety and work documents across
//! sites, with an assistant for search, chat and account recovery.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌────────────────┐
//! │  CLI         │──▶│  App controller  │──▶│  JSON KV store │
//! │ (indudocs)   │   │  filter/mutate   │   │  5 fixed keys  │
//! └──────────────┘   └────────┬─────────┘   └────────────────┘
//!                             ▼
//!                    ┌──────────────────┐
//!                    │ TextCompletion   │
//!                    │ Gemini/disabled  │
//!                    └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! indudocs init                                   # seed the store
//! indudocs login admin@indudocs.com --password admin
//! indudocs docs --query acetona
//! indudocs ask "guantes para químicos"
//! indudocs chat
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`file_store`] | JSON-file key-value backend |
//! | [`completion`] | Text-completion backends (Gemini, disabled) |
//! | [`app`] | Application controller and role gating |
//! | [`browse`] | `docs`, `whoami`, `lang` commands |
//! | [`admin`] | `site`, `user`, `doc` commands |
//! | [`auth`] | `login`, `logout`, `recover` commands |
//! | [`assist`] | `ask`, `explain`, `chat` commands |
//!
//! Domain types and pure logic live in the `indudocs_core` crate.

pub mod admin;
pub mod app;
pub mod assist;
pub mod auth;
pub mod browse;
pub mod completion;
pub mod config;
pub mod file_store;
