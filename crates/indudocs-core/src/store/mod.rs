//! Persistent store adapter.
//!
//! The [`KeyValueStore`] trait is the raw string key-value backend. On top
//! of it, [`StateStore`] reads and writes the five application slices under
//! fixed keys, falling back to the built-in seed dataset for any slice that
//! has never been written.
//!
//! | Slice     | Key                | Encoding          |
//! |-----------|--------------------|-------------------|
//! | sites     | `indudocs_centers` | JSON array        |
//! | users     | `indudocs_users`   | JSON array        |
//! | documents | `indudocs_docs`    | JSON array        |
//! | session   | `indudocs_auth`    | JSON object       |
//! | language  | `indudocs_lang`    | raw language code |
//!
//! Writes are synchronous and always rewrite the whole slice.

pub mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Document, Language, Site, User};
use crate::seed;
use crate::session::Session;

pub const SITES_KEY: &str = "indudocs_centers";
pub const USERS_KEY: &str = "indudocs_users";
pub const DOCUMENTS_KEY: &str = "indudocs_docs";
pub const SESSION_KEY: &str = "indudocs_auth";
pub const LANGUAGE_KEY: &str = "indudocs_lang";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The stored value under `key` could not be decoded.
    #[error("stored value for '{key}' is corrupt: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode value for '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Raw string key-value backend.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// The complete application state as loaded from storage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub sites: Vec<Site>,
    pub users: Vec<User>,
    pub documents: Vec<Document>,
    pub session: Session,
    pub language: Language,
}

impl AppState {
    /// The built-in dataset with an anonymous session and default language.
    pub fn seeded() -> Self {
        Self {
            sites: seed::sites(),
            users: seed::users(),
            documents: seed::documents(),
            session: Session::Anonymous,
            language: Language::default(),
        }
    }
}

/// Typed adapter over a [`KeyValueStore`].
pub struct StateStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> StateStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Loads a JSON slice, returning `default()` when nothing is stored.
    pub fn load<T, F>(&self, key: &'static str, default: F) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.backend.get(key)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt { key, source })
            }
            None => {
                tracing::debug!(key, "no stored value, using seed default");
                Ok(default())
            }
        }
    }

    /// Serializes `value` and replaces whatever is stored under `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })?;
        self.backend.set(key, &raw)?;
        tracing::debug!(key, bytes = raw.len(), "saved slice");
        Ok(())
    }

    /// The language is stored as a raw code. Unknown codes fall back to the
    /// default language.
    pub fn load_language(&self) -> Result<Language, StoreError> {
        Ok(self
            .backend
            .get(LANGUAGE_KEY)?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default())
    }

    pub fn save_language(&self, language: Language) -> Result<(), StoreError> {
        self.backend.set(LANGUAGE_KEY, language.code())?;
        Ok(())
    }

    /// Loads every slice. Any corrupt slice aborts the load.
    pub fn load_state(&self) -> Result<AppState, StoreError> {
        Ok(AppState {
            sites: self.load(SITES_KEY, seed::sites)?,
            users: self.load(USERS_KEY, seed::users)?,
            documents: self.load(DOCUMENTS_KEY, seed::documents)?,
            session: self.load(SESSION_KEY, Session::default)?,
            language: self.load_language()?,
        })
    }

    /// Writes every slice.
    pub fn save_state(&self, state: &AppState) -> Result<(), StoreError> {
        self.save(SITES_KEY, &state.sites)?;
        self.save(USERS_KEY, &state.users)?;
        self.save(DOCUMENTS_KEY, &state.documents)?;
        self.save(SESSION_KEY, &state.session)?;
        self.save_language(state.language)
    }
}
