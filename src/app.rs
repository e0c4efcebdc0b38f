//! Application controller.
//!
//! [`App`] owns the loaded [`AppState`] and the [`StateStore`] it came
//! from. Every accepted transition is computed by a pure function from
//! `indudocs_core`, swapped into the state, and then the affected slice is
//! saved in full. Rejected transitions leave both state and storage
//! untouched.
//!
//! Role gating lives here: browsing needs an authenticated session, and
//! site, user and document edits need an administrator.

use anyhow::Result;
use chrono::NaiveDate;

use indudocs_core::assistant::{self, ChatSession, TextCompletion};
use indudocs_core::filter::{visible_documents, DocumentFilter};
use indudocs_core::models::{Document, Language, Role, Site, User};
use indudocs_core::mutate::{self, DocumentPatch, IdGenerator, SitePatch, UserPatch, UuidIds};
use indudocs_core::recovery::{self, RecoveryNotice};
use indudocs_core::session::{self, Session};
use indudocs_core::store::{
    AppState, KeyValueStore, StateStore, DOCUMENTS_KEY, SESSION_KEY, SITES_KEY, USERS_KEY,
};

/// Controller-level rejections.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AppError {
    #[error("not logged in")]
    NotAuthenticated,
    #[error("this action requires an administrator")]
    Forbidden,
    #[error("document not found: {0}")]
    DocumentNotFound(String),
}

/// Source of "today" for document timestamps.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Label shown for a document whose site no longer exists.
pub const NO_SITE_LABEL: &str = "Sin Centro";
/// Label shown for a user without a (resolvable) site.
pub const GLOBAL_SITE_LABEL: &str = "Global";

pub struct App<S: KeyValueStore> {
    store: StateStore<S>,
    state: AppState,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore> App<S> {
    /// Loads every slice from `backend`. Corrupt stored data is an error.
    pub fn load(backend: S) -> Result<Self> {
        let store = StateStore::new(backend);
        let state = store.load_state()?;
        Ok(Self {
            store,
            state,
            ids: Box::new(UuidIds),
            clock: Box::new(LocalClock),
        })
    }

    pub fn with_ids(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    pub fn session(&self) -> &Session {
        &self.state.session
    }

    pub fn language(&self) -> Language {
        self.state.language
    }

    /// Replaces every slice with the seed dataset.
    pub fn reset(&mut self) -> Result<()> {
        self.state = AppState::seeded();
        self.store.save_state(&self.state)?;
        tracing::info!("store reset to seed dataset");
        Ok(())
    }

    /// Writes every slice as currently loaded (used by `init`).
    pub fn persist_all(&self) -> Result<()> {
        self.store.save_state(&self.state)?;
        Ok(())
    }

    // ── Session ──────────────────────────────────────────────────────

    pub fn actor(&self) -> Result<&User> {
        self.state
            .session
            .actor()
            .ok_or_else(|| AppError::NotAuthenticated.into())
    }

    fn require_admin(&self) -> Result<&User> {
        let actor = self.actor()?;
        match actor.role {
            Role::Admin => Ok(actor),
            Role::Operario => Err(AppError::Forbidden.into()),
        }
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<&User> {
        let session = session::login(&self.state.users, email, password)?;
        self.state.session = session;
        self.store.save(SESSION_KEY, &self.state.session)?;
        let actor = self.actor()?;
        tracing::info!(user = %actor.id, role = %actor.role, "logged in");
        Ok(actor)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.state.session = session::logout();
        self.store.save(SESSION_KEY, &self.state.session)?;
        tracing::info!("logged out");
        Ok(())
    }

    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.state.language = language;
        self.store.save_language(language)?;
        Ok(())
    }

    // ── Browsing ─────────────────────────────────────────────────────

    pub fn visible_documents(&self, filter: &DocumentFilter) -> Result<Vec<&Document>> {
        let actor = self.actor()?;
        Ok(visible_documents(&self.state.documents, actor, filter))
    }

    pub fn find_site(&self, id: &str) -> Option<&Site> {
        self.state.sites.iter().find(|s| s.id == id)
    }

    /// Site name for a document, or [`NO_SITE_LABEL`] when dangling.
    pub fn document_site_label(&self, doc: &Document) -> &str {
        self.find_site(&doc.site_id)
            .map(|s| s.name.as_str())
            .unwrap_or(NO_SITE_LABEL)
    }

    /// Site name for a user, or [`GLOBAL_SITE_LABEL`].
    pub fn user_site_label(&self, user: &User) -> &str {
        user.site_affinity
            .as_deref()
            .and_then(|id| self.find_site(id))
            .map(|s| s.name.as_str())
            .unwrap_or(GLOBAL_SITE_LABEL)
    }

    // ── Administration ───────────────────────────────────────────────

    pub fn sites(&self) -> Result<&[Site]> {
        self.require_admin()?;
        Ok(&self.state.sites)
    }

    pub fn users(&self) -> Result<&[User]> {
        self.require_admin()?;
        Ok(&self.state.users)
    }

    /// Creates (`editing = None`) or updates a site. Returns its id.
    pub fn save_site(&mut self, patch: SitePatch, editing: Option<&str>) -> Result<String> {
        self.require_admin()?;
        let sites = mutate::save_site(&self.state.sites, patch, editing, self.ids.as_ref())?;
        let id = saved_id(editing, sites.last().map(|s| s.id.as_str()));
        self.state.sites = sites;
        self.store.save(SITES_KEY, &self.state.sites)?;
        tracing::info!(site = %id, created = editing.is_none(), "site saved");
        Ok(id)
    }

    pub fn delete_site(&mut self, id: &str) -> Result<bool> {
        self.require_admin()?;
        let before = self.state.sites.len();
        self.state.sites = mutate::delete_site(&self.state.sites, id);
        self.store.save(SITES_KEY, &self.state.sites)?;
        let removed = self.state.sites.len() != before;
        tracing::info!(site = %id, removed, "site delete");
        Ok(removed)
    }

    pub fn save_user(&mut self, patch: UserPatch, editing: Option<&str>) -> Result<String> {
        self.require_admin()?;
        let users = mutate::save_user(&self.state.users, patch, editing, self.ids.as_ref())?;
        let id = saved_id(editing, users.last().map(|u| u.id.as_str()));
        self.state.users = users;
        self.store.save(USERS_KEY, &self.state.users)?;
        tracing::info!(user = %id, created = editing.is_none(), "user saved");
        Ok(id)
    }

    pub fn delete_user(&mut self, id: &str) -> Result<bool> {
        self.require_admin()?;
        let before = self.state.users.len();
        self.state.users = mutate::delete_user(&self.state.users, id);
        self.store.save(USERS_KEY, &self.state.users)?;
        let removed = self.state.users.len() != before;
        tracing::info!(user = %id, removed, "user delete");
        Ok(removed)
    }

    pub fn save_document(&mut self, patch: DocumentPatch, editing: Option<&str>) -> Result<String> {
        self.require_admin()?;
        let docs = mutate::save_document(
            &self.state.documents,
            patch,
            editing,
            self.ids.as_ref(),
            self.clock.today(),
        )?;
        let id = saved_id(editing, docs.last().map(|d| d.id.as_str()));
        self.state.documents = docs;
        self.store.save(DOCUMENTS_KEY, &self.state.documents)?;
        tracing::info!(doc = %id, created = editing.is_none(), "document saved");
        Ok(id)
    }

    pub fn delete_document(&mut self, id: &str) -> Result<bool> {
        self.require_admin()?;
        let before = self.state.documents.len();
        self.state.documents = mutate::delete_document(&self.state.documents, id);
        self.store.save(DOCUMENTS_KEY, &self.state.documents)?;
        let removed = self.state.documents.len() != before;
        tracing::info!(doc = %id, removed, "document delete");
        Ok(removed)
    }

    // ── Assistant ────────────────────────────────────────────────────

    /// Works without a session.
    pub async fn recover(&self, email: &str, backend: &dyn TextCompletion) -> Result<RecoveryNotice> {
        Ok(recovery::recover(&self.state.users, email, backend, self.state.language).await?)
    }

    /// Ranked-search summary over the documents visible under `filter`.
    pub async fn ask(
        &self,
        filter: &DocumentFilter,
        backend: &dyn TextCompletion,
    ) -> Result<Option<String>> {
        let docs = self.visible_documents(filter)?;
        Ok(assistant::search_summary(backend, &filter.query, &docs, self.state.language).await)
    }

    /// Explains a document the actor can see.
    pub async fn explain(&self, id: &str, backend: &dyn TextCompletion) -> Result<String> {
        let docs = self.visible_documents(&DocumentFilter::default())?;
        let doc = docs
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| AppError::DocumentNotFound(id.to_string()))?;
        Ok(assistant::explain_document(backend, doc, self.state.language).await)
    }

    /// Chat seeded with the documents visible under `filter`.
    pub fn start_chat(&self, filter: &DocumentFilter) -> Result<ChatSession> {
        let docs = self.visible_documents(filter)?;
        Ok(ChatSession::new(&docs, self.state.language))
    }
}

fn saved_id(editing: Option<&str>, appended: Option<&str>) -> String {
    editing.or(appended).unwrap_or_default().to_string()
}

/// Opens the JSON store named by the configuration and loads the app.
pub fn open(config: &crate::config::Config) -> Result<App<crate::file_store::JsonFileStore>> {
    let backend = crate::file_store::JsonFileStore::open(&config.store.path)?;
    App::load(backend).map_err(|e| {
        e.context(format!(
            "Failed to load state from {}. Run `indudocs reset` to restore the seed dataset.",
            config.store.path.display()
        ))
    })
}

/// Writes the seed dataset unless the store file already exists.
/// Returns whether anything was written.
pub fn init_store(config: &crate::config::Config) -> Result<bool> {
    let app = open(config)?;
    if app.store().backend().exists() {
        return Ok(false);
    }
    app.persist_all()?;
    tracing::info!(path = %config.store.path.display(), "store initialized");
    Ok(true)
}

/// Replaces the store file with the seed dataset without reading it, so a
/// corrupt store can be recovered.
pub fn reset_store(config: &crate::config::Config) -> Result<()> {
    let backend = crate::file_store::JsonFileStore::discard(&config.store.path);
    let mut app = App::load(backend)?;
    app.reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indudocs_core::assistant::{ChatTurn, CompletionRequest};
    use indudocs_core::mutate::SequentialIds;
    use indudocs_core::store::memory::InMemoryStore;

    struct FixedClock;

    impl Clock for FixedClock {
        fn today(&self) -> NaiveDate {
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        }
    }

    struct Down;

    #[async_trait::async_trait]
    impl TextCompletion for Down {
        fn name(&self) -> &str {
            "down"
        }
        async fn complete(&self, _r: &CompletionRequest) -> Result<String> {
            anyhow::bail!("offline")
        }
        async fn chat(&self, _s: &str, _h: &[ChatTurn]) -> Result<String> {
            anyhow::bail!("offline")
        }
    }

    fn app() -> App<InMemoryStore> {
        App::load(InMemoryStore::new())
            .unwrap()
            .with_ids(Box::new(SequentialIds::starting_at(10)))
            .with_clock(Box::new(FixedClock))
    }

    fn err_kind(e: anyhow::Error) -> AppError {
        e.downcast::<AppError>().unwrap()
    }

    #[test]
    fn test_browsing_requires_session() {
        let app = app();
        let e = app.visible_documents(&DocumentFilter::default()).unwrap_err();
        assert_eq!(err_kind(e), AppError::NotAuthenticated);
    }

    #[test]
    fn test_operator_cannot_administer() {
        let mut app = app();
        app.login("juan@indudocs.com", "user123").unwrap();
        let e = app.save_site(SitePatch::default(), None).unwrap_err();
        assert_eq!(err_kind(e), AppError::Forbidden);
        assert!(app.users().is_err());
        assert_eq!(app.state().sites.len(), 2);
    }

    #[test]
    fn test_admin_document_lifecycle_persists() {
        let mut app = app();
        app.login("admin@indudocs.com", "admin").unwrap();
        let id = app
            .save_document(
                DocumentPatch {
                    title: Some("Guantes nitrilo".into()),
                    doc_type: Some(indudocs_core::models::DocType::SafetySheet),
                    category: Some("EPI".into()),
                    external_url: Some("https://example.com/g.pdf".into()),
                    description: None,
                    site_id: Some("c2".into()),
                },
                None,
            )
            .unwrap();
        assert_eq!(id, "d11");

        let stored: Vec<Document> = app.store().load(DOCUMENTS_KEY, Vec::new).unwrap();
        let doc = stored.iter().find(|d| d.id == "d11").unwrap();
        assert_eq!(doc.last_updated, FixedClock.today());

        assert!(app.delete_document("d11").unwrap());
        assert!(!app.delete_document("d11").unwrap());
    }

    #[test]
    fn test_dangling_site_labels() {
        let mut app = app();
        app.login("admin@indudocs.com", "admin").unwrap();
        assert!(app.delete_site("c1").unwrap());

        let d1 = app.state().documents.iter().find(|d| d.id == "d1").unwrap().clone();
        assert_eq!(app.document_site_label(&d1), NO_SITE_LABEL);
        let juan = app.state().users.iter().find(|u| u.id == "2").unwrap().clone();
        assert_eq!(app.user_site_label(&juan), GLOBAL_SITE_LABEL);
    }

    #[tokio::test]
    async fn test_explain_hidden_document_is_not_found() {
        let mut app = app();
        app.login("juan@indudocs.com", "user123").unwrap();
        let e = app.explain("d3", &Down).await.unwrap_err();
        assert_eq!(err_kind(e), AppError::DocumentNotFound("d3".into()));
        assert_eq!(app.explain("d1", &Down).await.unwrap(), "Error.");
    }

    #[tokio::test]
    async fn test_recover_without_session_falls_back() {
        let app = app();
        let notice = app.recover("ADMIN@indudocs.com", &Down).await.unwrap();
        assert!(notice.used_fallback);
        assert!(notice.message.contains("admin@indudocs.com"));
    }
}
