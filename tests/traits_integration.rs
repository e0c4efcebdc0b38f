//! Integration tests for the pluggable seams.
//!
//! These drive [`App`] end-to-end with a custom `TextCompletion` backend,
//! a custom key-value backend and deterministic ids and dates.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use indudocs::app::{App, Clock};
use indudocs_core::assistant::{ChatTurn, CompletionRequest, TextCompletion};
use indudocs_core::filter::{DocumentFilter, Selection};
use indudocs_core::models::{DocType, Language, Role};
use indudocs_core::mutate::{SequentialIds, UserPatch};
use indudocs_core::store::memory::InMemoryStore;
use indudocs_core::store::{KeyValueStore, LANGUAGE_KEY, SESSION_KEY};
use indudocs::file_store::JsonFileStore;
use std::sync::Mutex;
use tempfile::TempDir;

// ─── Test Backend ───────────────────────────────────────────────────

/// Records every prompt and answers with a canned reply.
#[derive(Default)]
struct ScriptedBackend {
    prompts: Mutex<Vec<String>>,
    systems: Mutex<Vec<String>>,
}

#[async_trait]
impl TextCompletion for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        Ok(format!("[{}] Recomendado: d2", request.language))
    }

    async fn chat(&self, system_instruction: &str, history: &[ChatTurn]) -> Result<String> {
        self.systems.lock().unwrap().push(system_instruction.to_string());
        Ok(format!("{} turns", history.len()))
    }
}

struct FixedClock;

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }
}

fn memory_app() -> App<InMemoryStore> {
    App::load(InMemoryStore::new())
        .unwrap()
        .with_ids(Box::new(SequentialIds::starting_at(100)))
        .with_clock(Box::new(FixedClock))
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ask_sends_visible_catalog_only() {
    let mut app = memory_app();
    app.login("juan@indudocs.com", "user123").unwrap();
    app.set_language(Language::Fr).unwrap();

    let backend = ScriptedBackend::default();
    let summary = app
        .ask(&DocumentFilter::with_query("acetona"), &backend)
        .await
        .unwrap();
    assert_eq!(summary.as_deref(), Some("[fr] Recomendado: d2"));

    let prompts = backend.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("acetona"));
    assert!(!prompts[0].contains("Mazak"));
}

#[tokio::test]
async fn test_ask_only_skips_backend_for_empty_query() {
    let mut app = memory_app();
    app.login("admin@indudocs.com", "admin").unwrap();

    let backend = ScriptedBackend::default();
    let summary = app.ask(&DocumentFilter::with_query(""), &backend).await.unwrap();
    assert_eq!(summary, None);
    assert!(backend.prompts.lock().unwrap().is_empty());

    // Whitespace is not trimmed: it is a real query.
    let summary = app.ask(&DocumentFilter::with_query("   "), &backend).await.unwrap();
    assert_eq!(summary.as_deref(), Some("[es] Recomendado: d2"));
    assert_eq!(backend.prompts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_chat_is_seeded_with_filtered_documents() {
    let mut app = memory_app();
    app.login("admin@indudocs.com", "admin").unwrap();

    let filter = DocumentFilter {
        doc_type: Selection::Only(DocType::MachineManual),
        ..DocumentFilter::default()
    };
    let mut chat = app.start_chat(&filter).unwrap();
    let backend = ScriptedBackend::default();

    assert_eq!(chat.send(&backend, "hola").await.as_deref(), Some("1 turns"));
    assert_eq!(chat.send(&backend, "").await, None);
    assert_eq!(chat.send(&backend, "y el torno?").await.as_deref(), Some("3 turns"));

    let systems = backend.systems.lock().unwrap();
    assert!(systems[0].contains("Mazak"));
    assert!(!systems[0].contains("Acetona"));
}

#[tokio::test]
async fn test_recovery_uses_backend_text() {
    let app = memory_app();
    let backend = ScriptedBackend::default();
    let notice = app.recover("admin@indudocs.com", &backend).await.unwrap();
    assert!(!notice.used_fallback);
    assert_eq!(notice.user_id, "1");
    assert!(backend.prompts.lock().unwrap()[0].contains("Administrador Sistema"));
}

#[test]
fn test_session_and_language_survive_reload() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.json");

    {
        let mut app = App::load(JsonFileStore::open(&path).unwrap()).unwrap();
        app.persist_all().unwrap();
        app.login("admin@indudocs.com", "admin").unwrap();
        app.set_language(Language::Ar).unwrap();
    }

    let store = JsonFileStore::open(&path).unwrap();
    assert_eq!(store.get(LANGUAGE_KEY).unwrap().as_deref(), Some("ar"));
    let auth = store.get(SESSION_KEY).unwrap().unwrap();
    assert!(auth.contains("\"is_authenticated\":true"));

    let app = App::load(store).unwrap();
    assert_eq!(app.language(), Language::Ar);
    assert_eq!(app.actor().unwrap().role, Role::Admin);
}

#[test]
fn test_created_user_can_log_in() {
    let mut app = memory_app();
    app.login("admin@indudocs.com", "admin").unwrap();
    let id = app
        .save_user(
            UserPatch {
                name: Some("Aminata Diop".into()),
                email: Some("aminata@indudocs.com".into()),
                role: Some(Role::Operario),
                password: Some("nave2".into()),
                site_affinity: Some(Some("c2".into())),
            },
            None,
        )
        .unwrap();
    assert_eq!(id, "u101");

    app.logout().unwrap();
    let user = app.login("aminata@indudocs.com", "nave2").unwrap();
    assert_eq!(user.id, "u101");

    let docs = app.visible_documents(&DocumentFilter::default()).unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["d3"]);
}
