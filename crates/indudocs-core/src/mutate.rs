//! CRUD mutators for sites, users and documents.
//!
//! Each mutator is a pure transform
//! `(collection, patch, editing) -> new collection`. When `editing` names an
//! existing record, the present fields of the patch are merged over it;
//! otherwise a new record is built from the patch with a freshly generated
//! identifier and appended. Deletion removes the matching identifier and
//! never cascades into other collections.
//!
//! Document saves (create or update) stamp `last_updated` with the injected
//! `today` date.

use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{DocType, Document, Role, Site, User};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("record not found: {0}")]
    NotFound(String),
}

// ═══════════════════════════════════════════════════════════════════════
// Identifier generation
// ═══════════════════════════════════════════════════════════════════════

/// Source of fresh record identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a new identifier beginning with `prefix`.
    fn next_id(&self, prefix: &str) -> String;
}

/// Random identifiers: `{prefix}-{uuid v4}`.
#[derive(Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, uuid::Uuid::new_v4())
    }
}

/// Monotonic counter identifiers: `{prefix}{n}`, starting after `start`.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}{}", prefix, n)
    }
}

pub const SITE_PREFIX: &str = "c";
pub const USER_PREFIX: &str = "u";
pub const DOCUMENT_PREFIX: &str = "d";

// ═══════════════════════════════════════════════════════════════════════
// Patches
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct SitePatch {
    pub name: Option<String>,
    /// `Some(None)` clears the location.
    pub location: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    /// An empty password on update keeps the stored one.
    pub password: Option<String>,
    /// `Some(None)` clears the affinity.
    pub site_affinity: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub doc_type: Option<DocType>,
    pub category: Option<String>,
    pub external_url: Option<String>,
    pub description: Option<String>,
    pub site_id: Option<String>,
}

fn required<T>(field: Option<T>, name: &'static str) -> Result<T, MutationError> {
    field.ok_or(MutationError::MissingField(name))
}

/// Draws ids from `ids` until one is not already taken in `records`.
fn fresh_id<T>(
    records: &[T],
    id_of: impl Fn(&T) -> &str,
    ids: &dyn IdGenerator,
    prefix: &str,
) -> String {
    loop {
        let id = ids.next_id(prefix);
        if records.iter().all(|r| id_of(r) != id) {
            return id;
        }
        tracing::debug!(%id, "generated id already in use, drawing another");
    }
}

fn merge_into<T, F>(
    records: &[T],
    editing_id: &str,
    id_of: impl Fn(&T) -> &str,
    merge: F,
) -> Result<Vec<T>, MutationError>
where
    T: Clone,
    F: Fn(&T) -> T,
{
    if !records.iter().any(|r| id_of(r) == editing_id) {
        return Err(MutationError::NotFound(editing_id.to_string()));
    }
    Ok(records
        .iter()
        .map(|r| if id_of(r) == editing_id { merge(r) } else { r.clone() })
        .collect())
}

// ═══════════════════════════════════════════════════════════════════════
// Sites
// ═══════════════════════════════════════════════════════════════════════

pub fn save_site(
    sites: &[Site],
    patch: SitePatch,
    editing: Option<&str>,
    ids: &dyn IdGenerator,
) -> Result<Vec<Site>, MutationError> {
    match editing {
        Some(id) => merge_into(sites, id, |s| s.id.as_str(), |existing| Site {
            id: existing.id.clone(),
            name: patch.name.clone().unwrap_or_else(|| existing.name.clone()),
            location: patch
                .location
                .clone()
                .unwrap_or_else(|| existing.location.clone()),
        }),
        None => {
            let site = Site {
                id: fresh_id(sites, |s| s.id.as_str(), ids, SITE_PREFIX),
                name: required(patch.name, "name")?,
                location: patch.location.flatten(),
            };
            let mut out = sites.to_vec();
            out.push(site);
            Ok(out)
        }
    }
}

pub fn delete_site(sites: &[Site], id: &str) -> Vec<Site> {
    sites.iter().filter(|s| s.id != id).cloned().collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Users
// ═══════════════════════════════════════════════════════════════════════

pub fn save_user(
    users: &[User],
    patch: UserPatch,
    editing: Option<&str>,
    ids: &dyn IdGenerator,
) -> Result<Vec<User>, MutationError> {
    match editing {
        Some(id) => merge_into(users, id, |u| u.id.as_str(), |existing| User {
            id: existing.id.clone(),
            name: patch.name.clone().unwrap_or_else(|| existing.name.clone()),
            email: patch.email.clone().unwrap_or_else(|| existing.email.clone()),
            role: patch.role.unwrap_or(existing.role),
            password: patch
                .password
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| existing.password.clone()),
            site_affinity: patch
                .site_affinity
                .clone()
                .unwrap_or_else(|| existing.site_affinity.clone()),
        }),
        None => {
            let user = User {
                id: fresh_id(users, |u| u.id.as_str(), ids, USER_PREFIX),
                name: required(patch.name, "name")?,
                email: required(patch.email, "email")?,
                role: required(patch.role, "role")?,
                password: required(patch.password.filter(|p| !p.is_empty()), "password")?,
                site_affinity: patch.site_affinity.flatten(),
            };
            let mut out = users.to_vec();
            out.push(user);
            Ok(out)
        }
    }
}

pub fn delete_user(users: &[User], id: &str) -> Vec<User> {
    users.iter().filter(|u| u.id != id).cloned().collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Documents
// ═══════════════════════════════════════════════════════════════════════

pub fn save_document(
    docs: &[Document],
    patch: DocumentPatch,
    editing: Option<&str>,
    ids: &dyn IdGenerator,
    today: NaiveDate,
) -> Result<Vec<Document>, MutationError> {
    match editing {
        Some(id) => merge_into(docs, id, |d| d.id.as_str(), |existing| Document {
            id: existing.id.clone(),
            title: patch.title.clone().unwrap_or_else(|| existing.title.clone()),
            doc_type: patch.doc_type.unwrap_or(existing.doc_type),
            category: patch
                .category
                .clone()
                .unwrap_or_else(|| existing.category.clone()),
            external_url: patch
                .external_url
                .clone()
                .unwrap_or_else(|| existing.external_url.clone()),
            description: patch
                .description
                .clone()
                .unwrap_or_else(|| existing.description.clone()),
            last_updated: today,
            site_id: patch
                .site_id
                .clone()
                .unwrap_or_else(|| existing.site_id.clone()),
        }),
        None => {
            let doc = Document {
                id: fresh_id(docs, |d| d.id.as_str(), ids, DOCUMENT_PREFIX),
                title: required(patch.title, "title")?,
                doc_type: required(patch.doc_type, "type")?,
                category: required(patch.category, "category")?,
                external_url: required(patch.external_url, "external_url")?,
                description: patch.description.unwrap_or_default(),
                last_updated: today,
                site_id: required(patch.site_id, "site_id")?,
            };
            let mut out = docs.to_vec();
            out.push(doc);
            Ok(out)
        }
    }
}

pub fn delete_document(docs: &[Document], id: &str) -> Vec<Document> {
    docs.iter().filter(|d| d.id != id).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()
    }

    #[test]
    fn test_document_update_is_partial_merge() {
        let docs = seed::documents();
        let ids = SequentialIds::default();
        let patch = DocumentPatch {
            title: Some("New".to_string()),
            ..DocumentPatch::default()
        };
        let out = save_document(&docs, patch, Some("d1"), &ids, today()).unwrap();

        let before = &docs[0];
        let after = &out[0];
        assert_eq!(after.title, "New");
        assert_eq!(after.last_updated, today());
        let mut expected = before.clone();
        expected.title = "New".to_string();
        expected.last_updated = today();
        assert_eq!(after, &expected);
        assert_eq!(&out[1..], &docs[1..]);
    }

    #[test]
    fn test_document_create_appends_with_fresh_id() {
        let docs = seed::documents();
        let ids = SequentialIds::default();
        let patch = DocumentPatch {
            title: Some("Lejía - FDS".to_string()),
            doc_type: Some(DocType::SafetySheet),
            category: Some("Químicos".to_string()),
            external_url: Some("https://example.com/lejia.pdf".to_string()),
            description: None,
            site_id: Some("c2".to_string()),
        };
        let out = save_document(&docs, patch, None, &ids, today()).unwrap();
        assert_eq!(out.len(), docs.len() + 1);
        assert_eq!(&out[..docs.len()], &docs[..]);

        let created = out.last().unwrap();
        assert!(docs.iter().all(|d| d.id != created.id));
        assert_eq!(created.description, "");
        assert_eq!(created.last_updated, today());
    }

    #[test]
    fn test_create_skips_ids_already_in_seed() {
        // A fresh counter yields d1, d2, d3 first; all taken by the seed.
        let ids = SequentialIds::default();
        let patch = DocumentPatch {
            title: Some("Arnés anticaídas".to_string()),
            doc_type: Some(DocType::WorkInstruction),
            category: Some("Altura".to_string()),
            external_url: Some("https://example.com/arnes.pdf".to_string()),
            description: None,
            site_id: Some("c1".to_string()),
        };
        let docs = save_document(&seed::documents(), patch, None, &ids, today()).unwrap();
        assert_eq!(docs.last().unwrap().id, "d4");

        let sites = save_site(
            &seed::sites(),
            SitePatch {
                name: Some("Almacén Valencia".to_string()),
                location: None,
            },
            None,
            &SequentialIds::default(),
        )
        .unwrap();
        assert_eq!(sites.last().unwrap().id, "c3");

        // Editing d1 touches exactly one record.
        let edited = save_document(
            &docs,
            DocumentPatch {
                title: Some("Renamed".to_string()),
                ..DocumentPatch::default()
            },
            Some("d1"),
            &ids,
            today(),
        )
        .unwrap();
        assert_eq!(edited.iter().filter(|d| d.title == "Renamed").count(), 1);
    }

    #[test]
    fn test_document_create_requires_fields() {
        let ids = SequentialIds::default();
        let patch = DocumentPatch {
            title: Some("Sin sede".to_string()),
            doc_type: Some(DocType::TechSheet),
            category: Some("X".to_string()),
            external_url: Some("https://example.com".to_string()),
            ..DocumentPatch::default()
        };
        let err = save_document(&[], patch, None, &ids, today()).unwrap_err();
        assert_eq!(err, MutationError::MissingField("site_id"));
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let ids = SequentialIds::default();
        let err = save_site(&seed::sites(), SitePatch::default(), Some("nope"), &ids).unwrap_err();
        assert_eq!(err, MutationError::NotFound("nope".to_string()));
    }

    #[test]
    fn test_sequential_ids_never_repeat() {
        let ids = SequentialIds::default();
        let mut sites = Vec::new();
        for i in 0..5 {
            let patch = SitePatch {
                name: Some(format!("Site {}", i)),
                location: None,
            };
            sites = save_site(&sites, patch, None, &ids).unwrap();
        }
        let mut seen: Vec<&str> = sites.iter().map(|s| s.id.as_str()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_uuid_ids_carry_prefix() {
        let ids = UuidIds;
        let a = ids.next_id(DOCUMENT_PREFIX);
        let b = ids.next_id(DOCUMENT_PREFIX);
        assert!(a.starts_with("d-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_site_update_keeps_location_when_absent() {
        let ids = SequentialIds::default();
        let patch = SitePatch {
            name: Some("Planta Sur".to_string()),
            location: None,
        };
        let out = save_site(&seed::sites(), patch, Some("c1"), &ids).unwrap();
        assert_eq!(out[0].name, "Planta Sur");
        assert_eq!(out[0].location.as_deref(), Some("Getafe"));
    }

    #[test]
    fn test_site_update_can_clear_location() {
        let ids = SequentialIds::default();
        let patch = SitePatch {
            location: Some(None),
            ..SitePatch::default()
        };
        let out = save_site(&seed::sites(), patch, Some("c1"), &ids).unwrap();
        assert_eq!(out[0].name, "Planta Principal - Madrid");
        assert!(out[0].location.is_none());
        assert_eq!(out[1], seed::sites()[1]);
    }

    #[test]
    fn test_user_update_empty_password_keeps_existing() {
        let ids = SequentialIds::default();
        let patch = UserPatch {
            password: Some(String::new()),
            site_affinity: Some(Some("c2".to_string())),
            ..UserPatch::default()
        };
        let out = save_user(&seed::users(), patch, Some("2"), &ids).unwrap();
        assert_eq!(out[1].password, "user123");
        assert_eq!(out[1].site_affinity.as_deref(), Some("c2"));
    }

    #[test]
    fn test_user_update_can_clear_affinity() {
        let ids = SequentialIds::default();
        let patch = UserPatch {
            role: Some(Role::Admin),
            site_affinity: Some(None),
            ..UserPatch::default()
        };
        let out = save_user(&seed::users(), patch, Some("2"), &ids).unwrap();
        assert_eq!(out[1].role, Role::Admin);
        assert!(out[1].site_affinity.is_none());
    }

    #[test]
    fn test_user_create_requires_password() {
        let ids = SequentialIds::default();
        let patch = UserPatch {
            name: Some("Ana".to_string()),
            email: Some("ana@indudocs.com".to_string()),
            role: Some(Role::Operario),
            password: Some(String::new()),
            site_affinity: Some(Some("c1".to_string())),
        };
        let err = save_user(&seed::users(), patch, None, &ids).unwrap_err();
        assert_eq!(err, MutationError::MissingField("password"));
    }

    #[test]
    fn test_delete_missing_id_is_identity() {
        let sites = seed::sites();
        let users = seed::users();
        let docs = seed::documents();
        assert_eq!(delete_site(&sites, "zzz"), sites);
        assert_eq!(delete_user(&users, "zzz"), users);
        assert_eq!(delete_document(&docs, "zzz"), docs);
    }

    #[test]
    fn test_delete_site_does_not_cascade() {
        let sites = delete_site(&seed::sites(), "c1");
        assert_eq!(sites.len(), 1);
        // Documents are a separate collection and are not touched here.
        let docs = seed::documents();
        assert_eq!(docs.iter().filter(|d| d.site_id == "c1").count(), 2);
    }
}
