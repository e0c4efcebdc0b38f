//! Access-scoped document filtering.
//!
//! Computes the documents an actor may see under the current filter
//! selection. The algorithm is a pure function of its inputs:
//!
//! 1. Operators keep only documents of their own site; the site filter is
//!    ignored for them.
//! 2. Administrators with a concrete site filter keep only that site.
//! 3. Case-insensitive substring match of the query against title OR
//!    description. An empty query matches everything; the query is not
//!    trimmed.
//! 4. Type filter, unless wildcard.
//!
//! Source order is preserved and there is no pagination.

use crate::models::{DocType, Document, Role, User};

/// Either the wildcard `ALL` or one concrete value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(v) => v == value,
        }
    }
}

impl<T> From<Option<T>> for Selection<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Selection::Only(v),
            None => Selection::All,
        }
    }
}

/// The user-controlled part of a document query.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub query: String,
    pub doc_type: Selection<DocType>,
    /// Only meaningful for administrators.
    pub site: Selection<String>,
}

impl DocumentFilter {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Returns the documents visible to `actor` under `filter`, in source order.
pub fn visible_documents<'a>(
    docs: &'a [Document],
    actor: &User,
    filter: &DocumentFilter,
) -> Vec<&'a Document> {
    let needle = filter.query.to_lowercase();

    docs.iter()
        .filter(|doc| match actor.role {
            Role::Operario => actor.site_affinity.as_deref() == Some(doc.site_id.as_str()),
            Role::Admin => filter.site.admits(&doc.site_id),
        })
        .filter(|doc| {
            needle.is_empty()
                || doc.title.to_lowercase().contains(&needle)
                || doc.description.to_lowercase().contains(&needle)
        })
        .filter(|doc| filter.doc_type.admits(&doc.doc_type))
        .collect()
}
