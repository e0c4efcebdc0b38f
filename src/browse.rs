//! Document browsing, identity and language commands.

use anyhow::Result;

use indudocs_core::filter::{DocumentFilter, Selection};
use indudocs_core::models::{DocType, Document, Language, Role};
use indudocs_core::store::KeyValueStore;

use crate::app::App;
use crate::config::Config;

/// Builds a [`DocumentFilter`] from optional CLI arguments.
pub fn build_filter(query: Option<String>, doc_type: Option<DocType>, site: Option<String>) -> DocumentFilter {
    DocumentFilter {
        query: query.unwrap_or_default(),
        doc_type: Selection::from(doc_type),
        site: match site.as_deref() {
            None | Some("ALL") => Selection::All,
            Some(id) => Selection::Only(id.to_string()),
        },
    }
}

/// Renders the listing table for `docs`.
pub fn render_documents<S: KeyValueStore>(app: &App<S>, docs: &[&Document]) -> String {
    if docs.is_empty() {
        return "No documents.\n".to_string();
    }
    let mut out = format!(
        "{:<10} {:<22} {:<30} {:<10}  {}\n",
        "ID", "TYPE", "SITE", "UPDATED", "TITLE"
    );
    for doc in docs {
        out.push_str(&format!(
            "{:<10} {} {:<17} {:<30} {:<10}  {}\n",
            doc.id,
            doc.doc_type.icon(),
            doc.doc_type.as_str(),
            truncate(app.document_site_label(doc), 30),
            doc.last_updated.to_string(),
            doc.title
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

pub fn run_docs(config: &Config, filter: &DocumentFilter, verbose: bool) -> Result<()> {
    let app = crate::app::open(config)?;
    let docs = app.visible_documents(filter)?;
    print!("{}", render_documents(&app, &docs));

    if verbose {
        for doc in &docs {
            println!();
            println!("--- {} ---", doc.id);
            println!("title:        {}", doc.title);
            println!("type:         {} ({})", doc.doc_type.display_name(), doc.doc_type.label_key());
            println!("category:     {}", doc.category);
            println!("site:         {}", app.document_site_label(doc));
            println!("updated:      {}", doc.last_updated);
            println!("url:          {}", doc.external_url);
            if !doc.description.is_empty() {
                println!("description:  {}", doc.description);
            }
        }
    }
    Ok(())
}

pub fn run_whoami(config: &Config) -> Result<()> {
    let app = crate::app::open(config)?;
    match app.session().actor() {
        None => println!("Not logged in."),
        Some(user) => {
            println!("name:   {}", user.name);
            println!("email:  {}", user.email);
            println!("role:   {}", user.role);
            let scope = match user.role {
                Role::Admin => "all sites".to_string(),
                Role::Operario => app.user_site_label(user).to_string(),
            };
            println!("scope:  {}", scope);
        }
    }
    println!("lang:   {} ({})", app.language(), app.language().label());
    Ok(())
}

pub fn run_lang(config: &Config, language: Option<Language>) -> Result<()> {
    let mut app = crate::app::open(config)?;
    match language {
        Some(lang) => {
            app.set_language(lang)?;
            println!("Language set to {} ({}).", lang, lang.label());
        }
        None => {
            for lang in Language::ALL {
                let marker = if lang == app.language() { "*" } else { " " };
                println!("{} {}  {}", marker, lang.code(), lang.label());
            }
        }
    }
    Ok(())
}
