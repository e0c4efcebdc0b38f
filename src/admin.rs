//! Administration commands for sites, users and documents.
//!
//! Every command here requires an administrator session. Deletions never
//! cascade: documents and users keep pointing at a removed site and are
//! shown with a placeholder label afterwards.

use anyhow::Result;

use indudocs_core::models::{Site, User};
use indudocs_core::mutate::{DocumentPatch, SitePatch, UserPatch};
use indudocs_core::store::KeyValueStore;

use crate::app::App;
use crate::config::Config;

/// Interprets a clearable option value such as a user's `--site` or a
/// site's `--location`: `none` (any case) or an empty string clears it.
pub fn parse_clearable(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}

fn report_delete(kind: &str, id: &str, removed: bool) {
    if removed {
        println!("Deleted {} {}.", kind, id);
    } else {
        println!("No {} with id {}.", kind, id);
    }
}

// ============ Sites ============

pub fn render_sites(sites: &[Site]) -> String {
    if sites.is_empty() {
        return "No sites.\n".to_string();
    }
    let mut out = format!("{:<40} {:<30} {}\n", "ID", "NAME", "LOCATION");
    for site in sites {
        out.push_str(&format!(
            "{:<40} {:<30} {}\n",
            site.id,
            site.name,
            site.location.as_deref().unwrap_or("-")
        ));
    }
    out
}

pub fn run_site_list(config: &Config) -> Result<()> {
    let app = crate::app::open(config)?;
    print!("{}", render_sites(app.sites()?));
    Ok(())
}

pub fn run_site_save(config: &Config, patch: SitePatch, editing: Option<&str>) -> Result<()> {
    let mut app = crate::app::open(config)?;
    let id = app.save_site(patch, editing)?;
    println!("{} site {}.", verb(editing), id);
    Ok(())
}

pub fn run_site_rm(config: &Config, id: &str) -> Result<()> {
    let mut app = crate::app::open(config)?;
    let removed = app.delete_site(id)?;
    report_delete("site", id, removed);
    Ok(())
}

// ============ Users ============

pub fn render_users<S: KeyValueStore>(app: &App<S>, users: &[User]) -> String {
    if users.is_empty() {
        return "No users.\n".to_string();
    }
    let mut out = format!(
        "{:<40} {:<24} {:<28} {:<9} {}\n",
        "ID", "NAME", "EMAIL", "ROLE", "SITE"
    );
    for user in users {
        out.push_str(&format!(
            "{:<40} {:<24} {:<28} {:<9} {}\n",
            user.id,
            user.name,
            user.email,
            user.role.as_str(),
            app.user_site_label(user)
        ));
    }
    out
}

pub fn run_user_list(config: &Config) -> Result<()> {
    let app = crate::app::open(config)?;
    let users = app.users()?;
    print!("{}", render_users(&app, users));
    Ok(())
}

pub fn run_user_save(config: &Config, patch: UserPatch, editing: Option<&str>) -> Result<()> {
    let mut app = crate::app::open(config)?;
    let id = app.save_user(patch, editing)?;
    println!("{} user {}.", verb(editing), id);
    Ok(())
}

pub fn run_user_rm(config: &Config, id: &str) -> Result<()> {
    let mut app = crate::app::open(config)?;
    let removed = app.delete_user(id)?;
    report_delete("user", id, removed);
    Ok(())
}

// ============ Documents ============

pub fn run_doc_save(config: &Config, patch: DocumentPatch, editing: Option<&str>) -> Result<()> {
    let mut app = crate::app::open(config)?;
    let id = app.save_document(patch, editing)?;
    println!("{} document {}.", verb(editing), id);
    Ok(())
}

pub fn run_doc_rm(config: &Config, id: &str) -> Result<()> {
    let mut app = crate::app::open(config)?;
    let removed = app.delete_document(id)?;
    report_delete("document", id, removed);
    Ok(())
}

fn verb(editing: Option<&str>) -> &'static str {
    if editing.is_some() {
        "Updated"
    } else {
        "Created"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indudocs_core::seed;

    #[test]
    fn test_parse_clearable() {
        assert_eq!(parse_clearable("c1"), Some("c1".to_string()));
        assert_eq!(parse_clearable(" Getafe "), Some("Getafe".to_string()));
        assert_eq!(parse_clearable("NONE"), None);
        assert_eq!(parse_clearable("  "), None);
    }

    #[test]
    fn test_render_sites() {
        let out = render_sites(&seed::sites());
        assert!(out.starts_with("ID"));
        assert!(out.contains("Planta Principal - Madrid"));
        assert_eq!(render_sites(&[]), "No sites.\n");
    }

    #[test]
    fn test_verb() {
        assert_eq!(verb(None), "Created");
        assert_eq!(verb(Some("d1")), "Updated");
    }
}
