//! # InduDocs CLI (`indudocs`)
//!
//! Command-line front end over the persisted InduDocs store.
//!
//! ## Usage
//!
//! ```bash
//! indudocs --config ./config/indudocs.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `indudocs init` | Seed the store if it does not exist yet |
//! | `indudocs reset` | Replace the whole store with the seed dataset |
//! | `indudocs login <email> --password <pw>` | Start a session |
//! | `indudocs logout` | End the session |
//! | `indudocs whoami` | Show the session user and language |
//! | `indudocs lang [code]` | List or set the interface language |
//! | `indudocs docs` | List documents visible to the session user |
//! | `indudocs doc add/edit/rm` | Manage documents (admin) |
//! | `indudocs site list/add/edit/rm` | Manage sites (admin) |
//! | `indudocs user list/add/edit/rm` | Manage users (admin) |
//! | `indudocs recover <email>` | Send account recovery instructions |
//! | `indudocs ask "<query>"` | Search with an assistant summary |
//! | `indudocs explain <id>` | Assistant explanation of one document |
//! | `indudocs chat` | Interactive assistant chat |
//!
//! Log verbosity follows `RUST_LOG` (default `indudocs=warn`); logs go to
//! stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use indudocs_core::models::{DocType, Language, Role};
use indudocs_core::mutate::{DocumentPatch, SitePatch, UserPatch};
use indudocs::{admin, assist, auth, browse, config};

/// InduDocs: role-scoped industrial document distribution.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/indudocs.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "indudocs",
    about = "InduDocs: role-scoped industrial document distribution across sites",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/indudocs.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store with the seed dataset. Idempotent.
    Init,

    /// Discard all stored data and restore the seed dataset.
    ///
    /// Also the way out of a store that fails to load.
    Reset,

    /// Log in with email and password.
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },

    Logout,

    /// Show the current session.
    Whoami,

    /// List languages, or set the interface language (es, fr, ar, wo).
    Lang { code: Option<Language> },

    /// List documents visible to the logged-in user.
    Docs {
        /// Case-insensitive substring of title or description.
        #[arg(long, short)]
        query: Option<String>,
        /// Document type, e.g. SAFETY_SHEET.
        #[arg(long = "type")]
        doc_type: Option<DocType>,
        /// Site id, or ALL.
        #[arg(long)]
        site: Option<String>,
        /// Print every field of each document.
        #[arg(long, short)]
        verbose: bool,
    },

    /// Manage documents (administrator only).
    Doc {
        #[command(subcommand)]
        action: DocAction,
    },

    /// Manage sites (administrator only).
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },

    /// Manage users (administrator only).
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Send account recovery instructions. No session needed.
    Recover { email: String },

    /// Search and ask the assistant to recommend documents.
    Ask {
        query: String,
        #[arg(long = "type")]
        doc_type: Option<DocType>,
        #[arg(long)]
        site: Option<String>,
    },

    /// Ask the assistant to explain a document.
    Explain { id: String },

    /// Chat with the assistant about the visible documents.
    ///
    /// Type `exit` or `quit` (or send EOF) to leave.
    Chat {
        #[arg(long = "type")]
        doc_type: Option<DocType>,
        #[arg(long)]
        site: Option<String>,
    },
}

#[derive(clap::Args)]
struct DocFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long = "type")]
    doc_type: Option<DocType>,
    #[arg(long)]
    category: Option<String>,
    /// Link to the document in external storage.
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Owning site id.
    #[arg(long)]
    site: Option<String>,
}

impl From<DocFields> for DocumentPatch {
    fn from(f: DocFields) -> Self {
        DocumentPatch {
            title: f.title,
            doc_type: f.doc_type,
            category: f.category,
            external_url: f.url,
            description: f.description,
            site_id: f.site,
        }
    }
}

#[derive(Subcommand)]
enum DocAction {
    /// Create a document. Requires --title, --type, --category, --url and --site.
    Add(DocFields),
    /// Update the given fields of a document.
    Edit {
        id: String,
        #[command(flatten)]
        fields: DocFields,
    },
    Rm { id: String },
}

#[derive(clap::Args)]
struct SiteFields {
    #[arg(long)]
    name: Option<String>,
    /// Free-text location, or `none` to clear.
    #[arg(long)]
    location: Option<String>,
}

impl From<SiteFields> for SitePatch {
    fn from(f: SiteFields) -> Self {
        SitePatch {
            name: f.name,
            location: f.location.as_deref().map(admin::parse_clearable),
        }
    }
}

#[derive(Subcommand)]
enum SiteAction {
    List,
    /// Create a site. Requires --name.
    Add(SiteFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: SiteFields,
    },
    /// Delete a site. Documents and users that reference it are kept.
    Rm { id: String },
}

#[derive(clap::Args)]
struct UserFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// ADMIN or OPERARIO.
    #[arg(long)]
    role: Option<Role>,
    /// On edit, leave out (or pass an empty string) to keep the current one.
    #[arg(long)]
    password: Option<String>,
    /// Site id, or `none` to clear.
    #[arg(long)]
    site: Option<String>,
}

impl From<UserFields> for UserPatch {
    fn from(f: UserFields) -> Self {
        UserPatch {
            name: f.name,
            email: f.email,
            role: f.role,
            password: f.password,
            site_affinity: f.site.as_deref().map(admin::parse_clearable),
        }
    }
}

#[derive(Subcommand)]
enum UserAction {
    List,
    /// Create a user. Requires --name, --email, --role and --password.
    Add(UserFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: UserFields,
    },
    Rm { id: String },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("indudocs=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let created = indudocs::app::init_store(&cfg)?;
            if created {
                println!("Store initialized successfully.");
            } else {
                println!("Store already exists: {}", cfg.store.path.display());
            }
        }
        Commands::Reset => {
            indudocs::app::reset_store(&cfg)?;
            println!("Store reset to the seed dataset.");
        }
        Commands::Login { email, password } => {
            auth::run_login(&cfg, &email, &password)?;
        }
        Commands::Logout => {
            auth::run_logout(&cfg)?;
        }
        Commands::Whoami => {
            browse::run_whoami(&cfg)?;
        }
        Commands::Lang { code } => {
            browse::run_lang(&cfg, code)?;
        }
        Commands::Docs {
            query,
            doc_type,
            site,
            verbose,
        } => {
            let filter = browse::build_filter(query, doc_type, site);
            browse::run_docs(&cfg, &filter, verbose)?;
        }
        Commands::Doc { action } => match action {
            DocAction::Add(fields) => admin::run_doc_save(&cfg, fields.into(), None)?,
            DocAction::Edit { id, fields } => admin::run_doc_save(&cfg, fields.into(), Some(&id))?,
            DocAction::Rm { id } => admin::run_doc_rm(&cfg, &id)?,
        },
        Commands::Site { action } => match action {
            SiteAction::List => admin::run_site_list(&cfg)?,
            SiteAction::Add(fields) => admin::run_site_save(&cfg, fields.into(), None)?,
            SiteAction::Edit { id, fields } => {
                admin::run_site_save(&cfg, fields.into(), Some(&id))?
            }
            SiteAction::Rm { id } => admin::run_site_rm(&cfg, &id)?,
        },
        Commands::User { action } => match action {
            UserAction::List => admin::run_user_list(&cfg)?,
            UserAction::Add(fields) => admin::run_user_save(&cfg, fields.into(), None)?,
            UserAction::Edit { id, fields } => {
                admin::run_user_save(&cfg, fields.into(), Some(&id))?
            }
            UserAction::Rm { id } => admin::run_user_rm(&cfg, &id)?,
        },
        Commands::Recover { email } => {
            auth::run_recover(&cfg, &email).await?;
        }
        Commands::Ask {
            query,
            doc_type,
            site,
        } => {
            let filter = browse::build_filter(Some(query), doc_type, site);
            assist::run_ask(&cfg, &filter).await?;
        }
        Commands::Explain { id } => {
            assist::run_explain(&cfg, &id).await?;
        }
        Commands::Chat { doc_type, site } => {
            let filter = browse::build_filter(None, doc_type, site);
            assist::run_chat(&cfg, &filter).await?;
        }
    }

    Ok(())
}
