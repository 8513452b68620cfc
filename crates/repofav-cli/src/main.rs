use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::{Args, Parser};
use repofav_core::{
    consolidate, Config, Controller, Cursor, HttpRepositoryService, Repository,
    RepositoryService,
};
use repofav_store::SessionStore;
use repofav_tui::{run_tui, App};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "repofav")]
#[command(version, about = "Search repositories and keep track of your favorites", long_about = None)]
struct Cli {
    /// Base URL of the repositories API
    #[arg(long, global = true, env = "REPOFAV_API_URL")]
    api_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the interactive terminal UI (default)
    Tui,
    /// Search for repositories
    Search {
        /// Search query
        query: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List the globally relevant repositories
    Relevant {
        #[command(flatten)]
        page: PageArgs,
    },
    /// List your favorite repositories
    Favorites {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Flip the favorite flag on a repository
    Toggle {
        /// Repository id
        id: u64,
        /// Print the updated record as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct PageArgs {
    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Results per page (defaults to the config value)
    #[arg(long)]
    per_page: Option<u32>,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// What one-shot listing commands print with `--json`
#[derive(Debug, Serialize)]
struct PageOutput<'a> {
    page: u32,
    per_page: u32,
    total_pages: u32,
    total_count: u64,
    items: &'a [Repository],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));

    init_logging(interactive);

    let config = load_config(&cli)?;
    let service: Arc<dyn RepositoryService> = Arc::new(HttpRepositoryService::from_config(&config.api)?);

    match cli.command {
        None | Some(Commands::Tui) => {
            let store = open_store(&config);
            let controller = Controller::new(&config, service, store);
            run_tui(App::new(controller)).await?;
        }
        Some(Commands::Search { query, page }) => {
            let per_page = page.per_page.unwrap_or(config.pagination.search_per_page);
            let mut cursor = Cursor::new(per_page);
            cursor.page = page.page.max(1);

            tracing::info!("Searching for: {}", query);
            let result = service.search(&query, cursor.page, cursor.per_page).await?;

            if let Some(store) = open_store(&config) {
                if let Err(e) = store.mark_has_data() {
                    tracing::warn!("Failed to persist session flag: {}", e);
                }
            }

            print_page(&cursor, result.total_count, &result.items, page.json)?;
        }
        Some(Commands::Relevant { page }) => {
            let per_page = page.per_page.unwrap_or(config.pagination.relevant_per_page);
            let items = consolidate::from_listing(&service.relevant().await?);
            print_local_page(&items, page.page, per_page, page.json)?;
        }
        Some(Commands::Favorites { page }) => {
            let per_page = page.per_page.unwrap_or(config.pagination.favorites_per_page);
            let listing = consolidate::from_listing(&service.relevant().await?);
            let favorites = consolidate::favorites_of(&listing);
            print_local_page(&favorites, page.page, per_page, page.json)?;
        }
        Some(Commands::Toggle { id, json }) => {
            let repo = service.toggle_favorite(id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&repo)?);
            } else if repo.is_favorite {
                println!("Added to favorites: {}", repo.full_name);
            } else {
                println!("Removed from favorites: {}", repo.full_name);
            }
        }
    }

    Ok(())
}

fn init_logging(to_file: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "repofav=info".into());

    // The TUI owns the terminal, so its logs go to a file instead
    if to_file {
        let file = Config::data_dir().ok().and_then(|dir| {
            std::fs::create_dir_all(&dir).ok()?;
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("repofav.log"))
                .ok()
        });

        if let Some(file) = file {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .init();
        }
        return;
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // clap already folded REPOFAV_API_URL into this
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    tracing::debug!("Using API at {}", config.api.base_url);
    Ok(config)
}

/// Session flags are nice to have. Run without them if the db won't open.
fn open_store(config: &Config) -> Option<SessionStore> {
    let path = match config.db_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("No session store: {}", e);
            return None;
        }
    };

    match SessionStore::open(&path) {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!("Could not open session store at {}: {}", path.display(), e);
            None
        }
    }
}

/// Page through a list we already hold in full
fn print_local_page(items: &[Repository], page: u32, per_page: u32, json: bool) -> anyhow::Result<()> {
    let total = items.len() as u64;
    let mut cursor = Cursor::new(per_page);
    cursor.page = page.max(1);
    cursor.clamp(total);

    print_page(&cursor, total, cursor.slice(items), json)
}

fn print_page(cursor: &Cursor, total: u64, items: &[Repository], json: bool) -> anyhow::Result<()> {
    if json {
        let output = PageOutput {
            page: cursor.page,
            per_page: cursor.per_page,
            total_pages: cursor.total_pages(total),
            total_count: total,
            items,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No repositories found.");
    }
    for repo in items {
        println!("{}", format_row(repo));
    }
    println!("{}", page_summary(cursor, total));
    Ok(())
}

fn format_row(repo: &Repository) -> String {
    format!(
        "{} {:>8} {:<40} {:>7} {:.2}",
        if repo.is_favorite { "★" } else { " " },
        repo.id,
        repo.full_name,
        repo.stars,
        repo.relevance_score
    )
}

fn page_summary(cursor: &Cursor, total: u64) -> String {
    let mut summary = format!(
        "Page {} of {} ({} total)",
        cursor.page,
        cursor.total_pages(total).max(1),
        total
    );
    if cursor.has_next(total) {
        summary.push_str(&format!(" - next: --page {}", cursor.page + 1));
    }
    summary
}
