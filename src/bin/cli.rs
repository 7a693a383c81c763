// Reading Tracker - Personal reading progress tracker
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use reading_tracker::{
    BookService, CreateBookRequest, ErrorKind, ListBooksQuery, TrackerConfig, TrackerError,
    UpdateBookRequest,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "reading-tracker")]
#[command(about = "Reading Tracker CLI - track reading progress of your books", long_about = None)]
struct Cli {
    /// SQLite database file (overrides READING_TRACKER_DB and DATABASE_URL)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a book
    Add {
        title: String,
        author: String,
        /// Total number of pages
        #[arg(long)]
        pages: i64,
        #[arg(long)]
        current_page: Option<i64>,
        /// not_started, in_progress or completed
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        cover_url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Rating from 0 to 5
        #[arg(long)]
        rating: Option<f64>,
        #[arg(long)]
        favorite: bool,
    },
    /// List books, most recently updated first
    List {
        #[arg(long)]
        skip: Option<i64>,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        status: Option<String>,
        /// Match title or author, case-insensitive
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one book
    Show { id: String },
    /// Change fields of a book
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        total_pages: Option<i64>,
        #[arg(long)]
        current_page: Option<i64>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        cover_url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        rating: Option<f64>,
        #[arg(long)]
        favorite: Option<bool>,
        /// Remove a stored value (repeatable)
        #[arg(long, value_enum)]
        clear: Vec<ClearableField>,
        /// JSON update body; `null` clears a nullable field
        #[arg(
            long,
            value_name = "BODY",
            conflicts_with_all = [
                "title", "author", "total_pages", "current_page", "status", "genre",
                "cover_url", "notes", "rating", "favorite", "clear",
            ]
        )]
        json: Option<String>,
    },
    /// Set the current page
    Progress {
        id: String,
        #[arg(allow_hyphen_values = true)]
        page: i64,
    },
    /// Replace the notes of a book
    Notes { id: String, text: String },
    /// Delete a book
    Delete { id: String },
    /// Show reading statistics
    Stats,
    /// List favorite books
    Favorites,
    /// Delete every book
    Reset {
        /// Required, the operation cannot be undone
        #[arg(long)]
        yes: bool,
    },
    /// Show service and database information
    Info,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ClearableField {
    Genre,
    CoverUrl,
    Notes,
    Rating,
}

/// `--clear` wins over a value given for the same field
fn nullable<T>(clear: bool, value: Option<T>) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", json);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = TrackerConfig::from_env().context("Failed to read configuration")?;
    if let Some(path) = cli.database {
        config = config.with_database_path(path);
    }

    let service = BookService::open(&config).await.with_context(|| {
        format!("Failed to open database {}", config.database_path.display())
    })?;

    let outcome = dispatch(&service, cli.command).await;
    service.close().await?;
    outcome
}

async fn dispatch(service: &BookService, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Add {
            title,
            author,
            pages,
            current_page,
            status,
            genre,
            cover_url,
            notes,
            rating,
            favorite,
        } => {
            let request = CreateBookRequest {
                current_page,
                status,
                genre,
                cover_url,
                notes,
                rating,
                is_favorite: Some(favorite),
                ..CreateBookRequest::new(title, author, pages)
            };
            print_json(&service.create(request).await?)
        }
        Commands::List {
            skip,
            limit,
            status,
            search,
        } => {
            let query = ListBooksQuery {
                skip,
                limit,
                status,
                search,
            };
            print_json(&service.list(query).await?)
        }
        Commands::Show { id } => print_json(&service.get(&id).await?),
        Commands::Update {
            id,
            title,
            author,
            total_pages,
            current_page,
            status,
            genre,
            cover_url,
            notes,
            rating,
            favorite,
            clear,
            json,
        } => {
            let request = match json {
                Some(body) => UpdateBookRequest::from_json(&body)?,
                None => {
                    let cleared = |field| clear.contains(&field);
                    UpdateBookRequest {
                        title,
                        author,
                        total_pages,
                        current_page,
                        status,
                        genre: nullable(cleared(ClearableField::Genre), genre),
                        cover_url: nullable(cleared(ClearableField::CoverUrl), cover_url),
                        notes: nullable(cleared(ClearableField::Notes), notes),
                        rating: nullable(cleared(ClearableField::Rating), rating),
                        is_favorite: favorite,
                    }
                }
            };
            print_json(&service.update(&id, request).await?)
        }
        Commands::Progress { id, page } => print_json(&service.update_progress(&id, page).await?),
        Commands::Notes { id, text } => print_json(&service.update_notes(&id, text).await?),
        Commands::Delete { id } => {
            service.delete(&id).await?;
            println!("Deleted {}", id);
            Ok(())
        }
        Commands::Stats => print_json(&service.stats().await?),
        Commands::Favorites => print_json(&service.favorites().await?),
        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete every book without --yes");
            }
            let removed = service.clear().await?;
            println!("Removed {} books", removed);
            Ok(())
        }
        Commands::Info => {
            let db = service.database();
            let info = serde_json::json!({
                "service": service.health(),
                "database": db.path().map(|p| p.display().to_string()),
                "size_bytes": db.get_size().await?,
                "integrity_ok": db.check_integrity().await?,
            });
            print_json(&info)
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<TrackerError>().map(TrackerError::kind) {
        Some(ErrorKind::InvalidInput) => 2,
        Some(ErrorKind::NotFound) => 3,
        _ => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<TrackerError>() {
                Some(tracker_err) => eprintln!("Error: {}", tracker_err.user_message()),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::from(exit_code(&err))
        }
    }
}
