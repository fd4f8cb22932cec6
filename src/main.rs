mod app;
mod config;
mod db;
mod error;
mod logging;
mod mail;
mod models;
mod services;
mod storage;
mod ui;
mod web;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{info, warn};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::app::App;
use crate::db::Store;
use crate::services::auth;
use crate::storage::BlobStore;

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "studio-manager", version, about = "Retouching studio site and back-office")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the terminal back-office (default)
    Admin,
    /// Serve the public site and the admin JSON API
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Create an admin account, or reset its password
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Upload a local file to the media bucket and print its public URL
    Upload { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init()?;

    match cli.command.unwrap_or(Command::Admin) {
        Command::Admin => {
            logging::init_file(&config.log_file)?;
            let db = db::init(&config).await?;
            let bucket = BlobStore::from_config(&config)?;
            run_admin(Arc::new(db), bucket).await
        }
        Command::Serve => {
            logging::init_stderr();
            let db = db::init(&config).await?;
            web::serve(&config, Arc::new(db)).await
        }
        Command::Migrate => {
            logging::init_stderr();
            let db = db::init(&config).await?;
            db.migrate().await?;
            println!("Migrations applied");
            Ok(())
        }
        Command::CreateAdmin { email, password } => {
            logging::init_stderr();
            let db = db::init(&config).await?;
            let id = auth::create_admin(&db, &email, &password).await?;
            println!("Admin {} ready (id {})", auth::normalize_email(&email), id);
            Ok(())
        }
        Command::Upload { file } => {
            logging::init_stderr();
            let bucket = BlobStore::from_config(&config)?;
            let url = app::upload_file(&bucket, &file).await?;
            println!("{}", url);
            Ok(())
        }
    }
}

async fn run_admin(store: Arc<dyn Store>, bucket: BlobStore) -> Result<()> {
    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, bucket);
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    for job_id in app.running_jobs() {
        warn!(job_id, "leaving with a running timer; it resumes next time");
        println!("Timer for job {} is still running.", job_id);
    }
    if let Err(err) = &result {
        println!("Error: {}", err);
    }
    info!("back-office closed");
    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key).await;
                }
            }
        }
        app.tick(Utc::now());

        if app.should_quit() {
            return Ok(());
        }
    }
}
