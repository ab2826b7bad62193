//! TabTrail command line: run the local server, list recent tabs, focus a tab.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tabtrail::app::App;
use tabtrail::http_handler;
use tabtrail::managers::history_manager::HistoryManagerTrait;
use tabtrail::services::focus_poller::FocusPoller;
use tabtrail::types::tab::LiveTab;

#[derive(Parser)]
#[command(name = "tabtrail")]
#[command(about = "Recently visited browser tabs, one keystroke away", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the local tab server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,

        /// Also execute queued focus requests in this process
        #[arg(long)]
        poll: bool,
    },

    /// List recently visited tabs, most recent first
    Recent {
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Focus the open tab showing a URL, or open it
    Focus {
        url: String,

        /// Browser tab id to try first
        #[arg(long)]
        tab_id: Option<i64>,
    },

    /// Execute focus requests queued on the local server
    Poll,

    /// Manage the launcher history cache
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// Remove all launcher history
    Clear,
    /// Print the history as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge a JSON export into the history
    Import { file: PathBuf },
    /// Show history statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut app = App::load(cli.config).context("Failed to load settings")?;

    match cli.command {
        Commands::Serve { host, port, poll } => {
            if let Some(host) = host {
                app.settings.server.host = host;
            }
            if let Some(port) = port {
                app.settings.server.port = port;
            }
            serve(&app, poll).await?;
        }
        Commands::Recent { limit, json } => {
            let limit = limit.unwrap_or(app.settings.history.recent_view_limit);
            recent(&app, limit, json).await?;
        }
        Commands::Focus { url, tab_id } => {
            let resolver = app.resolver().await;
            let outcome = resolver.focus_or_open(&url, tab_id).await;
            if outcome.is_success() {
                let mut manager = app.history_manager();
                manager.initialize();
                let title = manager.get(&url).map(|e| e.title.clone()).unwrap_or_else(|| url.clone());
                let tab = LiveTab {
                    id: tab_id.unwrap_or_default(),
                    title,
                    url: url.clone(),
                    ..LiveTab::default()
                };
                if let Err(e) = manager.record_tab_access(&tab) {
                    warn!(error = %e, "Could not record access");
                }
            }
            println!("{}", serde_json::to_string(&outcome)?.trim_matches('"'));
            if !outcome.is_success() {
                anyhow::bail!("Could not focus or open {}", url);
            }
        }
        Commands::Poll => {
            let resolver = app.poll_resolver().await;
            let poller = FocusPoller::new(app.client.clone(), resolver, app.history_store(), app.poll_interval());
            let cancel = cancel_on_ctrl_c();
            poller.run(cancel).await;
        }
        Commands::History { action } => history(&app, action)?,
    }

    Ok(())
}

/// Token cancelled on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
        }
        trigger.cancel();
    });
    token
}

async fn serve(app: &App, poll: bool) -> anyhow::Result<()> {
    let addr = app.server_addr().context("Invalid server address")?;
    let state = app.server_state();
    let cancel = cancel_on_ctrl_c();

    let poller = if poll {
        let poller = FocusPoller::new(
            state.focus_queue(),
            app.poll_resolver().await,
            app.history_store(),
            app.poll_interval(),
        );
        Some(tokio::spawn(poller.run(cancel.clone())))
    } else {
        None
    };

    http_handler::serve(state, addr, cancel.clone())
        .await
        .with_context(|| format!("Failed to serve on {}", addr))?;

    cancel.cancel();
    if let Some(handle) = poller {
        let _ = handle.await;
    }
    Ok(())
}

async fn recent(app: &App, limit: usize, as_json: bool) -> anyhow::Result<()> {
    let resolver = app.resolver().await;
    let live = resolver.live_tabs().await;
    let mut manager = app.history_manager();

    if live.is_empty() {
        // No tab access: fall back to what history knows.
        let entries = manager.recent_entries(limit);
        if as_json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            for entry in entries {
                println!("{}\t{}", entry.title, entry.url);
            }
        }
        return Ok(());
    }

    let tabs = manager.recent_view(&live, limit);
    if as_json {
        println!("{}", serde_json::to_string_pretty(&tabs)?);
    } else {
        for tab in tabs {
            println!("{}\t{}\t{}", tab.tab.id, tab.tab.title, tab.tab.url);
        }
    }
    Ok(())
}

fn history(app: &App, action: HistoryCommands) -> anyhow::Result<()> {
    let mut manager = app.history_manager();
    match action {
        HistoryCommands::Clear => {
            manager.clear()?;
            println!("History cleared");
        }
        HistoryCommands::Export { output } => {
            let json = manager.export_json()?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
        }
        HistoryCommands::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let imported = manager.import_json(&json)?;
            println!("Imported {} entries", imported);
        }
        HistoryCommands::Stats => {
            manager.initialize();
            println!("{}", serde_json::to_string_pretty(&manager.statistics())?);
        }
    }
    Ok(())
}
