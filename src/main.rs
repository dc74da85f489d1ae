mod github;
mod insights;
mod observability;
mod report;
mod session;
mod stats;
mod svg;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::Parser;
use github::{DEFAULT_API_URL, GithubClient};
use session::{Session, ViewState, validate_username};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

/// See a GitHub account's year in review.
#[derive(Parser, Debug)]
#[command(name = "github-wrapped", version, about)]
struct Cli {
    /// GitHub username. Omit to enter usernames interactively, one per line.
    username: Option<String>,

    /// Directory for the dark and light SVG cards
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Skip writing SVG cards
    #[arg(long)]
    no_svg: bool,

    /// Print the aggregated stats as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// GitHub REST API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Debug)]
struct Output {
    json: bool,
    svg_dir: Option<PathBuf>,
    year: i32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    observability::init(observability::env_filter(cli.quiet, cli.verbose));

    let client = GithubClient::new(&cli.api_url).context("Failed to build HTTP client")?;
    let output = Output {
        json: cli.json,
        svg_dir: (!cli.no_svg).then(|| cli.out_dir.clone()),
        year: Utc::now().year(),
    };

    match cli.username.as_deref() {
        Some(input) => {
            let username =
                validate_username(input).context("Please enter a GitHub username.")?;
            run_once(&client, username, &output).await
        }
        None => run_interactive(client, output).await,
    }
}

async fn run_once(client: &GithubClient, username: &str, output: &Output) -> Result<()> {
    let mut session = Session::new();
    let ticket = session.begin(username);
    let result = stats::compute_stats(client, username).await;
    session.finish(ticket, username, result);

    if let ViewState::Failed { message } = session.state() {
        anyhow::bail!("{message}");
    }
    present(session.state(), output)
}

/// Read usernames from stdin. A new submission aborts the one in flight.
async fn run_interactive(client: GithubClient, output: Output) -> Result<()> {
    let session = Arc::new(Mutex::new(Session::new()));
    let mut in_flight: Option<JoinHandle<()>> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let Some(username) = validate_username(&line) else {
            eprintln!("Please enter a GitHub username.");
            prompt();
            continue;
        };
        let username = username.to_string();

        if let Some(previous) = in_flight.take() {
            previous.abort();
        }
        let ticket = session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .begin(&username);
        tracing::info!(%username, "submitted");

        let client = client.clone();
        let output = output.clone();
        let session = Arc::clone(&session);
        in_flight = Some(tokio::spawn(async move {
            let result = stats::compute_stats(&client, &username).await;
            let Some(state) = settle(&session, ticket, &username, result) else {
                return;
            };
            if let Err(e) = present(&state, &output) {
                tracing::warn!("failed to present results for {username}: {e:#}");
            }
            prompt();
        }));
    }

    if let Some(last) = in_flight {
        let _ = last.await;
    }
    Ok(())
}

/// Record a finished submission and copy out the state to present, so the
/// lock is not held during output. `None` when the ticket is stale.
fn settle(
    session: &Mutex<Session>,
    ticket: session::Ticket,
    username: &str,
    result: Result<stats::StatsResult, github::DataFetchError>,
) -> Option<ViewState> {
    let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
    session
        .finish(ticket, username, result)
        .then(|| session.state().clone())
}

fn prompt() {
    eprint!("Enter GitHub username: ");
    let _ = std::io::stderr().flush();
}

fn present(state: &ViewState, output: &Output) -> Result<()> {
    match state {
        ViewState::Loaded { username, stats } => {
            if output.json {
                let json = serde_json::to_string_pretty(stats)?;
                println!("{json}");
            } else {
                print!("{}", report::render(username, output.year, stats));
            }

            if let Some(dir) = &output.svg_dir {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                for theme in [svg::Theme::Dark, svg::Theme::Light] {
                    let path = dir.join(format!("{}_{}.svg", file_stem(username), theme.suffix()));
                    let card = svg::generate_svg(username, output.year, stats, theme);
                    fs::write(&path, card)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "wrote card");
                }
            }
            tracing::info!(%username, "submission complete");
        }
        ViewState::Failed { message } => eprintln!("{message}"),
        ViewState::Loading { username } => tracing::debug!(%username, "still loading"),
        ViewState::Idle => {}
    }
    Ok(())
}

fn file_stem(username: &str) -> String {
    username
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
