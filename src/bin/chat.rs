//! Interactive PDF chat binary
//!
//! Run with: cargo run --bin paperchat -- chat

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

use paperchat::config::RagConfig;
use paperchat::index::LoadOptions;
use paperchat::ingestion::PdfReader;
use paperchat::providers::{LlmProvider, OllamaClient};
use paperchat::session::{IngestReport, SessionController};

#[derive(Parser)]
#[command(name = "paperchat", version, about = "Chat with your PDFs using a local Ollama model")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Allow loading a persisted index (deserializes files from disk)
    #[arg(long, default_value_t = false)]
    trust_index: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest PDF files or folders into a named index and exit.
    Ingest {
        /// PDF files, or directories to scan recursively
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Index name under the index root directory
        #[arg(long)]
        index: Option<String>,
    },
    /// Start an interactive chat session.
    Chat {
        /// Load this index (name or path) before the first question
        #[arg(long)]
        index: Option<String>,

        /// Print answers at once instead of word by word
        #[arg(long, default_value_t = false)]
        no_typing: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paperchat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = RagConfig::load(cli.config.as_deref())?;
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - Generation model: {}", config.llm.generate_model);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Index root: {}", config.index.root_dir.display());

    let ollama = Arc::new(OllamaClient::new(&config.llm));
    match ollama.health_check().await {
        Ok(true) => tracing::info!("Ollama is running at {}", config.llm.base_url),
        _ => {
            tracing::warn!("Ollama not available at {}", config.llm.base_url);
            tracing::warn!("Please start Ollama:");
            tracing::warn!("  1. Start: ollama serve");
            tracing::warn!(
                "  2. Pull the model: ollama pull {}",
                config.llm.generate_model
            );
        }
    }

    let load_options = LoadOptions {
        trust_persisted: cli.trust_index,
    };
    let mut session = SessionController::new(
        config,
        Arc::new(PdfReader::new()),
        ollama.clone(),
        ollama,
        load_options,
    );

    match cli.command {
        Command::Ingest { files, index } => {
            run_ingest(&mut session, &files, index.as_deref()).await?;
        }
        Command::Chat { index, no_typing } => {
            run_chat(&mut session, index.as_deref(), no_typing).await?;
        }
    }

    Ok(())
}

async fn run_ingest(
    session: &mut SessionController,
    files: &[PathBuf],
    index: Option<&str>,
) -> anyhow::Result<()> {
    let files = collect_pdfs(files);
    if files.is_empty() {
        println!("No PDF files found.");
        return Ok(());
    }

    let spinner = spinner_with_message(format!("Indexing {} file(s)...", files.len()));
    let result = session.submit_documents(&files, index).await;
    spinner.finish_and_clear();

    let report = result?;
    print_report(&report);
    if !report.failed.is_empty() {
        anyhow::bail!("{} file(s) could not be ingested", report.failed.len());
    }
    Ok(())
}

/// Expand directory arguments into the PDF files they contain, recursively
fn collect_pdfs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        let candidate = entry.into_path();
                        let is_pdf = candidate
                            .extension()
                            .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"));
                        if is_pdf {
                            files.push(candidate);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "directory entry skipped"),
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    files
}

async fn run_chat(
    session: &mut SessionController,
    index: Option<&str>,
    no_typing: bool,
) -> anyhow::Result<()> {
    println!(
        "{}",
        style("paperchat: ask questions about your PDFs").bold()
    );
    println!("Commands: /ingest <files...>, /load <name-or-path>, /clear-index, /status, /quit");
    println!(
        "Type '{}' to clear the conversation.\n",
        session.config().session.reset_word
    );

    if let Some(name) = index {
        let dir = resolve_index_arg(session, name);
        match session.load_existing_index(&dir) {
            Ok(report) => println!(
                "Loaded {} document(s), {} chunk(s) from {}\n",
                report.documents,
                report.chunks,
                dir.display()
            ),
            Err(e) => println!("{} {}\n", style("error").red(), e),
        }
    }

    let stdin = io::stdin();
    loop {
        print!("{} ", style(">").cyan().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(command) = input.strip_prefix('/') {
            if handle_command(session, command).await? {
                break;
            }
            continue;
        }

        let spinner = spinner_with_message("thinking...".to_string());
        let outcome = session.ask(input).await;
        spinner.finish_and_clear();

        if no_typing {
            println!("{}", outcome.reply);
        } else {
            reveal(&outcome.reply).await;
        }

        if !outcome.citations.is_empty() {
            println!("\n{}", style("Sources:").dim());
            for citation in &outcome.citations {
                println!("  {} {}", style("-").dim(), citation.format_inline());
            }
        }
        println!();
    }

    Ok(())
}

/// Returns true when the session should end
async fn handle_command(session: &mut SessionController, command: &str) -> anyhow::Result<bool> {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("quit") | Some("q") | Some("exit") => return Ok(true),
        Some("ingest") => {
            let args: Vec<PathBuf> = parts.map(PathBuf::from).collect();
            if args.is_empty() {
                println!("usage: /ingest <files-or-folders...>");
            } else {
                let files = collect_pdfs(&args);
                if files.is_empty() {
                    println!("No PDF files found.");
                    return Ok(false);
                }
                let spinner = spinner_with_message(format!("Indexing {} file(s)...", files.len()));
                let result = session.submit_documents(&files, None).await;
                spinner.finish_and_clear();
                match result {
                    Ok(report) => print_report(&report),
                    Err(e) => println!("{} {}", style("error").red(), e),
                }
            }
        }
        Some("load") => match parts.next() {
            Some(target) => {
                let dir = resolve_index_arg(session, target);
                match session.load_existing_index(&dir) {
                    Ok(report) => println!(
                        "Loaded {} document(s), {} chunk(s)",
                        report.documents, report.chunks
                    ),
                    Err(e) => println!("{} {}", style("error").red(), e),
                }
            }
            None => println!("usage: /load <name-or-path>"),
        },
        Some("clear-index") => {
            session.clear_index();
            println!("Index unbound. The saved artifact stays on disk.");
        }
        Some("status") => print_status(session),
        Some(other) => println!("unknown command: /{other}"),
        None => {}
    }
    Ok(false)
}

/// A bare name refers to an index under the configured root; anything that
/// looks like a path is used as-is
fn resolve_index_arg(session: &SessionController, arg: &str) -> PathBuf {
    let as_path = PathBuf::from(arg);
    if arg.contains(std::path::MAIN_SEPARATOR) || as_path.exists() {
        as_path
    } else {
        session.config().index.dir_for(arg)
    }
}

fn print_report(report: &IngestReport) {
    for file in &report.added {
        println!("{} {}", style("indexed").green(), file);
    }
    for file in &report.skipped {
        println!("{} {} (already indexed)", style("skipped").yellow(), file);
    }
    for (file, reason) in &report.failed {
        println!("{} {}: {}", style("failed").red(), file, reason);
    }
    if report.chunks_added > 0 {
        println!("{} chunk(s) added", report.chunks_added);
    }
    if let Some(error) = &report.persist_error {
        println!("{} index not saved: {}", style("warning").yellow(), error);
    }
}

fn print_status(session: &SessionController) {
    let status = session.status();
    if status.ready {
        let location = status
            .index_dir
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(in memory)".into());
        println!("index: {location}");
        println!("  documents: {}", status.documents);
        println!("  chunks: {}", status.chunks);
    } else {
        println!("no index bound");
    }
    println!("  conversation turns: {}", status.turns);
}

fn spinner_with_message(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Word-by-word reveal of an already complete answer
async fn reveal(text: &str) {
    for (i, word) in text.split_whitespace().enumerate() {
        if i > 0 {
            print!(" ");
        }
        print!("{word}");
        let _ = io::stdout().flush();
        tokio::time::sleep(Duration::from_millis(24)).await;
    }
    println!();
}
