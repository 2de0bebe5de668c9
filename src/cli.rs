//! Command-line surface for the `studydesk` binary.

use crate::backend::ApiClient;
use crate::ingest::{IngestOutcome, IngestionPipeline, StageOutcome};
use crate::workspace::Workspace;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Top-level argument parser.
#[derive(Parser)]
#[command(name = "studydesk", version, about = "Workspace client for ingesting documents and chatting over indexed notes")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage tabs.
    Tabs {
        #[command(subcommand)]
        action: TabAction,
    },
    /// Manage units.
    Units {
        #[command(subcommand)]
        action: UnitAction,
    },
    /// List the notes attached to a unit.
    Notes {
        /// Unit identifier.
        #[arg(long)]
        unit: String,
    },
    /// Ingest files (or directories of files) into a unit.
    Ingest {
        /// Unit whose namespace receives the documents.
        #[arg(long)]
        unit: String,
        /// Files or directories to ingest.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Semantic search across indexed text.
    Search {
        /// Free-text query.
        query: String,
        /// Number of snippets to return.
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Ask one question grounded in a unit's indexed notes.
    Ask {
        /// The question to answer.
        question: String,
        /// Unit whose indexed content grounds the answer.
        #[arg(long)]
        unit: String,
        /// Number of context snippets to retrieve.
        #[arg(long)]
        top_k: Option<usize>,
        /// Also print the context snippets the answer was grounded in.
        #[arg(long)]
        sources: bool,
    },
    /// Interactive chat session over the workspace.
    Chat {
        /// Tab to select on startup.
        #[arg(long)]
        tab: Option<String>,
        /// Unit to select on startup.
        #[arg(long)]
        unit: Option<String>,
    },
}

#[derive(Subcommand)]
enum TabAction {
    /// List all tabs.
    List,
    /// Create a tab.
    Create {
        /// Display name.
        name: String,
        /// Display color.
        #[arg(long, default_value = "#007bff")]
        color: String,
    },
    /// Rename a tab or change its color.
    Rename {
        /// Tab identifier.
        id: String,
        /// New display name.
        #[arg(long)]
        name: Option<String>,
        /// New display color.
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a tab and everything under it.
    Delete {
        /// Tab identifier.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UnitAction {
    /// List the units in a tab.
    List {
        /// Tab identifier.
        #[arg(long)]
        tab: String,
    },
    /// Create a unit.
    Create {
        /// Display name.
        name: String,
        /// Owning tab identifier.
        #[arg(long)]
        tab: String,
        /// Free-form description.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Rename a unit or change its description.
    Rename {
        /// Unit identifier.
        id: String,
        /// New display name.
        #[arg(long)]
        name: Option<String>,
        /// New description.
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a unit and its notes.
    Delete {
        /// Unit identifier.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Chat { tab, unit } => {
            let workspace = Workspace::from_env()?;
            run_chat(workspace, tab, unit).await
        }
        command => {
            let api = Arc::new(ApiClient::from_env()?);
            let top_k_fallback = crate::config::get_config().search_top_k;
            dispatch(api, top_k_fallback, command).await
        }
    }
}

async fn dispatch(
    api: Arc<ApiClient>,
    top_k_fallback: Option<usize>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Tabs { action } => run_tabs(api, action).await,
        Command::Units { action } => run_units(api, action).await,
        Command::Notes { unit } => {
            for note in api.list_notes(&unit).await? {
                println!("{}  {}  [{}]", note.id, note.title, note.extraction_method);
                if !note.summary.is_empty() {
                    println!("    {}", note.summary);
                }
            }
            Ok(())
        }
        Command::Ingest { unit, paths } => run_ingest(api, &unit, &paths).await,
        Command::Search { query, top_k } => {
            for snippet in api.search(&query, top_k.or(top_k_fallback)).await? {
                println!("- {snippet}");
            }
            Ok(())
        }
        Command::Ask {
            question,
            unit,
            top_k,
            sources,
        } => {
            let answer = api.ask(&question, &unit, top_k.or(top_k_fallback)).await?;
            println!("{}", answer.answer);
            if sources && !answer.context.is_empty() {
                println!("\nSources:");
                for snippet in &answer.context {
                    println!("- {snippet}");
                }
            }
            Ok(())
        }
        Command::Chat { .. } => unreachable!("handled above"),
    }
}

async fn run_tabs(api: Arc<ApiClient>, action: TabAction) -> anyhow::Result<()> {
    match action {
        TabAction::List => {
            for tab in api.list_tabs().await? {
                println!("{}  {}  {} ({} units)", tab.id, tab.name, tab.color, tab.unit_count);
            }
        }
        TabAction::Create { name, color } => {
            let tab = api.create_tab(&name, &color).await?;
            println!("Created tab {} ({})", tab.name, tab.id);
        }
        TabAction::Rename { id, name, color } => {
            let tab = api.update_tab(&id, name.as_deref(), color.as_deref()).await?;
            println!("Updated tab {} ({})", tab.name, tab.id);
        }
        TabAction::Delete { id, yes } => {
            if yes || confirm(&format!("Delete tab {id} and all of its units?"))? {
                api.delete_tab(&id).await?;
                println!("Deleted tab {id}");
            }
        }
    }
    Ok(())
}

async fn run_units(api: Arc<ApiClient>, action: UnitAction) -> anyhow::Result<()> {
    match action {
        UnitAction::List { tab } => {
            for unit in api.list_units(&tab).await? {
                println!(
                    "{}  {}  ({} notes, created {})",
                    unit.id,
                    unit.name,
                    unit.note_count,
                    unit.created_at.date()
                );
            }
        }
        UnitAction::Create {
            name,
            tab,
            description,
        } => {
            let unit = api.create_unit(&tab, &name, &description).await?;
            println!("Created unit {} ({})", unit.name, unit.id);
        }
        UnitAction::Rename {
            id,
            name,
            description,
        } => {
            let unit = api
                .update_unit(&id, name.as_deref(), description.as_deref())
                .await?;
            println!("Updated unit {} ({})", unit.name, unit.id);
        }
        UnitAction::Delete { id, yes } => {
            if yes || confirm(&format!("Delete unit {id} and its notes?"))? {
                api.delete_unit(&id).await?;
                println!("Deleted unit {id}");
            }
        }
    }
    Ok(())
}

async fn run_ingest(api: Arc<ApiClient>, unit: &str, paths: &[PathBuf]) -> anyhow::Result<()> {
    let pipeline = IngestionPipeline::new(api);

    for file in collect_files(paths) {
        let bytes = std::fs::read(&file)?;
        let filename = file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        match pipeline
            .ingest_document(bytes, filename, mime_for_path(&file), unit)
            .await
        {
            Ok(outcome) => report_outcome(&outcome),
            Err(error) => println!("✗ {}: {error}", file.display()),
        }
    }

    let snapshot = pipeline.metrics_snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn run_chat(
    mut workspace: Workspace,
    tab: Option<String>,
    unit: Option<String>,
) -> anyhow::Result<()> {
    workspace.load_tabs().await?;
    if let Some(tab) = tab {
        workspace.select_tab(&tab).await?;
    }
    if let Some(unit) = unit {
        workspace.select_unit(&unit).await?;
    }

    println!("Type a question, :help for commands, :quit to exit.");
    let stdin = io::stdin();
    loop {
        let unit = workspace.active_unit_id().unwrap_or("-").to_string();
        print!("{unit}> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" || line == ":q" {
            break;
        }
        if line.starts_with(':') {
            chat_command(&mut workspace, line).await;
            continue;
        }

        match workspace.send_message(line).await {
            Ok(answer) => println!("{answer}"),
            Err(error) => println!("error: {error}"),
        }
    }
    Ok(())
}

async fn chat_command(workspace: &mut Workspace, line: &str) {
    let (command, arg) = match line.split_once(' ') {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    let result = match command {
        ":help" => {
            println!(":tab <id>    select a tab");
            println!(":unit <id>   select a unit");
            println!(":tabs        list tabs");
            println!(":units       list units in the active tab");
            println!(":notes       list notes in the active unit");
            println!(":upload <p>  ingest a file into the active unit");
            println!(":quit        exit");
            Ok(())
        }
        ":tabs" => {
            for tab in workspace.tabs() {
                println!("{}  {}", tab.id, tab.name);
            }
            Ok(())
        }
        ":units" => {
            for unit in workspace.units() {
                println!("{}  {}", unit.id, unit.name);
            }
            Ok(())
        }
        ":notes" => {
            for note in workspace.notes() {
                println!("{}  {}", note.id, note.title);
            }
            Ok(())
        }
        ":tab" => workspace.select_tab(arg).await,
        ":unit" => workspace.select_unit(arg).await,
        ":upload" => {
            let path = Path::new(arg);
            match std::fs::read(path) {
                Ok(bytes) => {
                    let filename = path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .unwrap_or_default();
                    workspace
                        .upload_document(bytes, filename, mime_for_path(path))
                        .await
                        .map(|outcome| report_outcome(&outcome))
                }
                Err(error) => {
                    println!("error: {error}");
                    Ok(())
                }
            }
        }
        other => {
            println!("unknown command {other}; try :help");
            Ok(())
        }
    };

    if let Err(error) = result {
        println!("error: {error}");
    }
}

fn report_outcome(outcome: &IngestOutcome) {
    println!(
        "✓ {} ({}) into {}",
        outcome.file_name, outcome.extraction_method, outcome.unit_id
    );
    match &outcome.indexing {
        StageOutcome::Failed(error) => println!("  warning: indexing failed: {error}"),
        StageOutcome::Skipped { reason } => println!("  note: indexing skipped: {reason}"),
        StageOutcome::Completed => {}
    }
    if let StageOutcome::Failed(error) = &outcome.persistence {
        println!("  warning: note persistence failed: {error}");
    }
}

fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
            {
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn mime_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        Some(ext) if ext.eq_ignore_ascii_case("txt") => "text/plain",
        Some(ext) if ext.eq_ignore_ascii_case("md") => "text/markdown",
        _ => "application/octet-stream",
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
