use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use jrnl::vault::codec::format_timestamp;
use jrnl::{logger, Addressing, EntryAnalyzer, SearchEngine, Settings, Vault};
use tracing::info;

#[derive(Parser)]
#[command(name = "jrnl")]
#[command(about = "Local-first Markdown journal")]
struct Cli {
    #[arg(short, long, default_value = "config/jrnl.toml")]
    config: String,

    #[arg(short, long)]
    vault_path: Option<PathBuf>,

    #[arg(long)]
    addressing: Option<Addressing>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the vault directory and marker file
    Init,
    /// Write a new entry
    New {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// List entries, newest first
    List,
    /// Print one entry
    Show { address: String },
    /// Replace the title and/or content of an entry
    Edit {
        address: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Remove an entry file
    Delete { address: String },
    /// Rank entries against a query
    Search { query: String },
    /// Writing statistics for the whole vault
    Stats {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;

    logger::init(&settings.logging)?;

    info!("Starting jrnl v{}", env!("CARGO_PKG_VERSION"));

    let vault_path = cli.vault_path.unwrap_or(settings.vault.path);
    let addressing = cli.addressing.unwrap_or(settings.vault.addressing);

    if let Command::Init = cli.command {
        Vault::create_vault(&vault_path)?;
        println!("Vault ready at {}", vault_path.display());
        return Ok(());
    }

    let mut vault = Vault::with_addressing(addressing);
    vault
        .open(&vault_path)
        .with_context(|| format!("Failed to open vault {}", vault_path.display()))?;

    let result = run_command(&vault, cli.command);
    vault.close();
    result
}

fn run_command(vault: &Vault, command: Command) -> anyhow::Result<()> {
    let store = vault.require_store()?;

    match command {
        Command::Init => {}
        Command::New { title, content } => {
            let entry = store.create(&title, &content)?;
            println!("{}", entry.location().unwrap_or_default());
        }
        Command::List => {
            for entry in store.load_all() {
                println!(
                    "{}\t{}\t{}",
                    entry.location().unwrap_or_default(),
                    format_timestamp(entry.modified()),
                    display_title(entry.title())
                );
            }
        }
        Command::Show { address } => {
            if !store.exists(&address) {
                bail!("No entry at {}", address);
            }
            let entry = store.try_load(&address)?;
            println!("# {}\n", display_title(entry.title()));
            println!("{}", entry.content());
        }
        Command::Edit {
            address,
            title,
            content,
        } => {
            let mut entry = store.try_load(&address)?;
            if let Some(title) = title {
                entry.set_title(title);
            }
            if let Some(content) = content {
                entry.set_content(content);
            }
            store.save(&mut entry)?;
            println!("Saved {}", address);
        }
        Command::Delete { address } => {
            store.delete(&address)?;
            println!("Deleted {}", address);
        }
        Command::Search { query } => {
            let entries = store.load_all();
            for result in SearchEngine::new().rank(&entries, &query) {
                println!(
                    "{:>5}\t{}\t{}",
                    result.score,
                    result.entry.location().unwrap_or_default(),
                    display_title(result.entry.title())
                );
            }
        }
        Command::Stats { json } => {
            let analyzer = EntryAnalyzer::new()?;
            let summary = analyzer.summarize(&store.load_all());
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Vault: {}", vault.name());
                println!("Total entries: {}", summary.total_entries);
                println!("Total words: {}", summary.total_words);
                println!("Average words per entry: {:.1}", summary.average_words);
                for (month, count) in &summary.entries_by_month {
                    println!("  {}: {} entries", month, count);
                }
                for word in &summary.top_words {
                    println!("  {}: {} times", word.word, word.count);
                }
            }
        }
    }

    Ok(())
}

fn display_title(title: &str) -> &str {
    if title.is_empty() {
        "Untitled"
    } else {
        title
    }
}
