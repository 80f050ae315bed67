mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "recall-cli", about = "Spaced repetition flashcards", version)]
struct Cli {
    /// Card store document (default: from config, then the data directory)
    #[arg(long, global = true, env = "RECALL_DATA_FILE")]
    file: Option<PathBuf>,

    /// Config file (default: <config dir>/recall/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create a card
    Add {
        /// Question side
        front: String,
        /// Answer side (use "-" to read from stdin)
        back: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Show a card and what each rating would schedule
    Show {
        /// Card ID
        id: String,
    },

    /// Edit a card's content
    Edit {
        /// Card ID
        id: String,
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        back: Option<String>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
    },

    /// Delete a card
    Rm {
        /// Card ID
        id: String,
    },

    /// List cards
    List {
        /// Only cards carrying all of these comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Show the next card to review
    Next {
        /// Only cards carrying all of these comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Rate a card: again, hard, good, easy (or 1-4)
    Review {
        /// Card ID
        id: String,
        rating: String,
        /// The answer given, kept in the review log
        #[arg(long)]
        answer: Option<String>,
    },

    /// Show a card's review history
    History {
        /// Card ID
        id: String,
    },

    /// Show review statistics
    Stats,
}

/// Resolve "-" as stdin
fn resolve_content(content: String) -> anyhow::Result<String> {
    if content == "-" {
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)?;
        Ok(buf.trim_end().to_string())
    } else {
        Ok(content)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let app = app::App::new(cli.config.as_deref(), cli.file)?;

    match cli.command {
        Command::Add { front, back, tags } => {
            let back = resolve_content(back)?;
            commands::cards::run_add(&app, front, back, tags.as_deref(), &cli.format, use_color)?;
        }
        Command::Show { id } => {
            commands::cards::run_show(&app, &id, &cli.format, use_color)?;
        }
        Command::Edit { id, front, back, tags } => {
            commands::cards::run_edit(&app, &id, front, back, tags.as_deref(), &cli.format, use_color)?;
        }
        Command::Rm { id } => {
            commands::cards::run_rm(&app, &id, &cli.format)?;
        }
        Command::List { tags } => {
            commands::cards::run_list(&app, tags.as_deref(), &cli.format, use_color)?;
        }
        Command::Next { tags } => {
            commands::review::run_next(&app, tags.as_deref(), &cli.format, use_color)?;
        }
        Command::Review { id, rating, answer } => {
            commands::review::run_review(&app, &id, &rating, answer, &cli.format, use_color)?;
        }
        Command::History { id } => {
            commands::review::run_history(&app, &id, &cli.format, use_color)?;
        }
        Command::Stats => {
            commands::review::run_stats(&app, &cli.format, use_color)?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
