//! `study`: vocabulary trainer on the command line.

use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use study_core::{DateRange, ItemPatch, NewItem, ReviewRecord, SelectionKind, VocabularyItem};
use study_assistant::commands::{self, CommandError, ErrorKind};
use study_assistant::config::Config;
use study_assistant::quiz::run_quiz;
use study_assistant::state::AppState;
use study_assistant::terminal::PromptAnswers;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "study", version, about = "Vocabulary trainer with spaced review")]
struct Cli {
    /// Data directory (defaults to $STUDY_DATA_DIR, then the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a word
    Add {
        term: String,
        meaning: String,
        /// Example sentence
        #[arg(long)]
        example: Option<String>,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// List all words
    List,

    /// Show one word with its review statistics
    Show { id: i64 },

    /// Search terms, meanings, examples and tags
    Search { query: String },

    /// List words carrying a tag
    Tag { tag: String },

    /// Change fields of a word
    Update {
        id: i64,
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        meaning: Option<String>,
        #[arg(long)]
        example: Option<String>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Delete a word (its review history is kept)
    Delete { id: i64 },

    /// Show the next batch of words to review
    Due {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        count: Option<u32>,
    },

    /// Quiz yourself on due words
    Quiz {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        count: Option<u32>,
    },

    /// Show study statistics
    Stats {
        /// First day of a fixed range (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Last day of a fixed range (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },

    /// Show recent reviews
    History {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Export all words and history as JSON
    Export { path: PathBuf },

    /// Import words.json/history.json from a legacy data directory
    Import { dir: PathBuf },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("study=info,study_assistant=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        let code = match e.downcast_ref::<CommandError>().map(|c| c.kind) {
            Some(ErrorKind::NotFound) => 2,
            Some(ErrorKind::InvalidArgument) | Some(ErrorKind::Conflict) => 3,
            _ => 1,
        };
        process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.data_dir);
    let (state, recovered_from) = study_assistant::open_app(&config)
        .with_context(|| format!("failed to open store in {}", config.data_dir.display()))?;
    if let Some(backup) = recovered_from {
        eprintln!(
            "Warning: the word store was unreadable and has been replaced; the old file is at {}",
            backup.display()
        );
    }

    match cli.command {
        Commands::Add {
            term,
            meaning,
            example,
            tags,
        } => {
            let mut item = NewItem::new(term, meaning).with_tags(clean_tags(tags));
            item.example = example.filter(|e| !e.trim().is_empty());
            let added = commands::add_item(&state, item)?;
            if added.created {
                println!("Added [{}] {}", added.item.id, added.item.term);
            } else {
                println!("Already stored as [{}] {}", added.item.id, added.item.term);
            }
        }
        Commands::List => print_items(&commands::list_items(&state)?, "No words yet"),
        Commands::Show { id } => print_item(&commands::get_item(&state, id)?),
        Commands::Search { query } => {
            print_items(&commands::search_items(&state, &query)?, "No matching words")
        }
        Commands::Tag { tag } => print_items(
            &commands::items_by_tag(&state, &tag)?,
            &format!("No words tagged '{tag}'"),
        ),
        Commands::Update {
            id,
            term,
            meaning,
            example,
            tags,
        } => {
            let patch = ItemPatch {
                term,
                meaning,
                example,
                tags: tags.map(|t| clean_tags(t).into_iter().collect()),
            };
            let item = commands::update_item(&state, id, patch)?;
            println!("Updated [{}] {}", item.id, item.term);
        }
        Commands::Delete { id } => {
            if commands::delete_item(&state, id)? {
                println!("Deleted word {id}");
            } else {
                println!("No word with id {id}");
            }
        }
        Commands::Due { count } => {
            let count = count.map_or(state.settings.default_quiz_size, |c| c as usize);
            let selection = commands::select_due(&state, count)?;
            if selection.kind == SelectionKind::Fallback {
                println!("Nothing is due; least-reviewed words instead:");
            }
            print_items(&selection.items, "No words yet");
        }
        Commands::Quiz { count } => quiz(&state, count)?,
        Commands::Stats { from, to } => {
            let range = match (from, to) {
                (Some(from), Some(to)) => Some(DateRange::new(from, to).map_err(CommandError::from)?),
                _ => None,
            };
            print_stats(&state, range)?;
        }
        Commands::History { limit } => print_history(&commands::get_review_history(&state, limit)?),
        Commands::Export { path } => {
            let summary = commands::export_snapshot(&state, &path)?;
            println!(
                "Exported {} words and {} reviews to {}",
                summary.items,
                summary.reviews,
                path.display()
            );
        }
        Commands::Import { dir } => {
            let imported = commands::import_legacy(&state, &dir)?;
            for warning in &imported.warnings {
                eprintln!("Warning: {warning}");
            }
            println!(
                "Imported {} words ({} already stored) and {} reviews",
                imported.summary.items_added,
                imported.summary.items_skipped,
                imported.summary.reviews_added
            );
        }
    }

    Ok(())
}

fn quiz(state: &AppState, count: Option<u32>) -> anyhow::Result<()> {
    let count = count.map_or(state.settings.default_quiz_size, |c| c as usize);
    let stdin = io::stdin();
    let mut answers = PromptAnswers::new(stdin.lock(), io::stdout());
    let report = run_quiz(state, count, &mut answers)?;

    if report.batch_size == 0 {
        println!("No words available, add some first");
        return Ok(());
    }

    let result = report.result;
    match result.accuracy() {
        Some(accuracy) => println!(
            "\nQuiz {}! Score: {}/{} ({:.1}%)",
            if report.aborted { "stopped" } else { "complete" },
            result.correct,
            result.total_asked,
            accuracy * 100.0
        ),
        None => println!("\nQuiz stopped before the first answer"),
    }
    Ok(())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn print_items(items: &[VocabularyItem], empty: &str) {
    if items.is_empty() {
        println!("{empty}");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Word", "Meaning", "Tags", "Reviews", "Next review"]);
    for item in items {
        table.add_row(vec![
            item.id.to_string(),
            item.term.clone(),
            item.meaning.clone(),
            item.tags.iter().cloned().collect::<Vec<_>>().join(", "),
            format!("{}/{}", item.progress.correct_count, item.progress.review_count),
            item.progress
                .next_review_at
                .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "now".to_string()),
        ]);
    }
    println!("{table}");
}

fn print_item(item: &VocabularyItem) {
    let when = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
    };
    println!("ID:            {}", item.id);
    println!("Word:          {}", item.term);
    println!("Meaning:       {}", item.meaning);
    if let Some(example) = &item.example {
        println!("Example:       {example}");
    }
    if !item.tags.is_empty() {
        println!("Tags:          {}", item.tags.iter().cloned().collect::<Vec<_>>().join(", "));
    }
    println!("Added:         {}", when(Some(item.created_at)).unwrap_or_default());
    println!(
        "Reviews:       {} ({} correct)",
        item.progress.review_count, item.progress.correct_count
    );
    println!(
        "Last reviewed: {}",
        when(item.progress.last_reviewed_at).unwrap_or_else(|| "never".to_string())
    );
    println!(
        "Next review:   {}",
        when(item.progress.next_review_at).unwrap_or_else(|| "now".to_string())
    );
}

fn print_stats(state: &AppState, range: Option<DateRange>) -> anyhow::Result<()> {
    let stats = commands::get_statistics(state, range)?;
    println!("Words:        {}", stats.total_words);
    println!("Reviews:      {}", stats.total_reviews);
    println!("Correct:      {}", stats.total_correct);
    println!("Accuracy:     {:.1}%", stats.accuracy_percent);
    println!("Logged:       {} reviews ({} correct)", stats.logged_reviews, stats.logged_correct);
    println!("Streak:       {} days", stats.streak_days);

    if stats.daily_stats.is_empty() {
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Reviews", "Correct", "Accuracy"]);
    // A fixed range is shown in full; otherwise the last seven active days.
    let shown = if range.is_some() { usize::MAX } else { 7 };
    for (date, day) in stats.daily_stats.iter().rev().take(shown) {
        table.add_row(vec![
            date.to_string(),
            day.total.to_string(),
            day.correct.to_string(),
            format!("{:.1}%", day.accuracy_percent()),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn print_history(history: &[ReviewRecord]) {
    if history.is_empty() {
        println!("No reviews yet");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Reviewed", "Word", "Result"]);
    for record in history {
        table.add_row(vec![
            record
                .reviewed_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            record.term.clone(),
            if record.is_correct { "✓" } else { "✗" }.to_string(),
        ]);
    }
    println!("{table}");
}
