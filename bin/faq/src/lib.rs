//! FAQ knowledge base maintenance.
//!
//! `list` prints every entry; `add` appends one and writes the file back.
//! The database path defaults to the server's, and honours the same
//! `TRIAGE__FAQ_DATABASE_PATH` variable.

use clap::{Parser, Subcommand};
use rootcause::prelude::{Report, ResultExt};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use triage_agents::FaqDatabase;
use triage_core::Category;

/// Answers longer than this are cut short by `list`.
const LIST_ANSWER_CHARS: usize = 100;

#[derive(Debug, Parser)]
#[command(name = "triage-faq")]
#[command(about = "Maintain the FAQ knowledge base used by the triage server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// FAQ database file
    #[arg(
        long,
        global = true,
        env = "TRIAGE__FAQ_DATABASE_PATH",
        default_value = "data/faq_database.json"
    )]
    pub path: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every entry
    List,

    /// Append an entry
    Add {
        /// Question as customers ask it
        #[arg(long)]
        question: String,

        /// Canned answer
        #[arg(long)]
        answer: String,

        /// TECHNICAL, BILLING or GENERAL
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
    },
}

fn parse_category(raw: &str) -> Result<Category, String> {
    match Category::parse(raw) {
        Some(Category::Unknown) | None => Err(format!(
            "'{raw}' is not one of TECHNICAL, BILLING, GENERAL"
        )),
        Some(category) => Ok(category),
    }
}

/// Failures of a maintenance command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaqToolError {
    /// The database could not be loaded.
    Load,
    /// The database could not be written back.
    Save,
    /// The new entry had a blank question or answer.
    BlankField { field: &'static str },
    /// Output could not be written.
    Output,
}

impl fmt::Display for FaqToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "failed to load FAQ database"),
            Self::Save => write!(f, "failed to save FAQ database"),
            Self::BlankField { field } => write!(f, "{field} must not be blank"),
            Self::Output => write!(f, "failed to write output"),
        }
    }
}

impl std::error::Error for FaqToolError {}

/// Runs `cli`, writing human-readable output to `out`.
///
/// # Errors
///
/// Returns a [`FaqToolError`] naming the step that failed.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<(), Report<FaqToolError>> {
    let mut database = FaqDatabase::load(&cli.path).context(FaqToolError::Load)?;

    match cli.command {
        Command::List => {
            writeln!(out, "{} entries in {}", database.len(), cli.path.display())
                .context(FaqToolError::Output)?;
            for (index, faq) in database.faqs.iter().enumerate() {
                let category = faq.category.as_deref().unwrap_or("-");
                writeln!(out, "\n[{}] {category}", index + 1).context(FaqToolError::Output)?;
                writeln!(out, "Q: {}", faq.question).context(FaqToolError::Output)?;
                writeln!(out, "A: {}", shorten(&faq.answer)).context(FaqToolError::Output)?;
            }
        }
        Command::Add {
            question,
            answer,
            category,
        } => {
            let question = non_blank(question, "question")?;
            let answer = non_blank(answer, "answer")?;
            database.add_entry(question, answer, category.map(|c| c.as_str().to_string()));
            database.save(&cli.path).context(FaqToolError::Save)?;
            info!(path = %cli.path.display(), entries = database.len(), "added FAQ entry");
            writeln!(
                out,
                "Added entry #{} to {}",
                database.len(),
                cli.path.display()
            )
            .context(FaqToolError::Output)?;
        }
    }

    Ok(())
}

fn non_blank(value: String, field: &'static str) -> Result<String, Report<FaqToolError>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FaqToolError::BlankField { field }.into());
    }
    Ok(trimmed.to_string())
}

fn shorten(answer: &str) -> String {
    match answer.char_indices().nth(LIST_ANSWER_CHARS) {
        Some((cut, _)) => format!("{}...", &answer[..cut]),
        None => answer.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("triage-faq").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    fn run_to_string(cli: Cli) -> String {
        let mut out = Vec::new();
        run(cli, &mut out).expect("command succeeds");
        String::from_utf8(out).expect("utf-8 output")
    }

    #[test]
    fn add_creates_database_and_list_shows_it() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("faq.json");
        let path_arg = path.to_str().expect("utf-8 path");

        let added = run_to_string(cli(&[
            "add",
            "--path",
            path_arg,
            "--question",
            "How do I update my card?",
            "--answer",
            "Go to Billing > Payment methods.",
            "--category",
            "billing",
        ]));
        assert!(added.starts_with("Added entry #1"));

        let database = FaqDatabase::load(&path).expect("load");
        assert_eq!(database.len(), 1);
        assert_eq!(database.faqs[0].category.as_deref(), Some("BILLING"));

        let listing = run_to_string(cli(&["list", "--path", path_arg]));
        assert!(listing.starts_with("1 entries in"));
        let entry = "[1] BILLING\nQ: How do I update my card?\nA: Go to Billing";
        assert!(listing.contains(entry));
    }

    #[test]
    fn add_appends_to_existing_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("faq.json");
        let mut database = FaqDatabase::default();
        database.add_entry("Existing?", "Yes.", None);
        database.save(&path).expect("save");

        let path_arg = path.to_str().expect("utf-8 path");
        run_to_string(cli(&[
            "add",
            "--path",
            path_arg,
            "--question",
            "  Second?  ",
            "--answer",
            "Also yes.",
        ]));

        let database = FaqDatabase::load(&path).expect("load");
        assert_eq!(database.len(), 2);
        assert_eq!(database.faqs[0].question, "Existing?");
        assert_eq!(database.faqs[1].question, "Second?");
        assert_eq!(database.faqs[1].category, None);
    }

    #[test]
    fn blank_answer_is_rejected_without_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("faq.json");

        let report = run(
            cli(&[
                "add",
                "--path",
                path.to_str().expect("utf-8 path"),
                "--question",
                "Anything?",
                "--answer",
                "   ",
            ]),
            &mut Vec::new(),
        )
        .unwrap_err();

        assert_eq!(
            report.current_context(),
            &FaqToolError::BlankField { field: "answer" }
        );
        assert!(!path.exists());
    }

    #[test]
    fn unknown_category_is_rejected_by_the_parser() {
        let result = Cli::try_parse_from([
            "triage-faq",
            "add",
            "--question",
            "q",
            "--answer",
            "a",
            "--category",
            "UNKNOWN",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_database_fails_to_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("faq.json");
        std::fs::write(&path, "{ not json").expect("write");

        let report = run(
            cli(&["list", "--path", path.to_str().expect("utf-8 path")]),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert_eq!(report.current_context(), &FaqToolError::Load);
    }

    #[test]
    fn long_answers_are_shortened_in_listings() {
        let answer = "x".repeat(LIST_ANSWER_CHARS + 20);
        let short = shorten(&answer);
        assert_eq!(short.len(), LIST_ANSWER_CHARS + 3);
        assert!(short.ends_with("..."));
        assert_eq!(shorten("short"), "short");
    }
}
