//! # Prism - Rainbow Brackets for the Terminal
//!
//! Highlights a file's brackets by nesting level and prints the result.
//!
//! ## Quick Start
//!
//! ```bash
//! # Print a file with colored brackets
//! cargo run -- path/to/file.rs
//!
//! # Dump the matched pairs as JSON
//! cargo run -- --json path/to/file.rs
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use prism_buffer::Position;
use prism_core::{Color, Config, Document, DocumentId, Editor, HighlightState, Theme};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prism - nesting-aware bracket colorization
#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to highlight
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Color theme override
    #[arg(short, long, value_enum)]
    theme: Option<ThemeArg>,

    /// Language override (e.g. rust, python)
    #[arg(short, long)]
    language: Option<String>,

    /// Also match brackets inside comments and strings
    #[arg(long)]
    no_skip: bool,

    /// Print matched pairs as JSON instead of colored text
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

/// One matched pair in the JSON report.
#[derive(Debug, Serialize)]
struct PairReport {
    kind: &'static str,
    level: usize,
    open: Position,
    close: Position,
    color: String,
}

/// JSON report for a whole file.
#[derive(Debug, Serialize)]
struct Report {
    file: String,
    language: Option<String>,
    pairs: Vec<PairReport>,
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Prism v{}", env!("CARGO_PKG_VERSION"));

    let config = build_config(&args);
    let mut editor = Editor::with_config(config);

    let id = open(&mut editor, &args)?;
    if let HighlightState::Suppressed(reason) = editor.highlight_state(id) {
        tracing::warn!("No highlights for {}: {}", args.file.display(), reason);
    }

    if args.json {
        let report = report(&editor, id)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render(&editor, id)?);
    }

    Ok(())
}

/// Loads settings and applies command line overrides.
fn build_config(args: &Args) -> Config {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load {}: {}, using defaults", path.display(), e);
            Config::default()
        }),
        None => Config::load(),
    };

    if let Some(theme) = args.theme {
        config.colors.theme = theme.into();
    }
    if args.no_skip {
        config.skip_non_structural = false;
    }
    config
}

fn open(editor: &mut Editor, args: &Args) -> anyhow::Result<DocumentId> {
    match &args.language {
        None => editor
            .open_file(&args.file)
            .with_context(|| format!("Failed to open {}", args.file.display())),
        Some(language) => {
            let doc = Document::from_file(&args.file)
                .with_context(|| format!("Failed to open {}", args.file.display()))?;
            let text = doc.text().into_owned();
            let mut replacement = Document::new(&text)
                .with_language(language.as_str())
                .with_path(&args.file);
            replacement.set_binary(doc.is_binary());
            Ok(editor.open_document(replacement))
        }
    }
}

/// Builds the JSON report for a highlighted document.
fn report(editor: &Editor, id: DocumentId) -> anyhow::Result<Report> {
    let doc = editor.document(id)?;
    let ramp = editor.config().ramp();

    let mut pairs = Vec::new();
    for m in editor.matches(id) {
        pairs.push(PairReport {
            kind: m.kind.name(),
            level: m.level,
            open: doc.buffer().char_idx_to_position(m.open)?,
            close: doc.buffer().char_idx_to_position(m.close)?,
            color: ramp.color_for(m.level).to_string(),
        });
    }

    Ok(Report {
        file: doc.path().map(|p| p.display().to_string()).unwrap_or_default(),
        language: doc.language().map(str::to_string),
        pairs,
    })
}

/// Renders the document text with ANSI-colored brackets.
fn render(editor: &Editor, id: DocumentId) -> anyhow::Result<String> {
    const BOLD: &str = "\x1b[1m";
    const RESET: &str = "\x1b[0m";

    let colors: HashMap<usize, (Color, bool)> = editor
        .decorations(id)
        .into_iter()
        .map(|d| (d.range.start, (d.color, d.bold)))
        .collect();

    let text = editor.document(id)?.text();
    let mut out = String::with_capacity(text.len() + colors.len() * 24);
    for (offset, c) in text.chars().enumerate() {
        match colors.get(&offset) {
            Some((color, bold)) => {
                if *bold {
                    out.push_str(BOLD);
                }
                out.push_str(&color.ansi_fg());
                out.push(c);
                out.push_str(RESET);
            }
            None => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["prism", "main.rs"]);
        assert_eq!(args.file, PathBuf::from("main.rs"));
        assert!(!args.json);
        assert!(!args.no_skip);
        assert!(args.theme.is_none());
    }

    #[test]
    fn test_args_with_overrides() {
        let args = Args::parse_from([
            "prism", "--theme", "light", "--no-skip", "--json", "-vv", "lib.py",
        ]);
        assert_eq!(args.theme, Some(ThemeArg::Light));
        assert_eq!(args.verbose, 2);

        let dir = tempfile::tempdir().unwrap();
        let mut args = args;
        args.config = Some(dir.path().join("missing.toml"));
        let config = build_config(&args);
        assert_eq!(config.colors.theme, Theme::Light);
        assert!(!config.skip_non_structural);
    }

    #[test]
    fn test_render_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.txt");
        std::fs::write(&path, "a(b)\n[c(d[e])]").unwrap();

        let mut editor = Editor::new();
        let id = editor.open_file(&path).unwrap();

        let out = render(&editor, id).unwrap();
        assert!(out.starts_with("a\x1b[1m\x1b[38;2;"));
        assert_eq!(out.matches("\x1b[0m").count(), 8);

        // Closing order: (b), [e], (d[e]), [c(d[e])]
        let report = report(&editor, id).unwrap();
        assert_eq!(report.pairs.len(), 4);
        assert_eq!(report.pairs[3].kind, "square");
        assert_eq!(report.pairs[3].open, Position::new(1, 0));
        let levels: Vec<_> = report.pairs.iter().map(|p| p.level).collect();
        assert_eq!(levels, vec![0, 1, 0, 0]);
        assert_eq!(report.pairs[0].color, "#DC5A96");
        assert_eq!(report.pairs[1].color, "#375ABE");
        assert_eq!(report.pairs[2].color, "#DC5A96");
    }
}
