//! markup: convert between Telegram markup and (text, entities) JSON.
//!
//! ```text
//! markup [--html | --markdown | --syntax NAME] [--no-custom-emoji] parse   [FILE]
//! markup [--html | --markdown | --syntax NAME] [--no-custom-emoji] unparse [FILE]
//! ```
//!
//! `parse` reads markup and prints `{"text": …, "entities": […]}`;
//! `unparse` reads that document and prints markup. Input comes from FILE,
//! or stdin when absent or `-`. The syntax defaults to `$MARKUP_SYNTAX`,
//! then HTML. Flags may also follow the command.
//!
//! Logging: `RUST_LOG=layer_markup=trace markup parse …`

use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use layer_markup::{MessageEntity, Options, Syntax};
use serde::{Deserialize, Serialize};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("layer_markup=info,markup=info"),
    )
    .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let input = read_input(cli.input())?;
    let output = execute(cli, &input)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => {
            log::debug!("[markup] reading {}", path.display());
            Ok(std::fs::read_to_string(path)?)
        }
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Runs the command on `input`, returning what should be printed.
fn execute(cli: &Cli, input: &str) -> Result<String, CliError> {
    let syntax = cli.syntax();
    let markup = syntax.markup(cli.options());
    match cli.command {
        Command::Parse { .. } => {
            let (text, entities) = markup.parse(input);
            log::info!("[markup] parsed {} entities from {syntax} input", entities.len());
            Ok(serde_json::to_string_pretty(&Document { text, entities })?)
        }
        Command::Unparse { .. } => {
            let doc: Document = serde_json::from_str(input)?;
            log::info!("[markup] rendering {} entities as {syntax}", doc.entities.len());
            Ok(markup.unparse(&doc.text, &doc.entities))
        }
    }
}

// ─── JSON document ────────────────────────────────────────────────────────────

/// `{"text": "...", "entities": [{"offset": 0, "length": 5, "type": "bold"}]}`
#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Document {
    text: String,
    #[serde(default)]
    entities: Vec<MessageEntity>,
}

// ─── Arguments ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "markup", version, about = "Telegram markup ⇄ (text, entities) JSON", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Markup syntax: html or markdown (md)
    #[arg(long, global = true, env = "MARKUP_SYNTAX", default_value_t = Syntax::Html)]
    syntax: Syntax,

    /// Shorthand for --syntax html
    #[arg(long, global = true, conflicts_with = "markdown")]
    html: bool,

    /// Shorthand for --syntax markdown
    #[arg(long, global = true, visible_alias = "md")]
    markdown: bool,

    /// Neither recognise nor emit custom emoji
    #[arg(long, global = true)]
    no_custom_emoji: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Markup to {"text", "entities"} JSON
    Parse {
        /// Input file; stdin when absent or `-`
        file: Option<PathBuf>,
    },
    /// {"text", "entities"} JSON to markup
    Unparse {
        /// Input file; stdin when absent or `-`
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// `--html` and `--markdown` win over `--syntax` and the environment.
    fn syntax(&self) -> Syntax {
        if self.html {
            Syntax::Html
        } else if self.markdown {
            Syntax::Markdown
        } else {
            self.syntax
        }
    }

    fn options(&self) -> Options {
        if self.no_custom_emoji { Options::without_custom_emoji() } else { Options::default() }
    }

    fn input(&self) -> Option<&Path> {
        let (Command::Parse { file } | Command::Unparse { file }) = &self.command;
        file.as_deref().filter(|p| *p != Path::new("-"))
    }
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum CliError {
    /// Reading input or writing output failed.
    Io(io::Error),
    /// The input of `unparse` is not a valid document.
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e)   => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "invalid document: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e)   => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self { Self::Io(e) }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e) }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
