//! quire - typeset Markdown posts

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use serde::Serialize;

use quire_core::{Diagnostics, QuireError};
use quire_typography::{Document, Options, TocEntry, typeset_document};

#[derive(Parser)]
#[command(name = "quire")]
#[command(version, about = "Typeset Markdown posts", long_about = None)]
#[command(after_help = "EXAMPLES:
    quire post.md                     Print typeset HTML
    quire -o public posts/*.md        Write public/<name>.html for each post
    quire --format json post.md       Print the document as JSON
    quire --config quire.json post.md Use typography options from a file")]
struct Cli {
    /// Markdown files
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Write one file per input here instead of printing to stdout
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// JSON file with typography options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Suppress warnings and progress messages
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Html,
    Json,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Json => "json",
        }
    }
}

/// JSON output for one document.
#[derive(Serialize)]
struct JsonOutput<'a> {
    source: String,
    title: Option<&'a str>,
    headings: &'a [TocEntry],
    html: String,
    warnings: Vec<String>,
}

struct Rendered {
    document: Document,
    warnings: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "error" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let options = match load_options(cli.config.as_deref()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(dir) = &cli.out_dir
        && let Err(e) = fs::create_dir_all(dir)
    {
        eprintln!("error: {}: {e}", dir.display());
        return ExitCode::FAILURE;
    }

    let results: Vec<Result<Rendered, QuireError>> = cli
        .inputs
        .par_iter()
        .map(|path| render_file(path, &options))
        .collect();

    let mut failed = 0usize;
    for (path, result) in cli.inputs.iter().zip(results) {
        let written = result.and_then(|rendered| write_output(path, &rendered, &cli));
        if let Err(e) = written {
            eprintln!("error: {}: {e}", path.display());
            failed += 1;
        }
    }

    if !cli.quiet && cli.out_dir.is_some() {
        eprintln!(
            "{} rendered, {} failed",
            cli.inputs.len() - failed,
            failed
        );
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn load_options(path: Option<&Path>) -> Result<Options, String> {
    let Some(path) = path else {
        return Ok(Options::default());
    };
    let json = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_str(&json).map_err(|e| format!("{}: {e}", path.display()))
}

fn render_file(path: &Path, options: &Options) -> Result<Rendered, QuireError> {
    let input = fs::read_to_string(path)?;
    let mut diagnostics = Diagnostics::for_source(path.display().to_string());
    let document = typeset_document(&input, options, &mut diagnostics)?;
    log::debug!(
        "{}: {} headings, {} warnings",
        path.display(),
        document.headings.len(),
        diagnostics.count()
    );
    Ok(Rendered {
        document,
        warnings: diagnostics
            .warnings()
            .iter()
            .map(ToString::to_string)
            .collect(),
    })
}

fn write_output(path: &Path, rendered: &Rendered, cli: &Cli) -> Result<(), QuireError> {
    let html = rendered.document.to_html();
    let body = match cli.format {
        Format::Html => html,
        Format::Json => {
            let output = JsonOutput {
                source: path.display().to_string(),
                title: rendered.document.title.as_deref(),
                headings: &rendered.document.headings,
                html,
                warnings: rendered.warnings.clone(),
            };
            serde_json::to_string_pretty(&output)
                .map_err(|e| QuireError::Internal(e.to_string()))?
        }
    };

    match &cli.out_dir {
        Some(dir) => {
            let mut name = path.file_stem().unwrap_or(path.as_os_str()).to_os_string();
            name.push(".");
            name.push(cli.format.extension());
            let target = dir.join(name);
            fs::write(&target, body)?;
            log::debug!("wrote {}", target.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{body}")?;
        }
    }
    Ok(())
}
