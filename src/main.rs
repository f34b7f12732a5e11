use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use notetoc::host::{PanelView, RenderTarget, TocPanel};
use notetoc::outline::{OutlineBuilder, Toc};
use notetoc::read::{self, FileSource};
use notetoc::{format, mcp, render, watch, Config, TocError};

/// Clickable table of contents for Markdown notes.
#[derive(Parser)]
#[command(name = "notetoc", version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Notes to outline. Directories are searched for Markdown files.
    paths: Vec<PathBuf>,

    /// Output format.
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Config file. Defaults to ./notetoc.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print shell completions and exit.
    #[arg(long, value_enum)]
    completions: Option<clap_complete::Shell>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Re-render the outline every time the note changes.
    Watch {
        file: PathBuf,
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Serve outlines over JSON-RPC on stdin/stdout.
    Mcp,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
    Json,
    /// Standalone HTML page with the click script.
    Page,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("NOTETOC_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "notetoc", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TocError> {
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Some(Command::Mcp) => mcp::run(config).map_err(|e| TocError::from_io("<stdio>", e)),
        Some(Command::Watch { file, format }) => {
            let printer = Printer { format, config: config.clone() };
            let panel = TocPanel::new(FileSource::new(Some(file.clone())), printer);
            watch::watch(&file, &panel, Duration::from_millis(config.debounce_ms))
        }
        None => outline_paths(&cli.paths, cli.format, &config),
    }
}

/// Outline every document in parallel, print in input order.
fn outline_paths(paths: &[PathBuf], fmt: OutputFormat, config: &Config) -> Result<(), TocError> {
    if paths.is_empty() {
        return Err(TocError::InvalidArgs(
            "no notes given (try `notetoc README.md`)".into(),
        ));
    }

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(read::markdown_files(path));
        } else {
            files.push(path.clone());
        }
    }

    let rendered: Vec<Result<String, TocError>> = files
        .par_iter()
        .map(|path| -> Result<String, TocError> {
            let body = read::read_document(path)?;
            let toc = Toc::from_document(Some(body.as_str()), &mut OutlineBuilder::new());
            Ok(present(path, &toc, fmt, config, files.len() > 1))
        })
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for result in rendered {
        let text = result?;
        let _ = writeln!(out, "{text}");
    }
    Ok(())
}

fn present(path: &Path, toc: &Toc, fmt: OutputFormat, config: &Config, with_header: bool) -> String {
    let body = render_view(toc, fmt, config);
    match fmt {
        OutputFormat::Text if with_header => {
            format!("{}\n\n{body}", format::outline_header(path, toc.entries().len()))
        }
        _ => body,
    }
}

fn render_view(toc: &Toc, fmt: OutputFormat, config: &Config) -> String {
    match fmt {
        OutputFormat::Text => format::render_text(toc, config),
        OutputFormat::Html => render::render_html(toc, config),
        OutputFormat::Json => format::render_json(toc),
        OutputFormat::Page => render::render_page(toc, config),
    }
}

/// Watch-mode render target: reprint the whole view on every pass.
struct Printer {
    format: OutputFormat,
    config: Config,
}

impl RenderTarget for Printer {
    fn render(&self, view: &PanelView) {
        let text = match view {
            PanelView::Loading => render::render_loading(&self.config),
            PanelView::Toc(toc) => render_view(toc, self.format, &self.config),
        };
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}
