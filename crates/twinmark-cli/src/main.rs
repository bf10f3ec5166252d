use std::path::{Path, PathBuf};
use std::process::Stdio;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use twinmark_common::telemetry::{self, TelemetryConfig};
use twinmark_common::{FileStore, Preferences};
use twinmark_core::{DiagramError, DiagramRenderer, DocumentStats, RenderPipeline, to_text};
use twinmark_sync::host::{EntryKind, TreeEntry, read_directory_tree};

#[derive(Parser)]
#[command(version, about = "twinmark - markdown with an editable preview", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Preferences file (.toml or .json)
    #[arg(long, global = true, env = "TWINMARK_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown file to preview HTML
    Render {
        file: PathBuf,

        /// Command that reads diagram source on stdin and writes SVG to stdout
        #[arg(long)]
        diagram_cmd: Option<String>,
    },
    /// Render a file and convert it back, printing what a preview edit would write
    Normalize {
        file: PathBuf,

        /// Overwrite the file instead of printing
        #[arg(long)]
        in_place: bool,
    },
    /// List the markdown documents under a directory
    Tree { dir: PathBuf },
    /// Word, character and line counts
    Stats { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();

    let mut config = TelemetryConfig::from_env("twinmark");
    if cli.verbose {
        config = config.with_level(tracing::Level::DEBUG);
    }
    telemetry::init(config);

    let prefs = load_preferences(cli.config.as_deref()).await;

    match cli.command {
        Commands::Render { file, diagram_cmd } => render(&file, diagram_cmd, &prefs).await?,
        Commands::Normalize { file, in_place } => normalize(&file, in_place, &prefs).await?,
        Commands::Tree { dir } => tree(&dir)?,
        Commands::Stats { file } => stats(&file).await?,
    }

    Ok(())
}

async fn load_preferences(path: Option<&Path>) -> Preferences {
    let store = match path {
        Some(path) => Some(FileStore::new(path)),
        None => FileStore::default_location(),
    };
    match store {
        Some(store) => Preferences::load_or_default(&store).await,
        None => Preferences::default(),
    }
}

async fn read_source(file: &Path) -> Result<String> {
    tokio::fs::read_to_string(file)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {}", file.display()))
}

async fn render(file: &Path, diagram_cmd: Option<String>, prefs: &Preferences) -> Result<()> {
    let text = read_source(file).await?;
    let diagrams = match diagram_cmd.as_deref() {
        Some(cmd) => Some(CommandDiagramRenderer::parse(cmd)?),
        None => None,
    };
    let mut pipeline = RenderPipeline::new(&prefs.render).with_diagram_renderer(diagrams);
    let tree = pipeline.render(&text).await;
    print!("{}", tree.to_html());
    Ok(())
}

async fn normalize(file: &Path, in_place: bool, prefs: &Preferences) -> Result<()> {
    let text = read_source(file).await?;
    let mut pipeline = RenderPipeline::new(&prefs.render);
    let normalized = to_text(&pipeline.render(&text).await);

    if !in_place {
        print!("{normalized}");
        return Ok(());
    }
    if normalized.trim() == text.trim() {
        println!("✓ {} is already normalized", file.display());
        return Ok(());
    }
    tokio::fs::write(file, &normalized).await.into_diagnostic()?;
    println!("✓ Rewrote {}", file.display());
    Ok(())
}

fn tree(dir: &Path) -> Result<()> {
    let entries = read_directory_tree(dir)?;
    println!("{}", dir.display());
    print_entries(&entries, 1);
    Ok(())
}

fn print_entries(entries: &[TreeEntry], depth: usize) {
    for entry in entries {
        let indent = "  ".repeat(depth);
        match entry.kind {
            EntryKind::Directory => {
                println!("{indent}{}/", entry.name);
                print_entries(&entry.children, depth + 1);
            }
            EntryKind::File if entry.is_document() => println!("{indent}{}", entry.name),
            EntryKind::File => {}
        }
    }
}

async fn stats(file: &Path) -> Result<()> {
    let text = read_source(file).await?;
    println!("{}", DocumentStats::compute(&text));
    Ok(())
}

/// Renders diagrams by piping their source through an external program.
#[derive(Debug, Clone)]
struct CommandDiagramRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandDiagramRenderer {
    fn parse(cmd: &str) -> Result<Self> {
        let mut words = cmd.split_whitespace().map(str::to_owned);
        let program = words
            .next()
            .ok_or_else(|| miette::miette!("--diagram-cmd must name a program"))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

impl DiagramRenderer for CommandDiagramRenderer {
    async fn render(&self, source: &str, id: &str) -> Result<String, DiagramError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("TWINMARK_DIAGRAM_ID", id)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DiagramError::new(format!("{}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .await
                .map_err(|e| DiagramError::new(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DiagramError::new(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("{} exited with {}", self.program, output.status),
                stderr => stderr.to_owned(),
            };
            return Err(DiagramError::new(message));
        }
        String::from_utf8(output.stdout).map_err(|_| DiagramError::new("output is not UTF-8"))
    }
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
