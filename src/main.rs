use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value, json};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod input;
mod mcp;
mod pipeline;
mod process;
mod tools;
mod validate;

use config::Config;
use mcp::contracts;
use tools::{ToolEnv, ToolRegistry};

#[derive(Parser)]
#[command(name = "mcp-slides")]
#[command(
    version,
    about = "MCP tools for reading, editing, and exporting presentation slides"
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ConfigArgs {
    /// Interpreter used to run the automation scripts
    #[arg(long, env = "SLIDES_PYTHON", default_value = "python3", global = true)]
    python: String,
    /// Directory containing the uno_*.py automation scripts
    #[arg(long, env = "SLIDES_SCRIPTS_DIR", default_value = ".", global = true)]
    scripts_dir: PathBuf,
    /// Headless renderer used for presentation to PDF conversion
    #[arg(long, env = "SLIDES_RENDERER", default_value = "libreoffice", global = true)]
    renderer: String,
    /// Rasterizer used for PDF to JPEG conversion
    #[arg(long, env = "SLIDES_RASTERIZER", default_value = "convert", global = true)]
    rasterizer: String,
    /// Rasterizer density in DPI
    #[arg(long, env = "SLIDES_DENSITY", default_value_t = contracts::DEFAULT_DENSITY, global = true)]
    density: u32,
    /// Default directory for exported images
    #[arg(long, env = "SLIDES_OUTPUT_DIR", default_value = contracts::DEFAULT_OUTPUT_DIR, global = true)]
    output_dir: PathBuf,
    /// Kill external processes that run longer than this many seconds
    #[arg(long, env = "SLIDES_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,
}

impl From<ConfigArgs> for Config {
    fn from(args: ConfigArgs) -> Self {
        Config {
            python: args.python,
            scripts_dir: args.scripts_dir,
            renderer: args.renderer,
            rasterizer: args.rasterizer,
            density: args.density,
            output_dir: args.output_dir,
            timeout: args.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Args, Clone)]
struct PresentationArgs {
    /// Path to the presentation file
    #[arg(long)]
    path: String,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct ReadSlideArgs {
    #[command(flatten)]
    presentation: PresentationArgs,
    /// Slide number (1-based)
    #[arg(long)]
    slide: i64,
}

#[derive(Args, Clone)]
struct EditArgs {
    #[command(flatten)]
    presentation: PresentationArgs,
    /// Slide number (1-based)
    #[arg(long)]
    slide: i64,
    /// title, shape_index, shape_name, or text_replace
    #[arg(long)]
    target_type: String,
    /// Shape locator for the target type
    #[arg(long)]
    target_value: String,
    /// Replacement text
    #[arg(long)]
    new_text: String,
    /// Text to replace (text_replace only)
    #[arg(long)]
    old_text: Option<String>,
}

#[derive(Args, Clone)]
struct ExportArgs {
    #[command(flatten)]
    presentation: PresentationArgs,
    /// Only return these slides (1-based, comma separated)
    #[arg(long, value_delimiter = ',')]
    slides: Vec<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP stdio server
    Serve {
        /// Serve MCP over stdio (NDJSON)
        #[arg(long)]
        stdio: bool,
    },
    /// List slides with titles and layouts
    ListSlides(PresentationArgs),
    /// Read the shapes and text of one slide
    ReadSlide(ReadSlideArgs),
    /// Change text on one slide
    EditSlideText(EditArgs),
    /// Export slides as JPEG images
    ExportSlides(ExportArgs),
    /// Edit one slide, then export it as a JPEG preview
    EditSlideAndExport(EditArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = ToolRegistry::with_builtin_tools(ToolEnv::new(Config::from(cli.config)));
    tracing::debug!(tools = ?registry.names().collect::<Vec<_>>(), "registry ready");

    match cli.command {
        Commands::Serve { stdio } => {
            if stdio {
                run_stdio_server(&registry)
            } else {
                anyhow::bail!("only --stdio transport is supported")
            }
        }
        Commands::ListSlides(args) => {
            let map = presentation_map(&args);
            run_tool(&registry, contracts::TOOL_LIST_SLIDES, map, args.json)
        }
        Commands::ReadSlide(args) => {
            let mut map = presentation_map(&args.presentation);
            map.insert("slide_number".to_string(), json!(args.slide));
            run_tool(
                &registry,
                contracts::TOOL_READ_SLIDE,
                map,
                args.presentation.json,
            )
        }
        Commands::EditSlideText(args) => {
            let map = edit_map(&args);
            run_tool(
                &registry,
                contracts::TOOL_EDIT_SLIDE_TEXT,
                map,
                args.presentation.json,
            )
        }
        Commands::ExportSlides(args) => {
            let mut map = presentation_map(&args.presentation);
            if !args.slides.is_empty() {
                map.insert("slide_numbers".to_string(), json!(args.slides));
            }
            run_tool(
                &registry,
                contracts::TOOL_EXPORT_SLIDES,
                map,
                args.presentation.json,
            )
        }
        Commands::EditSlideAndExport(args) => {
            let map = edit_map(&args);
            run_tool(
                &registry,
                contracts::TOOL_EDIT_SLIDE_AND_EXPORT,
                map,
                args.presentation.json,
            )
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn presentation_map(args: &PresentationArgs) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("presentation_path".to_string(), json!(args.path));
    map
}

fn edit_map(args: &EditArgs) -> Map<String, Value> {
    let mut map = presentation_map(&args.presentation);
    map.insert("slide_number".to_string(), json!(args.slide));
    map.insert("target_type".to_string(), json!(args.target_type));
    map.insert("target_value".to_string(), json!(args.target_value));
    map.insert("new_text".to_string(), json!(args.new_text));
    if let Some(old_text) = &args.old_text {
        map.insert("old_text".to_string(), json!(old_text));
    }
    map
}

fn run_tool(
    registry: &ToolRegistry,
    name: &str,
    map: Map<String, Value>,
    json_output: bool,
) -> Result<()> {
    let result = registry.call(name, &Value::Object(map));
    print_tool_result(result, json_output)
}

fn print_tool_result(result: Value, json_output: bool) -> Result<()> {
    let is_error = result
        .get("isError")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);

    if is_error {
        let message = result
            .get("structuredContent")
            .and_then(|value| value.get("error"))
            .and_then(|value| value.get("message"))
            .and_then(|value| value.as_str())
            .unwrap_or("tool error");
        eprintln!("{message}");
        std::process::exit(1);
    }

    let text = result
        .get("content")
        .and_then(|value| value.as_array())
        .and_then(|arr| arr.first())
        .and_then(|value| value.get("text"))
        .and_then(|value| value.as_str())
        .unwrap_or("");

    if json_output {
        let structured: Value = serde_json::from_str(text).context("tool returned invalid JSON")?;
        let output = serde_json::to_string_pretty(&structured)?;
        println!("{output}");
        return Ok(());
    }

    println!("{text}");
    Ok(())
}

fn run_stdio_server(registry: &ToolRegistry) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let reader = stdin.lock().lines();
    let mut writer = io::BufWriter::new(stdout.lock());

    tracing::info!("serving MCP over stdio");
    for line in reader {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!("ignoring unparseable request: {err}");
                continue;
            }
        };

        if let Some(response) = mcp::handle_request(registry, &request) {
            let serialized =
                serde_json::to_string(&response).context("failed to serialize response")?;
            writeln!(writer, "{serialized}").context("failed to write response")?;
            writer.flush().context("failed to flush response")?;
        }
    }

    Ok(())
}
