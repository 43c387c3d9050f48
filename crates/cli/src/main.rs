use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vertito_core::{Pipeline, PipelineConfig, Prepared, ServiceConfig, Source, VertitoError, parse_target, prepare};

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for the result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Markup,
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markup" | "html" => Ok(Self::Markup),
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: markup, text, json", s)),
        }
    }
}

/// Extract an article and translate or transliterate it chunk by chunk
#[derive(Parser, Debug)]
#[command(name = "vertito")]
#[command(author = "Vertito Contributors")]
#[command(version)]
#[command(about = "Extract, chunk and translate articles", long_about = None)]
struct Args {
    /// Local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT", required_unless_present = "text", conflicts_with = "text")]
    input: Option<String>,

    /// Plain text to transform instead of an HTML page
    #[arg(long, value_name = "TEXT")]
    text: Option<String>,

    /// Target: a language code (hi-IN) or transliterate-<code>
    #[arg(short, long, default_value = "hi-IN", value_name = "TARGET")]
    lang: String,

    /// Output format (markup, text, json)
    #[arg(short, long, default_value = "markup", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Maximum characters per chunk
    #[arg(long, default_value = "1000", value_name = "CHARS")]
    budget: usize,

    /// Base URL of the transform API
    #[arg(long, env = "VERTITO_ENDPOINT", value_name = "URL")]
    endpoint: Option<String>,

    /// API subscription key
    #[arg(long, env = "VERTITO_API_KEY", hide_env_values = true, value_name = "KEY")]
    api_key: Option<String>,

    /// Language code of the source text
    #[arg(long, default_value = "en-IN", value_name = "CODE")]
    source_lang: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Stop after extraction and chunking; no API calls are made
    #[arg(long)]
    extract_only: bool,

    /// Emit the display markup without the wrapping <div>
    #[arg(long)]
    bare: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_filter = if verbose { "vertito_core=debug,vertito=debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))
}

/// Read the HTML source named by `input`
fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        let path = PathBuf::from(input);
        if !path.is_file() {
            return Err(VertitoError::FileNotFound(path).into());
        }
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {}", input))
    }
}

fn render_prepared(prepared: &Prepared, config: &PipelineConfig, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Markup => prepared.to_display_markup(&config.display),
        OutputFormat::Text => prepared.text.clone(),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "selection": prepared.selection.as_ref().map(|s| &s.strategy),
                "text": prepared.text,
                "segments": prepared.document.segments,
                "chunks": prepared.chunks,
            });
            serde_json::to_string_pretty(&value).context("Failed to serialize output")?
        }
    })
}

/// Cancel `token` on the first Ctrl-C
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current chunk");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let target = parse_target(&args.lang).with_context(|| format!("Invalid --lang value: {}", args.lang))?;
    let mut builder = PipelineConfig::builder().budget(args.budget).target(target);
    if args.bare {
        builder = builder.container_class(None);
    }
    let config = builder.build();

    let total = if args.extract_only { 2 } else { 3 };

    let html = match (&args.text, &args.input) {
        (None, Some(input)) => {
            if args.verbose {
                let from = if input == "-" { "stdin".to_string() } else { input.bright_white().to_string() };
                echo::print_step(1, total, &format!("Reading from {}", from));
            }
            let html = read_input(input)?;
            if args.verbose {
                eprintln!("  {} {}\n", "Size:".dimmed(), echo::format_size(html.len()).bright_white());
            }
            Some(html)
        }
        _ => None,
    };

    let source = match (&args.text, &html) {
        (Some(text), _) => Source::Text(text),
        (None, Some(html)) => Source::Html(html),
        (None, None) => anyhow::bail!("no input given; pass a file, '-' or --text"),
    };

    if args.verbose {
        echo::print_step(2, total, "Extracting and chunking content");
    }

    let prepared = prepare(source, &config);

    if args.verbose {
        echo::print_preparation(&prepared, config.budget);
    }
    if prepared.is_degraded() {
        echo::print_warning("No article region found; using the page's flat text");
    }

    let output = if args.extract_only {
        render_prepared(&prepared, &config, args.format)?
    } else {
        let Some(api_key) = args.api_key.clone().filter(|key| !key.is_empty()) else {
            anyhow::bail!("an API key is required; pass --api-key or set VERTITO_API_KEY");
        };
        let service = ServiceConfig {
            base_url: args.endpoint.clone().unwrap_or_else(|| ServiceConfig::default().base_url),
            api_key,
            source_language: args.source_lang.clone(),
            timeout: args.timeout,
            ..Default::default()
        };
        let pipeline = Pipeline::with_service(config.clone(), service).context("Failed to build the API client")?;

        if args.verbose {
            echo::print_step(3, total, &format!("Transforming to {}", config.target.to_string().bright_white()));
        }

        let cancel = CancellationToken::new();
        cancel_on_ctrl_c(cancel.clone());

        let article = match pipeline.transform(prepared, &cancel).await {
            Ok(article) => article,
            Err(VertitoError::Cancelled { completed }) => {
                echo::print_error(&format!("Cancelled after {} chunk(s)", completed));
                std::process::exit(130);
            }
            Err(e) => return Err(e).context("Transform failed"),
        };

        if args.verbose {
            echo::print_transform_summary(&article);
        }

        match args.format {
            OutputFormat::Markup => article.markup,
            OutputFormat::Text => article.text,
            OutputFormat::Json => serde_json::to_string_pretty(&article).context("Failed to serialize output")?,
        }
    };

    match args.output {
        Some(path) => {
            fs::write(&path, output)
                .map_err(VertitoError::WriteError)
                .with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
