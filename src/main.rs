use agent_stream_parser::{
    ParserConfig, ParserError, StreamAssembler, StructuredParser, ToolExecution,
    chart::{self, detect},
    metrics::PARSE_METRICS,
    models::StreamEnvelope,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing_subscriber::EnvFilter;

/// agent-stream-parser - Structured block parser for agent responses
#[derive(Parser)]
#[command(name = "agent-stream-parser")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (environment variables override it)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Print parse metrics to stderr before exiting
    #[arg(long, global = true)]
    stats: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one message into its block list
    Parse {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// JSON array of tool execution records to scan for charts
        #[arg(long, value_name = "FILE")]
        executions: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Reassemble a newline-delimited envelope stream
    Stream {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Read size per chunk in bytes
        #[arg(long, value_name = "N", default_value_t = 4096)]
        chunk_size: usize,

        /// Parse the accumulated `content` text into blocks at the end
        #[arg(long)]
        render: bool,
    },
    /// Check whether the input is chart data and show its normalized form
    Sniff {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ParserConfig::from_file(&path.to_string_lossy())?,
        None => ParserConfig::from_env()?,
    };
    config.validate()?;

    init_tracing(&config.logging.filter);

    match cli.command {
        Commands::Parse {
            file,
            executions,
            pretty,
        } => run_parse(&config, file.as_deref(), executions.as_deref(), pretty).await?,
        Commands::Stream {
            file,
            chunk_size,
            render,
        } => run_stream(&config, file.as_deref(), chunk_size, render).await?,
        Commands::Sniff { file } => run_sniff(file.as_deref()).await?,
    }

    if cli.stats {
        eprintln!("{}", PARSE_METRICS.snapshot());
    }

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_input(file: Option<&Path>) -> anyhow::Result<Box<dyn AsyncRead + Unpin>> {
    Ok(match file {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    })
}

async fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    let mut input = open_input(file).await?;
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .await
        .context("Failed to read input")?;
    Ok(text)
}

async fn run_parse(
    config: &ParserConfig,
    file: Option<&Path>,
    executions: Option<&Path>,
    pretty: bool,
) -> anyhow::Result<()> {
    let text = read_input(file).await?;
    let parser = StructuredParser::with_options(config.parser.clone());

    let blocks = match executions {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let records =
                ToolExecution::list_from_json(&raw).context("Invalid tool execution records")?;
            parser.parse_with_executions(&text, &records)
        }
        None => parser.parse(&text),
    };

    let output = if pretty {
        serde_json::to_string_pretty(&blocks)?
    } else {
        serde_json::to_string(&blocks)?
    };
    println!("{}", output);
    Ok(())
}

async fn run_stream(
    config: &ParserConfig,
    file: Option<&Path>,
    chunk_size: usize,
    render: bool,
) -> anyhow::Result<()> {
    if chunk_size == 0 {
        return Err(ParserError::InvalidInput("Chunk size must be greater than 0".to_string()).into());
    }

    let mut input = open_input(file).await?;
    let mut assembler = StreamAssembler::with_config(&config.assembler);
    let mut rendered_text = String::new();
    let mut buf = vec![0u8; chunk_size];

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let read = tokio::select! {
            read = input.read(&mut buf) => read.context("Failed to read stream")?,
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted, flushing buffered stream");
                break;
            }
        };
        if read == 0 {
            break;
        }
        for envelope in assembler.process_chunk(&buf[..read]) {
            emit_envelope(&envelope, render, &mut rendered_text)?;
        }
    }

    for envelope in assembler.flush() {
        emit_envelope(&envelope, render, &mut rendered_text)?;
    }

    let stats = assembler.stats();
    tracing::info!(processed_lines = stats.processed_lines, "Stream finished");

    if render {
        let blocks = StructuredParser::with_options(config.parser.clone()).parse(&rendered_text);
        println!("{}", serde_json::to_string_pretty(&blocks)?);
    }

    Ok(())
}

fn emit_envelope(
    envelope: &StreamEnvelope,
    render: bool,
    rendered_text: &mut String,
) -> anyhow::Result<()> {
    if render {
        if envelope.kind == StreamEnvelope::CONTENT
            && let Some(text) = envelope.text()
        {
            rendered_text.push_str(text);
        }
    } else {
        println!("{}", serde_json::to_string(envelope)?);
    }
    Ok(())
}

async fn run_sniff(file: Option<&Path>) -> anyhow::Result<()> {
    let text = read_input(file).await?;
    let value = detect::parse_json(&text);

    let report = json!({
        "is_chart_data": detect::is_chart_data(&text),
        "is_known_chart_envelope": value.as_ref().is_some_and(detect::is_known_chart_envelope),
        "route": value.as_ref().map(detect::route_for),
        "normalized": value.as_ref().map(chart::normalize),
        "embedded": chart::sniff(&text).map(|m| json!({
            "source": format!("{:?}", m.source),
            "start": m.start,
            "end": m.end,
            "route": m.route(),
        })),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
