use clap::{Parser, Subcommand};
use qntx_embed3d::dataset::Dataset;
use qntx_embed3d::host::{Host, HostOps, NullLog};
use qntx_embed3d::http::HttpRequest;
use qntx_embed3d::memory::{MemoryDataset, RecordingOps};
use qntx_embed3d::EmbeddingsPluginService;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "qntx-embed3d-plugin")]
#[command(about = "QNTX 3D embeddings viewer plugin")]
#[command(version)]
struct Args {
    /// Dataset snapshot (JSON) to serve
    #[arg(short, long, global = true)]
    dataset: Option<PathBuf>,

    /// Plugin configuration entry, KEY=VALUE (repeatable)
    #[arg(short, long = "config", value_name = "KEY=VALUE", global = true)]
    config: Vec<String>,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered operators
    Operators,
    /// Resolve the load operator's input form
    Inputs {
        #[arg(long)]
        brain_key: Option<String>,
        #[arg(long)]
        color_by: Option<String>,
    },
    /// Load a visualization and print its plot data
    Load {
        #[arg(long)]
        brain_key: Option<String>,
        #[arg(long)]
        color_by: Option<String>,
    },
    /// Apply a plot selection
    Select {
        /// Selected sample ids
        sample_ids: Vec<String>,
    },
    /// Serve newline-delimited JSON requests on stdin
    Serve,
}

/// One request line in `serve` mode.
#[derive(Debug, Deserialize)]
struct StdioRequest {
    method: String,
    path: String,
    #[serde(default)]
    body: Value,
}

/// One response line in `serve` mode.
#[derive(Debug, Serialize)]
struct StdioResponse {
    status_code: i32,
    body: Value,
}

/// Selection sink for the standalone binary; the selection is only logged.
struct LoggingOps;

impl HostOps for LoggingOps {
    fn set_selected_samples(&self, sample_ids: &[String]) {
        info!("Selected {} samples", sample_ids.len());
    }
}

fn parse_config(entries: &[String]) -> Result<HashMap<String, String>, String> {
    entries
        .iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| format!("Invalid config entry '{}', expected KEY=VALUE", entry))
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: Plugin panicked during startup or execution");
        eprintln!(
            "  Location: {}",
            panic_info
                .location()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );
        eprintln!(
            "  Message: {}",
            panic_info
                .payload()
                .downcast_ref::<&str>()
                .unwrap_or(&"<no message>")
        );
    }));

    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries JSON output; logs go to stderr.
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    info!("Initializing QNTX 3D Embeddings Plugin");
    info!("  Version: {}", env!("CARGO_PKG_VERSION"));

    let service = EmbeddingsPluginService::new();
    let handlers = service.initialize(&parse_config(&args.config)?)?;
    info!("Operators: {}", handlers.handler_names.join(", "));

    let dataset = match &args.dataset {
        Some(path) => {
            let dataset = MemoryDataset::load(path)
                .map_err(|e| format!("Failed to load dataset '{}': {}", path.display(), e))?;
            info!(
                "Loaded dataset '{}' ({} samples)",
                dataset.name,
                dataset.samples.len()
            );
            Some(dataset)
        }
        None => {
            warn!("No dataset snapshot given; operators will see no dataset");
            None
        }
    };

    let recorder = RecordingOps::new();
    let ops: &dyn HostOps = match args.command {
        Command::Select { .. } => &recorder,
        _ => &LoggingOps,
    };
    let host = Host {
        dataset: dataset.as_ref().map(|d| d as &dyn Dataset),
        ops,
        log: &NullLog,
    };

    let (path, body) = match args.command {
        Command::Operators => {
            let response = service.handle_http(&host, HttpRequest::new("GET", "/operators", vec![]));
            return print_json(&response.json()?);
        }
        Command::Serve => return serve(&service, &host),
        Command::Inputs {
            brain_key,
            color_by,
        } => (
            "/load_visualization_results/resolve_input",
            json!({ "brain_key": brain_key, "color_by": color_by }),
        ),
        Command::Load {
            brain_key,
            color_by,
        } => (
            "/load_visualization_results/execute",
            json!({ "brain_key": brain_key, "color_by": color_by }),
        ),
        Command::Select { sample_ids } => (
            "/apply_selection_from_plot/execute",
            json!({ "sample_ids": sample_ids }),
        ),
    };

    let request = HttpRequest::new("POST", path, serde_json::to_vec(&body)?);
    let response = service.handle_http(&host, request);
    let mut output = response.json()?;
    if let Some(selected) = recorder.selected() {
        output = json!({ "result": output, "selected_samples": selected });
    }
    print_json(&output)?;

    if response.status_code != 200 {
        return Err(format!("request failed with status {}", response.status_code).into());
    }
    Ok(())
}

fn serve(
    service: &EmbeddingsPluginService,
    host: &Host<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Serving requests on stdin");
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<StdioRequest>(&line) {
            Ok(req) => {
                let body = if req.body.is_null() {
                    vec![]
                } else {
                    serde_json::to_vec(&req.body)?
                };
                let response = service.handle_http(host, HttpRequest::new(&req.method, &req.path, body));
                StdioResponse {
                    status_code: response.status_code,
                    body: response.json().unwrap_or(Value::Null),
                }
            }
            Err(e) => StdioResponse {
                status_code: 400,
                body: json!({ "error": format!("Invalid request line: {}", e) }),
            },
        };

        serde_json::to_writer(&mut stdout, &response)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }

    service.shutdown();
    info!("Plugin shutdown complete");
    Ok(())
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
