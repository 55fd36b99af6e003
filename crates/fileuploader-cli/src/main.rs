// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// FileUploader — command-line host.
//
// Entry point. Initialises logging, loads configuration, registers the
// bridge packages, and routes the requested call through the registry the
// same way a script runtime would.

mod config_store;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value, json};
use tokio::sync::oneshot;
use tracing::{debug, info};

use fileuploader_bridge::{BridgeContext, DeviceEventEmitter, UploadDispatcher, default_registry};
use fileuploader_core::UploaderConfig;
use fileuploader_core::error::{Result, UploaderError};
use fileuploader_core::human_errors::{HumanError, humanize_error, humanize_message};

#[derive(Debug, Parser)]
#[command(name = "fileuploader", version, about = "Upload files as multipart/form-data with progress")]
struct Cli {
    /// Configuration file (defaults to <data dir>/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload one file.
    Upload(UploadArgs),
    /// List registered bridge modules and their methods.
    Modules,
    /// Print the effective configuration.
    Config {
        /// Also write it to the configuration file.
        #[arg(long)]
        write: bool,
    },
}

#[derive(Debug, Args)]
struct UploadArgs {
    /// File reference: file:// or content:// URI, or a path.
    #[arg(long)]
    uri: String,
    /// Target URL.
    #[arg(long)]
    url: String,
    #[arg(long)]
    method: Option<String>,
    #[arg(long)]
    content_type: Option<String>,
    #[arg(long)]
    file_name: Option<String>,
    #[arg(long)]
    field_name: Option<String>,
    /// Extra form field as key=value; repeatable.
    #[arg(long = "data", value_parser = parse_key_value)]
    data: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

impl UploadArgs {
    /// Settings map exactly as script code would pass it.
    fn to_settings(&self) -> Value {
        let mut settings = Map::new();
        settings.insert("uri".into(), json!(self.uri));
        settings.insert("uploadUrl".into(), json!(self.url));
        let optional = [
            ("method", &self.method),
            ("contentType", &self.content_type),
            ("fileName", &self.file_name),
            ("fieldName", &self.field_name),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                settings.insert(key.into(), json!(value));
            }
        }
        if !self.data.is_empty() {
            let data: Map<String, Value> = self
                .data
                .iter()
                .map(|(k, v)| (k.clone(), json!(v)))
                .collect();
            settings.insert("data".into(), Value::Object(data));
        }
        Value::Object(settings)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            report_failure(&e.to_string(), &humanize_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn report_failure(detail: &str, human: &HumanError) {
    eprintln!("error: {detail}");
    eprintln!("{} {}", human.message, human.suggestion);
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| config_store::data_dir().join(config_store::CONFIG_FILE))
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config_path();
    let config = config_store::load_config(&config_path);
    debug!(path = %config_path.display(), "configuration loaded");

    match cli.command {
        Command::Upload(args) => upload(args, config).await,
        Command::Modules => {
            list_modules(config)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if write {
                config_store::persist_config(&config_path, &config)?;
                info!(path = %config_path.display(), "configuration written");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn list_modules(config: UploaderConfig) -> Result<()> {
    let emitter = Arc::new(DeviceEventEmitter::new());
    let ctx = BridgeContext::current(emitter, config)?;
    let registry = default_registry(&ctx)?;
    for name in registry.module_names() {
        if let Some(module) = registry.get(name) {
            println!("{name}: {}", module.method_names().join(", "));
        }
    }
    Ok(())
}

/// How an upload dispatched from the command line ended.
#[derive(Debug)]
enum UploadOutcome {
    /// The `{data, status}` result map.
    Done(Value),
    /// The message the module reported through the callback.
    Failed(String),
}

impl UploadOutcome {
    /// Print the result to stdout, or the failure to stderr, and return the
    /// process exit status.
    fn report(&self) -> Result<u8> {
        match self {
            Self::Done(result) => {
                println!("{}", serde_json::to_string_pretty(result)?);
                Ok(0)
            }
            Self::Failed(message) => {
                report_failure(message, &humanize_message(message));
                Ok(1)
            }
        }
    }
}

async fn upload(args: UploadArgs, config: UploaderConfig) -> Result<ExitCode> {
    let outcome = run_upload(&args, config, |sent, total| {
        eprint!("\r{sent}/{total} bytes");
        std::io::stderr().flush().ok();
    })
    .await?;
    eprintln!();
    Ok(ExitCode::from(outcome.report()?))
}

/// Run one upload through the dispatcher and wait for its callback.
async fn run_upload<F>(args: &UploadArgs, config: UploaderConfig, progress: F) -> Result<UploadOutcome>
where
    F: Fn(u64, u64) + Send + Sync + 'static,
{
    let emitter = Arc::new(DeviceEventEmitter::new());
    let ctx = BridgeContext::current(emitter.clone(), config)?;
    let registry = Arc::new(default_registry(&ctx)?);
    let dispatcher = UploadDispatcher::new(registry, emitter);

    let (tx, rx) = oneshot::channel();
    dispatcher.upload(
        args.to_settings(),
        Box::new(move |err, res| {
            let _ = tx.send((err, res));
        }),
        Some(Box::new(progress)),
    )?;

    let (err, res) = rx
        .await
        .map_err(|_| UploaderError::Bridge("upload callback was dropped".into()))?;

    Ok(match err {
        Some(message) => UploadOutcome::Failed(message),
        None => UploadOutcome::Done(res.unwrap_or(Value::Null)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn key_value_parsing() {
        assert_eq!(
            parse_key_value("a=b=c").unwrap(),
            ("a".to_owned(), "b=c".to_owned())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    fn upload_args(uri: &str, url: &str) -> UploadArgs {
        let cli = Cli::parse_from(["fileuploader", "upload", "--uri", uri, "--url", url]);
        match cli.command {
            Command::Upload(args) => args,
            other => panic!("expected upload command, got {other:?}"),
        }
    }

    /// Answers the first request with `status` and `body` once the whole
    /// request has been read.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/upload", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 8192];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                    let len: usize = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        url
    }

    fn fixture() -> tempfile::NamedTempFile {
        let mut fx = tempfile::NamedTempFile::new().unwrap();
        fx.write_all(b"hello upload").unwrap();
        fx.flush().unwrap();
        fx
    }

    #[tokio::test]
    async fn successful_upload_yields_result_and_success_code() {
        let url = serve_once("200 OK", "saved").await;
        let fx = fixture();
        let args = upload_args(fx.path().to_str().unwrap(), &url);

        let outcome = run_upload(&args, UploaderConfig::default(), |_, _| {})
            .await
            .unwrap();
        match &outcome {
            UploadOutcome::Done(result) => {
                assert_eq!(result, &json!({ "data": "saved", "status": 200 }))
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(outcome.report().unwrap(), 0);
    }

    #[tokio::test]
    async fn server_error_yields_failure_code() {
        let url = serve_once("500 Internal Server Error", "boom").await;
        let fx = fixture();
        let args = upload_args(fx.path().to_str().unwrap(), &url);

        let outcome = run_upload(&args, UploaderConfig::default(), |_, _| {})
            .await
            .unwrap();
        match &outcome {
            UploadOutcome::Failed(message) => {
                assert_eq!(message, "server responded with status 500: boom");
                assert_eq!(
                    humanize_message(message).severity,
                    fileuploader_core::human_errors::Severity::Transient
                );
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(outcome.report().unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_file_yields_failure_code() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.bin");
        let uri = format!("file://{}", missing.display());
        let args = upload_args(&uri, "http://127.0.0.1:9/upload");

        let outcome = run_upload(&args, UploaderConfig::default(), |_, _| {})
            .await
            .unwrap();
        match &outcome {
            UploadOutcome::Failed(message) => assert_eq!(
                humanize_message(message).message,
                "The file couldn't be found."
            ),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(outcome.report().unwrap(), 1);
    }

    #[test]
    fn config_flag_overrides_default_location() {
        let cli = Cli::parse_from(["fileuploader", "--config", "/etc/fu.json", "modules"]);
        assert_eq!(cli.config_path(), PathBuf::from("/etc/fu.json"));

        let cli = Cli::parse_from(["fileuploader", "config", "--config", "/tmp/x.json"]);
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn upload_args_build_settings_map() {
        let cli = Cli::parse_from([
            "fileuploader",
            "upload",
            "--uri",
            "/tmp/a.png",
            "--url",
            "http://example.test/up",
            "--content-type",
            "image/png",
            "--data",
            "album=summer",
        ]);
        let Command::Upload(args) = cli.command else {
            panic!("expected upload command");
        };
        assert_eq!(
            args.to_settings(),
            json!({
                "uri": "/tmp/a.png",
                "uploadUrl": "http://example.test/up",
                "contentType": "image/png",
                "data": { "album": "summer" },
            })
        );
    }
}
