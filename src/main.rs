//! Track file server
//!
//! Registers local files and serves them over loopback HTTP until interrupted.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use track_file_server::logging::{LogLevel, LogOutput, LoggingConfig, LoggingSystem};
use track_file_server::{FileServer, ServerConfig};

/// Serve local genomics files to a browser-side viewer
#[derive(Debug, Parser)]
#[command(name = "track-file-server", version, about)]
struct Cli {
    /// Files to register
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Server configuration file (TOML or JSON)
    #[arg(short, long, env = "TRACK_FILE_SERVER_CONFIG")]
    config: Option<PathBuf>,

    /// Log verbosity (defaults to debug in debug builds, info otherwise)
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Also write rotated JSON logs to this directory
    #[arg(long, env = "TRACK_FILE_SERVER_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Print registrations as a JSON array instead of tab-separated lines
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Registration {
    path: PathBuf,
    url: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _logging_system = match LoggingSystem::init(logging_config(&cli)) {
        Ok(system) => {
            let config = system.config();
            if let (LogOutput::Both | LogOutput::File, Some(dir)) =
                (config.output, &config.log_directory)
            {
                tracing::debug!("Writing logs to {}", dir.display());
            }
            Some(system)
        }
        Err(e) => {
            eprintln!("Failed to initialize logging system: {}", e);
            None
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = match &cli.log_dir {
        Some(dir) => LoggingConfig::production().with_log_directory(dir.clone()),
        None if cfg!(debug_assertions) => LoggingConfig::development(),
        None => LoggingConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config = config.with_level(level);
    }
    config
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ServerConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let server = FileServer::new(config);

    let registrations = cli
        .paths
        .iter()
        .map(|path| {
            let url = server
                .register_file(path)
                .with_context(|| format!("registering {}", path.display()))?;
            Ok(Registration {
                path: path.clone(),
                url,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&registrations)?);
    } else {
        for registration in &registrations {
            println!("{}\t{}", registration.path.display(), registration.url);
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building signal runtime")?;
    runtime
        .block_on(tokio::signal::ctrl_c())
        .context("waiting for Ctrl-C")?;

    tracing::info!("Interrupted, stopping");
    server.shutdown();
    Ok(())
}
