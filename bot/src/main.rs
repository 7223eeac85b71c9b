//! Lead bot - Entry Point
//!
//! Serves the workflow API and the chat command worker. One-shot runs are
//! available with `--process=<url>` and `--search=<practice type>`, optionally
//! writing the JSON result to `--output=<path>`.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use leadbot::app::options::AppOptions;
use leadbot::app::run::run;
use leadbot::app::state::{build_controller, AppState};
use leadbot::filesys::file::File;
use leadbot::logs::{init_logging, LogOptions};
use leadbot::models::practice::DiscoveryQuery;
use leadbot::storage::layout::StorageLayout;
use leadbot::storage::settings::Settings;
use leadbot::utils::{collect_diagnostics, run_diagnostic, version_info};

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to render version: {e}"),
        }
        return;
    }

    // Retrieve the settings file
    let layout = StorageLayout::from_env();
    let settings = match Settings::load(&layout.settings_file()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file: {e}");
            return;
        }
    };

    // Run diagnostics
    if cli_args.contains_key("diagnostic") || cli_args.contains_key("diag") {
        let strategies = match build_controller(&settings) {
            Ok(controller) => controller.strategy_names(),
            Err(e) => {
                eprintln!("Failed to build the workflow controller: {e}");
                return;
            }
        };
        run_diagnostic(&collect_diagnostics(&settings, strategies));
        return;
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level,
        log_dir: settings.log_dir.as_ref().map(PathBuf::from),
        json_format: settings.json_logs,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            println!("Failed to initialize logging: {e}");
            None
        }
    };

    // One-shot runs
    let output = cli_args.get("output").map(File::new);
    if let Some(url) = cli_args.get("process") {
        return process_once(&settings, url, output.as_ref()).await;
    }
    if let Some(practice_type) = cli_args.get("search") {
        let mut query = DiscoveryQuery::new(practice_type.as_str(), cli_args.get("location").cloned());
        if let Some(limit) = cli_args.get("limit").and_then(|l| l.parse::<usize>().ok()) {
            query.limit = limit.max(1);
        }
        return search_once(&settings, query, output.as_ref()).await;
    }

    // Run the bot
    let options = AppOptions::from_settings(settings);
    info!(
        "Running lead bot {} (server: {}, chat worker: {})",
        version_info().version,
        options.enable_server,
        options.enable_chat_worker
    );
    if let Err(e) = run(options, await_shutdown_signal()).await {
        error!("Failed to run the lead bot: {e}");
    }
}

async fn process_once(settings: &Settings, url: &str, output: Option<&File>) {
    let state = match AppState::init(settings) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize: {e}");
            return;
        }
    };

    match state.runner.process_url(url).await {
        Ok(report) => emit(&report, output).await,
        Err(e) => error!("Cannot process {url}: {e}"),
    }
}

async fn search_once(settings: &Settings, query: DiscoveryQuery, output: Option<&File>) {
    let state = match AppState::init(settings) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize: {e}");
            return;
        }
    };

    match state.runner.process_search(query).await {
        Ok(outcomes) => emit(&outcomes, output).await,
        Err(e) => error!("Search failed: {e}"),
    }
}

/// Print the JSON result, or write it to `--output=<path>`
async fn emit<T: serde::Serialize>(value: &T, output: Option<&File>) {
    if let Some(file) = output {
        match file.write_json(value).await {
            Ok(()) => info!("Wrote result to {:?}", file.path()),
            Err(e) => error!("Failed to write {:?}: {e}", file.path()),
        }
        return;
    }

    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to render output: {e}"),
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Failed to install signal handlers, waiting for Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, shutting down...");
    }
}
