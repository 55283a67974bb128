//! Application startup
//!
//! Parses arguments, loads the configuration file, initialises logging,
//! builds the runtime and runs one scan under signal handling. Returns the
//! process exit code.

use super::cli::args::Args;
use super::cli::display::log_report;
use crate::classifier::http::HttpClassifier;
use crate::classifier::traits::ResponseClassifier;
use crate::client::http::ZapClient;
use crate::client::traits::ScannerApi;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::styles::palette_to_clap;
use crate::core::version::banner;
use crate::scan::orchestrator::ScanOrchestrator;
use clap::{CommandFactory, FromArgMatches};
use std::io::IsTerminal;
use std::sync::Arc;

/// Exit code for configuration problems found before the scan starts
const EXIT_INVALID_INPUT: i32 = 2;
const EXIT_FAILURE: i32 = 1;

pub fn startup() -> i32 {
    let help_color =
        std::io::stdout().is_terminal() && !std::env::args().any(|a| a == "--no-color");
    let matches = Args::command()
        .styles(palette_to_clap(help_color))
        .get_matches();
    let args = match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            return EXIT_FAILURE;
        }
    };

    runtime.block_on(run(args))
}

async fn run(mut args: Args) -> i32 {
    let config_path = match args.load_config_file().await {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID_INPUT;
        }
    };

    let log_format = match args.log_format() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_INVALID_INPUT;
        }
    };
    let use_color = args.use_color();
    colored::control::set_override(use_color);
    if let Err(e) = init_logging(
        args.log_level.as_deref(),
        log_format,
        args.log_file_path(),
        use_color,
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return EXIT_FAILURE;
    }

    log::info!("{}", banner());
    if let Some(path) = &config_path {
        log::debug!("Loaded configuration from {}", path.display());
    }

    if let Err(e) = args.validate() {
        log_error_with_context(&e, "Configuration");
        return EXIT_INVALID_INPUT;
    }
    let client_config = match args.client_config() {
        Ok(config) => config,
        Err(e) => {
            log_error_with_context(&e, "Configuration");
            return EXIT_INVALID_INPUT;
        }
    };
    log::debug!("Scanner connection: {:?}", client_config);
    let request_timeout = client_config.request_timeout;

    let api: Arc<dyn ScannerApi> = match ZapClient::new(client_config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            log::error!("FATAL: could not create scanner client: {}", e);
            return EXIT_FAILURE;
        }
    };

    let classifier: Option<Arc<dyn ResponseClassifier>> = match args.classifier_url() {
        Ok(Some(url)) => match HttpClassifier::new(&url, request_timeout) {
            Ok(classifier) => Some(Arc::new(classifier)),
            Err(e) => {
                log::warn!("Response classification disabled: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log_error_with_context(&e, "Configuration");
            return EXIT_INVALID_INPUT;
        }
    };

    let scan_config = args.scan_config();
    let destination = args.report_path(chrono::Utc::now());
    let target = args.target.clone();

    let result = ShutdownCoordinator::guard_with_coordinator(|coordinator| async move {
        let mut scan = ScanOrchestrator::new(api, scan_config).with_shutdown(coordinator.signal());
        if let Some(classifier) = classifier {
            scan = scan.with_classifier(classifier);
        }
        scan.run(&target, &destination).await
    })
    .await;

    match result {
        Ok(report) => {
            log_report(&report, use_color);
            0
        }
        Err(e) => {
            log_error_with_context(&e, "Scan");
            e.exit_code()
        }
    }
}
