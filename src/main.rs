//! topokrig - kriged topography over an oriented domain
//!
//! Reads one JSON request from standard input (or from a request file),
//! writes one JSON response to standard output and exits.

use std::fs;
use std::io;
use std::process::ExitCode;

use clap::Parser;
use topokrig::config::{Cli, DEFAULT_LOG_FILTER};
use topokrig::gateway::message::Response;
use topokrig::gateway::{read_request, write_response, Gateway, GatewayError};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const EXIT_FAILURE_RESPONSE: u8 = 1;
const EXIT_IO_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match &cli.log_filter {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    // standard output carries the response only
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Some(threads) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .build_global()
        {
            warn!("Failed to size prediction thread pool: {}", e);
        }
    }

    let gateway = Gateway::new(cli.config());

    let message = match &cli.request_file {
        Some(path) => {
            info!("Reading request from {}", path.display());
            fs::read_to_string(path).map(|contents| Some(contents.trim().to_string()))
        }
        None => read_request(&mut io::stdin().lock()),
    };

    let response = match message {
        Ok(Some(message)) => gateway.process_message(&message),
        Ok(None) => {
            warn!("Standard input closed before a request arrived");
            Response::failure(&GatewayError::EmptyInput, None)
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return ExitCode::from(EXIT_IO_ERROR);
        }
    };

    if let Err(e) = write_response(&mut io::stdout().lock(), &response) {
        error!("Failed to write response: {}", e);
        return ExitCode::from(EXIT_IO_ERROR);
    }

    if response.result {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILURE_RESPONSE)
    }
}
