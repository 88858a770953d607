use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use workdays::cli::{parse_args, print_help, Args};
use workdays::config::Config;
use workdays::health::ServiceMetrics;
use workdays::holidays::{HolidayProvider, HttpHolidaySource};
use workdays::orchestrator::WorkingDateService;
use workdays::request::build_request;
use workdays::server::{format_instant, run_server};

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();

    if args.help {
        print_help();
        return Ok(());
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("workdays=info".parse()?),
        )
        .init();

    info!("workdays v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");
    info!("  Holiday source: {}", config.holidays_url);
    info!("  Business offset: {}", config.business_offset);
    info!("  Port: {}", config.port);

    // Handle --validate mode
    if args.validate {
        info!("Validating configuration...");
        match config.validate() {
            Ok(()) => {
                info!("Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
    }

    let source = HttpHolidaySource::new(&config.holidays_url, config.holidays_timeout())
        .context("Failed to create holiday source")?;
    let service = Arc::new(WorkingDateService::new(
        HolidayProvider::new(source),
        config.business_offset,
    ));

    if args.is_one_shot() {
        return run_once(&args, &service).await;
    }

    let metrics = Arc::new(ServiceMetrics::new());
    let cancel_token = CancellationToken::new();

    tokio::spawn(cancel_on_signal(
        tokio::signal::ctrl_c(),
        cancel_token.clone(),
    ));

    run_server(config.port, service, metrics, cancel_token)
        .await
        .with_context(|| format!("Failed to run server on port {}", config.port))?;

    Ok(())
}

/// Single calculation from --days/--hours/--date
async fn run_once(args: &Args, service: &WorkingDateService<HttpHolidaySource>) -> Result<()> {
    let request = build_request(
        args.days.as_deref(),
        args.hours.as_deref(),
        args.date.as_deref(),
    )?;
    let result = service.calculate(&request).await?;
    println!("{}", format_instant(result));
    Ok(())
}

/// Cancel `token` once `signal` fires. If the listener cannot be installed the
/// server keeps running without signal-driven shutdown.
async fn cancel_on_signal<F>(signal: F, token: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Received Ctrl-C, shutting down");
            token.cancel();
        }
        Err(e) => warn!("Failed to listen for Ctrl-C, shutdown on signal disabled: {}", e),
    }
}
