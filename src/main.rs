use clap::Parser;
use kiosk::application::kiosk::{Kiosk, KioskConfig};
use kiosk::error::OrderError;
use kiosk::infrastructure::cash_register::{CashRegister, DEFAULT_STOCK};
use kiosk::interfaces::csv::order_reader::OrderReader;
use kiosk::interfaces::csv::outcome_writer::{OutcomeRecord, OutcomeWriter};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input orders CSV file (station, kind, inserted)
    input: PathBuf,

    /// Number of stations, each served by one worker
    #[arg(long, env = "KIOSK_STATIONS", default_value_t = 3)]
    stations: usize,

    /// Orders a station holds before submitters have to wait
    #[arg(long, env = "KIOSK_CAPACITY", default_value_t = 1024)]
    capacity: usize,

    /// How long to wait for an order before giving up, in milliseconds
    #[arg(long, env = "KIOSK_TIMEOUT_MS", default_value_t = 600_000)]
    timeout_ms: u64,

    /// Pieces of every denomination the register starts with
    #[arg(long, env = "KIOSK_REGISTER_STOCK", default_value_t = DEFAULT_STOCK)]
    register_stock: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiosk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = KioskConfig {
        stations: cli.stations,
        capacity: cli.capacity,
        order_timeout: Duration::from_millis(cli.timeout_ms),
    };
    let register = Arc::new(CashRegister::with_stock(cli.register_stock));
    let kiosk = Arc::new(Kiosk::with_register(config, register.clone()).into_diagnostic()?);

    // Ctrl-C cancels every order still in flight
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling pending orders");
                shutdown.cancel();
            }
        }
    });

    // Submit every order concurrently, keeping input order for the output
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OrderReader::new(file);
    let mut pending = Vec::new();
    for row_result in reader.orders() {
        match row_result {
            Ok(row) => {
                let kiosk = kiosk.clone();
                let shutdown = shutdown.clone();
                let task = tokio::spawn({
                    let row = row.clone();
                    async move {
                        kiosk
                            .process(row.station, row.kind, row.inserted, &shutdown)
                            .await
                    }
                });
                pending.push((row, task));
            }
            Err(e) => {
                eprintln!("Error reading order: {}", e);
            }
        }
    }

    let mut records = Vec::with_capacity(pending.len());
    for (row, task) in pending {
        let outcome = task
            .await
            .unwrap_or_else(|e| Err(OrderError::Internal(e.to_string())));
        records.push(OutcomeRecord::new(row, &outcome));
    }

    let stdout = io::stdout();
    let mut writer = OutcomeWriter::new(stdout.lock());
    writer.write_outcomes(records).into_diagnostic()?;

    match Arc::try_unwrap(kiosk) {
        Ok(kiosk) => {
            kiosk.shutdown().await;
        }
        Err(_) => tracing::warn!("Kiosk still in use, skipping graceful shutdown"),
    }
    tracing::info!(remaining = register.total(), "Register balance");

    Ok(())
}
