use std::env;
use std::io;
use std::sync::Arc;

use thiserror::Error;
use tokio::task;
use tracing::warn;

use fee_stream::batch_processor::BatchProcessor;
use fee_stream::commission_engine::CommissionEngine;
use fee_stream::converter::CurrencyConverter;
use fee_stream::csv_reader::{read_csv, CsvReadError};
use fee_stream::rates::{reference_rates, HttpRateSource, NullRateSource, RateError, RateSource};
use fee_stream::report::write_report;

const PINNED_RATES_FLAG: &str = "--pinned-rates";

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    CsvRead(#[from] CsvReadError),
    #[error("Exactly one argument must be provided to represent the CSV path.")]
    ArgsLengthError,
    #[error(transparent)]
    Rates(#[from] RateError),
    #[error("failed to write report: {0}")]
    Report(#[from] csv::Error),
    #[error("reader task failed: {0}")]
    ReaderTask(#[from] task::JoinError),
}

/// 1. Parse the CSV path (and the optional pinned-rates flag) from the args.
/// 2. Wire the rate source: live lookup when an API key is configured,
///    otherwise a null source; pinned reference rates override either.
/// 3. Read the statement on a blocking task, price it, write the report to
///    stdout with the appended Commission Fee column.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut pinned_rates = false;
    let mut paths = Vec::new();
    for arg in env::args().skip(1) {
        if arg == PINNED_RATES_FLAG {
            pinned_rates = true;
        } else {
            paths.push(arg);
        }
    }
    if paths.len() != 1 {
        return Err(AppError::ArgsLengthError);
    }
    let csv_path = paths.remove(0);

    let source: Arc<dyn RateSource> = match env::var("FREECURRENCY_API_KEY") {
        Ok(api_key) => Arc::new(HttpRateSource::new(api_key)?),
        Err(_) => {
            warn!("FREECURRENCY_API_KEY not set; live rate lookups are disabled");
            Arc::new(NullRateSource)
        }
    };
    let mut converter = CurrencyConverter::new(source);
    if pinned_rates {
        converter = converter.with_overrides(reference_rates());
    }

    let statement = task::spawn_blocking(move || read_csv(&csv_path)).await??;

    let processor = BatchProcessor::new(CommissionEngine::new(converter));
    let rows = processor.process(statement.rows).await;

    write_report(&statement.header, &rows, io::stdout())?;

    Ok(())
}
