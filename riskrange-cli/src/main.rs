use riskrange::{EngineConfig, Pipeline, RawBars, RawTimeSeries, render::render_json};
use std::{
    error::Error,
    fs::File,
    io::{self, BufReader, Read, Write},
};
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    // Engine overrides via PROBABLE_RANGE_ADJ & DISABLE_STAGES
    let config = EngineConfig::from_env()?;
    let pipeline = Pipeline::new(&config)?;

    // Input document path via CANDLES_PATH env var (default: stdin)
    let raw = read_input(std::env::var("CANDLES_PATH").ok())?;
    info!(
        tickers = raw.len(),
        bars = raw.values().map(RawBars::len).sum::<usize>(),
        "loaded raw candles"
    );

    let output = pipeline.run_raw(raw);
    for error in &output.errors {
        if error.is_fatal() {
            warn!(%error, "ticker rejected");
        } else {
            warn!(%error, "metric left unset");
        }
    }

    let verbose = std::env::var("VERBOSE")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let rendered = render_json(&output.time_series, verbose)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.write_all(b"\n")?;

    info!(
        tickers = output.time_series.len(),
        errors = output.errors.len(),
        "analytics complete"
    );
    Ok(())
}

fn read_input(path: Option<String>) -> Result<RawTimeSeries, Box<dyn Error>> {
    let reader: Box<dyn Read> = match path {
        Some(path) => {
            info!(%path, "reading candles from file");
            Box::new(BufReader::new(File::open(path)?))
        }
        None => {
            info!("reading candles from stdin");
            Box::new(io::stdin().lock())
        }
    };

    Ok(serde_json::from_reader(reader)?)
}

// Logs go to stderr so stdout carries only the rendered JSON
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}
