use eyre::{
    Context as _,
    Result,
};
use std::{
    fs::File,
    path::{
        Path,
        PathBuf,
    },
    sync::Arc,
};
use tracing_subscriber::{
    fmt,
    prelude::*,
    EnvFilter,
};

lazy_static::lazy_static! {
    static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

const CRATES: &[&str] = &["city_pulse", "city_pulse_config", "city_pulse_engine"];

/// Logs go to a file in the data directory, stdout belongs to the dashboard. `RUST_LOG` takes
/// precedence over the `--debug` flag.
pub fn init_logging(data_dir: &Path, debug: bool) -> Result<PathBuf> {
    std::fs::create_dir_all(data_dir).context("Failed to create data directory")?;
    let log_path = data_dir.join(LOG_FILE.as_str());
    let log_file = File::create(&log_path).wrap_err_with(|| format!("Failed to create log file {log_path:?}"))?;

    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            CRATES
                .iter()
                .map(|name| format!("{name}={level}"))
                .collect::<Vec<_>>()
                .join(","),
        )
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false)
                .with_filter(filter),
        )
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    info!(?log_path, "Logging initialized");
    Ok(log_path)
}
