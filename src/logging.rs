use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file prefix.
pub const LOG_ENV: &str = "RECORD_BROWSER_LOG";

/// Initialize tracing.
///
/// Set `RECORD_BROWSER_LOG` to a file path to log to a file. The file name
/// gets a `{timestamp}.{pid}` suffix so concurrent runs never share a file.
/// Without it, `verbose` routes logs to stderr; stdout stays reserved for
/// records.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Ok(log_path) = std::env::var(LOG_ENV) {
        let unique_path = unique_log_path(&log_path);
        let Ok(file) = std::fs::File::create(&unique_path) else {
            eprintln!("Warning: Failed to create log file: {}", unique_path);
            return;
        };

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
        return;
    }

    if !verbose {
        return;
    }

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

fn unique_log_path(base: &str) -> String {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}.{}.{}", base, timestamp, pid)
}
