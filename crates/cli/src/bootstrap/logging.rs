use jsondns_domain::Config;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::{info, warn};

pub fn init_logging(config: &Config) {
    let log_level = config.logging.level.parse().unwrap_or(tracing::Level::INFO);

    let builder = tracing_subscriber::fmt()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_max_level(log_level);

    let Some(path) = config.logging.file.as_deref() else {
        builder.with_ansi(true).init();
        info!("Logging initialized at level: {}", config.logging.level);
        return;
    };

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
            info!(file = path, "Logging initialized at level: {}", config.logging.level);
        }
        Err(e) => {
            builder.with_ansi(true).init();
            warn!(file = path, error = %e, "Cannot open log file, logging to stdout");
        }
    }
}
