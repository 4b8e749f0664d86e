use env_logger::{Builder, Target};
use log::{Level, LevelFilter, SetLoggerError};
use std::env;
use std::io::Write;

pub fn parse_level(value: &str) -> LevelFilter {
    match value.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

pub fn init_logging() -> Result<(), SetLoggerError> {
    let env = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_level = parse_level(&env);

    let mut builder = Builder::from_default_env();

    builder.format(|buf, record| {
        let timestamp = buf.timestamp();
        let target = record.target();

        match record.level() {
            Level::Info => writeln!(buf, "{} [INFO] [{}]: {}", timestamp, target, record.args()),
            level => writeln!(
                buf,
                "{} [{}] [{}:{}] {}: {}",
                timestamp,
                level,
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                target,
                record.args()
            ),
        }
    });

    if env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()) == "production" {
        builder.filter_module("reqwest", LevelFilter::Warn);
        builder.filter_module("hyper", LevelFilter::Warn);
        builder.filter_module("tokio", LevelFilter::Info);
    }

    builder.filter_level(log_level).target(Target::Stdout).try_init()
}

pub fn log_error_with_context(error: &dyn std::error::Error, context: &str) {
    log::error!("[{}] {}", context, error);

    let mut source = error.source();
    while let Some(err) = source {
        log::error!("  Caused by: {}", err);
        source = err.source();
    }
}

pub fn log_network_error(operation: &str, error: &dyn std::error::Error) {
    log::warn!("[Network] {} failed: {}", operation, error);
}

pub fn log_feed_refresh(total: usize, upcoming: usize, nearby: Option<usize>, duration_ms: u64) {
    match nearby {
        Some(nearby) => log::info!(
            "[Feed] Loaded {} meetings ({} upcoming, {} nearby) in {}ms",
            total, upcoming, nearby, duration_ms
        ),
        None => log::info!(
            "[Feed] Loaded {} meetings ({} upcoming, location unavailable) in {}ms",
            total, upcoming, duration_ms
        ),
    }
}

pub fn log_skipped_record(index: usize, error: &dyn std::error::Error) {
    log::warn!("[Feed] Skipping meeting record #{}: {}", index, error);
}
