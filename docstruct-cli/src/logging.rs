use tracing_subscriber::EnvFilter;

/// Filter for the stderr log layer: `RUST_LOG` when it parses, `info` otherwise
pub fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
