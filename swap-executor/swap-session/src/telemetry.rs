//! Logging setup for the swap CLI

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
///
/// The level defaults to `INFO` and is overridden by `RUST_LOG`. JSON output
/// carries file and line numbers; otherwise a compact human-readable format
/// is used
pub fn setup_logging(json: bool) {
    let json_layer =
        json.then(|| fmt::layer().with_file(true).with_line_number(true).json().flatten_event(true));
    let text_layer = (!json).then(|| fmt::layer().compact().with_target(false));

    tracing_subscriber::registry()
        .with(
            EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy(),
        )
        .with(json_layer)
        .with(text_layer)
        .init();
}
