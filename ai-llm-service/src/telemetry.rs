//! Tracing setup for provider events.
//!
//! The binary owns the subscriber. This module only hands out a layer that
//! prints events from `ai_llm_service::*` with source locations and the
//! duration of each instrumented `generateContent` call, plus the matching
//! filter helpers so the application layer can skip those targets.

use std::io::IsTerminal;

use chrono::{SecondsFormat, Utc};
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::{Directive, filter_fn},
    fmt::{self, format::FmtSpan, format::Writer, time::FormatTime},
    registry::LookupSpan,
};

/// Module path prefix of every event emitted by this crate.
pub const TARGET_PREFIX: &str = "ai_llm_service";

/// `2026-10-16T08:12:45.120Z`
#[derive(Clone, Copy, Debug, Default)]
struct UtcMillis;

impl FormatTime for UtcMillis {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        w.write_str(&Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

pub fn is_library_target(target: &str) -> bool {
    target.starts_with(TARGET_PREFIX)
}

/// Compact layer for provider events only. Colors follow whether stderr is
/// a terminal.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_timer(UtcMillis)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(filter_fn(|meta| is_library_target(meta.target())))
}

/// `ai_llm_service=<level>`.
pub fn level_directive(level: Level) -> Option<Directive> {
    format!("{TARGET_PREFIX}={}", level.as_str().to_ascii_lowercase())
        .parse()
        .ok()
}

/// `RUST_LOG` when set, else `default`, with this crate pinned to `level`.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    match level_directive(level) {
        Some(d) => filter.add_directive(d),
        None => filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_targets_this_crate() {
        let d = level_directive(Level::DEBUG).unwrap();
        assert_eq!(d.to_string().to_lowercase(), "ai_llm_service=debug");
    }

    #[test]
    fn library_target_matching() {
        assert!(is_library_target("ai_llm_service::services::gemini_service"));
        assert!(!is_library_target("api::routes::chat"));
    }
}
