//! Stderr logging for the `scantron` binary.
//!
//! Library code only talks to the `log` facade. A binary installs one sink
//! at startup: [`init_with_level`] for plain lines such as
//! `[  0.012s  WARN] 1 of 2 answers had no coordinate`, or [`init_tracing`]
//! with the `tracing` feature. Debug and trace lines also carry the module
//! target.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

static INSTALLED: AtomicBool = AtomicBool::new(false);

struct StderrSink {
    max: LevelFilter,
    origin: Instant,
}

impl StderrSink {
    fn render(&self, record: &Record) -> String {
        let secs = self.origin.elapsed().as_secs_f64();
        match record.level() {
            Level::Debug | Level::Trace => format!(
                "[{secs:7.3}s {:>5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            ),
            level => format!("[{secs:7.3}s {level:>5}] {}", record.args()),
        }
    }
}

impl Log for StderrSink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = self.render(record);
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the stderr sink at `level`.
///
/// Only the first call installs anything; later calls return `Ok` and keep
/// the original level. Fails if some other logger was set first.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if INSTALLED.load(Ordering::Acquire) {
        return Ok(());
    }
    let sink = StderrSink {
        max: level,
        origin: Instant::now(),
    };
    match log::set_boxed_logger(Box::new(sink)) {
        Ok(()) => {
            INSTALLED.store(true, Ordering::Release);
            log::set_max_level(level);
            Ok(())
        }
        // Lost a race against a concurrent first call.
        Err(_) if INSTALLED.load(Ordering::Acquire) => Ok(()),
        Err(err) => Err(err),
    }
}

/// Install a `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise events at `level` and above are kept.
/// Closed spans are reported, so `instrument`ed calls show their duration.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter, json: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_filter(level, rust_log.as_deref()))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

/// `rust_log` directives when present and valid, else `level` for everything.
#[cfg(feature = "tracing")]
fn tracing_filter(level: LevelFilter, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str().to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> StderrSink {
        StderrSink {
            max: LevelFilter::Info,
            origin: Instant::now(),
        }
    }

    #[test]
    fn target_only_on_verbose_levels() {
        let s = sink();
        let warn = s.render(
            &Record::builder()
                .args(format_args!("no coordinate"))
                .level(Level::Warn)
                .target("scantron::run")
                .build(),
        );
        assert!(warn.ends_with(" WARN] no coordinate"), "{warn}");
        assert!(!warn.contains("scantron::run"));

        let debug = s.render(
            &Record::builder()
                .args(format_args!("duplicate"))
                .level(Level::Debug)
                .target("scantron_core::index")
                .build(),
        );
        assert!(debug.ends_with("DEBUG scantron_core::index] duplicate"), "{debug}");
    }

    #[test]
    fn level_filter_applies() {
        let s = sink();
        assert!(s.enabled(&Metadata::builder().level(Level::Info).build()));
        assert!(!s.enabled(&Metadata::builder().level(Level::Debug).build()));
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn tracing_filter_falls_back_to_cli_level() {
        use tracing::level_filters::LevelFilter as TraceLevel;

        let hint = |rust_log| tracing_filter(LevelFilter::Debug, rust_log).max_level_hint();
        assert_eq!(hint(None), Some(TraceLevel::DEBUG));
        assert_eq!(hint(Some("  ")), Some(TraceLevel::DEBUG));
        assert_eq!(hint(Some("error")), Some(TraceLevel::ERROR));
        assert_eq!(
            tracing_filter(LevelFilter::Off, None).max_level_hint(),
            Some(TraceLevel::OFF)
        );
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_with_level(LevelFilter::Warn).expect("first init");
        init_with_level(LevelFilter::Trace).expect("second init");
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }
}
