//! Stderr logger for the CLI and demos.
//!
//! Records are printed as `[elapsed LEVEL target] message`. Library code
//! only talks to the `log` facade; binaries call `init_with_level` (or
//! `init_tracing` with the `tracing` feature) once at startup.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

/// One record as `[elapsed LEVEL target] message`.
///
/// `target` is the emitting module path (`fisheye_plane::builder`), which
/// tells plane, overlay and CLI messages apart in a shared stream.
fn write_record(out: &mut impl Write, elapsed: Duration, record: &Record) -> io::Result<()> {
    writeln!(
        out,
        "[{:7.3}s {:>5} {}] {}",
        elapsed.as_secs_f64(),
        record.level(),
        record.target(),
        record.args()
    )
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = write_record(&mut io::stderr().lock(), self.started.elapsed(), record);
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Span close events are emitted so that instrumented entry points such as
/// the calibrated-plane builder report their duration. `json` switches to
/// flattened JSON lines; otherwise events carry an uptime stamp like the
/// stderr logger.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(fmt::time::Uptime::default());
    let installed = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder.finish().try_init()
    };
    if installed.is_err() {
        log::debug!("tracing subscriber already installed");
    }
}
