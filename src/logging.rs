//! Logging setup for the `logcluster` binary.
//!
//! Level comes from `RUST_LOG` when set, otherwise from the CLI flags:
//! `-q` errors only, default info, `-v` debug, `-vv` trace.

use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Initialise `env_logger`. Call once, before the first log statement.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();
    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if verbose >= 1 {
            writeln!(buf, "{} {style}{:<5}{style:#} [{}] {}", buf.timestamp_millis(), level,
                record.module_path().unwrap_or("unknown"), record.args())
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
        }
    });
    // a second init (e.g. from tests) keeps the first logger
    let _ = builder.try_init();
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
