//! Logger setup for the CLI binary.
//!
//! `RUST_LOG` wins when set. Otherwise this crate logs at `info` (or `debug`
//! with `--verbose`) and every other crate is silenced.

use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Installs the global logger. Safe to call more than once; later calls are no-ops.
pub fn init(verbose: bool) {
    let mut builder = Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        let level = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        builder.filter(None, LevelFilter::Off);
        builder.filter(Some(env!("CARGO_CRATE_NAME")), level);
    }

    builder.format(|buf, record| {
        let location = match (record.module_path(), record.line()) {
            (Some(module), Some(line)) => format!("{module}:{line}"),
            (Some(module), None) => module.to_string(),
            _ => "unknown".to_string(),
        };
        writeln!(
            buf,
            "[{}] {:<5} {:<25} [{}]",
            buf.timestamp(),
            record.level(),
            record.args().to_string(),
            location
        )
    });

    let _ = builder.try_init();
}
