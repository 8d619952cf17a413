use std::io::Write;

use log::LevelFilter;

use crate::error::{TelemetryError, TelemetryResult};

/// Installs the global logger.
///
/// The filter is read from `RUST_LOG` and defaults to `info`.
/// `verbose` raises the default to `debug` when `RUST_LOG` is not set.
pub fn init_telemetry(verbose: bool) -> TelemetryResult<()> {
    let default_filter = if verbose { "debug" } else { "info" };
    let logger = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    )
    .format(move |buf, record| {
        let level = record.level();
        let target = record.target();
        let style = buf.default_level_style(level);
        let timestamp = buf.timestamp();
        let args = record.args();
        writeln!(buf, "[{timestamp} {style}{level}{style:#} {target}] {args}")
    })
    .build();
    let max_level: LevelFilter = logger.filter();
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| TelemetryError::internal(format!("failed to install logger: {e}")))?;
    log::set_max_level(max_level);
    Ok(())
}
