//! Logging configuration for the dvpn node.

use crate::args::LogArgs;
use eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

/// Initialize logging based on command line arguments.
///
/// The filter is built with the following precedence:
/// 1. If `--quiet` is set, only errors are shown
/// 2. Otherwise, start with `RUST_LOG` if set, or the verbosity-derived level
/// 3. Apply any custom directives from `--log.filter`
pub fn init_logging(args: &LogArgs) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(build_filter(args));

    let installed = if args.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| eyre!("failed to install log subscriber: {e}"))
}

fn build_filter(args: &LogArgs) -> EnvFilter {
    if args.quiet {
        return EnvFilter::new("error");
    }

    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.base_level()));

    if let Some(custom) = &args.filter {
        for directive in custom.split(',') {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => eprintln!("ignoring invalid log directive {directive:?}: {e}"),
            }
        }
    }

    filter
}
