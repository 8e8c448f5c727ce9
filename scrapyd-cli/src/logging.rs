//! Log filter for the binary.
//!
//! `RUST_LOG` wins for every target it names. The crates of this workspace
//! log at `warn` (or `debug` with `--verbose`) unless `RUST_LOG` names them.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Targets that get a default level.
pub const LOG_TARGETS: [&str; 3] = ["scrapyd_client", "scrapyd_config", "scrapyd_cli"];

/// Build the filter from the `--verbose` flag and the `RUST_LOG` value.
///
/// Without `--verbose`, a bare global level in `RUST_LOG` (such as `info`)
/// also covers our crates.
pub fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let rust_log = rust_log.unwrap_or_default();
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::ERROR.into())
        .parse_lossy(rust_log);

    let named = named_targets(rust_log);
    let level = if verbose {
        LevelFilter::DEBUG
    } else if has_global_level(rust_log) {
        return filter;
    } else {
        LevelFilter::WARN
    };

    for target in LOG_TARGETS {
        if named.contains(&target) {
            continue;
        }
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

fn directives(rust_log: &str) -> impl Iterator<Item = &str> {
    rust_log.split(',').map(str::trim).filter(|d| !d.is_empty())
}

fn named_targets(rust_log: &str) -> Vec<&str> {
    directives(rust_log)
        .filter_map(|directive| {
            let target = directive.split(['=', '[']).next().unwrap_or_default();
            if target.len() == directive.len() && directive.parse::<LevelFilter>().is_ok() {
                None
            } else {
                Some(target)
            }
        })
        .filter(|target| !target.is_empty())
        .collect()
}

fn has_global_level(rust_log: &str) -> bool {
    directives(rust_log).any(|directive| directive.parse::<LevelFilter>().is_ok())
}
