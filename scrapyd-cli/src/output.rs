//! Output formatting for CLI commands.
//!
//! Plain lists go out one item per line; envelopes are printed as JSON.

use std::io::Write;

use scrapyd_domain::{Envelope, Target};

use crate::error::CliResult;

/// Prefix for nested lines.
pub const INDENT_PREFIX: &str = "  ";

/// Width of the name column in `targets`.
const TARGET_NAME_WIDTH: usize = 20;

/// One item per line.
pub fn write_lines<W, I, S>(writer: &mut W, items: I) -> CliResult<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for item in items {
        writeln!(writer, "{}", item.as_ref())?;
    }
    Ok(())
}

/// `project:` followed by its spiders, indented, or `No spiders.`.
pub fn write_project_spiders<W: Write>(writer: &mut W, project: &str, spiders: &[String]) -> CliResult<()> {
    writeln!(writer, "{}:", project)?;
    if spiders.is_empty() {
        writeln!(writer, "{}No spiders.", INDENT_PREFIX)?;
    }
    for spider in spiders {
        writeln!(writer, "{}{}", INDENT_PREFIX, spider)?;
    }
    Ok(())
}

/// Envelope as indented JSON.
pub fn write_pretty<W: Write>(writer: &mut W, envelope: &Envelope) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *writer, envelope).map_err(std::io::Error::from)?;
    writeln!(writer)?;
    Ok(())
}

/// Envelope as a single JSON line.
pub fn write_compact<W: Write>(writer: &mut W, envelope: &Envelope) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, envelope).map_err(std::io::Error::from)?;
    writeln!(writer)?;
    Ok(())
}

/// `name                 url`.
pub fn write_target<W: Write>(writer: &mut W, target: &Target) -> CliResult<()> {
    writeln!(writer, "{:<width$} {}", target.name, target.url, width = TARGET_NAME_WIDTH)?;
    Ok(())
}
