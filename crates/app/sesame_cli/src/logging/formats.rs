use std::io::Write;

use flexi_logger::DeferredNow;
use log::{Level, Record};

/// `level: message`, with warnings and errors colored.
pub fn cli_format(
    w: &mut dyn Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    let level = record.level();
    let label = match level {
        Level::Error => flexi_logger::style(level).paint("error"),
        Level::Warn => flexi_logger::style(level).paint("warning"),
        _ => return write!(w, "{}", record.args()),
    };
    write!(w, "{label}: {}", record.args())
}
