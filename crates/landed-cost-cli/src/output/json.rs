use serde_json::Value;
use std::io::{self, Write};

/// Write the result envelope to stdout as indented JSON, one document per
/// run followed by a newline.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_json(stdout.lock(), value) {
        tracing::error!(error = %e, "failed to write JSON output");
    }
}

fn write_json<W: Write>(mut out: W, value: &Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()
}
