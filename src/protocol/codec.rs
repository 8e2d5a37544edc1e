//! Protocol codec
//!
//! Line framing shared by the TCP transport, command files and clients.
//!
//! ## Wire Format
//! ```text
//! client → server:  <command>\n
//! server → client:  <response>\n
//! ```
//! Lines are UTF-8; invalid sequences are replaced rather than rejected.

use std::io::{BufRead, Read, Write};

use crate::error::Result;

use super::Command;

// =============================================================================
// Reading
// =============================================================================

/// Read one line, without its terminator.
///
/// Returns `Ok(None)` at end of stream. At most `max_len + 1` bytes are
/// kept; the remainder of an overlong line is discarded, so the caller sees a
/// line longer than `max_len` and can reject it while the stream stays in
/// sync.
pub fn read_line<R: BufRead>(reader: &mut R, max_len: usize) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(max_len as u64 + 1)
        .read_until(b'\n', &mut buf)?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > max_len {
        discard_line(reader)?;
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Skip everything up to and including the next newline
fn discard_line<R: BufRead>(reader: &mut R) -> Result<()> {
    loop {
        let (found, used) = {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(());
            }
            match buf.iter().position(|&b| b == b'\n') {
                Some(pos) => (true, pos + 1),
                None => (false, buf.len()),
            }
        };
        reader.consume(used);
        if found {
            return Ok(());
        }
    }
}

// =============================================================================
// Writing
// =============================================================================

/// Write one response line and flush
pub fn write_line<W: Write>(writer: &mut W, text: &str) -> Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write a command line and flush
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    write_line(writer, &command.to_line())
}
