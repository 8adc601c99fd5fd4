//! Byte and string helpers shared by the renderers.
use std::fmt::Write;

/// Render `dat` as 7-bit text.
///
/// Each byte is masked to 7 bits. Control bytes other than CR and LF are shown
/// as a parenthesized lowercase hex escape, e.g. `(7)`. CR and LF are each
/// replaced by `line_break`.
#[must_use]
pub fn clean_text(dat: &[u8], line_break: &str) -> String {
    let mut s = String::with_capacity(dat.len());
    for b in dat {
        let chr = b & 0x7f;
        match chr {
            b'\n' | b'\r' => s.push_str(line_break),
            0..=0x1f => {
                let _ = write!(s, "({chr:x})");
            }
            _ => s.push(char::from(chr)),
        }
    }
    s
}

/// Lowercase, unpadded hex, each byte followed by a single space.
#[must_use]
pub fn hex_bytes(dat: &[u8]) -> String {
    let mut s = String::with_capacity(dat.len() * 3);
    for b in dat {
        let _ = write!(s, "{b:x} ");
    }
    s
}

/// Join a multi-value field onto one line.
#[must_use]
pub fn join_lines(s: &str) -> String {
    s.replace('\n', " ")
}
