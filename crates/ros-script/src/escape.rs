//! Escaping of text for quoted string literals.
//!
//! Every byte outside `[A-Za-z0-9_]` is written as a `\XX` hex escape, so the
//! output can be placed between quotes in a script without any possibility of
//! ending the string or starting an expression.

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Escape bytes for use inside a quoted literal.
///
/// Works on raw bytes, so multi-byte UTF-8 characters become one escape per
/// byte.
pub fn escape_text(text: impl AsRef<[u8]>) -> String {
    let bytes = text.as_ref();
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        if byte.is_ascii_alphanumeric() || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push('\\');
            out.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
            out.push(HEX_DIGITS[usize::from(byte & 0x0F)] as char);
        }
    }
    out
}

/// Resolve the escapes in the body of a quoted literal.
///
/// Handles `\"`, `\\`, line continuations (a backslash before a line break
/// is dropped together with the break), `\XX` hex pairs and the single
/// letter escapes. An unrecognized escape is kept as written.
///
/// A hex pair whose first digit is a lowercase letter is read as a single
/// letter escape instead (`\ab` is bell followed by `b`); [`escape_text`]
/// only emits uppercase digits.
pub fn unescape_text(body: impl AsRef<[u8]>) -> Vec<u8> {
    let body = body.as_ref();
    let mut out = Vec::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        let byte = body[i];
        if byte != b'\\' || i + 1 == body.len() {
            out.push(byte);
            i += 1;
            continue;
        }

        let next = body[i + 1];
        if let Some(decoded) = hex_pair(body.get(i + 1..i + 3)) {
            out.push(decoded);
            i += 3;
            continue;
        }

        let (replacement, consumed) = match next {
            b'\n' => (None, 2),
            b'\r' if body.get(i + 2) == Some(&b'\n') => (None, 3),
            b'\r' => (None, 2),
            b'"' => (Some(b'"'), 2),
            b'\\' => (Some(b'\\'), 2),
            b'$' => (Some(b'$'), 2),
            b'?' => (Some(b'?'), 2),
            b'_' => (Some(b' '), 2),
            b'a' => (Some(0x07), 2),
            b'b' => (Some(0x08), 2),
            b'f' => (Some(0x0C), 2),
            b'n' => (Some(b'\n'), 2),
            b'r' => (Some(b'\r'), 2),
            b't' => (Some(b'\t'), 2),
            b'v' => (Some(0x0B), 2),
            _ => {
                out.push(byte);
                out.push(next);
                i += 2;
                continue;
            }
        };
        if let Some(b) = replacement {
            out.push(b);
        }
        i += consumed;
    }
    out
}

fn hex_pair(pair: Option<&[u8]>) -> Option<u8> {
    let pair = pair?;
    if pair[0].is_ascii_lowercase() {
        return None;
    }
    let high = (pair[0] as char).to_digit(16)?;
    let low = (pair[1] as char).to_digit(16)?;
    Some((high * 16 + low) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_keeps_word_characters() {
        assert_eq!(escape_text("abc_XYZ_019"), "abc_XYZ_019");
    }

    #[test]
    fn test_escape_runs_per_byte() {
        assert_eq!(escape_text("a b"), "a\\20b");
        assert_eq!(escape_text("\"; /x"), "\\22\\3B\\20\\2Fx");
        // U+00E9 is two bytes in UTF-8.
        assert_eq!(escape_text("é"), "\\C3\\A9");
    }

    #[test]
    fn test_escape_extreme_bytes() {
        assert_eq!(escape_text([0x00u8, 0xFF, 0x0A, 0xA0]), "\\00\\FF\\0A\\A0");
    }

    #[test]
    fn test_escape_output_alphabet() {
        let escaped = escape_text((0u8..=255).collect::<Vec<_>>());
        let bytes = escaped.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\\' {
                assert!(bytes[i + 1].is_ascii_hexdigit() && bytes[i + 2].is_ascii_hexdigit());
                i += 3;
            } else {
                assert!(bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_');
                i += 1;
            }
        }
    }

    #[test]
    fn test_unescape_basic() {
        assert_eq!(unescape_text(r#"say \"hi\" \\ bye"#), b"say \"hi\" \\ bye");
    }

    #[test]
    fn test_unescape_line_continuation() {
        assert_eq!(unescape_text("one\\\ntwo"), b"onetwo");
        assert_eq!(unescape_text("one\\\r\ntwo"), b"onetwo");
        assert_eq!(unescape_text("one\\\rtwo"), b"onetwo");
    }

    #[test]
    fn test_unescape_hex_and_letters() {
        assert_eq!(unescape_text("\\41\\2f"), b"A/");
        assert_eq!(unescape_text("a\\_b\\n"), b"a b\n");
        assert_eq!(unescape_text("\\ab"), [0x07, b'b']);
        assert_eq!(unescape_text("\\AB"), [0xAB]);
    }

    #[test]
    fn test_unescape_unknown_and_trailing() {
        assert_eq!(unescape_text("\\q"), b"\\q");
        assert_eq!(unescape_text("end\\"), b"end\\");
    }

    #[test]
    fn test_escape_then_unescape() {
        let raw: Vec<u8> = (0u8..=255).rev().collect();
        assert_eq!(unescape_text(escape_text(&raw)), raw);
    }
}
