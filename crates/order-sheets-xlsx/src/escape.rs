//! Text escaping for SpreadsheetML string cells.
//!
//! Excel stores characters that XML cannot carry as `_xHHHH_` sequences
//! (`_x000D_` for CR, `_x0001_` for control characters). A literal `_x`
//! that would otherwise be read as such a sequence is protected by escaping
//! its underscore as `_x005F_`.

/// Decode `_xHHHH_` escape sequences.
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match parse_escape(candidate) {
            Some(ch) => {
                result.push(ch);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Encode characters XML 1.0 cannot hold, and protect literal `_xHHHH_` runs.
pub(crate) fn encode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for (i, c) in s.char_indices() {
        if c == '_' && parse_escape(&s[i..]).is_some() {
            result.push_str("_x005F_");
        } else if needs_escape(c) {
            result.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            result.push(c);
        }
    }
    result
}

/// Escape the five XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn needs_escape(c: char) -> bool {
    (c < ' ' && c != '\t' && c != '\n') || c == '\u{FFFE}' || c == '\u{FFFF}'
}

/// Parse a complete `_xHHHH_` at the start of `s`
fn parse_escape(s: &str) -> Option<char> {
    let bytes = s.as_bytes();
    if bytes.len() < 7 || &bytes[..2] != b"_x" || bytes[6] != b'_' {
        return None;
    }
    let hex = std::str::from_utf8(&bytes[2..6]).ok()?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_carriage_return() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
    }

    #[test]
    fn test_decode_multiple() {
        assert_eq!(
            decode_excel_escapes("line1_x000d__x000a_line2"),
            "line1\r\nline2"
        );
    }

    #[test]
    fn test_decode_escaped_underscore() {
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
    }

    #[test]
    fn test_decode_partial_sequence() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("a_b_c"), "a_b_c");
        assert_eq!(decode_excel_escapes("__x000A_"), "_\n");
    }

    #[test]
    fn test_encode_control_characters() {
        assert_eq!(encode_excel_escapes("a\rb"), "a_x000D_b");
        assert_eq!(encode_excel_escapes("tab\tline\n"), "tab\tline\n");
        assert_eq!(encode_excel_escapes("\u{1}"), "_x0001_");
    }

    #[test]
    fn test_encode_protects_literal_sequences() {
        let literal = "code_x0041_here";
        let encoded = encode_excel_escapes(literal);
        assert_eq!(encoded, "code_x005F_x0041_here");
        assert_eq!(decode_excel_escapes(&encoded), literal);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<a & "b">'"#), "&lt;a &amp; &quot;b&quot;&gt;&apos;");
    }
}
