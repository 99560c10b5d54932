//! A1-style cell references

use crate::error::{XlsxError, XlsxResult};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub fn column_to_letters(col: u16) -> String {
    let mut result = String::new();
    let mut n = col as u32 + 1;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Format a 0-based `(row, col)` as an A1 reference
pub fn to_a1(row: u32, col: u16) -> String {
    format!("{}{}", column_to_letters(col), row + 1)
}

/// Parse an A1 reference into 0-based `(row, col)`.
///
/// `$` markers are accepted and ignored.
pub fn parse_a1(s: &str) -> XlsxResult<(u32, u16)> {
    let invalid = |why: &str| XlsxError::Parse(format!("Invalid cell reference '{}': {}", s, why));

    let cleaned: String = s.trim().chars().filter(|c| *c != '$').collect();
    let split = cleaned
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(cleaned.len());
    let (letters, digits) = cleaned.split_at(split);

    if letters.is_empty() {
        return Err(invalid("no column letters"));
    }
    let mut col: u32 = 0;
    for c in letters.chars() {
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        if col > MAX_COLS as u32 {
            return Err(invalid("column out of range"));
        }
    }

    let row: u32 = digits.parse().map_err(|_| invalid("bad row number"))?;
    if row == 0 || row > MAX_ROWS {
        return Err(invalid("row out of range"));
    }

    Ok((row - 1, (col - 1) as u16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(column_to_letters(0), "A");
        assert_eq!(column_to_letters(8), "I");
        assert_eq!(column_to_letters(25), "Z");
        assert_eq!(column_to_letters(26), "AA");
        assert_eq!(column_to_letters(16_383), "XFD");
    }

    #[test]
    fn test_parse_a1() {
        assert_eq!(parse_a1("A1").unwrap(), (0, 0));
        assert_eq!(parse_a1("I12").unwrap(), (11, 8));
        assert_eq!(parse_a1("$AA$3").unwrap(), (2, 26));
        assert_eq!(parse_a1("xfd1048576").unwrap(), (1_048_575, 16_383));
    }

    #[test]
    fn test_parse_a1_errors() {
        assert!(parse_a1("").is_err());
        assert!(parse_a1("12").is_err());
        assert!(parse_a1("A0").is_err());
        assert!(parse_a1("A").is_err());
        assert!(parse_a1("XFE1").is_err());
        assert!(parse_a1("A1B").is_err());
    }

    #[test]
    fn test_to_a1() {
        assert_eq!(to_a1(0, 0), "A1");
        assert_eq!(to_a1(9, 4), "E10");
    }
}
