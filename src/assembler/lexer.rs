//! Character-level scanning helpers shared by the line parser and directives.

/// Result of scanning a base-10 integer literal from the start of a string.
#[derive(Debug, Clone, Copy)]
pub struct IntLiteral {
    pub value: i32,
    pub consumed: usize,
    pub overflow: bool,
}

/// Skip leading whitespace, returning the remainder of the string.
pub fn skip_space(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_whitespace())
}

/// Trim trailing whitespace.
pub fn trim_end(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_whitespace())
}

/// Parse an integer from the start of `s`, with an optional leading `-`
/// (no leading `+` — that is not a supported sign and leaves zero digits
/// read, i.e. "not an integer").
///
/// Returns `None` if no digit is present at all. On overflow, `consumed`
/// still covers the entire digit run so callers can report an accurate span.
pub fn parse_i32_base10(s: &str) -> Option<IntLiteral> {
    let negative = s.starts_with('-');
    let digits_start = if negative { 1 } else { 0 };

    let mut end = digits_start;
    for c in s[digits_start..].chars() {
        if c.is_ascii_digit() {
            end += c.len_utf8();
        } else {
            break;
        }
    }
    if end == digits_start {
        return None;
    }

    let digits = &s[digits_start..end];
    let (value, overflow) = match digits.parse::<i64>() {
        Ok(mut v) => {
            if negative {
                v = -v;
            }
            if v > i32::MAX as i64 || v < i32::MIN as i64 {
                (0, true)
            } else {
                (v as i32, false)
            }
        }
        Err(_) => (0, true),
    };

    Some(IntLiteral { value, consumed: end, overflow })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_integer() {
        let lit = parse_i32_base10("1234rest").unwrap();
        assert_eq!(lit.value, 1234);
        assert_eq!(lit.consumed, 4);
        assert!(!lit.overflow);
    }

    #[test]
    fn parses_negative_integer() {
        let lit = parse_i32_base10("-17,r1").unwrap();
        assert_eq!(lit.value, -17);
        assert_eq!(lit.consumed, 3);
    }

    #[test]
    fn reports_overflow_but_still_consumes() {
        let lit = parse_i32_base10("99999999999").unwrap();
        assert!(lit.overflow);
        assert_eq!(lit.consumed, 11);
    }

    #[test]
    fn no_digits_is_none() {
        assert!(parse_i32_base10("abc").is_none());
        assert!(parse_i32_base10("-").is_none());
    }

    #[test]
    fn leading_plus_is_not_a_supported_sign() {
        assert!(parse_i32_base10("+5").is_none());
    }

    #[test]
    fn skip_space_and_trim_end() {
        assert_eq!(skip_space("   x"), "x");
        assert_eq!(trim_end("x   "), "x");
    }
}
