use crate::heap::Cell;

/// Integer or float literal, `None` for anything else.
///
/// Integers are decimal with an optional sign, or unsigned `0x` hex and
/// leading-zero octal. Tokens that overflow an i64 fall back to floats.
pub fn parse(token: &str) -> Option<Cell> {
    parse_integer(token)
        .map(Cell::Integer)
        .or_else(|| parse_float(token).map(Cell::Float))
}

fn all_digits(s: &str, radix: u32) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_digit(radix))
}

fn parse_integer(token: &str) -> Option<i64> {
    let (radix, digits) = if token.starts_with("0x") || token.starts_with("0X") {
        (16, &token[2..])
    } else if token.len() > 1 && token.starts_with('0') && all_digits(token, 8) {
        (8, &token[1..])
    } else if token.starts_with('+') || token.starts_with('-') {
        if !all_digits(&token[1..], 10) {
            return None;
        }
        return i64::from_str_radix(token, 10).ok();
    } else {
        (10, token)
    };

    if !all_digits(digits, radix) {
        return None;
    }
    i64::from_str_radix(digits, radix).ok()
}

// Must look like a number from its first characters, so `inf` and `nan`
// stay symbols
fn parse_float(token: &str) -> Option<f64> {
    let mut chars = token.chars();
    let numeric_start = match (chars.next(), chars.next(), chars.next()) {
        (Some(c), _, _) if c.is_ascii_digit() => true,
        (Some('+'), Some(c), _) | (Some('-'), Some(c), _) | (Some('.'), Some(c), _)
            if c.is_ascii_digit() =>
        {
            true
        }
        (Some('+'), Some('.'), Some(c)) | (Some('-'), Some('.'), Some(c))
            if c.is_ascii_digit() =>
        {
            true
        }
        _ => false,
    };

    if !numeric_start {
        return None;
    }
    token.parse::<f64>().ok()
}
