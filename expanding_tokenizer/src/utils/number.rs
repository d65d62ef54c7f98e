//! Integer literal recognition shared by NUMBER tokens and arithmetic operands

/// Parse a signed integer literal.
///
/// Accepted forms, each with an optional leading `+` or `-`:
/// hexadecimal `0x1F`/`0X1f`, decimal `[1-9][0-9]*`, octal `0[0-7]*`.
/// Returns `None` for anything else, including values outside `i64`.
pub fn parse_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.starts_with('0') {
        (8, digits)
    } else if digits.starts_with(|c: char| c.is_ascii_digit()) {
        (10, digits)
    } else {
        return None;
    };

    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    // Parse through i128 so that i64::MIN survives the sign split
    let magnitude = i128::from_str_radix(body, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}
