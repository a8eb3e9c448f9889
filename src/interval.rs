/// Why a piece of text could not be used as an update interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntervalError {
    #[error("does not appear to be a valid number")]
    InvalidNumber,
    #[error("should be a positive number")]
    Negative,
}

/// Parse an update interval in seconds, where `0` disables refreshing.
///
/// A literal `0` must be followed by a non-digit (or nothing at all) to count as zero. Anything
/// else is read like C's `atoi`: leading whitespace, an optional sign and then as many digits as
/// there are. If that yields zero the text is rejected as not being a number, since the two cases
/// cannot be told apart.
pub fn parse_interval(text: &str) -> Result<u32, IntervalError> {
    let bytes = text.as_bytes();
    if bytes.first() == Some(&b'0') && !bytes.get(1).is_some_and(u8::is_ascii_digit) {
        return Ok(0);
    }

    match leading_int(text) {
        0 => Err(IntervalError::InvalidNumber),
        n if n < 0 => Err(IntervalError::Negative),
        n => Ok(u32::try_from(n).unwrap_or(u32::MAX)),
    }
}

/// The integer prefix of `text`, saturating instead of overflowing.
fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));

    if negative { -magnitude } else { magnitude }
}
