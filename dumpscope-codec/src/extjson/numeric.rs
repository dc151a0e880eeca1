//! Integer literals with prefix-detected base

/// Parse a signed integer literal that must fit in `bits` bits.
///
/// The base comes from the literal itself: `0x` hexadecimal, `0o` or a
/// bare leading `0` octal, `0b` binary, decimal otherwise. Underscores may
/// separate digits. Returns a description of the problem on failure.
pub fn parse_int_literal(s: &str, bits: u32) -> Result<i64, String> {
    debug_assert!((1..=64).contains(&bits));

    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits, prefixed) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest, true)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest, true)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest, true)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..], true)
    } else {
        (10, lower.as_str(), false)
    };

    let digits = strip_underscores(digits, prefixed).ok_or_else(|| format!("invalid syntax in {s:?}"))?;
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(format!("invalid syntax in {s:?}"));
    }

    let magnitude = u64::from_str_radix(&digits, radix).map_err(|err| match err.kind() {
        std::num::IntErrorKind::PosOverflow => format!("{s:?} out of range for {bits}-bit integer"),
        _ => format!("invalid syntax in {s:?}"),
    })?;

    let limit = 1u64 << (bits - 1);
    if negative {
        if magnitude > limit {
            return Err(format!("{s:?} out of range for {bits}-bit integer"));
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        if magnitude >= limit {
            return Err(format!("{s:?} out of range for {bits}-bit integer"));
        }
        Ok(magnitude as i64)
    }
}

/// Remove digit separators.
///
/// An underscore must sit between two digits, or between a base prefix and
/// a digit.
fn strip_underscores(digits: &str, prefixed: bool) -> Option<String> {
    if !digits.contains('_') {
        return Some(digits.to_string());
    }
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(digits.len());
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'_' {
            let prev_ok = if i == 0 { prefixed } else { bytes[i - 1] != b'_' };
            let next_ok = bytes.get(i + 1).is_some_and(|&n| n != b'_');
            if !prev_ok || !next_ok {
                return None;
            }
        } else {
            out.push(b as char);
        }
    }
    Some(out)
}
