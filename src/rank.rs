//! Lexicographic order keys for drag-and-drop reordering.
//!
//! A key sorts strictly between its two neighbors, so repositioning a row
//! means writing one new key instead of renumbering every sibling. Keys are
//! base-62 strings made of an integer part and an optional fractional part.
//! The integer part's length is encoded in its leading letter (`a`..`z` for
//! positive integers of 2..27 digits, `Z`..`A` for negative ones), which keeps
//! plain string comparison consistent with numeric order. When two keys leave
//! no free digit between them the fractional part grows by one digit, so the
//! scheme never runs out of room; it only runs out when asked to go below the
//! absolute smallest representable key.

use thiserror::Error;

const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// "A" followed by 26 zeros, the smallest representable integer part.
const SMALLEST_INTEGER: &str = "A00000000000000000000000000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankError {
    #[error("invalid order key: {0:?}")]
    InvalidKey(String),
    #[error("order keys out of order: {0:?} >= {1:?}")]
    OutOfOrder(String, String),
    #[error("no order key available below the smallest key")]
    Exhausted,
}

/// Generates a key strictly between `lower` and `upper`.
///
/// `None` stands for an absent neighbor: `(None, None)` yields the initial
/// key `"a0"`, `(None, Some(_))` a key below `upper`, `(Some(_), None)` a key
/// above `lower`. Both neighbors must be well-formed keys with
/// `lower < upper`, otherwise an error is returned.
pub fn generate_key_between(
    lower: Option<&str>,
    upper: Option<&str>,
) -> Result<String, RankError> {
    if let Some(a) = lower {
        validate_key(a)?;
    }
    if let Some(b) = upper {
        validate_key(b)?;
    }
    if let (Some(a), Some(b)) = (lower, upper) {
        if a >= b {
            return Err(RankError::OutOfOrder(a.to_string(), b.to_string()));
        }
    }

    match (lower, upper) {
        (None, None) => Ok("a0".to_string()),
        (None, Some(b)) => {
            let int_b = integer_part(b)?;
            let frac_b = &b[int_b.len()..];
            if int_b == SMALLEST_INTEGER {
                return Ok(format!("{}{}", int_b, midpoint(b"", Some(frac_b.as_bytes()))));
            }
            if int_b < b {
                // `upper` carries a fractional part, its bare integer sorts below it.
                return Ok(int_b.to_string());
            }
            decrement_integer(int_b)?.ok_or(RankError::Exhausted)
        }
        (Some(a), None) => {
            let int_a = integer_part(a)?;
            let frac_a = &a[int_a.len()..];
            match increment_integer(int_a)? {
                Some(incremented) => Ok(incremented),
                None => Ok(format!("{}{}", int_a, midpoint(frac_a.as_bytes(), None))),
            }
        }
        (Some(a), Some(b)) => {
            let int_a = integer_part(a)?;
            let frac_a = &a[int_a.len()..];
            let int_b = integer_part(b)?;
            let frac_b = &b[int_b.len()..];
            if int_a == int_b {
                return Ok(format!(
                    "{}{}",
                    int_a,
                    midpoint(frac_a.as_bytes(), Some(frac_b.as_bytes()))
                ));
            }
            match increment_integer(int_a)? {
                Some(incremented) if incremented.as_str() < b => Ok(incremented),
                Some(_) => Ok(format!("{}{}", int_a, midpoint(frac_a.as_bytes(), None))),
                None => Err(RankError::Exhausted),
            }
        }
    }
}

/// Midpoint of two fractional parts, `a < b` with no trailing zero digits.
/// `None` for `b` stands for the exclusive upper bound "1.0".
fn midpoint(a: &[u8], b: Option<&[u8]>) -> String {
    if let Some(b) = b {
        // Shared prefix stays, the midpoint is taken on the first difference.
        let mut n = 0;
        while n < b.len() && a.get(n).copied().unwrap_or(b'0') == b[n] {
            n += 1;
        }
        if n > 0 {
            let prefix = ascii(&b[..n]);
            let rest = midpoint(&a[n.min(a.len())..], Some(&b[n..]));
            return format!("{prefix}{rest}");
        }
    }

    let digit_a = if a.is_empty() {
        0
    } else {
        digit_index(a[0]).unwrap_or(0)
    };
    let digit_b = match b {
        Some(b) => digit_index(b[0]).unwrap_or(0),
        None => DIGITS.len(),
    };

    if digit_b - digit_a > 1 {
        let mid = (digit_a + digit_b + 1) / 2;
        return ascii(&DIGITS[mid..=mid]);
    }

    // The two leading digits are consecutive.
    match b {
        Some(b) if b.len() > 1 => ascii(&b[..1]),
        _ => {
            let rest = if a.is_empty() { &[][..] } else { &a[1..] };
            format!("{}{}", DIGITS[digit_a] as char, midpoint(rest, None))
        }
    }
}

fn digit_index(c: u8) -> Result<usize, RankError> {
    DIGITS
        .iter()
        .position(|&d| d == c)
        .ok_or_else(|| RankError::InvalidKey((c as char).to_string()))
}

/// Integer-part length encoded by the head letter.
fn integer_length(head: u8) -> Result<usize, RankError> {
    match head {
        b'a'..=b'z' => Ok((head - b'a') as usize + 2),
        b'A'..=b'Z' => Ok((b'Z' - head) as usize + 2),
        _ => Err(RankError::InvalidKey((head as char).to_string())),
    }
}

fn integer_part(key: &str) -> Result<&str, RankError> {
    let head = *key
        .as_bytes()
        .first()
        .ok_or_else(|| RankError::InvalidKey(key.to_string()))?;
    let len = integer_length(head)?;
    if len > key.len() {
        return Err(RankError::InvalidKey(key.to_string()));
    }
    Ok(&key[..len])
}

fn validate_key(key: &str) -> Result<(), RankError> {
    if !key.is_ascii() {
        return Err(RankError::InvalidKey(key.to_string()));
    }
    if key == SMALLEST_INTEGER {
        return Err(RankError::InvalidKey(key.to_string()));
    }
    let int = integer_part(key)?;
    let frac = &key[int.len()..];
    for &c in int[1..].as_bytes().iter().chain(frac.as_bytes()) {
        digit_index(c)?;
    }
    if frac.ends_with('0') {
        // A trailing zero makes the key ambiguous with its own prefix.
        return Err(RankError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Next integer part above `x`, `None` once the largest one is reached.
fn increment_integer(x: &str) -> Result<Option<String>, RankError> {
    let bytes = x.as_bytes();
    let head = bytes[0];
    let mut digits: Vec<u8> = bytes[1..].to_vec();
    let mut carry = true;

    for i in (0..digits.len()).rev() {
        let d = digit_index(digits[i])? + 1;
        if d == DIGITS.len() {
            digits[i] = DIGITS[0];
        } else {
            digits[i] = DIGITS[d];
            carry = false;
            break;
        }
    }

    if carry {
        if head == b'Z' {
            return Ok(Some("a0".to_string()));
        }
        if head == b'z' {
            return Ok(None);
        }
        let next_head = head + 1;
        if next_head > b'a' {
            digits.push(DIGITS[0]);
        } else {
            digits.pop();
        }
        let mut out = vec![next_head];
        out.extend(digits);
        return Ok(Some(ascii(&out)));
    }

    let mut out = vec![head];
    out.extend(digits);
    Ok(Some(ascii(&out)))
}

/// Next integer part below `x`, `None` once the smallest one is reached.
fn decrement_integer(x: &str) -> Result<Option<String>, RankError> {
    let bytes = x.as_bytes();
    let head = bytes[0];
    let mut digits: Vec<u8> = bytes[1..].to_vec();
    let mut borrow = true;

    for i in (0..digits.len()).rev() {
        match digit_index(digits[i])? {
            0 => digits[i] = DIGITS[DIGITS.len() - 1],
            d => {
                digits[i] = DIGITS[d - 1];
                borrow = false;
                break;
            }
        }
    }

    if borrow {
        if head == b'a' {
            return Ok(Some(format!("Z{}", DIGITS[DIGITS.len() - 1] as char)));
        }
        if head == b'A' {
            return Ok(None);
        }
        let next_head = head - 1;
        if next_head < b'Z' {
            digits.push(DIGITS[DIGITS.len() - 1]);
        } else {
            digits.pop();
        }
        let mut out = vec![next_head];
        out.extend(digits);
        return Ok(Some(ascii(&out)));
    }

    let mut out = vec![head];
    out.extend(digits);
    Ok(Some(ascii(&out)))
}

fn ascii(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn between(lower: Option<&str>, upper: Option<&str>) -> String {
        let key = generate_key_between(lower, upper).unwrap();
        if let Some(lower) = lower {
            assert!(lower < key.as_str(), "{lower:?} < {key:?}");
        }
        if let Some(upper) = upper {
            assert!(key.as_str() < upper, "{key:?} < {upper:?}");
        }
        key
    }

    #[test]
    fn initial_key_is_stable() {
        assert_eq!(generate_key_between(None, None).unwrap(), "a0");
        assert_eq!(generate_key_between(None, None).unwrap(), "a0");
    }

    #[test]
    fn integer_neighbors_get_integer_midpoints() {
        assert_eq!(between(Some("a0"), Some("a2")), "a1");
        assert_eq!(between(Some("a0"), None), "a1");
        assert_eq!(between(None, Some("a0")), "Zz");
        assert_eq!(between(Some("a1"), Some("a2")), "a1V");
    }

    #[test]
    fn appending_keeps_growing() {
        let mut last = between(None, None);
        for _ in 0..200 {
            let next = between(Some(&last), None);
            assert!(last < next);
            last = next;
        }
    }

    #[test]
    fn prepending_keeps_shrinking() {
        let mut first = between(None, None);
        for _ in 0..200 {
            let next = between(None, Some(&first));
            assert!(next < first);
            first = next;
        }
    }

    #[test]
    fn repeated_insertion_between_fixed_neighbors() {
        let lower = "a0";
        let upper = "a1";
        let mut keys = vec![lower.to_string()];
        for _ in 0..100 {
            let prev = keys.last().unwrap().clone();
            keys.push(between(Some(&prev), Some(upper)));
        }
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, keys, "keys stay distinct and ordered");
    }

    #[test]
    fn adjacent_keys_extend_instead_of_failing() {
        // No free digit between these two, so the key must grow a digit.
        let key = between(Some("a0"), Some("a01"));
        assert!(key.len() > 2);
    }

    #[test]
    fn inverted_or_equal_neighbors_are_rejected() {
        assert_eq!(
            generate_key_between(Some("a1"), Some("a1")),
            Err(RankError::OutOfOrder("a1".into(), "a1".into()))
        );
        assert!(matches!(
            generate_key_between(Some("a2"), Some("a1")),
            Err(RankError::OutOfOrder(..))
        ));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        // Trailing zero in the fractional part.
        assert!(matches!(
            generate_key_between(Some("a00"), None),
            Err(RankError::InvalidKey(_))
        ));
        // Integer part shorter than its head letter promises.
        assert!(matches!(
            generate_key_between(Some("b0"), None),
            Err(RankError::InvalidKey(_))
        ));
        // Character outside the digit alphabet.
        assert!(matches!(
            generate_key_between(None, Some("a!")),
            Err(RankError::InvalidKey(_))
        ));
        assert!(matches!(
            generate_key_between(Some(""), None),
            Err(RankError::InvalidKey(_))
        ));
    }

    #[test]
    fn crossing_integer_length_boundaries() {
        // "az" is the largest two-digit positive integer part.
        let key = between(Some("az"), None);
        assert_eq!(key, "b00");
        let key = between(Some("Zz"), None);
        assert_eq!(key, "a0");
        let key = between(None, Some("Z0"));
        assert_eq!(key, "Yzz");
    }

    #[test]
    fn move_to_front_sorts_before_all_existing_ranks() {
        let moved = between(None, Some("a0"));
        let display = vec![moved.as_str(), "a0", "a1"];
        let mut sorted = display.clone();
        sorted.sort();
        assert_eq!(display, sorted);
    }
}
