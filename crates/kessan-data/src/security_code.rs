//! Securities code canonicalization.
//!
//! EDINET lists securities under a five-character code: the four-character
//! exchange listing code followed by a `0` (`"72030"` for `"7203"`). Consensus
//! sources and code lists use the listing code, so every record is keyed by
//! the four-character form.

/// The listing code of `code`.
///
/// A five-character alphanumeric code ending in `0` loses that last
/// character; anything else is returned trimmed but otherwise unchanged.
///
/// ```
/// use kessan_data::canonical_security_code;
///
/// assert_eq!(canonical_security_code("72030"), "7203");
/// assert_eq!(canonical_security_code("7203"), "7203");
/// assert_eq!(canonical_security_code("130A0"), "130A");
/// ```
pub fn canonical_security_code(code: &str) -> String {
    let code = code.trim();
    let is_edinet_form = code.len() == 5
        && code.ends_with('0')
        && code.bytes().all(|b| b.is_ascii_alphanumeric());
    if is_edinet_form {
        code[..4].to_string()
    } else {
        code.to_string()
    }
}
