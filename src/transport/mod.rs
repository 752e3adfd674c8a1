//! Transport layer: wire-format details of the two API generations
//! (serialization/deserialization, no I/O).

use serde_json::value::RawValue;

pub(crate) mod classic;
pub(crate) mod rest;

/// Extract an account credit value as the exact decimal string the vendor
/// sent. The field arrives as either a JSON string or a bare number; numeric
/// tokens are kept verbatim so `10.00` does not drift to `"10.0"`. Returns
/// `None` for any other JSON shape.
pub(crate) fn credit_token(raw: &RawValue) -> Option<String> {
    let token = raw.get();
    if let Ok(text) = serde_json::from_str::<String>(token) {
        return Some(text);
    }
    matches!(token.bytes().next(), Some(b'-' | b'0'..=b'9')).then(|| token.to_owned())
}
