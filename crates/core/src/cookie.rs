//! Cookie header encoding and parsing
//!
//! Values are escaped the same way `encodeURIComponent` does it, so cookies
//! written here can be read by any other script on the page and vice versa.

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters left untouched by `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Expiry used to delete a cookie
pub const EPOCH_EXPIRY: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Escape a cookie value
pub fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Unescape a cookie value, returning the raw input when it is not valid UTF-8
/// after decoding
pub fn decode_value(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Format a timestamp the way the `expires` attribute expects it
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Build the string assigned to `document.cookie` to store a value
pub fn set_cookie_header(name: &str, value: &str, expires: DateTime<Utc>, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{name}={}; path=/; SameSite=Lax; expires={}{secure}",
        encode_value(value),
        http_date(expires)
    )
}

/// Build the string assigned to `document.cookie` to delete a value
pub fn delete_cookie_header(name: &str) -> String {
    format!("{name}=; path=/; expires={EPOCH_EXPIRY}")
}

/// Look up a cookie in a `name=value; name2=value2` header
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (cookie_name, value) = pair.split_once('=').unwrap_or((pair, ""));
        (cookie_name.trim() == name).then(|| decode_value(value))
    })
}

/// Split the leading `name=value` pair off a set-cookie string, keeping the
/// value encoded
pub fn split_pair(set_cookie: &str) -> Option<(&str, &str)> {
    let pair = set_cookie.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    (!name.is_empty()).then_some((name, value))
}
