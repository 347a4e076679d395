//! Percent-decoding of paths, query strings, form bodies and cookies.
//!
//! Decoding is lenient: `%XX` with two hex digits becomes that byte, `+`
//! becomes a space, and any other `%` sequence is kept literally. Bytes that
//! do not form valid UTF-8 after decoding are replaced with U+FFFD.

use std::collections::HashMap;

/// Percent-decodes `input`.
pub fn url_decode(input: &str) -> String {
    let spaced = input.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

/// Decodes `&`-separated `key=value` pairs, as found in query strings and
/// `application/x-www-form-urlencoded` bodies.
///
/// Pairs without `=` are skipped; a repeated key keeps its last value.
pub fn decode_form(input: &str) -> HashMap<String, String> {
    input
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (url_decode(key), url_decode(value)))
        .collect()
}

/// Decodes the value of a `Cookie` header: `;`-separated `key=value` pairs,
/// each side trimmed before decoding.
pub fn parse_cookies(input: &str) -> HashMap<String, String> {
    input
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (url_decode(key.trim_matches(TRIM)), url_decode(value.trim_matches(TRIM))))
        .collect()
}

pub(crate) const TRIM: &[char] = &[' ', '\t', '\r'];
