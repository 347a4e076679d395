//! Lenient parsing of one complete HTTP/1.1 message into a [`Request`].
//!
//! The parser never fails. Header lines without a colon are skipped, a missing
//! request line leaves method, path and version empty, and an unparseable
//! `Content-Length` counts as zero. Line endings may be `\r\n` or a bare `\n`.

use bytes::Bytes;

use crate::codec::urlencoded::{TRIM, decode_form, url_decode};
use crate::protocol::Request;

/// Parses `src` into a [`Request`].
///
/// The body is the `Content-Length` bytes following the blank line, or fewer
/// if fewer are available. Without a `Content-Length` the body is empty.
pub fn parse_request(src: Bytes) -> Request {
    let mut request = Request::default();
    let mut lines = Lines::new(&src);

    if let Some(request_line) = lines.next() {
        let request_line = String::from_utf8_lossy(request_line);
        let mut parts = request_line.split_ascii_whitespace();
        request.set_method(parts.next().unwrap_or_default());
        let target = parts.next().unwrap_or_default();
        request.set_version(parts.next().unwrap_or_default());

        let path = match target.split_once('?') {
            Some((path, query)) => {
                request.set_query(decode_form(query));
                path
            }
            None => target,
        };
        request.set_path(url_decode(path));
    }

    for line in lines.by_ref() {
        if line.is_empty() {
            break;
        }

        let line = String::from_utf8_lossy(line);
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim_matches(TRIM);
        if name.is_empty() {
            continue;
        }
        request.insert_header(name, value.trim_matches(TRIM));
    }

    let body_start = lines.position();
    let body_len = request.content_length().min(src.len() - body_start);
    if body_len > 0 {
        request.set_body(src.slice(body_start..body_start + body_len));
    }

    request
}

/// Returns the `Content-Length` declared in a header section, `0` when absent
/// or unparseable.
pub(crate) fn declared_content_length(head: &[u8]) -> usize {
    Lines::new(head)
        .skip(1)
        .take_while(|line| !line.is_empty())
        .filter_map(|line| {
            let line = std::str::from_utf8(line).ok()?;
            let (name, value) = line.split_once(':')?;
            name.trim_matches(TRIM)
                .eq_ignore_ascii_case(http::header::CONTENT_LENGTH.as_str())
                .then(|| value.trim_matches(TRIM).parse().unwrap_or(0))
        })
        .last()
        .unwrap_or(0)
}

/// Iterates over the lines of a buffer, stripping the `\n` and an optional
/// trailing `\r`.
struct Lines<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lines<'a> {
    fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0 }
    }

    /// Offset of the first byte not yet consumed.
    fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.src.get(self.pos..).filter(|rest| !rest.is_empty())?;
        let (line, consumed) = match rest.iter().position(|&b| b == b'\n') {
            Some(n) => (&rest[..n], n + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        Some(line.strip_suffix(b"\r").unwrap_or(line))
    }
}
