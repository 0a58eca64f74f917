//! Rendering of a request as a reproducible `curl` command line

use std::fmt::Write as _;

use reqwest::header::HeaderMap;

use crate::method::RequestMethod;

/// Quotes `s` for a POSIX shell.
///
/// Values without a single quote are wrapped in single quotes as-is; anything
/// else falls back to an escaped double-quoted form.
pub fn quote_sh(s: &str) -> String {
    if s.contains('\'') {
        quote_escaped(s)
    } else {
        format!("'{s}'")
    }
}

fn quote_escaped(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Spells a header name the way it is conventionally written, e.g.
/// `content-type` as `Content-Type`.
fn canonical_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let c = if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() };
            upper = c == '-';
            c
        })
        .collect()
}

/// Builds `curl -v -X <METHOD> -H "<name>: <value>" ... --data-binary '<body>' '<url>'`.
///
/// `body` is the payload as it was before compression.
pub(crate) fn render(
    method: RequestMethod,
    headers: &HeaderMap,
    body: Option<&[u8]>,
    url: &str,
) -> String {
    let mut args: Vec<String> = vec!["curl".into(), "-v".into(), "-X".into(), method.as_str().into()];
    for (name, value) in headers {
        args.push("-H".into());
        args.push(format!(
            "\"{}: {}\"",
            canonical_name(name.as_str()),
            String::from_utf8_lossy(value.as_bytes())
        ));
    }
    if let Some(body) = body.filter(|body| !body.is_empty()) {
        args.push("--data-binary".into());
        args.push(quote_sh(&String::from_utf8_lossy(body)));
    }
    args.push(quote_sh(url));
    args.join(" ")
}
