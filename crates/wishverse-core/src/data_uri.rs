//! `data:` URI handling for image payloads.
//!
//! Simple base64 implementation (standard alphabet, padded), enough for
//! moving images between the browser, the image pipeline and the API.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

pub fn base64_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(3) {
        let b = [
            chunk[0],
            chunk.get(1).copied().unwrap_or(0),
            chunk.get(2).copied().unwrap_or(0),
        ];
        let n = (b[0] as u32) << 16 | (b[1] as u32) << 8 | b[2] as u32;
        out.push(ALPHABET[(n >> 18 & 63) as usize] as char);
        out.push(ALPHABET[(n >> 12 & 63) as usize] as char);
        out.push(if chunk.len() > 1 {
            ALPHABET[(n >> 6 & 63) as usize] as char
        } else {
            '='
        });
        out.push(if chunk.len() > 2 {
            ALPHABET[(n & 63) as usize] as char
        } else {
            '='
        });
    }
    out
}

fn decode_char(c: u8) -> Option<u32> {
    match c {
        b'A'..=b'Z' => Some((c - b'A') as u32),
        b'a'..=b'z' => Some((c - b'a' + 26) as u32),
        b'0'..=b'9' => Some((c - b'0' + 52) as u32),
        b'+' | b'-' => Some(62),
        b'/' | b'_' => Some(63),
        _ => None,
    }
}

/// Decode base64, tolerating missing padding, whitespace and the URL-safe alphabet.
pub fn base64_decode(input: &str) -> Option<Vec<u8>> {
    let clean: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let body = match clean.iter().position(|&b| b == b'=') {
        Some(pos) => {
            if clean[pos..].iter().any(|&b| b != b'=') || clean.len() - pos > 2 {
                return None;
            }
            &clean[..pos]
        }
        None => &clean[..],
    };
    if body.len() % 4 == 1 {
        return None;
    }

    let mut out = Vec::with_capacity(body.len() * 3 / 4);
    for chunk in body.chunks(4) {
        let mut n = 0u32;
        for (i, &c) in chunk.iter().enumerate() {
            n |= decode_char(c)? << (18 - 6 * i);
        }
        out.push((n >> 16) as u8);
        if chunk.len() > 2 {
            out.push((n >> 8) as u8);
        }
        if chunk.len() > 3 {
            out.push(n as u8);
        }
    }
    Some(out)
}

/// A parsed `data:{mime};base64,{payload}` URI. The payload stays encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime: &'a str,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Parse a base64 data URI. Non-base64 (percent-encoded) URIs are rejected.
    pub fn parse(uri: &'a str) -> Option<DataUri<'a>> {
        let rest = uri.trim().strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;
        let mime = meta.strip_suffix(";base64")?;
        Some(DataUri {
            mime: if mime.is_empty() { "text/plain" } else { mime },
            payload,
        })
    }

    pub fn decode(&self) -> Option<Vec<u8>> {
        base64_decode(self.payload)
    }
}

pub fn format_data_uri(mime: &str, payload_b64: &str) -> String {
    format!("data:{mime};base64,{payload_b64}")
}

/// Strip a `data:image/...;base64,` prefix if present, leaving bare base64.
pub fn strip_data_prefix(data: &str) -> &str {
    DataUri::parse(data).map(|u| u.payload).unwrap_or(data)
}
