//! Text decoding helpers for XML documents pulled out of the archive.

use std::borrow::Cow;

/// Strip a UTF-8 byte order mark if present.
pub fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

/// Decode XML bytes to text.
///
/// UTF-8 is tried first. If the bytes are not valid UTF-8, the encoding
/// named in the `<?xml ... encoding="..."?>` declaration is used, and
/// failing that Windows-1252 (common in old OEBPS packages).
pub fn decode_xml(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = strip_bom(bytes);
    let (text, _, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return text;
    }

    if let Some(label) = extract_xml_encoding(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes())
    {
        let (text, _, _) = encoding.decode(bytes);
        return text;
    }

    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text
}

/// Extract the encoding label from an XML declaration.
///
/// Only the first 100 bytes are inspected.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let decl = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_decl = &prefix[decl..];

    let enc = after_decl
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_decl[enc + 9..];

    let (&quote, rest) = after_enc.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = rest.iter().position(|&b| b == quote)?;

    std::str::from_utf8(&rest[..end]).ok()
}

/// Join a package directory and a manifest href into an archive path.
///
/// `..` and `.` segments are folded; a `..` that would climb above the
/// archive root is dropped.
pub fn resolve_href(base: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);
    let mut parts: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();

    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    parts.join("/")
}
