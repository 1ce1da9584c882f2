// src/feed/decode.rs
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

/// Decode a fetched feed body to text.
///
/// Precedence: byte-order mark, then the XML declaration's `encoding`, then the
/// `Content-Type` charset, then UTF-8. Undecodable bytes become U+FFFD.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = Encoding::for_bom(bytes)
        .map(|(enc, _)| enc)
        .or_else(|| xml_declared_encoding(bytes))
        .or_else(|| content_type.and_then(charset_from_content_type))
        .unwrap_or(UTF_8);
    tracing::debug!(encoding = encoding.name(), "decoding feed body");
    // `decode` strips a matching BOM.
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(
            encoding = encoding.name(),
            "feed body had bytes invalid for its encoding"
        );
    }
    text.into_owned()
}

/// `encoding="..."` from a leading `<?xml ...?>` declaration.
fn xml_declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let decl = head.trim_start().strip_prefix("<?xml")?;
    let decl = &decl[..decl.find("?>")?];
    let after = &decl[decl.find("encoding")? + "encoding".len()..];
    let after = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after[1..];
    let label = &value[..value.find(quote)?];
    let enc = Encoding::for_label(label.trim().as_bytes())?;
    // A declaration readable as ASCII cannot be in UTF-16; BOM-less UTF-16 is handled above.
    if enc == UTF_16LE || enc == UTF_16BE {
        return None;
    }
    Some(enc)
}

fn charset_from_content_type(ct: &str) -> Option<&'static Encoding> {
    ct.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Encoding::for_label(value.trim().trim_matches('"').as_bytes())
    })
}
