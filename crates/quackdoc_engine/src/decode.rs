use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decode raw bytes into UTF-8 using: BOM -> charset hint -> chardetng fallback.
///
/// `charset_hint` is either a bare label (`utf-8`) or a content-type style
/// value (`text/html; charset=ISO-8859-1`).
pub fn decode_text(bytes: &[u8], charset_hint: Option<&str>) -> Result<DecodedText, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = charset_hint.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn extract_charset(hint: &str) -> Option<String> {
    if !hint.contains(';') && !hint.contains('=') {
        let label = hint.trim();
        return (!label.is_empty()).then(|| label.to_string());
    }
    hint.split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches([' ', '"', '\''].as_ref()))
        })
        .next()
        .map(|s| s.to_string())
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedText, DecodeError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: enc.name().to_string(),
            message: "malformed byte sequence".into(),
        });
    }
    Ok(DecodedText {
        text: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_label_and_content_type_hints() {
        assert_eq!(extract_charset("utf-8").as_deref(), Some("utf-8"));
        assert_eq!(
            extract_charset("text/html; Charset=\"ISO-8859-1\"").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(extract_charset("text/html"), Some("text/html".to_string()));
        assert_eq!(extract_charset("text/html; q=1"), None);
    }

    #[test]
    fn latin1_hint_decodes() {
        let decoded = decode_text(b"caf\xe9", Some("charset=ISO-8859-1")).unwrap();
        assert_eq!(decoded.text, "café");
    }

    #[test]
    fn bom_wins_over_hint() {
        let decoded = decode_text(b"\xEF\xBB\xBFhello", Some("windows-1252")).unwrap();
        assert_eq!(decoded.text, "hello");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn invalid_utf8_with_utf8_hint_is_an_error() {
        let err = decode_text(b"ok \xc3", Some("utf-8")).unwrap_err();
        assert!(matches!(err, DecodeError::DecodeFailure { ref encoding, .. } if encoding == "UTF-8"));
    }
}
