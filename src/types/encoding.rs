use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::TxirimiriError;

/// Decode a required base64 field. A leading `data:<mime>;base64,` prefix is
/// accepted, as produced by `canvas.toDataURL()`. Empty input or output is rejected.
pub fn decode_base64_field(field: &'static str, raw: &str) -> Result<Vec<u8>, TxirimiriError> {
    let raw = raw.trim();
    let payload = match raw.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| TxirimiriError::bad_request(format!("{field} is not a base64 data URL")))?,
        None => raw,
    };
    if payload.is_empty() {
        return Err(TxirimiriError::bad_request(format!("{field} is empty")));
    }
    let bytes = STANDARD.decode(payload)?;
    if bytes.is_empty() {
        return Err(TxirimiriError::bad_request(format!("{field} is empty")));
    }
    Ok(bytes)
}

/// Optional variant: absent or blank means "not supplied".
pub fn decode_optional_base64_field(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<Vec<u8>>, TxirimiriError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => decode_base64_field(field, s).map(Some),
        None => Ok(None),
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_data_url_payloads() {
        let plain = decode_base64_field("image_base64", "/9j/4AAQ").unwrap();
        let url = decode_base64_field("image_base64", "data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(plain, url);
        assert_eq!(&plain[..2], &[0xff, 0xd8]);
    }

    #[test]
    fn rejects_empty_and_invalid_payloads() {
        assert!(matches!(
            decode_base64_field("image_base64", "  "),
            Err(TxirimiriError::BadRequest(_))
        ));
        assert!(matches!(
            decode_base64_field("image_base64", "data:image/png,abc"),
            Err(TxirimiriError::BadRequest(_))
        ));
        assert!(matches!(
            decode_base64_field("image_base64", "not base64!"),
            Err(TxirimiriError::Base64(_))
        ));
    }

    #[test]
    fn optional_blank_is_none() {
        assert_eq!(decode_optional_base64_field("thumbnail_base64", Some("")).unwrap(), None);
        assert_eq!(decode_optional_base64_field("thumbnail_base64", None).unwrap(), None);
    }
}
