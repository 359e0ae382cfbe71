use std::io::Read;

use axum::http::HeaderMap;
use flate2::read::GzDecoder;
use thiserror::Error;

use sensor_domain::RuntimeConfig;

pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("invalid gzip body: {0}")]
    Gzip(#[from] std::io::Error),
}

/// Raw upload bytes, gunzipped when the client sent `Content-Encoding: gzip`.
/// The decoded size is capped at `limit` bytes.
pub fn decode_upload(headers: &HeaderMap, body: &[u8], limit: u64) -> Result<Vec<u8>, UploadError> {
    let gzipped = headers
        .get("Content-Encoding")
        .and_then(|encoding| encoding.to_str().ok())
        .is_some_and(|encoding| encoding.trim().eq_ignore_ascii_case("gzip"));
    let out = if gzipped {
        let mut decoder = GzDecoder::new(body).take(limit.saturating_add(1));
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        out
    } else {
        body.to_vec()
    };
    if out.len() as u64 > limit {
        return Err(UploadError::TooLarge { limit });
    }
    Ok(out)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use axum::http::HeaderValue;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;

    fn protected() -> RuntimeConfig {
        RuntimeConfig {
            api_token: Some("secret".to_string()),
            ..RuntimeConfig::default()
        }
    }

    #[test]
    fn open_config_allows_anonymous_requests() {
        assert!(authorize(&RuntimeConfig::default(), &HeaderMap::new()));
    }

    #[test]
    fn token_must_match_bearer_header() {
        let config = protected();
        let mut headers = HeaderMap::new();
        assert!(!authorize(&config, &headers));
        headers.insert("Authorization", HeaderValue::from_static("Bearer wrong"));
        assert!(!authorize(&config, &headers));
        headers.insert("Authorization", HeaderValue::from_static("Bearer secret"));
        assert!(authorize(&config, &headers));
        headers.insert("Authorization", HeaderValue::from_static("Bearer   "));
        assert!(!authorize(&config, &headers));
    }

    #[test]
    fn gzip_upload_is_inflated() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"a,b\n1,2\n").expect("write");
        let compressed = encoder.finish().expect("finish");

        let mut headers = HeaderMap::new();
        headers.insert("Content-Encoding", HeaderValue::from_static("gzip"));
        assert_eq!(decode_upload(&headers, &compressed, 1024).expect("decode"), b"a,b\n1,2\n");
        assert_eq!(decode_upload(&HeaderMap::new(), b"plain", 1024).expect("plain"), b"plain");
        assert!(matches!(
            decode_upload(&headers, b"not gzip", 1024),
            Err(UploadError::Gzip(_))
        ));
    }

    #[test]
    fn inflated_size_is_capped() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&"1,2\n".repeat(50_000).into_bytes()).expect("write");
        let compressed = encoder.finish().expect("finish");
        assert!(compressed.len() < 4096);

        let mut headers = HeaderMap::new();
        headers.insert("Content-Encoding", HeaderValue::from_static("gzip"));
        assert!(matches!(
            decode_upload(&headers, &compressed, 4096),
            Err(UploadError::TooLarge { limit: 4096 })
        ));
        assert_eq!(decode_upload(&headers, &compressed, 200_000).expect("decode").len(), 200_000);
        assert!(matches!(
            decode_upload(&HeaderMap::new(), b"a,b\n1,2\n", 4),
            Err(UploadError::TooLarge { .. })
        ));
    }
}
