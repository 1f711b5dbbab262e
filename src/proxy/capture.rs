//! Full buffering of message bodies and single-valued header snapshots

use crate::history::HeaderSnapshot;
use crate::proxy::headers::BINARY_HEADER_PLACEHOLDER;
use bytes::Bytes;
use http::HeaderMap;
use http_body::Body;
use http_body_util::BodyExt;

/// A body read to completion.
///
/// `bytes` is the payload to forward; `text` is its lossy UTF-8 rendering for
/// the history record.
#[derive(Clone, Debug)]
pub struct CapturedBody {
    pub bytes: Bytes,
    pub text: String,
    pub size: u64,
}

impl CapturedBody {
    pub fn from_bytes(bytes: Bytes) -> Self {
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let size = bytes.len() as u64;
        Self { bytes, text, size }
    }
}

/// Read the whole body exactly once.
pub async fn capture_body<B>(body: B) -> Result<CapturedBody, B::Error>
where
    B: Body<Data = Bytes>,
{
    let bytes = body.collect().await?.to_bytes();
    Ok(CapturedBody::from_bytes(bytes))
}

/// Snapshot headers keeping the first value seen per name.
///
/// Later values of a repeated header are dropped.
pub fn snapshot_headers(headers: &HeaderMap) -> HeaderSnapshot {
    headers
        .keys()
        .map(|name| {
            let value = headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(BINARY_HEADER_PLACEHOLDER);
            (name.as_str().to_owned(), value.to_owned())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{self, HeaderValue};
    use http_body_util::{Empty, Full};

    #[tokio::test]
    async fn test_capture_full_body() {
        let captured = capture_body(Full::new(Bytes::from_static(b"{\"a\":1}")))
            .await
            .unwrap();

        assert_eq!(captured.bytes, Bytes::from_static(b"{\"a\":1}"));
        assert_eq!(captured.text, "{\"a\":1}");
        assert_eq!(captured.size, 7);
    }

    #[tokio::test]
    async fn test_capture_empty_body() {
        let captured = capture_body(Empty::<Bytes>::new()).await.unwrap();
        assert!(captured.bytes.is_empty());
        assert!(captured.text.is_empty());
        assert_eq!(captured.size, 0);
    }

    #[test]
    fn test_invalid_utf8_is_lossy_but_payload_intact() {
        let raw = Bytes::from_static(&[0x66, 0x6f, 0xff, 0x6f]);
        let captured = CapturedBody::from_bytes(raw.clone());

        assert_eq!(captured.bytes, raw);
        assert_eq!(captured.text, "fo\u{fffd}o");
        assert_eq!(captured.size, 4);
    }

    #[test]
    fn test_snapshot_keeps_first_value() {
        let mut headers = HeaderMap::new();
        headers.append(header::ACCEPT, HeaderValue::from_static("text/html"));
        headers.append(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("x-test", HeaderValue::from_static("1"));

        let snapshot = snapshot_headers(&headers);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["accept"], "text/html");
        assert_eq!(snapshot["x-test"], "1");
    }

    #[test]
    fn test_snapshot_marks_binary_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-raw",
            HeaderValue::from_bytes(&[0xfe, 0xff]).unwrap(),
        );

        let snapshot = snapshot_headers(&headers);

        assert_eq!(snapshot["x-raw"], BINARY_HEADER_PLACEHOLDER);
    }
}
