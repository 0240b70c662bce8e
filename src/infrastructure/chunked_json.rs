// Chunked JSON streaming utilities
use crate::domain::stream::StreamMessage;
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;

/// Create a chunked streaming response of length-prefixed JSON messages
pub async fn chunked_json_stream<S>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = StreamMessage> + Send + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(msg, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding on the response.
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson-chunked")
        .header(header::TRANSFER_ENCODING, "chunked");

    response
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single StreamMessage to a chunk: 4-byte big-endian length, then payload
pub async fn serialize_chunk(msg: StreamMessage, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&msg).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let length = u32::try_from(payload.len()).map_err(std::io::Error::other)?;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver
pub async fn stream_from_receiver(
    mut rx: tokio::sync::mpsc::Receiver<StreamMessage>,
    compress: bool,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield msg;
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chunk_is_length_prefixed_json() {
        let msg = StreamMessage::TileUpdate {
            tab_id: "market".to_string(),
            tile_id: "imbalance-cost".to_string(),
            value: 12.5,
        };
        let chunk = serialize_chunk(msg, false)
            .await
            .unwrap();
        let length = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
        assert_eq!(length, chunk.len() - 4);
        let value: serde_json::Value = serde_json::from_slice(&chunk[4..]).unwrap();
        assert_eq!(value["type"], "tile");
        assert_eq!(value["tile_id"], "imbalance-cost");
    }

    #[tokio::test]
    async fn receiver_is_drained_into_body() {
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        tx.send(StreamMessage::Complete { widget_count: 0, duration_ms: 1 }).await.unwrap();
        tx.send(StreamMessage::Complete { widget_count: 0, duration_ms: 2 }).await.unwrap();
        drop(tx);

        let response = stream_from_receiver(rx, false).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let mut offset = 0;
        let mut frames = 0;
        while offset < body.len() {
            let len = u32::from_be_bytes(body[offset..offset + 4].try_into().unwrap()) as usize;
            offset += 4 + len;
            frames += 1;
        }
        assert_eq!(offset, body.len());
        assert_eq!(frames, 2);
    }
}
