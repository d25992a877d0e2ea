//! Integration tests for the default streaming behaviour

use ai_processor::{AiClient, ClientError, StreamChunk};
use futures::stream::StreamExt;

/// Client with no native streaming
struct OneShotClient {
    reply: Result<&'static str, &'static str>,
}

#[async_trait::async_trait]
impl AiClient for OneShotClient {
    async fn send_prompt(&self, _prompt: &str) -> Result<String, ClientError> {
        self.reply
            .map(str::to_string)
            .map_err(|e| ClientError::Stream(e.to_string()))
    }

    fn name(&self) -> &str {
        "OneShot"
    }

    fn model(&self) -> &str {
        "one-shot-1"
    }
}

#[tokio::test]
async fn test_default_stream_is_single_finished_chunk() {
    let client: Box<dyn AiClient> = Box::new(OneShotClient {
        reply: Ok("whole answer"),
    });
    assert!(!client.supports_streaming());

    let chunks: Vec<_> = client.stream_prompt("test").await.unwrap().collect().await;
    assert_eq!(chunks.len(), 1);
    assert_eq!(
        chunks[0].as_ref().unwrap(),
        &StreamChunk {
            content: "whole answer".to_string(),
            finished: true
        }
    );
}

#[tokio::test]
async fn test_default_stream_fails_before_yielding() {
    let client = OneShotClient {
        reply: Err("connection lost"),
    };
    let err = match client.stream_prompt("test").await {
        Ok(_) => panic!("stream opened despite failed call"),
        Err(err) => err,
    };
    assert_eq!(err.to_string(), "Stream error: connection lost");
}
