//! Remote seq2seq summarizer
//!
//! Talks to a Hugging Face Inference style endpoint:
//!
//! ```text
//! POST {endpoint}/models/{model}
//! {"inputs": "...", "parameters": {"max_length": 150, "min_length": 50, "do_sample": false, "truncation": true}}
//!
//! 200 [{"summary_text": "..."}]
//! ```
//!
//! When the primary model fails and a fallback model is configured, the
//! request is retried once against the fallback.

use super::{LengthBounds, Summarizer};
use crate::config::SummarizerConfig;
use crate::error::SummarizeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    inputs: &'a str,
    parameters: SummarizeParameters,
}

#[derive(Debug, Serialize)]
struct SummarizeParameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
    truncation: bool,
}

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: String,
}

/// Summarizer backed by an HTTP inference endpoint
pub struct HttpSummarizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    fallback_model: Option<String>,
    api_token: Option<String>,
}

impl HttpSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self, SummarizeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SummarizeError::Request)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            fallback_model: config
                .fallback_model
                .clone()
                .filter(|m| !m.is_empty() && *m != config.model),
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.endpoint, model)
    }

    async fn request(
        &self,
        model: &str,
        text: &str,
        bounds: LengthBounds,
    ) -> Result<String, SummarizeError> {
        let body = SummarizeRequest {
            inputs: text,
            parameters: SummarizeParameters {
                max_length: bounds.max_length,
                min_length: bounds.min_length,
                do_sample: false,
                truncation: true,
            },
        };

        let mut request = self.client.post(self.model_url(model)).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        debug!(model, chars = text.chars().count(), "Requesting summary");
        let response = request.send().await.map_err(SummarizeError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
                return Err(SummarizeError::Unavailable(body));
            }
            return Err(SummarizeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let items: Vec<SummaryItem> = response
            .json()
            .await
            .map_err(|e| SummarizeError::MalformedResponse(e.to_string()))?;

        let summary = items
            .into_iter()
            .next()
            .map(|item| item.summary_text.trim().to_string())
            .ok_or_else(|| SummarizeError::MalformedResponse("empty result list".to_string()))?;

        if summary.is_empty() {
            return Err(SummarizeError::EmptySummary);
        }
        Ok(summary)
    }
}

impl Summarizer for HttpSummarizer {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, text: &str, bounds: LengthBounds) -> Result<String, SummarizeError> {
        match self.request(&self.model, text, bounds).await {
            Ok(summary) => Ok(summary),
            Err(primary_err) => {
                let Some(fallback) = &self.fallback_model else {
                    return Err(primary_err);
                };
                warn!(
                    model = %self.model,
                    fallback = %fallback,
                    error = %primary_err,
                    "Primary model failed, trying fallback"
                );
                self.request(fallback, text, bounds).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned responses, one per connection, and return the request paths seen
    async fn stub_server(
        responses: Vec<(u16, &'static str)>,
    ) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut paths = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                let path = request
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or_default()
                    .to_string();
                paths.push(path);

                let reply = format!(
                    "HTTP/1.1 {status} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
            paths
        });

        (format!("http://{addr}"), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn config(endpoint: &str, fallback: Option<&str>) -> SummarizerConfig {
        SummarizerConfig {
            endpoint: endpoint.to_string(),
            model: "facebook/bart-large-cnn".to_string(),
            fallback_model: fallback.map(str::to_string),
            api_token: None,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_successful_summary() {
        let (endpoint, server) =
            stub_server(vec![(200, r#"[{"summary_text":" Terminates in 30 days. "}]"#)]).await;
        let summarizer = HttpSummarizer::new(&config(&endpoint, None)).unwrap();

        let summary = summarizer
            .summarize("This agreement shall terminate in 30 days.", LengthBounds::for_input("x"))
            .await
            .unwrap();

        assert_eq!(summary, "Terminates in 30 days.");
        assert_eq!(
            server.await.unwrap(),
            vec!["/models/facebook/bart-large-cnn".to_string()]
        );
    }

    #[tokio::test]
    async fn test_error_status_without_fallback() {
        let (endpoint, _server) =
            stub_server(vec![(401, r#"{"error":"Invalid credentials"}"#)]).await;
        let summarizer = HttpSummarizer::new(&config(&endpoint, None)).unwrap();

        let err = summarizer
            .summarize("text", LengthBounds::for_input("text"))
            .await
            .unwrap_err();

        assert!(matches!(err, SummarizeError::Status { status: 401, ref body } if body.contains("credentials")));
    }

    #[tokio::test]
    async fn test_model_loading_is_unavailable() {
        let (endpoint, _server) =
            stub_server(vec![(503, r#"{"error":"Model is loading"}"#)]).await;
        let summarizer = HttpSummarizer::new(&config(&endpoint, None)).unwrap();

        let err = summarizer
            .summarize("text", LengthBounds::for_input("text"))
            .await
            .unwrap_err();

        assert!(matches!(err, SummarizeError::Unavailable(ref body) if body.contains("loading")));
    }

    #[tokio::test]
    async fn test_fallback_used_while_primary_loading() {
        let (endpoint, server) = stub_server(vec![
            (503, r#"{"error":"Model is loading"}"#),
            (200, r#"[{"summary_text":"Fallback summary."}]"#),
        ])
        .await;
        let summarizer = HttpSummarizer::new(&config(&endpoint, Some("t5-small"))).unwrap();

        let summary = summarizer
            .summarize("text", LengthBounds::for_input("text"))
            .await
            .unwrap();

        assert_eq!(summary, "Fallback summary.");
        assert_eq!(server.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fallback_model_used_after_failure() {
        let (endpoint, server) = stub_server(vec![
            (500, r#"{"error":"boom"}"#),
            (200, r#"[{"summary_text":"Short."}]"#),
        ])
        .await;
        let summarizer = HttpSummarizer::new(&config(&endpoint, Some("t5-small"))).unwrap();

        let summary = summarizer
            .summarize("text", LengthBounds::for_input("text"))
            .await
            .unwrap();

        assert_eq!(summary, "Short.");
        assert_eq!(
            server.await.unwrap(),
            vec![
                "/models/facebook/bart-large-cnn".to_string(),
                "/models/t5-small".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_result_list_is_malformed() {
        let (endpoint, _server) = stub_server(vec![(200, "[]")]).await;
        let summarizer = HttpSummarizer::new(&config(&endpoint, None)).unwrap();

        let err = summarizer
            .summarize("text", LengthBounds::for_input("text"))
            .await
            .unwrap_err();

        assert!(matches!(err, SummarizeError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_blank_summary_is_empty() {
        let (endpoint, _server) = stub_server(vec![(200, r#"[{"summary_text":"   "}]"#)]).await;
        let summarizer = HttpSummarizer::new(&config(&endpoint, None)).unwrap();

        let err = summarizer
            .summarize("text", LengthBounds::for_input("text"))
            .await
            .unwrap_err();

        assert!(matches!(err, SummarizeError::EmptySummary));
    }

    #[tokio::test]
    async fn test_fallback_equal_to_primary_is_ignored() {
        let summarizer =
            HttpSummarizer::new(&config("http://localhost/", Some("facebook/bart-large-cnn")))
                .unwrap();
        assert!(summarizer.fallback_model.is_none());
        assert_eq!(
            summarizer.model_url("m"),
            "http://localhost/models/m".to_string()
        );
    }
}
