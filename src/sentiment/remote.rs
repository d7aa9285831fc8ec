//! Hosted sentiment model client
//!
//! Sends comments to an HTTP inference endpoint serving a pretrained
//! three-class sentiment model and maps the returned labels onto a
//! [`SentimentTriple`].

use super::classifier::{SentimentClassifier, SentimentLabel, SentimentTriple};
use crate::defaults;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// One label/score pair from the model
#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Response shapes returned by inference endpoints
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Failure { error: String },
}

/// Classifier backed by a hosted pretrained model
pub struct InferenceApiClassifier {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
    max_input_tokens: usize,
}

impl InferenceApiClassifier {
    /// Create a client for an explicit endpoint URL
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_token: None,
            max_input_tokens: defaults::MAX_INPUT_TOKENS,
        })
    }

    /// Create a client for a model hosted on the default inference service
    pub fn for_model(model: &str, timeout: Duration) -> Result<Self> {
        Self::new(format!("{}/{}", BASE_URL, model), timeout)
    }

    /// Set the bearer token sent with each request
    pub fn with_api_token(mut self, api_token: Option<String>) -> Self {
        self.api_token = api_token;
        self
    }

    /// Set the maximum input length in tokens
    pub fn with_max_input_tokens(mut self, max_input_tokens: usize) -> Self {
        self.max_input_tokens = max_input_tokens.max(1);
        self
    }

    /// Endpoint URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request body for one or more inputs
    ///
    /// Word truncation happens before the request; the endpoint also cuts
    /// inputs longer than the model's subword limit instead of rejecting them.
    fn request_body(inputs: serde_json::Value) -> serde_json::Value {
        json!({
            "inputs": inputs,
            "parameters": { "truncation": true },
            "options": { "wait_for_model": true },
        })
    }

    fn post(&self, inputs: serde_json::Value) -> Result<InferenceResponse> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&Self::request_body(inputs));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        if !response.status().is_success() {
            return Err(Error::ClassifierError(format!(
                "inference endpoint returned {}",
                response.status()
            )));
        }

        Ok(response.json()?)
    }

    /// Convert label/score pairs into a triple
    fn to_triple(scores: &[LabelScore]) -> Result<SentimentTriple> {
        let mut probabilities = [0.0; 3];
        let mut seen = 0;

        for entry in scores {
            let label = SentimentLabel::parse(&entry.label).ok_or_else(|| {
                Error::ClassifierError(format!("unexpected label '{}'", entry.label))
            })?;
            let index = match label {
                SentimentLabel::Negative => 0,
                SentimentLabel::Neutral => 1,
                SentimentLabel::Positive => 2,
            };
            probabilities[index] = entry.score;
            seen += 1;
        }

        if seen == 0 {
            return Err(Error::ClassifierError("response contained no labels".to_string()));
        }

        SentimentTriple::from_scores(probabilities[0], probabilities[1], probabilities[2])
    }

    fn parse_single(response: InferenceResponse) -> Result<SentimentTriple> {
        match response {
            InferenceResponse::Nested(mut rows) if rows.len() == 1 => {
                Self::to_triple(&rows.remove(0))
            }
            InferenceResponse::Nested(rows) => Err(Error::ClassifierError(format!(
                "expected one result, got {}",
                rows.len()
            ))),
            InferenceResponse::Flat(scores) => Self::to_triple(&scores),
            InferenceResponse::Failure { error } => Err(Error::ClassifierError(error)),
        }
    }

    /// Parse a response body for a single input
    pub fn parse_response(body: &str) -> Result<SentimentTriple> {
        let response: InferenceResponse = serde_json::from_str(body)?;
        Self::parse_single(response)
    }
}

impl SentimentClassifier for InferenceApiClassifier {
    fn name(&self) -> &str {
        &self.endpoint
    }

    fn max_input_tokens(&self) -> usize {
        self.max_input_tokens
    }

    fn classify(&self, text: &str) -> Result<SentimentTriple> {
        if text.trim().is_empty() {
            return Err(Error::ClassifierError("empty input".to_string()));
        }

        debug!(endpoint = %self.endpoint, chars = text.len(), "Requesting classification");
        Self::parse_single(self.post(json!(text))?)
    }

    fn classify_batch(&self, texts: &[&str]) -> Vec<Result<SentimentTriple>> {
        if texts.len() <= 1 {
            return texts.iter().map(|text| self.classify(text)).collect();
        }

        let failed = |message: String| -> Vec<Result<SentimentTriple>> {
            texts
                .iter()
                .map(|_| Err(Error::ClassifierError(message.clone())))
                .collect()
        };

        match self.post(json!(texts)) {
            Ok(InferenceResponse::Nested(rows)) if rows.len() == texts.len() => {
                rows.iter().map(|row| Self::to_triple(row)).collect()
            }
            Ok(InferenceResponse::Failure { error }) => failed(error),
            Ok(_) => failed("batch response does not match the number of inputs".to_string()),
            Err(e) => failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_parse_nested_response() {
        let body = r#"[[{"label":"positive","score":0.9},{"label":"neutral","score":0.07},{"label":"negative","score":0.03}]]"#;
        let triple = InferenceApiClassifier::parse_response(body).unwrap();
        assert_abs_diff_eq!(triple.positive, 0.9, epsilon = 1e-9);
        assert_abs_diff_eq!(triple.negative, 0.03, epsilon = 1e-9);
        assert!(triple.is_valid());
    }

    #[test]
    fn test_parse_positional_labels() {
        let body = r#"[{"label":"LABEL_0","score":0.6},{"label":"LABEL_1","score":0.3},{"label":"LABEL_2","score":0.1}]"#;
        let triple = InferenceApiClassifier::parse_response(body).unwrap();
        assert_eq!(triple.dominant(), SentimentLabel::Negative);
    }

    #[test]
    fn test_parse_partial_scores_renormalized() {
        let body = r#"[[{"label":"positive","score":0.6},{"label":"negative","score":0.2}]]"#;
        let triple = InferenceApiClassifier::parse_response(body).unwrap();
        assert_abs_diff_eq!(triple.positive, 0.75, epsilon = 1e-9);
        assert_abs_diff_eq!(triple.neutral, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"error":"Model is currently loading"}"#;
        let err = InferenceApiClassifier::parse_response(body).unwrap_err();
        assert!(matches!(err, Error::ClassifierError(msg) if msg.contains("loading")));
    }

    #[test]
    fn test_unknown_label_rejected() {
        let body = r#"[{"label":"joy","score":1.0}]"#;
        assert!(InferenceApiClassifier::parse_response(body).is_err());
    }

    #[test]
    fn test_endpoint_for_model() {
        let classifier =
            InferenceApiClassifier::for_model(defaults::INFERENCE_MODEL, Duration::from_secs(5))
                .unwrap();
        assert!(classifier
            .endpoint()
            .ends_with("cardiffnlp/twitter-roberta-base-sentiment-latest"));
    }

    #[test]
    fn test_request_asks_endpoint_to_truncate() {
        let long_comment = vec!["wonderful"; 600].join(" ");
        let body = InferenceApiClassifier::request_body(json!(long_comment));

        assert_eq!(body["parameters"]["truncation"], json!(true));
        assert_eq!(body["options"]["wait_for_model"], json!(true));
        assert_eq!(body["inputs"], json!(long_comment));
    }

    #[test]
    fn test_batch_request_keeps_input_order() {
        let body = InferenceApiClassifier::request_body(json!(["first", "second"]));
        assert_eq!(body["inputs"], json!(["first", "second"]));
        assert_eq!(body["parameters"]["truncation"], json!(true));
    }
}
