use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::GenerationRequest;
use crate::core::errors::ApiError;

/// OpenAI-compatible server (LM Studio, llama.cpp server, vLLM, ...).
#[derive(Clone)]
pub struct LmStudioProvider {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl LmStudioProvider {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client: super::http_client(),
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

fn chat_body(request: &GenerationRequest, model_id: &str) -> Value {
    let mut body = json!({
        "model": model_id,
        "messages": request.as_messages(),
        "stream": false,
    });

    if let Some(obj) = body.as_object_mut() {
        if let Some(t) = request.temperature { obj.insert("temperature".to_string(), json!(t)); }
        if let Some(t) = request.top_p { obj.insert("top_p".to_string(), json!(t)); }
        if let Some(t) = request.max_tokens { obj.insert("max_tokens".to_string(), json!(t)); }
        if let Some(s) = &request.stop { obj.insert("stop".to_string(), json!(s)); }
    }

    body
}

fn parse_chat_content(payload: &Value) -> Result<String, ApiError> {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Internal("LM Studio response has no message content".to_string()))
}

fn parse_embeddings(payload: &Value) -> Result<Vec<Vec<f32>>, ApiError> {
    let data = payload["data"]
        .as_array()
        .ok_or_else(|| ApiError::Internal("LM Studio embed response has no data".to_string()))?;

    let mut embeddings = Vec::with_capacity(data.len());
    for item in data {
        if let Some(vals) = item["embedding"].as_array() {
            let vec: Vec<f32> = vals.iter().filter_map(|v| v.as_f64().map(|f| f as f32)).collect();
            embeddings.push(vec);
        }
    }
    Ok(embeddings)
}

#[async_trait]
impl LlmProvider for LmStudioProvider {
    fn name(&self) -> &str {
        "lmstudio"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/v1/models", self.base_url);
        let res = self.authorize(self.client.get(&url)).send().await;
        match res {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn generate(&self, request: GenerationRequest, model_id: &str) -> Result<String, ApiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = chat_body(&request, model_id);

        let res = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("LM Studio chat error ({}): {}", status, text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        parse_chat_content(&payload)
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": model_id,
            "input": inputs,
        });

        let res = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("LM Studio embed error ({}): {}", status, text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        parse_embeddings(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_body_carries_prompt_and_sampling() {
        let mut request = GenerationRequest::new("Why is the sky blue?");
        request.temperature = Some(0.1);
        request.stop = Some(vec!["###".to_string()]);

        let body = chat_body(&request, "qwen2.5");
        assert_eq!(body["model"], "qwen2.5");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Why is the sky blue?");
        assert_eq!(body["temperature"], 0.1);
        assert_eq!(body["stop"][0], "###");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn parses_chat_content() {
        let payload = json!({"choices": [{"message": {"role": "assistant", "content": " Paris \n"}}]});
        assert_eq!(parse_chat_content(&payload).unwrap(), " Paris \n");
        assert!(parse_chat_content(&json!({"choices": []})).is_err());
    }

    #[test]
    fn parses_embeddings_in_order() {
        let payload = json!({"data": [{"embedding": [0.5, 1.0]}, {"embedding": [2.0, -1.0]}]});
        assert_eq!(
            parse_embeddings(&payload).unwrap(),
            vec![vec![0.5, 1.0], vec![2.0, -1.0]]
        );
        assert!(parse_embeddings(&json!({"error": "x"})).is_err());
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let provider = LmStudioProvider::new("http://localhost:1234/".to_string(), Some(" ".to_string()));
        assert!(provider.api_key.is_none());
        assert_eq!(provider.base_url, "http://localhost:1234");
    }
}
