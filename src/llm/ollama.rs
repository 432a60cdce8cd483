use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

use super::provider::LlmProvider;
use super::types::GenerationRequest;
use crate::core::errors::ApiError;

#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: super::http_client(),
        }
    }
}

fn generate_body(request: &GenerationRequest, model_id: &str) -> Value {
    let mut options = Map::new();
    if let Some(t) = request.temperature { options.insert("temperature".to_string(), json!(t)); }
    if let Some(t) = request.top_p { options.insert("top_p".to_string(), json!(t)); }
    if let Some(t) = request.max_tokens { options.insert("num_predict".to_string(), json!(t)); }
    if let Some(s) = &request.stop { options.insert("stop".to_string(), json!(s)); }

    let mut body = json!({
        "model": model_id,
        "prompt": request.prompt,
        "stream": false,
    });
    if !options.is_empty() {
        if let Some(obj) = body.as_object_mut() {
            obj.insert("options".to_string(), Value::Object(options));
        }
    }
    body
}

fn parse_generate_response(payload: &Value) -> Result<String, ApiError> {
    if let Some(err) = payload["error"].as_str() {
        return Err(ApiError::Internal(format!("Ollama generate error: {}", err)));
    }
    payload["response"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Internal("Ollama response has no text".to_string()))
}

fn parse_embed_response(payload: &Value) -> Result<Vec<Vec<f32>>, ApiError> {
    let data = payload["embeddings"]
        .as_array()
        .ok_or_else(|| ApiError::Internal("Ollama embed response has no embeddings".to_string()))?;

    Ok(data
        .iter()
        .filter_map(|item| item.as_array())
        .map(|vals| vals.iter().filter_map(|v| v.as_f64().map(|f| f as f32)).collect())
        .collect())
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn generate(&self, request: GenerationRequest, model_id: &str) -> Result<String, ApiError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = generate_body(&request, model_id);

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("Ollama generate error ({}): {}", status, text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        parse_generate_response(&payload)
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        let url = format!("{}/api/embed", self.base_url);
        let body = json!({
            "model": model_id,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("Ollama embed error ({}): {}", status, text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        parse_embed_response(&payload)
    }
}
