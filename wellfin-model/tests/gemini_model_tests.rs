use serde_json::json;
use url::Url;
use wellfin_core::{FinishReason, TextModel};
use wellfin_gemini::{GeminiBuilder, TokenSource};
use wellfin_model::GeminiModel;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn vertex_model(server: &MockServer) -> GeminiModel {
    let client = GeminiBuilder::new_without_api_key()
        .with_token_source(TokenSource::Static("token".into()))
        .with_google_cloud("wellfin", "asia-northeast1")
        .with_vertex_endpoint(Url::parse(&format!("{}/", server.uri())).unwrap())
        .build()
        .unwrap();
    GeminiModel::new(client)
}

#[tokio::test]
async fn sends_service_generation_settings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/v1/projects/wellfin/locations/asia-northeast1/publishers/google/models/gemini-1.5-flash:generateContent",
        ))
        .and(body_partial_json(json!({
            "generationConfig": {"maxOutputTokens": 1024, "responseMimeType": "application/json"},
            "safetySettings": [
                {"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                {"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"title\":\"t\"}"}]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = vertex_model(&server).await;
    assert_eq!(model.name(), "gemini-1.5-flash");

    let reply = model.generate("prompt").await.unwrap();
    let candidate = reply.first().unwrap();
    assert_eq!(candidate.text, "{\"title\":\"t\"}");
    assert_eq!(candidate.finish_reason, Some(FinishReason::Stop));

    let info = model.provider_info();
    assert_eq!(info.provider, "vertex-ai");
    assert_eq!(info.project.as_deref(), Some("wellfin"));
    assert_eq!(info.credentials.as_deref(), Some("static access token"));
}

#[tokio::test]
async fn provider_errors_become_model_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
        .mount(&server)
        .await;

    let model = vertex_model(&server).await;
    let err = model.generate("prompt").await.unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Model error:"));
    assert!(message.contains("403"));
    assert!(message.contains("PERMISSION_DENIED"));
}
