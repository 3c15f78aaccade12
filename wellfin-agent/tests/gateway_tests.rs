use std::sync::Arc;

use wellfin_agent::{GatewayError, ModelGateway};
use wellfin_core::ModelReply;
use wellfin_model::MockModel;

fn gateway(mock: MockModel) -> ModelGateway {
    ModelGateway::new(Arc::new(mock))
}

#[tokio::test]
async fn extracts_object_from_fenced_reply() {
    let gw = gateway(MockModel::new("mock").with_text("```json\n{\"title\": \"a {b}\", \"n\": 2}\n```"));
    let object = gw.invoke("p", "task analysis").await.unwrap();
    assert_eq!(object["title"], "a {b}");
    assert_eq!(object["n"], 2);
}

#[tokio::test]
async fn provider_failure_is_model_unavailable() {
    let gw = gateway(MockModel::new("mock").with_error("403 PERMISSION_DENIED"));
    let err = gw.invoke("p", "task analysis").await.unwrap_err();
    assert!(matches!(err, GatewayError::ModelUnavailable(ref m) if m.contains("PERMISSION_DENIED")));
}

#[tokio::test]
async fn empty_and_blocked_replies() {
    let gw = gateway(MockModel::new("mock").with_empty_reply());
    assert_eq!(gw.invoke("p", "op").await.unwrap_err(), GatewayError::EmptyResponse);

    let gw = gateway(MockModel::new("mock").with_safety_block());
    assert!(matches!(gw.invoke("p", "op").await.unwrap_err(), GatewayError::ContentBlocked { .. }));

    let gw = gateway(MockModel::new("mock").with_reply(ModelReply {
        candidates: vec![],
        blocked_reason: Some("PROHIBITED_CONTENT".into()),
    }));
    assert_eq!(
        gw.invoke("p", "op").await.unwrap_err(),
        GatewayError::ContentBlocked { reason: "PROHIBITED_CONTENT".into() }
    );
}

#[tokio::test]
async fn prose_only_and_invalid_json() {
    let gw = gateway(MockModel::new("mock").with_text("申し訳ありませんが、回答できません。"));
    assert_eq!(
        gw.invoke("p", "recommendations").await.unwrap_err(),
        GatewayError::MalformedOutput { operation: "recommendations".into() }
    );

    let gw = gateway(MockModel::new("mock").with_text("{title: unquoted}"));
    assert!(matches!(gw.invoke("p", "op").await.unwrap_err(), GatewayError::InvalidJson { .. }));
}
