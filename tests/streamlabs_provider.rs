use std::time::Duration;

use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::json;

use streamrelay::application::{AppError, DonationSource};
use streamrelay::infrastructure::streamlabs_provider::StreamlabsDonationSource;

fn source(server: &MockServer) -> StreamlabsDonationSource {
    StreamlabsDonationSource::new(
        server.url("/api/v1.0/donations"),
        "tok".to_string(),
        Duration::from_secs(2),
    )
    .unwrap()
}

#[tokio::test]
async fn fetch_returns_data_array_in_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1.0/donations")
                .query_param("access_token", "tok");
            then.status(200).json_body(json!({
                "data": [
                    {"donation_id": 2, "type": "donation", "platform": "streamlabs", "name": "B"},
                    {"donation_id": 1, "type": "donation", "platform": "streamlabs", "name": "A"}
                ]
            }));
        })
        .await;

    let records = source(&server).fetch().await.unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "B");
    assert_eq!(records[1]["name"], "A");
}

#[tokio::test]
async fn server_error_is_a_provider_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1.0/donations");
            then.status(500);
        })
        .await;

    let err = source(&server).fetch().await.unwrap_err();
    assert!(matches!(err, AppError::Provider(_)));
}

#[tokio::test]
async fn body_without_data_is_a_provider_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1.0/donations");
            then.status(200).body("{\"error\": \"invalid token\"}");
        })
        .await;

    let err = source(&server).fetch().await.unwrap_err();
    assert!(matches!(err, AppError::Provider(_)));
}
