use meeting_finder::http_config::HttpConfig;
use meeting_finder::{AppError, CreateMeetingRequest, MeetingApiClient, MeetingId, MeetingSource};
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

fn fast_config(max_retries: u32) -> HttpConfig {
    HttpConfig {
        connect_timeout: Duration::from_secs(2),
        timeout: Duration::from_secs(5),
        max_retries,
        base_retry_delay: Duration::from_millis(1),
        max_retry_delay: Duration::from_millis(5),
        backoff_multiplier: 2.0,
    }
}

fn client_for(server: &Server) -> MeetingApiClient {
    MeetingApiClient::with_http_config(&server.url(), fast_config(3), fast_config(2)).unwrap()
}

#[tokio::test]
async fn test_fetch_meetings() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/meetings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id": 1, "title": "Default Meeting", "description": "d", "latitude": 37.7749, "longitude": -122.4194},
                {"id": "b-2", "title": "Stringly", "latitude": "37.8", "longitude": "-122.3"},
                {"title": "No id"}
            ]"#,
        )
        .create_async()
        .await;

    let meetings = client_for(&server).fetch_meetings().await.unwrap();

    mock.assert_async().await;
    assert_eq!(meetings.len(), 2);
    assert_eq!(meetings[0].id, MeetingId::Int(1));
    assert_eq!(meetings[1].id, MeetingId::Text("b-2".to_string()));
    assert!(meetings[1].coordinate().is_some());
}

#[tokio::test]
async fn test_fetch_retries_transient_failures() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/meetings")
        .with_status(503)
        .with_body("Service Unavailable")
        .expect(3)
        .create_async()
        .await;

    let result = client_for(&server).fetch_meetings().await;

    mock.assert_async().await;
    assert!(matches!(result, Err(AppError::Api { status: 503, .. })));
}

#[tokio::test]
async fn test_fetch_does_not_retry_client_errors() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/meetings")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "No such route"}"#)
        .expect(1)
        .create_async()
        .await;

    let result = client_for(&server).fetch_meetings().await;

    mock.assert_async().await;
    match result {
        Err(AppError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "No such route");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_rejects_non_array_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/meetings")
        .with_status(200)
        .with_body(r#"{"meetings": []}"#)
        .create_async()
        .await;

    let result = client_for(&server).fetch_meetings().await;
    assert!(matches!(result, Err(AppError::Json(_))));
}

#[tokio::test]
async fn test_circuit_opens_after_repeated_outages() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/meetings")
        .with_status(502)
        .expect(5)
        .create_async()
        .await;

    let client = MeetingApiClient::with_http_config(&server.url(), fast_config(1), fast_config(1)).unwrap();
    for _ in 0..5 {
        assert!(client.fetch_meetings().await.is_err());
    }

    let result = client.fetch_meetings().await;
    mock.assert_async().await;
    assert!(matches!(result, Err(AppError::CircuitOpen(_))));
}

#[tokio::test]
async fn test_create_meeting() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/meetings")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "title": "Step Study",
            "description": "Thursdays",
            "latitude": 37.78,
            "longitude": -122.41
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 77, "title": "Step Study", "description": "Thursdays", "latitude": 37.78, "longitude": -122.41}"#)
        .create_async()
        .await;

    let request = CreateMeetingRequest {
        title: "Step Study".to_string(),
        description: "Thursdays".to_string(),
        latitude: 37.78,
        longitude: -122.41,
    };
    let created = client_for(&server).create_meeting(request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(created.id, MeetingId::Int(77));
    assert_eq!(created.title, "Step Study");
}

#[tokio::test]
async fn test_create_meeting_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/meetings")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let request = CreateMeetingRequest {
        title: "Step Study".to_string(),
        description: "Thursdays".to_string(),
        latitude: 37.78,
        longitude: -122.41,
    };
    let result = client_for(&server).create_meeting(request).await;

    mock.assert_async().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_upload_selfie() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/upload_selfie")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="selfie""#.to_string()),
            Matcher::Regex(r#"filename="me.jpg""#.to_string()),
            Matcher::Regex("fake-jpeg-bytes".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    client_for(&server)
        .upload_selfie("me.jpg".to_string(), b"fake-jpeg-bytes".to_vec())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_selfie_error_body() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/upload_selfie")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "No selfie provided"}"#)
        .create_async()
        .await;

    let result = client_for(&server)
        .upload_selfie("me.jpg".to_string(), b"fake-jpeg-bytes".to_vec())
        .await;

    match result {
        Err(AppError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "No selfie provided");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_selfie_error_with_success_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/upload_selfie")
        .with_status(200)
        .with_body(r#"{"error": "Face not detected"}"#)
        .create_async()
        .await;

    let result = client_for(&server)
        .upload_selfie("me.png".to_string(), b"png".to_vec())
        .await;

    assert!(matches!(result, Err(AppError::Api { status: 200, .. })));
}

#[tokio::test]
async fn test_upload_rejects_empty_image_without_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/upload_selfie").expect(0).create_async().await;

    let result = client_for(&server).upload_selfie("me.jpg".to_string(), Vec::new()).await;

    mock.assert_async().await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}
