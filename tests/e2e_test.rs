//! End-to-end tests against a running deployment.
//!
//! These tests require:
//! 1. Redis running
//! 2. API server running on the configured port
//! 3. Worker process running
//!
//! Run with: cargo test --test e2e_test -- --ignored --nocapture
//!
//! Set API_BASE_URL to override the default (http://localhost:3000)

use std::time::Duration;
use tokio::time::sleep;

fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn test_png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_fn(320, 200, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 30])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

async fn upload(
    client: &reqwest::Client,
    filename: &str,
    operation: Option<&str>,
) -> serde_json::Value {
    let part = reqwest::multipart::Part::bytes(test_png_bytes())
        .file_name(filename.to_string())
        .mime_str("image/png")
        .unwrap();
    let mut form = reqwest::multipart::Form::new().part("file", part);
    if let Some(op) = operation {
        form = form.text("operation", op.to_string());
    }

    let response = client
        .post(format!("{}/process-image/", base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Upload request failed");
    assert!(response.status().is_success(), "upload returned {}", response.status());
    response.json().await.expect("Upload response was not JSON")
}

/// Poll the status endpoint until the job leaves pending/running.
async fn poll_until_terminal(client: &reqwest::Client, task_id: &str) -> serde_json::Value {
    for _ in 0..30 {
        let json: serde_json::Value = client
            .get(format!("{}/task-status/{}", base_url(), task_id))
            .send()
            .await
            .expect("Status request failed")
            .json()
            .await
            .expect("Status response was not JSON");

        match json["status"].as_str() {
            Some("pending") | Some("running") => sleep(Duration::from_millis(500)).await,
            Some(_) => return json,
            None => panic!("status response missing status field: {json}"),
        }
    }
    panic!("job {task_id} never reached a terminal state");
}

#[tokio::test]
#[ignore] // Requires running API server, worker, and Redis
async fn test_e2e_health_check() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Health check failed");

    assert!(
        response.status().is_success(),
        "Health check returned non-success status: {}",
        response.status()
    );
}

#[tokio::test]
#[ignore] // Requires running API server, worker, and Redis
async fn test_e2e_grayscale_flow() {
    let client = reqwest::Client::new();

    let submitted = upload(&client, "e2e-grayscale.png", None).await;
    let task_id = submitted["task_id"].as_str().expect("no task_id").to_string();
    assert_eq!(submitted["message"], "Image processing started");

    let status = poll_until_terminal(&client, &task_id).await;
    assert_eq!(status["status"], "success", "unexpected status: {status}");
    assert!(status["result"].as_str().is_some());

    let result: serde_json::Value = client
        .get(format!("{}/task-result/{}", base_url(), task_id))
        .send()
        .await
        .expect("Result request failed")
        .json()
        .await
        .expect("Result response was not JSON");
    assert_eq!(result["task_id"], task_id.as_str());
    assert!(result["processed_image"].as_str().is_some());
}

#[tokio::test]
#[ignore] // Requires running API server, worker, and Redis
async fn test_e2e_unsupported_operation_fails() {
    let client = reqwest::Client::new();

    let submitted = upload(&client, "e2e-rot13.png", Some("rot13")).await;
    let task_id = submitted["task_id"].as_str().expect("no task_id").to_string();

    let status = poll_until_terminal(&client, &task_id).await;
    assert_eq!(status["status"], "failure", "unexpected status: {status}");
    assert!(!status["message"].as_str().unwrap_or("").is_empty());

    // The result endpoint reports the state, not an error.
    let response = client
        .get(format!("{}/task-result/{}", base_url(), task_id))
        .send()
        .await
        .expect("Result request failed");
    assert!(response.status().is_success());
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["status"], "failure");
}

#[tokio::test]
#[ignore] // Requires running API server, worker, and Redis
async fn test_e2e_unknown_task_reads_pending() {
    let client = reqwest::Client::new();

    let unknown = uuid::Uuid::new_v4();
    let json: serde_json::Value = client
        .get(format!("{}/task-status/{}", base_url(), unknown))
        .send()
        .await
        .expect("Status request failed")
        .json()
        .await
        .expect("Status response was not JSON");

    assert_eq!(json["status"], "pending");
    assert!(json.get("result").is_none());
}
