//! End-to-end tests for the relay: real axum servers on ephemeral ports,
//! driven with reqwest.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use studyplan_core::AssignmentBatch;
use studyplan_relay::{
    error::{GENERATION_FAILED_MESSAGE, INVALID_BATCH_MESSAGE},
    router, HttpPlanUpstream, PlanUpstream, RelayError,
};

/// Stub upstream that records every batch and answers with a fixed body.
struct RecordingUpstream {
    calls: Mutex<Vec<AssignmentBatch>>,
    reply: Value,
}

impl RecordingUpstream {
    fn new(reply: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(vec![]),
            reply,
        })
    }

    fn calls(&self) -> Vec<AssignmentBatch> {
        self.calls.lock().unwrap().clone()
    }
}

impl PlanUpstream for RecordingUpstream {
    async fn generate(&self, batch: &AssignmentBatch) -> Result<Vec<u8>, RelayError> {
        self.calls.lock().unwrap().push(batch.clone());
        Ok(serde_json::to_vec(&self.reply).unwrap())
    }
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn post_raw(base: &str, body: &'static str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/generate-plan"))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap()
}

fn essay_request() -> Value {
    json!({"assignments": [{
        "title": "Essay",
        "dueDate": "2025-01-10",
        "type": "Homework",
        "content": "Write 500 words"
    }]})
}

fn essay_reply() -> Value {
    json!([{
        "title": "Essay",
        "studyPlan": ["Step 1", "Step 2"],
        "dueDate": "2025-01-10",
        "type": "Homework",
        "extra": "ignored"
    }])
}

#[tokio::test]
async fn relays_and_reshapes_example_batch() {
    let upstream = RecordingUpstream::new(essay_reply());
    let base = spawn(router(Arc::clone(&upstream))).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/generate-plan"))
        .json(&essay_request())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!([{
            "title": "Essay",
            "studyPlan": ["Step 1", "Step 2"],
            "dueDate": "2025-01-10",
            "type": "Homework"
        }])
    );

    let calls = upstream.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        serde_json::to_value(&calls[0]).unwrap(),
        essay_request(),
        "upstream must receive the exact array under `assignments`"
    );
}

#[tokio::test]
async fn rejects_bad_shapes_without_calling_upstream() {
    let upstream = RecordingUpstream::new(json!([]));
    let base = spawn(router(Arc::clone(&upstream))).await;

    let bodies = [
        r#"{}"#,
        r#"{"assignments":null}"#,
        r#"{"assignments":{"title":"Essay"}}"#,
        r#"{"assignments":"Essay"}"#,
        r#"[{"title":"Essay"}]"#,
        r#"{not json"#,
    ];

    for body in bodies {
        let resp = post_raw(&base, body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(resp.text().await.unwrap(), INVALID_BATCH_MESSAGE);
    }

    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn empty_batch_is_forwarded() {
    let upstream = RecordingUpstream::new(json!([]));
    let base = spawn(router(Arc::clone(&upstream))).await;

    let resp = post_raw(&base, r#"{"assignments":[]}"#).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!([]));
    assert_eq!(upstream.calls().len(), 1);
}

#[tokio::test]
async fn keeps_length_and_order_of_upstream_plans() {
    let reply = json!([
        {"title": "C", "studyPlan": ["c1"], "dueDate": "3", "type": "Lab", "score": 1},
        {"title": "A", "studyPlan": [], "dueDate": "1", "type": "Quiz"},
        {"title": "B", "studyPlan": ["b1", "b2"], "dueDate": "2", "type": "Exam", "id": "x"},
    ]);
    let upstream = RecordingUpstream::new(reply);
    let base = spawn(router(upstream)).await;

    let resp = post_raw(&base, r#"{"assignments":[{},{},{}]}"#).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(body.len(), 3);
    let titles: Vec<_> = body.iter().map(|p| p["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["C", "A", "B"]);
    for plan in &body {
        let mut keys: Vec<_> = plan.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["dueDate", "studyPlan", "title", "type"]);
    }
}

#[tokio::test]
async fn undecodable_upstream_body_is_500() {
    let upstream = RecordingUpstream::new(json!({"error": "model overloaded"}));
    let base = spawn(router(upstream)).await;

    let resp = post_raw(&base, r#"{"assignments":[{"title":"Essay"}]}"#).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.text().await.unwrap(), GENERATION_FAILED_MESSAGE);
}

/// Real HTTP upstream that counts calls and answers with `status` + `body`.
async fn spawn_http_upstream(status: StatusCode, body: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
    let recorder = Arc::clone(&seen);
    let app = Router::new().route(
        "/generate-plan",
        post(move |Json(req): Json<Value>| {
            let recorder = Arc::clone(&recorder);
            let body = body.clone();
            async move {
                recorder.lock().unwrap().push(req);
                (status, Json(body))
            }
        }),
    );
    (spawn(app).await, seen)
}

fn http_relay(upstream_base: &str) -> Router {
    let upstream = HttpPlanUpstream::new(upstream_base, Duration::from_secs(5)).unwrap();
    router(Arc::new(upstream))
}

#[tokio::test]
async fn http_upstream_receives_exact_batch() {
    let (upstream_base, seen) = spawn_http_upstream(StatusCode::OK, essay_reply()).await;
    let base = spawn(http_relay(&upstream_base)).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/generate-plan"))
        .json(&essay_request())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap()[0]["studyPlan"], json!(["Step 1", "Step 2"]));

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec![essay_request()]);
}

#[tokio::test]
async fn upstream_error_status_is_not_leaked() {
    let (upstream_base, seen) = spawn_http_upstream(
        StatusCode::BAD_GATEWAY,
        json!({"error": "secret upstream stack trace"}),
    )
    .await;
    let base = spawn(http_relay(&upstream_base)).await;

    let resp = post_raw(&base, r#"{"assignments":[{"title":"Essay"}]}"#).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = resp.text().await.unwrap();
    assert_eq!(text, GENERATION_FAILED_MESSAGE);
    assert!(!text.contains("secret"));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_upstream_is_500() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let base = spawn(http_relay(&dead)).await;

    let resp = post_raw(&base, r#"{"assignments":[{"title":"Essay"}]}"#).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.text().await.unwrap(), GENERATION_FAILED_MESSAGE);
}

#[tokio::test]
async fn healthz_and_cors() {
    let base = spawn(router(RecordingUpstream::new(json!([])))).await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/healthz"))
        .header("origin", "http://example.test")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("access-control-allow-origin"));
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn body_is_parsed_whatever_the_content_type() {
    let upstream = RecordingUpstream::new(essay_reply());
    let base = spawn(router(Arc::clone(&upstream))).await;
    let body = r#"{"assignments":[{"title":"Essay","dueDate":"2025-01-10","type":"Homework","content":"Write 500 words"}]}"#;

    let plain = reqwest::Client::new()
        .post(format!("{base}/generate-plan"))
        .header("content-type", "text/plain")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(plain.status(), StatusCode::OK);

    let bare = reqwest::Client::new()
        .post(format!("{base}/generate-plan"))
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(bare.status(), StatusCode::OK);
    assert_eq!(bare.json::<Value>().await.unwrap()[0]["title"], "Essay");

    let calls = upstream.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(serde_json::to_value(&calls[1]).unwrap(), essay_request());
}

#[tokio::test]
async fn slow_upstream_times_out_with_500() {
    let slow = Router::new().route(
        "/generate-plan",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!([]))
        }),
    );
    let upstream_base = spawn(slow).await;

    let upstream = HttpPlanUpstream::new(&upstream_base, Duration::from_millis(200)).unwrap();
    let base = spawn(router(Arc::new(upstream))).await;

    let started = std::time::Instant::now();
    let resp = post_raw(&base, r#"{"assignments":[{"title":"Essay"}]}"#).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.text().await.unwrap(), GENERATION_FAILED_MESSAGE);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn accepts_any_2xx_upstream_status() {
    let (upstream_base, seen) = spawn_http_upstream(StatusCode::CREATED, essay_reply()).await;
    let base = spawn(http_relay(&upstream_base)).await;

    let resp = post_raw(&base, r#"{"assignments":[{"title":"Essay"}]}"#).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap()[0]["studyPlan"], json!(["Step 1", "Step 2"]));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_echo_fields_come_back_as_null() {
    let base = spawn(router(RecordingUpstream::new(json!([{"studyPlan": ["x"]}])))).await;

    let resp = post_raw(&base, r#"{"assignments":[{}]}"#).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!([{"title": null, "studyPlan": ["x"], "dueDate": null, "type": null}])
    );
}
