//! Test app wiring and a local stand-in for the upscale api.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_test::TestServer;
use serde_json::json;
use sono_upscale::config::Config;
use sono_upscale::image_types::OutputFormat;
use sono_upscale::relay::Relay;
use sono_upscale::routes;
use sono_upscale::types::GenerationParams;
use sono_upscale::upload_store::UploadArea;
use sono_upscale::upscale_api::StabilityUpscaleBackend;
use std::path::{Path as FsPath, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::Barrier;

pub const API_KEY: &str = "sk-test-key";
pub const PROMPT: &str = "clear ultrasound, fine detail";
pub const NEGATIVE_PROMPT: &str = "blur, noise";

/// How the fake submit endpoint answers
#[derive(Clone)]
pub enum SubmitBehaviour {
    Accept(String),
    /// Job id is derived from the uploaded bytes
    AcceptWithImageId,
    Reject(u16, String),
}

/// How the fake result endpoint answers
#[derive(Clone)]
pub enum ResultBehaviour {
    Processing,
    Ready(Vec<u8>),
    EmptyOk,
    Status(u16, String),
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub authorization: Option<String>,
    pub image: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub output_format: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResultRequest {
    pub generation_id: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
}

struct MockState {
    submit: SubmitBehaviour,
    result: ResultBehaviour,
    barrier: Option<Barrier>,
    watch_dir: Option<PathBuf>,
    submissions: Mutex<Vec<Submission>>,
    result_requests: Mutex<Vec<ResultRequest>>,
    files_seen: Mutex<Vec<usize>>,
}

pub struct MockUpscaleApi {
    pub url: String,
    state: Arc<MockState>,
}

pub struct MockOptions {
    pub submit: SubmitBehaviour,
    pub result: ResultBehaviour,
    /// Hold submissions until this many arrived
    pub rendezvous: Option<usize>,
    /// Directory whose entries are counted when a submission arrives
    pub watch_dir: Option<PathBuf>,
}

impl Default for MockOptions {
    fn default() -> Self {
        MockOptions {
            submit: SubmitBehaviour::Accept("job-123".to_string()),
            result: ResultBehaviour::Processing,
            rendezvous: None,
            watch_dir: None,
        }
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn count_entries(dir: &FsPath) -> usize {
    std::fs::read_dir(dir).map(|dir| dir.count()).unwrap_or(0)
}

async fn mock_submit(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut submission = Submission {
        authorization: header_value(&headers, header::AUTHORIZATION),
        image: Vec::new(),
        file_name: None,
        content_type: None,
        prompt: None,
        negative_prompt: None,
        output_format: None,
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                submission.file_name = field.file_name().map(str::to_string);
                submission.content_type = field.content_type().map(str::to_string);
                submission.image = field.bytes().await.unwrap().to_vec();
            }
            "prompt" => submission.prompt = Some(field.text().await.unwrap()),
            "negative_prompt" => submission.negative_prompt = Some(field.text().await.unwrap()),
            "output_format" => submission.output_format = Some(field.text().await.unwrap()),
            _ => {}
        }
    }

    if let Some(dir) = &state.watch_dir {
        state.files_seen.lock().unwrap().push(count_entries(dir));
    }
    if let Some(barrier) = &state.barrier {
        barrier.wait().await;
    }

    let image_id = format!("job-{}", String::from_utf8_lossy(&submission.image));
    state.submissions.lock().unwrap().push(submission);

    match &state.submit {
        SubmitBehaviour::Accept(id) => Json(json!({ "id": id })).into_response(),
        SubmitBehaviour::AcceptWithImageId => Json(json!({ "id": image_id })).into_response(),
        SubmitBehaviour::Reject(status, body) => (
            StatusCode::from_u16(*status).unwrap(),
            [(header::CONTENT_TYPE, "application/json")],
            body.clone(),
        )
            .into_response(),
    }
}

async fn mock_result(
    State(state): State<Arc<MockState>>,
    Path(generation_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.result_requests.lock().unwrap().push(ResultRequest {
        generation_id,
        authorization: header_value(&headers, header::AUTHORIZATION),
        accept: header_value(&headers, header::ACCEPT),
    });

    match &state.result {
        ResultBehaviour::Processing => (
            StatusCode::ACCEPTED,
            Json(json!({ "id": "job-123", "status": "in-progress" })),
        )
            .into_response(),
        ResultBehaviour::Ready(data) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/webp")],
            Bytes::from(data.clone()),
        )
            .into_response(),
        ResultBehaviour::EmptyOk => StatusCode::OK.into_response(),
        ResultBehaviour::Status(status, body) => {
            (StatusCode::from_u16(*status).unwrap(), body.clone()).into_response()
        }
    }
}

impl MockUpscaleApi {
    pub async fn start(options: MockOptions) -> Self {
        let state = Arc::new(MockState {
            submit: options.submit,
            result: options.result,
            barrier: options.rendezvous.map(Barrier::new),
            watch_dir: options.watch_dir,
            submissions: Mutex::new(Vec::new()),
            result_requests: Mutex::new(Vec::new()),
            files_seen: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/upscale/creative", post(mock_submit))
            .route("/upscale/creative/result/{id}", get(mock_result))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockUpscaleApi {
            url: format!("http://{}/upscale/creative", addr),
            state,
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.submissions.lock().unwrap().clone()
    }

    pub fn result_requests(&self) -> Vec<ResultRequest> {
        self.state.result_requests.lock().unwrap().clone()
    }

    /// Upload dir entry counts observed as each submission arrived
    pub fn files_seen(&self) -> Vec<usize> {
        self.state.files_seen.lock().unwrap().clone()
    }
}

/// Address nothing listens on
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/upscale/creative", addr)
}

pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> &FsPath {
        self.upload_dir.path()
    }

    pub fn leftover_uploads(&self) -> usize {
        count_entries(self.upload_dir.path())
    }
}

pub fn setup_test_app(upscale_api_url: &str, upload_dir: TempDir) -> TestApp {
    setup_test_app_with_limit(upscale_api_url, upload_dir, 10 * 1024 * 1024)
}

pub fn setup_test_app_with_limit(
    upscale_api_url: &str,
    upload_dir: TempDir,
    max_upload_size: usize,
) -> TestApp {
    let backend = StabilityUpscaleBackend::new(
        upscale_api_url.to_string(),
        API_KEY.to_string(),
        Some(10),
    )
    .expect("Failed to build upscale client");
    let params = GenerationParams {
        prompt: PROMPT.to_string(),
        negative_prompt: NEGATIVE_PROMPT.to_string(),
        output_format: OutputFormat::Webp,
    };
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        relay: Relay::new(Arc::new(backend), params),
        upload_area: UploadArea::new(upload_dir.path()),
        max_upload_size,
        redirect_delay: 5,
        enable_docs: true,
    };

    let server =
        TestServer::new(routes::router(Arc::new(config))).expect("Failed to create test server");
    TestApp { server, upload_dir }
}

pub fn upload_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create upload dir")
}
