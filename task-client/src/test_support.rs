use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Request, StatusCode};
use serde_json::{Value, json};

use crate::error::ClientResult;
use crate::http_client::{ApiClient, HttpTransport, RawResponse};
use crate::models::AuthResponse;
use crate::session::Session;
use crate::storage::MemoryStore;
use crate::token::tests::valid_token;

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) authorization: Option<String>,
    pub(crate) body: Option<Value>,
}

impl From<&Request> for RecordedRequest {
    fn from(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            path: request.url().path().to_string(),
            authorization: request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
            body: request
                .body()
                .and_then(|body| body.as_bytes())
                .and_then(|bytes| serde_json::from_slice(bytes).ok()),
        }
    }
}

type Handler = Box<dyn Fn(&RecordedRequest) -> RawResponse + Send + Sync>;

/// Транспорт, который отвечает из замыкания и запоминает все запросы.
pub(crate) struct FakeTransport {
    handler: Handler,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub(crate) fn new(
        handler: impl Fn(&RecordedRequest) -> RawResponse + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn execute(&self, request: Request) -> ClientResult<RawResponse> {
        let recorded = RecordedRequest::from(&request);
        let response = (self.handler)(&recorded);
        self.requests.lock().expect("requests lock").push(recorded);
        Ok(response)
    }
}

pub(crate) fn envelope(data: Value) -> RawResponse {
    RawResponse {
        status: StatusCode::OK,
        body: json!({
            "status": "success",
            "message": "ok",
            "data": data,
            "timestamp": "2025-01-01T00:00:00"
        })
        .to_string()
        .into_bytes(),
    }
}

pub(crate) fn error_envelope(status: StatusCode, message: &str) -> RawResponse {
    RawResponse {
        status,
        body: json!({
            "status": "error",
            "message": message,
            "timestamp": "2025-01-01T00:00:00"
        })
        .to_string()
        .into_bytes(),
    }
}

pub(crate) fn task_json(id: i64, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "status": status,
        "createdAt": "2025-01-01T00:00:00",
        "updatedAt": "2025-01-01T00:00:00"
    })
}

/// Конвейер с уже вошедшим пользователем `alice`.
pub(crate) fn authenticated_api(transport: Arc<FakeTransport>) -> ApiClient {
    let session = Arc::new(Session::new(Arc::new(MemoryStore::new())));
    session
        .establish(&AuthResponse {
            token: valid_token(),
            username: "alice".to_string(),
        })
        .expect("establish must succeed");
    ApiClient::with_transport("http://localhost:8080", session, transport)
        .expect("client must build")
}

/// Id задачи из пути вида `/api/tasks/{id}`.
pub(crate) fn task_id(request: &RecordedRequest) -> Option<i64> {
    request
        .path
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}
