use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, Request, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::interceptor;
use crate::models::StandardResponse;
use crate::session::Session;

#[derive(Debug, Clone)]
/// Статус и тело ответа, прочитанные транспортом.
pub struct RawResponse {
    /// HTTP-статус.
    pub status: StatusCode,
    /// Тело ответа целиком.
    pub body: Vec<u8>,
}

/// Исполнитель готовых HTTP-запросов.
///
/// Запрос приходит уже с заголовками, добавленными перехватчиком.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Отправляет запрос и читает ответ целиком.
    async fn execute(&self, request: Request) -> ClientResult<RawResponse>;
}

#[derive(Debug, Clone)]
/// Транспорт поверх `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Транспорт, использующий переданный клиент.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: Request) -> ClientResult<RawResponse> {
        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }
}

#[derive(Clone)]
/// HTTP-конвейер: сборка запроса, перехватчик, транспорт, распаковка конверта.
pub struct ApiClient {
    base_url: String,
    http: Client,
    transport: Arc<dyn HttpTransport>,
    session: Arc<Session>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Клиент с транспортом `reqwest` и таймаутами из `config`.
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> ClientResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        let transport = Arc::new(ReqwestTransport::new(http.clone()));

        Ok(Self {
            base_url: config.base_url.clone(),
            http,
            transport,
            session,
        })
    }

    /// Клиент с произвольным транспортом.
    pub fn with_transport(
        base_url: impl Into<String>,
        session: Arc<Session>,
        transport: Arc<dyn HttpTransport>,
    ) -> ClientResult<Self> {
        Ok(Self {
            base_url: base_url.into(),
            http: Client::builder().build()?,
            transport,
            session,
        })
    }

    /// Сессия, из которой перехватчик берёт токен.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn dispatch(&self, builder: RequestBuilder) -> ClientResult<RawResponse> {
        let request = builder.build()?;
        let token = self.session.token();
        let request = interceptor::intercept(request, token.as_deref());

        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "sending request");

        let response = self.transport.execute(request).await?;
        if !response.status.is_success() {
            tracing::debug!(%method, %url, status = %response.status, "request rejected");
            return Err(ClientError::from_http_status(
                response.status,
                &response.body,
            ));
        }
        Ok(response)
    }

    fn unwrap_envelope<T: DeserializeOwned>(response: RawResponse) -> ClientResult<T> {
        let envelope: StandardResponse<T> = serde_json::from_slice(&response.body)?;
        envelope.into_data().ok_or(ClientError::MissingData)
    }

    /// `GET` с распаковкой `data`.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.http.request(Method::GET, self.endpoint(path));
        let response = self.dispatch(builder).await?;
        Self::unwrap_envelope(response)
    }

    /// Запрос с JSON-телом и распаковкой `data`.
    pub(crate) async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
    ) -> ClientResult<TRes>
    where
        TReq: Serialize + ?Sized,
        TRes: DeserializeOwned,
    {
        let builder = self.http.request(method, self.endpoint(path)).json(body);
        let response = self.dispatch(builder).await?;
        Self::unwrap_envelope(response)
    }

    /// Запрос без полезной нагрузки в ответе (например, `DELETE` с 204).
    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> ClientResult<()> {
        let builder = self.http.request(method, self.endpoint(path));
        self.dispatch(builder).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;
    use crate::storage::MemoryStore;
    use crate::test_support::{FakeTransport, envelope, error_envelope};
    use serde_json::json;

    fn api(transport: Arc<FakeTransport>) -> ApiClient {
        let session = Arc::new(Session::new(Arc::new(MemoryStore::new())));
        ApiClient::with_transport("http://localhost:8080/", session, transport)
            .expect("client must build")
    }

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = api(FakeTransport::new(|_| envelope(json!(null))));
        assert_eq!(
            client.endpoint("/api/tasks"),
            "http://localhost:8080/api/tasks"
        );
    }

    #[tokio::test]
    async fn success_envelope_is_unwrapped_to_data() {
        let transport = FakeTransport::new(|_| {
            envelope(json!({ "id": 1, "title": "Buy milk", "status": "PENDING" }))
        });
        let client = api(transport.clone());

        let task: Task = client.get("/api/tasks/1").await.expect("get must succeed");

        assert_eq!(task.title, "Buy milk");
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/api/tasks/1");
    }

    #[tokio::test]
    async fn envelope_without_data_is_rejected() {
        let client = api(FakeTransport::new(|_| {
            RawResponse {
                status: StatusCode::OK,
                body: br#"{"status":"success","message":"ok"}"#.to_vec(),
            }
        }));

        let result: ClientResult<Task> = client.get("/api/tasks/1").await;
        assert!(matches!(result, Err(ClientError::MissingData)));
    }

    #[tokio::test]
    async fn error_status_carries_server_envelope() {
        let client = api(FakeTransport::new(|_| {
            error_envelope(StatusCode::NOT_FOUND, "Task not found")
        }));

        let err = client
            .get::<Task>("/api/tasks/404")
            .await
            .expect_err("404 must fail");

        assert!(err.is_not_found());
        assert_eq!(err.server_message(), Some("Task not found"));
    }

    #[tokio::test]
    async fn empty_response_is_fine_for_delete() {
        let transport = FakeTransport::new(|_| RawResponse {
            status: StatusCode::NO_CONTENT,
            body: Vec::new(),
        });
        let client = api(transport.clone());

        client
            .send_empty(Method::DELETE, "/api/tasks/3")
            .await
            .expect("delete must succeed");

        assert_eq!(transport.requests()[0].method, Method::DELETE);
    }
}
