//! Клиентская библиотека менеджера задач.
//!
//! Состав:
//! - сессия (`Session`): bearer-токен и пользователь в постоянном хранилище
//!   плюс широковещательное значение для экранов;
//! - HTTP-конвейер (`ApiClient`) с перехватчиком, добавляющим
//!   `Authorization: Bearer <token>`;
//! - клиенты авторизации (`AuthClient`) и задач (`TaskClient`);
//! - модели экранов (`views`) и проверка форм (`forms`).
//!
//! `TaskManagerClient` собирает всё это поверх одного хранилища.
#![warn(missing_docs)]

mod auth;
mod config;
mod error;
pub mod forms;
mod http_client;
pub mod interceptor;
mod models;
pub mod navigation;
mod session;
pub mod storage;
mod tasks;
pub mod token;
pub mod views;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

pub use auth::AuthClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
pub use http_client::{ApiClient, HttpTransport, RawResponse, ReqwestTransport};
pub use models::{
    AuthResponse, ErrorEnvelope, LoginRequest, RegisterRequest, StandardResponse, Task,
    TaskRequest, TaskStatus, User,
};
pub use navigation::Route;
pub use session::Session;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use tasks::TaskClient;

use views::{AllTasksView, CompletedTasksView, DashboardView, Header, Sidebar};

#[derive(Debug, Clone)]
/// Точка входа: сессия, клиенты и экраны поверх одного хранилища.
pub struct TaskManagerClient {
    session: Arc<Session>,
    auth: AuthClient,
    tasks: TaskClient,
}

impl TaskManagerClient {
    /// Клиент с транспортом `reqwest`.
    ///
    /// Сохранённая в `store` сессия восстанавливается сразу.
    pub fn new(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> ClientResult<Self> {
        let session = Arc::new(Session::new(store));
        let api = ApiClient::new(config, session.clone())?;
        Ok(Self::from_api(api))
    }

    /// Клиент с произвольным транспортом.
    pub fn with_transport(
        base_url: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> ClientResult<Self> {
        let session = Arc::new(Session::new(store));
        let api = ApiClient::with_transport(base_url, session.clone(), transport)?;
        Ok(Self::from_api(api))
    }

    fn from_api(api: ApiClient) -> Self {
        Self {
            session: api.session().clone(),
            auth: AuthClient::new(api.clone()),
            tasks: TaskClient::new(api),
        }
    }

    /// Сессия.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Клиент авторизации.
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// Клиент задач.
    pub fn tasks(&self) -> &TaskClient {
        &self.tasks
    }

    /// Экран, на который пользователь попадёт при запросе `route`.
    pub fn resolve(&self, route: Route) -> Route {
        navigation::guard(&self.session, route)
    }

    /// Главная панель.
    pub fn dashboard(&self) -> DashboardView {
        DashboardView::new(self.tasks.clone(), self.session.clone())
    }

    /// Экран «Все задачи».
    pub fn all_tasks(&self) -> AllTasksView {
        AllTasksView::new(self.tasks.clone())
    }

    /// Экран «Выполненные задачи».
    pub fn completed_tasks(&self) -> CompletedTasksView {
        CompletedTasksView::new(self.tasks.clone())
    }

    /// Шапка для экрана `route`.
    pub fn header(&self, route: Route) -> Header {
        Header::new(self.session.clone(), route.path())
    }

    /// Боковая панель для экрана `route`.
    pub fn sidebar(&self, route: Route) -> Sidebar {
        Sidebar::new(self.session.clone(), route.path())
    }

    /// Выход из сессии.
    pub fn logout(&self) -> Route {
        self.session.logout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::test_support::{FakeTransport, envelope, task_json};
    use crate::token::tests::valid_token;

    #[tokio::test]
    async fn login_then_tasks_carry_the_new_token() {
        let token = valid_token();
        let issued = token.clone();
        let transport = FakeTransport::new(move |request| {
            if request.path == "/auth/login" {
                envelope(json!({ "token": issued, "username": "alice" }))
            } else {
                envelope(json!([task_json(1, "Buy milk", "PENDING")]))
            }
        });
        let client = TaskManagerClient::with_transport(
            "http://localhost:8080",
            Arc::new(MemoryStore::new()),
            transport.clone(),
        )
        .expect("client must build");

        assert_eq!(client.resolve(Route::Dashboard), Route::Login);

        let form = forms::LoginForm {
            username: "alice".to_string(),
            password: "secret1".to_string(),
        };
        let request = form.submit().expect("form must be valid");
        client.auth().login(&request).await.expect("login must succeed");

        assert_eq!(client.resolve(Route::Login), Route::Dashboard);
        let mut dashboard = client.dashboard();
        dashboard.load().await.expect("load must succeed");
        assert_eq!(dashboard.board().tasks().len(), 1);

        let requests = transport.requests();
        assert!(requests[0].authorization.is_none());
        assert_eq!(
            requests[1].authorization.as_deref(),
            Some(format!("Bearer {token}").as_str())
        );

        assert_eq!(client.logout(), Route::Login);
        assert_eq!(client.header(Route::Dashboard).user_initials(), "U");
    }
}
