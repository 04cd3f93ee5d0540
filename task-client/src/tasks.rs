use reqwest::Method;

use crate::error::ClientResult;
use crate::http_client::ApiClient;
use crate::models::{Task, TaskRequest};

const TASKS_PATH: &str = "/api/tasks";

#[derive(Debug, Clone)]
/// CRUD над ресурсом `/api/tasks`.
///
/// Кэша нет: каждый вызов идёт на сервер.
pub struct TaskClient {
    api: ApiClient,
}

impl TaskClient {
    /// Клиент задач поверх общего конвейера.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Все задачи текущего пользователя.
    pub async fn list_tasks(&self) -> ClientResult<Vec<Task>> {
        self.api.get(TASKS_PATH).await
    }

    /// Задача по идентификатору.
    pub async fn get_task(&self, id: i64) -> ClientResult<Task> {
        self.api.get(&format!("{TASKS_PATH}/{id}")).await
    }

    /// Создаёт задачу и возвращает её в сохранённом виде.
    pub async fn create_task(&self, request: &TaskRequest) -> ClientResult<Task> {
        self.api.send_json(Method::POST, TASKS_PATH, request).await
    }

    /// Обновляет задачу и возвращает её в сохранённом виде.
    pub async fn update_task(&self, id: i64, request: &TaskRequest) -> ClientResult<Task> {
        self.api
            .send_json(Method::PUT, &format!("{TASKS_PATH}/{id}"), request)
            .await
    }

    /// Удаляет задачу.
    pub async fn delete_task(&self, id: i64) -> ClientResult<()> {
        self.api
            .send_empty(Method::DELETE, &format!("{TASKS_PATH}/{id}"))
            .await
    }
}
