use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Пользователь текущей сессии.
///
/// Сервер не возвращает профиль целиком, поэтому модель собирается на клиенте:
/// `id` всегда `0`, `created_at` равен моменту входа.
pub struct User {
    /// Идентификатор пользователя (на клиенте всегда `0`).
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Момент создания локальной сессии (UTC).
    pub created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn from_auth(auth: &AuthResponse, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            username: auth.username.clone(),
            created_at: now,
        }
    }

    /// Инициалы для шапки и боковой панели: первые два символа логина
    /// в верхнем регистре.
    pub fn initials(&self) -> String {
        initials_of(Some(self))
    }
}

pub(crate) fn initials_of(user: Option<&User>) -> String {
    match user {
        Some(user) if !user.username.is_empty() => {
            user.username.chars().take(2).collect::<String>().to_uppercase()
        }
        _ => "U".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Ответ сервера после успешной регистрации или входа.
pub struct AuthResponse {
    /// JWT bearer-токен.
    pub token: String,
    /// Логин пользователя.
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
/// Тело запроса `POST /auth/login`.
pub struct LoginRequest {
    /// Логин.
    pub username: String,
    /// Пароль.
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
/// Тело запроса `POST /auth/register`.
pub struct RegisterRequest {
    /// Логин.
    pub username: String,
    /// Пароль.
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Статус задачи. Других состояний нет.
pub enum TaskStatus {
    /// Задача ещё не выполнена.
    Pending,
    /// Задача выполнена.
    Completed,
}

impl TaskStatus {
    /// Противоположный статус.
    pub fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Задача в том виде, в котором её возвращает сервер.
pub struct Task {
    /// Идентификатор задачи.
    pub id: i64,
    /// Заголовок (всегда присутствует).
    pub title: String,
    /// Необязательное описание.
    #[serde(default)]
    pub description: Option<String>,
    /// Статус.
    pub status: TaskStatus,
    /// Время создания на сервере (без часового пояса).
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Время последнего изменения на сервере (без часового пояса).
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Тело запросов создания и обновления задачи.
pub struct TaskRequest {
    /// Заголовок.
    pub title: String,
    /// Описание; не сериализуется, если отсутствует.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Статус.
    pub status: TaskStatus,
}

impl TaskRequest {
    /// Запрос, сохраняющий заголовок и описание задачи, но с другим статусом.
    pub fn with_status(task: &Task, status: TaskStatus) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Единый конверт всех ответов API.
pub struct StandardResponse<T> {
    /// `success`, `created` или `error`.
    #[serde(default)]
    pub status: String,
    /// Человекочитаемое сообщение сервера.
    #[serde(default)]
    pub message: String,
    /// Полезная нагрузка.
    pub data: Option<T>,
    /// Время формирования ответа на сервере.
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    /// Путь запроса или `Location` созданного ресурса.
    #[serde(default)]
    pub path: Option<String>,
    /// Количество элементов в `data` для коллекций.
    #[serde(default)]
    pub count: Option<u32>,
}

impl<T> StandardResponse<T> {
    /// Извлекает `data`; конверт без данных считается ошибкой.
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// Конверт ошибки: `data` у него обычно отсутствует.
pub type ErrorEnvelope = StandardResponse<serde_json::Value>;
