use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ErrorEnvelope;
use crate::storage::StorageError;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `task-client`.
pub enum ClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Сервер ответил статусом, отличным от 2xx.
    ///
    /// Конверт ошибки передаётся вызывающему как есть, если его удалось
    /// разобрать.
    #[error("api error {status}: {}", message_or_status(.envelope, .status))]
    Api {
        /// HTTP-статус ответа.
        status: StatusCode,
        /// Конверт `StandardResponse` из тела ответа.
        envelope: Option<ErrorEnvelope>,
    },

    /// Тело успешного ответа не удалось разобрать.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Успешный конверт пришёл без поля `data`.
    #[error("response envelope has no data")]
    MissingData,

    /// Ошибка хранилища сессии.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Результат операций `task-client`.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub(crate) fn from_http_status(status: StatusCode, body: &[u8]) -> Self {
        let envelope = serde_json::from_slice::<ErrorEnvelope>(body).ok();
        Self::Api { status, envelope }
    }

    /// Сообщение сервера из конверта ошибки, если оно есть.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api {
                envelope: Some(envelope),
                ..
            } if !envelope.message.trim().is_empty() => Some(envelope.message.as_str()),
            _ => None,
        }
    }

    /// `true`, если сервер отказал в доступе (401/403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Api { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }

    /// `true`, если ресурс не найден (404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

fn message_or_status(envelope: &Option<ErrorEnvelope>, status: &StatusCode) -> String {
    envelope
        .as_ref()
        .map(|envelope| envelope.message.trim())
        .filter(|message| !message.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("http status {status}"))
}
