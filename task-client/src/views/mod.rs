//! Модели экранов: локальный снимок задач, флаги загрузки и буфер
//! редактирования.
//!
//! Каждое представление держит собственный список и правит его по `id`
//! только после подтверждения сервера. Общего кэша нет.

mod all_tasks;
mod board;
mod completed;
mod dashboard;
mod layout;

pub use all_tasks::{AllTasksView, StatusFilter};
pub use board::TaskBoard;
pub use completed::CompletedTasksView;
pub use dashboard::DashboardView;
pub use layout::{Header, NavigationItem, Sidebar, breadcrumbs_for};

use thiserror::Error;

use crate::error::ClientError;

#[derive(Debug, Error)]
/// Ошибка операции представления.
///
/// `Display` даёт сообщение для пользователя; подробности запроса доступны
/// через `source()`.
pub enum ViewError {
    /// Ввод не прошёл проверку, запрос не отправлялся.
    #[error("{0}")]
    Invalid(String),

    /// Задачи нет в локальном снимке.
    #[error("task {0} is not in the current list")]
    UnknownTask(i64),

    /// Сервер или сеть вернули ошибку.
    #[error("{message}")]
    Request {
        /// Обобщённое сообщение для пользователя.
        message: &'static str,
        /// Исходная ошибка клиента.
        #[source]
        source: ClientError,
    },
}

impl ViewError {
    pub(crate) fn request(message: &'static str, source: ClientError) -> Self {
        tracing::error!(error = %source, "{message}");
        Self::Request { message, source }
    }
}

/// Результат операции представления; при успехе это сообщение для пользователя.
pub type ViewResult<T = String> = Result<T, ViewError>;
