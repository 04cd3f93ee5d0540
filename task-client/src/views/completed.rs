use futures::future::join_all;

use crate::error::ClientError;
use crate::models::{Task, TaskRequest, TaskStatus};
use crate::tasks::TaskClient;

use super::{TaskBoard, ViewError, ViewResult};

#[derive(Debug)]
/// Экран «Выполненные задачи» с пакетными операциями.
///
/// Пакетная операция шлёт по запросу на задачу одновременно и ждёт все.
/// Подтверждённые сервером изменения применяются к снимку, неудачные
/// остаются как были; о неудаче сообщается одним общим сообщением, без
/// отката и без повторов.
pub struct CompletedTasksView {
    board: TaskBoard,
}

impl CompletedTasksView {
    /// Пустой экран.
    pub fn new(client: TaskClient) -> Self {
        Self {
            board: TaskBoard::new(client),
        }
    }

    /// Снимок задач экрана.
    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    /// Снимок задач экрана для операций над отдельными задачами.
    pub fn board_mut(&mut self) -> &mut TaskBoard {
        &mut self.board
    }

    /// Загружает задачи.
    pub async fn load(&mut self) -> ViewResult<()> {
        self.board.load().await
    }

    /// Выполненные задачи снимка.
    pub fn completed(&self) -> Vec<&Task> {
        self.board.completed()
    }

    fn completed_snapshot(&self) -> Vec<Task> {
        self.board.completed().into_iter().cloned().collect()
    }

    /// Возвращает в работу все выполненные задачи.
    ///
    /// Без выполненных задач ничего не отправляется и возвращается `None`.
    pub async fn mark_all_pending(&mut self) -> ViewResult<Option<String>> {
        let targets = self.completed_snapshot();
        if targets.is_empty() {
            return Ok(None);
        }

        self.board.updating = true;
        let client = &self.board.client;
        let results = join_all(targets.iter().map(|task| {
            let request = TaskRequest::with_status(task, TaskStatus::Pending);
            async move { client.update_task(task.id, &request).await }
        }))
        .await;
        self.board.updating = false;

        let mut first_error: Option<ClientError> = None;
        for (task, result) in targets.iter().zip(results) {
            match result {
                Ok(updated) => self.board.patch(updated),
                Err(err) => {
                    tracing::warn!(task_id = task.id, error = %err, "bulk update failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(ViewError::request("Failed to update some tasks", err)),
            None => Ok(Some("All tasks marked as pending!".to_string())),
        }
    }

    /// Удаляет все выполненные задачи.
    ///
    /// Без выполненных задач ничего не отправляется и возвращается `None`.
    pub async fn delete_all_completed(&mut self) -> ViewResult<Option<String>> {
        let targets = self.completed_snapshot();
        if targets.is_empty() {
            return Ok(None);
        }

        self.board.updating = true;
        let client = &self.board.client;
        let results = join_all(targets.iter().map(|task| client.delete_task(task.id))).await;
        self.board.updating = false;

        let mut first_error: Option<ClientError> = None;
        for (task, result) in targets.iter().zip(results) {
            match result {
                Ok(()) => self.board.forget(task.id),
                Err(err) => {
                    tracing::warn!(task_id = task.id, error = %err, "bulk delete failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(ViewError::request("Failed to delete some tasks", err)),
            None => Ok(Some("All completed tasks deleted!".to_string())),
        }
    }
}
