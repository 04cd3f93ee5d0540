use crate::models::{Task, TaskStatus};
use crate::tasks::TaskClient;

use super::{TaskBoard, ViewResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Фильтр экрана «Все задачи».
pub enum StatusFilter {
    /// Без фильтра.
    #[default]
    All,
    /// Только невыполненные.
    Pending,
    /// Только выполненные.
    Completed,
}

impl StatusFilter {
    fn accepts(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => task.status == TaskStatus::Pending,
            Self::Completed => task.status == TaskStatus::Completed,
        }
    }
}

#[derive(Debug)]
/// Экран «Все задачи».
pub struct AllTasksView {
    board: TaskBoard,
    filter: StatusFilter,
}

impl AllTasksView {
    /// Экран без фильтра.
    pub fn new(client: TaskClient) -> Self {
        Self {
            board: TaskBoard::new(client),
            filter: StatusFilter::All,
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

    /// Текущий фильтр.
    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    /// Меняет фильтр.
    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    /// Задачи, прошедшие фильтр.
    pub fn visible(&self) -> Vec<&Task> {
        self.board
            .tasks()
            .iter()
            .filter(|task| self.filter.accepts(task))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::test_support::{FakeTransport, authenticated_api, envelope, task_json};

    #[tokio::test]
    async fn filter_narrows_visible_tasks() {
        let transport = FakeTransport::new(|_| {
            envelope(json!([
                task_json(1, "Buy milk", "PENDING"),
                task_json(2, "Walk dog", "COMPLETED"),
                task_json(3, "Pay rent", "PENDING"),
            ]))
        });
        let mut view = AllTasksView::new(TaskClient::new(authenticated_api(transport)));
        view.load().await.expect("load must succeed");

        assert_eq!(view.visible().len(), 3);

        view.set_filter(StatusFilter::Pending);
        let ids: Vec<i64> = view.visible().iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![1, 3]);

        view.set_filter(StatusFilter::Completed);
        assert_eq!(view.visible()[0].title, "Walk dog");
        assert_eq!(view.filter(), StatusFilter::Completed);
    }
}
