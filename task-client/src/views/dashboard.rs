use std::sync::Arc;

use tokio::sync::watch;

use crate::forms::TaskForm;
use crate::models::{TaskStatus, User};
use crate::navigation::Route;
use crate::session::Session;
use crate::tasks::TaskClient;

use super::{TaskBoard, ViewError, ViewResult};

#[derive(Debug)]
/// Главная панель: приветствие, форма новой задачи и списки по статусам.
pub struct DashboardView {
    board: TaskBoard,
    session: Arc<Session>,
    user: watch::Receiver<Option<User>>,
    new_task: Option<TaskForm>,
    creating: bool,
}

impl DashboardView {
    /// Панель, подписанная на пользователя сессии.
    pub fn new(client: TaskClient, session: Arc<Session>) -> Self {
        let user = session.subscribe();
        Self {
            board: TaskBoard::new(client),
            session,
            user,
            new_task: None,
            creating: false,
        }
    }

    /// Текущий пользователь сессии.
    pub fn current_user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    /// Снимок задач панели.
    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    /// Снимок задач панели для операций над отдельными задачами.
    pub fn board_mut(&mut self) -> &mut TaskBoard {
        &mut self.board
    }

    /// Загружает задачи.
    pub async fn load(&mut self) -> ViewResult<()> {
        self.board.load().await
    }

    /// Открывает пустую форму новой задачи.
    pub fn show_create_form(&mut self) -> &mut TaskForm {
        self.new_task.insert(TaskForm::default())
    }

    /// Закрывает форму новой задачи.
    pub fn hide_create_form(&mut self) {
        self.new_task = None;
    }

    /// Форма новой задачи, если она открыта.
    pub fn new_task_mut(&mut self) -> Option<&mut TaskForm> {
        self.new_task.as_mut()
    }

    /// Идёт создание задачи.
    pub fn is_creating(&self) -> bool {
        self.creating
    }

    /// Создаёт задачу из формы; новая задача встаёт в начало списка.
    pub async fn create_task(&mut self) -> ViewResult {
        let form = self.new_task.clone().unwrap_or_default();
        let request = form
            .submit(TaskStatus::Pending)
            .map_err(|errors| ViewError::Invalid(errors.to_string()))?;

        self.creating = true;
        let result = self.board.client.create_task(&request).await;
        self.creating = false;

        let task = result.map_err(|err| ViewError::request("Failed to create task", err))?;
        self.board.prepend(task);
        self.hide_create_form();
        Ok("Task created successfully!".to_string())
    }

    /// Выход из сессии.
    pub fn logout(&self) -> Route {
        self.session.logout()
    }
}
