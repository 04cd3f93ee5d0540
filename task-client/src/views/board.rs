use crate::forms::TaskForm;
use crate::models::{Task, TaskRequest, TaskStatus};
use crate::tasks::TaskClient;

use super::{ViewError, ViewResult};

#[derive(Debug)]
/// Снимок задач экрана и операции над одной задачей.
pub struct TaskBoard {
    pub(crate) client: TaskClient,
    pub(crate) tasks: Vec<Task>,
    editing: Option<Task>,
    loading: bool,
    pub(crate) updating: bool,
}

impl TaskBoard {
    /// Пустой снимок; задачи появятся после [`TaskBoard::load`].
    pub fn new(client: TaskClient) -> Self {
        Self {
            client,
            tasks: Vec::new(),
            editing: None,
            loading: false,
            updating: false,
        }
    }

    /// Задачи в порядке снимка.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Невыполненные задачи.
    pub fn pending(&self) -> Vec<&Task> {
        self.with_status(TaskStatus::Pending)
    }

    /// Выполненные задачи.
    pub fn completed(&self) -> Vec<&Task> {
        self.with_status(TaskStatus::Completed)
    }

    fn with_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.status == status).collect()
    }

    /// Идёт загрузка списка.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Идёт изменение задач.
    pub fn is_updating(&self) -> bool {
        self.updating
    }

    /// Задача из снимка.
    pub fn find(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn require(&self, id: i64) -> ViewResult<Task> {
        self.find(id).cloned().ok_or(ViewError::UnknownTask(id))
    }

    /// Заменяет снимок списком с сервера.
    pub async fn load(&mut self) -> ViewResult<()> {
        self.loading = true;
        let result = self.client.list_tasks().await;
        self.loading = false;

        self.tasks = result.map_err(|err| ViewError::request("Failed to load tasks", err))?;
        tracing::debug!(count = self.tasks.len(), "tasks loaded");
        Ok(())
    }

    pub(crate) fn prepend(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    pub(crate) fn patch(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|slot| slot.id == task.id) {
            *slot = task;
        }
    }

    pub(crate) fn forget(&mut self, id: i64) {
        self.tasks.retain(|task| task.id != id);
    }

    /// Начинает редактирование копии задачи.
    pub fn start_edit(&mut self, id: i64) -> ViewResult<&mut Task> {
        let task = self.require(id)?;
        Ok(self.editing.insert(task))
    }

    /// Копия задачи, которая сейчас редактируется.
    pub fn editing_mut(&mut self) -> Option<&mut Task> {
        self.editing.as_mut()
    }

    /// Отменяет редактирование.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Отправляет отредактированную копию на сервер.
    pub async fn commit_edit(&mut self) -> ViewResult {
        let Some(editing) = self.editing.as_ref() else {
            return Err(ViewError::Invalid("Task title is required".to_string()));
        };
        let form = TaskForm {
            title: editing.title.clone(),
            description: editing.description.clone(),
        };
        let request = form
            .submit(editing.status)
            .map_err(|errors| ViewError::Invalid(errors.to_string()))?;
        let id = editing.id;

        self.updating = true;
        let result = self.client.update_task(id, &request).await;
        self.updating = false;

        let updated = result.map_err(|err| ViewError::request("Failed to update task", err))?;
        self.patch(updated);
        self.editing = None;
        Ok("Task updated successfully!".to_string())
    }

    /// Переключает статус задачи.
    pub async fn toggle_status(&mut self, id: i64) -> ViewResult {
        let task = self.require(id)?;
        let status = task.status.toggled();
        self.set_status(&task, status).await?;
        Ok(format!("Task marked as {status}!"))
    }

    /// Возвращает выполненную задачу в работу.
    pub async fn mark_as_pending(&mut self, id: i64) -> ViewResult {
        let task = self.require(id)?;
        self.set_status(&task, TaskStatus::Pending).await?;
        Ok("Task marked as pending!".to_string())
    }

    async fn set_status(&mut self, task: &Task, status: TaskStatus) -> ViewResult<()> {
        let request = TaskRequest::with_status(task, status);

        self.updating = true;
        let result = self.client.update_task(task.id, &request).await;
        self.updating = false;

        let updated =
            result.map_err(|err| ViewError::request("Failed to update task status", err))?;
        self.patch(updated);
        Ok(())
    }

    /// Удаляет задачу на сервере, затем из снимка.
    pub async fn delete(&mut self, id: i64) -> ViewResult {
        self.require(id)?;
        self.client
            .delete_task(id)
            .await
            .map_err(|err| ViewError::request("Failed to delete task", err))?;
        self.forget(id);
        Ok("Task deleted successfully!".to_string())
    }
}
