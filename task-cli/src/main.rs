mod logging;
mod settings;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use task_client::forms::{FormErrors, LoginForm, RegisterForm, TaskForm, password_strength_of};
use task_client::views::{StatusFilter, ViewError};
use task_client::{
    ClientError, FileStore, Route, Task, TaskManagerClient, TaskStatus, User,
};

use crate::logging::init_logging;
use crate::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "task-cli", version, about = "CLI клиент менеджера задач")]
struct Cli {
    /// Адрес сервера (по умолчанию TASK_API_URL или http://127.0.0.1:8080).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Печатать задачи в JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Повтор пароля; по умолчанию совпадает с `--password`.
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: сессия удаляется из файла.
    Logout,
    /// Текущий пользователь.
    Whoami,
    /// Сводка главной панели (требует вход).
    Dashboard,
    /// Список задач (требует вход).
    List {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        status: FilterArg,
    },
    /// Задача по id (требует вход).
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание задачи (требует вход).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Обновление задачи (требует вход).
    ///
    /// Неуказанные поля остаются прежними.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Переключение статуса задачи (требует вход).
    Toggle {
        #[arg(long)]
        id: i64,
    },
    /// Удаление задачи (требует вход).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Вернуть все выполненные задачи в работу (требует вход).
    MarkAllPending,
    /// Удалить все выполненные задачи (требует вход).
    DeleteCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FilterArg {
    All,
    Pending,
    Completed,
}

impl From<FilterArg> for StatusFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => StatusFilter::All,
            FilterArg::Pending => StatusFilter::Pending,
            FilterArg::Completed => StatusFilter::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StatusArg {
    Pending,
    Completed,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => TaskStatus::Pending,
            StatusArg::Completed => TaskStatus::Completed,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;
    init_logging(&settings.log_level)?;

    let config = settings.client_config(cli.server);
    tracing::debug!(base_url = %config.base_url, session_file = %settings.session_file.display(), "starting");

    let store = Arc::new(FileStore::new(&settings.session_file));
    let client = TaskManagerClient::new(&config, store).context("не удалось создать HTTP клиент")?;
    let output = Output { json: cli.json };

    match cli.command {
        Command::Register {
            username,
            password,
            confirm_password,
        } => {
            let form = RegisterForm {
                username,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
            };
            let request = form.submit().map_err(map_form_errors)?;
            let user = client
                .auth()
                .register(&request)
                .await
                .map_err(map_client_error)?;
            print_user("Регистрация успешна", &user);
            if let Some(strength) = password_strength_of(&form.password) {
                println!("надёжность пароля: {strength:?}");
            }
        }
        Command::Login { username, password } => {
            let request = LoginForm { username, password }
                .submit()
                .map_err(map_form_errors)?;
            let user = client
                .auth()
                .login(&request)
                .await
                .map_err(map_client_error)?;
            print_user("Вход выполнен", &user);
        }
        Command::Logout => {
            client.logout();
            println!("Сессия завершена");
        }
        Command::Whoami => match client.session().current_user() {
            Some(user) if client.session().is_authenticated() => print_user("Пользователь", &user),
            _ => println!("Вход не выполнен"),
        },
        Command::Dashboard => {
            require_login(&client, Route::Dashboard)?;
            let mut view = client.dashboard();
            view.load().await.map_err(map_view_error)?;
            let header = client.header(Route::Dashboard);
            println!("{} [{}]", header.breadcrumbs(), header.user_initials());
            let board = view.board();
            println!(
                "Задач: {} (в работе: {}, выполнено: {})",
                board.tasks().len(),
                board.pending().len(),
                board.completed().len()
            );
            output.tasks(board.tasks().iter())?;
        }
        Command::List { status } => {
            let route = if status == FilterArg::Completed {
                Route::Completed
            } else {
                Route::Tasks
            };
            require_login(&client, route)?;
            let mut view = client.all_tasks();
            view.load().await.map_err(map_view_error)?;
            view.set_filter(status.into());
            output.tasks(view.visible().into_iter())?;
        }
        Command::Get { id } => {
            require_login(&client, Route::Tasks)?;
            let task = client.tasks().get_task(id).await.map_err(map_client_error)?;
            output.task("Задача", &task)?;
        }
        Command::Create { title, description } => {
            require_login(&client, Route::Dashboard)?;
            let mut view = client.dashboard();
            *view.show_create_form() = TaskForm { title, description };
            let message = view.create_task().await.map_err(map_view_error)?;
            println!("{message}");
            if let Some(task) = view.board().tasks().first() {
                output.task("Задача", task)?;
            }
        }
        Command::Update {
            id,
            title,
            description,
            status,
        } => {
            require_login(&client, Route::Tasks)?;
            let mut view = client.all_tasks();
            view.load().await.map_err(map_view_error)?;
            let board = view.board_mut();
            let editing = board.start_edit(id).map_err(map_view_error)?;
            apply_edit(editing, title, description, status);
            let message = board.commit_edit().await.map_err(map_view_error)?;
            println!("{message}");
            if let Some(task) = board.find(id) {
                output.task("Задача", task)?;
            }
        }
        Command::Toggle { id } => {
            require_login(&client, Route::Tasks)?;
            let mut view = client.all_tasks();
            view.load().await.map_err(map_view_error)?;
            let message = view
                .board_mut()
                .toggle_status(id)
                .await
                .map_err(map_view_error)?;
            println!("{message}");
        }
        Command::Delete { id } => {
            require_login(&client, Route::Tasks)?;
            let mut view = client.all_tasks();
            view.load().await.map_err(map_view_error)?;
            let message = view.board_mut().delete(id).await.map_err(map_view_error)?;
            println!("{message}");
        }
        Command::MarkAllPending => {
            require_login(&client, Route::Completed)?;
            let mut view = client.completed_tasks();
            view.load().await.map_err(map_view_error)?;
            match view.mark_all_pending().await.map_err(map_view_error)? {
                Some(message) => println!("{message}"),
                None => println!("Выполненных задач нет"),
            }
        }
        Command::DeleteCompleted => {
            require_login(&client, Route::Completed)?;
            let mut view = client.completed_tasks();
            view.load().await.map_err(map_view_error)?;
            match view.delete_all_completed().await.map_err(map_view_error)? {
                Some(message) => println!("{message}"),
                None => println!("Выполненных задач нет"),
            }
        }
    }

    Ok(())
}

fn require_login(client: &TaskManagerClient, route: Route) -> Result<()> {
    if client.resolve(route) == Route::Login {
        return Err(anyhow!(
            "требуется авторизация: выполните `task-cli login ...` или `task-cli register ...`"
        ));
    }
    Ok(())
}

fn apply_edit(
    task: &mut Task,
    title: Option<String>,
    description: Option<String>,
    status: Option<StatusArg>,
) {
    if let Some(title) = title {
        task.title = title;
    }
    if let Some(description) = description {
        task.description = Some(description);
    }
    if let Some(status) = status {
        task.status = status.into();
    }
}

fn map_form_errors(errors: FormErrors) -> anyhow::Error {
    anyhow!("некорректные данные: {errors}")
}

fn map_client_error(err: ClientError) -> anyhow::Error {
    if err.is_unauthorized() {
        return anyhow!(
            "требуется авторизация: выполните `task-cli login ...` или `task-cli register ...`"
        );
    }
    if err.is_not_found() {
        return anyhow!("задача не найдена");
    }

    match err.server_message() {
        Some(message) => anyhow!("сервер отклонил запрос: {message}"),
        None => anyhow!("ошибка запроса: {err}"),
    }
}

fn map_view_error(err: ViewError) -> anyhow::Error {
    match err {
        ViewError::Request { message, source } if source.is_unauthorized() => {
            tracing::debug!(%message, "request rejected as unauthorized");
            map_client_error(source)
        }
        ViewError::Request { message, source } => anyhow!("{message}: {source}"),
        ViewError::UnknownTask(id) => anyhow!("задача не найдена: id={id}"),
        other => anyhow!("{other}"),
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn task(&self, title: &str, task: &Task) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(task)?);
            return Ok(());
        }

        println!("{title}");
        println!("id: {}", task.id);
        println!("title: {}", task.title);
        println!("description: {}", task.description.as_deref().unwrap_or("-"));
        println!("status: {}", task.status);
        println!("created_at: {}", format_time(task.created_at));
        println!("updated_at: {}", format_time(task.updated_at));
        Ok(())
    }

    fn tasks<'a>(&self, tasks: impl Iterator<Item = &'a Task>) -> Result<()> {
        let tasks: Vec<&Task> = tasks.collect();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&tasks)?);
            return Ok(());
        }

        println!("Задач: {}", tasks.len());
        for task in tasks {
            println!("- {}", task_line(task));
        }
        Ok(())
    }
}

fn task_line(task: &Task) -> String {
    let mark = match task.status {
        TaskStatus::Completed => "x",
        TaskStatus::Pending => " ",
    };
    match task.description.as_deref() {
        Some(description) => format!("[{mark}] #{} {} ({description})", task.id, task.title),
        None => format!("[{mark}] #{} {}", task.id, task.title),
    }
}

fn format_time(value: Option<NaiveDateTime>) -> String {
    value
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_user(title: &str, user: &User) {
    println!("{title}");
    println!("user:");
    println!("  username: {}", user.username);
    println!("  initials: {}", user.initials());
    println!("  signed_in_at: {}", user.created_at);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus, description: Option<&str>) -> Task {
        Task {
            id: 7,
            title: "Buy milk".to_string(),
            description: description.map(str::to_string),
            status,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn cli_parses_update_with_partial_fields() {
        let cli = Cli::try_parse_from([
            "task-cli",
            "--server",
            "localhost:9999",
            "update",
            "--id",
            "7",
            "--status",
            "completed",
        ])
        .expect("arguments must parse");

        assert_eq!(cli.server.as_deref(), Some("localhost:9999"));
        match cli.command {
            Command::Update {
                id,
                title,
                description,
                status,
            } => {
                assert_eq!(id, 7);
                assert!(title.is_none());
                assert!(description.is_none());
                assert_eq!(status, Some(StatusArg::Completed));
            }
            other => panic!("expected update command, got {other:?}"),
        }
    }

    #[test]
    fn list_status_defaults_to_all() {
        let cli = Cli::try_parse_from(["task-cli", "list"]).expect("arguments must parse");
        match cli.command {
            Command::List { status } => assert_eq!(status, FilterArg::All),
            other => panic!("expected list command, got {other:?}"),
        }
    }

    #[test]
    fn apply_edit_keeps_unspecified_fields() {
        let mut edited = task(TaskStatus::Pending, Some("2 liters"));
        apply_edit(&mut edited, Some("Buy bread".to_string()), None, None);

        assert_eq!(edited.title, "Buy bread");
        assert_eq!(edited.description.as_deref(), Some("2 liters"));
        assert_eq!(edited.status, TaskStatus::Pending);

        apply_edit(&mut edited, None, None, Some(StatusArg::Completed));
        assert_eq!(edited.status, TaskStatus::Completed);
    }

    #[test]
    fn task_line_marks_completed_tasks() {
        assert_eq!(
            task_line(&task(TaskStatus::Completed, None)),
            "[x] #7 Buy milk"
        );
        assert_eq!(
            task_line(&task(TaskStatus::Pending, Some("2 liters"))),
            "[ ] #7 Buy milk (2 liters)"
        );
    }

    #[test]
    fn filter_arg_maps_to_view_filter() {
        assert_eq!(StatusFilter::from(FilterArg::Pending), StatusFilter::Pending);
        assert_eq!(StatusFilter::from(FilterArg::All), StatusFilter::All);
    }
}
