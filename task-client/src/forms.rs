//! Проверка форм входа, регистрации и редактирования задачи.
//!
//! Правила и формулировки ошибок совпадают с веб-интерфейсом.

use std::borrow::Cow;
use std::collections::BTreeMap;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{LoginRequest, RegisterRequest, TaskRequest, TaskStatus};

#[derive(Debug, Clone, Default, Validate)]
/// Форма входа.
pub struct LoginForm {
    /// Логин.
    #[validate(length(min = 3, max = 20), custom(function = "required"))]
    pub username: String,
    /// Пароль.
    #[validate(length(min = 6), custom(function = "required"))]
    pub password: String,
}

impl LoginForm {
    /// Проверяет форму и собирает запрос.
    pub fn submit(&self) -> Result<LoginRequest, FormErrors> {
        self.validate().map_err(|errors| FormErrors::from_validation(&errors))?;
        Ok(LoginRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
#[validate(schema(function = "passwords_match", skip_on_field_errors = false))]
/// Форма регистрации.
pub struct RegisterForm {
    /// Логин: латиница, цифры и `_`.
    #[validate(length(min = 3, max = 20), custom(function = "username_rules"))]
    pub username: String,
    /// Пароль: минимум одна буква и одна цифра.
    #[validate(length(min = 6), custom(function = "password_rules"))]
    pub password: String,
    /// Повтор пароля; на сервер не отправляется.
    #[validate(custom(function = "required"))]
    pub confirm_password: String,
}

impl RegisterForm {
    /// Проверяет форму и собирает запрос без поля подтверждения.
    pub fn submit(&self) -> Result<RegisterRequest, FormErrors> {
        self.validate().map_err(|errors| FormErrors::from_validation(&errors))?;
        Ok(RegisterRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
/// Форма создания или редактирования задачи.
pub struct TaskForm {
    /// Заголовок; обязателен после обрезки пробелов.
    #[validate(custom(function = "title_present"))]
    pub title: String,
    /// Описание; пустое превращается в отсутствующее.
    pub description: Option<String>,
}

impl TaskForm {
    /// Проверяет форму и собирает запрос с указанным статусом.
    pub fn submit(&self, status: TaskStatus) -> Result<TaskRequest, FormErrors> {
        self.validate().map_err(|errors| FormErrors::from_validation(&errors))?;
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        Ok(TaskRequest {
            title: self.title.trim().to_string(),
            description,
            status,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Ошибки формы: по одному сообщению на поле.
pub struct FormErrors {
    fields: BTreeMap<String, String>,
}

impl FormErrors {
    fn from_validation(errors: &ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        for (field, field_errors) in errors.field_errors() {
            let field = field.to_string();
            let field = if field == "__all__" {
                "confirm_password".to_string()
            } else {
                field
            };
            if let Some(message) = first_message(&field, field_errors) {
                fields.entry(field).or_insert(message);
            }
        }
        Self { fields }
    }

    /// Сообщение для поля, если оно невалидно.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Все сообщения в порядке имён полей.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(String::as_str)
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self.messages().collect::<Vec<_>>().join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FormErrors {}

fn display_name(field: &str) -> &str {
    match field {
        "username" => "Username",
        "password" => "Password",
        "confirm_password" => "Confirm Password",
        "title" => "Task title",
        other => other,
    }
}

// "required" важнее длины: пустое поле не должно сообщать о минимальной длине.
fn first_message(field: &str, errors: &[ValidationError]) -> Option<String> {
    let name = display_name(field);
    let pick = |code: &str| errors.iter().find(|error| error.code == code);

    if pick("required").is_some() {
        return Some(format!("{name} is required"));
    }
    if let Some(error) = pick("length") {
        if let Some(min) = error.params.get("min").and_then(|value| value.as_u64()) {
            let value_len = error
                .params
                .get("value")
                .and_then(|value| value.as_str())
                .map(|value| value.chars().count() as u64);
            if value_len.is_none_or(|len| len < min) {
                return Some(format!("{name} must be at least {min} characters"));
            }
        }
        if let Some(max) = error.params.get("max").and_then(|value| value.as_u64()) {
            return Some(format!("{name} cannot exceed {max} characters"));
        }
    }

    errors.iter().find_map(|error| {
        error
            .message
            .as_ref()
            .map(|message| message.to_string())
    })
}

fn required(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn title_present(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn username_rules(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Ok(());
    }
    Err(ValidationError::new("pattern").with_message(Cow::Borrowed(
        "Username can only contain letters, numbers, and underscores",
    )))
}

fn password_rules(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    if has_letter(value) && has_digit(value) && value.chars().count() >= 6 {
        return Ok(());
    }
    Err(
        ValidationError::new("passwordStrength").with_message(Cow::Borrowed(
            "Password must contain at least one letter and one number",
        )),
    )
}

fn passwords_match(form: &RegisterForm) -> Result<(), ValidationError> {
    if !form.password.is_empty()
        && !form.confirm_password.is_empty()
        && form.password != form.confirm_password
    {
        return Err(ValidationError::new("passwordMismatch")
            .with_message(Cow::Borrowed("Passwords do not match")));
    }
    Ok(())
}

fn has_letter(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_alphabetic())
}

fn has_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Оценка надёжности пароля для индикатора в форме регистрации.
pub enum PasswordStrength {
    /// Не больше двух признаков.
    Weak,
    /// Три признака.
    Medium,
    /// Четыре и больше.
    Strong,
}

/// Считает признаки: длина ≥ 6, цифра, буква, длина ≥ 8, спецсимвол.
///
/// Для пустого пароля оценки нет.
pub fn password_strength_of(password: &str) -> Option<PasswordStrength> {
    if password.is_empty() {
        return None;
    }

    let len = password.chars().count();
    let special = password.chars().any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c));
    let score = [
        len >= 6,
        has_digit(password),
        has_letter(password),
        len >= 8,
        special,
    ]
    .into_iter()
    .filter(|passed| *passed)
    .count();

    Some(match score {
        0..=2 => PasswordStrength::Weak,
        3 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    })
}
