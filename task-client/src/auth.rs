use reqwest::Method;

use crate::error::ClientResult;
use crate::http_client::ApiClient;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";

#[derive(Debug, Clone)]
/// Вход и регистрация.
///
/// При успехе токен и пользователь сохраняются в сессию, при ошибке сессия не
/// меняется, а ошибка сервера возвращается вызывающему как есть.
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    /// Клиент авторизации поверх общего конвейера.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Выполняет вход и публикует пользователя.
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<User> {
        let auth: AuthResponse = self
            .api
            .send_json(Method::POST, LOGIN_PATH, request)
            .await?;
        self.api.session().establish(&auth)
    }

    /// Регистрирует пользователя и сразу открывает для него сессию.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<User> {
        let auth: AuthResponse = self
            .api
            .send_json(Method::POST, REGISTER_PATH, request)
            .await?;
        self.api.session().establish(&auth)
    }
}
