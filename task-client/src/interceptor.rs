//! Добавление bearer-токена к исходящим запросам.

use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};

/// Эндпоинты, которым токен не нужен.
pub const EXCLUDED_PATHS: [&str; 2] = ["/auth/login", "/auth/register"];

/// `true`, если запрос на `url` должен нести bearer-токен.
pub fn should_add_token(url: &str) -> bool {
    !EXCLUDED_PATHS.iter().any(|excluded| url.contains(excluded))
}

/// Добавляет `Authorization: Bearer <token>` ко всем запросам, кроме
/// эндпоинтов входа и регистрации.
///
/// Без токена запрос уходит без изменений.
pub fn intercept(mut request: Request, token: Option<&str>) -> Request {
    let Some(token) = token else {
        return request;
    };
    if !should_add_token(request.url().as_str()) {
        return request;
    }

    match HeaderValue::from_str(&format!("Bearer {token}")) {
        Ok(mut value) => {
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Err(_) => {
            tracing::warn!("bearer token contains invalid header characters, sending without it");
        }
    }
    request
}
