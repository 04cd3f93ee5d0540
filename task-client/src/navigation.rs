//! Экраны и защита маршрутов, требующих входа.

use std::fmt;

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Экраны клиента.
pub enum Route {
    /// Вход.
    Login,
    /// Регистрация.
    Register,
    /// Главная панель.
    Dashboard,
    /// Все задачи.
    Tasks,
    /// Выполненные задачи.
    Completed,
}

impl Route {
    /// Путь экрана.
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Register => "/auth/register",
            Self::Dashboard => "/dashboard",
            Self::Tasks => "/tasks",
            Self::Completed => "/completed",
        }
    }

    /// Маршрут по пути; пустой и неизвестный путь ведут на главную панель.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/auth/login" | "/login" => Self::Login,
            "/auth/register" | "/register" => Self::Register,
            "/tasks" => Self::Tasks,
            "/completed" => Self::Completed,
            _ => Self::Dashboard,
        }
    }

    /// `true` для экранов, доступных только после входа.
    pub fn requires_auth(self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Куда на самом деле попадёт пользователь, запросивший `requested`.
///
/// Защищённые экраны без действующего токена ведут на вход, экраны входа и
/// регистрации при действующем токене ведут на главную панель.
pub fn guard(session: &Session, requested: Route) -> Route {
    let authenticated = session.is_authenticated();
    match (requested.requires_auth(), authenticated) {
        (true, false) => {
            tracing::debug!(route = %requested, "not authenticated, redirecting to login");
            Route::Login
        }
        (false, true) => Route::Dashboard,
        _ => requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::models::AuthResponse;
    use crate::storage::MemoryStore;
    use crate::token::tests::valid_token;

    #[test]
    fn unknown_paths_fall_back_to_dashboard() {
        assert_eq!(Route::from_path(""), Route::Dashboard);
        assert_eq!(Route::from_path("/nowhere"), Route::Dashboard);
        assert_eq!(Route::from_path("/completed/"), Route::Completed);
        assert_eq!(Route::from_path(Route::Login.path()), Route::Login);
    }

    #[test]
    fn guard_redirects_anonymous_user_to_login() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        assert_eq!(guard(&session, Route::Tasks), Route::Login);
        assert_eq!(guard(&session, Route::Register), Route::Register);
    }

    #[test]
    fn guard_redirects_authenticated_user_away_from_login() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        session
            .establish(&AuthResponse {
                token: valid_token(),
                username: "alice".to_string(),
            })
            .expect("establish must succeed");

        assert_eq!(guard(&session, Route::Login), Route::Dashboard);
        assert_eq!(guard(&session, Route::Completed), Route::Completed);
    }
}
