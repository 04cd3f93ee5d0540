use std::sync::Arc;

use tokio::sync::watch;

use crate::models::{User, initials_of};
use crate::navigation::Route;
use crate::session::Session;

/// Хлебные крошки для экрана по его пути.
pub fn breadcrumbs_for(path: &str) -> &'static str {
    match Route::from_path(path) {
        Route::Tasks => "Dashboard / All Tasks",
        Route::Completed => "Dashboard / Completed Tasks",
        _ => "Dashboard",
    }
}

#[derive(Debug)]
/// Шапка: пользователь, хлебные крошки, выход.
pub struct Header {
    session: Arc<Session>,
    user: watch::Receiver<Option<User>>,
    breadcrumbs: &'static str,
}

impl Header {
    /// Шапка для экрана `path`.
    pub fn new(session: Arc<Session>, path: &str) -> Self {
        let user = session.subscribe();
        Self {
            session,
            user,
            breadcrumbs: breadcrumbs_for(path),
        }
    }

    /// Пересчитывает хлебные крошки после перехода.
    pub fn navigated(&mut self, path: &str) {
        self.breadcrumbs = breadcrumbs_for(path);
    }

    /// Текущие хлебные крошки.
    pub fn breadcrumbs(&self) -> &'static str {
        self.breadcrumbs
    }

    /// Текущий пользователь.
    pub fn current_user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    /// Инициалы пользователя или `U`.
    pub fn user_initials(&self) -> String {
        initials_of(self.user.borrow().as_ref())
    }

    /// Выход из сессии.
    pub fn logout(&self) -> Route {
        self.session.logout()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Пункт боковой навигации.
pub struct NavigationItem {
    /// Подпись.
    pub label: &'static str,
    /// Имя иконки.
    pub icon: &'static str,
    /// Экран.
    pub route: Route,
    /// Пункт соответствует текущему экрану.
    pub active: bool,
}

#[derive(Debug)]
/// Боковая панель: навигация, пользователь, выход.
pub struct Sidebar {
    session: Arc<Session>,
    user: watch::Receiver<Option<User>>,
    items: Vec<NavigationItem>,
}

impl Sidebar {
    /// Панель с активным пунктом для экрана `path`.
    pub fn new(session: Arc<Session>, path: &str) -> Self {
        let user = session.subscribe();
        let items = [
            ("Dashboard", "dashboard", Route::Dashboard),
            ("All Tasks", "assignment", Route::Tasks),
            ("Completed", "done_all", Route::Completed),
        ]
        .into_iter()
        .map(|(label, icon, route)| NavigationItem {
            label,
            icon,
            route,
            active: false,
        })
        .collect();

        let mut sidebar = Self {
            session,
            user,
            items,
        };
        sidebar.highlight(Route::from_path(path));
        sidebar
    }

    fn highlight(&mut self, route: Route) {
        for item in &mut self.items {
            item.active = item.route == route;
        }
    }

    /// Пункты навигации.
    pub fn items(&self) -> &[NavigationItem] {
        &self.items
    }

    /// Выбирает пункт и возвращает экран для перехода.
    pub fn navigate_to(&mut self, route: Route) -> Route {
        self.highlight(route);
        route
    }

    /// Инициалы пользователя или `U`.
    pub fn user_initials(&self) -> String {
        initials_of(self.user.borrow().as_ref())
    }

    /// Выход из сессии.
    pub fn logout(&self) -> Route {
        self.session.logout()
    }
}
