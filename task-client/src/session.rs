use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::error::ClientResult;
use crate::models::{AuthResponse, User};
use crate::navigation::Route;
use crate::storage::{KeyValueStore, TOKEN_KEY, USER_KEY};
use crate::token;

/// Токен и текущий пользователь: постоянное хранилище плюс широковещательное
/// значение для всех представлений.
///
/// Писатель один (успешный вход/регистрация и выход), читателей сколько
/// угодно. Подписчики получают новое значение через [`Session::subscribe`].
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    current_user: watch::Sender<Option<User>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current_user", &*self.current_user.borrow())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Создаёт сессию поверх хранилища и восстанавливает сохранённого
    /// пользователя, если он есть.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (current_user, _) = watch::channel(None);
        let session = Self {
            store,
            current_user,
        };
        session.restore();
        session
    }

    fn restore(&self) {
        let (Some(_), Some(raw_user)) = (self.token(), self.store.get(USER_KEY)) else {
            return;
        };

        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => {
                tracing::debug!(username = %user.username, "restored stored session");
                self.current_user.send_replace(Some(user));
            }
            Err(err) => {
                tracing::warn!(error = %err, "stored user is malformed, clearing session");
                self.clear();
            }
        }
    }

    /// Текущий bearer-токен.
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|token| !token.trim().is_empty())
    }

    /// Текущий пользователь.
    pub fn current_user(&self) -> Option<User> {
        self.current_user.borrow().clone()
    }

    /// Подписка на изменения текущего пользователя.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current_user.subscribe()
    }

    /// `true`, если есть токен и срок его действия ещё не истёк.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    /// То же, что [`Session::is_authenticated`], относительно момента `now`.
    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        match self.token() {
            Some(token) => token::is_unexpired(&token, now),
            None => false,
        }
    }

    /// Сохраняет результат успешного входа/регистрации и публикует
    /// пользователя.
    ///
    /// Если пользователя сохранить не удалось, сессия очищается целиком,
    /// чтобы токен не остался без пары.
    pub(crate) fn establish(&self, auth: &AuthResponse) -> ClientResult<User> {
        let user = User::from_auth(auth, Utc::now());

        if let Err(err) = self.persist(&auth.token, &user) {
            self.clear();
            return Err(err);
        }

        self.current_user.send_replace(Some(user.clone()));
        tracing::info!(username = %user.username, "session established");
        Ok(user)
    }

    fn persist(&self, token: &str, user: &User) -> ClientResult<()> {
        let raw_user = serde_json::to_string(user)?;
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &raw_user)?;
        Ok(())
    }

    /// Завершает сессию и возвращает маршрут, на который нужно перейти.
    pub fn logout(&self) -> Route {
        self.clear();
        tracing::info!("logged out");
        Route::Login
    }

    /// Удаляет токен и пользователя из хранилища и сбрасывает
    /// широковещательное значение.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.store.remove(key) {
                tracing::warn!(key, error = %err, "failed to remove session key");
            }
        }
        self.current_user.send_replace(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use crate::token::tests::{token_expiring_at, valid_token};

    fn auth(token: &str) -> AuthResponse {
        AuthResponse {
            token: token.to_string(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn establish_keeps_store_and_state_consistent() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        let token = valid_token();

        let user = session.establish(&auth(&token)).expect("establish must succeed");

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "alice");
        assert_eq!(session.token().as_deref(), Some(token.as_str()));
        assert_eq!(session.current_user(), Some(user.clone()));

        let stored: User = serde_json::from_str(&store.get(USER_KEY).expect("user stored"))
            .expect("stored user must parse");
        assert_eq!(stored, user);
        assert!(session.is_authenticated());
    }

    #[test]
    fn subscribers_see_login_and_logout() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        let receiver = session.subscribe();
        assert!(receiver.borrow().is_none());

        session.establish(&auth(&valid_token())).expect("establish must succeed");
        assert_eq!(
            receiver.borrow().as_ref().map(|user| user.username.clone()),
            Some("alice".to_string())
        );

        assert_eq!(session.logout(), Route::Login);
        assert!(receiver.borrow().is_none());
    }

    #[test]
    fn logout_always_clears_everything() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());

        assert_eq!(session.logout(), Route::Login);
        assert!(store.get(TOKEN_KEY).is_none());

        session.establish(&auth(&valid_token())).expect("establish must succeed");
        session.logout();

        assert!(store.get(TOKEN_KEY).is_none());
        assert!(store.get(USER_KEY).is_none());
        assert!(session.current_user().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn restore_publishes_stored_user() {
        let store = Arc::new(MemoryStore::new());
        {
            let first = Session::new(store.clone());
            first.establish(&auth(&valid_token())).expect("establish must succeed");
        }

        let restored = Session::new(store);
        assert_eq!(
            restored.current_user().map(|user| user.username),
            Some("alice".to_string())
        );
    }

    #[test]
    fn restore_clears_malformed_user() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, &valid_token()).expect("set must succeed");
        store.set(USER_KEY, "{not-json}").expect("set must succeed");

        let session = Session::new(store.clone());

        assert!(session.current_user().is_none());
        assert!(store.get(TOKEN_KEY).is_none());
        assert!(store.get(USER_KEY).is_none());
    }

    #[test]
    fn restore_ignores_user_without_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(USER_KEY, "{not-json}").expect("set must succeed");

        let session = Session::new(store.clone());

        assert!(session.current_user().is_none());
        assert_eq!(store.get(USER_KEY).as_deref(), Some("{not-json}"));
    }

    #[test]
    fn expired_token_is_not_authenticated() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        store
            .set(TOKEN_KEY, &token_expiring_at(now.timestamp() - 60))
            .expect("set must succeed");

        let session = Session::new(store);
        assert!(session.token().is_some());
        assert!(!session.is_authenticated_at(now));
    }

    struct FailingUserStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for FailingUserStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == USER_KEY {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_user_write_does_not_leave_orphan_token() {
        let store = Arc::new(FailingUserStore {
            inner: MemoryStore::new(),
        });
        let session = Session::new(store.clone());

        let result = session.establish(&auth(&valid_token()));

        assert!(result.is_err());
        assert!(store.get(TOKEN_KEY).is_none());
        assert!(session.current_user().is_none());
    }
}
