//! Постоянное хранилище токена и пользователя.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

/// Ключ, под которым хранится bearer-токен.
pub const TOKEN_KEY: &str = "jwt_token";
/// Ключ, под которым хранится сериализованный [`crate::User`].
pub const USER_KEY: &str = "current_user";

#[derive(Debug, Error)]
/// Ошибки постоянного хранилища сессии.
pub enum StorageError {
    /// Не удалось прочитать или записать файл.
    #[error("session file io failed: {0}")]
    Io(#[from] io::Error),

    /// Содержимое файла не является JSON-объектом строк.
    #[error("session file is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// Строковое key/value-хранилище, переживающее перезапуск клиента.
///
/// Чтение никогда не падает: недоступное значение равносильно отсутствующему.
pub trait KeyValueStore: Send + Sync {
    /// Возвращает значение по ключу.
    fn get(&self, key: &str) -> Option<String>;
    /// Записывает значение.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Удаляет значение; отсутствие ключа не ошибка.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
/// Хранилище в памяти процесса.
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Пустое хранилище.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[derive(Debug)]
/// Хранилище в JSON-файле: объект `{"ключ": "значение"}`.
///
/// Файл перечитывается при каждом обращении и перезаписывается целиком при
/// каждом изменении.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Хранилище поверх файла `path`. Файл создаётся при первой записи.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Путь к файлу хранилища.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Испорченный файл не должен блокировать запись новой сессии.
        let mut entries = self.read_entries().unwrap_or_default();
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match self.read_entries() {
            Ok(mut entries) => entries.remove(key),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "session file is unreadable");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
