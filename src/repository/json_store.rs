//! Flat-file JSON collections.
//!
//! Each collection is one JSON array in one file. Reads parse the whole file;
//! mutations hold the store's lock across read, modify and write, then write
//! to a sibling temp file and rename it over the original.
//!
//! A missing file and a file that does not parse are both read as an empty
//! collection. The corrupt case is logged, and the next successful mutation
//! replaces the file.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};

pub const ANNOUNCEMENTS_FILE: &str = "announcements.json";
pub const GALLERY_FILE: &str = "gallery.json";
pub const ADMINS_FILE: &str = "admins.json";
pub const RECOVERY_FILE: &str = "recovery-requests.json";
pub const RESULTS_FILE: &str = "results.json";

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Time-based numeric id: the current Unix time in milliseconds, bumped past
/// the last id handed out so that ids stay unique within the process.
pub fn next_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, candidate, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

pub struct JsonStore<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Store for `file_name` inside `data_dir`.
    pub fn in_dir(data_dir: &Path, file_name: &str) -> Self {
        Self::new(data_dir.join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole collection.
    pub async fn load(&self) -> Result<Vec<T>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        match serde_json::from_slice(&bytes) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(
                    "Treating unreadable collection {} as empty: {}",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    /// Read-modify-write under the store lock. Nothing is written when `f` fails.
    pub async fn mutate<R, F>(&self, f: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(&mut Vec<T>) -> Result<R> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        let out = f(&mut items)?;
        self.write_all(&items).await?;
        Ok(out)
    }

    /// Insert at the front (newest-first collections).
    pub async fn prepend(&self, item: T) -> Result<()> {
        self.mutate(|items| {
            items.insert(0, item);
            Ok(())
        })
        .await
    }

    pub async fn append(&self, item: T) -> Result<()> {
        self.mutate(|items| {
            items.push(item);
            Ok(())
        })
        .await
    }

    /// Remove every item matching `pred`, returning the removed items.
    /// Removing nothing is not an error.
    pub async fn remove_where<P>(&self, pred: P) -> Result<Vec<T>>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.mutate(|items| {
            let (removed, kept): (Vec<T>, Vec<T>) = std::mem::take(items).into_iter().partition(|i| pred(i));
            *items = kept;
            Ok(removed)
        })
        .await
    }

    /// Apply `patch` to the first item matching `pred`.
    pub async fn update_where<P, F>(&self, pred: P, patch: F) -> Result<Option<T>>
    where
        T: Clone,
        P: Fn(&T) -> bool + Send + Sync,
        F: FnOnce(&mut T) + Send,
    {
        self.mutate(|items| {
            Ok(items.iter_mut().find(|i| pred(i)).map(|item| {
                patch(item);
                item.clone()
            }))
        })
        .await
    }

    async fn write_all(&self, items: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
