//! Async adapter
//!
//! Lets a tokio-based transport call the driver without blocking its
//! runtime threads. Every call moves onto the blocking pool.

use std::io::{self, Read};
use tokio::task;

use crate::driver::{FileDriver, StorageDriver};
use crate::error::{DriverError, Result};
use crate::storage::FileMetadata;

/// [`FileDriver`] wrapped for use from async code
#[derive(Debug, Clone)]
pub struct AsyncFileDriver {
    inner: FileDriver,
}

impl AsyncFileDriver {
    pub fn new(inner: FileDriver) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &FileDriver {
        &self.inner
    }

    async fn run<T, F>(&self, op: &'static str, path: &str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(FileDriver) -> Result<T> + Send + 'static,
    {
        let driver = self.inner.clone();
        task::spawn_blocking(move || f(driver))
            .await
            .map_err(|e| DriverError::io(op, path, io::Error::other(e)))?
    }

    pub async fn change_dir(&self, path: &str) -> Result<()> {
        let owned = path.to_string();
        self.run("cwd", path, move |d| d.change_dir(&owned)).await
    }

    pub async fn stat(&self, path: &str) -> Result<FileMetadata> {
        let owned = path.to_string();
        self.run("stat", path, move |d| d.stat(&owned)).await
    }

    pub async fn list_directory(&self, path: &str) -> Result<Vec<FileMetadata>> {
        let owned = path.to_string();
        self.run("list", path, move |d| d.list_directory(&owned)).await
    }

    pub async fn make_dir(&self, path: &str) -> Result<()> {
        let owned = path.to_string();
        self.run("mkdir", path, move |d| d.make_dir(&owned)).await
    }

    pub async fn delete_dir(&self, path: &str) -> Result<()> {
        let owned = path.to_string();
        self.run("rmdir", path, move |d| d.delete_dir(&owned)).await
    }

    pub async fn delete_file(&self, path: &str) -> Result<()> {
        let owned = path.to_string();
        self.run("delete", path, move |d| d.delete_file(&owned)).await
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let (from_owned, to_owned) = (from.to_string(), to.to_string());
        self.run("rename", from, move |d| d.rename(&from_owned, &to_owned)).await
    }

    /// Opens `path` at `offset` and returns its full size with an async handle.
    pub async fn get_file(&self, path: &str, offset: u64) -> Result<(u64, tokio::fs::File)> {
        let owned = path.to_string();
        let (size, file) = self
            .run("open", path, move |d| d.get_file(&owned, offset))
            .await?;
        Ok((size, tokio::fs::File::from_std(file)))
    }

    /// Uploads from a blocking reader, such as a bridged data connection.
    pub async fn put_file<R>(&self, path: &str, mut data: R, append: bool) -> Result<u64>
    where
        R: Read + Send + 'static,
    {
        let owned = path.to_string();
        self.run("put", path, move |d| d.put_file(&owned, &mut data, append)).await
    }

    /// Uploads an in-memory buffer.
    pub async fn put_bytes(&self, path: &str, data: Vec<u8>, append: bool) -> Result<u64> {
        self.put_file(path, io::Cursor::new(data), append).await
    }
}

impl From<FileDriver> for AsyncFileDriver {
    fn from(inner: FileDriver) -> Self {
        Self::new(inner)
    }
}
