//! Filesystem `ImageStore` confined to the upload directory.
//!
//! All access goes through a `cap_std` directory handle, so file names can
//! never reach outside it. Blocking I/O runs on the blocking pool.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};

use crate::domain::ports::{ImageStore, ImageStoreError};

/// [`ImageStore`] writing one file per image into a single directory.
#[derive(Clone)]
pub struct FsImageStore {
    dir: Arc<Dir>,
}

impl FsImageStore {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the directory cannot be created or opened.
    pub fn open(root: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self { dir: Arc::new(dir) })
    }
}

fn map_io(file_name: &str, error: io::Error) -> ImageStoreError {
    ImageStoreError::io(format!("{file_name}: {error}"))
}

fn map_join(error: tokio::task::JoinError) -> ImageStoreError {
    ImageStoreError::io(format!("storage task failed: {error}"))
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<(), ImageStoreError> {
        let dir = Arc::clone(&self.dir);
        let name = file_name.to_owned();
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || dir.write(&name, bytes).map_err(|err| map_io(&name, err)))
            .await
            .map_err(map_join)?
    }

    async fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>, ImageStoreError> {
        let dir = Arc::clone(&self.dir);
        let name = file_name.to_owned();
        tokio::task::spawn_blocking(move || match dir.read(&name) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(map_io(&name, err)),
        })
        .await
        .map_err(map_join)?
    }
}
