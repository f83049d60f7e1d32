//! File-backed store manager with atomic writes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::{DraftArchive, PostArchive};

/// Post archive file name inside the data directory.
const POSTS_FILE_NAME: &str = "posts.json";

/// Draft archive file name inside the data directory.
const DRAFTS_FILE_NAME: &str = "drafts.json";

/// Errors from store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store IO error: {0}")]
    Io(#[from] io::Error),

    #[error("store file contains invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Manages the post and draft archives under one data directory.
///
/// Saves are atomic: the archive is serialized to a sibling temp file and
/// renamed over the target, so a crash mid-write leaves the previous
/// archive intact. A missing archive file reads as empty, which is the
/// normal state of a fresh data directory.
#[derive(Debug, Clone)]
pub struct StoreManager {
    posts_path: PathBuf,
    drafts_path: PathBuf,
}

impl StoreManager {
    /// Create a manager rooted at the given data directory, creating the
    /// directory if it does not exist.
    pub fn new(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            posts_path: data_dir.join(POSTS_FILE_NAME),
            drafts_path: data_dir.join(DRAFTS_FILE_NAME),
        })
    }

    /// Load the post archive, or an empty one if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    /// A malformed archive is never silently replaced.
    pub fn load_posts(&self) -> StoreResult<PostArchive> {
        load_archive(&self.posts_path)
    }

    /// Persist the post archive atomically.
    pub fn save_posts(&self, archive: &PostArchive) -> StoreResult<()> {
        save_archive(&self.posts_path, archive)
    }

    /// Load the draft archive, or an empty one if the file is missing.
    pub fn load_drafts(&self) -> StoreResult<DraftArchive> {
        load_archive(&self.drafts_path)
    }

    /// Persist the draft archive atomically.
    pub fn save_drafts(&self, archive: &DraftArchive) -> StoreResult<()> {
        save_archive(&self.drafts_path, archive)
    }

    /// Path of the post archive file.
    pub fn posts_path(&self) -> &Path {
        &self.posts_path
    }

    /// Path of the draft archive file.
    pub fn drafts_path(&self) -> &Path {
        &self.drafts_path
    }
}

fn load_archive<T>(path: &Path) -> StoreResult<T>
where
    T: Default + DeserializeOwned,
{
    match fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

fn save_archive<T: Serialize>(path: &Path, archive: &T) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(archive)?;
    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
