//! Destinations for downloaded results

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

use crate::error::RetrievalError;

/// Trait for saving a fetched result under a filename
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Save the bytes. Returns where they ended up.
    async fn save(&self, data: Bytes, filename: &str) -> Result<String, RetrievalError>;
}

/// Writes results into a directory, never overwriting an existing file
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `name.pdf`, then `name (1).pdf`, `name (2).pdf`, ...
    async fn free_path(&self, filename: &str) -> Result<PathBuf, RetrievalError> {
        let candidate = self.dir.join(filename);
        if !occupied(&candidate, filename).await? {
            return Ok(candidate);
        }

        let (stem, ext) = match filename.rfind('.') {
            Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
            _ => (filename, ""),
        };
        let mut n = 1u32;
        loop {
            let candidate = self.dir.join(format!("{} ({}){}", stem, n, ext));
            if !occupied(&candidate, filename).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

/// Whether something already sits at `path`
async fn occupied(path: &Path, filename: &str) -> Result<bool, RetrievalError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| RetrievalError::Save {
            filename: filename.to_string(),
            message: e.to_string(),
        })
}

/// Keep only the final path component and drop characters that are unsafe in
/// file names
fn sanitize(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "download".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl ResultSink for DirectorySink {
    async fn save(&self, data: Bytes, filename: &str) -> Result<String, RetrievalError> {
        let filename = sanitize(filename);
        let save_error = |e: std::io::Error| RetrievalError::Save {
            filename: filename.clone(),
            message: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(save_error)?;
        let path = self.free_path(&filename).await?;
        tokio::fs::write(&path, &data).await.map_err(save_error)?;

        tracing::info!("Saved {} bytes to {}", data.len(), path.display());
        Ok(path.display().to_string())
    }
}

/// Keeps results in memory
#[derive(Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(String, Bytes)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, oldest first
    pub fn saved(&self) -> Vec<(String, Bytes)> {
        self.saved.lock().clone()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn save(&self, data: Bytes, filename: &str) -> Result<String, RetrievalError> {
        self.saved.lock().push((filename.to_string(), data));
        Ok(filename.to_string())
    }
}
