//! `FsObjectStore` — a filesystem-backed [`ObjectStoreClient`] reference
//! adapter. Lists `.json` files under a local directory tree in sorted
//! order, paginated at a fixed page size; `get` reads the file's bytes.
//!
//! This is not a production object-store client — it exists to exercise the
//! coordinator and loader end to end in the CLI demo and in integration
//! tests, without depending on cloud SDKs or network access.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::capability::{ListPage, ObjectStoreClient};

/// Keys returned per [`ObjectStoreClient::list`] page.
const PAGE_SIZE: usize = 50;

pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn list_all_sorted(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        let base = self.root.join(prefix);
        let mut keys = Vec::new();
        if base.exists() {
            walk(&base, &self.root, &mut keys)?;
        }
        keys.sort();
        Ok(keys)
    }
}

fn walk(dir: &Path, root: &Path, keys: &mut Vec<String>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, root, keys)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            let relative = path.strip_prefix(root)?;
            keys.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}

#[async_trait]
impl ObjectStoreClient for FsObjectStore {
    async fn list(&self, prefix: &str, continuation: Option<String>) -> anyhow::Result<ListPage> {
        let all = self.list_all_sorted(prefix)?;
        let start = match continuation {
            Some(token) => token.parse::<usize>().unwrap_or(0),
            None => 0,
        };
        let end = (start + PAGE_SIZE).min(all.len());
        let keys = all[start..end].to_vec();
        let continuation = if end < all.len() {
            Some(end.to_string())
        } else {
            None
        };
        Ok(ListPage { keys, continuation })
    }

    async fn get(&self, key: &str) -> anyhow::Result<Bytes> {
        let path = self.root.join(key);
        let bytes = tokio::fs::read(&path).await?;
        Ok(Bytes::from(bytes))
    }
}
