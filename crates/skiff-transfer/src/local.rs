//! Local filesystem volume provider.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use compact_str::CompactString;
use skiff_core::{
    ConnectionState, DirectoryPager, DirectoryRef, EntryId, EntryRef, Probe, TransferError,
    VolumeProvider, VolumeRoot,
};

/// Entries returned per listing page.
const PAGE_SIZE: usize = 64;

/// A [`VolumeProvider`] over a directory tree on the local filesystem.
///
/// Entry ids are absolute path strings under the volume root. The volume
/// is always online and local content is always available, so it never
/// constrains cross-volume transfers on the source side. Filesystem calls
/// run on the blocking pool.
#[derive(Debug, Clone)]
pub struct LocalVolume {
    root: PathBuf,
    label: CompactString,
}

impl LocalVolume {
    /// Create a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, label: impl Into<CompactString>) -> Self {
        Self {
            root: root.into(),
            label: label.into(),
        }
    }

    /// The root directory as a transfer destination.
    pub fn root_dir(&self) -> DirectoryRef {
        DirectoryRef::new(self.root.to_string_lossy().into_owned(), self.label.clone())
    }

    fn path_of(&self, id: &EntryId) -> Result<PathBuf, TransferError> {
        let path = PathBuf::from(id.as_str());
        if path.starts_with(&self.root) {
            Ok(path)
        } else {
            Err(TransferError::NotFound { id: id.clone() })
        }
    }

    fn entry_at(path: &Path, is_dir: bool) -> EntryRef {
        let id = path.to_string_lossy().into_owned();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| id.clone());
        if is_dir {
            EntryRef::directory(id, name)
        } else {
            EntryRef::file(id, name)
        }
    }
}

async fn blocking<T, F>(f: F) -> Result<T, TransferError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, TransferError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TransferError::Other {
            message: format!("blocking task failed: {e}"),
        })?
}

struct LocalPager {
    pages: Vec<Vec<EntryRef>>,
    next: usize,
}

#[async_trait]
impl DirectoryPager for LocalPager {
    async fn next_page(&mut self) -> Result<Vec<EntryRef>, TransferError> {
        let page = self.pages.get(self.next).cloned().unwrap_or_default();
        self.next += 1;
        Ok(page)
    }
}

#[async_trait]
impl VolumeProvider for LocalVolume {
    async fn resolve(&self, id: &EntryId) -> Result<EntryRef, TransferError> {
        let path = self.path_of(id)?;
        let id = id.clone();
        blocking(move || {
            let meta = fs::metadata(&path).map_err(|e| TransferError::io(id, e))?;
            Ok(LocalVolume::entry_at(&path, meta.is_dir()))
        })
        .await
    }

    async fn probe(&self, dir: &DirectoryRef, name: &str) -> Result<Probe, TransferError> {
        let candidate = self.path_of(dir.id())?.join(name);
        let id = dir.id().clone();
        blocking(move || match fs::symlink_metadata(&candidate) {
            Ok(_) => Ok(Probe::Exists),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Probe::Missing),
            Err(e) => Err(TransferError::io(id, e)),
        })
        .await
    }

    async fn read_dir(
        &self,
        dir: &DirectoryRef,
    ) -> Result<Box<dyn DirectoryPager>, TransferError> {
        let path = self.path_of(dir.id())?;
        let id = dir.id().clone();
        let entries = blocking(move || {
            let mut entries = Vec::new();
            let reader =
                fs::read_dir(&path).map_err(|e| TransferError::listing(id.clone(), e.to_string()))?;
            for item in reader {
                let item = item.map_err(|e| TransferError::listing(id.clone(), e.to_string()))?;
                let is_dir = item.file_type().is_ok_and(|t| t.is_dir());
                entries.push(LocalVolume::entry_at(&item.path(), is_dir));
            }
            // Directory iteration order is platform-dependent; keep the
            // listing stable for callers.
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(entries)
        })
        .await?;

        let pages = entries
            .chunks(PAGE_SIZE)
            .map(|chunk| chunk.to_vec())
            .collect();
        Ok(Box::new(LocalPager { pages, next: 0 }))
    }

    async fn is_read_only(&self, dir: &DirectoryRef) -> Result<bool, TransferError> {
        let path = self.path_of(dir.id())?;
        let id = dir.id().clone();
        blocking(move || {
            let meta = fs::metadata(&path).map_err(|e| TransferError::io(id, e))?;
            Ok(meta.permissions().readonly())
        })
        .await
    }

    async fn is_content_available(&self, _entry: &EntryRef) -> Result<bool, TransferError> {
        Ok(true)
    }

    fn volume_of(&self, id: &EntryId) -> Option<VolumeRoot> {
        let path = PathBuf::from(id.as_str());
        path.starts_with(&self.root).then(|| {
            VolumeRoot::new(self.root.to_string_lossy().into_owned(), self.label.clone())
        })
    }

    fn connection(&self, _volume: &VolumeRoot) -> ConnectionState {
        ConnectionState::Online
    }
}
