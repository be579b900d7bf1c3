//! In-memory volume provider.
//!
//! A deterministic [`VolumeProvider`] holding any number of volumes with
//! controllable connection state, per-entry read-only and availability
//! flags, and fault injection for resolution and listing. Used by the
//! engine's tests and useful for headless embedding.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use skiff_core::{
    ConnectionState, DirectoryPager, DirectoryRef, EntryId, EntryKind, EntryRef, Probe,
    TransferError, VolumeProvider, VolumeRoot,
};

/// Default number of entries per listing page.
const DEFAULT_PAGE_SIZE: usize = 64;

#[derive(Debug, Clone)]
struct MemEntry {
    entry: EntryRef,
    children: Vec<EntryId>,
    read_only: bool,
    available: bool,
    fail_listing: bool,
    fail_probe: bool,
}

impl MemEntry {
    fn new(entry: EntryRef) -> Self {
        Self {
            entry,
            children: Vec::new(),
            read_only: false,
            available: true,
            fail_listing: false,
            fail_probe: false,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    volumes: Vec<(VolumeRoot, ConnectionState)>,
    entries: HashMap<EntryId, MemEntry>,
    page_size: usize,
}

/// In-memory filesystem spanning one or more volumes.
///
/// Entry ids are path-shaped strings (`"mem:/vol/dir/file.txt"`); names are
/// derived from the last segment. Cloning shares the underlying store.
#[derive(Debug, Clone)]
pub struct MemoryVolume {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryVolume {
    /// Create an empty store with no volumes.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                volumes: Vec::new(),
                entries: HashMap::new(),
                page_size: DEFAULT_PAGE_SIZE,
            })),
        }
    }

    /// Set the number of entries returned per listing page.
    pub fn set_page_size(&self, page_size: usize) {
        self.inner.lock().unwrap().page_size = page_size.max(1);
    }

    /// Register a volume and create its root directory.
    pub fn add_volume(&self, root: &str, label: &str) -> VolumeRoot {
        let volume = VolumeRoot::new(root, label);
        let mut inner = self.inner.lock().unwrap();
        inner.volumes.push((volume.clone(), ConnectionState::Online));
        inner
            .entries
            .insert(EntryId::from(root), MemEntry::new(EntryRef::directory(root, label)));
        volume
    }

    /// Set a volume's connection state.
    pub fn set_connection(&self, volume: &VolumeRoot, state: ConnectionState) {
        let mut inner = self.inner.lock().unwrap();
        for (existing, connection) in &mut inner.volumes {
            if existing == volume {
                *connection = state;
            }
        }
    }

    /// Create a directory, attaching it to its parent.
    pub fn mkdir(&self, id: &str) -> DirectoryRef {
        let entry = self.insert(id, EntryKind::Directory);
        DirectoryRef::new(entry.id.clone(), entry.name.clone())
    }

    /// Create a file, attaching it to its parent.
    pub fn touch(&self, id: &str) -> EntryRef {
        self.insert(id, EntryKind::File)
    }

    /// Delete an entry, making future resolution of it fail.
    pub fn remove(&self, id: &str) {
        let id = EntryId::from(id);
        let mut inner = self.inner.lock().unwrap();
        inner.entries.remove(&id);
        if let Some(parent) = parent_id(&id) {
            if let Some(parent_entry) = inner.entries.get_mut(&parent) {
                parent_entry.children.retain(|child| *child != id);
            }
        }
    }

    /// Mark a directory as read-only.
    pub fn set_read_only(&self, id: &str, read_only: bool) {
        self.with_entry(id, |e| e.read_only = read_only);
    }

    /// Mark a file's content as (un)available without a network fetch.
    pub fn set_available(&self, id: &str, available: bool) {
        self.with_entry(id, |e| e.available = available);
    }

    /// Make listing this directory fail on the first page.
    pub fn fail_listing(&self, id: &str) {
        self.with_entry(id, |e| e.fail_listing = true);
    }

    /// Make name probes against this directory fail.
    pub fn fail_probe(&self, id: &str) {
        self.with_entry(id, |e| e.fail_probe = true);
    }

    fn with_entry(&self, id: &str, f: impl FnOnce(&mut MemEntry)) {
        let id = EntryId::from(id);
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.entries.get_mut(&id) {
            f(entry);
        }
    }

    fn insert(&self, id: &str, kind: EntryKind) -> EntryRef {
        let id = EntryId::from(id);
        let name = id.display_name();
        let entry = match kind {
            EntryKind::File => EntryRef::file(id.clone(), name),
            EntryKind::Directory => EntryRef::directory(id.clone(), name),
        };
        let mut inner = self.inner.lock().unwrap();
        // Re-creating an existing entry keeps its children and flags.
        if let Some(existing) = inner.entries.get(&id) {
            if existing.entry.kind == kind {
                return existing.entry.clone();
            }
        }
        inner.entries.insert(id.clone(), MemEntry::new(entry.clone()));
        if let Some(parent) = parent_id(&id) {
            if let Some(parent_entry) = inner.entries.get_mut(&parent) {
                if !parent_entry.children.contains(&id) {
                    parent_entry.children.push(id);
                }
            }
        }
        entry
    }
}

impl Default for MemoryVolume {
    fn default() -> Self {
        Self::new()
    }
}

fn parent_id(id: &EntryId) -> Option<EntryId> {
    let raw = id.as_str().trim_end_matches('/');
    let idx = raw.rfind('/')?;
    if idx == 0 {
        return None;
    }
    Some(EntryId::from(&raw[..idx]))
}

struct MemoryPager {
    pages: Vec<Vec<EntryRef>>,
    next: usize,
    fail_at: Option<EntryId>,
}

#[async_trait]
impl DirectoryPager for MemoryPager {
    async fn next_page(&mut self) -> Result<Vec<EntryRef>, TransferError> {
        if let Some(id) = self.fail_at.take() {
            return Err(TransferError::listing(id, "injected listing failure"));
        }
        let page = self.pages.get(self.next).cloned().unwrap_or_default();
        self.next += 1;
        Ok(page)
    }
}

#[async_trait]
impl VolumeProvider for MemoryVolume {
    async fn resolve(&self, id: &EntryId) -> Result<EntryRef, TransferError> {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .get(id)
            .map(|e| e.entry.clone())
            .ok_or_else(|| TransferError::NotFound { id: id.clone() })
    }

    async fn probe(&self, dir: &DirectoryRef, name: &str) -> Result<Probe, TransferError> {
        let inner = self.inner.lock().unwrap();
        let dir_entry = inner
            .entries
            .get(dir.id())
            .ok_or_else(|| TransferError::NotFound { id: dir.id().clone() })?;
        if dir_entry.fail_probe {
            return Err(TransferError::io(
                dir.id().clone(),
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "probe failed"),
            ));
        }
        let exists = dir_entry.children.iter().any(|child| {
            inner
                .entries
                .get(child)
                .is_some_and(|c| c.entry.name == name)
        });
        Ok(if exists { Probe::Exists } else { Probe::Missing })
    }

    async fn read_dir(
        &self,
        dir: &DirectoryRef,
    ) -> Result<Box<dyn DirectoryPager>, TransferError> {
        let inner = self.inner.lock().unwrap();
        let dir_entry = inner
            .entries
            .get(dir.id())
            .ok_or_else(|| TransferError::NotFound { id: dir.id().clone() })?;
        let children: Vec<EntryRef> = dir_entry
            .children
            .iter()
            .filter_map(|child| inner.entries.get(child).map(|c| c.entry.clone()))
            .collect();
        let pages = children
            .chunks(inner.page_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        Ok(Box::new(MemoryPager {
            pages,
            next: 0,
            fail_at: dir_entry.fail_listing.then(|| dir.id().clone()),
        }))
    }

    async fn is_read_only(&self, dir: &DirectoryRef) -> Result<bool, TransferError> {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .get(dir.id())
            .map(|e| e.read_only)
            .ok_or_else(|| TransferError::NotFound { id: dir.id().clone() })
    }

    async fn is_content_available(&self, entry: &EntryRef) -> Result<bool, TransferError> {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .get(&entry.id)
            .map(|e| e.available)
            .ok_or_else(|| TransferError::NotFound { id: entry.id.clone() })
    }

    fn volume_of(&self, id: &EntryId) -> Option<VolumeRoot> {
        let inner = self.inner.lock().unwrap();
        inner
            .volumes
            .iter()
            .filter(|(volume, _)| {
                let root = volume.root.as_str();
                id.as_str() == root || id.as_str().starts_with(&format!("{root}/"))
            })
            .max_by_key(|(volume, _)| volume.root.as_str().len())
            .map(|(volume, _)| volume.clone())
    }

    fn connection(&self, volume: &VolumeRoot) -> ConnectionState {
        let inner = self.inner.lock().unwrap();
        inner
            .volumes
            .iter()
            .find(|(existing, _)| existing == volume)
            .map(|(_, state)| *state)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_and_remove() {
        let fs = MemoryVolume::new();
        fs.add_volume("mem:/vol0", "vol0");
        let file = fs.touch("mem:/vol0/a.txt");

        let resolved = fs.resolve(&file.id).await.unwrap();
        assert_eq!(resolved, file);

        fs.remove("mem:/vol0/a.txt");
        assert!(fs.resolve(&file.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_probe_sees_children() {
        let fs = MemoryVolume::new();
        fs.add_volume("mem:/vol0", "vol0");
        let docs = fs.mkdir("mem:/vol0/docs");
        fs.touch("mem:/vol0/docs/a.txt");

        assert_eq!(fs.probe(&docs, "a.txt").await.unwrap(), Probe::Exists);
        assert_eq!(fs.probe(&docs, "b.txt").await.unwrap(), Probe::Missing);
    }

    #[tokio::test]
    async fn test_listing_pages() {
        let fs = MemoryVolume::new();
        fs.set_page_size(2);
        fs.add_volume("mem:/vol0", "vol0");
        let docs = fs.mkdir("mem:/vol0/docs");
        for name in ["a", "b", "c"] {
            fs.touch(&format!("mem:/vol0/docs/{name}"));
        }

        let mut pager = fs.read_dir(&docs).await.unwrap();
        assert_eq!(pager.next_page().await.unwrap().len(), 2);
        assert_eq!(pager.next_page().await.unwrap().len(), 1);
        assert!(pager.next_page().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_volume_of_longest_root_wins() {
        let fs = MemoryVolume::new();
        let outer = fs.add_volume("mem:/vol0", "outer");
        let nested = fs.add_volume("mem:/vol0/mounted", "nested");

        let id = EntryId::from("mem:/vol0/mounted/file.txt");
        assert_eq!(fs.volume_of(&id), Some(nested));
        let id = EntryId::from("mem:/vol0/file.txt");
        assert_eq!(fs.volume_of(&id), Some(outer));
        assert_eq!(fs.volume_of(&EntryId::from("mem:/elsewhere")), None);
    }
}
