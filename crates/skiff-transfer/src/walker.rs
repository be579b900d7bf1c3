//! Asynchronous pre-order directory traversal.

use futures::FutureExt;
use futures::future::BoxFuture;
use skiff_core::{DirectoryRef, EntryRef, TransferError, VolumeProvider};

/// Walk a directory tree in pre-order, invoking `visit` for every entry.
///
/// Returning `false` from `visit` skips that entry's children; its siblings
/// (and their children) are still traversed. Children are consumed from the
/// provider's paginated listing until a page comes back empty, recursing
/// into accepted directories as each page arrives.
///
/// Fail-fast: the first listing error aborts the whole walk and is returned
/// to the caller. Entries already visited are not rolled back; traversal
/// has no transactional semantics.
pub async fn walk<P>(
    provider: &P,
    root: &EntryRef,
    visit: &mut (dyn FnMut(&EntryRef) -> bool + Send),
) -> Result<(), TransferError>
where
    P: VolumeProvider + ?Sized,
{
    walk_entry(provider, root, visit).await
}

fn walk_entry<'a, P>(
    provider: &'a P,
    entry: &'a EntryRef,
    visit: &'a mut (dyn FnMut(&EntryRef) -> bool + Send),
) -> BoxFuture<'a, Result<(), TransferError>>
where
    P: VolumeProvider + ?Sized,
{
    async move {
        if !visit(entry) {
            return Ok(());
        }
        if !entry.is_directory() {
            return Ok(());
        }

        let dir = DirectoryRef::try_from(entry.clone())?;
        let mut pager = provider.read_dir(&dir).await?;
        loop {
            let page = pager.next_page().await?;
            if page.is_empty() {
                return Ok(());
            }
            for child in &page {
                walk_entry(provider, child, &mut *visit).await?;
            }
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryVolume;

    fn sample_tree(fs: &MemoryVolume) -> EntryRef {
        fs.add_volume("mem:/vol0", "vol0");
        let root = fs.mkdir("mem:/vol0/root");
        fs.touch("mem:/vol0/root/a.txt");
        fs.mkdir("mem:/vol0/root/sub");
        fs.touch("mem:/vol0/root/sub/b.txt");
        fs.mkdir("mem:/vol0/root/skipped");
        fs.touch("mem:/vol0/root/skipped/hidden.txt");
        root.into()
    }

    #[tokio::test]
    async fn test_preorder_visit() {
        let fs = MemoryVolume::new();
        let root = sample_tree(&fs);

        let mut seen = Vec::new();
        walk(&fs, &root, &mut |entry: &EntryRef| {
            seen.push(entry.name.to_string());
            true
        })
        .await
        .unwrap();

        assert_eq!(seen, ["root", "a.txt", "sub", "b.txt", "skipped", "hidden.txt"]);
    }

    #[tokio::test]
    async fn test_visit_false_prunes_children_not_siblings() {
        let fs = MemoryVolume::new();
        let root = sample_tree(&fs);

        let mut seen = Vec::new();
        walk(&fs, &root, &mut |entry: &EntryRef| {
            seen.push(entry.name.to_string());
            entry.name != "skipped"
        })
        .await
        .unwrap();

        // "skipped" itself is visited; its children are not.
        assert!(seen.contains(&"skipped".to_string()));
        assert!(!seen.contains(&"hidden.txt".to_string()));
        assert!(seen.contains(&"b.txt".to_string()));
    }

    #[tokio::test]
    async fn test_small_pages_are_drained() {
        let fs = MemoryVolume::new();
        fs.set_page_size(1);
        let root = sample_tree(&fs);

        let mut count = 0usize;
        walk(&fs, &root, &mut |_: &EntryRef| {
            count += 1;
            true
        })
        .await
        .unwrap();

        assert_eq!(count, 6);
    }

    #[tokio::test]
    async fn test_listing_error_aborts_walk() {
        let fs = MemoryVolume::new();
        let root = sample_tree(&fs);
        fs.fail_listing("mem:/vol0/root/sub");

        let mut seen = Vec::new();
        let err = walk(&fs, &root, &mut |entry: &EntryRef| {
            seen.push(entry.name.to_string());
            true
        })
        .await
        .unwrap_err();

        assert!(matches!(err, TransferError::ListingFailure { .. }));
        // Entries visited before the failure stay visited; nothing after
        // the failing branch is reached.
        assert!(seen.contains(&"sub".to_string()));
        assert!(!seen.contains(&"skipped".to_string()));
    }
}
