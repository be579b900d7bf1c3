//! Batch resolution of opaque references into entries.

use futures::stream::{self, StreamExt};
use skiff_core::{EntryId, Resolution, VolumeProvider};

/// Resolve a batch of references, partitioning successes from failures.
///
/// Resolutions are issued concurrently up to `concurrency` at a time; both
/// output sequences preserve the input order regardless of completion
/// order. A reference that fails to resolve is recorded and the rest of
/// the batch continues: by the time a paste lands, some dragged files may
/// have been deleted or become temporarily unreachable, and those must not
/// sink the whole batch.
pub async fn resolve_all<P>(provider: &P, refs: &[EntryId], concurrency: usize) -> Resolution
where
    P: VolumeProvider + ?Sized,
{
    let outcomes: Vec<_> = stream::iter(refs.iter().cloned())
        .map(|id| async move {
            let result = provider.resolve(&id).await;
            (id, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut resolution = Resolution::default();
    for (id, result) in outcomes {
        match result {
            Ok(entry) => resolution.resolved.push(entry),
            Err(err) => {
                tracing::warn!(target: "transfer", "failed to resolve {}: {}", id, err);
                resolution.failed.push(id);
            }
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryVolume;

    #[tokio::test]
    async fn test_partition_preserves_order() {
        let fs = MemoryVolume::new();
        fs.add_volume("mem:/vol0", "vol0");
        let a = fs.touch("mem:/vol0/a.txt");
        fs.touch("mem:/vol0/b.txt");
        let c = fs.touch("mem:/vol0/c.txt");
        fs.remove("mem:/vol0/b.txt");

        let refs = vec![
            EntryId::from("mem:/vol0/a.txt"),
            EntryId::from("mem:/vol0/b.txt"),
            EntryId::from("mem:/vol0/c.txt"),
        ];
        let resolution = resolve_all(&fs, &refs, 4).await;

        assert_eq!(resolution.resolved, vec![a, c]);
        assert_eq!(resolution.failed, vec![EntryId::from("mem:/vol0/b.txt")]);
        assert!(!resolution.is_complete());
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let fs = MemoryVolume::new();
        fs.add_volume("mem:/vol0", "vol0");
        fs.touch("mem:/vol0/a.txt");

        let refs = vec![EntryId::from("mem:/vol0/a.txt")];
        let first = resolve_all(&fs, &refs, 1).await;
        let second = resolve_all(&fs, &refs, 1).await;

        assert_eq!(first.resolved[0].id, second.resolved[0].id);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped() {
        let fs = MemoryVolume::new();
        fs.add_volume("mem:/vol0", "vol0");
        fs.touch("mem:/vol0/a.txt");

        let refs = vec![EntryId::from("mem:/vol0/a.txt")];
        let resolution = resolve_all(&fs, &refs, 0).await;
        assert_eq!(resolution.resolved.len(), 1);
    }
}
