use std::fs;

use skiff_core::{EntryId, EntryRef, Probe, VolumeProvider};
use skiff_transfer::{LocalVolume, deduplicate_path, walk};

fn volume() -> (tempfile::TempDir, LocalVolume) {
    let dir = tempfile::tempdir().unwrap();
    let volume = LocalVolume::new(dir.path(), "scratch");
    (dir, volume)
}

fn id_of(path: &std::path::Path) -> EntryId {
    EntryId::new(path.to_string_lossy().into_owned())
}

#[tokio::test]
async fn test_resolve_existing_and_missing() {
    let (dir, volume) = volume();
    let file = dir.path().join("a.txt");
    fs::write(&file, b"hello").unwrap();

    let entry = volume.resolve(&id_of(&file)).await.unwrap();
    assert!(entry.is_file());
    assert_eq!(entry.name, "a.txt");

    let missing = dir.path().join("gone.txt");
    let err = volume.resolve(&id_of(&missing)).await.unwrap_err();
    assert!(err.is_not_found());

    // Paths outside the volume root are not ours to answer for.
    assert!(volume.volume_of(&EntryId::new("/definitely/elsewhere")).is_none());
}

#[tokio::test]
async fn test_probe_against_real_directory() {
    let (dir, volume) = volume();
    fs::write(dir.path().join("taken.txt"), b"x").unwrap();
    let root = volume.root_dir();

    assert_eq!(volume.probe(&root, "taken.txt").await.unwrap(), Probe::Exists);
    assert_eq!(volume.probe(&root, "free.txt").await.unwrap(), Probe::Missing);
}

#[tokio::test]
async fn test_dedup_on_disk() {
    let (dir, volume) = volume();
    fs::write(dir.path().join("report.txt"), b"x").unwrap();
    fs::write(dir.path().join("report (1).txt"), b"x").unwrap();
    let root = volume.root_dir();

    let name = deduplicate_path(&volume, &root, "report.txt").await.unwrap();
    assert_eq!(name, "report (2).txt");
}

#[tokio::test]
async fn test_walk_real_tree() {
    let (dir, volume) = volume();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("a.txt"), b"x").unwrap();
    fs::write(dir.path().join("sub/b.txt"), b"x").unwrap();
    fs::create_dir(dir.path().join("sub/deeper")).unwrap();
    fs::write(dir.path().join("sub/deeper/c.txt"), b"x").unwrap();

    let root: EntryRef = volume.root_dir().into();
    let mut names = Vec::new();
    walk(&volume, &root, &mut |entry: &EntryRef| {
        names.push(entry.name.to_string());
        entry.name != "deeper"
    })
    .await
    .unwrap();

    assert!(names.contains(&"a.txt".to_string()));
    assert!(names.contains(&"b.txt".to_string()));
    assert!(names.contains(&"deeper".to_string()));
    // Pruned subtree.
    assert!(!names.contains(&"c.txt".to_string()));
}

#[tokio::test]
async fn test_listing_is_sorted_and_paged() {
    let (dir, volume) = volume();
    for name in ["zeta.txt", "alpha.txt", "mid.txt"] {
        fs::write(dir.path().join(name), b"x").unwrap();
    }

    let mut pager = volume.read_dir(&volume.root_dir()).await.unwrap();
    let page = pager.next_page().await.unwrap();
    let names: Vec<_> = page.iter().map(|e| e.name.to_string()).collect();
    assert_eq!(names, ["alpha.txt", "mid.txt", "zeta.txt"]);
    assert!(pager.next_page().await.unwrap().is_empty());
}
