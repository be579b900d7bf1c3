//! Destination name deduplication.

use skiff_core::{DirectoryRef, Probe, TransferError, VolumeProvider};

/// How many occupied names are probed before giving up.
///
/// A safety valve against pathological collision chains, not an attempt at
/// perfect uniqueness.
const MAX_OCCUPIED_PROBES: usize = 10;

/// Find a name under `dir` that does not collide with an existing child.
///
/// Tries `proposed` first, then inserts a parenthesized counter before the
/// extension: `"file.txt"`, `"file (1).txt"`, `"file (2).txt"`, and so on.
/// A proposed name that already carries a counter resumes from it, so
/// `"file (3).txt"` continues with `"file (4).txt"`.
///
/// The result is advisory: nothing reserves the name, and another actor may
/// claim it between the probe and the caller's create. That window is
/// accepted; callers handle the residual collision like any other create
/// failure.
///
/// Fails with [`TransferError::AlreadyExists`] once ten probed names in a
/// row turn out to be occupied. Probe errors other than "not found"
/// propagate immediately.
pub async fn deduplicate_path<P>(
    provider: &P,
    dir: &DirectoryRef,
    proposed: &str,
) -> Result<String, TransferError>
where
    P: VolumeProvider + ?Sized,
{
    let (prefix, start, ext) = split_copy_suffix(proposed);
    let mut copy_number = start;
    let mut candidate = proposed.to_string();
    let mut occupied = 0;

    loop {
        match provider.probe(dir, &candidate).await? {
            Probe::Missing => return Ok(candidate),
            Probe::Exists => {
                occupied += 1;
                if occupied == MAX_OCCUPIED_PROBES {
                    tracing::warn!(
                        target: "transfer",
                        "gave up deduplicating {} after {} occupied names",
                        proposed,
                        occupied
                    );
                    return Err(TransferError::AlreadyExists {
                        name: proposed.to_string(),
                    });
                }
                copy_number += 1;
                candidate = format!("{prefix} ({copy_number}){ext}");
            }
        }
    }
}

/// Crack a name into `(prefix, copy number, extension)`.
///
/// The extension starts at the last dot, so `"a.tar.gz"` splits as
/// `("a.tar", 0, ".gz")`. A parenthesized integer immediately before the
/// extension is the copy number; anything else stays part of the prefix.
fn split_copy_suffix(name: &str) -> (&str, u64, &str) {
    let (stem, ext) = match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    };

    if let Some(open) = stem.rfind(" (") {
        if let Some(digits) = stem[open + 2..].strip_suffix(')') {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(n) = digits.parse::<u64>() {
                    return (&stem[..open], n, ext);
                }
            }
        }
    }

    (stem, 0, ext)
}
