//! Filesystem entry references.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::TransferError;

/// Opaque stable identifier for a filesystem object, typically a URL string.
///
/// Two references denote the same object exactly when their ids are equal;
/// names are display data and never participate in identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    /// Create a new EntryId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover a human-readable name from the identifier.
    ///
    /// Used when an entry could not be resolved and only its reference is
    /// left to report. Takes the last path segment of the URL, falling back
    /// to the substring after the last slash for non-URL identifiers.
    pub fn display_name(&self) -> String {
        if let Ok(parsed) = url::Url::parse(&self.0) {
            if let Some(segments) = parsed.path_segments() {
                if let Some(last) = segments.filter(|s| !s.is_empty()).next_back() {
                    return last.to_string();
                }
            }
        }
        self.0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.0)
            .to_string()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Type of filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// A reference to a concrete filesystem object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRef {
    /// Stable identifier, unique within one filesystem root.
    pub id: EntryId,
    /// Entry name (not a full path).
    pub name: CompactString,
    /// Entry type.
    pub kind: EntryKind,
}

impl EntryRef {
    /// Create a file reference.
    pub fn file(id: impl Into<EntryId>, name: impl Into<CompactString>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    /// Create a directory reference.
    pub fn directory(id: impl Into<EntryId>, name: impl Into<CompactString>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }

    /// Check if this entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Check if this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

impl PartialEq for EntryRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntryRef {}

/// An entry reference known to denote a directory.
///
/// Transfer destinations and traversal roots require directories; wrapping
/// the check in a type keeps it out of every call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRef(EntryRef);

impl DirectoryRef {
    /// Create a directory reference directly from an id and name.
    pub fn new(id: impl Into<EntryId>, name: impl Into<CompactString>) -> Self {
        Self(EntryRef::directory(id, name))
    }

    /// The underlying entry reference.
    pub fn entry(&self) -> &EntryRef {
        &self.0
    }

    /// The directory's identifier.
    pub fn id(&self) -> &EntryId {
        &self.0.id
    }

    /// The directory's name.
    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl TryFrom<EntryRef> for DirectoryRef {
    type Error = TransferError;

    fn try_from(entry: EntryRef) -> Result<Self, Self::Error> {
        if entry.is_directory() {
            Ok(Self(entry))
        } else {
            Err(TransferError::NotADirectory { id: entry.id })
        }
    }
}

impl From<DirectoryRef> for EntryRef {
    fn from(dir: DirectoryRef) -> Self {
        dir.0
    }
}
