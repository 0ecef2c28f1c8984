//! Source and result types for unit location.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where compiled units come from.
#[derive(Debug, Clone)]
pub enum UnitSource {
    /// A directory tree of `.class` files (and archives inside it).
    Directory(PathBuf),
    /// A `.jar` or `.zip` archive, possibly containing nested archives.
    Archive(PathBuf),
    /// A single class file already in memory.
    Memory { origin: String, bytes: Arc<[u8]> },
}

impl UnitSource {
    /// Classify a path as a directory or an archive.
    pub fn path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.is_dir() {
            Self::Directory(path.to_path_buf())
        } else {
            Self::Archive(path.to_path_buf())
        }
    }

    pub fn memory(origin: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Memory {
            origin: origin.into(),
            bytes: bytes.into(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Directory(p) | Self::Archive(p) => p.display().to_string(),
            Self::Memory { origin, .. } => origin.clone(),
        }
    }
}

/// One class file found by the locator.
#[derive(Debug, Clone)]
pub struct LocatedUnit {
    /// Human-readable origin: a file path, or `archive.jar!/com/Foo.class`
    /// with one `!/` per nesting level.
    pub origin: String,
    pub bytes: Arc<[u8]>,
}

/// Whether an entry name is a class file worth decoding.
pub(crate) fn is_class_entry(name: &str) -> bool {
    name.ends_with(".class") && !name.ends_with("module-info.class")
}

/// Whether an entry name is an archive that should be recursed into.
pub(crate) fn is_archive_entry(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".jar") || lower.ends_with(".zip")
}

/// Archive entry name for a dotted unit name.
pub fn entry_name(unit_name: &str) -> String {
    format!("{}.class", unit_name.replace('.', "/"))
}
