//! Lazy enumeration of class files across sources.

use std::collections::VecDeque;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use archon_core::errors::LocateError;

use super::types::{is_archive_entry, is_class_entry, LocatedUnit, UnitSource};

/// Enumerate every class file in `sources`, recursing into archives.
pub fn locate(sources: &[UnitSource]) -> Locate {
    Locate::new(sources.to_vec())
}

/// Iterator returned by [`locate`]. Directories are walked lazily; each
/// archive is expanded when the walk reaches it.
pub struct Locate {
    sources: VecDeque<UnitSource>,
    walker: Option<walkdir::IntoIter>,
    buffered: VecDeque<Result<LocatedUnit, LocateError>>,
    exclude: Vec<glob::Pattern>,
}

impl Locate {
    fn new(sources: Vec<UnitSource>) -> Self {
        Self {
            sources: sources.into(),
            walker: None,
            buffered: VecDeque::new(),
            exclude: Vec::new(),
        }
    }

    /// Skip files and archive entries whose origin matches any pattern.
    pub fn with_exclude(mut self, patterns: Vec<glob::Pattern>) -> Self {
        self.exclude = patterns;
        self
    }

    fn excluded(&self, origin: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(origin))
    }

    fn read_file(path: &Path) -> Result<Vec<u8>, LocateError> {
        std::fs::read(path).map_err(|source| LocateError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Queue every class in an archive (and its nested archives).
    fn expand_archive(&mut self, origin: String, path: &Path, bytes: Vec<u8>) {
        let mut pending = vec![(origin, bytes)];
        while let Some((origin, bytes)) = pending.pop() {
            let mut archive = match zip::ZipArchive::new(Cursor::new(bytes)) {
                Ok(a) => a,
                Err(e) => {
                    self.buffered.push_back(Err(LocateError::Archive {
                        path: PathBuf::from(&origin),
                        message: e.to_string(),
                    }));
                    continue;
                }
            };
            let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
            names.sort();
            for name in names {
                let nested_origin = format!("{origin}!/{name}");
                let wanted = is_class_entry(&name) || is_archive_entry(&name);
                if !wanted || self.excluded(&nested_origin) {
                    continue;
                }
                let mut data = Vec::new();
                let read = archive
                    .by_name(&name)
                    .map_err(|e| e.to_string())
                    .and_then(|mut entry| entry.read_to_end(&mut data).map_err(|e| e.to_string()));
                if let Err(message) = read {
                    self.buffered.push_back(Err(LocateError::Archive {
                        path: path.to_path_buf(),
                        message: format!("{name}: {message}"),
                    }));
                    continue;
                }
                if is_class_entry(&name) {
                    self.buffered.push_back(Ok(LocatedUnit {
                        origin: nested_origin,
                        bytes: data.into(),
                    }));
                } else {
                    pending.push((nested_origin, data));
                }
            }
        }
    }

    fn next_from_walker(&mut self) -> Option<Option<Result<LocatedUnit, LocateError>>> {
        let walker = self.walker.as_mut()?;
        let entry = match walker.next() {
            None => {
                self.walker = None;
                return Some(None);
            }
            Some(Err(e)) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                return Some(Some(Err(LocateError::Io {
                    path,
                    source: e.into(),
                })));
            }
            Some(Ok(entry)) => entry,
        };
        if !entry.file_type().is_file() {
            return Some(None);
        }
        let path = entry.path();
        let origin = path.display().to_string();
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self.excluded(&origin) {
            return Some(None);
        }
        if is_class_entry(file_name) {
            return Some(Some(Self::read_file(path).map(|bytes| LocatedUnit {
                origin,
                bytes: bytes.into(),
            })));
        }
        if is_archive_entry(file_name) {
            let path = path.to_path_buf();
            match Self::read_file(&path) {
                Ok(bytes) => self.expand_archive(origin, &path, bytes),
                Err(e) => return Some(Some(Err(e))),
            }
        }
        Some(None)
    }
}

impl Iterator for Locate {
    type Item = Result<LocatedUnit, LocateError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Some(item);
            }
            if self.walker.is_some() {
                match self.next_from_walker() {
                    Some(Some(item)) => return Some(item),
                    _ => continue,
                }
            }
            match self.sources.pop_front()? {
                UnitSource::Directory(root) => {
                    tracing::debug!(root = %root.display(), "walking class directory");
                    self.walker = Some(
                        walkdir::WalkDir::new(root)
                            .sort_by_file_name()
                            .into_iter(),
                    );
                }
                UnitSource::Archive(path) => {
                    let origin = path.display().to_string();
                    match Self::read_file(&path) {
                        Ok(bytes) => self.expand_archive(origin, &path, bytes),
                        Err(e) => return Some(Err(e)),
                    }
                }
                UnitSource::Memory { origin, bytes } => {
                    if !self.excluded(&origin) {
                        return Some(Ok(LocatedUnit { origin, bytes }));
                    }
                }
            }
        }
    }
}
