use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

use crate::error::{RouteError, Result};

const MANIFEST_GLOB: &str = "*.{yaml,yml}";

/// Flat directory of manifest files.
#[derive(Debug, Clone)]
pub struct LibraryFs {
    root: PathBuf,
}

impl LibraryFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Manifest files directly under the root, sorted by file name.
    /// Subdirectories and other files are skipped.
    pub fn list_manifest_files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(RouteError::NotFound(format!(
                "library path does not exist: {}",
                self.root.display()
            )));
        }

        let matcher = manifest_matcher()?;
        let mut files = Vec::new();
        for item in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let item = match item {
                Ok(item) => item,
                Err(err) if err.depth() == 0 => {
                    return Err(RouteError::Validation(err.to_string()));
                }
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable library entry");
                    continue;
                }
            };
            if item.file_type().is_file() && matcher.is_match(item.file_name()) {
                files.push(item.into_path());
            }
        }
        Ok(files)
    }
}

pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(RouteError::NotFound(path.display().to_string()));
    }
    if path.is_dir() {
        return Err(RouteError::Validation(format!(
            "cannot read directory: {}",
            path.display()
        )));
    }
    Ok(fs::read_to_string(path)?)
}

/// Writes through a sibling temp file and renames it over `path`.
///
/// Symlinks are resolved first so the link survives and its target is the
/// file that changes. An existing file keeps its permissions; a read-only
/// one is refused.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let (target, permissions) = match fs::canonicalize(path) {
        Ok(target) => {
            let permissions = fs::metadata(&target)?.permissions();
            if permissions.readonly() {
                return Err(RouteError::Io(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("file is read-only: {}", target.display()),
                )));
            }
            (target, Some(permissions))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => (path.to_path_buf(), None),
        Err(err) => return Err(err.into()),
    };

    let parent = target
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = target
        .file_name()
        .and_then(|x| x.to_str())
        .ok_or_else(|| {
            RouteError::Validation(format!("invalid target filename: {}", path.display()))
        })?;
    let tmp_path = parent.join(format!(
        ".{file_name}.routebook.tmp.{}",
        uuid::Uuid::new_v4().simple()
    ));

    let mut tmp = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&tmp_path)?;
    let written = tmp
        .write_all(content.as_bytes())
        .and_then(|()| tmp.sync_all())
        .and_then(|()| match permissions {
            Some(permissions) => fs::set_permissions(&tmp_path, permissions),
            None => Ok(()),
        });
    drop(tmp);

    if let Err(err) = written.and_then(|()| fs::rename(&tmp_path, &target)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(RouteError::from(err));
    }

    if let Ok(dir) = fs::File::open(parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}

fn manifest_matcher() -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(MANIFEST_GLOB)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map_err(|e| RouteError::Validation(e.to_string()))?;
    Ok(glob.compile_matcher())
}
