use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

fn traversal(path: &Path, reason: &'static str) -> StorageError {
    StorageError::PathTraversalAttempt {
        message: path.display().to_string().into(),
        context: Some(reason.into()),
    }
}

/// Folds `.` and `..` lexically; `..` may never climb above the relative base.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir if out.pop() => {},
            Component::ParentDir => return Err(traversal(path, "'..' climbs above the root")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(traversal(path, "absolute paths are not allowed"));
            },
        }
    }

    Ok(out)
}

/// Joins `path` onto `root` and proves the result stays inside `root`.
///
/// `root` must already be canonical.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let relative = normalize_relative(path.as_ref())?;
    let joined = root.join(relative);

    match joined.canonicalize() {
        Ok(canonical) if canonical.starts_with(root) => Ok(canonical),
        Ok(canonical) => Err(traversal(&canonical, "resolves outside the root")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => check_ancestors(root, joined),
        Err(e) => Err(StorageError::Io {
            source: e,
            context: Some(format!("Failed to resolve {}", joined.display()).into()),
        }),
    }
}

/// For a path that does not exist yet, canonicalizes its nearest existing ancestor so a
/// symlinked directory cannot smuggle the eventual file outside the root.
fn check_ancestors(root: &Path, joined: PathBuf) -> Result<PathBuf, StorageError> {
    for ancestor in joined.ancestors() {
        if ancestor == root {
            return Ok(joined);
        }
        if !ancestor.exists() {
            continue;
        }
        return match ancestor.canonicalize() {
            Ok(canonical) if canonical.starts_with(root) => Ok(joined),
            Ok(_) => Err(traversal(ancestor, "existing parent links outside the root")),
            Err(e) => Err(StorageError::Io {
                source: e,
                context: Some(format!("Failed to inspect {}", ancestor.display()).into()),
            }),
        };
    }

    Err(traversal(&joined, "no ancestor inside the root"))
}
