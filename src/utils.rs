//! Utility functions for file operations and path manipulation

use crate::config::FileCollisionAction;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Get a unique path for a file, handling collisions according to the specified action
///
/// For Rename, `parts.csv` becomes `parts (1).csv`, then `parts (2).csv`, and
/// so on. Overwrite returns the path unchanged. Skip fails when the file exists.
///
/// # Examples
///
/// ```
/// use catalog_export::utils::get_unique_path;
/// use catalog_export::config::FileCollisionAction;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/parts-export.csv");
/// let unique = get_unique_path(path, FileCollisionAction::Overwrite).unwrap();
/// assert_eq!(unique, path);
/// ```
pub fn get_unique_path(path: &Path, action: FileCollisionAction) -> Result<PathBuf> {
    match action {
        FileCollisionAction::Overwrite => Ok(path.to_path_buf()),
        FileCollisionAction::Skip => {
            if path.exists() {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!(
                        "{} already exists and collision action is skip",
                        path.display()
                    ),
                )));
            }
            Ok(path.to_path_buf())
        }
        FileCollisionAction::Rename => {
            if !path.exists() {
                return Ok(path.to_path_buf());
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
                Error::InvalidInput(format!("cannot extract file stem of {}", path.display()))
            })?;
            let extension = path.extension().and_then(|e| e.to_str());
            let parent = path.parent().ok_or_else(|| {
                Error::InvalidInput(format!("{} has no parent directory", path.display()))
            })?;

            for i in 1..=MAX_RENAME_ATTEMPTS {
                let new_name = match extension {
                    Some(ext) => format!("{} ({}).{}", stem, i, ext),
                    None => format!("{} ({})", stem, i),
                };
                let new_path = parent.join(new_name);
                if !new_path.exists() {
                    return Ok(new_path);
                }
            }

            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!(
                    "no free name for {} after {} attempts",
                    path.display(),
                    MAX_RENAME_ATTEMPTS
                ),
            )))
        }
    }
}
