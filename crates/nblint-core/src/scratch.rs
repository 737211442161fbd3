//! Scratch files handed to the external tools.
//!
//! Every open document is mirrored to one file in the scratch directory.
//! File names are derived deterministically from the URI, so repeated edits
//! overwrite the same file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Prefix of every scratch file name.
pub const SCRATCH_PREFIX: &str = ".temp_";

/// Replace the scheme and path separator characters of a URI with `_`.
pub fn sanitize_uri(uri: &str) -> String {
    uri.replace([':', '/', '\\'], "_")
}

/// Scratch file name for a URI.
///
/// The CRC-32 of the raw URI keeps URIs that differ only in separator style
/// apart. The sanitized URI comes last so the file keeps its extension.
pub fn scratch_file_name(uri: &str) -> String {
    format!(
        "{SCRATCH_PREFIX}{:08x}_{}",
        crc32fast::hash(uri.as_bytes()),
        sanitize_uri(uri)
    )
}

/// The cache directory and the scratch directory inside it.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    cache_dir: PathBuf,
    scratch_dir: PathBuf,
}

impl ScratchSpace {
    pub fn new(config: &Config) -> Self {
        Self {
            cache_dir: config.cache_dir.clone(),
            scratch_dir: config.scratch_dir(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the scratch file for a URI.
    pub fn path_for(&self, uri: &str) -> PathBuf {
        self.scratch_dir.join(scratch_file_name(uri))
    }

    /// Create the directories and a `.gitignore` that hides the cache
    /// directory from version control.
    pub fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(&self.scratch_dir)?;
        fs::write(self.cache_dir.join(".gitignore"), "*")?;
        tracing::debug!(dir = %self.cache_dir.display(), "created cache directory");
        Ok(())
    }

    /// Write a document's text to its scratch file, creating the scratch
    /// directory if needed.
    pub fn write(&self, uri: &str, text: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.scratch_dir)?;
        let path = self.path_for(uri);
        fs::write(&path, text)?;
        Ok(path)
    }

    /// Delete a document's scratch file.
    pub fn remove(&self, uri: &str) -> io::Result<()> {
        fs::remove_file(self.path_for(uri))
    }

    /// Delete the scratch files of `uris`, then the whole cache directory.
    ///
    /// Failures are logged and do not stop the cleanup.
    pub fn cleanup<'a>(&self, uris: impl IntoIterator<Item = &'a str>) {
        for uri in uris {
            if let Err(err) = self.remove(uri) {
                tracing::warn!(%uri, %err, "could not clean up scratch file");
            }
        }
        match fs::remove_dir_all(&self.cache_dir) {
            Ok(()) => tracing::info!(dir = %self.cache_dir.display(), "deleted cache directory"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(dir = %self.cache_dir.display(), %err, "could not delete cache directory")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space_in(dir: &Path) -> ScratchSpace {
        ScratchSpace::new(&Config {
            cache_dir: dir.join("cache"),
            ..Config::default()
        })
    }

    #[test]
    fn sanitizes_scheme_and_separators() {
        assert_eq!(sanitize_uri("file:///a/b\\c.py"), "file____a_b_c.py");
    }

    #[test]
    fn file_name_keeps_prefix_and_extension() {
        let name = scratch_file_name("file:///home/me/nb.py");
        assert!(name.starts_with(SCRATCH_PREFIX));
        assert!(name.ends_with("_file____home_me_nb.py"));
    }

    #[test]
    fn separator_style_does_not_collide() {
        let unix = scratch_file_name("file:///c/work/nb.py");
        let windows = scratch_file_name("file:///c\\work\\nb.py");
        assert_eq!(sanitize_uri("file:///c/work/nb.py"), sanitize_uri("file:///c\\work\\nb.py"));
        assert_ne!(unix, windows);
    }

    #[test]
    fn names_are_deterministic() {
        assert_eq!(
            scratch_file_name("file:///nb.py"),
            scratch_file_name("file:///nb.py")
        );
    }

    #[test]
    fn write_overwrites_and_cleanup_removes_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let space = space_in(tmp.path());
        space.ensure().unwrap();
        assert_eq!(
            fs::read_to_string(space.cache_dir().join(".gitignore")).unwrap(),
            "*"
        );

        let first = space.write("file:///nb.py", "one").unwrap();
        let second = space.write("file:///nb.py", "two").unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second).unwrap(), "two");

        space.cleanup(["file:///nb.py", "file:///never-written.py"]);
        assert!(!space.cache_dir().exists());
    }
}
