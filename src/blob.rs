use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Filesystem-backed storage for raw upload bytes, addressed by sanitized
/// filename under a single root directory. Writes overwrite silently; the
/// database's filename UNIQUE constraint is what turns a duplicate upload
/// into an error.
#[derive(Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open the store, creating the root directory if it does not exist.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reduce a client-supplied filename to a single safe path component:
    /// path separators become underscores, anything outside
    /// `[A-Za-z0-9._-]` is dropped, and leading/trailing dots and
    /// underscores are stripped so the result can never traverse out of the
    /// root or hide as a dotfile. Returns `None` when nothing usable
    /// remains.
    pub fn sanitize_filename(raw: &str) -> Option<String> {
        let mut cleaned = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => cleaned.push(c),
                '/' | '\\' | ' ' => cleaned.push('_'),
                _ => {}
            }
        }
        let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.to_string())
    }

    /// Store `bytes` under `filename` (already sanitized), overwriting any
    /// existing blob of the same name.
    pub fn write(&self, filename: &str, bytes: &[u8]) -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(self.root.join(filename))?;
        file.write_all(bytes)?;
        Ok(())
    }

    /// Read a blob back by its stored name. `Ok(None)` when no such blob
    /// exists.
    pub fn read(&self, filename: &str) -> io::Result<Option<Vec<u8>>> {
        let mut file = match fs::OpenOptions::new().read(true).open(self.root.join(filename)) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.root.join(filename).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(
            BlobStore::sanitize_filename("a.jpg"),
            Some("a.jpg".to_string())
        );
        assert_eq!(
            BlobStore::sanitize_filename("cam-01_0042.png"),
            Some("cam-01_0042.png".to_string())
        );
    }

    #[test]
    fn sanitize_strips_path_traversal() {
        assert_eq!(
            BlobStore::sanitize_filename("../../etc/passwd"),
            Some("etc_passwd".to_string())
        );
        assert_eq!(
            BlobStore::sanitize_filename("..\\..\\boot.ini"),
            Some("boot.ini".to_string())
        );
        assert_eq!(
            BlobStore::sanitize_filename("/absolute/path.jpg"),
            Some("absolute_path.jpg".to_string())
        );
    }

    #[test]
    fn sanitize_rejects_names_with_no_usable_characters() {
        assert_eq!(BlobStore::sanitize_filename(""), None);
        assert_eq!(BlobStore::sanitize_filename("...."), None);
        assert_eq!(BlobStore::sanitize_filename("../.."), None);
        assert_eq!(BlobStore::sanitize_filename("日本語"), None);
    }

    #[test]
    fn sanitize_replaces_spaces_like_separators() {
        assert_eq!(
            BlobStore::sanitize_filename("snow cam 1.jpg"),
            Some("snow_cam_1.jpg".to_string())
        );
    }
}
