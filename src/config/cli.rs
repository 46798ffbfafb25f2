use crate::domain::ports::{DirEntryInfo, Storage};
use crate::utils::error::{Result, UtgenError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        self.base_path.join(path)
    }
}

fn map_not_found(kind: &str, path: &Path, e: std::io::Error) -> UtgenError {
    if e.kind() == ErrorKind::NotFound {
        UtgenError::not_found(kind, path.display().to_string())
    } else {
        UtgenError::IoError(e)
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(self.full_path(path)).map_err(|e| map_not_found("File", path, e))
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // 先寫暫存檔再 rename，讀者不會看到寫到一半的文件
        let mut temp_name = full_path.clone().into_os_string();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);
        fs::write(&temp_path, data)?;
        fs::rename(&temp_path, &full_path)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.full_path(path).exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.full_path(path).is_dir()
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir(self.full_path(path))?;
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>> {
        let entries =
            fs::read_dir(self.full_path(path)).map_err(|e| map_not_found("Directory", path, e))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry?;
            result.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        // read_dir 的順序取決於檔案系統
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(self.full_path(path)).map_err(|e| map_not_found("File", path, e))
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        fs::remove_dir(self.full_path(path)).map_err(|e| map_not_found("Directory", path, e))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.full_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let err = storage.read_file(Path::new("nope.c")).unwrap_err();
        assert!(matches!(err, UtgenError::NotFound { .. }));
    }

    #[test]
    fn test_write_creates_parent_and_lists_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage.write_file(Path::new("pkg/b.c"), b"b").unwrap();
        storage.write_file(Path::new("pkg/a.c"), b"a").unwrap();
        storage.create_dir(Path::new("pkg/nested")).unwrap();

        let entries = storage.list_dir(Path::new("pkg")).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.c", "b.c", "nested"]);
        assert!(entries[2].is_dir);
        assert_eq!(storage.read_to_string(Path::new("pkg/a.c")).unwrap(), "a");
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("tests"));

        assert_eq!(
            storage.resolve(Path::new("../src/uart.c")),
            temp_dir.path().join("tests/../src/uart.c")
        );
        assert_eq!(storage.resolve(Path::new("/src/uart.c")), PathBuf::from("/src/uart.c"));
    }
}
