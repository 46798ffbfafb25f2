use crate::utils::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

/// 測試目錄樹的檔案存取，路徑皆相對於測試根目錄
pub trait Storage {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn create_dir(&self, path: &Path) -> Result<()>;
    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir(&self, path: &Path) -> Result<()>;

    /// 相對路徑以測試根目錄為基準，絕對路徑原樣回傳
    fn resolve(&self, path: &Path) -> PathBuf;

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let data = self.read_file(path)?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

/// Produces the list of group (package) ids the top-level artifact references.
pub trait GroupDiscovery {
    fn discover(&self, storage: &dyn Storage) -> Result<Vec<String>>;
}
