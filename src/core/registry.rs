//! JSON-backed package registry.
//!
//! Every mutating operation is one read-decode-mutate-encode-write cycle over
//! the affected documents. There is no locking: invocations must be
//! serialized by the caller (the top-level Makefile runs them one at a time).

use crate::config::toml_config::GeneratorConfig;
use crate::core::build_fragment::BuildFragmentGenerator;
use crate::domain::model::{test_source_name, Package, RegistryDocument};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, UtgenError};
use crate::utils::validation::validate_package_id;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub struct Registry<S: Storage> {
    storage: S,
    registry_file: PathBuf,
    package_file: String,
    fragment: BuildFragmentGenerator,
}

impl<S: Storage> Registry<S> {
    pub fn new(storage: S, config: &GeneratorConfig) -> Self {
        Self {
            storage,
            registry_file: PathBuf::from(&config.registry.file),
            package_file: config.registry.package_file.clone(),
            fragment: BuildFragmentGenerator::new(
                &config.generation.build_fragment,
                &config.generation.tool_command,
                config.generation.mode,
            ),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 建立空的註冊表；已存在時回傳 false 且不覆寫
    pub fn init(&self) -> Result<bool> {
        if self.storage.exists(&self.registry_file) {
            tracing::info!("Registry {} already exists", self.registry_file.display());
            return Ok(false);
        }

        self.save(&RegistryDocument::default())?;
        tracing::info!("Created registry {}", self.registry_file.display());
        Ok(true)
    }

    pub fn load(&self) -> Result<RegistryDocument> {
        load_document(&self.storage, &self.registry_file)
    }

    fn save(&self, document: &RegistryDocument) -> Result<()> {
        self.storage
            .write_file(&self.registry_file, &to_json_bytes(document)?)
    }

    fn package_path(&self, package: &str) -> PathBuf {
        PathBuf::from(package).join(&self.package_file)
    }

    pub fn load_package(&self, package: &str) -> Result<Package> {
        let data = self.storage.read_file(&self.package_path(package))?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn save_package(&self, package: &Package) -> Result<()> {
        self.storage
            .write_file(&self.package_path(&package.name), &to_json_bytes(package)?)
    }

    fn require_registered(&self, document: &RegistryDocument, package: &str) -> Result<()> {
        if !document.contains(package) {
            return Err(UtgenError::not_found("Package", package));
        }
        Ok(())
    }

    pub fn create_package(&self, package: &str) -> Result<()> {
        validate_package_id(package)?;
        let mut document = self.load()?;

        if document.contains(package) {
            return Err(UtgenError::AlreadyExists {
                package: package.to_string(),
            });
        }

        let package_dir = Path::new(package);
        if self.storage.exists(package_dir) {
            return Err(UtgenError::PathConflict {
                path: package.to_string(),
                reason: "an entry with this name exists and is not a registered package"
                    .to_string(),
            });
        }

        tracing::info!("Creating package \"{}\"...", package);

        self.storage.create_dir(package_dir)?;
        self.storage
            .write_file(&package_dir.join(test_source_name(package)), b"")?;

        let fragment = self.fragment.generate(package);
        self.storage
            .write_file(&fragment.path, fragment.contents.as_bytes())?;

        self.save_package(&Package::new(package))?;

        document.packages.push(package.to_string());
        self.save(&document)
    }

    /// 只刪除套件目錄第一層的檔案；遇到子目錄直接失敗，不做遞迴刪除
    pub fn remove_package(&self, package: &str) -> Result<()> {
        let mut document = self.load()?;
        self.require_registered(&document, package)?;

        let package_dir = Path::new(package);
        if !self.storage.is_dir(package_dir) {
            return Err(UtgenError::not_found("Package directory", package));
        }

        let entries = self.storage.list_dir(package_dir)?;
        if let Some(nested) = entries.iter().find(|e| e.is_dir) {
            return Err(UtgenError::PathConflict {
                path: package_dir.join(&nested.name).display().to_string(),
                reason: "package directory contains a subdirectory; remove it by hand first"
                    .to_string(),
            });
        }

        tracing::info!("Removing package \"{}\"...", package);

        for entry in &entries {
            tracing::debug!("Removing {}/{}", package, entry.name);
            self.storage.remove_file(&package_dir.join(&entry.name))?;
        }
        self.storage.remove_dir(package_dir)?;

        document.packages.retain(|p| p != package);
        self.save(&document)
    }

    pub fn add_source_file(&self, package: &str, relative_path: &str) -> Result<()> {
        let document = self.load()?;
        self.require_registered(&document, package)?;

        let root = document.root().ok_or(UtgenError::RootNotSet)?;
        let source = Path::new(root).join(relative_path);
        if !self.storage.exists(&source) {
            return Err(UtgenError::not_found(
                "Source file",
                self.storage.resolve(&source).display().to_string(),
            ));
        }

        let mut package_doc = self.load_package(package)?;
        if package_doc.source_files.iter().any(|f| f == relative_path) {
            return Err(UtgenError::AlreadyRegistered {
                package: package.to_string(),
                path: relative_path.to_string(),
            });
        }

        tracing::info!("Adding {} to package \"{}\"", relative_path, package);
        package_doc.source_files.push(relative_path.to_string());
        self.save_package(&package_doc)
    }

    /// 不檢查路徑是否存在
    pub fn set_root(&self, root: &str) -> Result<()> {
        let mut document = self.load()?;
        tracing::info!("Setting source root to {}", root);
        document.root = root.to_string();
        self.save(&document)
    }

    pub fn list_source_paths(&self, package: &str) -> Result<Vec<PathBuf>> {
        let document = self.load()?;
        self.require_registered(&document, package)?;

        let root = document.root().ok_or(UtgenError::RootNotSet)?;
        let package_doc = self.load_package(package)?;

        Ok(package_doc
            .source_files
            .iter()
            .map(|file| self.storage.resolve(&Path::new(root).join(file)))
            .collect())
    }

    pub fn list_packages(&self) -> Result<Vec<String>> {
        Ok(self.load()?.packages)
    }
}

/// 讀取全域註冊表；檔案不存在時回報 `Registry` 類別的 NotFound
pub fn load_document(storage: &dyn Storage, registry_file: &Path) -> Result<RegistryDocument> {
    let data = storage.read_file(registry_file).map_err(|e| match e {
        UtgenError::NotFound { .. } => {
            UtgenError::not_found("Registry", registry_file.display().to_string())
        }
        other => other,
    })?;
    Ok(serde_json::from_slice(&data)?)
}

/// 4 空格縮排，與既有的 test_packages.json 一致
fn to_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Registry<LocalStorage>) {
        let temp_dir = TempDir::new().unwrap();
        let registry = Registry::new(
            LocalStorage::new(temp_dir.path()),
            &GeneratorConfig::default(),
        );
        registry.init().unwrap();
        (temp_dir, registry)
    }

    #[test]
    fn test_init_is_idempotent() {
        let (temp_dir, registry) = setup();
        registry.set_root("/src").unwrap();

        assert!(!registry.init().unwrap());
        assert_eq!(registry.load().unwrap().root, "/src");
        assert!(temp_dir.path().join("test_packages.json").exists());
    }

    #[test]
    fn test_missing_registry_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let registry = Registry::new(
            LocalStorage::new(temp_dir.path()),
            &GeneratorConfig::default(),
        );

        match registry.list_packages() {
            Err(UtgenError::NotFound { kind, .. }) => assert_eq!(kind, "Registry"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_create_package_layout() {
        let (temp_dir, registry) = setup();
        registry.create_package("math").unwrap();

        let dir = temp_dir.path().join("math");
        assert!(dir.join("test_math.c").exists());
        assert!(dir.join("tests.mk").exists());
        assert_eq!(std::fs::read(dir.join("test_math.c")).unwrap().len(), 0);

        let package = registry.load_package("math").unwrap();
        assert_eq!(package, Package::new("math"));
        assert_eq!(registry.list_packages().unwrap(), vec!["math"]);
    }

    #[test]
    fn test_registry_json_uses_four_space_indent() {
        let (temp_dir, registry) = setup();
        registry.create_package("math").unwrap();

        let text = std::fs::read_to_string(temp_dir.path().join("test_packages.json")).unwrap();
        assert!(text.contains("\n    \"packages\": [\n        \"math\"\n    ]"));
    }

    #[test]
    fn test_create_duplicate_package_does_not_mutate() {
        let (_temp_dir, registry) = setup();
        registry.create_package("math").unwrap();
        let before = registry.load().unwrap();

        let err = registry.create_package("math").unwrap_err();
        assert!(matches!(err, UtgenError::AlreadyExists { .. }));
        assert_eq!(registry.load().unwrap(), before);
    }

    #[test]
    fn test_create_package_path_conflict() {
        let (temp_dir, registry) = setup();
        std::fs::create_dir(temp_dir.path().join("obj")).unwrap();

        let err = registry.create_package("obj").unwrap_err();
        assert!(matches!(err, UtgenError::PathConflict { .. }));
        assert!(registry.list_packages().unwrap().is_empty());
    }

    #[test]
    fn test_create_package_rejects_invalid_name() {
        let (temp_dir, registry) = setup();
        let err = registry.create_package("../escape").unwrap_err();
        assert!(matches!(err, UtgenError::ValidationError { .. }));
        assert!(!temp_dir.path().join("../escape").exists());
    }

    #[test]
    fn test_remove_package() {
        let (temp_dir, registry) = setup();
        registry.create_package("math").unwrap();
        registry.create_package("io").unwrap();

        registry.remove_package("math").unwrap();
        assert!(!temp_dir.path().join("math").exists());
        assert_eq!(registry.list_packages().unwrap(), vec!["io"]);
    }

    #[test]
    fn test_remove_unregistered_package() {
        let (temp_dir, registry) = setup();
        std::fs::create_dir(temp_dir.path().join("loose")).unwrap();

        let err = registry.remove_package("loose").unwrap_err();
        assert!(matches!(err, UtgenError::NotFound { .. }));
        assert!(temp_dir.path().join("loose").exists());
    }

    #[test]
    fn test_remove_package_missing_directory() {
        let (temp_dir, registry) = setup();
        registry.create_package("math").unwrap();
        std::fs::remove_dir_all(temp_dir.path().join("math")).unwrap();

        let err = registry.remove_package("math").unwrap_err();
        assert!(matches!(err, UtgenError::NotFound { .. }));
        assert_eq!(registry.list_packages().unwrap(), vec!["math"]);
    }

    #[test]
    fn test_remove_package_refuses_subdirectories() {
        let (temp_dir, registry) = setup();
        registry.create_package("math").unwrap();
        std::fs::create_dir(temp_dir.path().join("math/fixtures")).unwrap();

        let err = registry.remove_package("math").unwrap_err();
        assert!(matches!(err, UtgenError::PathConflict { .. }));
        // 失敗前不刪除任何檔案
        assert!(temp_dir.path().join("math/test_math.c").exists());
        assert_eq!(registry.list_packages().unwrap(), vec!["math"]);
    }

    #[test]
    fn test_add_source_file_requires_root() {
        let (_temp_dir, registry) = setup();
        registry.create_package("io").unwrap();

        let err = registry.add_source_file("io", "drivers/uart.c").unwrap_err();
        assert!(matches!(err, UtgenError::RootNotSet));
    }

    #[test]
    fn test_add_source_file_unknown_package() {
        let (_temp_dir, registry) = setup();
        let err = registry.add_source_file("io", "drivers/uart.c").unwrap_err();
        assert!(matches!(err, UtgenError::NotFound { .. }));
    }

    #[test]
    fn test_add_source_file_and_list() {
        let (_temp_dir, registry) = setup();
        let src_dir = TempDir::new().unwrap();
        std::fs::create_dir(src_dir.path().join("drivers")).unwrap();
        std::fs::write(src_dir.path().join("drivers/uart.c"), "").unwrap();
        std::fs::write(src_dir.path().join("drivers/spi.c"), "").unwrap();

        let root = src_dir.path().to_str().unwrap();
        registry.set_root(root).unwrap();
        registry.create_package("io").unwrap();
        registry.add_source_file("io", "drivers/uart.c").unwrap();
        registry.add_source_file("io", "drivers/spi.c").unwrap();

        let err = registry.add_source_file("io", "drivers/uart.c").unwrap_err();
        assert!(matches!(err, UtgenError::AlreadyRegistered { .. }));

        assert_eq!(
            registry.list_source_paths("io").unwrap(),
            vec![
                src_dir.path().join("drivers/uart.c"),
                src_dir.path().join("drivers/spi.c"),
            ]
        );
    }

    #[test]
    fn test_relative_root_resolves_against_test_tree() {
        // <tmp>/tests 為測試根目錄，原始碼在 <tmp>/src
        let workspace = TempDir::new().unwrap();
        let tests_dir = workspace.path().join("tests");
        std::fs::create_dir_all(&tests_dir).unwrap();
        std::fs::create_dir_all(workspace.path().join("src/drivers")).unwrap();
        std::fs::write(workspace.path().join("src/drivers/uart.c"), "").unwrap();

        let registry = Registry::new(LocalStorage::new(&tests_dir), &GeneratorConfig::default());
        registry.init().unwrap();
        registry.set_root("../src").unwrap();
        registry.create_package("io").unwrap();
        registry.add_source_file("io", "drivers/uart.c").unwrap();

        let paths = registry.list_source_paths("io").unwrap();
        assert_eq!(paths, vec![tests_dir.join("../src/drivers/uart.c")]);
        assert!(paths[0].exists());

        let err = registry.add_source_file("io", "drivers/missing.c").unwrap_err();
        assert!(matches!(err, UtgenError::NotFound { .. }));
        assert_eq!(registry.list_source_paths("io").unwrap().len(), 1);
    }

    #[test]
    fn test_set_root_overwrites_without_validation() {
        let (_temp_dir, registry) = setup();
        registry.set_root("/does/not/exist").unwrap();
        registry.set_root("/src").unwrap();
        assert_eq!(registry.load().unwrap().root(), Some("/src"));
    }
}
