use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 全域註冊表文件 (`test_packages.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub root: String,
    #[serde(default)]
    pub packages: Vec<String>,
}

impl RegistryDocument {
    pub fn contains(&self, package: &str) -> bool {
        self.packages.iter().any(|p| p == package)
    }

    /// 空字串代表尚未設定
    pub fn root(&self) -> Option<&str> {
        if self.root.is_empty() {
            None
        } else {
            Some(&self.root)
        }
    }
}

/// 單一套件的文件 (`<id>/package.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub unit_test_files: Vec<String>,
    #[serde(default)]
    pub source_files: Vec<String>,
}

impl Package {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            unit_test_files: vec![test_source_name(name)],
            source_files: Vec::new(),
        }
    }
}

/// 測試原始檔的命名慣例
pub fn test_source_name(package: &str) -> String {
    format!("test_{}.c", package)
}

/// Manifest name of a package's group artifacts, e.g. `MATH_GROUP`.
pub fn group_manifest_name(package: &str) -> String {
    format!("{}_GROUP", package.to_uppercase())
}

/// 一個套件掃描出來的測試群組，每次產生都會重新建立
#[derive(Debug, Clone, PartialEq)]
pub struct TestGroup {
    pub package: String,
    pub tests: Vec<String>,
}

impl TestGroup {
    pub fn new(package: &str, tests: Vec<String>) -> Self {
        Self {
            package: package.to_string(),
            tests,
        }
    }

    pub fn manifest_name(&self) -> String {
        group_manifest_name(&self.package)
    }

    pub fn symbol(&self) -> String {
        group_symbol(&self.package)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

/// C symbol of a package's group descriptor.
pub fn group_symbol(package: &str) -> String {
    format!("{}_test_group", package)
}

/// A generated text file, path relative to the test tree.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArtifact {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum GenerationMode {
    /// 所有群組連結成一個執行檔
    #[default]
    Combined,
    /// 每個群組各自成為一個執行檔
    Standalone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryKind {
    #[default]
    Filesystem,
    Registry,
}
