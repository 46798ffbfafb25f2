use crate::domain::model::{DiscoveryKind, GenerationMode};
use crate::utils::error::{Result, UtgenError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

pub const DEFAULT_CONFIG_FILE: &str = "utgen.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub scanner: ScannerConfig,
    pub registry: RegistryConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub marker: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            marker: "UNIT_TEST".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub file: String,
    pub package_file: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            file: "test_packages.json".to_string(),
            package_file: "package.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub mode: GenerationMode,
    pub discovery: DiscoveryKind,
    pub obj_dir: String,
    pub manifest_file: String,
    pub build_fragment: String,
    pub tool_command: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Combined,
            discovery: DiscoveryKind::Filesystem,
            obj_dir: "obj".to_string(),
            manifest_file: "test.c".to_string(),
            build_fragment: "tests.mk".to_string(),
            tool_command: "$(GEN_TEST_SCRIPT)".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(UtgenError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::from_file(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| UtgenError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CC_PREFIX})，未定義的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn marker(&self) -> &str {
        &self.scanner.marker
    }

    pub fn mode(&self) -> GenerationMode {
        self.generation.mode
    }
}

impl Validate for GeneratorConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("scanner.marker", &self.scanner.marker)?;
        if self.scanner.marker.split_whitespace().count() != 1 {
            return Err(UtgenError::InvalidConfigValueError {
                field: "scanner.marker".to_string(),
                value: self.scanner.marker.clone(),
                reason: "Marker must be a single token".to_string(),
            });
        }

        validation::validate_file_name("registry.file", &self.registry.file)?;
        validation::validate_file_name("registry.package_file", &self.registry.package_file)?;
        validation::validate_file_name("generation.obj_dir", &self.generation.obj_dir)?;
        validation::validate_file_name("generation.manifest_file", &self.generation.manifest_file)?;
        validation::validate_file_name("generation.build_fragment", &self.generation.build_fragment)?;
        validation::validate_non_empty_string("generation.tool_command", &self.generation.tool_command)?;

        Ok(())
    }
}
