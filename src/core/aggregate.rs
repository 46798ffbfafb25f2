use crate::config::toml_config::GeneratorConfig;
use crate::core::group::GENERATED_BANNER;
use crate::core::registry::load_document;
use crate::domain::model::{
    group_manifest_name, group_symbol, DiscoveryKind, GeneratedArtifact, GenerationMode,
};
use crate::domain::ports::{GroupDiscovery, Storage};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// 測試根目錄下的候選目錄：排除隱藏目錄與 obj 目錄
pub fn test_directories(storage: &dyn Storage, obj_dir: &str) -> Result<Vec<String>> {
    Ok(storage
        .list_dir(Path::new("."))?
        .into_iter()
        .filter(|e| e.is_dir && !e.name.starts_with('.') && e.name != obj_dir)
        .map(|e| e.name)
        .collect())
}

fn has_group_definition(storage: &dyn Storage, package: &str) -> bool {
    storage.exists(&Path::new(package).join(format!("{}.c", group_manifest_name(package))))
}

/// 命令列直接指定的群組
#[derive(Debug, Clone)]
pub struct ExplicitGroups(pub Vec<String>);

impl GroupDiscovery for ExplicitGroups {
    fn discover(&self, _storage: &dyn Storage) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Every test directory holding a generated group definition, sorted by name.
#[derive(Debug, Clone)]
pub struct FilesystemDiscovery {
    obj_dir: String,
}

impl FilesystemDiscovery {
    pub fn new(obj_dir: &str) -> Self {
        Self {
            obj_dir: obj_dir.to_string(),
        }
    }
}

impl GroupDiscovery for FilesystemDiscovery {
    fn discover(&self, storage: &dyn Storage) -> Result<Vec<String>> {
        let groups: Vec<String> = test_directories(storage, &self.obj_dir)?
            .into_iter()
            .filter(|dir| has_group_definition(storage, dir))
            .collect();
        tracing::debug!("Filesystem discovery found {} groups", groups.len());
        Ok(groups)
    }
}

/// Registered packages, in registration order, that have been generated.
#[derive(Debug, Clone)]
pub struct RegistryDiscovery {
    registry_file: PathBuf,
}

impl RegistryDiscovery {
    pub fn new(registry_file: impl Into<PathBuf>) -> Self {
        Self {
            registry_file: registry_file.into(),
        }
    }
}

impl GroupDiscovery for RegistryDiscovery {
    fn discover(&self, storage: &dyn Storage) -> Result<Vec<String>> {
        let document = load_document(storage, &self.registry_file)?;

        let mut groups = Vec::new();
        for package in document.packages {
            if has_group_definition(storage, &package) {
                groups.push(package);
            } else {
                tracing::warn!(
                    "Package \"{}\" has no generated group yet, run generate-group first",
                    package
                );
            }
        }
        Ok(groups)
    }
}

/// 沒有指定群組時依設定選擇探索方式
pub fn discovery_for(config: &GeneratorConfig, explicit: Vec<String>) -> Box<dyn GroupDiscovery> {
    if !explicit.is_empty() {
        return Box::new(ExplicitGroups(explicit));
    }

    match config.generation.discovery {
        DiscoveryKind::Filesystem => Box::new(FilesystemDiscovery::new(&config.generation.obj_dir)),
        DiscoveryKind::Registry => Box::new(RegistryDiscovery::new(&config.registry.file)),
    }
}

#[derive(Debug, Clone)]
pub struct TopLevelGenerator {
    mode: GenerationMode,
    obj_dir: String,
    manifest_file: String,
}

impl TopLevelGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            mode: config.generation.mode,
            obj_dir: config.generation.obj_dir.clone(),
            manifest_file: config.generation.manifest_file.clone(),
        }
    }

    pub fn generate(&self, groups: &[String]) -> GeneratedArtifact {
        let mut contents = String::from(GENERATED_BANNER);

        match self.mode {
            GenerationMode::Combined => self.combined(groups, &mut contents),
            GenerationMode::Standalone => self.standalone(groups, &mut contents),
        }

        contents.push_str(&format!("int num_test_groups = {};\n\n\n", groups.len()));

        GeneratedArtifact {
            path: PathBuf::from(&self.manifest_file),
            contents,
        }
    }

    fn combined(&self, groups: &[String], out: &mut String) {
        out.push_str("#include \"test.h\"\n\n\n");

        for group in groups {
            out.push_str(&format!("extern test_group_t {};\n", group_symbol(group)));
        }
        out.push_str("\n\n");

        out.push_str("test_group_t *test_groups_to_run[] = {\n");
        for group in groups {
            out.push_str(&format!("\t&{},\n", group_symbol(group)));
        }
        out.push_str("};\n\n");
    }

    fn standalone(&self, groups: &[String], out: &mut String) {
        out.push_str("char *test_group_names[] = {\n");
        for group in groups {
            out.push_str(&format!("\t\"{}\",\n", group_symbol(group)));
        }
        out.push_str("};\n\n");

        out.push_str("char *test_group_executables[] = {\n");
        for group in groups {
            out.push_str(&format!("\t\"{}/{}/{}_main\",\n", self.obj_dir, group, group));
        }
        out.push_str("};\n\n");
    }
}
