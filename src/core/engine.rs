use crate::config::toml_config::GeneratorConfig;
use crate::core::aggregate::{discovery_for, test_directories, TopLevelGenerator};
use crate::core::group::{GroupArtifacts, GroupGenerator};
use crate::core::registry::Registry;
use crate::core::scanner::DeclarationScanner;
use crate::domain::model::{test_source_name, GeneratedArtifact, TestGroup};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, UtgenError};
use std::path::Path;

/// scan → generate → write，每次呼叫都從頭產生，不保留任何狀態
pub struct ManifestEngine<S: Storage> {
    config: GeneratorConfig,
    registry: Registry<S>,
    scanner: DeclarationScanner,
    groups: GroupGenerator,
    top_level: TopLevelGenerator,
}

impl<S: Storage> ManifestEngine<S> {
    pub fn new(storage: S, config: GeneratorConfig) -> Self {
        Self {
            registry: Registry::new(storage, &config),
            scanner: DeclarationScanner::new(config.marker()),
            groups: GroupGenerator::new(config.mode()),
            top_level: TopLevelGenerator::new(&config),
            config,
        }
    }

    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    fn storage(&self) -> &S {
        self.registry.storage()
    }

    pub fn generate_group(&self, package: &str) -> Result<GroupArtifacts> {
        let test_dirs = test_directories(self.storage(), &self.config.generation.obj_dir)?;
        if !test_dirs.iter().any(|dir| dir == package) {
            return Err(UtgenError::not_found("Test directory", package));
        }

        let test_file = Path::new(package).join(test_source_name(package));
        let tests = self.scanner.scan_file(self.storage(), &test_file)?;
        let group = TestGroup::new(package, tests);

        let artifacts = self.groups.generate(&group);
        self.write(&artifacts.declaration)?;
        self.write(&artifacts.definition)?;

        tracing::info!(
            "✅ Generated {} with {} tests",
            group.manifest_name(),
            group.len()
        );
        Ok(artifacts)
    }

    /// `groups` 為空時使用設定檔指定的探索方式
    pub fn generate_group_list(&self, groups: Vec<String>) -> Result<GeneratedArtifact> {
        let discovery = discovery_for(&self.config, groups);
        let groups = discovery.discover(self.storage())?;

        let artifact = self.top_level.generate(&groups);
        self.write(&artifact)?;

        tracing::info!(
            "✅ Generated {} referencing {} groups",
            artifact.path.display(),
            groups.len()
        );
        Ok(artifact)
    }

    pub fn generate_all(&self) -> Result<GeneratedArtifact> {
        for package in self.registry.list_packages()? {
            self.generate_group(&package)?;
        }
        self.generate_group_list(Vec::new())
    }

    fn write(&self, artifact: &GeneratedArtifact) -> Result<()> {
        tracing::debug!("Writing {}", artifact.path.display());
        self.storage()
            .write_file(&artifact.path, artifact.contents.as_bytes())
    }
}
