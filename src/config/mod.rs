pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_args::{CliConfig, Command};

#[cfg(feature = "cli")]
mod cli_args {
    use super::toml_config::{GeneratorConfig, DEFAULT_CONFIG_FILE};
    use crate::domain::model::GenerationMode;
    use crate::utils::error::Result;
    use crate::utils::validation::Validate;
    use clap::{Parser, Subcommand};
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "utgen")]
    #[command(about = "Generate C unit test groups and manage test packages")]
    pub struct CliConfig {
        /// Root of the unit test tree
        #[arg(long, global = true, default_value = ".")]
        pub dir: PathBuf,

        /// Configuration file (defaults to <dir>/utgen.toml when present)
        #[arg(long, global = true)]
        pub config: Option<PathBuf>,

        /// Override the generation mode from the configuration file
        #[arg(long, global = true, value_enum)]
        pub mode: Option<GenerationMode>,

        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Emit logs as JSON lines")]
        pub log_json: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Create an empty package registry in the test directory
        Init,
        /// Generate a single test group
        #[command(alias = "generate_group")]
        GenerateGroup { package: String },
        /// Generate every registered group, then the top-level list
        #[command(alias = "generate_all")]
        GenerateAll,
        /// Generate the top-level test apparatus. Must be run after generate-group.
        #[command(alias = "generate_group_list")]
        GenerateGroupList {
            /// Groups to include; discovered when omitted
            groups: Vec<String>,
        },
        /// Create a unit test package with the given name
        #[command(alias = "create_test_package")]
        CreateTestPackage { package: String },
        /// Remove a unit test package with the given name
        #[command(alias = "remove_test_package")]
        RemoveTestPackage { package: String },
        /// Register a production source file (relative to the root) with a package
        #[command(alias = "add_source_file")]
        AddSourceFile { package: String, path: String },
        /// Set the root that source file paths are resolved against
        #[command(alias = "set_root")]
        SetRoot { path: String },
        /// Print the resolved source file paths of a package, one per line
        #[command(alias = "get_source_file_paths")]
        GetSourceFilePaths { package: String },
        /// Print the registered packages, one per line
        #[command(alias = "get_test_packages")]
        GetTestPackages,
    }

    impl CliConfig {
        /// 載入設定檔並套用命令列覆蓋
        pub fn resolve_config(&self) -> Result<GeneratorConfig> {
            let mut config = match &self.config {
                Some(path) => GeneratorConfig::from_file(path)?,
                None => GeneratorConfig::load_or_default(self.dir.join(DEFAULT_CONFIG_FILE))?,
            };

            if let Some(mode) = self.mode {
                tracing::debug!("Generation mode overridden to: {:?}", mode);
                config.generation.mode = mode;
            }

            config.validate()?;
            Ok(config)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_subcommands() {
            let cli = CliConfig::try_parse_from(["utgen", "add-source-file", "io", "drivers/uart.c"])
                .unwrap();
            match cli.command {
                Command::AddSourceFile { package, path } => {
                    assert_eq!(package, "io");
                    assert_eq!(path, "drivers/uart.c");
                }
                other => panic!("unexpected command: {:?}", other),
            }
            assert_eq!(cli.dir, PathBuf::from("."));
        }

        #[test]
        fn test_underscore_aliases() {
            let cli = CliConfig::try_parse_from(["utgen", "generate_group", "math"]).unwrap();
            assert!(matches!(cli.command, Command::GenerateGroup { ref package } if package == "math"));
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = CliConfig::try_parse_from([
                "utgen",
                "generate-group-list",
                "math",
                "io",
                "--mode",
                "standalone",
                "--dir",
                "tests/unit_tests",
            ])
            .unwrap();
            assert_eq!(cli.mode, Some(GenerationMode::Standalone));
            assert_eq!(cli.dir, PathBuf::from("tests/unit_tests"));
            match cli.command {
                Command::GenerateGroupList { groups } => assert_eq!(groups, vec!["math", "io"]),
                other => panic!("unexpected command: {:?}", other),
            }
        }

        #[test]
        fn test_resolve_config_applies_mode_override() {
            let temp_dir = tempfile::TempDir::new().unwrap();
            let dir = temp_dir.path().to_str().unwrap();
            let cli = CliConfig::try_parse_from([
                "utgen",
                "--dir",
                dir,
                "--mode",
                "standalone",
                "generate-all",
            ])
            .unwrap();

            let config = cli.resolve_config().unwrap();
            assert_eq!(config.mode(), GenerationMode::Standalone);
        }
    }
}
