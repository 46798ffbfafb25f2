use clap::Parser;
use utgen::utils::error::ErrorSeverity;
use utgen::utils::logger;
use utgen::{CliConfig, Command, LocalStorage, ManifestEngine, Result};

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(&cli) {
        let severity = e.severity();

        if severity == ErrorSeverity::Low {
            // 冪等的 no-op，只提示
            tracing::warn!("{}", e);
            return;
        }

        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            severity
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match severity {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2, // 設定錯誤
            ErrorSeverity::High => 1, // 操作失敗
            ErrorSeverity::Critical => 3, // 系統錯誤
        };
        std::process::exit(exit_code);
    }
}

fn run(cli: &CliConfig) -> Result<()> {
    let config = cli.resolve_config()?;
    let engine = ManifestEngine::new(LocalStorage::new(&cli.dir), config);
    let registry = engine.registry();

    match &cli.command {
        Command::Init => {
            registry.init()?;
        }
        Command::GenerateGroup { package } => {
            engine.generate_group(package)?;
        }
        Command::GenerateAll => {
            engine.generate_all()?;
        }
        Command::GenerateGroupList { groups } => {
            engine.generate_group_list(groups.clone())?;
        }
        Command::CreateTestPackage { package } => {
            registry.create_package(package)?;
        }
        Command::RemoveTestPackage { package } => {
            registry.remove_package(package)?;
        }
        Command::AddSourceFile { package, path } => {
            registry.add_source_file(package, path)?;
        }
        Command::SetRoot { path } => {
            registry.set_root(path)?;
        }
        Command::GetSourceFilePaths { package } => {
            for path in registry.list_source_paths(package)? {
                println!("{}", path.display());
            }
        }
        Command::GetTestPackages => {
            for package in registry.list_packages()? {
                println!("{}", package);
            }
        }
    }

    Ok(())
}
