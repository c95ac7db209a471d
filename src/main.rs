use clap::Parser;
use prodeal_cards::config::toml_config::TomlConfig;
use prodeal_cards::core::ConfigProvider;
use prodeal_cards::utils::{logger, validation::Validate};
use prodeal_cards::{CardEngine, CardPipeline, CliConfig, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting prodeal-cards CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 指定 TOML 配置檔時改走配置檔，其餘旗標忽略
    if let Some(config_path) = &cli.config {
        tracing::info!("📄 Loading TOML config from: {}", config_path);
        let config = match TomlConfig::from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("❌ Failed to load config file: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(1);
            }
        };
        let monitor_enabled = config.monitoring_enabled() || cli.monitor;
        return run(config, monitor_enabled).await;
    }

    let monitor_enabled = cli.monitor;
    run(cli, monitor_enabled).await
}

async fn run<C>(config: C, monitor_enabled: bool) -> anyhow::Result<()>
where
    C: ConfigProvider + Validate + 'static,
{
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 建立儲存與管線
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = match CardPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("❌ Failed to initialize pipeline: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let engine = CardEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Card export completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Card export completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Card export failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 依錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                prodeal_cards::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                prodeal_cards::utils::error::ErrorSeverity::Medium => 2, // 重試錯誤
                prodeal_cards::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                prodeal_cards::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
