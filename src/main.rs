use clap::Parser;
use std::sync::Arc;
use tester_match::config::Command;
use tester_match::utils::error::{ErrorSeverity, MatchError};
use tester_match::utils::{logger, validation::Validate};
use tester_match::{api, load_store, CliConfig, MatchRequest, MatchService, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };

    // 初始化日誌
    if settings.logging.json {
        logger::init_json_logger(cli.verbose, settings.logging.level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, settings.logging.level.as_deref());
    }

    tracing::info!("Starting tester-match");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    if let Err(e) = run(cli.command(), &settings).await {
        tracing::error!(
            "❌ tester-match failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        fail(&e);
    }

    Ok(())
}

async fn run(command: Command, settings: &TomlConfig) -> tester_match::Result<()> {
    tracing::info!("Loading dataset from {}", settings.dataset_dir());
    let store = load_store(&settings.dataset).await?;
    let service = Arc::new(MatchService::new(store));

    match command {
        Command::Serve => {
            let addr = settings.bind_addr()?;
            let app = api::router(service);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            tracing::info!("Server stopped");
        }
        Command::Rank { countries, devices } => {
            let request = MatchRequest::new(countries, devices);
            let ranked = service.match_testers(&request)?;
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        }
        Command::Devices => {
            let devices = service.list_devices()?;
            println!("{}", serde_json::to_string_pretty(&devices)?);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn fail(e: &MatchError) -> ! {
    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 2,      // 輸入錯誤
        ErrorSeverity::High => 1,     // 設定或資料錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    };
    std::process::exit(exit_code);
}
