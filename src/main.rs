use clap::Parser;
use customer_export::app::{check_credentials, report_for};
use customer_export::utils::logger;
use customer_export::{ApiClient, AppConfig, Cli, LocalStorage, ReportEngine, Result};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose, cli.json_logs);
    tracing::info!("Starting customer-export ({:?})", cli.command);

    if let Err(e) = run(cli).await {
        tracing::error!("❌ Run failed: {} (Severity: {:?})", e, e.severity());
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_file(&cli.config)?;
    tracing::debug!("Config: {:?}", config);

    let api = Arc::new(ApiClient::from_config(&config)?);

    let Some(report) = report_for(cli.command, &config) else {
        check_credentials(&api).await?;
        println!("✅ Authenticated against {} for tenant {}", config.base_url, config.tenant_id);
        return Ok(());
    };

    let storage = match cli.output_dir {
        Some(dir) => LocalStorage::new(dir),
        None => LocalStorage::beside_executable()?,
    };

    let engine = ReportEngine::new(api, storage);
    let summary = engine.run(report.as_ref()).await?;

    println!("Number of {}: {}", summary.label, summary.count);
    println!("Data saved to {}", summary.output_path.display());
    Ok(())
}
