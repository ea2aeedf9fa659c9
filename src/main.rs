use clap::Parser;
use variant_insights::core::{ConfigProvider, Pipeline};
use variant_insights::utils::error::ErrorSeverity;
use variant_insights::utils::{logger, validation::Validate};
use variant_insights::{
    CliConfig, InsightsConfig, InsightsEngine, InsightsError, LocalStorage, SnapshotPipeline,
    VariantBatch,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting variant-insights");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    display_config_summary(&config, cli.dry_run);

    // 相對路徑以目前工作目錄為準
    let storage = LocalStorage::new(".".to_string());
    let pipeline = SnapshotPipeline::new(storage, config);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        // 與正式執行走同一個 extract 階段，只是不做 transform/load
        match pipeline.extract().await {
            Ok(batch) => display_dry_run(&batch),
            Err(e) => report_failure(&e),
        }
        return Ok(());
    }

    let engine = InsightsEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Insights computed successfully!");
            println!("✅ Insights computed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => report_failure(&e),
    }

    Ok(())
}

fn report_failure(e: &InsightsError) {
    tracing::error!(
        "❌ Insights run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

fn display_config_summary(config: &InsightsConfig, dry_run: bool) {
    println!("📋 Configuration Summary:");
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!(
        "  Row normalization: {}",
        config.normalize_within_plot_point()
    );
    println!("  Cosine agreement: {}", config.cosine_agreement());
    println!(
        "  Similarity threshold: {}",
        InsightsConfig::similarity_threshold(config)
    );

    if let Some(order) = &config.matrix.category_order {
        println!("  Category order: {}", order.join(", "));
    }
    if let Some(weights) = &config.matrix.weights {
        println!("  Weighted collaborators: {}", weights.len());
    }
    if let Some(archive) = config.archive_name() {
        println!("  Archive: {}", archive);
    }
    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn display_dry_run(batch: &VariantBatch) {
    let assignments: usize = batch
        .plot_points()
        .iter()
        .map(|p| p.assignments.len())
        .sum();

    println!("🔍 Dry Run Analysis:");
    println!(
        "  Variant: {}",
        batch.variant_id().unwrap_or("(unnamed)")
    );
    println!("  Plot points: {}", batch.plot_points().len());
    println!("  Collaborators: {}", batch.collaborators().len());
    println!("  Category assignments: {}", assignments);
    println!(
        "  Agreement matrix size: {0}x{0}",
        batch.plot_points().len()
    );
    println!();
    println!("✅ Snapshot is valid. Run without --dry-run to compute insights.");
}
