use clap::Parser;
use property_orientation::config::LogFormat;
use property_orientation::utils::{logger, validation::Validate};
use property_orientation::{run_analysis, CliConfig, LocalStorage, OrientationError};

fn fail(e: &OrientationError) -> ! {
    tracing::error!(
        "❌ Orientation analysis failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("🏠 Property orientation analysis starting");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    tracing::info!("📁 Input directory: {}", config.input.dir);
    tracing::info!("📁 Output directory: {}", config.output.dir);

    let report = match run_analysis(LocalStorage::default(), config).await {
        Ok(report) => report,
        Err(e) => fail(&e),
    };

    println!("{}", report.headline());
    println!();
    println!("{}", report.summary.render_table());
    println!();
    println!("📋 SAMPLE RESULTS:");
    for line in &report.samples {
        println!("  {}", line);
    }

    Ok(())
}
