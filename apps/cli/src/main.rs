use shelfprice_cli::config::Config;
use shelfprice_cli::{init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_format);

    let report = run(&config).await?;
    if !report.is_complete() {
        anyhow::bail!(
            "{} of {} identifiers produced no record",
            report
                .dispatched
                .saturating_sub(report.priced + report.failed),
            report.dispatched
        );
    }
    Ok(())
}
