use anyhow::Context;
use conexoes::{configuration::get_configuration, services::orchestrator};
use env_logger::Env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration")?;
    let result = orchestrator::run(&configuration)
        .await
        .context("Scrape failed")?;

    println!("{}", serde_json::to_string_pretty(&result.records)?);
    log::info!(
        "{} connection(s) saved to {}",
        result.record_count,
        configuration.output.artifact_path
    );

    Ok(())
}
