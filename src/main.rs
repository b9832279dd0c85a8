use std::net::TcpListener;

use conexoes::{configuration::get_configuration, domain::ExtractionRules, startup::run};
use env_logger::Env;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");
    ExtractionRules::from_settings(&configuration.extraction)
        .expect("Invalid extraction selectors in configuration.");

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    log::info!("Listening on http://{}", address);

    run(listener, configuration)?.await
}
