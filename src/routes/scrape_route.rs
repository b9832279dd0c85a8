use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::{
    configuration::Settings,
    domain::{ConnectionRecord, RunResult},
    error::ScrapeError,
    services::orchestrator,
};

#[derive(Serialize)]
struct ScrapeResponse {
    success: bool,
    total: usize,
    data: Vec<ConnectionRecord>,
}

fn scrape_response(result: RunResult) -> HttpResponse {
    HttpResponse::Ok().json(ScrapeResponse {
        success: true,
        total: result.record_count,
        data: result.records,
    })
}

#[get("/scrap")]
async fn scrap(settings: web::Data<Settings>) -> Result<HttpResponse, ScrapeError> {
    log::info!("Running scrape on request");

    let result = orchestrator::run(&settings).await?;

    Ok(scrape_response(result))
}
