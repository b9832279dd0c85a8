use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::{configuration::Settings, domain::FieldBinding};

/// What the service is pointed at. Credentials never leave the process.
#[derive(Serialize)]
struct StatusResponse<'a> {
    service: &'static str,
    version: &'static str,
    dashboard: Option<&'a str>,
    target_path: &'a str,
    binding: FieldBinding,
    artifact_path: &'a str,
}

#[get("/")]
async fn status(settings: web::Data<Settings>) -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        dashboard: settings.dashboard.login_url.host_str(),
        target_path: &settings.dashboard.target_path,
        binding: settings.extraction.binding,
        artifact_path: &settings.output.artifact_path,
    })
}
