use actix_web::{get, web, HttpResponse, Responder};
use chrono::SecondsFormat;

use crate::models::{AppState, HealthResponse};

#[get("/healthz")]
pub async fn healthz(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        catalog_items: data.catalog.len(),
        loaded_at: data.loaded_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}
