use actix_web::{post, web, HttpResponse, Responder};
use log::info;

use crate::models::{AppState, ItemsResponse, LookupRequest, SetsRequest, SpellsResponse};
use crate::services::spells::unique_spells;

#[post("/api/items")]
pub async fn lookup_items(
    data: web::Data<AppState>,
    body: web::Json<LookupRequest>,
) -> impl Responder {
    let names = body.requested_names();
    let lookup = data.catalog.lookup(&names);

    info!(
        "Looked up {} names: {} rows matched, {} not found",
        names.len(),
        lookup.items.len(),
        lookup.not_found.len()
    );

    HttpResponse::Ok().json(ItemsResponse {
        ok: true,
        count: lookup.items.len(),
        headers: data.catalog.headers().to_vec(),
        items: lookup.items,
        not_found: lookup.not_found,
    })
}

#[post("/spells")]
pub async fn list_spells(
    data: web::Data<AppState>,
    body: web::Json<SetsRequest>,
) -> impl Responder {
    let items = body.resolve_items(&data.catalog);
    HttpResponse::Ok().json(SpellsResponse {
        ok: true,
        spells: unique_spells(&items),
    })
}
