use actix_web::{post, web, HttpResponse, Responder};
use log::info;

use crate::models::{AppState, CountResponse, SampleResponse, SetsRequest};
use crate::services::combinations::{count_filtered_sets, count_sets, sample_sets};
use crate::services::slot_pool::{slot_counts, SlotPool};

pub const DEFAULT_SAMPLE: usize = 5;
pub const MAX_SAMPLE: usize = 50;

#[post("/sets/current")]
pub async fn current_sets(
    data: web::Data<AppState>,
    body: web::Json<SetsRequest>,
) -> impl Responder {
    let items = body.resolve_items(&data.catalog);
    let pool = SlotPool::from_items(&items);
    let sets_count = count_sets(&pool);

    info!("Counted {} sets from {} items", sets_count, items.len());

    HttpResponse::Ok().json(CountResponse {
        ok: true,
        sets_count,
        slot_counts: Some(slot_counts(&items)),
    })
}

#[post("/sets/filter")]
pub async fn filter_sets(
    data: web::Data<AppState>,
    body: web::Json<SetsRequest>,
) -> impl Responder {
    let items = body.resolve_items(&data.catalog);
    let filter = body.spell_filter();
    let pool = SlotPool::from_items(&items);
    let sets_count = count_filtered_sets(&pool, &filter);

    info!(
        "Counted {} sets from {} items carrying {:?}",
        sets_count,
        items.len(),
        filter.iter().collect::<Vec<_>>()
    );

    HttpResponse::Ok().json(CountResponse {
        ok: true,
        sets_count,
        slot_counts: None,
    })
}

#[post("/sets/sample")]
pub async fn sample(
    data: web::Data<AppState>,
    body: web::Json<SetsRequest>,
) -> impl Responder {
    let items = body.resolve_items(&data.catalog);
    let filter = body.spell_filter();
    let limit = body.limit.unwrap_or(DEFAULT_SAMPLE).min(MAX_SAMPLE);
    let pool = SlotPool::from_items(&items);

    HttpResponse::Ok().json(SampleResponse {
        ok: true,
        sets: sample_sets(&pool, &filter, limit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::handlers::fixtures::{state, ALL_NAMES};
    use crate::handlers::json_config;

    async fn post(uri: &str, payload: Value) -> Value {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .service(current_sets)
                .service(filter_sets)
                .service(sample),
        )
        .await;
        let req = test::TestRequest::post().uri(uri).set_json(payload).to_request();
        test::call_and_read_body_json(&app, req).await
    }

    #[actix_web::test]
    async fn test_current_count_from_names() {
        let body = post("/sets/current", json!({ "input": ALL_NAMES })).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["sets_count"], 2);
        assert_eq!(body["slot_counts"]["Jewel"], 2);
        assert_eq!(body["slot_counts"]["Weapon"], 1);
    }

    #[actix_web::test]
    async fn test_current_count_from_items() {
        let items = json!([
            {"Item": "Hat", "Slot": "Head"},
            {"Item": "RingA", "Slot": "Jewel", "Spell": "fire"},
            {"Item": "RingB", "Slot": "Jewel", "Spell": "ice"},
            {"Item": "RingC", "Slot": "jewel", "Spell": null},
            {"Item": "Cape", "Slot": "Cloak"},
            {"Item": "Robe", "Slot": "Body"},
            {"Item": "Gloves", "Slot": "Hands"},
            {"Item": "Pants", "Slot": "Legs"},
            {"Item": "Boots", "Slot": "Feet"}
        ]);
        let body = post("/sets/current", json!({ "items": items })).await;
        assert_eq!(body["sets_count"], 6);
    }

    #[actix_web::test]
    async fn test_current_count_without_items_is_zero() {
        let body = post("/sets/current", json!({})).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["sets_count"], 0);
    }

    #[actix_web::test]
    async fn test_filtered_counts() {
        let fire = post("/sets/filter", json!({ "input": ALL_NAMES, "spells": ["Fire"] })).await;
        assert_eq!(fire["sets_count"], 2);
        assert!(fire.get("slot_counts").is_none());

        let both = post("/sets/filter", json!({ "input": ALL_NAMES, "spells": ["fire", "ice", " "] })).await;
        assert_eq!(both["sets_count"], 2);

        let single = post("/sets/filter", json!({ "input": ALL_NAMES, "spells": "lightning" })).await;
        assert_eq!(single["sets_count"], 0);

        let blank = post("/sets/filter", json!({ "input": ALL_NAMES, "spells": [] })).await;
        assert_eq!(blank["sets_count"], 2);
    }

    #[actix_web::test]
    async fn test_non_string_spells_do_not_match() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .app_data(json_config())
                .service(filter_sets),
        )
        .await;

        for spells in [json!(["fire", 5]), json!(5), json!([["fire"]])] {
            let req = test::TestRequest::post()
                .uri("/sets/filter")
                .set_json(json!({ "input": ALL_NAMES, "spells": spells }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["ok"], true);
            assert_eq!(body["sets_count"], 0);
        }

        let with_null = post("/sets/filter", json!({ "input": ALL_NAMES, "spells": [null, "fire"] })).await;
        assert_eq!(with_null["sets_count"], 2);
    }

    #[actix_web::test]
    async fn test_sample_sets() {
        let body = post("/sets/sample", json!({ "input": ALL_NAMES, "limit": 1 })).await;
        let sets = body["sets"].as_array().unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0]["Head"], "Hat");
        assert_eq!(sets[0]["Jewel1"], "RingA");
        assert_eq!(sets[0]["Jewel2"], "RingB");

        let none = post("/sets/sample", json!({ "input": ALL_NAMES, "spells": ["void"] })).await;
        assert!(none["sets"].as_array().unwrap().is_empty());
    }
}
