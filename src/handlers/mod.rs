use actix_web::{error, web, HttpResponse};
use log::warn;

use crate::models::ErrorResponse;

pub mod health;
pub mod items;
pub mod sets;

/// JSON extractor config: malformed bodies get a 400 with a JSON error
/// instead of actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        warn!("Rejected request body: {}", message);
        let response = HttpResponse::BadRequest().json(ErrorResponse {
            ok: false,
            error: message,
        });
        error::InternalError::from_response(err, response).into()
    })
}
