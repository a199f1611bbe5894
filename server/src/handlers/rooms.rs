use actix_web::{web, HttpResponse, Responder};
use whiteboard::serde_json::json;
use whiteboard::uuid::Uuid;
use whiteboard::Role;

use serde::Deserialize;

pub fn configure_room_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/generate-room").route(web::get().to(generate_room)))
        .service(web::resource("/validate-room").route(web::post().to(validate_room)));
}

fn fresh_id() -> String {
    Uuid::new_v4().to_simple().to_string()
}

async fn generate_room() -> Result<impl Responder, actix_web::error::Error> {
    Ok(HttpResponse::Ok().json(json!({ "roomID": fresh_id() })))
}

#[derive(Deserialize)]
struct ValidateRequest {
    #[serde(rename = "roomID")]
    room_id: String,
    #[serde(rename = "userID")]
    user_id: Option<String>,
    #[serde(default)]
    role: Role,
}

async fn validate_room(
    body: web::Json<ValidateRequest>,
) -> Result<impl Responder, actix_web::error::Error> {
    let request = body.into_inner();
    Ok(HttpResponse::Ok().json(json!({
        "valid": true,
        "roomID": request.room_id,
        "userID": request.user_id.unwrap_or_else(fresh_id),
        "role": request.role,
    })))
}
