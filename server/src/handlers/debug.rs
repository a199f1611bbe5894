use actix_web::{web, HttpResponse, Responder};
use tokio::sync::oneshot;
use whiteboard::serde_json::{json, Map, Value};

use crate::connection::ConnectionCommand;
use crate::server::ServerTx;

pub fn configure_debug_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/debug/rooms").route(web::get().to(get_rooms)));
}

async fn get_rooms(
    srv_tx: web::Data<ServerTx>,
) -> Result<impl Responder, actix_web::error::Error> {
    let (tx, rx) = oneshot::channel();
    let mut srv_tx = srv_tx.get_ref().clone();
    if srv_tx
        .send(ConnectionCommand::DescribeRooms { tx })
        .await
        .is_err()
    {
        return Ok(HttpResponse::ServiceUnavailable().finish());
    }

    match rx.await {
        Ok(descriptions) => {
            let mut stats = Map::new();
            for room in descriptions {
                stats.insert(
                    room.room_id.clone(),
                    json!({
                        "elementCount": room.element_count,
                        "userCount": room.user_count,
                        "users": room.users,
                    }),
                );
            }
            Ok(HttpResponse::Ok().json(Value::Object(stats)))
        }
        Err(_) => Ok(HttpResponse::ServiceUnavailable().finish()),
    }
}
