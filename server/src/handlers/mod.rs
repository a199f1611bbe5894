use crate::connection::ws_index;
use crate::handlers::debug::configure_debug_handlers;
use crate::handlers::rooms::configure_room_handlers;
use actix_web::web;

mod debug;
mod rooms;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws/").route(web::get().to(ws_index)));

    configure_room_handlers(cfg);
    configure_debug_handlers(cfg);
}
