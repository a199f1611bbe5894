use actix_cors::Cors;
use actix_web::{App, HttpServer};

use server::handlers;
use server::server::{spawn_server, ServerConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = match std::env::var("WHITEBOARD_POLICY").as_deref() {
        Ok("role-gated") => ServerConfig::role_gated(),
        _ => ServerConfig::open(),
    };
    let srv_tx = spawn_server(config);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3003);
    log::info!("listening on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:3001")
            .allowed_methods(vec!["GET", "POST"])
            .allowed_header(actix_web::http::header::CONTENT_TYPE);

        App::new()
            .wrap(cors)
            .data(srv_tx.clone())
            .configure(handlers::root)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
