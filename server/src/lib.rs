pub extern crate actix_web;

pub mod connection;
mod connection_tx_storage;
pub mod definition;
pub mod handlers;
pub mod room_registry;
pub mod server;
