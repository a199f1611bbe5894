pub extern crate serde;
pub extern crate serde_json;
pub extern crate uuid;

mod classify;
mod codec;
mod element;
mod message;
mod policy;

pub use classify::{classify, FileCategory};
pub use codec::{pack, unpack, CodecError};
pub use element::{ElementRecord, ElementStore};
pub use message::{
    ClearScope, ClientEvent, ConnectionId, FilePayload, Role, RoomId, ServerEvent, UserId,
};
pub use policy::{AuthorizationPolicy, OpenPolicy, RoleGatedPolicy};
