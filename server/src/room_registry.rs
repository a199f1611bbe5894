use serde::Serialize;
use std::collections::HashMap;
use whiteboard::{ConnectionId, ElementStore, Role, RoomId, UserId};

pub struct Member {
    pub user_id: UserId,
    pub role: Role,
    pub connection_id: ConnectionId,
}

pub struct Room {
    pub elements: ElementStore,
    pub members: Vec<Member>,
    /// Authoritative teacher connection for the role-gated variant; rebound
    /// when a teacher joins on a new connection.
    pub teacher_connection: Option<ConnectionId>,
}

impl Room {
    fn new() -> Self {
        Self {
            elements: ElementStore::new(),
            members: Vec::new(),
            teacher_connection: None,
        }
    }

    pub fn role_of(&self, connection_id: ConnectionId) -> Role {
        self.members
            .iter()
            .find(|m| m.connection_id == connection_id)
            .map(|m| m.role)
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct RoomDescription {
    #[serde(rename = "roomID")]
    pub room_id: RoomId,
    #[serde(rename = "elementCount")]
    pub element_count: usize,
    #[serde(rename = "userCount")]
    pub user_count: usize,
    pub users: Vec<UserId>,
}

/// Process-wide room table plus a user -> connection index for reconnect
/// rebinding. Rooms are created lazily on first reference and dropped as
/// soon as their last member leaves.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    user_index: HashMap<UserId, ConnectionId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            user_index: HashMap::new(),
        }
    }

    pub fn get_or_create(&mut self, room_id: &RoomId) -> &mut Room {
        if !self.rooms.contains_key(room_id) {
            log::info!("creating room {}", room_id);
            self.rooms.insert(room_id.clone(), Room::new());
        }
        self.rooms.get_mut(room_id).expect("room must exist")
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn add_member(
        &mut self,
        room_id: &RoomId,
        user_id: UserId,
        role: Role,
        connection_id: ConnectionId,
    ) {
        self.user_index.insert(user_id.clone(), connection_id);
        let room = self.get_or_create(room_id);
        // a rejoin supersedes the user's previous connection
        room.members.retain(|m| m.user_id != user_id);
        if role == Role::Teacher {
            room.teacher_connection = Some(connection_id);
        }
        room.members.push(Member {
            user_id,
            role,
            connection_id,
        });
    }

    /// Scans every room's membership for the connection. Disconnecting a
    /// connection that is not a member of any room is a silent no-op.
    pub fn remove_member(
        &mut self,
        connection_id: ConnectionId,
    ) -> Option<(RoomId, UserId, Role)> {
        let mut found = None;
        for (room_id, room) in self.rooms.iter() {
            if let Some(pos) = room
                .members
                .iter()
                .position(|m| m.connection_id == connection_id)
            {
                found = Some((room_id.clone(), pos));
                break;
            }
        }

        let (room_id, pos) = found?;
        let room = self.rooms.get_mut(&room_id).expect("room must exist");
        let member = room.members.remove(pos);
        if room.teacher_connection == Some(connection_id) {
            room.teacher_connection = None;
        }
        if self.user_index.get(&member.user_id) == Some(&connection_id) {
            self.user_index.remove(&member.user_id);
        }
        if room.members.is_empty() {
            log::info!("room {} is empty, dropping it", room_id);
            self.rooms.remove(&room_id);
        }
        Some((room_id, member.user_id, member.role))
    }

    pub fn connection_of(&self, user_id: &UserId) -> Option<ConnectionId> {
        self.user_index.get(user_id).copied()
    }

    pub fn describe(&self) -> Vec<RoomDescription> {
        self.rooms
            .iter()
            .map(|(room_id, room)| RoomDescription {
                room_id: room_id.clone(),
                element_count: room.elements.len(),
                user_count: room.members.len(),
                users: room.members.iter().map(|m| m.user_id.clone()).collect(),
            })
            .collect()
    }
}
