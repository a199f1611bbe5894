use crate::element::ElementRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ConnectionId = u16;
pub type RoomId = String;
pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
    Unspecified,
}

impl Default for Role {
    fn default() -> Self {
        Role::Unspecified
    }
}

/// The two server variants shipped different `whiteboard-clear` payloads: a
/// bare room-id string and a structured object. Both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClearScope {
    Bare(RoomId),
    Structured {
        #[serde(rename = "roomID")]
        room_id: RoomId,
    },
}

impl ClearScope {
    pub fn room_id(&self) -> &RoomId {
        match self {
            ClearScope::Bare(room_id) => room_id,
            ClearScope::Structured { room_id } => room_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePayload {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "fileType")]
    pub file_type: String,
    #[serde(rename = "fileData")]
    pub file_data: Value,
}

/// Inbound events. Field names are the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "join-room")]
    JoinRoom {
        #[serde(rename = "roomID")]
        room_id: RoomId,
        #[serde(rename = "userID")]
        user_id: UserId,
        #[serde(default)]
        role: Role,
    },
    #[serde(rename = "element-update")]
    ElementUpdate {
        #[serde(rename = "elementData")]
        element_data: ElementRecord,
        #[serde(rename = "roomID")]
        room_id: RoomId,
    },
    #[serde(rename = "element-removal")]
    ElementRemoval {
        #[serde(rename = "elementId")]
        element_id: String,
        #[serde(rename = "roomID")]
        room_id: RoomId,
    },
    #[serde(rename = "elements-update")]
    ElementsUpdate {
        elements: Vec<ElementRecord>,
        #[serde(rename = "roomID")]
        room_id: RoomId,
    },
    #[serde(rename = "whiteboard-clear")]
    WhiteboardClear(ClearScope),
    #[serde(rename = "cursor-position")]
    CursorPosition {
        #[serde(rename = "cursorData")]
        cursor_data: Value,
        #[serde(rename = "roomID")]
        room_id: RoomId,
    },
    #[serde(rename = "share-website")]
    ShareWebsite {
        #[serde(rename = "websiteUrl")]
        website_url: String,
        #[serde(rename = "roomID")]
        room_id: RoomId,
        #[serde(rename = "userID")]
        user_id: UserId,
    },
    #[serde(rename = "website-closed")]
    WebsiteClosed {
        #[serde(rename = "roomID")]
        room_id: RoomId,
        #[serde(rename = "userID")]
        user_id: UserId,
    },
    #[serde(rename = "student-sleeping")]
    StudentSleeping {
        #[serde(rename = "userID")]
        user_id: UserId,
        #[serde(rename = "roomID")]
        room_id: RoomId,
    },
    #[serde(rename = "quiz")]
    Quiz {
        #[serde(rename = "correctAnswer")]
        correct_answer: Value,
        #[serde(rename = "roomID")]
        room_id: RoomId,
    },
    #[serde(rename = "message")]
    Message {
        #[serde(rename = "roomID")]
        room_id: RoomId,
        #[serde(rename = "compressedMessage")]
        compressed_message: Value,
    },
    #[serde(rename = "file")]
    File {
        #[serde(rename = "roomID")]
        room_id: RoomId,
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "fileType")]
        file_type: String,
        #[serde(rename = "fileData")]
        file_data: Value,
    },
    #[serde(rename = "audioStream")]
    AudioStream {
        #[serde(rename = "audioData")]
        audio_data: Value,
        #[serde(rename = "roomID")]
        room_id: RoomId,
    },
    #[serde(rename = "get-definition")]
    GetDefinition {
        question: String,
        #[serde(rename = "userID")]
        user_id: UserId,
    },
}

/// Outbound events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "whiteboard-state")]
    WhiteboardState { elements: Vec<ElementRecord> },
    #[serde(rename = "user-joined")]
    UserJoined {
        #[serde(rename = "userID")]
        user_id: UserId,
        role: Role,
    },
    #[serde(rename = "element-update")]
    ElementUpdate(ElementRecord),
    #[serde(rename = "element-removal")]
    ElementRemoval {
        #[serde(rename = "elementId")]
        element_id: String,
    },
    #[serde(rename = "elements-updated")]
    ElementsUpdated(Vec<u8>),
    #[serde(rename = "whiteboard-clear")]
    WhiteboardClear,
    #[serde(rename = "cursor-position")]
    CursorPosition(Value),
    #[serde(rename = "website-shared")]
    WebsiteShared {
        #[serde(rename = "websiteUrl")]
        website_url: String,
        #[serde(rename = "userID")]
        user_id: UserId,
    },
    #[serde(rename = "website-share-error")]
    WebsiteShareError { error: String },
    #[serde(rename = "website-closed")]
    WebsiteClosed {
        #[serde(rename = "userID")]
        user_id: UserId,
        #[serde(rename = "roomID")]
        room_id: RoomId,
    },
    #[serde(rename = "student-sleeping")]
    StudentSleeping(UserId),
    #[serde(rename = "quiz")]
    Quiz {
        #[serde(rename = "correctAnswer")]
        correct_answer: Value,
    },
    #[serde(rename = "message")]
    Message(Value),
    #[serde(rename = "file-media")]
    FileMedia(Vec<u8>),
    #[serde(rename = "file-url")]
    FileUrl(FilePayload),
    #[serde(rename = "file-other")]
    FileOther(Vec<u8>),
    #[serde(rename = "file-received")]
    FileReceived(FilePayload),
    #[serde(rename = "got-definition")]
    GotDefinition {
        #[serde(rename = "formattedAnswer")]
        formatted_answer: String,
    },
    #[serde(rename = "definition-error")]
    DefinitionError { error: String },
    #[serde(rename = "audioStream")]
    AudioStream {
        #[serde(rename = "audioData")]
        audio_data: Value,
    },
    #[serde(rename = "user-disconnected")]
    UserDisconnected {
        #[serde(rename = "userID")]
        user_id: UserId,
        role: Role,
    },
    #[serde(rename = "unauthorized")]
    Unauthorized { action: String },
}
