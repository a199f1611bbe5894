use std::num::Wrapping;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{channel, Sender};

use whiteboard::serde_json::{json, Value};
use whiteboard::{
    classify, pack, AuthorizationPolicy, ClientEvent, ConnectionId, FileCategory, FilePayload,
    OpenPolicy, RoleGatedPolicy, RoomId, ServerEvent,
};

use super::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::ConnectionTxStorage;
use crate::definition::{format_answer, DefinitionOracle, OracleError};
use crate::room_registry::RoomRegistry;

pub type ServerTx = Sender<ConnectionCommand>;

pub struct ServerConfig {
    pub policy: Box<dyn AuthorizationPolicy>,
    /// The role-gated variant reflects `whiteboard-clear` back to the sender;
    /// the open variant does not.
    pub clear_includes_sender: bool,
    /// Rejected mutations are dropped silently by default. Enable to send
    /// an `unauthorized` event to the sender instead.
    pub notify_rejections: bool,
    pub oracle: Option<Arc<dyn DefinitionOracle>>,
    pub oracle_timeout: Duration,
}

impl ServerConfig {
    pub fn open() -> Self {
        Self {
            policy: Box::new(OpenPolicy),
            clear_includes_sender: false,
            notify_rejections: false,
            oracle: None,
            oracle_timeout: Duration::from_secs(10),
        }
    }

    pub fn role_gated() -> Self {
        Self {
            policy: Box::new(RoleGatedPolicy),
            clear_includes_sender: true,
            notify_rejections: false,
            oracle: None,
            oracle_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn DefinitionOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }
}

struct Server {
    registry: RoomRegistry,
    connections: ConnectionTxStorage,
    connection_id_source: Wrapping<ConnectionId>,
    config: ServerConfig,
    tx: ServerTx,
}

impl Server {
    fn new(config: ServerConfig, tx: ServerTx) -> Self {
        Self {
            registry: RoomRegistry::new(),
            connections: ConnectionTxStorage::new(),
            connection_id_source: Wrapping(0),
            config,
            tx,
        }
    }

    async fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => {
                let connection_id = self.new_connection_id();
                self.connections.insert(connection_id, tx);
                self.connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id })
                    .await;
            }
            ConnectionCommand::Disconnect { from } => {
                self.connections.remove(&from);
                if let Some((room_id, user_id, role)) = self.registry.remove_member(from) {
                    log::info!("user {} disconnected from room {}", user_id, room_id);
                    self.broadcast_room_event(
                        &room_id,
                        ServerEvent::UserDisconnected { user_id, role },
                        None,
                    )
                    .await;
                }
            }
            ConnectionCommand::ClientEvent { from, event } => {
                self.handle_client_event(from, event).await;
            }
            ConnectionCommand::DefinitionReady { from, result } => {
                if !self.connections.contains(&from) {
                    log::debug!(
                        "discarding definition result for departed connection {}",
                        from
                    );
                    return;
                }
                let event = match result {
                    Ok(answer) => ServerEvent::GotDefinition {
                        formatted_answer: format_answer(&answer),
                    },
                    Err(e) => ServerEvent::DefinitionError {
                        error: e.to_string(),
                    },
                };
                self.send_to(from, event).await;
            }
            ConnectionCommand::DescribeRooms { tx } => {
                let _ = tx.send(self.registry.describe());
            }
        }
    }

    async fn handle_client_event(&mut self, from: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::JoinRoom {
                room_id,
                user_id,
                role,
            } => {
                self.registry
                    .add_member(&room_id, user_id.clone(), role, from);
                let elements = self
                    .registry
                    .get(&room_id)
                    .map(|room| room.elements.snapshot().to_vec())
                    .unwrap_or_default();
                log::info!(
                    "user {} joined room {} ({} elements)",
                    user_id,
                    room_id,
                    elements.len()
                );
                self.send_to(from, ServerEvent::WhiteboardState { elements })
                    .await;
                self.broadcast_room_event(&room_id, ServerEvent::UserJoined { user_id, role }, None)
                    .await;
            }
            ClientEvent::ElementUpdate {
                element_data,
                room_id,
            } => {
                let role = self.registry.get_or_create(&room_id).role_of(from);
                if !self.config.policy.can_edit(role, &element_data) {
                    self.reject(from, "element-update").await;
                    return;
                }
                self.registry
                    .get_or_create(&room_id)
                    .elements
                    .upsert(element_data.clone());
                self.broadcast_room_event(
                    &room_id,
                    ServerEvent::ElementUpdate(element_data),
                    Some(from),
                )
                .await;
            }
            ClientEvent::ElementRemoval {
                element_id,
                room_id,
            } => {
                self.registry
                    .get_or_create(&room_id)
                    .elements
                    .remove(&element_id);
                // removal is authoritative and reflects back to the sender
                self.broadcast_room_event(&room_id, ServerEvent::ElementRemoval { element_id }, None)
                    .await;
            }
            ClientEvent::ElementsUpdate { elements, room_id } => {
                self.registry
                    .get_or_create(&room_id)
                    .elements
                    .replace_all(elements.clone());
                match pack(&elements) {
                    Ok(bytes) => {
                        self.broadcast_room_event(
                            &room_id,
                            ServerEvent::ElementsUpdated(bytes),
                            Some(from),
                        )
                        .await;
                    }
                    Err(e) => log::error!("failed to pack bulk update: {}", e),
                }
            }
            ClientEvent::WhiteboardClear(scope) => {
                let room_id = scope.room_id().clone();
                let role = self.registry.get_or_create(&room_id).role_of(from);
                if !self.config.policy.can_clear(role) {
                    self.reject(from, "whiteboard-clear").await;
                    return;
                }
                self.registry.get_or_create(&room_id).elements.clear();
                log::info!("cleared all elements from room {}", room_id);
                let without = if self.config.clear_includes_sender {
                    None
                } else {
                    Some(from)
                };
                self.broadcast_room_event(&room_id, ServerEvent::WhiteboardClear, without)
                    .await;
            }
            ClientEvent::CursorPosition {
                mut cursor_data,
                room_id,
            } => {
                if let Value::Object(map) = &mut cursor_data {
                    map.insert("userId".to_string(), json!(from));
                }
                self.broadcast_room_event(
                    &room_id,
                    ServerEvent::CursorPosition(cursor_data),
                    Some(from),
                )
                .await;
            }
            ClientEvent::ShareWebsite {
                website_url,
                room_id,
                user_id,
            } => match url::Url::parse(&website_url) {
                Ok(_) => {
                    log::info!("user {} is sharing a website in room {}", user_id, room_id);
                    self.broadcast_room_event(
                        &room_id,
                        ServerEvent::WebsiteShared {
                            website_url,
                            user_id,
                        },
                        Some(from),
                    )
                    .await;
                }
                Err(e) => {
                    log::warn!("invalid website URL: {}", e);
                    self.send_to(
                        from,
                        ServerEvent::WebsiteShareError {
                            error: "Invalid URL format".into(),
                        },
                    )
                    .await;
                }
            },
            ClientEvent::WebsiteClosed { room_id, user_id } => {
                self.broadcast_room_event(
                    &room_id,
                    ServerEvent::WebsiteClosed {
                        user_id,
                        room_id: room_id.clone(),
                    },
                    None,
                )
                .await;
            }
            ClientEvent::StudentSleeping { user_id, room_id } => {
                self.broadcast_room_event(&room_id, ServerEvent::StudentSleeping(user_id), Some(from))
                    .await;
            }
            ClientEvent::Quiz {
                correct_answer,
                room_id,
            } => {
                self.broadcast_room_event(&room_id, ServerEvent::Quiz { correct_answer }, Some(from))
                    .await;
            }
            ClientEvent::Message {
                room_id,
                compressed_message,
            } => {
                self.broadcast_room_event(&room_id, ServerEvent::Message(compressed_message), Some(from))
                    .await;
            }
            ClientEvent::File {
                room_id,
                file_name,
                file_type,
                file_data,
            } => {
                let payload = FilePayload {
                    file_name,
                    file_type,
                    file_data,
                };
                log::info!(
                    "file transfer - name: {}, type: {}, room: {}",
                    payload.file_name,
                    payload.file_type,
                    room_id
                );
                let primary = match classify(&payload.file_type, &payload.file_name) {
                    FileCategory::Media => pack(&payload).map(ServerEvent::FileMedia),
                    FileCategory::TextOrUrl => Ok(ServerEvent::FileUrl(payload.clone())),
                    FileCategory::Other => pack(&payload).map(ServerEvent::FileOther),
                };
                match primary {
                    Ok(event) => {
                        self.broadcast_room_event(&room_id, event, Some(from)).await;
                    }
                    Err(e) => log::error!("failed to pack file payload: {}", e),
                }
                // compatibility path for receivers without decompression
                self.broadcast_room_event(&room_id, ServerEvent::FileReceived(payload), Some(from))
                    .await;
            }
            ClientEvent::AudioStream {
                audio_data,
                room_id,
            } => {
                self.broadcast_room_event(&room_id, ServerEvent::AudioStream { audio_data }, Some(from))
                    .await;
            }
            ClientEvent::GetDefinition { question, user_id } => {
                log::info!("definition requested by {}", user_id);
                match self.config.oracle.clone() {
                    Some(oracle) => {
                        let timeout = self.config.oracle_timeout;
                        let mut tx = self.tx.clone();
                        let fut = oracle.query(&question);
                        tokio::spawn(async move {
                            let result = match tokio::time::timeout(timeout, fut).await {
                                Ok(result) => result,
                                Err(_) => Err(OracleError::Timeout),
                            };
                            let _ = tx
                                .send(ConnectionCommand::DefinitionReady { from, result })
                                .await;
                        });
                    }
                    None => {
                        self.send_to(
                            from,
                            ServerEvent::DefinitionError {
                                error: "definition service is not configured".into(),
                            },
                        )
                        .await;
                    }
                }
            }
        }
    }

    async fn broadcast_room_event(
        &mut self,
        room_id: &RoomId,
        event: ServerEvent,
        without: Option<ConnectionId>,
    ) {
        let targets: Vec<ConnectionId> = match self.registry.get(room_id) {
            Some(room) => room
                .members
                .iter()
                .map(|m| m.connection_id)
                .filter(|id| without != Some(*id))
                .collect(),
            None => return,
        };
        for connection_id in targets {
            self.connections
                .send(&connection_id, ConnectionEvent::ServerEvent(event.clone()))
                .await;
        }
    }

    async fn send_to(&mut self, to: ConnectionId, event: ServerEvent) {
        self.connections
            .send(&to, ConnectionEvent::ServerEvent(event))
            .await;
    }

    async fn reject(&mut self, from: ConnectionId, action: &str) {
        log::debug!("rejected {} from connection {}", action, from);
        if self.config.notify_rejections {
            self.send_to(
                from,
                ServerEvent::Unauthorized {
                    action: action.into(),
                },
            )
            .await;
        }
    }

    fn new_connection_id(&mut self) -> ConnectionId {
        self.connection_id_source += Wrapping(1);
        self.connection_id_source.0
    }
}

pub fn spawn_server(config: ServerConfig) -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ConnectionCommand>(64);
    let loop_tx = srv_tx.clone();

    tokio::spawn(async move {
        let mut server = Box::new(Server::new(config, loop_tx));

        while let Some(command) = srv_rx.recv().await {
            server.handle_connection_command(command).await;
        }
    });

    srv_tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::OracleFuture;
    use tokio::sync::mpsc::Receiver;
    use whiteboard::{unpack, ClearScope, ElementRecord, Role};

    fn test_server(config: ServerConfig) -> (Server, Receiver<ConnectionCommand>) {
        let (tx, rx) = channel(64);
        (Server::new(config, tx), rx)
    }

    fn client(from: ConnectionId, event: ClientEvent) -> ConnectionCommand {
        ConnectionCommand::ClientEvent { from, event }
    }

    async fn connect(server: &mut Server) -> (ConnectionId, Receiver<ConnectionEvent>) {
        let (tx, mut rx) = channel(64);
        server
            .handle_connection_command(ConnectionCommand::Connect { tx })
            .await;
        match rx.recv().await {
            Some(ConnectionEvent::Connected { connection_id }) => (connection_id, rx),
            other => panic!("expected Connected, got {:?}", other),
        }
    }

    async fn join(server: &mut Server, from: ConnectionId, room: &str, user: &str, role: Role) {
        server
            .handle_connection_command(client(
                from,
                ClientEvent::JoinRoom {
                    room_id: room.into(),
                    user_id: user.into(),
                    role,
                },
            ))
            .await;
    }

    async fn next_event(rx: &mut Receiver<ConnectionEvent>) -> ServerEvent {
        match rx.recv().await {
            Some(ConnectionEvent::ServerEvent(event)) => event,
            other => panic!("expected server event, got {:?}", other),
        }
    }

    fn drain(rx: &mut Receiver<ConnectionEvent>) {
        while rx.try_recv().is_ok() {}
    }

    fn assert_silent(rx: &mut Receiver<ConnectionEvent>) {
        assert!(rx.try_recv().is_err());
    }

    async fn room_with_two(
        server: &mut Server,
    ) -> (
        ConnectionId,
        Receiver<ConnectionEvent>,
        ConnectionId,
        Receiver<ConnectionEvent>,
    ) {
        let (c1, mut rx1) = connect(server).await;
        join(server, c1, "r1", "u1", Role::Unspecified).await;
        let (c2, mut rx2) = connect(server).await;
        join(server, c2, "r1", "u2", Role::Unspecified).await;
        drain(&mut rx1);
        drain(&mut rx2);
        (c1, rx1, c2, rx2)
    }

    #[tokio::test]
    async fn it_hydrates_a_joining_connection_with_the_room_snapshot() {
        let (mut server, _cmd_rx) = test_server(ServerConfig::open());

        let (c1, mut rx1) = connect(&mut server).await;
        join(&mut server, c1, "r1", "u1", Role::Unspecified).await;
        match next_event(&mut rx1).await {
            ServerEvent::WhiteboardState { elements } => assert!(elements.is_empty()),
            other => panic!("unexpected event: {:?}", other),
        }
        match next_event(&mut rx1).await {
            ServerEvent::UserJoined { user_id, .. } => assert_eq!(user_id, "u1"),
            other => panic!("unexpected event: {:?}", other),
        }

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::ElementUpdate {
                    element_data: ElementRecord::new("A", "stroke"),
                    room_id: "r1".into(),
                },
            ))
            .await;

        let (c2, mut rx2) = connect(&mut server).await;
        join(&mut server, c2, "r1", "u2", Role::Unspecified).await;
        match next_event(&mut rx2).await {
            ServerEvent::WhiteboardState { elements } => {
                assert_eq!(elements.len(), 1);
                assert_eq!(elements[0].id, "A");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        // the presence notice reaches the existing member too
        match next_event(&mut rx1).await {
            ServerEvent::UserJoined { user_id, .. } => assert_eq!(user_id, "u2"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn it_echoes_removals_but_not_updates() {
        let (mut server, _cmd_rx) = test_server(ServerConfig::open());
        let (c1, mut rx1, _c2, mut rx2) = room_with_two(&mut server).await;

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::ElementUpdate {
                    element_data: ElementRecord::new("A", "stroke"),
                    room_id: "r1".into(),
                },
            ))
            .await;
        match next_event(&mut rx2).await {
            ServerEvent::ElementUpdate(record) => assert_eq!(record.id, "A"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_silent(&mut rx1);

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::ElementRemoval {
                    element_id: "A".into(),
                    room_id: "r1".into(),
                },
            ))
            .await;
        for rx in &mut [&mut rx1, &mut rx2] {
            match next_event(rx).await {
                ServerEvent::ElementRemoval { element_id } => assert_eq!(element_id, "A"),
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn it_blocks_student_clears_in_the_role_gated_variant() {
        let (mut server, _cmd_rx) = test_server(ServerConfig::role_gated());

        let (teacher, mut teacher_rx) = connect(&mut server).await;
        join(&mut server, teacher, "r1", "t", Role::Teacher).await;
        let (student, mut student_rx) = connect(&mut server).await;
        join(&mut server, student, "r1", "s", Role::Student).await;

        server
            .handle_connection_command(client(
                teacher,
                ClientEvent::ElementUpdate {
                    element_data: ElementRecord::new("A", "stroke"),
                    room_id: "r1".into(),
                },
            ))
            .await;
        drain(&mut teacher_rx);
        drain(&mut student_rx);

        server
            .handle_connection_command(client(
                student,
                ClientEvent::WhiteboardClear(ClearScope::Bare("r1".into())),
            ))
            .await;
        assert_eq!(
            server.registry.get(&"r1".to_string()).expect("room").elements.len(),
            1
        );
        assert_silent(&mut teacher_rx);
        assert_silent(&mut student_rx);

        server
            .handle_connection_command(client(
                teacher,
                ClientEvent::WhiteboardClear(ClearScope::Bare("r1".into())),
            ))
            .await;
        assert!(server
            .registry
            .get(&"r1".to_string())
            .expect("room")
            .elements
            .is_empty());
        // the role-gated variant echoes the clear back to the sender
        for rx in &mut [&mut teacher_rx, &mut student_rx] {
            match next_event(rx).await {
                ServerEvent::WhiteboardClear => {}
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn it_blocks_student_edits_without_the_override_flag() {
        let (mut server, _cmd_rx) = test_server(ServerConfig::role_gated());

        let (teacher, mut teacher_rx) = connect(&mut server).await;
        join(&mut server, teacher, "r1", "t", Role::Teacher).await;
        let (student, mut student_rx) = connect(&mut server).await;
        join(&mut server, student, "r1", "s", Role::Student).await;
        drain(&mut teacher_rx);
        drain(&mut student_rx);

        server
            .handle_connection_command(client(
                student,
                ClientEvent::ElementUpdate {
                    element_data: ElementRecord::new("A", "stroke"),
                    room_id: "r1".into(),
                },
            ))
            .await;
        assert!(server
            .registry
            .get(&"r1".to_string())
            .expect("room")
            .elements
            .is_empty());
        assert_silent(&mut teacher_rx);

        let overridable = ElementRecord::new("B", "stroke")
            .with_attr("allowStudentEdit", json!(true));
        server
            .handle_connection_command(client(
                student,
                ClientEvent::ElementUpdate {
                    element_data: overridable,
                    room_id: "r1".into(),
                },
            ))
            .await;
        match next_event(&mut teacher_rx).await {
            ServerEvent::ElementUpdate(record) => assert_eq!(record.id, "B"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn it_does_not_echo_clears_in_the_open_variant() {
        let (mut server, _cmd_rx) = test_server(ServerConfig::open());
        let (c1, mut rx1, _c2, mut rx2) = room_with_two(&mut server).await;

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::WhiteboardClear(ClearScope::Structured {
                    room_id: "r1".into(),
                }),
            ))
            .await;
        match next_event(&mut rx2).await {
            ServerEvent::WhiteboardClear => {}
            other => panic!("unexpected event: {:?}", other),
        }
        assert_silent(&mut rx1);
    }

    #[tokio::test]
    async fn it_broadcasts_a_departure_exactly_once() {
        let (mut server, _cmd_rx) = test_server(ServerConfig::open());
        let (c1, _rx1, _c2, mut rx2) = room_with_two(&mut server).await;

        server
            .handle_connection_command(ConnectionCommand::Disconnect { from: c1 })
            .await;
        match next_event(&mut rx2).await {
            ServerEvent::UserDisconnected { user_id, .. } => assert_eq!(user_id, "u1"),
            other => panic!("unexpected event: {:?}", other),
        }

        // a second disconnect of the same connection is a no-op
        server
            .handle_connection_command(ConnectionCommand::Disconnect { from: c1 })
            .await;
        assert_silent(&mut rx2);
    }

    #[tokio::test]
    async fn it_rejects_malformed_website_urls_to_the_sender_only() {
        let (mut server, _cmd_rx) = test_server(ServerConfig::open());
        let (c1, mut rx1, _c2, mut rx2) = room_with_two(&mut server).await;

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::ShareWebsite {
                    website_url: "not a url".into(),
                    room_id: "r1".into(),
                    user_id: "u1".into(),
                },
            ))
            .await;
        match next_event(&mut rx1).await {
            ServerEvent::WebsiteShareError { error } => assert_eq!(error, "Invalid URL format"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_silent(&mut rx2);

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::ShareWebsite {
                    website_url: "https://example.com/lesson".into(),
                    room_id: "r1".into(),
                    user_id: "u1".into(),
                },
            ))
            .await;
        match next_event(&mut rx2).await {
            ServerEvent::WebsiteShared { website_url, .. } => {
                assert_eq!(website_url, "https://example.com/lesson")
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_silent(&mut rx1);
    }

    #[tokio::test]
    async fn it_annotates_cursor_updates_with_the_sender_connection() {
        let (mut server, _cmd_rx) = test_server(ServerConfig::open());
        let (c1, mut rx1, _c2, mut rx2) = room_with_two(&mut server).await;

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::CursorPosition {
                    cursor_data: json!({ "x": 1, "y": 2 }),
                    room_id: "r1".into(),
                },
            ))
            .await;
        match next_event(&mut rx2).await {
            ServerEvent::CursorPosition(data) => {
                assert_eq!(data["x"], json!(1));
                assert_eq!(data["userId"], json!(c1));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_silent(&mut rx1);
    }

    #[tokio::test]
    async fn it_compresses_media_files_and_sends_the_fallback_copy() {
        let (mut server, _cmd_rx) = test_server(ServerConfig::open());
        let (c1, mut rx1, _c2, mut rx2) = room_with_two(&mut server).await;

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::File {
                    room_id: "r1".into(),
                    file_name: "photo.png".into(),
                    file_type: "image/png".into(),
                    file_data: json!("aGVsbG8="),
                },
            ))
            .await;

        match next_event(&mut rx2).await {
            ServerEvent::FileMedia(bytes) => {
                let payload: FilePayload = unpack(&bytes).expect("unpack");
                assert_eq!(payload.file_name, "photo.png");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match next_event(&mut rx2).await {
            ServerEvent::FileReceived(payload) => assert_eq!(payload.file_type, "image/png"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_silent(&mut rx1);
    }

    #[tokio::test]
    async fn it_sends_text_files_uncompressed() {
        let (mut server, _cmd_rx) = test_server(ServerConfig::open());
        let (c1, _rx1, _c2, mut rx2) = room_with_two(&mut server).await;

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::File {
                    room_id: "r1".into(),
                    file_name: "notes.txt".into(),
                    file_type: "text/plain".into(),
                    file_data: json!("hello"),
                },
            ))
            .await;

        match next_event(&mut rx2).await {
            ServerEvent::FileUrl(payload) => assert_eq!(payload.file_name, "notes.txt"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    struct StaticOracle;

    impl DefinitionOracle for StaticOracle {
        fn query(&self, question: &str) -> OracleFuture {
            let question = question.to_string();
            Box::pin(async move { Ok(format!("{} means something simple", question)) })
        }
    }

    #[tokio::test]
    async fn it_delivers_definitions_to_the_requester_only() {
        let config = ServerConfig::open().with_oracle(Arc::new(StaticOracle));
        let (mut server, mut cmd_rx) = test_server(config);
        let (c1, mut rx1, _c2, mut rx2) = room_with_two(&mut server).await;

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::GetDefinition {
                    question: "gravity".into(),
                    user_id: "u1".into(),
                },
            ))
            .await;

        // the lookup runs as an independent task and re-enters the loop
        let ready = cmd_rx.recv().await.expect("definition result");
        server.handle_connection_command(ready).await;

        match next_event(&mut rx1).await {
            ServerEvent::GotDefinition { formatted_answer } => {
                assert!(formatted_answer.starts_with("gravity"))
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_silent(&mut rx2);
    }

    #[tokio::test]
    async fn it_discards_definition_results_for_departed_sessions() {
        let config = ServerConfig::open().with_oracle(Arc::new(StaticOracle));
        let (mut server, mut cmd_rx) = test_server(config);
        let (c1, rx1, _c2, mut rx2) = room_with_two(&mut server).await;

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::GetDefinition {
                    question: "gravity".into(),
                    user_id: "u1".into(),
                },
            ))
            .await;
        drop(rx1);
        server
            .handle_connection_command(ConnectionCommand::Disconnect { from: c1 })
            .await;
        drain(&mut rx2);

        let ready = cmd_rx.recv().await.expect("definition result");
        server.handle_connection_command(ready).await;
        assert_silent(&mut rx2);
        assert!(!server.connections.contains(&c1));
    }

    #[tokio::test]
    async fn it_reports_definition_failures_as_events() {
        struct FailingOracle;

        impl DefinitionOracle for FailingOracle {
            fn query(&self, _question: &str) -> OracleFuture {
                Box::pin(async { Err(OracleError::Provider("boom".into())) })
            }
        }

        let config = ServerConfig::open().with_oracle(Arc::new(FailingOracle));
        let (mut server, mut cmd_rx) = test_server(config);
        let (c1, mut rx1, _c2, _rx2) = room_with_two(&mut server).await;

        server
            .handle_connection_command(client(
                c1,
                ClientEvent::GetDefinition {
                    question: "gravity".into(),
                    user_id: "u1".into(),
                },
            ))
            .await;
        let ready = cmd_rx.recv().await.expect("definition result");
        server.handle_connection_command(ready).await;

        match next_event(&mut rx1).await {
            ServerEvent::DefinitionError { error } => assert!(error.contains("boom")),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn it_notifies_rejections_when_configured() {
        let mut config = ServerConfig::role_gated();
        config.notify_rejections = true;
        let (mut server, _cmd_rx) = test_server(config);

        let (student, mut student_rx) = connect(&mut server).await;
        join(&mut server, student, "r1", "s", Role::Student).await;
        drain(&mut student_rx);

        server
            .handle_connection_command(client(
                student,
                ClientEvent::WhiteboardClear(ClearScope::Bare("r1".into())),
            ))
            .await;
        match next_event(&mut student_rx).await {
            ServerEvent::Unauthorized { action } => assert_eq!(action, "whiteboard-clear"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
