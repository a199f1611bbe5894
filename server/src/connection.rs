use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use whiteboard::{ClientEvent, ConnectionId, ServerEvent};

use crate::connection_tx_storage::ConnectionTx;
use crate::definition::OracleError;
use crate::room_registry::RoomDescription;
use crate::server::ServerTx;

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    ClientEvent {
        from: ConnectionId,
        event: ClientEvent,
    },
    DefinitionReady {
        from: ConnectionId,
        result: Result<String, OracleError>,
    },
    DescribeRooms {
        tx: tokio::sync::oneshot::Sender<Vec<RoomDescription>>,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected { connection_id: ConnectionId },
    ServerEvent(ServerEvent),
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

enum ConnectionState {
    Idle,
    Connected(ConnectionId),
}

struct ConnectionActor {
    state: ConnectionState,
    srv_tx: ServerTx,
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(32);

        self.srv_tx
            .try_send(ConnectionCommand::Connect { tx })
            .expect("server must not be not closed yet");

        let addr = ctx.address().recipient();

        tokio::spawn(async move {
            let addr = addr;
            log::info!("connection green thread - started");
            while let Some(msg) = rx.recv().await {
                addr.try_send(ConnectionActorMessage(msg))
                    .expect("should have enough buffer")
            }
            log::info!("connection green thread - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let ConnectionState::Connected(id) = self.state {
            self.srv_tx
                .try_send(ConnectionCommand::Disconnect { from: id })
                .expect("should have enough buffer");
        }

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => {
                if let ConnectionState::Connected(from) = self.state {
                    match whiteboard::serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => {
                            log::debug!("Ingress {:?}", event);
                            self.srv_tx
                                .try_send(ConnectionCommand::ClientEvent { from, event })
                                .expect("should have enough buffer");
                        }
                        // A bad frame never terminates the connection.
                        Err(e) => log::warn!("dropping malformed frame: {}", e),
                    }
                }
            }
            Ok(ws::Message::Close(_)) => {
                if let ConnectionState::Connected(id) = self.state {
                    self.srv_tx
                        .try_send(ConnectionCommand::Disconnect { from: id })
                        .expect("should have enough buffer");
                }
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        let connection_event = &msg.0;
        log::debug!("Egress {:?}", connection_event);
        match connection_event {
            ConnectionEvent::Connected { connection_id } => {
                self.state = ConnectionState::Connected(*connection_id);
            }
            ConnectionEvent::ServerEvent(event) => {
                let serialized =
                    whiteboard::serde_json::to_string(event).expect("must succeed");
                ctx.text(serialized);
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ConnectionActor {
            srv_tx: srv_tx.get_ref().clone(),
            state: ConnectionState::Idle,
        },
        &req,
        stream,
    )
}
