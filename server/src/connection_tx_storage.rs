use crate::connection::ConnectionEvent;
use std::collections::HashMap;
use whiteboard::ConnectionId;

pub type ConnectionTx = tokio::sync::mpsc::Sender<ConnectionEvent>;

pub struct ConnectionTxStorage {
    connection_txs: HashMap<ConnectionId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connection_txs.contains_key(connection_id)
    }

    pub async fn send(&mut self, to: &ConnectionId, message: ConnectionEvent) {
        if let Some(tx) = self.connection_txs.get_mut(to) {
            if tx.send(message).await.is_err() {
                log::warn!("connection {} dropped its receiver", to);
            }
        }
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connection_txs.remove(connection_id)
    }
}
