use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use sketchsync_shared::{ClientMessage, ServerMessage};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::BoardError;
use crate::identity::ConnectionId;
use crate::logic::{Audience, Board, Dispatch};
use crate::state::BoardConfig;

pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardStats {
    pub connections: usize,
    pub users: usize,
    pub remembered: usize,
    pub strokes: usize,
    pub history: usize,
}

pub enum BoardCommand {
    Connect {
        connection: ConnectionId,
        outbound: Outbound,
    },
    Message {
        connection: ConnectionId,
        message: ClientMessage,
    },
    Disconnect {
        connection: ConnectionId,
    },
    TrimHistory {
        reply: oneshot::Sender<usize>,
    },
    Stats {
        reply: oneshot::Sender<BoardStats>,
    },
    Shutdown,
}

#[derive(Clone)]
pub struct BoardHandle {
    commands: mpsc::UnboundedSender<BoardCommand>,
}

impl BoardHandle {
    pub fn connect(&self, connection: ConnectionId, outbound: Outbound) -> Result<(), BoardError> {
        self.send(BoardCommand::Connect {
            connection,
            outbound,
        })
    }

    pub fn submit(&self, connection: ConnectionId, message: ClientMessage) -> Result<(), BoardError> {
        self.send(BoardCommand::Message {
            connection,
            message,
        })
    }

    pub fn disconnect(&self, connection: ConnectionId) -> Result<(), BoardError> {
        self.send(BoardCommand::Disconnect { connection })
    }

    pub async fn trim_history(&self) -> Result<usize, BoardError> {
        let (reply, response) = oneshot::channel();
        self.send(BoardCommand::TrimHistory { reply })?;
        response.await.map_err(|_| BoardError::Closed)
    }

    pub async fn stats(&self) -> Result<BoardStats, BoardError> {
        let (reply, response) = oneshot::channel();
        self.send(BoardCommand::Stats { reply })?;
        response.await.map_err(|_| BoardError::Closed)
    }

    pub fn shutdown(&self) -> Result<(), BoardError> {
        self.send(BoardCommand::Shutdown)
    }

    fn send(&self, command: BoardCommand) -> Result<(), BoardError> {
        self.commands.send(command).map_err(|_| BoardError::Closed)
    }
}

pub fn spawn_board(config: BoardConfig) -> (BoardHandle, JoinHandle<()>) {
    let (commands, receiver) = mpsc::unbounded_channel();
    let actor = BoardActor {
        board: Board::new(&config),
        peers: HashMap::new(),
    };
    let task = tokio::spawn(actor.run(receiver));
    (BoardHandle { commands }, task)
}

pub fn spawn_trim_task(board: BoardHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            if board.trim_history().await.is_err() {
                break;
            }
        }
    })
}

struct BoardActor {
    board: Board,
    peers: HashMap<ConnectionId, Outbound>,
}

impl BoardActor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<BoardCommand>) {
        while let Some(command) = commands.recv().await {
            match command {
                BoardCommand::Connect {
                    connection,
                    outbound,
                } => {
                    self.peers.insert(connection, outbound);
                    debug!(conn = %connection, peers = self.peers.len(), "peer attached");
                }
                BoardCommand::Message {
                    connection,
                    message,
                } => {
                    if !self.peers.contains_key(&connection) {
                        continue;
                    }
                    let dispatches = self.board.apply(connection, message);
                    self.deliver(connection, dispatches);
                }
                BoardCommand::Disconnect { connection } => {
                    self.peers.remove(&connection);
                    let dispatches = self.board.disconnect(connection);
                    self.deliver(connection, dispatches);
                }
                BoardCommand::TrimHistory { reply } => {
                    let _ = reply.send(self.board.trim_history());
                }
                BoardCommand::Stats { reply } => {
                    let _ = reply.send(BoardStats {
                        connections: self.peers.len(),
                        users: self.board.registry().count(),
                        remembered: self.board.registry().remembered(),
                        strokes: self.board.strokes().total_strokes(),
                        history: self.board.history().len(),
                    });
                }
                BoardCommand::Shutdown => break,
            }
        }
        info!("board task stopped");
    }

    fn deliver(&mut self, sender: ConnectionId, dispatches: Vec<Dispatch>) {
        let mut pending = dispatches
            .into_iter()
            .map(|dispatch| (sender, dispatch))
            .collect::<VecDeque<_>>();

        while let Some((origin, dispatch)) = pending.pop_front() {
            let mut stale = Vec::new();
            for (id, tx) in &self.peers {
                let wanted = match dispatch.audience {
                    Audience::Sender => *id == origin,
                    Audience::Others => *id != origin,
                    Audience::All => true,
                };
                if wanted && tx.send(dispatch.message.clone()).is_err() {
                    stale.push(*id);
                }
            }
            for id in stale {
                warn!(conn = %id, kind = dispatch.message.kind(), "dropping stale peer");
                self.peers.remove(&id);
                pending.extend(self.board.disconnect(id).into_iter().map(|d| (id, d)));
            }
        }
    }
}
