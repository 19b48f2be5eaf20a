use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("server crashed: {0}")]
    Serve(#[source] io::Error),
    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board task has stopped")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid JSON frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid binary frame: {0}")]
    Binary(#[from] bincode::error::DecodeError),
}
