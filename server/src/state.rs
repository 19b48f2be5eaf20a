use std::time::Duration;

use crate::hub::BoardHandle;

pub const HISTORY_LIMIT: usize = 10_000;
pub const MAX_STROKES_PER_USER: usize = 2000;
pub const TRIM_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct BoardConfig {
    pub history_limit: usize,
    pub max_strokes_per_user: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            history_limit: HISTORY_LIMIT,
            max_strokes_per_user: MAX_STROKES_PER_USER,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub board: BoardHandle,
}
