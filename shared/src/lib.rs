use std::fmt;
use std::str::FromStr;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

pub mod geometry;
pub mod sanitize;

pub use geometry::{erase_user_strokes, stroke_near_point};
pub use sanitize::{
    sanitize_color, sanitize_points, sanitize_stroke, sanitize_width, DEFAULT_ERASER_SIZE,
    DEFAULT_LINE_WIDTH, MAX_POINTS_PER_STROKE,
};

pub type UserId = String;

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

/// Serialized as 32 lowercase hex digits.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(into = "String", try_from = "String")]
pub struct StrokeId([u64; 2]);

impl StrokeId {
    pub const fn new(parts: [u64; 2]) -> Self {
        Self(parts)
    }

    pub fn parts(self) -> [u64; 2] {
        self.0
    }
}

impl fmt::Display for StrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.0[0], self.0[1])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrokeIdError;

impl fmt::Display for ParseStrokeIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("stroke id must be 32 hex digits")
    }
}

impl std::error::Error for ParseStrokeIdError {}

impl FromStr for StrokeId {
    type Err = ParseStrokeIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let canonical = value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if value.len() != 32 || !canonical {
            return Err(ParseStrokeIdError);
        }
        let high = u64::from_str_radix(&value[..16], 16).map_err(|_| ParseStrokeIdError)?;
        let low = u64::from_str_radix(&value[16..], 16).map_err(|_| ParseStrokeIdError)?;
        Ok(Self([high, low]))
    }
}

impl TryFrom<String> for StrokeId {
    type Error = ParseStrokeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StrokeId> for String {
    fn from(id: StrokeId) -> Self {
        id.to_string()
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub id: StrokeId,
    #[serde(default)]
    pub owner_id: UserId,
    pub tool: Tool,
    pub color: String,
    pub line_width: f64,
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn is_pen(&self) -> bool {
        self.tool == Tool::Pen
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrawStart {
    pub x: f64,
    pub y: f64,
    pub tool: Tool,
    pub color: String,
    pub line_width: f64,
    pub stroke: Stroke,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Draw {
    pub stroke_id: StrokeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub tool: Tool,
    pub color: String,
    pub line_width: f64,
    pub points: Vec<Point>,
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Erase {
    pub x: f64,
    pub y: f64,
    pub eraser_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Erase {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Init {
    pub user_id: UserId,
    pub color: String,
    pub user_count: usize,
    pub history: Vec<HistoryEntry>,
    pub strokes_data: Vec<(UserId, Vec<Stroke>)>,
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum HistoryEvent {
    #[serde(rename = "draw-start")]
    DrawStart(DrawStart),
    #[serde(rename = "draw")]
    Draw(Draw),
    #[serde(rename = "erase")]
    Erase(Erase),
}

impl HistoryEvent {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            HistoryEvent::DrawStart(event) => event.user_id.as_deref(),
            HistoryEvent::Draw(event) => event.user_id.as_deref(),
            HistoryEvent::Erase(event) => event.user_id.as_deref(),
        }
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Milliseconds since the Unix epoch, server clock.
    pub received_at: u64,
    #[serde(flatten)]
    pub event: HistoryEvent,
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "register", rename_all = "camelCase")]
    Register {
        #[serde(default)]
        existing_user_id: Option<UserId>,
    },
    #[serde(rename = "draw-start")]
    DrawStart(DrawStart),
    #[serde(rename = "draw")]
    Draw(Draw),
    #[serde(rename = "erase")]
    Erase(Erase),
    #[serde(rename = "clear-all")]
    ClearAll,
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init(Init),
    #[serde(rename = "user-count-update")]
    UserCountUpdate { count: usize },
    #[serde(rename = "draw-start")]
    DrawStart(DrawStart),
    #[serde(rename = "draw")]
    Draw(Draw),
    #[serde(rename = "erase")]
    Erase(Erase),
    #[serde(rename = "clear-all")]
    ClearAll,
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Init(_) => "init",
            ServerMessage::UserCountUpdate { .. } => "user-count-update",
            ServerMessage::DrawStart(_) => "draw-start",
            ServerMessage::Draw(_) => "draw",
            ServerMessage::Erase(_) => "erase",
            ServerMessage::ClearAll => "clear-all",
        }
    }
}
