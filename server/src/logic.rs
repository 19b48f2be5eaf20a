use std::time::{SystemTime, UNIX_EPOCH};

use sketchsync_shared::{
    sanitize_points, sanitize_stroke, sanitize_width, ClientMessage, Draw, DrawStart, Erase,
    HistoryEvent, Init, ServerMessage, Tool, DEFAULT_ERASER_SIZE, DEFAULT_LINE_WIDTH,
};
use tracing::{debug, info};

use crate::history::HistoryLog;
use crate::identity::{ConnectionId, Identity, IdentityRegistry};
use crate::state::BoardConfig;
use crate::store::{StrokeStore, SyncOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience {
    Sender,
    Others,
    All,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    pub audience: Audience,
    pub message: ServerMessage,
}

impl Dispatch {
    fn new(audience: Audience, message: ServerMessage) -> Self {
        Self { audience, message }
    }
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

pub struct Board {
    registry: IdentityRegistry,
    strokes: StrokeStore,
    history: HistoryLog,
    clock: fn() -> u64,
}

impl Board {
    pub fn new(config: &BoardConfig) -> Self {
        Self::with_clock(config, now_millis)
    }

    pub fn with_clock(config: &BoardConfig, clock: fn() -> u64) -> Self {
        Self {
            registry: IdentityRegistry::new(),
            strokes: StrokeStore::new(config.max_strokes_per_user),
            history: HistoryLog::new(config.history_limit),
            clock,
        }
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn strokes(&self) -> &StrokeStore {
        &self.strokes
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn apply(&mut self, sender: ConnectionId, message: ClientMessage) -> Vec<Dispatch> {
        match message {
            ClientMessage::Register { existing_user_id } => {
                self.register(sender, existing_user_id.as_deref())
            }
            ClientMessage::DrawStart(event) => self.draw_start(sender, event),
            ClientMessage::Draw(event) => self.draw(sender, event),
            ClientMessage::Erase(event) => self.erase(sender, event),
            ClientMessage::ClearAll => self.clear_all(sender),
        }
    }

    pub fn disconnect(&mut self, connection: ConnectionId) -> Vec<Dispatch> {
        let Some(identity) = self.registry.unregister(connection) else {
            return Vec::new();
        };
        if let Some(stroke) = self.strokes.end_active(&identity.user_id) {
            debug!(user = %identity.user_id, %stroke, "abandoned unfinished stroke");
        }
        let strokes = &self.strokes;
        self.registry
            .retain_colors(|user_id| !strokes.strokes_for(user_id).is_empty());
        info!(
            user = %identity.user_id,
            conn = %connection,
            online = self.registry.count(),
            "user left"
        );
        vec![self.user_count()]
    }

    pub fn trim_history(&mut self) -> usize {
        let removed = self.history.trim();
        if removed > 0 {
            info!(removed, kept = self.history.len(), "trimmed history");
        }
        removed
    }

    fn register(&mut self, sender: ConnectionId, candidate: Option<&str>) -> Vec<Dispatch> {
        let identity = self.registry.register(sender, candidate);
        info!(
            user = %identity.user_id,
            conn = %sender,
            reused = candidate == Some(identity.user_id.as_str()),
            online = self.registry.count(),
            "user registered"
        );
        let init = Init {
            user_id: identity.user_id,
            color: identity.color,
            user_count: self.registry.count(),
            history: self.history.snapshot(),
            strokes_data: self.strokes.snapshot(),
        };
        vec![
            Dispatch::new(Audience::Sender, ServerMessage::Init(init)),
            self.user_count(),
        ]
    }

    fn draw_start(&mut self, sender: ConnectionId, mut event: DrawStart) -> Vec<Dispatch> {
        let Some(identity) = self.identify(sender, "draw-start") else {
            return Vec::new();
        };
        if !(event.x.is_finite() && event.y.is_finite()) {
            debug!(conn = %sender, "dropping draw-start with non-finite origin");
            return Vec::new();
        }
        let Some(mut stroke) = sanitize_stroke(event.stroke) else {
            debug!(conn = %sender, "dropping draw-start without usable points");
            return Vec::new();
        };
        stroke.owner_id = identity.user_id.clone();
        stroke.color = identity.color.clone();
        stroke.line_width = sanitize_width(stroke.line_width, default_width(stroke.tool));

        event.user_id = Some(identity.user_id.clone());
        event.color = identity.color;
        event.tool = stroke.tool;
        event.line_width = stroke.line_width;
        event.stroke = stroke.clone();

        if !self.strokes.begin(&identity.user_id, stroke) {
            debug!(user = %identity.user_id, stroke = %event.stroke.id, "dropping duplicate stroke id");
            return Vec::new();
        }
        debug!(user = %identity.user_id, stroke = %event.stroke.id, "stroke started");
        self.record(HistoryEvent::DrawStart(event.clone()));
        vec![Dispatch::new(Audience::Others, ServerMessage::DrawStart(event))]
    }

    fn draw(&mut self, sender: ConnectionId, mut event: Draw) -> Vec<Dispatch> {
        let Some(identity) = self.identify(sender, "draw") else {
            return Vec::new();
        };
        event.points = sanitize_points(event.points);
        if event.points.is_empty() {
            debug!(conn = %sender, "dropping draw without usable points");
            return Vec::new();
        }
        event.user_id = Some(identity.user_id.clone());
        event.color = identity.color;
        event.line_width = sanitize_width(event.line_width, default_width(event.tool));

        let outcome = self.strokes.sync(&identity.user_id, &event);
        match outcome {
            SyncOutcome::Rejected => {
                debug!(user = %identity.user_id, stroke = %event.stroke_id, "dropping draw for foreign stroke");
                return Vec::new();
            }
            SyncOutcome::Retired => {
                debug!(user = %identity.user_id, stroke = %event.stroke_id, "dropping draw for cleared stroke");
                return Vec::new();
            }
            SyncOutcome::Replaced | SyncOutcome::Inserted => {}
        }
        debug!(
            user = %identity.user_id,
            stroke = %event.stroke_id,
            points = event.points.len(),
            ?outcome,
            "stroke synced"
        );
        self.record(HistoryEvent::Draw(event.clone()));
        vec![Dispatch::new(Audience::Others, ServerMessage::Draw(event))]
    }

    fn erase(&mut self, sender: ConnectionId, mut event: Erase) -> Vec<Dispatch> {
        let Some(identity) = self.identify(sender, "erase") else {
            return Vec::new();
        };
        if !event.center().is_finite() {
            return Vec::new();
        }
        event.eraser_size = sanitize_width(event.eraser_size, DEFAULT_ERASER_SIZE);
        event.user_id = Some(identity.user_id.clone());

        let removed = self
            .strokes
            .erase(&identity.user_id, event.center(), event.eraser_size);
        if !removed.is_empty() {
            debug!(user = %identity.user_id, removed = removed.len(), "strokes erased");
        }
        self.record(HistoryEvent::Erase(event.clone()));
        vec![Dispatch::new(Audience::Others, ServerMessage::Erase(event))]
    }

    fn clear_all(&mut self, sender: ConnectionId) -> Vec<Dispatch> {
        let Some(identity) = self.identify(sender, "clear-all") else {
            return Vec::new();
        };
        self.strokes.clear();
        self.history.clear();
        self.registry.retain_colors(|_| false);
        info!(user = %identity.user_id, "board cleared");
        vec![Dispatch::new(Audience::All, ServerMessage::ClearAll)]
    }

    fn identify(&self, sender: ConnectionId, kind: &str) -> Option<Identity> {
        let identity = self.registry.resolve(sender).cloned();
        if identity.is_none() {
            debug!(conn = %sender, kind, "dropping unattributed event");
        }
        identity
    }

    fn record(&mut self, event: HistoryEvent) {
        self.history.append(event, (self.clock)());
    }

    fn user_count(&self) -> Dispatch {
        Dispatch::new(
            Audience::All,
            ServerMessage::UserCountUpdate {
                count: self.registry.count(),
            },
        )
    }
}

fn default_width(tool: Tool) -> f64 {
    match tool {
        Tool::Pen => DEFAULT_LINE_WIDTH,
        Tool::Eraser => DEFAULT_ERASER_SIZE,
    }
}

#[cfg(test)]
#[path = "logic_test.rs"]
mod tests;
