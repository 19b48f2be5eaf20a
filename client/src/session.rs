use sketchsync_shared::{
    ClientMessage, Draw, DrawStart, Erase, Point, Stroke, StrokeId, Tool, UserId,
};

use crate::render::{draw_dot, draw_segment, redraw_all};
use crate::state::{DrawMode, Mirror, ToolSettings};
use crate::surface::Surface;

pub struct LocalSession {
    user_id: Option<UserId>,
    settings: ToolSettings,
    mode: DrawMode,
}

impl LocalSession {
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            user_id: None,
            settings,
            mode: DrawMode::Idle,
        }
    }

    pub fn identify(&mut self, user_id: UserId, color: String) {
        self.user_id = Some(user_id);
        self.settings.color = color;
        self.mode = DrawMode::Idle;
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.settings.tool = tool;
    }

    pub fn set_eraser_size(&mut self, size: f64) {
        if size.is_finite() && size > 0.0 {
            self.settings.eraser_size = size;
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.mode, DrawMode::Drawing { .. })
    }

    pub fn begin(
        &mut self,
        mirror: &mut Mirror,
        surface: &mut impl Surface,
        point: Point,
        id: StrokeId,
    ) -> Option<ClientMessage> {
        if self.is_active() || !point.is_finite() {
            return None;
        }
        let user_id = self.user_id.clone()?;
        let settings = &self.settings;
        let stroke = Stroke {
            id,
            owner_id: user_id.clone(),
            tool: settings.tool,
            color: settings.color.clone(),
            line_width: settings.stroke_width(),
            points: vec![point],
        };
        if stroke.is_pen() {
            draw_dot(surface, point, &stroke.color, stroke.line_width);
        }
        let message = ClientMessage::DrawStart(DrawStart {
            x: point.x,
            y: point.y,
            tool: stroke.tool,
            color: stroke.color.clone(),
            line_width: stroke.line_width,
            stroke: stroke.clone(),
            user_id: Some(user_id.clone()),
        });
        mirror.push(&user_id, stroke);
        self.mode = DrawMode::Drawing { stroke_id: id };
        Some(message)
    }

    pub fn extend(
        &mut self,
        mirror: &mut Mirror,
        surface: &mut impl Surface,
        point: Point,
    ) -> Option<ClientMessage> {
        let DrawMode::Drawing { stroke_id } = self.mode else {
            return None;
        };
        if !point.is_finite() {
            return None;
        }
        let user_id = self.user_id.clone()?;

        let previous = mirror.stroke_mut(&user_id, stroke_id).map(|stroke| {
            let last = stroke.points.last().copied();
            stroke.points.push(point);
            last
        });

        match self.settings.tool {
            Tool::Pen => {
                if let Some(Some(from)) = previous {
                    draw_segment(
                        surface,
                        from,
                        point,
                        &self.settings.color,
                        self.settings.line_width,
                    );
                }
                None
            }
            Tool::Eraser => {
                let size = self.settings.eraser_size;
                mirror.erase(&user_id, point, size);
                redraw_all(surface, mirror);
                Some(ClientMessage::Erase(Erase {
                    x: point.x,
                    y: point.y,
                    eraser_size: size,
                    user_id: Some(user_id),
                }))
            }
        }
    }

    pub fn end(&mut self, mirror: &mut Mirror) -> Option<ClientMessage> {
        let DrawMode::Drawing { stroke_id } = self.mode else {
            return None;
        };
        self.mode = DrawMode::Idle;
        let user_id = self.user_id.clone()?;
        let stroke = mirror.stroke_mut(&user_id, stroke_id)?;
        if !stroke.is_pen() || stroke.points.is_empty() {
            return None;
        }
        Some(ClientMessage::Draw(Draw {
            stroke_id,
            user_id: Some(user_id),
            tool: stroke.tool,
            color: stroke.color.clone(),
            line_width: stroke.line_width,
            points: stroke.points.clone(),
        }))
    }
}
