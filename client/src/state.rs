use indexmap::IndexMap;

use sketchsync_shared::{
    erase_user_strokes, Draw, Point, Stroke, StrokeId, Tool, UserId, DEFAULT_ERASER_SIZE,
    DEFAULT_LINE_WIDTH,
};

pub const TOOLBAR_HEIGHT: f64 = 70.0;
pub const DEFAULT_COLOR: &str = "#FF0000";

#[derive(Clone, Debug, PartialEq)]
pub struct ToolSettings {
    pub tool: Tool,
    pub color: String,
    pub line_width: f64,
    pub eraser_size: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            color: DEFAULT_COLOR.to_string(),
            line_width: DEFAULT_LINE_WIDTH,
            eraser_size: DEFAULT_ERASER_SIZE,
        }
    }
}

impl ToolSettings {
    pub fn stroke_width(&self) -> f64 {
        match self.tool {
            Tool::Pen => self.line_width,
            Tool::Eraser => self.eraser_size,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    Idle,
    Drawing { stroke_id: StrokeId },
}

#[derive(Default, Debug)]
pub struct Mirror {
    strokes: IndexMap<UserId, Vec<Stroke>>,
}

impl Mirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, user_id: &str, stroke: Stroke) {
        self.strokes
            .entry(user_id.to_string())
            .or_default()
            .push(stroke);
    }

    pub fn upsert(&mut self, user_id: &str, draw: &Draw) {
        let list = self.strokes.entry(user_id.to_string()).or_default();
        if let Some(stroke) = list.iter_mut().find(|stroke| stroke.id == draw.stroke_id) {
            stroke.points = draw.points.clone();
            return;
        }
        list.push(Stroke {
            id: draw.stroke_id,
            owner_id: user_id.to_string(),
            tool: draw.tool,
            color: draw.color.clone(),
            line_width: draw.line_width,
            points: draw.points.clone(),
        });
    }

    pub fn stroke_mut(&mut self, user_id: &str, id: StrokeId) -> Option<&mut Stroke> {
        self.strokes
            .get_mut(user_id)?
            .iter_mut()
            .find(|stroke| stroke.id == id)
    }

    pub fn contains(&self, id: StrokeId) -> bool {
        self.strokes
            .values()
            .any(|list| list.iter().any(|stroke| stroke.id == id))
    }

    pub fn erase(&mut self, user_id: &str, center: Point, radius: f64) -> usize {
        self.strokes
            .get_mut(user_id)
            .map(|list| erase_user_strokes(list, center, radius))
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn replace_all(&mut self, snapshot: Vec<(UserId, Vec<Stroke>)>) {
        self.strokes = snapshot.into_iter().collect();
    }

    pub fn strokes_for(&self, user_id: &str) -> &[Stroke] {
        self.strokes.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &Vec<Stroke>)> {
        self.strokes.iter()
    }
}
