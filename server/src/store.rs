use std::collections::HashMap;

use indexmap::IndexMap;
use sketchsync_shared::{stroke_near_point, Draw, Point, Stroke, StrokeId, UserId};

pub struct StrokeStore {
    strokes: IndexMap<UserId, Vec<Stroke>>,
    owners: HashMap<StrokeId, UserId>,
    active: HashMap<UserId, StrokeId>,
    retired: HashMap<UserId, StrokeId>,
    max_per_user: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Replaced,
    Inserted,
    Rejected,
    Retired,
}

impl StrokeStore {
    pub fn new(max_per_user: usize) -> Self {
        Self {
            strokes: IndexMap::new(),
            owners: HashMap::new(),
            active: HashMap::new(),
            retired: HashMap::new(),
            max_per_user: max_per_user.max(1),
        }
    }

    pub fn begin(&mut self, user_id: &str, stroke: Stroke) -> bool {
        if self.owners.contains_key(&stroke.id) {
            return false;
        }
        self.retired.remove(user_id);
        self.active.insert(user_id.to_string(), stroke.id);
        self.push(user_id, stroke);
        true
    }

    /// A stroke whose `draw-start` never arrived is created from the event,
    /// unless it was in progress when the board was cleared.
    pub fn sync(&mut self, user_id: &str, draw: &Draw) -> SyncOutcome {
        if self.retired.get(user_id) == Some(&draw.stroke_id) {
            self.retired.remove(user_id);
            return SyncOutcome::Retired;
        }
        if self.active.get(user_id) == Some(&draw.stroke_id) {
            self.active.remove(user_id);
        }
        match self.owners.get(&draw.stroke_id) {
            Some(owner) if owner != user_id => SyncOutcome::Rejected,
            Some(_) => {
                if let Some(stroke) = self
                    .strokes
                    .get_mut(user_id)
                    .and_then(|list| list.iter_mut().find(|s| s.id == draw.stroke_id))
                {
                    stroke.points = draw.points.clone();
                }
                SyncOutcome::Replaced
            }
            None => {
                let stroke = Stroke {
                    id: draw.stroke_id,
                    owner_id: user_id.to_string(),
                    tool: draw.tool,
                    color: draw.color.clone(),
                    line_width: draw.line_width,
                    points: draw.points.clone(),
                };
                self.push(user_id, stroke);
                SyncOutcome::Inserted
            }
        }
    }

    pub fn erase(&mut self, user_id: &str, center: Point, radius: f64) -> Vec<StrokeId> {
        let Some(list) = self.strokes.get_mut(user_id) else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        list.retain(|stroke| {
            let hit = stroke.is_pen() && stroke_near_point(stroke, center, radius);
            if hit {
                removed.push(stroke.id);
            }
            !hit
        });
        for id in &removed {
            self.forget(user_id, *id);
        }
        removed
    }

    pub fn end_active(&mut self, user_id: &str) -> Option<StrokeId> {
        self.retired.remove(user_id);
        self.active.remove(user_id)
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.owners.clear();
        self.retired = std::mem::take(&mut self.active);
    }

    pub fn strokes_for(&self, user_id: &str) -> &[Stroke] {
        self.strokes.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_strokes(&self) -> usize {
        self.owners.len()
    }

    pub fn snapshot(&self) -> Vec<(UserId, Vec<Stroke>)> {
        self.strokes
            .iter()
            .map(|(user_id, strokes)| (user_id.clone(), strokes.clone()))
            .collect()
    }

    fn push(&mut self, user_id: &str, stroke: Stroke) {
        self.owners.insert(stroke.id, user_id.to_string());
        let is_pen = stroke.is_pen();
        let list = self.strokes.entry(user_id.to_string()).or_default();
        list.push(stroke);
        let mut overflow = list
            .iter()
            .filter(|s| s.is_pen() == is_pen)
            .count()
            .saturating_sub(self.max_per_user);
        let mut dropped = Vec::new();
        list.retain(|s| {
            if overflow > 0 && s.is_pen() == is_pen {
                overflow -= 1;
                dropped.push(s.id);
                return false;
            }
            true
        });
        for id in dropped {
            self.forget(user_id, id);
        }
    }

    fn forget(&mut self, user_id: &str, id: StrokeId) {
        self.owners.remove(&id);
        if self.active.get(user_id) == Some(&id) {
            self.active.remove(user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchsync_shared::Tool;

    fn stroke(id: u64, points: &[(f64, f64)]) -> Stroke {
        Stroke {
            id: StrokeId::new([0, id]),
            owner_id: String::new(),
            tool: Tool::Pen,
            color: "#FF0000".into(),
            line_width: 2.0,
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    fn draw(id: u64, points: &[(f64, f64)]) -> Draw {
        Draw {
            stroke_id: StrokeId::new([0, id]),
            user_id: None,
            tool: Tool::Pen,
            color: "#FF0000".into(),
            line_width: 2.0,
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    #[test]
    fn begin_rejects_duplicate_ids_across_users() {
        let mut store = StrokeStore::new(10);
        assert!(store.begin("a", stroke(1, &[(0.0, 0.0)])));
        assert!(!store.begin("b", stroke(1, &[(0.0, 0.0)])));
        assert!(store.strokes_for("b").is_empty());
    }

    #[test]
    fn sync_replaces_points_and_clears_active() {
        let mut store = StrokeStore::new(10);
        store.begin("a", stroke(1, &[(0.0, 0.0)]));

        let outcome = store.sync("a", &draw(1, &[(0.0, 0.0), (1.0, 1.0)]));
        assert_eq!(outcome, SyncOutcome::Replaced);
        assert_eq!(store.strokes_for("a")[0].points.len(), 2);
        assert_eq!(store.end_active("a"), None);
    }

    #[test]
    fn begin_marks_the_stroke_active() {
        let mut store = StrokeStore::new(10);
        store.begin("a", stroke(1, &[(0.0, 0.0)]));
        assert_eq!(store.end_active("a"), Some(StrokeId::new([0, 1])));
        assert_eq!(store.end_active("a"), None);
    }

    #[test]
    fn sync_for_unknown_id_inserts() {
        let mut store = StrokeStore::new(10);
        let outcome = store.sync("a", &draw(9, &[(1.0, 1.0)]));
        assert_eq!(outcome, SyncOutcome::Inserted);
        assert_eq!(store.strokes_for("a")[0].owner_id, "a");
    }

    #[test]
    fn sync_cannot_touch_another_users_stroke() {
        let mut store = StrokeStore::new(10);
        store.begin("a", stroke(1, &[(0.0, 0.0)]));
        assert_eq!(
            store.sync("b", &draw(1, &[(5.0, 5.0)])),
            SyncOutcome::Rejected
        );
        assert_eq!(store.strokes_for("a")[0].points, vec![Point::new(0.0, 0.0)]);
    }

    #[test]
    fn erase_only_touches_the_named_user() {
        let mut store = StrokeStore::new(10);
        store.begin("a", stroke(1, &[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)]));
        store.begin("b", stroke(2, &[(5.0, 5.0)]));

        let removed = store.erase("a", Point::new(5.0, 5.0), 3.0);
        assert_eq!(removed, vec![StrokeId::new([0, 1])]);
        assert!(store.strokes_for("a").is_empty());
        assert_eq!(store.strokes_for("b").len(), 1);
        assert_eq!(store.total_strokes(), 1);
    }

    #[test]
    fn per_user_cap_drops_oldest() {
        let mut store = StrokeStore::new(2);
        for id in 1..=3 {
            store.begin("a", stroke(id, &[(0.0, 0.0)]));
        }
        let ids = store
            .strokes_for("a")
            .iter()
            .map(|s| s.id.parts()[1])
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 3]);
        assert!(store.begin("a", stroke(1, &[(0.0, 0.0)])));
    }

    #[test]
    fn eraser_strokes_never_evict_pen_strokes() {
        let mut store = StrokeStore::new(2);
        store.begin("a", stroke(1, &[(0.0, 0.0)]));
        store.begin("a", stroke(2, &[(0.0, 0.0)]));
        for id in 10..15 {
            let mut eraser = stroke(id, &[(0.0, 0.0)]);
            eraser.tool = Tool::Eraser;
            store.begin("a", eraser);
        }
        let list = store.strokes_for("a");
        let pens = list
            .iter()
            .filter(|s| s.is_pen())
            .map(|s| s.id.parts()[1])
            .collect::<Vec<_>>();
        assert_eq!(pens, vec![1, 2]);
        assert_eq!(list.len(), 4);
        assert_eq!(store.total_strokes(), 4);
    }

    #[test]
    fn clear_retires_strokes_in_progress() {
        let mut store = StrokeStore::new(10);
        store.begin("a", stroke(1, &[(0.0, 0.0)]));
        store.clear();

        assert_eq!(
            store.sync("a", &draw(1, &[(0.0, 0.0), (1.0, 1.0)])),
            SyncOutcome::Retired
        );
        assert!(store.strokes_for("a").is_empty());
        assert_eq!(store.sync("a", &draw(7, &[(2.0, 2.0)])), SyncOutcome::Inserted);
    }

    #[test]
    fn snapshot_keeps_first_insertion_order() {
        let mut store = StrokeStore::new(10);
        store.begin("b", stroke(1, &[(0.0, 0.0)]));
        store.begin("a", stroke(2, &[(0.0, 0.0)]));
        store.begin("b", stroke(3, &[(0.0, 0.0)]));
        let users = store
            .snapshot()
            .into_iter()
            .map(|(user, _)| user)
            .collect::<Vec<_>>();
        assert_eq!(users, vec!["b", "a"]);
    }
}
