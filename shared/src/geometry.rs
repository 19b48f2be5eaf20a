use crate::{Point, Stroke};

/// Only sampled points are tested, not the segments between them.
pub fn stroke_near_point(stroke: &Stroke, center: Point, radius: f64) -> bool {
    stroke
        .points
        .iter()
        .any(|point| point.distance(center) <= radius)
}

pub fn erase_user_strokes(strokes: &mut Vec<Stroke>, center: Point, radius: f64) -> usize {
    let before = strokes.len();
    strokes.retain(|stroke| !(stroke.is_pen() && stroke_near_point(stroke, center, radius)));
    before - strokes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StrokeId, Tool};

    fn stroke(tool: Tool, points: &[(f64, f64)]) -> Stroke {
        Stroke {
            id: StrokeId::new([0, points.len() as u64]),
            owner_id: "u".into(),
            tool,
            color: "#000".into(),
            line_width: 2.0,
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    #[test]
    fn erase_removes_whole_stroke_on_any_hit() {
        let mut strokes = vec![stroke(Tool::Pen, &[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)])];
        assert_eq!(erase_user_strokes(&mut strokes, Point::new(5.0, 5.0), 3.0), 1);
        assert!(strokes.is_empty());
    }

    #[test]
    fn erase_far_away_leaves_stroke_untouched() {
        let mut strokes = vec![stroke(Tool::Pen, &[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)])];
        assert_eq!(
            erase_user_strokes(&mut strokes, Point::new(100.0, 100.0), 3.0),
            0
        );
        assert_eq!(strokes[0].points.len(), 3);
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let target = stroke(Tool::Pen, &[(3.0, 4.0)]);
        assert!(stroke_near_point(&target, Point::new(0.0, 0.0), 5.0));
        assert!(!stroke_near_point(&target, Point::new(0.0, 0.0), 4.99));
    }

    #[test]
    fn eraser_strokes_survive_erase() {
        let mut strokes = vec![
            stroke(Tool::Eraser, &[(1.0, 1.0)]),
            stroke(Tool::Pen, &[(1.0, 1.0), (2.0, 2.0)]),
        ];
        assert_eq!(erase_user_strokes(&mut strokes, Point::new(1.0, 1.0), 2.0), 1);
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].tool, Tool::Eraser);
    }
}
