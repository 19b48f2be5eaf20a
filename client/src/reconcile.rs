use sketchsync_shared::{sanitize_color, sanitize_points, Point, ServerMessage, Stroke, UserId};

use crate::state::Mirror;

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Ignored,
    Redraw,
    Joined {
        user_id: UserId,
        color: String,
        user_count: usize,
    },
    UserCount(usize),
}

/// History is not replayed: the store snapshot already reflects every erase.
pub fn apply_server_message(mirror: &mut Mirror, message: ServerMessage) -> Outcome {
    match message {
        ServerMessage::Init(init) => {
            log::info!(
                "joined as {} with {} users online, {} history entries",
                init.user_id,
                init.user_count,
                init.history.len()
            );
            mirror.replace_all(init.strokes_data);
            Outcome::Joined {
                user_id: init.user_id,
                color: init.color,
                user_count: init.user_count,
            }
        }
        ServerMessage::UserCountUpdate { count } => Outcome::UserCount(count),
        ServerMessage::DrawStart(event) => {
            let Some(user_id) = event.user_id else {
                return Outcome::Ignored;
            };
            let origin = Point::new(event.x, event.y);
            if !origin.is_finite() || mirror.contains(event.stroke.id) {
                return Outcome::Ignored;
            }
            mirror.push(
                &user_id,
                Stroke {
                    id: event.stroke.id,
                    owner_id: user_id.clone(),
                    tool: event.tool,
                    color: sanitize_color(event.color),
                    line_width: event.line_width,
                    points: vec![origin],
                },
            );
            Outcome::Redraw
        }
        ServerMessage::Draw(mut event) => {
            let Some(user_id) = event.user_id.clone() else {
                return Outcome::Ignored;
            };
            event.points = sanitize_points(event.points);
            if event.points.is_empty() {
                return Outcome::Ignored;
            }
            event.color = sanitize_color(event.color);
            mirror.upsert(&user_id, &event);
            Outcome::Redraw
        }
        ServerMessage::Erase(event) => {
            let Some(user_id) = event.user_id.as_deref() else {
                return Outcome::Ignored;
            };
            mirror.erase(user_id, event.center(), event.eraser_size);
            Outcome::Redraw
        }
        ServerMessage::ClearAll => {
            mirror.clear();
            Outcome::Redraw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchsync_shared::{Draw, DrawStart, Erase, Init, StrokeId, Tool};

    fn pen(id: u64, owner: &str, points: &[(f64, f64)]) -> Stroke {
        Stroke {
            id: StrokeId::new([1, id]),
            owner_id: owner.into(),
            tool: Tool::Pen,
            color: "#00FF00".into(),
            line_width: 2.0,
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    fn draw_start(id: u64, user: &str) -> ServerMessage {
        ServerMessage::DrawStart(DrawStart {
            x: 1.0,
            y: 2.0,
            tool: Tool::Pen,
            color: "#00FF00".into(),
            line_width: 2.0,
            stroke: pen(id, user, &[(1.0, 2.0)]),
            user_id: Some(user.into()),
        })
    }

    fn draw(id: u64, user: &str, points: &[(f64, f64)]) -> ServerMessage {
        ServerMessage::Draw(Draw {
            stroke_id: StrokeId::new([1, id]),
            user_id: Some(user.into()),
            tool: Tool::Pen,
            color: "#00FF00".into(),
            line_width: 2.0,
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        })
    }

    #[test]
    fn peer_stroke_converges_to_one_entry() {
        let mut mirror = Mirror::new();
        assert_eq!(
            apply_server_message(&mut mirror, draw_start(1, "peer")),
            Outcome::Redraw
        );
        apply_server_message(&mut mirror, draw(1, "peer", &[(1.0, 2.0), (3.0, 4.0)]));
        apply_server_message(&mut mirror, draw(1, "peer", &[(1.0, 2.0), (3.0, 4.0)]));

        let strokes = mirror.strokes_for("peer");
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].points.len(), 2);
    }

    #[test]
    fn draw_without_start_still_appears() {
        let mut mirror = Mirror::new();
        apply_server_message(&mut mirror, draw(5, "peer", &[(0.0, 0.0), (1.0, 0.0)]));
        assert_eq!(mirror.strokes_for("peer").len(), 1);
    }

    #[test]
    fn duplicate_draw_start_is_ignored() {
        let mut mirror = Mirror::new();
        apply_server_message(&mut mirror, draw_start(1, "peer"));
        assert_eq!(
            apply_server_message(&mut mirror, draw_start(1, "peer")),
            Outcome::Ignored
        );
        assert_eq!(mirror.strokes_for("peer").len(), 1);
    }

    #[test]
    fn erase_targets_only_the_named_user() {
        let mut mirror = Mirror::new();
        mirror.push("a", pen(1, "a", &[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)]));
        mirror.push("b", pen(2, "b", &[(5.0, 5.0)]));

        let erase = |x: f64, y: f64| {
            ServerMessage::Erase(Erase {
                x,
                y,
                eraser_size: 3.0,
                user_id: Some("a".into()),
            })
        };
        apply_server_message(&mut mirror, erase(100.0, 100.0));
        assert_eq!(mirror.strokes_for("a").len(), 1);

        apply_server_message(&mut mirror, erase(5.0, 5.0));
        assert!(mirror.strokes_for("a").is_empty());
        assert_eq!(mirror.strokes_for("b").len(), 1);
    }

    #[test]
    fn init_replaces_the_whole_mirror() {
        let mut mirror = Mirror::new();
        mirror.push("stale", pen(9, "stale", &[(0.0, 0.0)]));

        let outcome = apply_server_message(
            &mut mirror,
            ServerMessage::Init(Init {
                user_id: "me".into(),
                color: "#FF00FF".into(),
                user_count: 2,
                history: Vec::new(),
                strokes_data: vec![("me".into(), vec![pen(1, "me", &[(1.0, 1.0)])])],
            }),
        );
        assert_eq!(
            outcome,
            Outcome::Joined {
                user_id: "me".into(),
                color: "#FF00FF".into(),
                user_count: 2,
            }
        );
        assert!(mirror.strokes_for("stale").is_empty());
        assert_eq!(mirror.strokes_for("me").len(), 1);
    }

    #[test]
    fn clear_all_empties_everything() {
        let mut mirror = Mirror::new();
        mirror.push("a", pen(1, "a", &[(0.0, 0.0)]));
        assert_eq!(
            apply_server_message(&mut mirror, ServerMessage::ClearAll),
            Outcome::Redraw
        );
        assert_eq!(mirror.iter().count(), 0);
    }

    #[test]
    fn unattributed_events_are_ignored() {
        let mut mirror = Mirror::new();
        let message = ServerMessage::Erase(Erase {
            x: 0.0,
            y: 0.0,
            eraser_size: 3.0,
            user_id: None,
        });
        assert_eq!(apply_server_message(&mut mirror, message), Outcome::Ignored);
    }
}
