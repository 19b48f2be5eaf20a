use sketchsync_shared::Point;

pub trait Surface {
    fn clear(&mut self);

    /// A single point paints a round dot of `width`.
    fn stroke_path(&mut self, points: &[Point], color: &str, width: f64);
}

#[cfg(test)]
pub mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Op {
        Clear,
        Path {
            points: Vec<Point>,
            color: String,
            width: f64,
        },
    }

    #[derive(Default)]
    pub struct RecordingSurface {
        pub ops: Vec<Op>,
    }

    impl RecordingSurface {
        pub fn paths(&self) -> Vec<&Op> {
            self.ops
                .iter()
                .filter(|op| matches!(op, Op::Path { .. }))
                .collect()
        }

        pub fn take(&mut self) -> Vec<Op> {
            std::mem::take(&mut self.ops)
        }
    }

    impl Surface for RecordingSurface {
        fn clear(&mut self) {
            self.ops.push(Op::Clear);
        }

        fn stroke_path(&mut self, points: &[Point], color: &str, width: f64) {
            self.ops.push(Op::Path {
                points: points.to_vec(),
                color: color.to_string(),
                width,
            });
        }
    }
}
