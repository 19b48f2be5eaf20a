use std::collections::VecDeque;

use sketchsync_shared::{HistoryEntry, HistoryEvent};

/// Appends never trim; `trim` restores the bound.
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl HistoryLog {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    pub fn append(&mut self, event: HistoryEvent, received_at: u64) {
        self.entries.push_back(HistoryEntry { received_at, event });
    }

    pub fn trim(&mut self) -> usize {
        let excess = self.entries.len().saturating_sub(self.limit);
        self.entries.drain(..excess);
        excess
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchsync_shared::Erase;

    fn erase_at(x: f64) -> HistoryEvent {
        HistoryEvent::Erase(Erase {
            x,
            y: 0.0,
            eraser_size: 10.0,
            user_id: Some("a".into()),
        })
    }

    #[test]
    fn trim_keeps_the_newest_entries() {
        let mut log = HistoryLog::new(3);
        for i in 0..5 {
            log.append(erase_at(i as f64), i);
        }
        assert_eq!(log.len(), 5);
        assert_eq!(log.trim(), 2);
        let kept = log
            .snapshot()
            .into_iter()
            .map(|entry| entry.received_at)
            .collect::<Vec<_>>();
        assert_eq!(kept, vec![2, 3, 4]);
        assert_eq!(log.trim(), 0);
    }

    #[test]
    fn burst_far_beyond_limit_is_bounded_after_trim() {
        let mut log = HistoryLog::new(10_000);
        for i in 0..25_000 {
            log.append(erase_at(0.0), i);
        }
        log.trim();
        assert_eq!(log.len(), 10_000);
        assert_eq!(log.snapshot()[0].received_at, 15_000);
    }
}
