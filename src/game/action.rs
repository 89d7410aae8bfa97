use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Direction the snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// The 180-degree reverse of this direction
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Pending direction changes, drained one per tick.
///
/// Reversals are rejected when they are pushed: a new direction is compared
/// against the last queued one (or the committed direction when the queue is
/// empty), so draining the queue in order can never produce a 180-degree turn.
#[derive(Debug, Clone, Default)]
pub struct DirectionQueue {
    pending: VecDeque<Direction>,
    max_len: usize,
}

impl DirectionQueue {
    pub fn new(max_len: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(max_len),
            max_len,
        }
    }

    /// Queue a direction change. Returns false when it was discarded.
    pub fn push(&mut self, committed: Direction, direction: Direction) -> bool {
        let reference = self.pending.back().copied().unwrap_or(committed);

        if direction == reference || direction.is_opposite(reference) {
            return false;
        }
        if self.pending.len() >= self.max_len {
            return false;
        }

        self.pending.push_back(direction);
        true
    }

    /// Take the next direction that is legal relative to `committed`.
    pub fn pop(&mut self, committed: Direction) -> Option<Direction> {
        while let Some(next) = self.pending.pop_front() {
            if !next.is_opposite(committed) && next != committed {
                return Some(next);
            }
        }
        None
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_directions() {
        assert!(Direction::Up.is_opposite(Direction::Down));
        assert!(Direction::Down.is_opposite(Direction::Up));
        assert!(Direction::Left.is_opposite(Direction::Right));
        assert!(Direction::Right.is_opposite(Direction::Left));

        assert!(!Direction::Up.is_opposite(Direction::Left));
        assert!(!Direction::Up.is_opposite(Direction::Right));
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(), (0, -1));
        assert_eq!(Direction::Down.delta(), (0, 1));
        assert_eq!(Direction::Left.delta(), (-1, 0));
        assert_eq!(Direction::Right.delta(), (1, 0));
    }

    #[test]
    fn test_queue_rejects_reverse_of_committed() {
        let mut queue = DirectionQueue::new(3);
        assert!(!queue.push(Direction::Right, Direction::Left));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_rejects_reverse_of_last_queued() {
        let mut queue = DirectionQueue::new(3);
        assert!(queue.push(Direction::Right, Direction::Up));
        // Down is legal against Right but would reverse the queued Up
        assert!(!queue.push(Direction::Right, Direction::Down));
        assert!(queue.push(Direction::Right, Direction::Left));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_queue_is_fifo_one_per_pop() {
        let mut queue = DirectionQueue::new(3);
        queue.push(Direction::Right, Direction::Up);
        queue.push(Direction::Right, Direction::Left);

        assert_eq!(queue.pop(Direction::Right), Some(Direction::Up));
        assert_eq!(queue.pop(Direction::Up), Some(Direction::Left));
        assert_eq!(queue.pop(Direction::Left), None);
    }

    #[test]
    fn test_queue_respects_max_len() {
        let mut queue = DirectionQueue::new(2);
        assert!(queue.push(Direction::Right, Direction::Up));
        assert!(queue.push(Direction::Right, Direction::Left));
        assert!(!queue.push(Direction::Right, Direction::Down));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_queue_ignores_duplicate() {
        let mut queue = DirectionQueue::new(3);
        assert!(!queue.push(Direction::Right, Direction::Right));
        assert!(queue.push(Direction::Right, Direction::Up));
        assert!(!queue.push(Direction::Right, Direction::Up));
    }
}
