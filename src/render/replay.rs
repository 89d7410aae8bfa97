//! Step-by-step playback of recorded inventory sorts and searches

use crate::algorithms::{SearchStep, SortStep};
use crate::game::InventoryItem;

/// What to highlight in the frame being shown
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameMark<'a> {
    Compare { pair: (usize, usize), swapped: bool },
    Scan { current: usize, found: &'a [usize] },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceFrame<'a> {
    pub items: &'a [InventoryItem],
    pub mark: FrameMark<'a>,
}

#[derive(Debug, Clone)]
pub enum TraceReplay {
    Sort {
        label: String,
        steps: Vec<SortStep<InventoryItem>>,
        cursor: usize,
    },
    Search {
        label: String,
        steps: Vec<SearchStep<InventoryItem>>,
        cursor: usize,
    },
}

impl TraceReplay {
    /// None when there is nothing to replay
    pub fn sort(label: impl Into<String>, steps: Vec<SortStep<InventoryItem>>) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        Some(TraceReplay::Sort {
            label: label.into(),
            steps,
            cursor: 0,
        })
    }

    pub fn search(label: impl Into<String>, steps: Vec<SearchStep<InventoryItem>>) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        Some(TraceReplay::Search {
            label: label.into(),
            steps,
            cursor: 0,
        })
    }

    /// Move to the next step. Returns false once the last step is showing.
    pub fn advance(&mut self) -> bool {
        let (cursor, len) = match self {
            TraceReplay::Sort { steps, cursor, .. } => (cursor, steps.len()),
            TraceReplay::Search { steps, cursor, .. } => (cursor, steps.len()),
        };
        if *cursor + 1 < len {
            *cursor += 1;
            true
        } else {
            false
        }
    }

    pub fn is_finished(&self) -> bool {
        match self {
            TraceReplay::Sort { steps, cursor, .. } => *cursor + 1 >= steps.len(),
            TraceReplay::Search { steps, cursor, .. } => *cursor + 1 >= steps.len(),
        }
    }

    pub fn is_sort(&self) -> bool {
        matches!(self, TraceReplay::Sort { .. })
    }

    pub fn label(&self) -> &str {
        match self {
            TraceReplay::Sort { label, .. } | TraceReplay::Search { label, .. } => label,
        }
    }

    /// Step counter for display, 1-based
    pub fn progress(&self) -> (usize, usize) {
        match self {
            TraceReplay::Sort { steps, cursor, .. } => (cursor + 1, steps.len()),
            TraceReplay::Search { steps, cursor, .. } => (cursor + 1, steps.len()),
        }
    }

    pub fn frame(&self) -> TraceFrame<'_> {
        match self {
            TraceReplay::Sort { steps, cursor, .. } => {
                let step = &steps[*cursor];
                TraceFrame {
                    items: &step.array,
                    mark: FrameMark::Compare {
                        pair: step.compared,
                        swapped: step.swapped,
                    },
                }
            }
            TraceReplay::Search { steps, cursor, .. } => {
                let step = &steps[*cursor];
                TraceFrame {
                    items: &step.array,
                    mark: FrameMark::Scan {
                        current: step.current_index,
                        found: &step.found_indices,
                    },
                }
            }
        }
    }
}
