//! Dot indicator engine
//!
//! Maps the active card (an index into the full card list) onto the
//! subsequence of unfiltered cards and keeps a fixed-width sliding window of
//! dots over that subsequence. The window only moves when the active dot gets
//! close to one of its edges, which keeps the indicator still during
//! ordinary step-by-step navigation.

use coverflow_model::Direction;

use crate::constants::dots::{EDGE_MARGIN, VISIBLE_RANGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotSize {
    /// Outermost dot with more dots hidden beyond it.
    Edge,
    /// Second dot from an edge with more dots hidden beyond it.
    NearEdge,
    Mid,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dot {
    /// Card this dot navigates to.
    pub card_index: usize,
    /// Position among unfiltered cards.
    pub visible_index: usize,
    pub size: DotSize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotWindow {
    pub start: usize,
    /// Number of unfiltered cards.
    pub total: usize,
    pub active_visible: Option<usize>,
    pub dots: Vec<Dot>,
}

impl DotWindow {
    pub fn active_card(&self) -> Option<usize> {
        self.dots
            .iter()
            .find(|d| d.size == DotSize::Active)
            .map(|d| d.card_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowShift {
    pub from_start: usize,
    pub to_start: usize,
    pub direction: Direction,
}

/// Result of one indicator update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotUpdate {
    /// Window to show once any transition completes.
    pub window: DotWindow,
    /// Old window rendered with the new sizes, present only when the window
    /// shifts and the set of dots did not change underneath it.
    pub prepare: Option<DotWindow>,
    pub shift: Option<WindowShift>,
}

#[derive(Debug, Clone)]
pub struct DotIndicator {
    visible_start_index: usize,
    visible_range: usize,
    previous_visible_active_index: Option<usize>,
    previous_direction: Option<Direction>,
    previous_total: Option<usize>,
}

impl Default for DotIndicator {
    fn default() -> Self {
        Self::new(VISIBLE_RANGE)
    }
}

impl DotIndicator {
    pub fn new(visible_range: usize) -> Self {
        Self {
            visible_start_index: 0,
            visible_range: visible_range.max(1),
            previous_visible_active_index: None,
            previous_direction: None,
            previous_total: None,
        }
    }

    pub fn visible_start_index(&self) -> usize {
        self.visible_start_index
    }

    pub fn visible_range(&self) -> usize {
        self.visible_range
    }

    pub fn previous_direction(&self) -> Option<Direction> {
        self.previous_direction
    }

    /// Recompute the window for `active` given per-card `filtered` flags.
    pub fn update(&mut self, active: usize, filtered: &[bool]) -> DotUpdate {
        let visible: Vec<usize> = filtered
            .iter()
            .enumerate()
            .filter(|(_, hidden)| !**hidden)
            .map(|(i, _)| i)
            .collect();
        let total = visible.len();

        let active_visible = resolve_active_card(active, filtered)
            .and_then(|card| visible.iter().position(|&i| i == card));

        let old_start = self.visible_start_index;
        let new_start = match active_visible {
            Some(av) => self.target_start(old_start, av, total),
            None => 0,
        };

        let direction = match (self.previous_visible_active_index, active_visible)
        {
            (Some(prev), Some(cur)) if cur > prev => Some(Direction::Next),
            (Some(prev), Some(cur)) if cur < prev => Some(Direction::Prev),
            _ => self.previous_direction,
        };

        let same_dots = self.previous_total == Some(total);
        let shift = (new_start != old_start && same_dots).then(|| WindowShift {
            from_start: old_start,
            to_start: new_start,
            direction: if new_start > old_start {
                Direction::Next
            } else {
                Direction::Prev
            },
        });

        let prepare = shift.map(|_| {
            self.build_window(old_start, total, active_visible, &visible)
        });
        let window = self.build_window(new_start, total, active_visible, &visible);

        self.visible_start_index = new_start;
        self.previous_visible_active_index = active_visible;
        self.previous_direction = direction;
        self.previous_total = Some(total);

        DotUpdate {
            window,
            prepare,
            shift,
        }
    }

    fn target_start(&self, current: usize, active_visible: usize, total: usize) -> usize {
        let range = self.visible_range;
        if total <= range {
            return 0;
        }
        let max_start = total - range;
        let start = current.min(max_start);
        let rel = active_visible as isize - start as isize;
        let low = EDGE_MARGIN.min(range / 2) as isize;
        let high = range as isize - 1 - low;
        if rel < low || rel > high {
            active_visible.saturating_sub(range / 2).min(max_start)
        } else {
            start
        }
    }

    fn build_window(
        &self,
        start: usize,
        total: usize,
        active_visible: Option<usize>,
        visible: &[usize],
    ) -> DotWindow {
        let range = self.visible_range;
        let end = (start + range).min(total);
        let dots = (start..end)
            .map(|vi| Dot {
                card_index: visible[vi],
                visible_index: vi,
                size: size_for(vi - start, start, total, range, active_visible == Some(vi)),
            })
            .collect();
        DotWindow {
            start,
            total,
            active_visible,
            dots,
        }
    }
}

/// Card the indicator should mark active: `active` itself when unfiltered,
/// otherwise the nearest unfiltered card searching forward, then backward.
pub fn resolve_active_card(active: usize, filtered: &[bool]) -> Option<usize> {
    if filtered.is_empty() {
        return None;
    }
    let active = active.min(filtered.len() - 1);
    if !filtered[active] {
        return Some(active);
    }
    (active + 1..filtered.len())
        .find(|&i| !filtered[i])
        .or_else(|| (0..active).rev().find(|&i| !filtered[i]))
}

fn size_for(
    pos: usize,
    start: usize,
    total: usize,
    range: usize,
    is_active: bool,
) -> DotSize {
    if is_active {
        return DotSize::Active;
    }
    if total <= range {
        return DotSize::Mid;
    }
    let more_before = start > 0;
    let more_after = start + range < total;
    match pos {
        0 if more_before => DotSize::Edge,
        1 if more_before => DotSize::NearEdge,
        p if p + 1 == range && more_after => DotSize::Edge,
        p if p + 2 == range && more_after => DotSize::NearEdge,
        _ => DotSize::Mid,
    }
}
