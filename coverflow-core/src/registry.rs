//! Card registry: the shared carousel state container
//!
//! `CardSystem` is the single source of truth for the card list and the
//! navigation state. Drivers receive it by `&mut` and mutate it only through
//! the methods below, each of which re-validates the invariants it touches:
//!
//! - the active card is unfiltered whenever any unfiltered card exists;
//! - at most one card is flipped;
//! - the carousel phase only changes along the transition table in
//!   [`CarouselPhase::can_transition_to`].
//!
//! Surface changes are queued as [`Effect`]s and observer notifications as
//! [`SystemEvent`]s; the host drains both after each call.

use coverflow_model::{
    COLLAPSED_CARD_HEIGHT, Card, CarouselPhase, FilteringPhase, ModelError,
    Platform,
};

use crate::config::RuntimeConfig;
use crate::constants::dots::SHIFT_SECOND_PHASE_MS;
use crate::dots::{DotIndicator, DotWindow};
use crate::effects::{
    CardView, DotTransition, Effect, RenderSnapshot, SystemEvent,
};
use crate::error::{CoverflowError, Result};
use crate::timers::{Generation, TimerQueue, Token};

/// Outcome of a platform readiness signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The signalling platform is not the one driving this session.
    Ignored,
    /// The barrier was already open.
    AlreadyReady,
    /// The barrier just opened; layout finalization should run.
    Ready,
}

/// Tasks the registry schedules on its own timer queue.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemTask {
    ManualFlipExpired(Token),
    ApplyDotShift(Token, DotWindow),
}

#[derive(Debug)]
pub struct CardSystem {
    cards: Vec<Card>,
    active_card_index: usize,
    currently_flipped_card: Option<usize>,
    phase: CarouselPhase,
    is_filtering: bool,
    filtering_phase: FilteringPhase,
    manual_flip: Option<Token>,
    manual_flip_generation: Generation,
    manual_flip_guard_ms: u64,
    active_platform: Platform,
    is_layout_ready: bool,
    is_fully_initialized: bool,
    dots: DotIndicator,
    dot_generation: Generation,
    last_render: Option<RenderSnapshot>,
    last_dots: Option<DotWindow>,
    /// Target of a window shift whose second phase has not run yet.
    pending_dots: Option<DotWindow>,
    timers: TimerQueue<SystemTask>,
    effects: Vec<Effect>,
    events: Vec<SystemEvent>,
}

impl CardSystem {
    pub fn new(
        cards: Vec<Card>,
        active_platform: Platform,
        config: &RuntimeConfig,
    ) -> Self {
        let mut cards = cards;
        // Identity is positional.
        for (i, card) in cards.iter_mut().enumerate() {
            card.index = i;
        }
        Self {
            cards,
            active_card_index: 0,
            currently_flipped_card: None,
            phase: CarouselPhase::Idle,
            is_filtering: false,
            filtering_phase: FilteringPhase::Idle,
            manual_flip: None,
            manual_flip_generation: Generation::new(),
            manual_flip_guard_ms: config.manual_flip_guard_ms(),
            active_platform,
            is_layout_ready: false,
            is_fully_initialized: false,
            dots: DotIndicator::default(),
            dot_generation: Generation::new(),
            last_render: None,
            last_dots: None,
            pending_dots: None,
            timers: TimerQueue::new(),
            effects: Vec::new(),
            events: Vec::new(),
        }
    }

    // ===== Read access =====

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Collaborator-facing alias of [`CardSystem::cards`].
    pub fn flip_cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn try_card(&self, index: usize) -> std::result::Result<&Card, ModelError> {
        self.cards.get(index).ok_or(ModelError::CardOutOfRange {
            index,
            len: self.cards.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn active_card_index(&self) -> usize {
        self.active_card_index
    }

    pub fn currently_flipped_card(&self) -> Option<usize> {
        self.currently_flipped_card
    }

    pub fn is_manually_flipping(&self) -> bool {
        self.manual_flip.is_some()
    }

    pub fn is_filtering(&self) -> bool {
        self.is_filtering
    }

    pub fn filtering_phase(&self) -> FilteringPhase {
        self.filtering_phase
    }

    pub fn phase(&self) -> CarouselPhase {
        self.phase
    }

    /// Whether user navigation may start now. Logs the refusal.
    pub fn accepts_navigation(&self) -> bool {
        if self.phase.accepts_navigation() {
            return true;
        }
        log::debug!("Ignoring navigation while {}", self.phase);
        false
    }

    pub fn active_platform(&self) -> Platform {
        self.active_platform
    }

    pub fn is_layout_ready(&self) -> bool {
        self.is_layout_ready
    }

    pub fn is_fully_initialized(&self) -> bool {
        self.is_fully_initialized
    }

    pub fn visible_start_index(&self) -> usize {
        self.dots.visible_start_index()
    }

    pub fn visible_range(&self) -> usize {
        self.dots.visible_range()
    }

    pub fn filtered_flags(&self) -> Vec<bool> {
        self.cards.iter().map(|c| c.filtered).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_navigable()).count()
    }

    // ===== Navigation helpers =====

    /// Next unfiltered card after `from`, bounded at the end of the list.
    pub fn find_next_visible_index(&self, from: usize) -> Option<usize> {
        (from.saturating_add(1)..self.cards.len())
            .find(|&i| self.cards[i].is_navigable())
    }

    /// Previous unfiltered card before `from`, bounded at the start.
    pub fn find_prev_visible_index(&self, from: usize) -> Option<usize> {
        (0..from.min(self.cards.len()))
            .rev()
            .find(|&i| self.cards[i].is_navigable())
    }

    pub fn first_visible_index(&self) -> Option<usize> {
        self.cards.iter().position(Card::is_navigable)
    }

    pub fn last_visible_index(&self) -> Option<usize> {
        self.cards.iter().rposition(Card::is_navigable)
    }

    /// `from` itself when navigable, else the nearest unfiltered card
    /// searching forward first, then backward.
    pub fn nearest_visible_index(&self, from: usize) -> Option<usize> {
        if self.cards.is_empty() {
            return None;
        }
        let from = from.min(self.cards.len() - 1);
        if self.cards[from].is_navigable() {
            return Some(from);
        }
        self.find_next_visible_index(from)
            .or_else(|| self.find_prev_visible_index(from))
    }

    // ===== Mutation points =====

    /// Point the carousel at `index`, redirecting to the nearest unfiltered
    /// card when `index` is filtered. Returns the index actually applied.
    pub fn set_active_index(&mut self, index: usize) -> Result<usize> {
        self.try_card(index)?;
        let target = self.nearest_visible_index(index).unwrap_or(index);
        if target != self.active_card_index {
            log::debug!(
                "Active card {} -> {}",
                self.active_card_index,
                target
            );
            self.events.push(SystemEvent::ActiveCardChanged {
                from: self.active_card_index,
                to: target,
            });
            self.active_card_index = target;
        }
        Ok(target)
    }

    /// Reassign the active index if it references a filtered card. Leaves it
    /// alone when no unfiltered card exists.
    pub fn ensure_active_card_visible(&mut self) -> bool {
        let current = self.active_card_index;
        match self.nearest_visible_index(current) {
            Some(target) if target != current => {
                log::debug!(
                    "Active card {current} is filtered, moving to {target}"
                );
                self.events.push(SystemEvent::ActiveCardChanged {
                    from: current,
                    to: target,
                });
                self.active_card_index = target;
                true
            }
            _ => false,
        }
    }

    pub fn set_card_filtered(&mut self, index: usize, filtered: bool) -> Result<()> {
        self.try_card(index)?;
        if filtered && self.cards[index].flipped {
            self.unflip_card(index);
        }
        self.cards[index].filtered = filtered;
        Ok(())
    }

    /// Flip `index`, unflipping any other card first.
    pub fn flip_card(&mut self, index: usize) -> Result<()> {
        self.try_card(index)?;
        if let Some(other) = self.currently_flipped_card
            && other != index
        {
            self.unflip_card(other);
        }
        // Sweep in case a flag was left behind by an interrupted gesture.
        let stale: Vec<usize> = self
            .cards
            .iter()
            .filter(|c| c.flipped && c.index != index)
            .map(|c| c.index)
            .collect();
        for other in stale {
            self.unflip_card(other);
        }
        self.cards[index].flipped = true;
        self.currently_flipped_card = Some(index);
        Ok(())
    }

    /// Unflip `index` and collapse its height. Returns whether it was
    /// flipped.
    pub fn unflip_card(&mut self, index: usize) -> bool {
        let Some(card) = self.cards.get_mut(index) else {
            return false;
        };
        if !card.flipped {
            return false;
        }
        card.flipped = false;
        if self.currently_flipped_card == Some(index) {
            self.currently_flipped_card = None;
        }
        self.effects.push(Effect::ScrollIndicator {
            index,
            visible: false,
        });
        self.adjust_card_height(index, false, None);
        if self.currently_flipped_card.is_none()
            && self.phase == CarouselPhase::Flipped
        {
            self.phase = CarouselPhase::Idle;
        }
        true
    }

    /// Unflip the flipped card unless it is the active one.
    pub fn reset_flipped_card(&mut self) -> bool {
        match self.currently_flipped_card {
            Some(index) if index != self.active_card_index => {
                log::debug!("Resetting flipped card {index}");
                self.unflip_card(index)
            }
            _ => false,
        }
    }

    /// Set a card's height to `max(400, content_height)` when expanding, or
    /// back to 400 when collapsing, then force a reflow so the following
    /// transition starts from the new geometry.
    pub fn adjust_card_height(
        &mut self,
        index: usize,
        expand: bool,
        content_height: Option<f32>,
    ) -> f32 {
        let height = if expand {
            content_height
                .unwrap_or(COLLAPSED_CARD_HEIGHT)
                .max(COLLAPSED_CARD_HEIGHT)
        } else {
            COLLAPSED_CARD_HEIGHT
        };
        let Some(card) = self.cards.get_mut(index) else {
            log::warn!("Cannot adjust height of missing card {index}");
            return COLLAPSED_CARD_HEIGHT;
        };
        card.height = height;
        self.effects.push(Effect::SetCardHeight { index, height });
        self.effects.push(Effect::ForceReflow);
        height
    }

    /// Hold the manual-flip guard for the configured window.
    pub fn begin_manual_flip(&mut self, now_ms: u64) {
        let token = self.manual_flip_generation.bump();
        self.manual_flip = Some(token);
        self.timers.schedule(
            now_ms,
            self.manual_flip_guard_ms,
            SystemTask::ManualFlipExpired(token),
        );
    }

    /// Move the carousel phase along the transition table.
    pub fn transition(&mut self, to: CarouselPhase) -> Result<()> {
        let from = self.phase;
        if !from.can_transition_to(to) {
            log::debug!("Rejected phase transition {from} -> {to}");
            return Err(CoverflowError::TransitionRejected { from, to });
        }
        if from != to {
            log::trace!("Phase {from} -> {to}");
        }
        self.phase = to;
        Ok(())
    }

    /// Phase to settle in once motion ends.
    pub fn settle(&mut self) {
        let to = if self.currently_flipped_card.is_some() {
            CarouselPhase::Flipped
        } else {
            CarouselPhase::Idle
        };
        if self.phase != CarouselPhase::Filtering && self.phase != to {
            self.phase = to;
        }
    }

    /// Update filter coordination state and notify observers.
    pub fn set_filtering_state(
        &mut self,
        is_filtering: bool,
        phase: FilteringPhase,
    ) {
        self.is_filtering = is_filtering;
        self.filtering_phase = if is_filtering {
            phase
        } else {
            FilteringPhase::Idle
        };
        if is_filtering {
            // Filtering is reachable from every phase.
            self.phase = CarouselPhase::Filtering;
        } else if self.phase == CarouselPhase::Filtering {
            self.phase = CarouselPhase::Idle;
            self.settle();
        }
        log::debug!(
            "Filtering state: is_filtering={} phase={}",
            self.is_filtering,
            self.filtering_phase
        );
        self.events.push(SystemEvent::FilteringStateChanged {
            is_filtering: self.is_filtering,
            phase: self.filtering_phase,
        });
    }

    /// Record a driver's readiness signal.
    pub fn register_platform_ready(&mut self, platform: Platform) -> Readiness {
        if platform != self.active_platform {
            log::debug!(
                "Ignoring {platform} readiness; session is driven by {}",
                self.active_platform
            );
            return Readiness::Ignored;
        }
        if self.is_layout_ready {
            return Readiness::AlreadyReady;
        }
        log::info!("Platform {platform} ready");
        self.is_layout_ready = true;
        self.events.push(SystemEvent::PlatformReady(platform));
        Readiness::Ready
    }

    /// True when the barrier is open and finalization has not run.
    pub fn check_overall_layout_readiness(&self) -> bool {
        self.is_layout_ready && !self.is_fully_initialized
    }

    pub(crate) fn mark_fully_initialized(&mut self) {
        self.is_fully_initialized = true;
        self.effects.push(Effect::RevealUi);
        self.events.push(SystemEvent::LayoutFinalized {
            active_index: self.active_card_index,
        });
    }

    /// Re-sync surface state from the registry.
    ///
    /// Ensures the active card is visible, recomputes the dot window and
    /// emits a render projection. Emits nothing when neither projection
    /// changed since the last call.
    pub fn update_ui(&mut self, now_ms: u64) {
        self.ensure_active_card_visible();

        let snapshot = self.render_snapshot();
        if self.last_render.as_ref() != Some(&snapshot) {
            self.effects.push(Effect::Render(snapshot.clone()));
            self.last_render = Some(snapshot);
        }

        let filtered = self.filtered_flags();
        let update = self.dots.update(self.active_card_index, &filtered);
        match (update.shift, update.prepare) {
            (Some(shift), Some(prepare)) if self.last_dots.is_some() => {
                log::trace!(
                    "Dot window shift {} -> {}",
                    shift.from_start,
                    shift.to_start
                );
                let token = self.dot_generation.bump();
                self.effects.push(Effect::Dots {
                    window: prepare.clone(),
                    transition: DotTransition::Prepare,
                });
                self.last_dots = Some(prepare);
                self.pending_dots = Some(update.window.clone());
                self.timers.schedule(
                    now_ms,
                    SHIFT_SECOND_PHASE_MS,
                    SystemTask::ApplyDotShift(token, update.window),
                );
            }
            _ if self.pending_dots.as_ref() == Some(&update.window) => {
                log::trace!("Dot window shift already pending");
            }
            _ => {
                self.pending_dots = None;
                if self.last_dots.as_ref() != Some(&update.window) {
                    // Supersede any pending second phase.
                    self.dot_generation.bump();
                    self.effects.push(Effect::Dots {
                        window: update.window.clone(),
                        transition: DotTransition::Instant,
                    });
                    self.last_dots = Some(update.window);
                }
            }
        }
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            active_index: self.active_card_index,
            cards: self
                .cards
                .iter()
                .map(|c| CardView {
                    index: c.index,
                    active: c.index == self.active_card_index,
                    filtered: c.filtered,
                    flipped: c.flipped,
                })
                .collect(),
        }
    }

    // ===== Timers =====

    pub fn next_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    /// Run the earliest registry task due at `now_ms`. Returns false when
    /// nothing was due.
    pub fn fire_due(&mut self, now_ms: u64) -> bool {
        let Some((_, task)) = self.timers.pop_due(now_ms) else {
            return false;
        };
        match task {
            SystemTask::ManualFlipExpired(token) => {
                if self.manual_flip == Some(token) {
                    self.manual_flip = None;
                }
            }
            SystemTask::ApplyDotShift(token, window) => {
                if self.dot_generation.is_current(token) {
                    self.effects.push(Effect::Dots {
                        window: window.clone(),
                        transition: DotTransition::Shift,
                    });
                    self.last_dots = Some(window);
                    self.pending_dots = None;
                } else {
                    log::trace!("Dropping stale dot shift {token}");
                }
            }
        }
        true
    }

    // ===== Outbox =====

    pub fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn drain_events(&mut self) -> Vec<SystemEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverflow_model::cards_from_summaries;

    fn system(n: usize) -> CardSystem {
        let cards = cards_from_summaries(
            (0..n).map(|i| (format!("card {i}"), None)),
        );
        CardSystem::new(cards, Platform::Desktop, &RuntimeConfig::default())
    }

    fn flipped_count(sys: &CardSystem) -> usize {
        sys.cards().iter().filter(|c| c.flipped).count()
    }

    #[test]
    fn at_most_one_card_flipped() {
        let mut sys = system(5);
        for index in [0, 3, 3, 1, 4, 2, 0] {
            sys.flip_card(index).unwrap();
            assert_eq!(flipped_count(&sys), 1);
            assert_eq!(sys.currently_flipped_card(), Some(index));
        }
        sys.unflip_card(0);
        assert_eq!(flipped_count(&sys), 0);
        assert_eq!(sys.currently_flipped_card(), None);
    }

    #[test]
    fn navigation_skips_filtered_cards() {
        let mut sys = system(3);
        sys.set_card_filtered(1, true).unwrap();
        assert_eq!(sys.find_next_visible_index(0), Some(2));
        assert_eq!(sys.find_prev_visible_index(2), Some(0));
        assert_eq!(sys.find_next_visible_index(2), None);
        assert_eq!(sys.find_prev_visible_index(0), None);
    }

    #[test]
    fn set_active_redirects_off_filtered_cards() {
        let mut sys = system(4);
        sys.set_card_filtered(2, true).unwrap();
        assert_eq!(sys.set_active_index(2).unwrap(), 3);
        sys.set_card_filtered(3, true).unwrap();
        assert_eq!(sys.set_active_index(3).unwrap(), 1);
        assert!(sys.set_active_index(9).is_err());
    }

    #[test]
    fn update_ui_keeps_active_card_visible() {
        let mut sys = system(4);
        sys.set_active_index(2).unwrap();
        sys.set_card_filtered(2, true).unwrap();
        sys.update_ui(0);
        assert_eq!(sys.active_card_index(), 3);
        assert!(!sys.cards()[3].filtered);

        for i in 0..4 {
            sys.set_card_filtered(i, true).unwrap();
        }
        sys.update_ui(10);
        assert_eq!(sys.active_card_index(), 3, "nothing visible: unchanged");
    }

    #[test]
    fn update_ui_twice_emits_once() {
        let mut sys = system(4);
        sys.update_ui(0);
        assert!(!sys.drain_effects().is_empty());
        sys.update_ui(5);
        assert!(sys.drain_effects().is_empty());
    }

    #[test]
    fn reset_flipped_card_spares_the_active_card() {
        let mut sys = system(3);
        sys.flip_card(0).unwrap();
        assert!(!sys.reset_flipped_card());
        assert!(sys.cards()[0].flipped);

        sys.set_active_index(1).unwrap();
        assert!(sys.reset_flipped_card());
        assert!(!sys.cards()[0].flipped);
    }

    #[test]
    fn height_adjust_is_followed_by_reflow() {
        let mut sys = system(2);
        sys.drain_effects();
        assert_eq!(sys.adjust_card_height(1, true, Some(640.0)), 640.0);
        assert_eq!(sys.adjust_card_height(1, true, Some(120.0)), 400.0);
        assert_eq!(sys.adjust_card_height(1, false, Some(640.0)), 400.0);
        let effects = sys.drain_effects();
        assert_eq!(
            effects[..2],
            [
                Effect::SetCardHeight {
                    index: 1,
                    height: 640.0
                },
                Effect::ForceReflow
            ]
        );
        assert_eq!(effects.len(), 6);
    }

    #[test]
    fn manual_flip_guard_expires_with_latest_token() {
        let mut sys = system(2);
        sys.begin_manual_flip(0);
        sys.begin_manual_flip(300);
        assert!(sys.is_manually_flipping());
        // First guard's timer fires but belongs to a superseded token.
        assert!(sys.fire_due(500));
        assert!(sys.is_manually_flipping());
        assert!(sys.fire_due(800));
        assert!(!sys.is_manually_flipping());
    }

    #[test]
    fn other_platform_readiness_is_ignored() {
        let mut sys = system(2);
        assert_eq!(sys.register_platform_ready(Platform::Touch), Readiness::Ignored);
        assert!(!sys.is_layout_ready());
        assert_eq!(sys.register_platform_ready(Platform::Desktop), Readiness::Ready);
        assert_eq!(
            sys.register_platform_ready(Platform::Desktop),
            Readiness::AlreadyReady
        );
        assert!(sys.check_overall_layout_readiness());
    }

    #[test]
    fn rejected_transition_keeps_phase() {
        let mut sys = system(2);
        sys.set_filtering_state(true, FilteringPhase::Filtering);
        assert_eq!(sys.phase(), CarouselPhase::Filtering);
        assert!(sys.transition(CarouselPhase::Dragging).is_err());
        assert_eq!(sys.phase(), CarouselPhase::Filtering);
        sys.set_filtering_state(false, FilteringPhase::Idle);
        assert_eq!(sys.phase(), CarouselPhase::Idle);
        assert!(!sys.is_filtering());
    }

    #[test]
    fn dot_shift_second_phase_is_token_checked() {
        let mut sys = system(20);
        sys.update_ui(0);
        sys.set_active_index(7).unwrap();
        sys.update_ui(100);
        let effects = sys.drain_effects();
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Dots {
                transition: DotTransition::Prepare,
                ..
            }
        )));
        // Jumping elsewhere before the second phase supersedes it.
        sys.set_active_index(0).unwrap();
        sys.update_ui(120);
        sys.drain_effects();
        assert!(sys.fire_due(142));
        let effects = sys.drain_effects();
        assert!(!effects.iter().any(|e| matches!(
            e,
            Effect::Dots {
                transition: DotTransition::Shift,
                ..
            }
        )));
    }

    #[test]
    fn repeated_update_keeps_a_pending_dot_shift() {
        let mut sys = system(20);
        sys.update_ui(0);
        sys.set_active_index(7).unwrap();
        sys.update_ui(100);
        sys.drain_effects();

        sys.update_ui(105);
        assert!(sys.drain_effects().is_empty());

        assert!(sys.fire_due(142));
        let effects = sys.drain_effects();
        assert!(matches!(
            effects.as_slice(),
            [Effect::Dots {
                transition: DotTransition::Shift,
                window,
            }] if window.start == 3
        ));
        sys.update_ui(150);
        assert!(sys.drain_effects().is_empty());
    }
}
