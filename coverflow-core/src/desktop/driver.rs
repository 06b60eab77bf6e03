use coverflow_contracts::geometry::{CardBox, Viewport};
use coverflow_contracts::layout::LayoutProbe;
use coverflow_model::{CarouselPhase, Direction};

use super::config::DesktopTuning;
use crate::animator::{ScrollAnimator, Timing};
use crate::effects::Effect;
use crate::registry::CardSystem;
use crate::timers::{Generation, TimerQueue, Token};

/// Where a flipped card stands relative to the viewport center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraceState {
    Centered,
    /// Off-center; the card closes when the token's timer fires.
    Pending(Token),
    /// The grace period ran out and the card was closed.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopTask {
    GraceExpired(Token),
    /// Deferred centering of a card flipped during wheel momentum.
    CenterPoll { token: Token, started_at_ms: u64 },
    CollapseDone(Token),
}

#[derive(Debug)]
pub struct DesktopDriver {
    tuning: DesktopTuning,
    scroll_left: f32,
    animator: ScrollAnimator,
    momentum_until_ms: u64,
    grace: GraceState,
    grace_generation: Generation,
    poll_generation: Generation,
    collapse_generation: Generation,
    timers: TimerQueue<DesktopTask>,
}

impl DesktopDriver {
    pub fn new(tuning: DesktopTuning) -> Self {
        Self {
            tuning,
            scroll_left: 0.0,
            animator: ScrollAnimator::new(),
            momentum_until_ms: 0,
            grace: GraceState::Centered,
            grace_generation: Generation::new(),
            poll_generation: Generation::new(),
            collapse_generation: Generation::new(),
            timers: TimerQueue::new(),
        }
    }

    pub fn tuning(&self) -> &DesktopTuning {
        &self.tuning
    }

    pub fn scroll_left(&self) -> f32 {
        self.scroll_left
    }

    pub fn grace(&self) -> GraceState {
        self.grace
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_active()
    }

    pub fn animator(&self) -> &ScrollAnimator {
        &self.animator
    }

    pub fn momentum_active(&self, now_ms: u64) -> bool {
        now_ms < self.momentum_until_ms
    }

    // ===== Input =====

    /// Arrow key or nav arrow: step to the adjacent unfiltered card.
    pub fn navigate(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        direction: Direction,
        now_ms: u64,
    ) -> bool {
        if !system.accepts_navigation() {
            return false;
        }
        let from = system.active_card_index();
        let target = match direction {
            Direction::Next => system.find_next_visible_index(from),
            Direction::Prev => system.find_prev_visible_index(from),
        };
        let Some(target) = target else {
            log::trace!("No unfiltered card {direction:?} of {from}");
            return false;
        };
        self.go_to(system, probe, target, now_ms)
    }

    pub fn click_dot(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        now_ms: u64,
    ) -> bool {
        if !system.accepts_navigation() {
            return false;
        }
        match system.card(index) {
            Some(card) if card.is_navigable() => {
                self.go_to(system, probe, index, now_ms)
            }
            _ => {
                log::debug!("Ignoring dot click on unavailable card {index}");
                false
            }
        }
    }

    /// Click on a card face: recenter a mostly hidden card, otherwise
    /// toggle its flip.
    pub fn click_card(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        now_ms: u64,
    ) -> bool {
        if !system.accepts_navigation() {
            return false;
        }
        let was_flipped = match system.card(index) {
            Some(card) if card.is_navigable() => card.flipped,
            _ => return false,
        };
        let viewport = probe.viewport();
        let Some(card_box) = probe.card_box(index) else {
            log::warn!("Card {index} has no layout; ignoring click");
            return false;
        };

        let ratio = card_box.visible_ratio(self.scroll_left, viewport.width);
        if ratio < self.tuning.min_visible_ratio {
            log::debug!(
                "Card {index} is {:.0}% visible; recentering",
                ratio * 100.0
            );
            return self.go_to(system, probe, index, now_ms);
        }

        if was_flipped {
            self.begin_unflip(system, index, now_ms);
            system.update_ui(now_ms);
            return true;
        }
        self.flip(system, probe, index, viewport, card_box, now_ms)
    }

    pub fn wheel(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        delta: f32,
        now_ms: u64,
    ) -> bool {
        if !system.accepts_navigation() {
            return false;
        }
        self.momentum_until_ms = now_ms + self.tuning.momentum_for(delta);
        self.commit_animation(system, now_ms);
        system.settle();

        let max = probe.max_scroll_left().max(0.0);
        self.scroll_left = (self.scroll_left + delta).clamp(0.0, max);
        system.push_effect(Effect::SetScrollLeft(self.scroll_left));

        self.sync_active_to_center(system, probe);
        self.check_grace(system, probe, now_ms);
        system.update_ui(now_ms);
        true
    }

    /// The surface reports a native scroll position.
    pub fn on_scroll(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        scroll_left: f32,
        now_ms: u64,
    ) {
        self.scroll_left = scroll_left;
        if self.animator.is_active() {
            return;
        }
        self.sync_active_to_center(system, probe);
        self.check_grace(system, probe, now_ms);
        system.update_ui(now_ms);
    }

    /// Sample the scroll tween. Returns whether an animation was running.
    pub fn frame(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        now_ms: u64,
    ) -> bool {
        let Some(offset) = self.animator.tick(now_ms) else {
            return false;
        };
        self.scroll_left = offset;
        system.push_effect(Effect::SetScrollLeft(offset));
        if !self.animator.is_active() {
            system.settle();
            self.check_grace(system, probe, now_ms);
        }
        true
    }

    pub fn resize(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        now_ms: u64,
    ) {
        let active = system.active_card_index();
        self.position_to(system, probe, active, false, now_ms);
        system.update_ui(now_ms);
    }

    /// Bring `index` (or the nearest unfiltered card) to the center.
    pub fn position_to(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        animate: bool,
        now_ms: u64,
    ) -> bool {
        if animate {
            return self.go_to(system, probe, index, now_ms);
        }
        self.animator.cancel();
        let target = match system.set_active_index(index) {
            Ok(target) => target,
            Err(err) => {
                log::warn!("Cannot position carousel: {err}");
                return false;
            }
        };
        let Some(offset) = probe.centered_offset(target) else {
            log::warn!("Card {target} has no layout; skipping positioning");
            return false;
        };
        self.scroll_left = offset;
        system.push_effect(Effect::SetScrollLeft(offset));
        system.settle();
        true
    }

    // ===== Timers =====

    pub fn next_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn fire_due(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        now_ms: u64,
    ) -> bool {
        let Some((_, task)) = self.timers.pop_due(now_ms) else {
            return false;
        };
        self.handle_task(system, probe, task, now_ms);
        true
    }

    pub fn handle_task(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        task: DesktopTask,
        now_ms: u64,
    ) {
        match task {
            DesktopTask::GraceExpired(token) => {
                if !self.grace_generation.is_current(token) {
                    log::trace!("Dropping stale grace timer {token}");
                    return;
                }
                self.grace_expired(system, probe, now_ms);
            }
            DesktopTask::CenterPoll {
                token,
                started_at_ms,
            } => {
                if !self.poll_generation.is_current(token) {
                    return;
                }
                let waited = now_ms.saturating_sub(started_at_ms);
                if self.momentum_active(now_ms)
                    && waited < self.tuning.center_poll_max_ms
                {
                    self.timers.schedule(
                        now_ms,
                        self.tuning.center_poll_interval_ms,
                        DesktopTask::CenterPoll {
                            token,
                            started_at_ms,
                        },
                    );
                    return;
                }
                if let Some(index) = system.currently_flipped_card() {
                    self.center_if_off(system, probe, index, now_ms);
                }
            }
            DesktopTask::CollapseDone(token) => {
                if self.collapse_generation.is_current(token) {
                    system.push_effect(Effect::RestoreDocumentScroll);
                } else {
                    log::trace!("Dropping superseded collapse {token}");
                }
            }
        }
    }

    // ===== Internals =====

    fn go_to(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        now_ms: u64,
    ) -> bool {
        self.commit_animation(system, now_ms);
        let from = system.active_card_index();
        let target = match system.set_active_index(index) {
            Ok(target) => target,
            Err(err) => {
                log::warn!("Cannot move carousel: {err}");
                return false;
            }
        };
        self.reset_flipped(system, now_ms);
        let steps = visible_steps(system, from, target);
        self.animate_to_card(system, probe, target, steps, now_ms);
        system.update_ui(now_ms);
        true
    }

    fn flip(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        viewport: Viewport,
        card_box: CardBox,
        now_ms: u64,
    ) -> bool {
        self.commit_animation(system, now_ms);
        if let Err(err) = system.set_active_index(index) {
            log::warn!("Cannot flip card: {err}");
            return false;
        }
        if let Some(other) = system.currently_flipped_card()
            && other != index
        {
            self.begin_unflip(system, other, now_ms);
        }
        if let Err(err) = system.flip_card(index) {
            log::warn!("Cannot flip card: {err}");
            return false;
        }
        if let Err(err) = system.transition(CarouselPhase::Flipped) {
            log::debug!("{err}");
        }

        let content = probe.card_content(index);
        system.adjust_card_height(
            index,
            true,
            content.map(|c| c.back_content_height),
        );
        system.push_effect(Effect::SetLogoVisible(false));
        system.begin_manual_flip(now_ms);
        if viewport.is_desktop_width()
            && content.is_some_and(|c| c.back_overflows())
        {
            system.push_effect(Effect::ScrollIndicator {
                index,
                visible: true,
            });
        }

        self.clear_grace();
        if self.momentum_active(now_ms) {
            let token = self.poll_generation.bump();
            self.timers.schedule(
                now_ms,
                self.tuning.center_poll_interval_ms,
                DesktopTask::CenterPoll {
                    token,
                    started_at_ms: now_ms,
                },
            );
        } else {
            let off = card_box.center_offset(self.scroll_left, viewport.width);
            if off.abs() > self.tuning.center_tolerance_px {
                self.animate_to_card(system, probe, index, 1, now_ms);
            }
        }
        system.update_ui(now_ms);
        true
    }

    /// Close a flipped card without flashing scrollbars: the document is
    /// pinned until the collapse transition has finished.
    fn begin_unflip(
        &mut self,
        system: &mut CardSystem,
        index: usize,
        now_ms: u64,
    ) {
        if !system.card(index).is_some_and(|c| c.flipped) {
            return;
        }
        system.push_effect(Effect::LockDocumentScroll);
        system.unflip_card(index);
        let token = self.collapse_generation.bump();
        self.timers
            .cancel_where(|t| matches!(t, DesktopTask::CollapseDone(_)));
        self.timers.schedule(
            now_ms,
            self.tuning.collapse_transition_ms,
            DesktopTask::CollapseDone(token),
        );
        system.push_effect(Effect::SetLogoVisible(true));
        self.clear_grace();
    }

    fn reset_flipped(&mut self, system: &mut CardSystem, now_ms: u64) {
        if let Some(index) = system.currently_flipped_card()
            && index != system.active_card_index()
        {
            self.begin_unflip(system, index, now_ms);
        }
    }

    fn animate_to_card(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        steps: usize,
        now_ms: u64,
    ) -> bool {
        let Some(offset) = probe.centered_offset(index) else {
            log::warn!("Card {index} has no layout; skipping scroll");
            return false;
        };
        if (offset - self.scroll_left).abs() < 0.5 {
            system.settle();
            return true;
        }
        let duration = self.tuning.duration_for(steps);
        log::trace!(
            "Scrolling {:.0} -> {offset:.0} over {duration}ms",
            self.scroll_left
        );
        self.animator.start(
            now_ms,
            self.scroll_left,
            offset,
            duration,
            Timing::Eased(self.tuning.easing),
        );
        if let Err(err) = system.transition(CarouselPhase::Animating) {
            log::debug!("{err}");
        }
        true
    }

    /// Pin the offset an interrupted tween had reached.
    fn commit_animation(&mut self, system: &mut CardSystem, now_ms: u64) {
        if let Some(reached) = self.animator.interrupt(now_ms) {
            self.scroll_left = reached;
            system.push_effect(Effect::SetScrollLeft(reached));
        }
    }

    fn center_if_off(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        now_ms: u64,
    ) {
        match self.center_distance(probe, index) {
            Some(off) if off > self.tuning.center_tolerance_px => {
                self.animate_to_card(system, probe, index, 1, now_ms);
            }
            _ => {}
        }
    }

    fn center_distance(
        &self,
        probe: &dyn LayoutProbe,
        index: usize,
    ) -> Option<f32> {
        let viewport = probe.viewport();
        probe.card_box(index).map(|b| {
            b.center_offset(self.scroll_left, viewport.width).abs()
        })
    }

    fn sync_active_to_center(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
    ) {
        let viewport = probe.viewport();
        let nearest = system
            .cards()
            .iter()
            .filter(|c| c.is_navigable())
            .filter_map(|c| {
                probe.card_box(c.index).map(|b| {
                    let off = b.center_offset(self.scroll_left, viewport.width);
                    (c.index, off.abs())
                })
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index);
        if let Some(index) = nearest
            && index != system.active_card_index()
            && let Err(err) = system.set_active_index(index)
        {
            log::warn!("{err}");
        }
    }

    fn check_grace(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        now_ms: u64,
    ) {
        let Some(index) = system.currently_flipped_card() else {
            return;
        };
        let Some(off) = self.center_distance(probe, index) else {
            return;
        };
        if off <= self.tuning.center_tolerance_px {
            if self.grace != GraceState::Centered {
                log::trace!("Flipped card {index} back in center");
                self.clear_grace();
            }
            return;
        }
        if matches!(self.grace, GraceState::Pending(_)) {
            return;
        }
        self.arm_grace(now_ms);
    }

    fn arm_grace(&mut self, now_ms: u64) {
        let token = self.grace_generation.bump();
        self.grace = GraceState::Pending(token);
        self.timers.schedule(
            now_ms,
            self.tuning.grace_period_ms,
            DesktopTask::GraceExpired(token),
        );
    }

    fn grace_expired(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        now_ms: u64,
    ) {
        let Some(index) = system.currently_flipped_card() else {
            self.grace = GraceState::Centered;
            return;
        };
        if system.is_manually_flipping() {
            self.arm_grace(now_ms);
            return;
        }
        match self.center_distance(probe, index) {
            Some(off) if off > self.tuning.center_tolerance_px => {
                log::debug!("Flipped card {index} left center; closing");
                self.begin_unflip(system, index, now_ms);
                self.grace = GraceState::Expired;
                system.update_ui(now_ms);
            }
            _ => self.grace = GraceState::Centered,
        }
    }

    fn clear_grace(&mut self) {
        self.grace_generation.bump();
        self.timers
            .cancel_where(|t| matches!(t, DesktopTask::GraceExpired(_)));
        self.grace = GraceState::Centered;
    }
}

/// Unfiltered cards travelled between two positions.
fn visible_steps(system: &CardSystem, from: usize, to: usize) -> usize {
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    system
        .cards()
        .iter()
        .skip(lo + 1)
        .take(hi - lo)
        .filter(|c| c.is_navigable())
        .count()
        .max(1)
}
