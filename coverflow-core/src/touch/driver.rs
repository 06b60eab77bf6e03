use coverflow_contracts::layout::LayoutProbe;
use coverflow_model::{CarouselPhase, Direction};

use super::config::TouchTuning;
use super::gesture::{Axis, DragGesture, apply_edge_resistance};
use super::overlay::OverlayState;
use crate::animator::ScrollAnimator;
use crate::effects::Effect;
use crate::registry::CardSystem;
use crate::timers::{Generation, TimerQueue, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchTask {
    SnapEnd(Token),
}

#[derive(Debug)]
pub struct TouchDriver {
    tuning: TouchTuning,
    scroll_left: f32,
    gesture: Option<DragGesture>,
    /// Mirrors the surface's snap transition so an interrupting touch knows
    /// where the track is.
    snap: ScrollAnimator,
    snap_generation: Generation,
    overlay: Option<OverlayState>,
    timers: TimerQueue<TouchTask>,
}

impl TouchDriver {
    pub fn new(tuning: TouchTuning) -> Self {
        Self {
            tuning,
            scroll_left: 0.0,
            gesture: None,
            snap: ScrollAnimator::new(),
            snap_generation: Generation::new(),
            overlay: None,
            timers: TimerQueue::new(),
        }
    }

    pub fn tuning(&self) -> &TouchTuning {
        &self.tuning
    }

    pub fn scroll_left(&self) -> f32 {
        self.scroll_left
    }

    pub fn gesture(&self) -> Option<&DragGesture> {
        self.gesture.as_ref()
    }

    pub fn overlay(&self) -> Option<&OverlayState> {
        self.overlay.as_ref()
    }

    pub fn is_snapping(&self) -> bool {
        self.snap.is_active()
    }

    // ===== Drag =====

    pub fn touch_start(
        &mut self,
        system: &mut CardSystem,
        x: f32,
        y: f32,
        now_ms: u64,
    ) -> bool {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.begin_touch(x, y);
            return true;
        }
        if !system.accepts_navigation() {
            return false;
        }
        self.commit_snap(system, now_ms);
        if let Err(err) = system.transition(CarouselPhase::Dragging) {
            log::debug!("{err}");
            return false;
        }
        self.gesture = Some(DragGesture::new(x, y, self.scroll_left, now_ms));
        true
    }

    pub fn touch_move(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        x: f32,
        y: f32,
    ) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.move_touch(x, y);
            return;
        }
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        gesture.track(x, y);
        match gesture.lock_axis(self.tuning.axis_lock_px) {
            None => return,
            Some(Axis::Vertical) => {
                log::trace!("Vertical gesture released to native scroll");
                self.gesture = None;
                system.settle();
                return;
            }
            Some(Axis::Horizontal) => {}
        }
        let (dx, start_scroll, previous) =
            (gesture.dx(), gesture.start_scroll, gesture.pretarget);

        let offset = self.resisted(system, probe, start_scroll - dx);
        self.scroll_left = offset;
        system.push_effect(Effect::SetScrollLeft(offset));

        let pretarget = self.pretarget_for(system, probe, dx);
        if pretarget != previous {
            if let Some(gesture) = self.gesture.as_mut() {
                gesture.pretarget = pretarget;
            }
            system.push_effect(Effect::SetPretarget(pretarget));
        }
    }

    pub fn touch_end(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        now_ms: u64,
    ) {
        if let Some(overlay) = self.overlay.as_mut() {
            if let Some(direction) =
                overlay.end_touch(self.tuning.overlay_swipe_px)
            {
                self.close_overlay(system, now_ms);
                self.step(system, probe, direction, now_ms);
            }
            return;
        }
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        if gesture.axis != Some(Axis::Horizontal) {
            system.settle();
            return;
        }
        if gesture.pretarget.is_some() {
            system.push_effect(Effect::SetPretarget(None));
        }

        let active = system.active_card_index();
        let distance = gesture.dx().abs();
        let elapsed = now_ms.saturating_sub(gesture.started_at_ms);
        let threshold = probe
            .card_box(active)
            .map(|b| self.tuning.threshold_for(b.width))
            .unwrap_or(f32::INFINITY);
        let neighbour =
            gesture.direction().and_then(|d| adjacent(system, active, d));

        let target = match gesture.pretarget {
            Some(pretarget) => pretarget,
            None if self.tuning.is_quick_swipe(distance, elapsed)
                || distance > threshold =>
            {
                neighbour.unwrap_or(active)
            }
            None => active,
        };
        self.snap_to(system, probe, target, now_ms);
    }

    // ===== Taps and overlay =====

    /// Tap on a card: the active card opens its overlay, any other card
    /// becomes active.
    pub fn tap_card(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        now_ms: u64,
    ) -> bool {
        if self.overlay.is_some() || !system.accepts_navigation() {
            return false;
        }
        if !system.card(index).is_some_and(|c| c.is_navigable()) {
            return false;
        }
        if index == system.active_card_index() {
            self.open_overlay(system, index, now_ms)
        } else {
            self.snap_to(system, probe, index, now_ms)
        }
    }

    pub fn open_overlay(
        &mut self,
        system: &mut CardSystem,
        index: usize,
        now_ms: u64,
    ) -> bool {
        if let Err(err) = system.flip_card(index) {
            log::warn!("Cannot open overlay: {err}");
            return false;
        }
        if let Err(err) = system.transition(CarouselPhase::Flipped) {
            log::debug!("{err}");
        }
        system.begin_manual_flip(now_ms);
        system.push_effect(Effect::OpenOverlay { index });
        system.push_effect(Effect::ResetNestedScroll { index });
        system.push_effect(Effect::LockDocumentScroll);
        self.overlay = Some(OverlayState::new(index));
        system.update_ui(now_ms);
        true
    }

    pub fn close_overlay(&mut self, system: &mut CardSystem, now_ms: u64) -> bool {
        let Some(overlay) = self.overlay.take() else {
            return false;
        };
        system.push_effect(Effect::CloseOverlay);
        system.unflip_card(overlay.index);
        system.push_effect(Effect::RestoreDocumentScroll);
        system.settle();
        system.update_ui(now_ms);
        true
    }

    // ===== Positioning =====

    pub fn click_dot(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        now_ms: u64,
    ) -> bool {
        if !system.accepts_navigation()
            || !system.card(index).is_some_and(|c| c.is_navigable())
        {
            return false;
        }
        self.snap_to(system, probe, index, now_ms)
    }

    pub fn step(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        direction: Direction,
        now_ms: u64,
    ) -> bool {
        if !system.accepts_navigation() {
            return false;
        }
        match adjacent(system, system.active_card_index(), direction) {
            Some(target) => self.snap_to(system, probe, target, now_ms),
            None => false,
        }
    }

    pub fn position_to(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        animate: bool,
        now_ms: u64,
    ) -> bool {
        if animate {
            return self.snap_to(system, probe, index, now_ms);
        }
        self.close_overlay(system, now_ms);
        self.cancel_snap();
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

    // ===== Timers =====

    pub fn next_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn fire_due(&mut self, system: &mut CardSystem, now_ms: u64) -> bool {
        let Some((_, task)) = self.timers.pop_due(now_ms) else {
            return false;
        };
        self.handle_task(system, task);
        true
    }

    pub fn handle_task(&mut self, system: &mut CardSystem, task: TouchTask) {
        match task {
            TouchTask::SnapEnd(token) => {
                if !self.snap_generation.is_current(token) {
                    log::trace!("Dropping superseded snap {token}");
                    return;
                }
                self.snap.cancel();
                self.scroll_left = self.snap.target();
                system.push_effect(Effect::SetScrollLeft(self.scroll_left));
                system.settle();
            }
        }
    }

    // ===== Internals =====

    fn snap_to(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        now_ms: u64,
    ) -> bool {
        // Moving away from the overlay's card closes it.
        self.close_overlay(system, now_ms);
        let target = match system.set_active_index(index) {
            Ok(target) => target,
            Err(err) => {
                log::warn!("Cannot snap carousel: {err}");
                system.settle();
                return false;
            }
        };
        system.reset_flipped_card();
        let Some(offset) = probe.centered_offset(target) else {
            log::warn!("Card {target} has no layout; skipping snap");
            system.settle();
            return false;
        };

        self.cancel_snap();
        let token = self.snap_generation.current();
        let duration = self.tuning.snap_duration_ms;
        let timing = self.tuning.snap_timing;
        self.snap
            .start(now_ms, self.scroll_left, offset, duration, timing);
        system.push_effect(Effect::AnimateScrollTo {
            offset,
            duration_ms: duration,
            timing,
        });
        self.timers
            .schedule(now_ms, duration, TouchTask::SnapEnd(token));
        if let Err(err) = system.transition(CarouselPhase::Animating) {
            log::debug!("{err}");
        }
        system.update_ui(now_ms);
        true
    }

    /// Supersede any snap in flight. The pending completion timer keeps its
    /// old token and drops itself when it fires.
    fn cancel_snap(&mut self) {
        self.snap.cancel();
        self.snap_generation.bump();
    }

    /// Pin the offset an in-flight snap had reached.
    fn commit_snap(&mut self, system: &mut CardSystem, now_ms: u64) {
        if let Some(reached) = self.snap.interrupt(now_ms) {
            self.snap_generation.bump();
            self.scroll_left = reached;
            system.push_effect(Effect::SetScrollLeft(reached));
        }
    }

    fn resisted(
        &self,
        system: &CardSystem,
        probe: &dyn LayoutProbe,
        raw: f32,
    ) -> f32 {
        let bounds = system
            .first_visible_index()
            .zip(system.last_visible_index())
            .and_then(|(first, last)| {
                probe.centered_offset(first).zip(probe.centered_offset(last))
            });
        match bounds {
            Some((min, max)) => apply_edge_resistance(
                raw,
                min,
                max,
                self.tuning.edge_resistance,
            ),
            None => raw,
        }
    }

    fn pretarget_for(
        &self,
        system: &CardSystem,
        probe: &dyn LayoutProbe,
        dx: f32,
    ) -> Option<usize> {
        let active = system.active_card_index();
        let width = probe.card_box(active)?.width;
        let threshold = self.tuning.threshold_for(width);
        if threshold <= 0.0 {
            return None;
        }
        let progress = dx.abs() / threshold;
        if progress <= self.tuning.pretarget_progress {
            return None;
        }
        adjacent(system, active, Direction::from_delta(-dx)?)
    }
}

fn adjacent(
    system: &CardSystem,
    from: usize,
    direction: Direction,
) -> Option<usize> {
    match direction {
        Direction::Next => system.find_next_visible_index(from),
        Direction::Prev => system.find_prev_visible_index(from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::Timing;
    use crate::config::RuntimeConfig;
    use coverflow_contracts::geometry::Viewport;
    use coverflow_contracts::layout::UniformLayout;
    use coverflow_model::{Platform, cards_from_summaries};

    fn setup(n: usize) -> (CardSystem, TouchDriver, UniformLayout) {
        let cards =
            cards_from_summaries((0..n).map(|i| (format!("card {i}"), None)));
        let sys =
            CardSystem::new(cards, Platform::Touch, &RuntimeConfig::default());
        // Cards centre at multiples of 320px.
        let probe = UniformLayout::new(
            Viewport::new(390.0, 844.0, true),
            300.0,
            20.0,
            n,
        );
        (sys, TouchDriver::new(TouchTuning::default()), probe)
    }

    fn drag(
        sys: &mut CardSystem,
        driver: &mut TouchDriver,
        probe: &UniformLayout,
        dx: f32,
        start_ms: u64,
        end_ms: u64,
    ) {
        driver.touch_start(sys, 200.0, 400.0, start_ms);
        driver.touch_move(sys, probe, 200.0 + dx, 400.0);
        driver.touch_end(sys, probe, end_ms);
    }

    #[test]
    fn track_follows_finger_with_edge_resistance() {
        let (mut sys, mut driver, probe) = setup(5);
        assert!(driver.touch_start(&mut sys, 200.0, 400.0, 0));
        assert_eq!(sys.phase(), CarouselPhase::Dragging);
        driver.touch_move(&mut sys, &probe, 100.0, 400.0);
        assert_eq!(driver.scroll_left(), 100.0);
        driver.touch_move(&mut sys, &probe, 300.0, 400.0);
        assert!((driver.scroll_left() + 30.0).abs() < 1e-3);
    }

    #[test]
    fn pretarget_tracks_half_threshold() {
        let (mut sys, mut driver, probe) = setup(5);
        driver.touch_start(&mut sys, 200.0, 400.0, 0);
        // Threshold is 120px; the highlight needs more than 60px.
        driver.touch_move(&mut sys, &probe, 150.0, 400.0);
        assert_eq!(driver.gesture().and_then(|g| g.pretarget), None);
        sys.drain_effects();

        driver.touch_move(&mut sys, &probe, 130.0, 400.0);
        assert_eq!(driver.gesture().and_then(|g| g.pretarget), Some(1));
        assert!(sys.drain_effects().contains(&Effect::SetPretarget(Some(1))));

        driver.touch_move(&mut sys, &probe, 160.0, 400.0);
        assert_eq!(driver.gesture().and_then(|g| g.pretarget), None);
        assert!(sys.drain_effects().contains(&Effect::SetPretarget(None)));
    }

    #[test]
    fn release_commits_pretarget_and_snaps() {
        let (mut sys, mut driver, probe) = setup(5);
        drag(&mut sys, &mut driver, &probe, -70.0, 0, 1000);
        assert_eq!(sys.active_card_index(), 1);
        assert_eq!(sys.phase(), CarouselPhase::Animating);
        let effects = sys.drain_effects();
        assert!(effects.contains(&Effect::AnimateScrollTo {
            offset: 320.0,
            duration_ms: 270,
            timing: Timing::bezier((0.25, 0.46, 0.45, 0.94)),
        }));

        assert_eq!(driver.next_due(), Some(1270));
        assert!(driver.fire_due(&mut sys, 1270));
        assert_eq!(driver.scroll_left(), 320.0);
        assert_eq!(sys.phase(), CarouselPhase::Idle);
    }

    #[test]
    fn quick_swipe_advances_slow_drag_stays() {
        let (mut sys, mut driver, probe) = setup(5);
        drag(&mut sys, &mut driver, &probe, -40.0, 0, 200);
        assert_eq!(sys.active_card_index(), 1);

        driver.fire_due(&mut sys, 470);
        drag(&mut sys, &mut driver, &probe, -40.0, 1000, 1500);
        assert_eq!(sys.active_card_index(), 1);

        driver.fire_due(&mut sys, 1770);
        drag(&mut sys, &mut driver, &probe, 130.0, 2000, 3000);
        assert_eq!(sys.active_card_index(), 0, "past the threshold");
    }

    #[test]
    fn swipe_past_last_card_stays_put() {
        let (mut sys, mut driver, probe) = setup(2);
        driver.position_to(&mut sys, &probe, 1, false, 0);
        drag(&mut sys, &mut driver, &probe, -200.0, 10, 50);
        assert_eq!(sys.active_card_index(), 1);
    }

    #[test]
    fn vertical_movement_is_released() {
        let (mut sys, mut driver, probe) = setup(3);
        driver.touch_start(&mut sys, 200.0, 400.0, 0);
        driver.touch_move(&mut sys, &probe, 195.0, 430.0);
        assert!(driver.gesture().is_none());
        assert_eq!(sys.phase(), CarouselPhase::Idle);
        sys.drain_effects();
        driver.touch_end(&mut sys, &probe, 100);
        assert!(sys.drain_effects().is_empty());
    }

    #[test]
    fn touch_during_snap_commits_and_supersedes() {
        let (mut sys, mut driver, probe) = setup(5);
        drag(&mut sys, &mut driver, &probe, -80.0, 0, 1000);
        sys.drain_effects();
        assert!(driver.touch_start(&mut sys, 200.0, 400.0, 1135));
        let effects = sys.drain_effects();
        let Some(Effect::SetScrollLeft(reached)) = effects.first() else {
            panic!("expected committed offset, got {effects:?}");
        };
        assert!(*reached > 80.0 && *reached < 320.0);
        assert_eq!(sys.phase(), CarouselPhase::Dragging);

        // The old completion fires but belongs to the superseded snap.
        assert!(driver.fire_due(&mut sys, 1270));
        assert_eq!(sys.phase(), CarouselPhase::Dragging);
        assert!(sys.drain_effects().is_empty());
    }

    #[test]
    fn tap_opens_overlay_and_swipe_closes_it() {
        let (mut sys, mut driver, probe) = setup(3);
        assert!(driver.tap_card(&mut sys, &probe, 0, 0));
        assert!(sys.cards()[0].flipped);
        assert_eq!(sys.phase(), CarouselPhase::Flipped);
        let effects = sys.drain_effects();
        assert!(effects.contains(&Effect::OpenOverlay { index: 0 }));
        assert!(effects.contains(&Effect::ResetNestedScroll { index: 0 }));

        // Vertical swipe scrolls the overlay.
        driver.touch_start(&mut sys, 200.0, 600.0, 100);
        driver.touch_move(&mut sys, &probe, 190.0, 300.0);
        driver.touch_end(&mut sys, &probe, 200);
        assert!(driver.overlay().is_some());

        driver.touch_start(&mut sys, 300.0, 400.0, 300);
        driver.touch_move(&mut sys, &probe, 220.0, 410.0);
        driver.touch_end(&mut sys, &probe, 350);
        assert!(driver.overlay().is_none());
        assert!(!sys.cards()[0].flipped);
        assert_eq!(sys.active_card_index(), 1);
        let effects = sys.drain_effects();
        assert!(effects.contains(&Effect::CloseOverlay));
        assert!(effects.contains(&Effect::RestoreDocumentScroll));
    }

    #[test]
    fn tapping_another_card_moves_to_it() {
        let (mut sys, mut driver, probe) = setup(4);
        assert!(driver.tap_card(&mut sys, &probe, 2, 0));
        assert_eq!(sys.active_card_index(), 2);
        assert!(driver.overlay().is_none());
        assert!(driver.is_snapping());
        sys.set_card_filtered(3, true).unwrap();
        assert!(!driver.tap_card(&mut sys, &probe, 3, 10));
    }

    #[test]
    fn moving_elsewhere_closes_the_overlay() {
        let (mut sys, mut driver, probe) = setup(4);
        assert!(driver.tap_card(&mut sys, &probe, 0, 0));
        sys.drain_effects();

        assert!(driver.click_dot(&mut sys, &probe, 2, 100));
        assert!(driver.overlay().is_none());
        assert_eq!(sys.currently_flipped_card(), None);
        assert_eq!(sys.active_card_index(), 2);
        let effects = sys.drain_effects();
        assert!(effects.contains(&Effect::CloseOverlay));
        assert!(effects.contains(&Effect::RestoreDocumentScroll));
        driver.fire_due(&mut sys, 400);
        assert_eq!(sys.phase(), CarouselPhase::Idle);

        // Touches reach the carousel again.
        assert!(driver.touch_start(&mut sys, 200.0, 400.0, 500));
        assert!(driver.gesture().is_some());
        driver.touch_end(&mut sys, &probe, 550);

        assert!(driver.tap_card(&mut sys, &probe, 2, 600));
        assert!(driver.position_to(&mut sys, &probe, 1, false, 700));
        assert!(driver.overlay().is_none());
        assert!(!sys.cards()[2].flipped);
        assert_eq!(sys.phase(), CarouselPhase::Idle);
    }
}
