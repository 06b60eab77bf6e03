//! Carousel session and layout finalizer
//!
//! `Coverflow` owns the registry, the driver for the platform fixed at
//! construction, and the host's [`LayoutProbe`]. It routes host messages,
//! merges the timer queues of every component into one virtual clock, and
//! runs the readiness barrier: once the driver has measured the cards the
//! stored filters are applied, the carousel is positioned and the UI is
//! revealed, exactly once.

use coverflow_contracts::layout::LayoutProbe;
use coverflow_contracts::store::KeyValueStore;
use coverflow_model::{Card, DeviceClass, FilterCriteria, FilteringPhase, Platform};

use crate::config::RuntimeConfig;
use crate::constants::init::{MEASURE_MAX_ATTEMPTS, MEASURE_RETRY_MS};
use crate::desktop::{DesktopDriver, DesktopTuning};
use crate::device;
use crate::effects::{Effect, SystemEvent};
use crate::filter::{self, FilterOutcome};
use crate::messages::CoverflowMessage;
use crate::prefs::FilterPreferences;
use crate::registry::{CardSystem, Readiness};
use crate::timers::TimerQueue;
use crate::touch::{TouchDriver, TouchTuning};

/// Supplies the filters applied while the layout is finalized.
pub trait FilterHook {
    fn finalize_criteria(&mut self) -> Option<FilterCriteria>;
}

/// Applies the filters stored by the filter forms when auto-apply is on.
#[derive(Debug)]
pub struct StoredFilterHook<S> {
    store: S,
}

impl<S: KeyValueStore> StoredFilterHook<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: KeyValueStore> FilterHook for StoredFilterHook<S> {
    fn finalize_criteria(&mut self) -> Option<FilterCriteria> {
        let prefs = FilterPreferences::load(&self.store);
        if !prefs.auto_apply {
            log::debug!("Stored filters present but auto-apply is off");
            return None;
        }
        Some(prefs.criteria)
    }
}

/// Navigation driver for the session's platform.
#[derive(Debug)]
pub enum Driver {
    Desktop(DesktopDriver),
    Touch(TouchDriver),
}

impl Driver {
    pub fn for_platform(platform: Platform, config: &RuntimeConfig) -> Self {
        match platform {
            Platform::Desktop => Driver::Desktop(DesktopDriver::new(
                DesktopTuning::from_runtime_config(config),
            )),
            Platform::Touch => Driver::Touch(TouchDriver::new(
                TouchTuning::from_runtime_config(config),
            )),
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            Driver::Desktop(_) => Platform::Desktop,
            Driver::Touch(_) => Platform::Touch,
        }
    }

    pub fn scroll_left(&self) -> f32 {
        match self {
            Driver::Desktop(d) => d.scroll_left(),
            Driver::Touch(t) => t.scroll_left(),
        }
    }

    pub fn as_desktop(&self) -> Option<&DesktopDriver> {
        match self {
            Driver::Desktop(d) => Some(d),
            Driver::Touch(_) => None,
        }
    }

    pub fn as_touch(&self) -> Option<&TouchDriver> {
        match self {
            Driver::Touch(t) => Some(t),
            Driver::Desktop(_) => None,
        }
    }

    fn position_to(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        index: usize,
        animate: bool,
        now_ms: u64,
    ) -> bool {
        match self {
            Driver::Desktop(d) => {
                d.position_to(system, probe, index, animate, now_ms)
            }
            Driver::Touch(t) => {
                t.position_to(system, probe, index, animate, now_ms)
            }
        }
    }

    fn resize(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        now_ms: u64,
    ) {
        match self {
            Driver::Desktop(d) => d.resize(system, probe, now_ms),
            Driver::Touch(t) => t.resize(system, probe, now_ms),
        }
    }

    fn next_due(&self) -> Option<u64> {
        match self {
            Driver::Desktop(d) => d.next_due(),
            Driver::Touch(t) => t.next_due(),
        }
    }

    fn fire_due(
        &mut self,
        system: &mut CardSystem,
        probe: &dyn LayoutProbe,
        now_ms: u64,
    ) -> bool {
        match self {
            Driver::Desktop(d) => d.fire_due(system, probe, now_ms),
            Driver::Touch(t) => t.fire_due(system, now_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTask {
    MeasureRetry { attempt: u32 },
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Session,
    System,
    Driver,
}

pub struct Coverflow<P> {
    system: CardSystem,
    driver: Driver,
    probe: P,
    device: DeviceClass,
    filter_hook: Option<Box<dyn FilterHook>>,
    timers: TimerQueue<SessionTask>,
    initialized: bool,
}

impl<P: LayoutProbe> Coverflow<P> {
    /// Build a session. The platform is classified from the probe's
    /// viewport here and never changes afterwards.
    pub fn new(cards: Vec<Card>, probe: P, config: &RuntimeConfig) -> Self {
        let device = device::classify(&probe.viewport());
        let platform = device.platform();
        log::info!(
            "Coverflow session: {} cards on {platform} (mobile={}, phone_landscape={})",
            cards.len(),
            device.is_mobile,
            device.phone_landscape
        );
        Self {
            system: CardSystem::new(cards, platform, config),
            driver: Driver::for_platform(platform, config),
            probe,
            device,
            filter_hook: None,
            timers: TimerQueue::new(),
            initialized: false,
        }
    }

    pub fn with_filter_hook(mut self, hook: impl FilterHook + 'static) -> Self {
        self.filter_hook = Some(Box::new(hook));
        self
    }

    pub fn system(&self) -> &CardSystem {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut CardSystem {
        &mut self.system
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Hosts update measurements through here when their layout changes.
    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn platform(&self) -> Platform {
        self.system.active_platform()
    }

    // ===== Startup =====

    /// Start measuring cards. The driver signals readiness as soon as the
    /// first card has a width, retrying on the timer queue for a bounded
    /// number of attempts.
    pub fn initialize(&mut self, now_ms: u64) {
        if self.initialized {
            log::debug!("Session already initialized");
            return;
        }
        self.initialized = true;
        self.try_measure(1, now_ms);
    }

    fn try_measure(&mut self, attempt: u32, now_ms: u64) {
        if self.probe.is_measured() {
            log::debug!("Cards measured after {attempt} attempt(s)");
            self.driver_ready(now_ms);
            return;
        }
        if attempt >= MEASURE_MAX_ATTEMPTS {
            log::warn!(
                "Cards still unmeasured after {attempt} attempts; continuing"
            );
            self.driver_ready(now_ms);
            return;
        }
        self.timers.schedule(
            now_ms,
            MEASURE_RETRY_MS,
            SessionTask::MeasureRetry {
                attempt: attempt + 1,
            },
        );
    }

    fn driver_ready(&mut self, now_ms: u64) {
        let platform = self.driver.platform();
        self.register_platform_ready(platform, now_ms);
    }

    /// Readiness signal from a driver. Opens the barrier and finalizes the
    /// layout when it comes from the session's platform.
    pub fn register_platform_ready(
        &mut self,
        platform: Platform,
        now_ms: u64,
    ) -> Readiness {
        let readiness = self.system.register_platform_ready(platform);
        if readiness == Readiness::Ready {
            self.finalize_layout(now_ms);
        }
        readiness
    }

    /// Apply stored filters, position the carousel and reveal the UI.
    /// Runs once; later calls are logged and ignored.
    pub fn finalize_layout(&mut self, now_ms: u64) -> bool {
        if self.system.is_fully_initialized() {
            log::debug!("Layout already finalized; ignoring");
            return false;
        }
        if !self.system.is_layout_ready() {
            log::warn!("Layout finalization requested before readiness");
            return false;
        }

        let criteria = self
            .filter_hook
            .as_mut()
            .and_then(|hook| hook.finalize_criteria())
            .filter(|criteria| !criteria.is_empty());
        match criteria {
            Some(criteria) => {
                self.run_filters(&criteria, false, now_ms);
            }
            None => {
                let active = self.system.active_card_index();
                self.driver.position_to(
                    &mut self.system,
                    &self.probe,
                    active,
                    false,
                    now_ms,
                );
            }
        }

        self.system.update_ui(now_ms);
        self.system.mark_fully_initialized();
        log::info!(
            "Layout finalized on card {} ({} visible)",
            self.system.active_card_index(),
            self.system.visible_count()
        );
        true
    }

    // ===== Collaborator operations =====

    /// Rewrite the filtered flags and move to the first visible card.
    pub fn apply_filters(
        &mut self,
        criteria: &FilterCriteria,
        now_ms: u64,
    ) -> FilterOutcome {
        let animate = self.system.is_fully_initialized();
        self.run_filters(criteria, animate, now_ms)
    }

    fn run_filters(
        &mut self,
        criteria: &FilterCriteria,
        animate: bool,
        now_ms: u64,
    ) -> FilterOutcome {
        let outcome = filter::apply_filters(&mut self.system, criteria);
        match outcome.first_visible {
            Some(first) => {
                self.driver.position_to(
                    &mut self.system,
                    &self.probe,
                    first,
                    animate,
                    now_ms,
                );
            }
            None => log::info!("No card matches the filters; keeping position"),
        }
        self.system.set_filtering_state(false, FilteringPhase::Idle);
        self.system.update_ui(now_ms);
        outcome
    }

    pub fn move_to_card(&mut self, index: usize, now_ms: u64) -> bool {
        if !self.system.accepts_navigation() {
            return false;
        }
        self.driver
            .position_to(&mut self.system, &self.probe, index, true, now_ms)
    }

    pub fn update_ui(&mut self, now_ms: u64) {
        self.system.update_ui(now_ms);
    }

    pub fn reset_flipped_card(&mut self) -> bool {
        self.system.reset_flipped_card()
    }

    /// Resize a card. Without an explicit content height the back face is
    /// measured through the probe.
    pub fn adjust_card_height(
        &mut self,
        index: usize,
        expand: bool,
        content_height: Option<f32>,
    ) -> f32 {
        let content_height = content_height.or_else(|| {
            self.probe
                .card_content(index)
                .map(|c| c.back_content_height)
        });
        self.system.adjust_card_height(index, expand, content_height)
    }

    // ===== Input and time =====

    /// Route one host message to the active driver.
    pub fn update(&mut self, message: CoverflowMessage, now_ms: u64) -> bool {
        use CoverflowMessage as M;

        let system = &mut self.system;
        let probe: &dyn LayoutProbe = &self.probe;
        match (&mut self.driver, message) {
            (Driver::Desktop(d), M::Key(dir) | M::ArrowClicked(dir)) => {
                d.navigate(system, probe, dir, now_ms)
            }
            (Driver::Desktop(d), M::DotClicked(index)) => {
                d.click_dot(system, probe, index, now_ms)
            }
            (Driver::Desktop(d), M::CardClicked(index)) => {
                d.click_card(system, probe, index, now_ms)
            }
            (Driver::Desktop(d), M::Wheel { delta }) => {
                d.wheel(system, probe, delta, now_ms)
            }
            (Driver::Desktop(d), M::Scrolled { scroll_left }) => {
                d.on_scroll(system, probe, scroll_left, now_ms);
                true
            }
            (Driver::Touch(t), M::Key(dir) | M::ArrowClicked(dir)) => {
                t.step(system, probe, dir, now_ms)
            }
            (Driver::Touch(t), M::DotClicked(index)) => {
                t.click_dot(system, probe, index, now_ms)
            }
            (Driver::Touch(t), M::TouchStart { x, y }) => {
                t.touch_start(system, x, y, now_ms)
            }
            (Driver::Touch(t), M::TouchMove { x, y }) => {
                t.touch_move(system, probe, x, y);
                true
            }
            (Driver::Touch(t), M::TouchEnd) => {
                t.touch_end(system, probe, now_ms);
                true
            }
            (Driver::Touch(t), M::CardTapped(index)) => {
                t.tap_card(system, probe, index, now_ms)
            }
            (Driver::Touch(t), M::CloseOverlay) => t.close_overlay(system, now_ms),
            (driver, M::Resized) => {
                driver.resize(system, probe, now_ms);
                true
            }
            (driver, message) => {
                log::debug!(
                    "{} ignored by the {} driver",
                    message.name(),
                    driver.platform()
                );
                false
            }
        }
    }

    /// Host animation frame.
    pub fn animation_frame(&mut self, now_ms: u64) -> bool {
        match &mut self.driver {
            Driver::Desktop(d) => d.frame(&mut self.system, &self.probe, now_ms),
            Driver::Touch(_) => false,
        }
    }

    /// Earliest pending timer across the session, registry and driver.
    pub fn next_due(&self) -> Option<u64> {
        [
            self.timers.next_due(),
            self.system.next_due(),
            self.driver.next_due(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Fire every timer due at or before `now_ms`, in time order. Returns
    /// the number of timers fired.
    pub fn advance(&mut self, now_ms: u64) -> usize {
        let mut fired = 0;
        loop {
            let next = [
                (Source::Session, self.timers.next_due()),
                (Source::System, self.system.next_due()),
                (Source::Driver, self.driver.next_due()),
            ]
            .into_iter()
            .filter_map(|(source, due)| {
                due.filter(|&at| at <= now_ms).map(|at| (at, source))
            })
            .min_by_key(|&(at, _)| at);
            let Some((at, source)) = next else {
                break;
            };
            match source {
                Source::Session => {
                    if let Some((_, task)) = self.timers.pop_due(at) {
                        self.handle_task(task, at);
                    }
                }
                Source::System => {
                    self.system.fire_due(at);
                }
                Source::Driver => {
                    self.driver.fire_due(&mut self.system, &self.probe, at);
                }
            }
            fired += 1;
        }
        fired
    }

    fn handle_task(&mut self, task: SessionTask, now_ms: u64) {
        match task {
            SessionTask::MeasureRetry { attempt } => {
                self.try_measure(attempt, now_ms)
            }
        }
    }

    // ===== Outbox =====

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.system.drain_effects()
    }

    pub fn drain_events(&mut self) -> Vec<SystemEvent> {
        self.system.drain_events()
    }
}

impl<P: std::fmt::Debug> std::fmt::Debug for Coverflow<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coverflow")
            .field("system", &self.system)
            .field("driver", &self.driver)
            .field("probe", &self.probe)
            .field("device", &self.device)
            .field("filter_hook", &self.filter_hook.is_some())
            .finish()
    }
}
