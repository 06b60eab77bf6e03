//! Effects and events emitted by the engine
//!
//! The engine never mutates a surface directly. Every visible change is an
//! [`Effect`] pushed onto the registry's outbox in the order the host must
//! apply it. [`SystemEvent`]s are the observer notifications collaborators
//! (splash, header, filter forms) subscribe to.

use coverflow_model::{FilteringPhase, Platform};

use crate::animator::Timing;
use crate::dots::DotWindow;

/// Projection of one card's state onto its surface classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardView {
    pub index: usize,
    pub active: bool,
    pub filtered: bool,
    pub flipped: bool,
}

/// Pure projection of carousel state; the host maps it to classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSnapshot {
    pub active_index: usize,
    pub cards: Vec<CardView>,
}

/// How a dot window should transition onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotTransition {
    /// Apply immediately (first render, or filter changes).
    Instant,
    /// First phase of a window shift: current window, new sizes, linear.
    Prepare,
    /// Second phase: shifted window with the eased transition.
    Shift,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Render(RenderSnapshot),
    Dots {
        window: DotWindow,
        transition: DotTransition,
    },
    /// Jump the track to an offset with no transition.
    SetScrollLeft(f32),
    /// Let the surface transition the track to an offset.
    AnimateScrollTo {
        offset: f32,
        duration_ms: u64,
        timing: Timing,
    },
    SetCardHeight {
        index: usize,
        height: f32,
    },
    /// Read back layout so preceding style changes take effect before the
    /// next transition starts.
    ForceReflow,
    ScrollIndicator {
        index: usize,
        visible: bool,
    },
    SetLogoVisible(bool),
    /// Pin document height and hide overflow while a card collapses.
    LockDocumentScroll,
    RestoreDocumentScroll,
    /// Highlight (or clear) the card a touch drag is heading for.
    SetPretarget(Option<usize>),
    OpenOverlay {
        index: usize,
    },
    /// Zero every nested scroll offset of the overlay clone.
    ResetNestedScroll {
        index: usize,
    },
    CloseOverlay,
    RevealUi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEvent {
    FilteringStateChanged {
        is_filtering: bool,
        phase: FilteringPhase,
    },
    ActiveCardChanged {
        from: usize,
        to: usize,
    },
    PlatformReady(Platform),
    LayoutFinalized {
        active_index: usize,
    },
}
