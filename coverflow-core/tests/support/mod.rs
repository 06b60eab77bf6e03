//! Shared fixtures for coverflow-core integration tests.
#![allow(dead_code)]

use coverflow_contracts::geometry::Viewport;
use coverflow_contracts::layout::UniformLayout;
use coverflow_core::prelude::*;
use coverflow_model::{Card, cards_from_summaries};

pub const DESKTOP_VIEWPORT: Viewport = Viewport::new(1200.0, 800.0, false);
pub const PHONE_VIEWPORT: Viewport = Viewport::new(390.0, 844.0, true);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A small news feed; cards 0 and 2 mention tariffs.
pub fn news_cards() -> Vec<Card> {
    cards_from_summaries([
        ("Tariffs hit exporters", Some(30.0)),
        ("New park opens downtown", Some(85.0)),
        ("Tariffs: what comes next?", Some(45.0)),
        ("Central bank holds rates", None),
        ("Cartoonists gather in Lyon", Some(60.0)),
    ])
}

pub fn numbered_cards(n: usize) -> Vec<Card> {
    cards_from_summaries((0..n).map(|i| (format!("story {i}"), None)))
}

/// Cards 400px wide, centred at multiples of 400px.
pub fn desktop_layout(n: usize) -> UniformLayout {
    UniformLayout::new(DESKTOP_VIEWPORT, 400.0, 0.0, n)
}

/// Cards 300px wide with 20px gaps, centred at multiples of 320px.
pub fn phone_layout(n: usize) -> UniformLayout {
    UniformLayout::new(PHONE_VIEWPORT, 300.0, 20.0, n)
}

pub fn desktop_session(cards: Vec<Card>) -> Coverflow<UniformLayout> {
    init_logging();
    let n = cards.len();
    Coverflow::new(cards, desktop_layout(n), &RuntimeConfig::default())
}

pub fn phone_session(cards: Vec<Card>) -> Coverflow<UniformLayout> {
    init_logging();
    let n = cards.len();
    Coverflow::new(cards, phone_layout(n), &RuntimeConfig::default())
}

/// Run frames and timers up to `until_ms` in 16ms steps.
pub fn settle(session: &mut Coverflow<UniformLayout>, from_ms: u64, until_ms: u64) {
    let mut now = from_ms;
    while now <= until_ms {
        session.animation_frame(now);
        session.advance(now);
        now += 16;
    }
    session.animation_frame(until_ms);
    session.advance(until_ms);
}

pub fn filtered_flags(session: &Coverflow<UniformLayout>) -> Vec<bool> {
    session.system().cards().iter().map(|c| c.filtered).collect()
}

pub fn flipped_count(session: &Coverflow<UniformLayout>) -> usize {
    session.system().cards().iter().filter(|c| c.flipped).count()
}
