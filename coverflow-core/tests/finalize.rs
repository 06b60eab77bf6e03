//! Readiness barrier and layout finalization

mod support;

use coverflow_core::prefs::keys;
use coverflow_core::prelude::*;
use support::*;

fn stored_tariff_filter() -> StoredFilterHook<MemoryStore> {
    StoredFilterHook::new(MemoryStore::with_entries([
        (keys::EXCLUDES, "tariffs"),
        (keys::AUTO_APPLY_FILTERS, "true"),
    ]))
}

#[test]
fn stored_filters_apply_on_finalize_and_navigation_skips_them() {
    let mut session =
        desktop_session(news_cards()).with_filter_hook(stored_tariff_filter());
    session.initialize(0);

    assert!(session.system().is_fully_initialized());
    assert_eq!(
        filtered_flags(&session),
        vec![true, false, true, false, false]
    );
    assert_eq!(session.system().active_card_index(), 1);
    assert!(!session.system().is_filtering());

    let effects = session.drain_effects();
    assert_eq!(effects.last(), Some(&Effect::RevealUi));
    assert!(effects.contains(&Effect::SetScrollLeft(400.0)));
    let events = session.drain_events();
    assert!(events.contains(&SystemEvent::PlatformReady(Platform::Desktop)));
    assert_eq!(
        events.last(),
        Some(&SystemEvent::LayoutFinalized { active_index: 1 })
    );

    session.update(CoverflowMessage::Key(Direction::Next), 100);
    assert_eq!(session.system().active_card_index(), 3);
    session.update(CoverflowMessage::Key(Direction::Prev), 200);
    assert_eq!(session.system().active_card_index(), 1);
    assert!(!session.update(CoverflowMessage::Key(Direction::Prev), 300));
}

#[test]
fn auto_apply_off_leaves_cards_visible() {
    let hook = StoredFilterHook::new(MemoryStore::with_entries([
        (keys::EXCLUDES, "tariffs"),
        (keys::AUTO_APPLY_FILTERS, "false"),
    ]));
    let mut session = desktop_session(news_cards()).with_filter_hook(hook);
    session.initialize(0);
    assert_eq!(filtered_flags(&session), vec![false; 5]);
    assert_eq!(session.system().active_card_index(), 0);
}

#[test]
fn finalize_is_idempotent() {
    let mut session = desktop_session(news_cards());
    session.initialize(0);
    session.drain_effects();
    session.drain_events();

    assert!(!session.finalize_layout(50));
    assert_eq!(
        session.register_platform_ready(Platform::Desktop, 60),
        Readiness::AlreadyReady
    );
    session.initialize(70);
    session.update_ui(80);
    assert!(session.drain_effects().is_empty());
    assert!(session.drain_events().is_empty());
}

#[test]
fn only_the_session_platform_opens_the_barrier() {
    let mut session = desktop_session(news_cards());
    session.probe_mut().measured = false;
    assert_eq!(
        session.register_platform_ready(Platform::Touch, 0),
        Readiness::Ignored
    );
    assert!(!session.system().is_layout_ready());
    assert!(!session.finalize_layout(0));
    assert!(!session.drain_effects().contains(&Effect::RevealUi));
}

#[test]
fn measurement_retries_until_cards_have_width() {
    let mut session = desktop_session(news_cards());
    session.probe_mut().measured = false;
    session.initialize(0);
    session.advance(120);
    assert!(!session.system().is_layout_ready());

    session.probe_mut().measured = true;
    session.advance(159);
    assert!(!session.system().is_layout_ready());
    session.advance(160);
    assert!(session.system().is_fully_initialized());
}

#[test]
fn measurement_gives_up_after_bounded_attempts() {
    let mut session = desktop_session(news_cards());
    session.probe_mut().measured = false;
    session.initialize(0);
    session.advance(959);
    assert!(!session.system().is_fully_initialized());
    assert!(!session.drain_effects().contains(&Effect::RevealUi));

    // 25th attempt: continue with the first card shown.
    session.advance(960);
    assert!(session.system().is_fully_initialized());
    assert_eq!(session.system().active_card_index(), 0);
    assert!(session.drain_effects().contains(&Effect::RevealUi));
    assert_eq!(session.next_due(), None);
}

#[test]
fn touch_devices_get_the_touch_driver() {
    let mut session = phone_session(news_cards());
    assert_eq!(session.platform(), Platform::Touch);
    assert!(session.device().is_mobile);
    session.initialize(0);
    assert!(session.driver().as_touch().is_some());
    assert!(session.system().is_fully_initialized());
}

#[test]
fn filters_matching_nothing_keep_the_position() {
    let mut session = desktop_session(news_cards());
    session.initialize(0);
    session.update(CoverflowMessage::Key(Direction::Next), 10);
    settle(&mut session, 10, 400);

    let outcome =
        session.apply_filters(&FilterCriteria::from_lists("", "volcano"), 500);
    assert_eq!(outcome.first_visible, None);
    assert_eq!(session.system().active_card_index(), 1);
    assert!(!session.system().is_filtering());
    assert_eq!(session.system().phase(), CarouselPhase::Idle);
}
