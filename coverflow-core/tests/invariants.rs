//! Registry invariants under long random input sequences

mod support;

use coverflow_contracts::layout::UniformLayout;
use coverflow_core::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use support::*;

const CARDS: usize = 8;

fn assert_invariants(session: &mut Coverflow<UniformLayout>, now: u64, step: usize) {
    let flipped: Vec<usize> = session
        .system()
        .cards()
        .iter()
        .filter(|c| c.flipped)
        .map(|c| c.index)
        .collect();
    assert!(flipped.len() <= 1, "step {step}: flipped {flipped:?}");
    assert_eq!(
        session.system().currently_flipped_card(),
        flipped.first().copied(),
        "step {step}: flipped pointer out of sync"
    );

    session.update_ui(now);
    let system = session.system();
    if system.visible_count() > 0 {
        let active = system.active_card_index();
        assert!(
            !system.cards()[active].filtered,
            "step {step}: active card {active} is filtered"
        );
    }
    let max_start = system.visible_count().saturating_sub(system.visible_range());
    assert!(
        system.visible_start_index() <= max_start,
        "step {step}: dot window starts past {max_start}"
    );
}

fn random_criteria(rng: &mut StdRng) -> FilterCriteria {
    match rng.random_range(0..4) {
        0 => FilterCriteria::default(),
        1 => FilterCriteria::from_lists(&rng.random_range(0..CARDS).to_string(), ""),
        2 => FilterCriteria::from_lists("", "2, 5, 6"),
        _ => FilterCriteria::from_lists("", "nothing"),
    }
}

#[test]
fn desktop_single_flip_under_random_input() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut session = desktop_session(numbered_cards(CARDS));
    session.initialize(0);

    let mut now = 0;
    for step in 0..400 {
        now += rng.random_range(1..120);
        let message = match rng.random_range(0..7) {
            0 => CoverflowMessage::Key(Direction::Next),
            1 => CoverflowMessage::Key(Direction::Prev),
            2 => CoverflowMessage::DotClicked(rng.random_range(0..CARDS)),
            3 | 4 => CoverflowMessage::CardClicked(rng.random_range(0..CARDS)),
            5 => CoverflowMessage::Wheel {
                delta: rng.random_range(-300.0..300.0),
            },
            _ => {
                let criteria = random_criteria(&mut rng);
                session.apply_filters(&criteria, now);
                assert_invariants(&mut session, now, step);
                continue;
            }
        };
        session.update(message, now);
        session.animation_frame(now);
        session.advance(now);
        session.drain_effects();
        assert_invariants(&mut session, now, step);
    }
}

#[test]
fn touch_single_flip_under_random_input() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut session = phone_session(numbered_cards(CARDS));
    session.initialize(0);

    let mut now = 0;
    for step in 0..400 {
        now += rng.random_range(1..200);
        match rng.random_range(0..6) {
            0 => {
                let x = rng.random_range(50.0..340.0);
                session.update(CoverflowMessage::TouchStart { x, y: 400.0 }, now);
                let dx = rng.random_range(-250.0..250.0);
                session.update(
                    CoverflowMessage::TouchMove {
                        x: x + dx,
                        y: 400.0 + rng.random_range(-20.0..20.0),
                    },
                    now + 50,
                );
                now += rng.random_range(60..500);
                session.update(CoverflowMessage::TouchEnd, now);
            }
            1 | 2 => {
                session.update(
                    CoverflowMessage::CardTapped(rng.random_range(0..CARDS)),
                    now,
                );
            }
            3 => {
                session.update(CoverflowMessage::CloseOverlay, now);
            }
            4 => {
                let direction = if rng.random_bool(0.5) {
                    Direction::Next
                } else {
                    Direction::Prev
                };
                session.update(CoverflowMessage::Key(direction), now);
            }
            _ => {
                let criteria = random_criteria(&mut rng);
                session.apply_filters(&criteria, now);
            }
        }
        session.advance(now);
        session.drain_effects();
        assert_invariants(&mut session, now, step);
    }
}

#[test]
fn rejected_transition_keeps_the_phase() {
    let mut session = desktop_session(numbered_cards(3));
    session.initialize(0);
    session.update(CoverflowMessage::CardClicked(0), 10);
    assert_eq!(session.system().phase(), CarouselPhase::Flipped);

    assert!(
        session
            .system_mut()
            .transition(CarouselPhase::Flipped)
            .is_err()
    );
    assert_eq!(session.system().phase(), CarouselPhase::Flipped);

    session
        .system_mut()
        .set_filtering_state(true, FilteringPhase::Filtering);
    assert!(
        session
            .system_mut()
            .transition(CarouselPhase::Dragging)
            .is_err()
    );
    assert_eq!(session.system().phase(), CarouselPhase::Filtering);
}

#[test]
fn a_second_flip_closes_the_first() {
    let mut session = desktop_session(numbered_cards(4));
    session.initialize(0);
    session.update(CoverflowMessage::CardClicked(0), 10);
    assert_eq!(session.system().currently_flipped_card(), Some(0));

    // Card 1 sits right of the centred card and is fully on screen.
    session.update(CoverflowMessage::CardClicked(1), 100);
    assert_eq!(flipped_count(&session), 1);
    assert_eq!(session.system().currently_flipped_card(), Some(1));
    assert_eq!(session.system().active_card_index(), 1);
    let effects = session.drain_effects();
    assert!(effects.contains(&Effect::LockDocumentScroll));

    settle(&mut session, 100, 1200);
    assert!(session.drain_effects().contains(&Effect::RestoreDocumentScroll));
}
