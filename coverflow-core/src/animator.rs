//! Time-based tween for scroll offsets
//!
//! Driven by host animation frames: each frame calls [`ScrollAnimator::tick`]
//! with the frame timestamp and applies the returned offset. Interrupting an
//! animation goes through [`ScrollAnimator::interrupt`], which hands back the
//! offset the track had reached so the caller can pin it before starting the
//! next motion.

use crate::config::EasingKind;

/// Timing curve for a tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    Eased(EasingKind),
    /// CSS-style `cubic-bezier(x1, y1, x2, y2)`.
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl Timing {
    pub fn bezier((x1, y1, x2, y2): (f32, f32, f32, f32)) -> Self {
        Timing::CubicBezier { x1, y1, x2, y2 }
    }

    /// Eased progress for linear time progress `t` in `0..=1`.
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Timing::Eased(kind) => kind.apply(t),
            Timing::CubicBezier { x1, y1, x2, y2 } => {
                if t <= 0.0 || t >= 1.0 {
                    return t;
                }
                // x(s) is monotonic for x1, x2 in 0..=1, so bisection converges.
                let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
                let mut s = t;
                for _ in 0..24 {
                    let x = bezier_axis(s, x1, x2);
                    if (x - t).abs() < 1e-5 {
                        break;
                    }
                    if x < t {
                        lo = s;
                    } else {
                        hi = s;
                    }
                    s = (lo + hi) / 2.0;
                }
                bezier_axis(s, y1, y2)
            }
        }
    }
}

fn bezier_axis(s: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    active: bool,
    start: f32,
    target: f32,
    started_at_ms: u64,
    duration_ms: u64,
    timing: Timing,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self {
            active: false,
            start: 0.0,
            target: 0.0,
            started_at_ms: 0,
            duration_ms: 200,
            timing: Timing::Eased(EasingKind::EaseOut),
        }
    }
}

impl ScrollAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn start(
        &mut self,
        now_ms: u64,
        current: f32,
        target: f32,
        duration_ms: u64,
        timing: Timing,
    ) {
        self.active = true;
        self.start = current;
        self.target = target;
        self.started_at_ms = now_ms;
        self.duration_ms = duration_ms;
        self.timing = timing;
    }

    /// Offset the tween would show at `now_ms`, without advancing state.
    pub fn sample(&self, now_ms: u64) -> f32 {
        if !self.active {
            return self.target;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        if self.duration_ms == 0 || elapsed >= self.duration_ms {
            return self.target;
        }
        let t = elapsed as f32 / self.duration_ms as f32;
        let te = self.timing.sample(t);
        self.start + (self.target - self.start) * te
    }

    /// Returns Some(next_offset) when animating, or None when finished/inactive
    pub fn tick(&mut self, now_ms: u64) -> Option<f32> {
        if !self.active {
            return None;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        if elapsed >= self.duration_ms {
            self.active = false;
            return Some(self.target);
        }
        Some(self.sample(now_ms))
    }

    /// Stop the tween and return the offset it had reached, if it was running.
    pub fn interrupt(&mut self, now_ms: u64) -> Option<f32> {
        if !self.active {
            return None;
        }
        let reached = self.sample(now_ms);
        self.active = false;
        Some(reached)
    }

    /// Cancel the current animation immediately.
    pub fn cancel(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_out_reaches_target_on_time() {
        let mut anim = ScrollAnimator::new();
        anim.start(1_000, 0.0, 100.0, 200, Timing::Eased(EasingKind::EaseOut));

        let halfway = anim.tick(1_100).unwrap();
        assert!((halfway - 75.0).abs() < 1e-3, "ease-out quad at t=0.5");
        assert_eq!(anim.tick(1_200), Some(100.0));
        assert!(!anim.is_active());
        assert_eq!(anim.tick(1_300), None);
    }

    #[test]
    fn interrupt_returns_reached_offset() {
        let mut anim = ScrollAnimator::new();
        anim.start(0, 200.0, 0.0, 100, Timing::Eased(EasingKind::Linear));
        assert_eq!(anim.interrupt(25), Some(150.0));
        assert!(!anim.is_active());
        assert_eq!(anim.interrupt(50), None);
    }

    #[test]
    fn bezier_is_monotonic_and_pinned() {
        let timing = Timing::bezier((0.25, 0.46, 0.45, 0.94));
        assert_eq!(timing.sample(0.0), 0.0);
        assert_eq!(timing.sample(1.0), 1.0);
        let mut last = 0.0;
        for step in 1..20 {
            let v = timing.sample(step as f32 / 20.0);
            assert!(v >= last);
            last = v;
        }
        // Decelerating curve runs ahead of linear time.
        assert!(timing.sample(0.5) > 0.5);
    }
}
