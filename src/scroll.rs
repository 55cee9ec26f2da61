//! Eased scrolling for the code column's horizontal offset.

use crate::config::ScrollConfig;

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct ActiveAnimation {
    start: Instant,
    from: u16,
    to: u16,
    duration: Duration,
}

/// Interpolates an offset towards a target over a fixed duration.
///
/// Call `scroll_to()` when the target changes, then `update()` once per
/// frame to move the current offset along a cubic ease-out curve.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    animation: Option<ActiveAnimation>,
    smooth: bool,
    duration: Duration,
    current: u16,
}

impl SmoothScroll {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            animation: None,
            smooth: config.is_smooth(),
            duration: config.duration(),
            current: 0,
        }
    }

    #[cfg(test)]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    #[inline]
    pub fn current(&self) -> u16 {
        self.current
    }

    pub fn target(&self) -> u16 {
        self.animation
            .as_ref()
            .map(|a| a.to)
            .unwrap_or(self.current)
    }

    /// Starts easing from the current offset to `target`. Retargeting while
    /// an animation runs restarts it from wherever the offset is now.
    pub fn scroll_to(&mut self, target: u16, now: Instant) {
        if !self.smooth {
            self.current = target;
            self.animation = None;
            return;
        }

        if self.target() == target {
            return;
        }

        if self.current == target {
            self.animation = None;
            return;
        }

        self.animation = Some(ActiveAnimation {
            start: now,
            from: self.current,
            to: target,
            duration: self.duration,
        });
    }

    /// Jumps straight to `offset`, dropping any animation.
    pub fn set(&mut self, offset: u16) {
        self.animation = None;
        self.current = offset;
    }

    pub fn update(&mut self, now: Instant) -> u16 {
        if let Some(anim) = &self.animation {
            let t = progress(anim.start, anim.duration, now);

            if t >= 1.0 {
                self.current = anim.to;
                self.animation = None;
            } else {
                self.current = lerp_u16(anim.from, anim.to, cubic_ease_out(t));
            }
        }

        self.current
    }

    pub fn reset(&mut self) {
        self.set(0);
    }
}

#[inline]
fn progress(start: Instant, duration: Duration, now: Instant) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }

    let elapsed = now.saturating_duration_since(start);
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// f(t) = 1 - (1-t)³
#[inline]
fn cubic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

#[inline]
fn lerp_u16(from: u16, to: u16, t: f64) -> u16 {
    let (from, to) = (from as f64, to as f64);
    (from + (to - from) * t).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smooth() -> SmoothScroll {
        SmoothScroll::new(&ScrollConfig {
            smooth: true,
            duration_ms: 100,
            margin: 4,
        })
    }

    #[test]
    fn test_instant_when_disabled() {
        let mut scroll = SmoothScroll::new(&ScrollConfig {
            smooth: false,
            ..Default::default()
        });

        scroll.scroll_to(40, Instant::now());
        assert_eq!(scroll.current(), 40);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_animation_interpolates_then_lands() {
        let mut scroll = smooth();
        let start = Instant::now();

        scroll.scroll_to(100, start);
        assert!(scroll.is_animating());
        assert_eq!(scroll.target(), 100);

        let mid = scroll.update(start + Duration::from_millis(50));
        assert!(mid > 0 && mid < 100, "mid = {mid}");

        assert_eq!(scroll.update(start + Duration::from_millis(150)), 100);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_movement_is_monotonic() {
        let mut scroll = smooth();
        let start = Instant::now();
        scroll.scroll_to(60, start);

        let mut prev = 0;
        for ms in (0..=100).step_by(10) {
            let v = scroll.update(start + Duration::from_millis(ms));
            assert!(v >= prev);
            prev = v;
        }
        assert_eq!(prev, 60);
    }

    #[test]
    fn test_retarget_keeps_current_position() {
        let mut scroll = smooth();
        let start = Instant::now();

        scroll.scroll_to(100, start);
        let at = start + Duration::from_millis(50);
        let mid = scroll.update(at);

        scroll.scroll_to(0, at);
        assert_eq!(scroll.current(), mid);
        assert_eq!(scroll.target(), 0);
    }

    #[test]
    fn test_reset_returns_to_origin() {
        let mut scroll = smooth();
        scroll.scroll_to(30, Instant::now());
        scroll.reset();

        assert_eq!(scroll.current(), 0);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_easing_boundaries() {
        assert!(cubic_ease_out(0.0).abs() < 0.001);
        assert!((cubic_ease_out(1.0) - 1.0).abs() < 0.001);
        assert_eq!(lerp_u16(0, 100, 0.5), 50);
    }
}
