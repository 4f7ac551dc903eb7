use crate::book::Intent;
use crate::constants::{SWIPE_MAX_DURATION_MS, SWIPE_MIN_DISTANCE};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Press {
    x: f64,
    y: f64,
    at: f64,
}

/// Horizontal extent of the book on screen, used to split clicks in half.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BookSpan {
    pub left: f64,
    pub width: f64,
}

/// Turns raw pointer and touch samples into navigation intents.
///
/// Swipes right go back, swipes left go forward. A plain click picks a side
/// of the book. Moving while pressed cancels the click.
#[derive(Clone, Debug, Default)]
pub struct GestureTracker {
    touch: Option<Press>,
    max_touches: usize,
    mouse: Option<Press>,
    moved: bool,
    swallow_click: bool,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_start(&mut self, x: f64, y: f64, at: f64, touches: usize) {
        self.touch = Some(Press { x, y, at });
        self.max_touches = touches.max(1);
        self.moved = false;
        self.swallow_click = false;
    }

    pub fn touch_move(&mut self, touches: usize) {
        self.max_touches = self.max_touches.max(touches);
        self.moved = true;
    }

    /// A touch swipe counts when a single finger travels mostly sideways,
    /// far enough, fast enough.
    pub fn touch_end(&mut self, x: f64, y: f64, at: f64) -> Option<Intent> {
        let start = self.touch.take()?;
        if self.max_touches > 1 {
            return None;
        }
        let dx = x - start.x;
        let dy = y - start.y;
        if dx.abs() <= dy.abs() {
            return None;
        }
        self.swipe(dx, at - start.at)
    }

    pub fn mouse_down(&mut self, x: f64, y: f64, at: f64) {
        self.mouse = Some(Press { x, y, at });
        self.moved = false;
        self.swallow_click = false;
    }

    pub fn mouse_move(&mut self) {
        if self.mouse.is_some() {
            self.moved = true;
        }
    }

    pub fn mouse_up(&mut self, x: f64, at: f64) -> Option<Intent> {
        let start = self.mouse.take()?;
        self.swipe(x - start.x, at - start.at)
    }

    /// Classify the click that follows a release. Returns `None` when the
    /// press turned into a drag or a swipe already navigated.
    pub fn click(&mut self, x: f64, span: BookSpan) -> Option<Intent> {
        if std::mem::take(&mut self.swallow_click) || self.moved {
            return None;
        }
        if x - span.left > span.width / 2.0 {
            Some(Intent::Next)
        } else {
            Some(Intent::Prev)
        }
    }

    fn swipe(&mut self, dx: f64, elapsed: f64) -> Option<Intent> {
        if dx.abs() <= SWIPE_MIN_DISTANCE || elapsed >= SWIPE_MAX_DURATION_MS {
            return None;
        }
        self.swallow_click = true;
        if dx > 0.0 {
            Some(Intent::Prev)
        } else {
            Some(Intent::Next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPAN: BookSpan = BookSpan {
        left: 100.0,
        width: 400.0,
    };

    #[test]
    fn touch_swipe_left_goes_forward() {
        let mut g = GestureTracker::new();
        g.touch_start(300.0, 200.0, 0.0, 1);
        g.touch_move(1);
        assert_eq!(g.touch_end(200.0, 210.0, 200.0), Some(Intent::Next));
    }

    #[test]
    fn touch_swipe_right_goes_back() {
        let mut g = GestureTracker::new();
        g.touch_start(100.0, 200.0, 0.0, 1);
        assert_eq!(g.touch_end(180.0, 190.0, 100.0), Some(Intent::Prev));
    }

    #[test]
    fn touch_swipe_rejects_short_slow_vertical_and_multi_touch() {
        let mut g = GestureTracker::new();
        g.touch_start(100.0, 100.0, 0.0, 1);
        assert_eq!(g.touch_end(150.0, 100.0, 10.0), None);

        g.touch_start(100.0, 100.0, 0.0, 1);
        assert_eq!(g.touch_end(300.0, 100.0, 500.0), None);

        g.touch_start(100.0, 100.0, 0.0, 1);
        assert_eq!(g.touch_end(180.0, 300.0, 100.0), None);

        g.touch_start(100.0, 100.0, 0.0, 1);
        g.touch_move(2);
        assert_eq!(g.touch_end(300.0, 100.0, 100.0), None);
    }

    #[test]
    fn touch_end_without_start_is_ignored() {
        let mut g = GestureTracker::new();
        assert_eq!(g.touch_end(0.0, 0.0, 0.0), None);
    }

    #[test]
    fn mouse_swipe_swallows_following_click() {
        let mut g = GestureTracker::new();
        g.mouse_down(400.0, 100.0, 0.0);
        g.mouse_move();
        assert_eq!(g.mouse_up(300.0, 120.0), Some(Intent::Next));
        assert_eq!(g.click(300.0, SPAN), None);
    }

    #[test]
    fn click_picks_a_side() {
        let mut g = GestureTracker::new();
        g.mouse_down(450.0, 100.0, 0.0);
        assert_eq!(g.mouse_up(450.0, 50.0), None);
        assert_eq!(g.click(450.0, SPAN), Some(Intent::Next));

        g.mouse_down(250.0, 100.0, 0.0);
        assert_eq!(g.mouse_up(250.0, 50.0), None);
        assert_eq!(g.click(250.0, SPAN), Some(Intent::Prev));

        // exactly on the center line counts as the left half
        assert_eq!(g.click(300.0, SPAN), Some(Intent::Prev));
    }

    #[test]
    fn drag_without_swipe_cancels_click() {
        let mut g = GestureTracker::new();
        g.mouse_down(300.0, 100.0, 0.0);
        g.mouse_move();
        assert_eq!(g.mouse_up(320.0, 50.0), None);
        assert_eq!(g.click(320.0, SPAN), None);
    }

    #[test]
    fn hover_moves_do_not_count_as_drag() {
        let mut g = GestureTracker::new();
        g.mouse_move();
        assert_eq!(g.click(450.0, SPAN), Some(Intent::Next));
    }
}
