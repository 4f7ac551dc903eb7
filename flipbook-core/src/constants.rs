//! Timing and layout constants shared by the book and its browser binding.
//! Durations are in milliseconds, distances in CSS pixels.

/// How long a page turn keeps the book busy. Must match the CSS transition.
pub const SETTLE_MS: f64 = 1500.0;
/// Lifetime of the feedback flash overlay.
pub const FLASH_MS: f64 = 300.0;
/// Lowest z-index given to the leaf that is currently turning. Books large
/// enough to reach it use `2 * leaf_count + 1` instead, see
/// [`Book::flipping_z_index`](crate::Book::flipping_z_index).
pub const FLIPPING_Z_INDEX: i32 = 1000;
/// Minimum horizontal travel for a swipe.
pub const SWIPE_MIN_DISTANCE: f64 = 50.0;
/// A swipe must be released within this window.
pub const SWIPE_MAX_DURATION_MS: f64 = 500.0;
/// Intersection ratio a video page has to exceed to count as shown.
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.5;
/// Delay before the first fallback visibility check after load.
pub const INITIAL_CHECK_DELAY_MS: f64 = 500.0;
/// Delay between a page settling and the fallback visibility check.
pub const PAGE_CHANGED_CHECK_DELAY_MS: f64 = 300.0;
