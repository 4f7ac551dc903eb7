//! Platform-independent state for the flipbook: leaf stacking, page-turn
//! timing, gesture classification and video playback decisions.
//!
//! Nothing here touches the DOM. Time is passed in as milliseconds so the
//! browser layer can drive it from timers and tests can drive it by hand.

pub mod book;
pub mod config;
pub mod constants;
pub mod gesture;
pub mod keys;
pub mod leaf;
pub mod video;

pub use book::{Book, Intent, Phase, Transition, TransitionKind};
pub use config::{ConfigError, FlipbookConfig};
pub use gesture::{BookSpan, GestureTracker};
pub use keys::intent_for_key;
pub use leaf::{Leaf, Rotation};
pub use video::{Observation, PageRect, VideoCommand, VideoController, VideoPageSet, Viewport};
