use std::collections::{BTreeMap, BTreeSet};

use crate::constants::DEFAULT_VISIBILITY_THRESHOLD;

/// Page ordinals (0-based) that carry the video.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VideoPageSet(BTreeSet<usize>);

impl VideoPageSet {
    pub fn new(pages: impl IntoIterator<Item = usize>) -> Self {
        VideoPageSet(pages.into_iter().collect())
    }

    pub fn contains(&self, page: usize) -> bool {
        self.0.contains(&page)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

/// One intersection sample for a page element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    pub page: usize,
    pub is_intersecting: bool,
    pub ratio: f64,
}

/// Client-space bounding box of a page element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PageRect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl PageRect {
    pub fn fully_within(&self, viewport: Viewport) -> bool {
        self.top >= 0.0
            && self.left >= 0.0
            && self.bottom <= viewport.height
            && self.right <= viewport.width
    }
}

/// What the media element should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoCommand {
    /// Start playback, seeking to 0 first when `rewind` is set. A rejection
    /// of this request is reported back with the same `ticket`.
    Play { rewind: bool, ticket: u64 },
    Pause,
}

/// A visibility verdict tagged with the page-turn epoch it was taken in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Verdict {
    visible: bool,
    epoch: u64,
}

/// Decides when the video plays from page visibility and the page the book
/// currently shows.
///
/// Every input folds into the same state and goes through one reconcile step,
/// so commands are only emitted on an actual change.
///
/// Observer verdicts are authoritative. A box measurement only decides for a
/// page whose observer verdict predates the last page turn, or that has none.
#[derive(Clone, Debug)]
pub struct VideoController {
    pages: VideoPageSet,
    threshold: f64,
    observed: BTreeMap<usize, Verdict>,
    measured: BTreeMap<usize, Verdict>,
    epoch: u64,
    shown_page: Option<usize>,
    active: bool,
    playing: bool,
    blocked: bool,
    next_ticket: u64,
    pending: Option<u64>,
}

impl VideoController {
    pub fn new(pages: VideoPageSet, threshold: f64) -> Self {
        VideoController {
            pages,
            threshold,
            observed: BTreeMap::new(),
            measured: BTreeMap::new(),
            epoch: 0,
            shown_page: None,
            active: false,
            playing: false,
            blocked: false,
            next_ticket: 0,
            pending: None,
        }
    }

    pub fn with_default_threshold(pages: VideoPageSet) -> Self {
        Self::new(pages, DEFAULT_VISIBILITY_THRESHOLD)
    }

    pub fn pages(&self) -> &VideoPageSet {
        &self.pages
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether a video page counted as shown at the last reconcile.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Record the page the book shows. Once called, only that page may play.
    pub fn on_page_shown(&mut self, page: usize) -> Option<VideoCommand> {
        if self.shown_page != Some(page) {
            self.epoch += 1;
        }
        self.shown_page = Some(page);
        self.reconcile()
    }

    pub fn on_visibility_changed(&mut self, observations: &[Observation]) -> Option<VideoCommand> {
        for obs in observations {
            if !self.pages.contains(obs.page) {
                continue;
            }
            let visible = obs.is_intersecting && obs.ratio > self.threshold;
            self.observed.insert(
                obs.page,
                Verdict {
                    visible,
                    epoch: self.epoch,
                },
            );
        }
        self.reconcile()
    }

    /// Fallback measurement: a video page counts as visible only when its box
    /// sits entirely inside the viewport.
    pub fn check_video_page(
        &mut self,
        rects: &[(usize, PageRect)],
        viewport: Viewport,
    ) -> Option<VideoCommand> {
        for (page, rect) in rects {
            if self.pages.contains(*page) {
                self.measured.insert(
                    *page,
                    Verdict {
                        visible: rect.fully_within(viewport),
                        epoch: self.epoch,
                    },
                );
            }
        }
        self.reconcile()
    }

    /// The browser refused the `Play` carrying `ticket`. No further play
    /// requests are made until the video pages are left and entered again.
    /// Rejections of superseded requests are ignored.
    pub fn on_play_rejected(&mut self, ticket: u64) {
        if self.pending != Some(ticket) {
            return;
        }
        self.pending = None;
        self.playing = false;
        self.blocked = self.active;
    }

    fn is_visible(&self, page: usize) -> bool {
        let observed = self.observed.get(&page);
        let measured = self.measured.get(&page);
        match (observed, measured) {
            (Some(o), Some(m)) if m.epoch > o.epoch => m.visible,
            (Some(o), _) => o.visible,
            (None, Some(m)) => m.visible,
            (None, None) => false,
        }
    }

    fn wants_playback(&self) -> bool {
        self.pages.iter().any(|page| {
            self.is_visible(page) && self.shown_page.is_none_or(|shown| shown == page)
        })
    }

    fn reconcile(&mut self) -> Option<VideoCommand> {
        let want = self.wants_playback();
        let entering = want && !self.active;
        self.active = want;
        if !want {
            self.blocked = false;
            if self.playing {
                self.playing = false;
                self.pending = None;
                return Some(VideoCommand::Pause);
            }
            return None;
        }
        if entering {
            self.blocked = false;
        }
        if self.playing || self.blocked {
            return None;
        }
        self.playing = true;
        self.next_ticket += 1;
        self.pending = Some(self.next_ticket);
        Some(VideoCommand::Play {
            rewind: entering,
            ticket: self.next_ticket,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(page: usize, is_intersecting: bool, ratio: f64) -> Observation {
        Observation {
            page,
            is_intersecting,
            ratio,
        }
    }

    /// The ticket of a `Play` with the given rewind flag, if that is what `cmd` is.
    fn play(cmd: Option<VideoCommand>, rewind: bool) -> Option<u64> {
        match cmd {
            Some(VideoCommand::Play { rewind: r, ticket }) if r == rewind => Some(ticket),
            _ => None,
        }
    }

    #[test]
    fn plays_once_when_video_page_is_mostly_visible() {
        let mut vc = VideoController::with_default_threshold(VideoPageSet::new([2]));
        assert_eq!(vc.on_visibility_changed(&[obs(2, true, 0.4)]), None);
        assert!(play(vc.on_visibility_changed(&[obs(2, true, 0.6)]), true).is_some());
        assert_eq!(vc.on_visibility_changed(&[obs(2, true, 1.0)]), None);
        assert!(vc.is_playing());
        assert_eq!(
            vc.on_visibility_changed(&[obs(2, false, 0.0)]),
            Some(VideoCommand::Pause)
        );
        assert_eq!(vc.on_visibility_changed(&[obs(2, false, 0.0)]), None);
    }

    #[test]
    fn ratio_at_threshold_is_not_enough() {
        let mut vc = VideoController::with_default_threshold(VideoPageSet::new([0]));
        assert_eq!(vc.on_visibility_changed(&[obs(0, true, 0.5)]), None);
    }

    #[test]
    fn other_pages_are_ignored() {
        let mut vc = VideoController::with_default_threshold(VideoPageSet::new([1]));
        assert_eq!(vc.on_visibility_changed(&[obs(0, true, 1.0)]), None);
        assert!(!vc.is_playing());
    }

    #[test]
    fn batch_is_reconciled_once() {
        let mut vc = VideoController::with_default_threshold(VideoPageSet::new([1, 2]));
        vc.on_visibility_changed(&[obs(1, true, 1.0)]);
        // leaving one video page while entering another keeps playing untouched
        assert_eq!(
            vc.on_visibility_changed(&[obs(1, false, 0.0), obs(2, true, 0.9)]),
            None
        );
        assert!(vc.is_playing());
    }

    #[test]
    fn shown_page_gates_playback() {
        let mut vc = VideoController::with_default_threshold(VideoPageSet::new([3]));
        assert_eq!(vc.on_page_shown(0), None);
        assert_eq!(vc.on_visibility_changed(&[obs(3, true, 1.0)]), None);
        assert!(play(vc.on_page_shown(3), true).is_some());
        assert_eq!(vc.on_page_shown(4), Some(VideoCommand::Pause));
    }

    #[test]
    fn rejected_play_is_not_retried_while_shown() {
        let mut vc = VideoController::with_default_threshold(VideoPageSet::new([0]));
        let ticket = play(vc.on_visibility_changed(&[obs(0, true, 1.0)]), true).unwrap();
        vc.on_play_rejected(ticket);
        assert!(!vc.is_playing());
        assert_eq!(vc.on_visibility_changed(&[obs(0, true, 1.0)]), None);
        assert_eq!(vc.on_visibility_changed(&[obs(0, false, 0.0)]), None);
        assert!(play(vc.on_visibility_changed(&[obs(0, true, 1.0)]), true).is_some());
    }

    #[test]
    fn late_rejection_of_an_earlier_play_is_ignored() {
        let mut vc = VideoController::with_default_threshold(VideoPageSet::new([0]));
        let first = play(vc.on_visibility_changed(&[obs(0, true, 1.0)]), true).unwrap();
        assert_eq!(
            vc.on_visibility_changed(&[obs(0, false, 0.0)]),
            Some(VideoCommand::Pause)
        );
        let second = play(vc.on_visibility_changed(&[obs(0, true, 1.0)]), true).unwrap();
        assert_ne!(first, second);

        // the pause aborted the first request; its rejection arrives now
        vc.on_play_rejected(first);
        assert!(vc.is_playing());
        assert_eq!(
            vc.on_visibility_changed(&[obs(0, false, 0.0)]),
            Some(VideoCommand::Pause)
        );

        // a rejection that arrives after the pause changes nothing either
        vc.on_play_rejected(second);
        assert!(play(vc.on_visibility_changed(&[obs(0, true, 1.0)]), true).is_some());
    }

    #[test]
    fn fallback_requires_full_containment() {
        let viewport = Viewport {
            width: 800.0,
            height: 600.0,
        };
        let inside = PageRect {
            top: 10.0,
            left: 10.0,
            bottom: 590.0,
            right: 790.0,
        };
        let clipped = PageRect {
            bottom: 650.0,
            ..inside
        };
        let mut vc = VideoController::with_default_threshold(VideoPageSet::new([0]));
        assert_eq!(vc.check_video_page(&[(0, clipped)], viewport), None);
        assert!(play(vc.check_video_page(&[(0, inside)], viewport), true).is_some());
        assert_eq!(
            vc.check_video_page(&[(0, clipped)], viewport),
            Some(VideoCommand::Pause)
        );
    }

    #[test]
    fn fallback_does_not_override_a_current_observation() {
        let viewport = Viewport {
            width: 800.0,
            height: 600.0,
        };
        let clipped = PageRect {
            top: 10.0,
            left: 10.0,
            bottom: 650.0,
            right: 790.0,
        };
        let mut vc = VideoController::with_default_threshold(VideoPageSet::new([0]));
        assert_eq!(vc.on_page_shown(0), None);
        assert!(play(vc.on_visibility_changed(&[obs(0, true, 0.8)]), true).is_some());
        assert_eq!(vc.check_video_page(&[(0, clipped)], viewport), None);
        assert!(vc.is_playing());

        // after a turn the stale observation gives way to the measurement
        assert_eq!(vc.on_page_shown(1), Some(VideoCommand::Pause));
        assert!(play(vc.on_page_shown(0), true).is_some());
        assert_eq!(
            vc.check_video_page(&[(0, clipped)], viewport),
            Some(VideoCommand::Pause)
        );
        assert!(!vc.is_playing());
    }
}
