use crate::constants::{FLIPPING_Z_INDEX, SETTLE_MS};
use crate::leaf::{Leaf, Rotation};

/// A navigation request, already classified from raw input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Next,
    Prev,
    First,
    Last,
    GoTo(usize),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Idle,
    /// A page turn is in flight until `settle_at`.
    Animating { settle_at: f64 },
}

/// What an accepted navigation changed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionKind {
    /// The leaf at `leaf` is turning over to the left.
    Forward { leaf: usize },
    /// The leaf at `leaf` is turning back to the right.
    Backward { leaf: usize },
    /// The book jumped without a per-leaf animation.
    Jump { from: usize, to: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    /// Page index after the transition.
    pub current: usize,
    /// Timestamp at which `Book::advance` settles the book.
    pub settle_at: f64,
}

impl Transition {
    /// Index of the leaf that animates, if any.
    pub fn flipping_leaf(&self) -> Option<usize> {
        match self.kind {
            TransitionKind::Forward { leaf } | TransitionKind::Backward { leaf } => Some(leaf),
            TransitionKind::Jump { .. } => None,
        }
    }
}

/// Page-flip state machine over a fixed sequence of leaves.
///
/// `current` ranges over `0..=leaf_count`; `leaf_count` means every leaf has
/// been turned. Requests made while a turn is in flight are dropped.
#[derive(Clone, Debug)]
pub struct Book {
    leaves: Vec<Leaf>,
    current: usize,
    phase: Phase,
}

impl Book {
    pub fn new(leaf_count: usize) -> Self {
        Self::opened_at(leaf_count, 0)
    }

    /// Build a book already resting at `start` (clamped), without animating.
    pub fn opened_at(leaf_count: usize, start: usize) -> Self {
        let mut book = Book {
            leaves: (0..leaf_count).map(Leaf::new).collect(),
            current: start.min(leaf_count),
            phase: Phase::Idle,
        };
        book.restack();
        book
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Animating { .. })
    }

    /// z-index of a turning leaf. Resting leaves never exceed
    /// `leaf_count + current <= 2 * leaf_count`, so this stays above them.
    pub fn flipping_z_index(&self) -> i32 {
        let bound = i32::try_from(2 * self.leaf_count() + 1).unwrap_or(i32::MAX);
        FLIPPING_Z_INDEX.max(bound)
    }

    pub fn apply(&mut self, intent: Intent, now: f64) -> Option<Transition> {
        match intent {
            Intent::Next => self.next(now),
            Intent::Prev => self.prev(now),
            Intent::First => self.go_to(0, now),
            Intent::Last => self.go_to(self.leaf_count(), now),
            Intent::GoTo(n) => self.go_to(n, now),
        }
    }

    pub fn next(&mut self, now: f64) -> Option<Transition> {
        if self.is_busy() || self.current >= self.leaf_count() {
            return None;
        }
        let leaf = self.current;
        self.lift(leaf, Rotation::Turned);
        self.current += 1;
        Some(self.begin(TransitionKind::Forward { leaf }, now))
    }

    pub fn prev(&mut self, now: f64) -> Option<Transition> {
        if self.is_busy() || self.current == 0 {
            return None;
        }
        self.current -= 1;
        let leaf = self.current;
        self.lift(leaf, Rotation::Flat);
        Some(self.begin(TransitionKind::Backward { leaf }, now))
    }

    /// Jump straight to `target`. Leaves are restacked at once; the book still
    /// stays busy for the settle window so repeated keys cannot flood it.
    pub fn go_to(&mut self, target: usize, now: f64) -> Option<Transition> {
        if self.is_busy() || target > self.leaf_count() {
            return None;
        }
        let from = self.current;
        self.current = target;
        self.restack();
        Some(self.begin(TransitionKind::Jump { from, to: target }, now))
    }

    /// Fire the scheduled settle if its deadline has passed. Returns `true`
    /// when the book went back to idle.
    pub fn advance(&mut self, now: f64) -> bool {
        match self.phase {
            Phase::Animating { settle_at } if now >= settle_at => {
                self.restack();
                self.phase = Phase::Idle;
                true
            }
            _ => false,
        }
    }

    fn begin(&mut self, kind: TransitionKind, now: f64) -> Transition {
        let settle_at = now + SETTLE_MS;
        self.phase = Phase::Animating { settle_at };
        Transition {
            kind,
            current: self.current,
            settle_at,
        }
    }

    fn lift(&mut self, index: usize, rotation: Rotation) {
        let z_index = self.flipping_z_index();
        let leaf = &mut self.leaves[index];
        leaf.z_index = z_index;
        leaf.flipping = true;
        leaf.rotation = rotation;
    }

    fn restack(&mut self) {
        let (current, count) = (self.current, self.leaves.len());
        for leaf in &mut self.leaves {
            leaf.rest(current, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled(book: &mut Book, t: Transition) {
        assert!(book.advance(t.settle_at));
    }

    #[test]
    fn initial_stacking_counts_down_from_leaf_count() {
        let book = Book::new(4);
        let z: Vec<i32> = book.leaves().iter().map(|l| l.z_index).collect();
        assert_eq!(z, vec![4, 3, 2, 1]);
        assert!(book.leaves().iter().all(|l| !l.turned && !l.flipping));
        assert_eq!(book.phase(), Phase::Idle);
    }

    #[test]
    fn next_lifts_current_leaf_above_everything() {
        let mut book = Book::new(3);
        let t = book.next(0.0).unwrap();
        assert_eq!(t.kind, TransitionKind::Forward { leaf: 0 });
        assert_eq!(t.current, 1);
        assert_eq!(t.settle_at, SETTLE_MS);
        let leaf = &book.leaves()[0];
        assert!(leaf.flipping);
        assert!(!leaf.turned);
        assert_eq!(leaf.rotation, Rotation::Turned);
        assert_eq!(leaf.z_index, FLIPPING_Z_INDEX);
    }

    #[test]
    fn turning_leaf_stays_on_top_of_a_large_book() {
        let mut book = Book::opened_at(1500, 1400);
        assert!(book.flipping_z_index() > FLIPPING_Z_INDEX);
        book.next(0.0).unwrap();
        let top = book.leaves()[1400].z_index;
        assert_eq!(top, book.flipping_z_index());
        assert!(
            book.leaves()
                .iter()
                .filter(|l| l.index != 1400)
                .all(|l| l.z_index < top)
        );
    }

    #[test]
    fn settle_waits_for_deadline() {
        let mut book = Book::new(3);
        let t = book.next(100.0).unwrap();
        assert!(!book.advance(t.settle_at - 1.0));
        assert!(book.is_busy());
        assert!(book.advance(t.settle_at));
        assert!(!book.is_busy());
        assert!(!book.advance(t.settle_at + 10.0));
        assert!(book.leaves()[0].turned);
        assert!(book.leaves().iter().all(|l| !l.flipping));
    }

    #[test]
    fn busy_book_rejects_everything() {
        let mut book = Book::new(5);
        book.next(0.0).unwrap();
        assert_eq!(book.next(10.0), None);
        assert_eq!(book.prev(10.0), None);
        assert_eq!(book.go_to(3, 10.0), None);
        assert_eq!(book.apply(Intent::Last, 10.0), None);
        assert_eq!(book.current(), 1);
    }

    #[test]
    fn prev_decrements_before_flipping_back() {
        let mut book = Book::opened_at(4, 2);
        let t = book.prev(0.0).unwrap();
        assert_eq!(t.kind, TransitionKind::Backward { leaf: 1 });
        assert_eq!(book.current(), 1);
        let leaf = &book.leaves()[1];
        assert!(leaf.flipping);
        assert_eq!(leaf.rotation, Rotation::Flat);
        settled(&mut book, t);
        assert!(!book.leaves()[1].turned);
        assert!(book.leaves()[0].turned);
    }

    #[test]
    fn bounds_are_silent_no_ops() {
        let mut book = Book::new(2);
        assert_eq!(book.prev(0.0), None);
        let mut at_end = Book::opened_at(2, 2);
        assert_eq!(at_end.next(0.0), None);
        assert_eq!(at_end.go_to(3, 0.0), None);
        assert!(!book.is_busy() && !at_end.is_busy());
    }

    #[test]
    fn go_to_restacks_immediately_and_holds_busy() {
        let mut book = Book::new(6);
        let t = book.go_to(4, 0.0).unwrap();
        assert_eq!(t.kind, TransitionKind::Jump { from: 0, to: 4 });
        assert_eq!(t.flipping_leaf(), None);
        assert!(book.is_busy());
        let turned: Vec<bool> = book.leaves().iter().map(|l| l.turned).collect();
        assert_eq!(turned, vec![true, true, true, true, false, false]);
        assert!(book.leaves().iter().all(|l| !l.flipping));
    }

    #[test]
    fn first_and_last_map_to_bounds() {
        let mut book = Book::new(3);
        let t = book.apply(Intent::Last, 0.0).unwrap();
        assert_eq!(t.current, 3);
        settled(&mut book, t);
        let t = book.apply(Intent::First, 5000.0).unwrap();
        assert_eq!(t.current, 0);
    }

    #[test]
    fn start_page_is_clamped() {
        let book = Book::opened_at(3, 9);
        assert_eq!(book.current(), 3);
        assert!(book.leaves().iter().all(|l| l.turned));
        assert!(!book.is_busy());
    }

    #[test]
    fn empty_book_never_moves() {
        let mut book = Book::new(0);
        assert_eq!(book.next(0.0), None);
        assert_eq!(book.prev(0.0), None);
        assert!(book.go_to(0, 0.0).is_some());
        assert_eq!(book.current(), 0);
    }
}
