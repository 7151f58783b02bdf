//! Read-progress detection for Folio articles.
//!
//! An article counts as read once the reader has both scrolled to the end
//! (a sentinel element became visible) and spent enough time on the page
//! (60% of the estimated reading time, counted only while the document is
//! visible).
//!
//! [`ReadProgress`] is a sans-IO state machine. The host feeds it events
//! with explicit timestamps and performs the [`Effect`]s it returns:
//!
//! ```
//! use std::cell::Cell;
//! use std::time::Duration;
//! use folio_reader::{Effect, ReadProgress};
//!
//! let read = Cell::new(false);
//! let mut progress = ReadProgress::new();
//! let effects = progress
//!     .activate(10_000, Duration::ZERO, || read.set(true))
//!     .unwrap();
//! assert_eq!(
//!     effects,
//!     vec![
//!         Effect::ObserveSentinel,
//!         Effect::StartTimer(Duration::from_secs(6)),
//!         Effect::ListenVisibility,
//!     ]
//! );
//!
//! progress.sentinel_visible(Duration::from_secs(1));
//! progress.timer_elapsed(Duration::from_secs(6));
//! assert!(read.get());
//! ```

use std::time::Duration;

/// Share of the reading time a reader must dwell, as a fraction `NUM / DEN`.
const DWELL_NUM: u64 = 3;
const DWELL_DEN: u64 = 5;

/// Action the host must perform on behalf of the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Start observing the end-of-article sentinel.
    ObserveSentinel,
    /// Start (or restart) the dwell timer to fire after the duration.
    StartTimer(Duration),
    /// Start listening for document visibility changes.
    ListenVisibility,
    /// Stop observing the sentinel.
    StopObserving,
    /// Remove the sentinel element.
    RemoveSentinel,
    /// Cancel the running dwell timer.
    CancelTimer,
    /// Stop listening for visibility changes.
    RemoveVisibilityListener,
}

/// Observable progress of a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not activated yet.
    Idle,
    /// Tracking; neither condition met.
    Armed,
    /// The sentinel has been seen; waiting for the dwell time.
    ScrollSatisfied,
    /// The dwell time has passed; waiting for the sentinel.
    TimeSatisfied,
    /// Both conditions met and the callback fired.
    Done,
    /// Deactivated before completion.
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Active,
    Done,
    TornDown,
}

/// Detector deciding when an article has been read.
///
/// The callback fires at most once, and only after both the sentinel and
/// the dwell conditions hold.
pub struct ReadProgress<F: FnOnce()> {
    state: State,
    on_read: Option<F>,
    scrolled: bool,
    timed: bool,
    hidden: bool,
    observing: bool,
    listening: bool,
    /// Dwell time still owed when the timer last (re)started.
    remaining: Duration,
    /// When the running timer started, `None` if no timer runs.
    timer_started: Option<Duration>,
}

impl<F: FnOnce()> Default for ReadProgress<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FnOnce()> ReadProgress<F> {
    /// Create an idle detector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            on_read: None,
            scrolled: false,
            timed: false,
            hidden: false,
            observing: false,
            listening: false,
            remaining: Duration::ZERO,
            timer_started: None,
        }
    }

    /// Start tracking an article with the given reading time.
    ///
    /// Returns `None` without tracking when `read_time_ms` is zero or the
    /// detector was already activated.
    pub fn activate(&mut self, read_time_ms: u64, now: Duration, on_read: F) -> Option<Vec<Effect>> {
        if read_time_ms == 0 || self.state != State::Idle {
            return None;
        }

        let dwell = Duration::from_millis(read_time_ms.saturating_mul(DWELL_NUM) / DWELL_DEN);
        self.state = State::Active;
        self.on_read = Some(on_read);
        self.observing = true;
        self.listening = true;
        self.remaining = dwell;
        self.timer_started = Some(now);
        tracing::debug!(read_time_ms, dwell_ms = dwell.as_millis(), "read tracking armed");

        Some(vec![
            Effect::ObserveSentinel,
            Effect::StartTimer(dwell),
            Effect::ListenVisibility,
        ])
    }

    /// The sentinel scrolled into view.
    pub fn sentinel_visible(&mut self, now: Duration) -> Vec<Effect> {
        if self.state != State::Active || !self.observing {
            return Vec::new();
        }

        self.scrolled = true;
        self.observing = false;
        let mut effects = vec![Effect::StopObserving, Effect::RemoveSentinel];
        tracing::trace!(at_ms = now.as_millis(), "sentinel seen");
        self.maybe_finish(&mut effects);
        effects
    }

    /// The dwell timer fired.
    ///
    /// Ignored while the document is hidden, when no timer runs, or before
    /// the running timer's [`deadline`](Self::deadline).
    pub fn timer_elapsed(&mut self, now: Duration) -> Vec<Effect> {
        if self.state != State::Active || self.hidden {
            return Vec::new();
        }
        match self.deadline() {
            Some(deadline) if now >= deadline => {}
            _ => return Vec::new(),
        }

        self.timed = true;
        self.timer_started = None;
        self.remaining = Duration::ZERO;
        self.listening = false;
        let mut effects = vec![Effect::RemoveVisibilityListener];
        tracing::trace!(at_ms = now.as_millis(), "dwell time reached");
        self.maybe_finish(&mut effects);
        effects
    }

    /// The document became hidden or visible.
    ///
    /// Hiding pauses the dwell timer; showing resumes it with the time still
    /// owed.
    pub fn visibility_changed(&mut self, hidden: bool, now: Duration) -> Vec<Effect> {
        if self.state != State::Active || !self.listening || hidden == self.hidden {
            return Vec::new();
        }
        self.hidden = hidden;

        if hidden {
            let Some(started) = self.timer_started.take() else {
                return Vec::new();
            };
            self.remaining = self.remaining.saturating_sub(now.saturating_sub(started));
            vec![Effect::CancelTimer]
        } else if self.timed {
            Vec::new()
        } else {
            self.timer_started = Some(now);
            vec![Effect::StartTimer(self.remaining)]
        }
    }

    /// Stop tracking. No callback fires afterwards.
    ///
    /// Calling this more than once returns no further effects.
    pub fn deactivate(&mut self) -> Vec<Effect> {
        if self.state != State::Active {
            if self.state == State::Idle {
                self.state = State::TornDown;
            }
            return Vec::new();
        }

        self.state = State::TornDown;
        self.on_read = None;
        self.release()
    }

    /// When the running dwell timer fires, `None` if no timer runs.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.timer_started.map(|started| started + self.remaining)
    }

    /// Current progress.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Done => Phase::Done,
            State::TornDown => Phase::TornDown,
            State::Active => match (self.scrolled, self.timed) {
                (true, _) => Phase::ScrollSatisfied,
                (false, true) => Phase::TimeSatisfied,
                (false, false) => Phase::Armed,
            },
        }
    }

    /// Whether the document is currently hidden.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.hidden
    }

    /// Whether the callback has fired.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    fn maybe_finish(&mut self, effects: &mut Vec<Effect>) {
        if !(self.scrolled && self.timed) {
            return;
        }

        self.state = State::Done;
        if let Some(on_read) = self.on_read.take() {
            tracing::debug!("article read");
            on_read();
        }
        effects.extend(self.release());
    }

    /// Effects releasing whatever is still held.
    fn release(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.timer_started.take().is_some() {
            effects.push(Effect::CancelTimer);
        }
        if self.observing {
            self.observing = false;
            effects.push(Effect::StopObserving);
        }
        if self.listening {
            self.listening = false;
            effects.push(Effect::RemoveVisibilityListener);
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_zero_read_time_not_tracked() {
        let mut progress = ReadProgress::new();

        assert_eq!(progress.activate(0, secs(0), || {}), None);
        assert_eq!(progress.phase(), Phase::Idle);
    }

    #[test]
    fn test_scroll_then_time() {
        let fired = Cell::new(0);
        let mut progress = ReadProgress::new();
        progress.activate(10_000, secs(0), || fired.set(fired.get() + 1));

        assert_eq!(
            progress.sentinel_visible(secs(1)),
            vec![Effect::StopObserving, Effect::RemoveSentinel]
        );
        assert_eq!(progress.phase(), Phase::ScrollSatisfied);
        assert_eq!(fired.get(), 0);

        assert_eq!(
            progress.timer_elapsed(secs(6)),
            vec![Effect::RemoveVisibilityListener]
        );
        assert_eq!(progress.phase(), Phase::Done);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_time_then_scroll() {
        let fired = Cell::new(false);
        let mut progress = ReadProgress::new();
        progress.activate(10_000, secs(0), || fired.set(true));

        progress.timer_elapsed(secs(6));
        assert_eq!(progress.phase(), Phase::TimeSatisfied);
        assert!(!fired.get());

        progress.sentinel_visible(secs(30));
        assert!(fired.get());
        assert!(progress.is_done());
    }

    #[test]
    fn test_scroll_alone_never_fires() {
        let fired = Cell::new(false);
        let mut progress = ReadProgress::new();
        progress.activate(10_000, secs(0), || fired.set(true));

        progress.sentinel_visible(secs(1));
        progress.sentinel_visible(secs(2));

        assert!(!fired.get());
        assert_eq!(progress.phase(), Phase::ScrollSatisfied);
    }

    #[test]
    fn test_hidden_time_not_counted() {
        let mut progress = ReadProgress::new();
        progress.activate(10_000, secs(0), || {});
        assert_eq!(progress.deadline(), Some(secs(6)));

        assert_eq!(progress.visibility_changed(true, secs(2)), vec![Effect::CancelTimer]);
        assert!(progress.is_paused());
        assert_eq!(progress.deadline(), None);

        assert_eq!(
            progress.visibility_changed(false, secs(5)),
            vec![Effect::StartTimer(secs(4))]
        );
        assert_eq!(progress.deadline(), Some(secs(9)));

        assert_eq!(
            progress.timer_elapsed(secs(9)),
            vec![Effect::RemoveVisibilityListener]
        );
        assert_eq!(progress.phase(), Phase::TimeSatisfied);
    }

    #[test]
    fn test_sentinel_while_hidden_waits_for_dwell() {
        let fired = Cell::new(0);
        let mut progress = ReadProgress::new();
        progress.activate(10_000, secs(0), || fired.set(fired.get() + 1));

        progress.visibility_changed(true, secs(2));
        assert_eq!(
            progress.sentinel_visible(secs(3)),
            vec![Effect::StopObserving, Effect::RemoveSentinel]
        );
        progress.visibility_changed(false, secs(5));
        assert_eq!(progress.deadline(), Some(secs(9)));

        assert!(progress.timer_elapsed(Duration::from_millis(8_900)).is_empty());
        assert_eq!(fired.get(), 0);
        assert_eq!(progress.phase(), Phase::ScrollSatisfied);

        assert_eq!(
            progress.timer_elapsed(secs(9)),
            vec![Effect::RemoveVisibilityListener]
        );
        assert_eq!(fired.get(), 1);
        assert_eq!(progress.phase(), Phase::Done);
    }

    #[test]
    fn test_late_sentinel_after_hidden_dwell() {
        let fired = Cell::new(0);
        let mut progress = ReadProgress::new();
        progress.activate(10_000, secs(0), || fired.set(fired.get() + 1));
        progress.visibility_changed(true, secs(2));
        progress.visibility_changed(false, secs(5));

        progress.timer_elapsed(secs(9));
        assert_eq!(progress.phase(), Phase::TimeSatisfied);
        assert_eq!(fired.get(), 0);

        assert_eq!(
            progress.sentinel_visible(secs(12)),
            vec![Effect::StopObserving, Effect::RemoveSentinel]
        );
        assert_eq!(fired.get(), 1);
        assert_eq!(progress.phase(), Phase::Done);
    }

    #[test]
    fn test_timer_ignored_while_hidden() {
        let mut progress = ReadProgress::new();
        progress.activate(10_000, secs(0), || {});
        progress.visibility_changed(true, secs(1));

        assert!(progress.timer_elapsed(secs(6)).is_empty());
        assert_eq!(progress.phase(), Phase::Armed);
    }

    #[test]
    fn test_repeated_visibility_events_ignored() {
        let mut progress = ReadProgress::new();
        progress.activate(10_000, secs(0), || {});

        assert!(progress.visibility_changed(false, secs(1)).is_empty());
        progress.visibility_changed(true, secs(2));
        assert!(progress.visibility_changed(true, secs(3)).is_empty());
        assert_eq!(
            progress.visibility_changed(false, secs(4)),
            vec![Effect::StartTimer(secs(4))]
        );
    }

    #[test]
    fn test_deactivate_prevents_callback() {
        let fired = Cell::new(false);
        let mut progress = ReadProgress::new();
        progress.activate(10_000, secs(0), || fired.set(true));
        progress.sentinel_visible(secs(1));

        assert_eq!(
            progress.deactivate(),
            vec![Effect::CancelTimer, Effect::RemoveVisibilityListener]
        );
        assert!(progress.deactivate().is_empty());
        assert!(progress.timer_elapsed(secs(6)).is_empty());

        assert!(!fired.get());
        assert_eq!(progress.phase(), Phase::TornDown);
    }

    #[test]
    fn test_deactivate_armed_releases_everything() {
        let mut progress = ReadProgress::new();
        progress.activate(1_000, secs(0), || {});

        assert_eq!(
            progress.deactivate(),
            vec![
                Effect::CancelTimer,
                Effect::StopObserving,
                Effect::RemoveVisibilityListener,
            ]
        );
    }

    #[test]
    fn test_activate_twice_ignored() {
        let mut progress: ReadProgress<fn()> = ReadProgress::new();
        progress.activate(1_000, secs(0), || {});

        assert_eq!(progress.activate(1_000, secs(1), || {}), None);
    }

    #[test]
    fn test_no_events_after_done() {
        let fired = Cell::new(0);
        let mut progress = ReadProgress::new();
        progress.activate(1_000, secs(0), || fired.set(fired.get() + 1));
        progress.timer_elapsed(Duration::from_millis(600));
        progress.sentinel_visible(secs(1));

        assert!(progress.sentinel_visible(secs(2)).is_empty());
        assert!(progress.timer_elapsed(secs(3)).is_empty());
        assert!(progress.deactivate().is_empty());
        assert_eq!(fired.get(), 1);
        assert_eq!(progress.phase(), Phase::Done);
    }
}
