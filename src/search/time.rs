//! Time controller (C13): soft/hard deadlines derived from the clock state,
//! plus the atomic control flags other threads use to steer an in-progress
//! search.
//!
//! Grounded in the teacher's `TimeManager` (`start_time`/`allotted`/
//! `stop_signal`, a cheap node-counted `check_time`) extended with the
//! richer flag set and soft/hard deadline split the data model names: wider
//! margins with many moves left in the control, narrower as the clock runs
//! low, and the `stopping`/`searching_first_move`/`resolving_root_fail_*`/
//! `move_immediately`/`current_is_only_move` coordination flags (C13).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// What the host told us about the clock for this move.
#[derive(Debug, Clone, Copy)]
pub struct TimeControl {
    pub remaining: Duration,
    pub increment: Duration,
    pub moves_to_go: Option<u32>,
    pub fixed_time_per_move: Option<Duration>,
    pub pondering: bool,
}

impl Default for TimeControl {
    fn default() -> Self {
        TimeControl {
            remaining: Duration::from_secs(60),
            increment: Duration::ZERO,
            moves_to_go: None,
            fixed_time_per_move: None,
            pondering: false,
        }
    }
}

pub struct TimeController {
    start: Instant,
    soft_deadline: Duration,
    hard_deadline: Duration,

    pub stopping: AtomicBool,
    pub searching_first_move: AtomicBool,
    pub resolving_root_fail_high: AtomicBool,
    pub resolving_root_fail_low: AtomicBool,
    pub move_immediately: AtomicBool,
    pub current_is_only_move: AtomicBool,
}

/// Fraction of remaining time allotted to the soft/hard deadlines. Wider
/// margins early (many moves left), narrower as `moves_to_go` shrinks.
fn compute_deadlines(tc: &TimeControl) -> (Duration, Duration) {
    if let Some(fixed) = tc.fixed_time_per_move {
        return (fixed, fixed + fixed / 4);
    }

    let moves_left = tc.moves_to_go.unwrap_or(30).max(1) as f64;
    let base = tc.remaining.as_secs_f64() / moves_left + tc.increment.as_secs_f64() * 0.8;
    let urgency = if moves_left <= 5.0 { 0.6 } else { 1.0 };
    let soft = (base * urgency).max(0.02);
    let hard = (soft * 3.0).min(tc.remaining.as_secs_f64() * 0.9).max(soft);
    (Duration::from_secs_f64(soft), Duration::from_secs_f64(hard))
}

impl TimeController {
    pub fn new(tc: TimeControl) -> Self {
        let (soft_deadline, hard_deadline) = compute_deadlines(&tc);
        TimeController {
            start: Instant::now(),
            soft_deadline,
            hard_deadline,
            stopping: AtomicBool::new(false),
            searching_first_move: AtomicBool::new(false),
            resolving_root_fail_high: AtomicBool::new(false),
            resolving_root_fail_low: AtomicBool::new(false),
            move_immediately: AtomicBool::new(false),
            current_is_only_move: AtomicBool::new(false),
        }
    }

    /// An infinite-analysis controller: never signals stop on its own.
    pub fn unbounded() -> Self {
        TimeController {
            start: Instant::now(),
            soft_deadline: Duration::from_secs(u64::MAX / 2),
            hard_deadline: Duration::from_secs(u64::MAX / 2),
            stopping: AtomicBool::new(false),
            searching_first_move: AtomicBool::new(false),
            resolving_root_fail_high: AtomicBool::new(false),
            resolving_root_fail_low: AtomicBool::new(false),
            move_immediately: AtomicBool::new(false),
            current_is_only_move: AtomicBool::new(false),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Called from the driver before starting a new iterative-deepening
    /// iteration: don't begin an iteration we have no realistic chance of
    /// completing within the soft deadline (except the very first, which
    /// always runs so the engine has at least one move).
    pub fn should_stop_before_iteration(&self, depth_plies: i32, is_first: bool) -> bool {
        if self.stopping.load(Ordering::Relaxed) {
            return true;
        }
        if is_first || depth_plies <= 1 {
            return false;
        }
        self.elapsed() >= self.soft_deadline
    }

    /// Periodic check from deep within search (C13's "every N nodes" check).
    /// `external_stop` models an externally queued command that requires
    /// unrolling the search (e.g. a new `setboard`); `resolving_root_fail`
    /// suppresses a soft-deadline abort mid-resolution of a root fail-high.
    pub fn periodic_check(&self, external_stop: bool) {
        if external_stop {
            self.stopping.store(true, Ordering::Relaxed);
            return;
        }
        if self.move_immediately.load(Ordering::Relaxed) {
            self.stopping.store(true, Ordering::Relaxed);
            return;
        }
        let resolving = self.resolving_root_fail_high.load(Ordering::Relaxed)
            || self.resolving_root_fail_low.load(Ordering::Relaxed)
            || self.searching_first_move.load(Ordering::Relaxed);
        if self.elapsed() >= self.hard_deadline || (!resolving && self.elapsed() >= self.soft_deadline * 4) {
            self.stopping.store(true, Ordering::Relaxed);
        }
    }

    pub fn request_stop(&self) {
        self.stopping.store(true, Ordering::Relaxed);
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Relaxed)
    }
}
