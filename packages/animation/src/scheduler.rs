use crate::errors::{AnimationError, AnimationResult};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Something the scheduler advances once per tick
pub trait Animation {
    /// Progress added on every tick; negative steps run backwards from 1.
    ///
    /// Must be finite and non-zero, or [`Scheduler::start`] refuses the
    /// animation: it would never leave `[0, 1]`.
    fn step(&self) -> f64;

    /// Progress the animation starts at
    fn start_progress(&self) -> f64 {
        if self.step() < 0.0 {
            1.0
        } else {
            0.0
        }
    }

    /// Called with the new progress while it stays within `[0, 1]`
    fn tick(&mut self, progress: f64);

    /// Called exactly once, when progress leaves `[0, 1]`
    fn stop(&mut self);

    fn name(&self) -> &str {
        "animation"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(u64);

/// Tick interval and per-animation duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub duration: Duration,
    pub interval: Duration,
}

impl Timing {
    pub fn new(duration: Duration, interval: Duration) -> AnimationResult<Self> {
        if interval.is_zero() {
            return Err(AnimationError::ZeroInterval);
        }
        if duration < interval {
            return Err(AnimationError::DurationTooShort { duration, interval });
        }
        Ok(Self { duration, interval })
    }

    pub fn from_millis(duration_ms: u64, interval_ms: u64) -> AnimationResult<Self> {
        Self::new(
            Duration::from_millis(duration_ms),
            Duration::from_millis(interval_ms),
        )
    }

    /// Progress advanced per tick
    pub fn step(&self) -> f64 {
        self.interval.as_secs_f64() / self.duration.as_secs_f64()
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(400),
            interval: Duration::from_millis(10),
        }
    }
}

struct Entry {
    id: AnimationId,
    progress: f64,
    stopped: bool,
    animation: Box<dyn Animation>,
}

pub struct Scheduler {
    interval: Duration,
    entries: Vec<Entry>,
    next_id: u64,
    running: bool,
    ticks: u64,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            entries: Vec::new(),
            next_id: 0,
            running: false,
            ticks: 0,
        }
    }

    pub fn with_timing(timing: Timing) -> Self {
        Self::new(timing.interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the tick source is active
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ticks delivered since the scheduler was created
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn progress(&self, id: AnimationId) -> Option<f64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.progress)
    }

    pub fn start(&mut self, animation: Box<dyn Animation>) -> AnimationResult<AnimationId> {
        let step = animation.step();
        if step == 0.0 || !step.is_finite() {
            return Err(AnimationError::InvalidStep { step });
        }
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        debug!(id = id.0, name = animation.name(), step, "Starting animation");
        self.entries.push(Entry {
            id,
            progress: animation.start_progress(),
            stopped: false,
            animation,
        });
        if !self.running {
            self.running = true;
            info!(interval_ms = self.interval.as_millis() as u64, "Tick source started");
        }
        Ok(id)
    }

    /// Drop an animation without calling its stop callback
    pub fn cancel(&mut self, id: AnimationId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            debug!(id = id.0, "Cancelled animation");
            self.stop_if_idle();
        }
        removed
    }

    /// Advance every animation by one step.
    ///
    /// Animations whose progress leaves `[0, 1]` are stopped during the pass
    /// but removed only after every animation has been visited. Returns the
    /// number still active.
    pub fn tick(&mut self) -> usize {
        if self.entries.is_empty() {
            return 0;
        }
        self.ticks += 1;

        for entry in &mut self.entries {
            entry.progress += entry.animation.step();
            if (0.0..=1.0).contains(&entry.progress) {
                entry.animation.tick(entry.progress);
            } else {
                entry.animation.stop();
                entry.stopped = true;
                trace!(id = entry.id.0, "Animation finished");
            }
        }

        self.entries.retain(|e| !e.stopped);
        self.stop_if_idle();
        self.entries.len()
    }

    /// Tick on a fixed interval until no animation is left
    pub async fn run(&mut self) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        while self.running {
            interval.tick().await;
            self.tick();
        }
    }

    fn stop_if_idle(&mut self) {
        if self.running && self.entries.is_empty() {
            self.running = false;
            info!(ticks = self.ticks, "Tick source stopped");
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::with_timing(Timing::default())
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("interval", &self.interval)
            .field("animations", &self.entries.len())
            .field("running", &self.running)
            .finish()
    }
}
