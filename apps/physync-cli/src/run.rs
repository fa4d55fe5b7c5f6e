use physync_physics::{Clock, FixedRateTimer, ManualClock, PhysicsBridge, SystemClock};
use physync_render::upload_dirty_instances;
use physync_scene::Scene;
use physync_tools::{FrameTimer, TimingSummary};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Display refresh the render timer runs at.
const RENDER_PERIOD: Duration = Duration::from_micros(16_667);

/// Where loop time comes from: the wall clock, or a clock the loop jumps
/// forward itself so runs finish instantly and reproducibly.
pub enum Pace {
    Realtime(SystemClock),
    Headless(ManualClock),
}

impl Pace {
    pub fn new(realtime: bool) -> Self {
        if realtime {
            Self::Realtime(SystemClock::new())
        } else {
            Self::Headless(ManualClock::new())
        }
    }

    /// A clock for the bridge that reads the same time as the loop.
    pub fn bridge_clock(&self) -> Box<dyn Clock> {
        match self {
            Self::Realtime(c) => Box::new(*c),
            Self::Headless(c) => Box::new(c.clone()),
        }
    }

    fn now(&self) -> Duration {
        match self {
            Self::Realtime(c) => c.now(),
            Self::Headless(c) => c.now(),
        }
    }

    fn wait(&self, d: Duration) {
        match self {
            Self::Realtime(_) => std::thread::sleep(d),
            Self::Headless(c) => c.advance(d),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoopOutcome {
    pub steps: u64,
    pub frames: u64,
    pub uploaded_bytes: usize,
    pub timing: TimingSummary,
}

/// Poll the physics timer and the render timer on this thread until
/// `duration` of loop time has passed.
///
/// `between_steps` runs after every physics step; that is where input is
/// applied to the bridge.
pub fn run(
    pace: &Pace,
    bridge: &mut PhysicsBridge,
    scene: &mut Scene,
    duration: Duration,
    mut between_steps: impl FnMut(&mut PhysicsBridge, &mut Scene, u64),
) -> LoopOutcome {
    let step_period = bridge.config().step_period();
    let mut physics_timer = FixedRateTimer::new(step_period);
    let mut render_timer = FixedRateTimer::new(RENDER_PERIOD);
    let mut step_times = FrameTimer::new(120);
    let mut outcome = LoopOutcome {
        steps: 0,
        frames: 0,
        uploaded_bytes: 0,
        timing: step_times.summary(step_period),
    };

    let start = pace.now();
    physics_timer.poll(start);
    render_timer.poll(start);
    // the first step only records the start time
    bridge.step(scene);

    while pace.now().saturating_sub(start) < duration {
        let now = pace.now();
        if physics_timer.poll(now) {
            let began = Instant::now();
            let report = bridge.step(scene);
            step_times.record(began.elapsed());
            outcome.steps += 1;
            tracing::trace!(substeps = report.substeps, contacts = report.contacts, "tick");
            between_steps(bridge, scene, outcome.steps);
        }
        if render_timer.poll(now) {
            let uploaded = upload_dirty_instances(scene, |_, _| {});
            outcome.uploaded_bytes += uploaded.bytes;
            outcome.frames += 1;
        }
        let wait = physics_timer
            .time_until_due(now)
            .min(render_timer.time_until_due(now));
        pace.wait(wait.max(Duration::from_micros(1)));
    }

    outcome.timing = step_times.summary(step_period);
    tracing::info!(
        steps = outcome.steps,
        frames = outcome.frames,
        "loop finished"
    );
    outcome
}
