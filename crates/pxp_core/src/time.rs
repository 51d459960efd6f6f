use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 60;

/// Fixed-rate simulation clock.
///
/// Wall-clock time is fed into an accumulator once per rendered frame and
/// drained in whole `fixed_dt` slices by `should_step`, so the game advances
/// exactly `ticks_per_second` times per second regardless of render rate.
pub struct TimeState {
    pub ticks_per_second: u32,
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_rate(60)
    }

    pub fn with_rate(ticks_per_second: u32) -> Self {
        let ticks_per_second = ticks_per_second.max(1);
        let fixed_dt = 1.0 / ticks_per_second as f64;
        Self {
            ticks_per_second,
            fixed_dt,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [fixed_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: ticks_per_second as f64,
            smoothed_frame_time_ms: fixed_dt * 1000.0,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.feed(real_dt);
    }

    /// Account for `real_dt` seconds of wall-clock time.
    pub fn feed(&mut self, real_dt: f64) {
        self.real_dt = real_dt;

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms — capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// Instant at which the accumulator will hold at least one whole step.
    /// The event loop sleeps until then instead of spinning.
    pub fn next_step_deadline(&self) -> Instant {
        let missing = (self.fixed_dt - self.accumulator).max(0.0);
        self.last_instant + Duration::from_secs_f64(missing)
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
