use std::time::{Duration, Instant};

/// Monotonic time source for the frame loop.
#[derive(Debug, Clone, Copy)]
pub struct AnimationClock {
    start: Instant,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::start()
    }
}

impl AnimationClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Milliseconds since start, the unit the light orbit runs on.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_runs_backwards() {
        let clock = AnimationClock::start();
        let first = clock.elapsed_ms();
        std::thread::sleep(Duration::from_millis(2));
        let second = clock.elapsed_ms();
        assert!(first >= 0.0);
        assert!(second >= first + 1.0);
    }
}
