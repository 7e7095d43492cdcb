//! Progress reporting for the tile merge loop.
//!
//! With the `progress` feature, [`TileProgress`] drives an `indicatif` bar whose message shows
//! the last and smoothed (exponential moving average) time per tile. Without it, every call is a
//! no-op. In both cases the remaining tile count is logged at `debug`.
use tracing::debug;

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "progress")]
use std::time::{Duration, Instant};

/// Smoothing factor of the per-tile time average.
#[cfg(feature = "progress")]
const EMA_ALPHA: f64 = 0.2;

#[cfg(feature = "progress")]
struct IterTimer {
    last: Instant,
    ema_ns: f64,
    count: u64,
}

#[cfg(feature = "progress")]
impl IterTimer {
    fn new() -> Self {
        IterTimer {
            last: Instant::now(),
            ema_ns: 0.0,
            count: 0,
        }
    }

    /// Duration since the previous tick; updates `ema ← α·dt + (1 − α)·ema`.
    fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        self.count += 1;

        let dt_ns = dt.as_nanos() as f64;
        self.ema_ns = if self.count == 1 {
            dt_ns
        } else {
            EMA_ALPHA * dt_ns + (1.0 - EMA_ALPHA) * self.ema_ns
        };
        dt
    }

    fn avg(&self) -> Duration {
        Duration::from_nanos(self.ema_ns as u64)
    }
}

#[cfg(feature = "progress")]
fn fmt_dur(d: Duration) -> String {
    let us = d.as_micros();
    if us < 1_000 {
        format!("{us}µs")
    } else if d.as_millis() < 1_000 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.2}s", d.as_secs_f32())
    }
}

pub(crate) struct TileProgress {
    total: usize,
    done: usize,
    #[cfg(feature = "progress")]
    pb: ProgressBar,
    #[cfg(feature = "progress")]
    timer: IterTimer,
}

impl TileProgress {
    pub(crate) fn new(total: usize) -> Self {
        #[cfg(feature = "progress")]
        let pb = {
            let pb = ProgressBar::new(total.max(1) as u64);
            let style = ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} tiles ({percent:>3}%) | ETA {eta_precise} | {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            pb.enable_steady_tick(Duration::from_millis(200));
            pb
        };
        TileProgress {
            total,
            done: 0,
            #[cfg(feature = "progress")]
            pb,
            #[cfg(feature = "progress")]
            timer: IterTimer::new(),
        }
    }

    pub(crate) fn tick(&mut self) {
        self.done += 1;
        debug!(remaining = self.total.saturating_sub(self.done), "tile merged");

        #[cfg(feature = "progress")]
        {
            let last = self.timer.tick();
            self.pb.set_message(format!(
                "last: {}, avg: {}",
                fmt_dur(last),
                fmt_dur(self.timer.avg())
            ));
            self.pb.inc(1);
        }
    }

    pub(crate) fn finish(self) {
        #[cfg(feature = "progress")]
        self.pb.finish_and_clear();
    }
}
