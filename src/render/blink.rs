//! Blink ticker: a dedicated thread pacing cursor blinks.
//!
//! Each [`Tick`] carries the cursor phase it starts, so a receiver only
//! needs the latest one. Ticks go out on a small bounded channel and a
//! slow receiver loses ticks rather than letting them queue up.

use crossbeam_channel::{bounded, select, tick, Receiver, Sender, TrySendError};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// One blink period elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Tick number (monotonically increasing).
    pub frame: u64,
    /// Time elapsed since the ticker was started.
    pub elapsed: Duration,
    /// Whether the cursor is drawn until the next tick.
    pub visible: bool,
}

/// Thread emitting a [`Tick`] every blink interval until stopped.
///
/// The cursor starts visible; the first tick hides it.
#[derive(Debug)]
pub struct BlinkTicker {
    handle: Option<JoinHandle<()>>,
    /// Dropping this wakes the thread and ends it.
    stop_tx: Option<Sender<()>>,
    tick_rx: Receiver<Tick>,
}

impl BlinkTicker {
    /// Spawn a ticker with the given interval.
    pub fn spawn(interval: Duration) -> io::Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let (tick_tx, tick_rx) = bounded(2);

        let handle = thread::Builder::new()
            .name("teletype-blink".to_string())
            .spawn(move || blink_loop(&tick_tx, &stop_rx, interval))?;

        tracing::trace!(?interval, "blink ticker started");
        Ok(Self {
            handle: Some(handle),
            stop_tx: Some(stop_tx),
            tick_rx,
        })
    }

    /// The tick receiver, for use with `select!`.
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// The most recent pending tick, discarding older ones.
    pub fn latest(&self) -> Option<Tick> {
        self.tick_rx.try_iter().last()
    }

    /// Signal the ticker thread to exit without waiting for it.
    pub fn shutdown(&mut self) {
        self.stop_tx.take();
    }

    /// Stop the ticker and wait for its thread.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        tracing::trace!("blink ticker stopped");
    }
}

impl Drop for BlinkTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn blink_loop(tick_tx: &Sender<Tick>, stop_rx: &Receiver<()>, interval: Duration) {
    let start = Instant::now();
    let metronome = tick(interval);
    let mut visible = true;

    for frame in 0u64.. {
        let running = select! {
            recv(stop_rx) -> _ => false,
            recv(metronome) -> at => {
                visible = !visible;
                let elapsed = at.map_or(Duration::ZERO, |at| at.saturating_duration_since(start));
                // Full: skip this one, the next tick carries the current phase
                !matches!(
                    tick_tx.try_send(Tick { frame, elapsed, visible }),
                    Err(TrySendError::Disconnected(_))
                )
            }
        };
        if !running {
            break;
        }
    }
}
