use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, warn};
use parking_lot::{Condvar, Mutex};

use crate::{
    config::{LayoutSettings, MarkerConfig},
    constants::MARKER_SETTINGS,
    domain::ExperienceRecord,
    error::{Result, TimelineError},
};

use super::{
    marker::{MarkerSnapshot, compute_marker, duration_until_midnight},
    progress::Clock,
};

struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    fn new() -> Self {
        Self {
            stopped: Mutex::new(false),
            wake: Condvar::new(),
        }
    }

    /// Sleeps up to `timeout`; returns true once stop has been requested.
    fn wait_for(&self, timeout: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while !*stopped {
                self.wake.wait(&mut stopped);
            }
            return true;
        };

        while !*stopped {
            if self.wake.wait_until(&mut stopped, deadline).timed_out() {
                break;
            }
        }
        *stopped
    }

    fn stop(&self) {
        *self.stopped.lock() = true;
        self.wake.notify_all();
    }

    fn is_stopped(&self) -> bool {
        *self.stopped.lock()
    }
}

#[derive(Clone)]
struct MarkerSource {
    records: Arc<[ExperienceRecord]>,
    settings: Arc<LayoutSettings>,
    clock: Arc<dyn Clock>,
    animated: bool,
    sender: Sender<MarkerSnapshot>,
}

impl MarkerSource {
    /// False once the consumer has gone away.
    fn publish(&self) -> bool {
        let snapshot = compute_marker(
            &self.records,
            &self.settings,
            self.clock.now(),
            self.animated,
        );
        self.sender.send(snapshot).is_ok()
    }
}

/// Owns the recurring tick and the midnight one-shot. Both are released
/// together by [`MarkerTicker::stop`] or on drop.
pub struct MarkerTicker {
    stop: Arc<StopSignal>,
    workers: Vec<JoinHandle<()>>,
}

impl MarkerTicker {
    pub fn start(
        records: Arc<[ExperienceRecord]>,
        settings: LayoutSettings,
        config: &MarkerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, Receiver<MarkerSnapshot>)> {
        let (sender, receiver) = mpsc::channel();
        let stop = Arc::new(StopSignal::new());
        let source = MarkerSource {
            records,
            settings: Arc::new(settings),
            clock,
            animated: config.animated,
            sender,
        };

        let mut ticker = Self {
            stop: Arc::clone(&stop),
            workers: Vec::with_capacity(2),
        };

        let interval = config.tick_interval();
        let recurring = {
            let source = source.clone();
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("marker-tick".to_string())
                .spawn(move || {
                    debug!("marker tick started, interval {:?}", interval);
                    if !source.publish() {
                        return;
                    }
                    while !stop.wait_for(interval) {
                        if !source.publish() {
                            debug!("marker consumer dropped, tick exiting");
                            break;
                        }
                    }
                })
                .map_err(|e| TimelineError::Ticker(e.to_string()))?
        };
        ticker.workers.push(recurring);

        if config.handle_midnight {
            let stop = Arc::clone(&stop);
            let spawned = thread::Builder::new()
                .name("marker-midnight".to_string())
                .spawn(move || {
                    let settle = Duration::from_millis(MARKER_SETTINGS.midnight_settle_ms);
                    loop {
                        let wait = duration_until_midnight(source.clock.now()) + settle;
                        debug!("marker midnight refresh armed in {:?}", wait);
                        if stop.wait_for(wait) || !source.publish() {
                            break;
                        }
                    }
                });
            // Dropping `ticker` here stops the recurring thread too.
            match spawned {
                Ok(handle) => ticker.workers.push(handle),
                Err(e) => return Err(TimelineError::Ticker(e.to_string())),
            }
        }

        Ok((ticker, receiver))
    }

    pub fn is_running(&self) -> bool {
        !self.stop.is_stopped()
    }

    pub fn stop(&mut self) {
        self.stop.stop();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("marker worker panicked before shutdown");
            }
        }
    }
}

impl Drop for MarkerTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
