//! Poll loop: check both regions concurrently, evaluate per-region
//! notification cooldowns, sleep, repeat.

use chrono::{DateTime, Local, Utc};
use std::time::Duration;
use tokio::sync::watch;

use crate::checker::{AvailabilityChecker, Region};
use crate::config::NotifierConfig;
use crate::notifier::Notify;

/// Per-region notification state, owned by the watcher for the process
/// lifetime. Empty at startup; updated only after a successful send.
#[derive(Debug)]
struct RegionState {
    region: Region,
    last_notified: Option<DateTime<Utc>>,
}

impl RegionState {
    fn new(region: Region) -> Self {
        Self {
            region,
            last_notified: None,
        }
    }

    /// Cooldown check: no prior notification, or at least the region's
    /// cooldown worth of whole minutes between then and now. The absolute
    /// difference keeps a backwards clock step from re-triggering early.
    fn cooldown_elapsed(&self, now: DateTime<Utc>) -> bool {
        match self.last_notified {
            None => true,
            Some(last) => {
                (now - last).num_minutes().abs() >= self.region.cooldown().num_minutes()
            }
        }
    }
}

/// Long-running orchestrator over the two region checkers and the notifier.
pub struct AppointmentWatcher<N: Notify> {
    wa_checker: AvailabilityChecker,
    nv_checker: AvailabilityChecker,
    notifier: N,
    poll_interval: Duration,
    wa_state: RegionState,
    nv_state: RegionState,
    cycle: u64,
}

impl<N: Notify> AppointmentWatcher<N> {
    pub fn new(config: &NotifierConfig, notifier: N) -> Self {
        let client = reqwest::Client::new();
        Self {
            wa_checker: AvailabilityChecker::new(
                client.clone(),
                &config.scheduler_base_url,
                Region::Wa,
            ),
            nv_checker: AvailabilityChecker::new(client, &config.scheduler_base_url, Region::Nv),
            notifier,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            wa_state: RegionState::new(Region::Wa),
            nv_state: RegionState::new(Region::Nv),
            cycle: 1,
        }
    }

    /// Run cycles until the shutdown channel flips. Cycles never overlap;
    /// the in-flight cycle finishes before shutdown is observed.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "Watching {} and {} (interval: {:?})",
            self.wa_checker.region().label(),
            self.nv_checker.region().label(),
            self.poll_interval
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.changed() => {
                    tracing::info!("Shutdown requested, stopping watcher");
                    break;
                }
            }
        }
    }

    async fn run_cycle(&mut self) {
        let (wa_available, nv_available) =
            tokio::join!(self.wa_checker.check(), self.nv_checker.check());

        self.evaluate(wa_available, nv_available, Utc::now()).await;
    }

    /// Apply one cycle's results: log availability, send notifications where
    /// the cooldown allows, advance the cycle counter.
    async fn evaluate(&mut self, wa_available: bool, nv_available: bool, now: DateTime<Utc>) {
        let cycle = self.cycle;
        let now_str = now.with_timezone(&Local).format("%-m/%-d/%Y, %r");

        let Self {
            wa_state,
            nv_state,
            notifier,
            ..
        } = self;
        let regions = [(wa_state, wa_available), (nv_state, nv_available)];

        for (state, available) in regions {
            if !available {
                continue;
            }

            let subject = format!(
                "[{cycle}] {} appointment availability found at {now_str}",
                state.region.label()
            );
            tracing::info!("{subject}");

            if state.cooldown_elapsed(now) {
                match notifier.notify(&title_case(&subject)).await {
                    Ok(()) => state.last_notified = Some(now),
                    Err(e) => {
                        tracing::error!(
                            "Failed to notify for {}: {:#}",
                            state.region.label(),
                            e
                        );
                    }
                }
            }
        }

        if !wa_available && !nv_available {
            tracing::info!("[{cycle}] Appointment availability not found. Keep looking...");
        }

        self.cycle += 1;
    }
}

/// Uppercase the first letter of each whitespace-separated word, leaving the
/// rest of the word untouched.
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
