//! Host memory probe. Samples system memory on an interval and forwards
//! pressure levels to the loader. Level changes are always forwarded;
//! Critical is re-sent every sample while it persists so the loader keeps
//! shedding until the host recovers.

use std::time::Duration;

use anyhow::Result;
use sysinfo::System;
use tokio::select;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::pressure::PressureSignal;
use crate::tasks::loader::LoaderHandle;

pub async fn run(
    handle: LoaderHandle,
    sample_every: Duration,
    cancel: CancellationToken,
) -> Result<()> {
    let mut system = System::new();
    let mut last: Option<PressureSignal> = None;
    let mut ticker = interval(sample_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting memory probe");
                break;
            }

            _ = ticker.tick() => {
                system.refresh_memory();
                let total = system.total_memory();
                if total == 0 {
                    continue;
                }
                let available = system.available_memory();
                let utilization = 1.0 - (available as f64 / total as f64);
                let signal = PressureSignal::from_utilization(utilization);
                if last != Some(signal) || signal == PressureSignal::Critical {
                    debug!(?signal, utilization, "host memory sampled");
                    handle.pressure(signal).await;
                    last = Some(signal);
                }
            }
        }
    }
    Ok(())
}
