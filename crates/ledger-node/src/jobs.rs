use std::{future::Future, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::state::AppState;

/// Runs `job` every `every`, starting one period from now. A zero period
/// disables the job.
pub fn spawn_periodic<F, Fut>(name: &'static str, every: Duration, mut job: F) -> Option<JoinHandle<()>>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    if every.is_zero() {
        info!(job = name, "periodic job disabled");
        return None;
    }
    info!(job = name, every_secs = every.as_secs(), "scheduling periodic job");
    Some(tokio::spawn(async move {
        let mut ticker = time::interval_at(time::Instant::now() + every, every);
        // Rounds that overrun the period push the schedule back instead of bunching up.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            job().await;
        }
    }))
}

pub fn spawn_mining(state: AppState, every: Duration) -> Option<JoinHandle<()>> {
    spawn_periodic("mine", every, move || {
        let state = state.clone();
        async move {
            if let Err(err) = state.mine().await {
                warn!(error = %err, "scheduled mining round failed");
            }
        }
    })
}

pub fn spawn_consensus(state: AppState, every: Duration) -> Option<JoinHandle<()>> {
    spawn_periodic("resolve", every, move || {
        let state = state.clone();
        async move {
            state.resolve().await;
        }
    })
}
