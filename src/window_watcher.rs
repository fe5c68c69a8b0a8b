use std::{sync::Arc, time::Duration};

use tokio::{
    select,
    sync::watch,
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use tracing::{info, info_span, warn, Instrument};
use tokio_util::sync::CancellationToken;

use crate::{
    api::EventSource,
    models::{EventId, SubmissionWindow},
    phase::{Clock, Phase},
};

/// Fetches the event once, then only wakes at the window boundaries.
pub struct SubmissionWindowWatcher {
    phase: watch::Receiver<Option<Phase>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SubmissionWindowWatcher {
    pub fn spawn<S>(source: Arc<S>, clock: Arc<dyn Clock>, event_id: EventId) -> Self
    where
        S: EventSource + ?Sized + 'static,
    {
        let (sender, phase) = watch::channel(None);
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(
                async move {
                    select! {
                        _ = cancel.cancelled() => {}
                        _ = watch_window(source, clock, event_id, &sender, &cancel) => {}
                    }
                }
                .instrument(info_span!("window_watcher", %event_id)),
            )
        };

        SubmissionWindowWatcher {
            phase,
            cancel,
            task,
        }
    }

    pub fn phase(&self) -> Phase {
        self.loaded_phase().unwrap_or(Phase::Before)
    }

    pub fn loaded_phase(&self) -> Option<Phase> {
        *self.phase.borrow()
    }

    /// The channel closes once the phase is terminal or the window could not be loaded.
    pub fn subscribe(&self) -> watch::Receiver<Option<Phase>> {
        self.phase.clone()
    }

    pub fn close(self) {}
}

impl Drop for SubmissionWindowWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

async fn watch_window<S>(
    source: Arc<S>,
    clock: Arc<dyn Clock>,
    event_id: EventId,
    sender: &watch::Sender<Option<Phase>>,
    cancel: &CancellationToken,
) where
    S: EventSource + ?Sized,
{
    let window = match source.fetch_event(event_id).await {
        Ok(event) => match event.submission_window() {
            Some(window) => window,
            None => {
                warn!(
                    "Event {event_id} ends before it starts ({} > {}), not tracking its window",
                    event.registration_start, event.registration_end
                );
                return;
            }
        },
        Err(err) => {
            warn!("Could not fetch submission window of event {event_id}: {err}");
            return;
        }
    };

    if cancel.is_cancelled() {
        return;
    }

    let now_millis = clock.now_millis();
    let now_instant = Instant::now();
    let phase = window.phase_at(now_millis);
    info!("Submission window phase on load: {phase}");
    sender.send_replace(Some(phase));

    let boundary = |millis: i64| {
        let delay = u64::try_from(millis - now_millis).unwrap_or(0);
        now_instant + Duration::from_millis(delay)
    };

    if phase == Phase::Before {
        sleep_until(boundary(window.start_millis())).await;
        commit_boundary(&window, window.start_millis(), sender, cancel);
    }

    let reached_end = *sender.borrow() == Some(Phase::After);
    if !reached_end {
        sleep_until(boundary(window.end_millis())).await;
        commit_boundary(&window, window.end_millis(), sender, cancel);
    }
}

fn commit_boundary(
    window: &SubmissionWindow,
    boundary_millis: i64,
    sender: &watch::Sender<Option<Phase>>,
    cancel: &CancellationToken,
) {
    if cancel.is_cancelled() {
        return;
    }

    let phase = window.phase_at(boundary_millis);
    info!("Submission window phase changed to {phase}");
    sender.send_replace(Some(phase));
}
