#![forbid(unsafe_code)]

use std::{process::exit, sync::Arc};

use indoc::formatdoc;
use pmc_portal::{
    api::{AttendeeApi, DraftStore, PortalClient},
    config::AppConfig,
    deliverables::DeliverableFlags,
    event_view::resolve_event_view,
    models::{types::UtcDateTime, DraftKey, EventId},
    phase::{Clock, Phase, SystemClock},
    window_watcher::SubmissionWindowWatcher,
};
use tokio::{select, signal};
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    "pmc_portal=info"
                        .parse()
                        .expect("Hard-coded default directive should be correct"),
                )
                .from_env_lossy(),
        )
        .init();

    if let Err(err) = dotenv_result {
        warn!("Could not load config from .env file: {err}");
    }

    let app_config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load app config: {err}");
            exit(255);
        }
    };

    if let Err(err) = run(app_config).instrument(info_span!("portal")).await {
        error!("{err:#}");
        exit(255);
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let client = Arc::new(PortalClient::new(&config.client_config())?);
    if let Some(token) = &config.api_token {
        client.auth().set(token.clone());
    }

    let event_id = config.event_id();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

    report_attendee_view(&client, event_id).await;
    report_deliverables(&client, event_id, clock.now()).await;
    if let Some(user_id) = config.user_id() {
        report_draft(&client, DraftKey::new(event_id, user_id)).await;
    }

    let watcher = SubmissionWindowWatcher::spawn(client.clone(), clock, event_id);
    let mut phases = watcher.subscribe();

    loop {
        select! {
            _ = signal::ctrl_c() => {
                info!("Ctrl-C received, shutting down");
                break;
            }

            changed = phases.changed() => {
                if changed.is_err() {
                    match watcher.loaded_phase() {
                        Some(Phase::After) => info!("Submission window has ended"),
                        Some(_) => {}
                        None => warn!(
                            "Submission window unavailable, assuming {}",
                            watcher.phase()
                        ),
                    }
                    break;
                }

                if let Some(phase) = *phases.borrow_and_update() {
                    info!("Submission window is now {phase}");
                }
            }
        }
    }

    watcher.close();
    client.auth().clear();
    Ok(())
}

async fn report_attendee_view(client: &PortalClient, event_id: EventId) {
    match client.fetch_attendee(event_id).await {
        Ok(attendee) => {
            let view = resolve_event_view(attendee.as_ref(), event_id);
            info!("Attendee view for event {event_id}: {view}");
        }
        Err(err) => warn!("Could not fetch attendee record: {err}"),
    }
}

async fn report_deliverables(client: &PortalClient, event_id: EventId, now: UtcDateTime) {
    let flags = DeliverableFlags::fetch(client, event_id).await;
    if flags.is_empty() {
        info!("Event {event_id} accepts no deliverables");
        return;
    }

    let lines = flags
        .iter()
        .map(|flag| {
            format!(
                "- {}: {} ({} to {})",
                flag.id,
                flags.status_at(&flag.id, now),
                flag.starttime,
                flag.deadline
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    let message = formatdoc! {
        r#"
            Deliverables of event {event_id}:
            {lines}
        "#,
        event_id = event_id,
        lines = lines,
    };
    info!("{}", message.trim_end());
}

async fn report_draft(client: &PortalClient, key: DraftKey) {
    match client.load_draft(&key).await {
        Ok(Some(draft)) => info!(
            "User {} has a saved draft with {} field(s)",
            key.user_id,
            draft.len()
        ),
        Ok(None) => info!("User {} has no saved draft", key.user_id),
        Err(err) => warn!("Could not load draft of user {}: {err}", key.user_id),
    }
}
