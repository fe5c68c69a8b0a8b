use std::{collections::HashMap, sync::Arc};

use strum::Display;

use crate::models::{Attendee, AttendeeStatus, EventId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EventView {
    Registration,
    Processing,
    Paywall,
    Dashboard,
    AccessDenied,
}

pub fn resolve_event_view(attendee: Option<&Attendee>, event_id: EventId) -> EventView {
    use AttendeeStatus::*;

    let attendee = match attendee {
        Some(attendee) => attendee,
        None => return EventView::Registration,
    };

    match attendee.status {
        Failed => EventView::Registration,
        Processing => EventView::Processing,
        Applied => EventView::Paywall,
        Registered | Accepted if attendee.event_id != event_id => EventView::AccessDenied,
        Registered | Accepted => EventView::Dashboard,
    }
}

pub type ViewFactory<V> = Arc<dyn Fn(EventId) -> V + Send + Sync>;

/// Per-event dashboards, registered at startup. Events without an entry get the default.
pub struct ViewRegistry<V> {
    views: HashMap<EventId, ViewFactory<V>>,
    default: ViewFactory<V>,
}

impl<V> ViewRegistry<V> {
    pub fn new(default: impl Fn(EventId) -> V + Send + Sync + 'static) -> ViewRegistry<V> {
        ViewRegistry {
            views: HashMap::new(),
            default: Arc::new(default),
        }
    }

    pub fn register(
        &mut self,
        event_id: EventId,
        factory: impl Fn(EventId) -> V + Send + Sync + 'static,
    ) -> &mut Self {
        self.views.insert(event_id, Arc::new(factory));
        self
    }

    pub fn has_custom_view(&self, event_id: EventId) -> bool {
        self.views.contains_key(&event_id)
    }

    pub fn build(&self, event_id: EventId) -> V {
        let factory = self.views.get(&event_id).unwrap_or(&self.default);
        factory(event_id)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::models::{Attendee, AttendeeStatus, EventId, UserId};

    use super::{resolve_event_view, EventView, ViewRegistry};

    fn event(n: u128) -> EventId {
        EventId(Uuid::from_u128(n))
    }

    fn attendee(status: AttendeeStatus) -> Attendee {
        Attendee {
            attendee_id: Uuid::from_u128(77),
            user_id: UserId::from("auth0|ada"),
            event_id: event(1),
            status,
        }
    }

    #[test]
    fn status_gates_view() {
        use AttendeeStatus::*;

        let cases = [
            (Failed, EventView::Registration),
            (Processing, EventView::Processing),
            (Applied, EventView::Paywall),
            (Registered, EventView::Dashboard),
            (Accepted, EventView::Dashboard),
        ];

        for (status, view) in cases {
            assert_eq!(
                resolve_event_view(Some(&attendee(status)), event(1)),
                view,
                "{status}"
            );
        }
    }

    #[test]
    fn unregistered_and_foreign() {
        assert_eq!(resolve_event_view(None, event(1)), EventView::Registration);
        assert_eq!(
            resolve_event_view(Some(&attendee(AttendeeStatus::Accepted)), event(2)),
            EventView::AccessDenied
        );
    }

    #[test]
    fn only_the_dashboard_checks_the_event() {
        use AttendeeStatus::*;

        let cases = [
            (Failed, EventView::Registration),
            (Processing, EventView::Processing),
            (Applied, EventView::Paywall),
            (Registered, EventView::AccessDenied),
            (Accepted, EventView::AccessDenied),
        ];

        for (status, view) in cases {
            assert_eq!(
                resolve_event_view(Some(&attendee(status)), event(2)),
                view,
                "{status}"
            );
        }
    }

    #[test]
    fn status_wire_format() {
        let status: AttendeeStatus = serde_json::from_str(r#""REGISTERED""#).unwrap();
        assert_eq!(status, AttendeeStatus::Registered);
        assert_eq!(AttendeeStatus::Processing.to_string(), "PROCESSING");
    }

    #[test]
    fn registry_falls_back_to_default() {
        let mut registry = ViewRegistry::new(|id| format!("generic dashboard for {id}"));
        registry.register(event(1), |_| "hackathon dashboard".to_owned());

        assert!(registry.has_custom_view(event(1)));
        assert_eq!(registry.build(event(1)), "hackathon dashboard");
        assert_eq!(
            registry.build(event(2)),
            "generic dashboard for 00000000-0000-0000-0000-000000000002"
        );
    }
}
