//! Readiness checking and clarification selection.

use tracing::debug;

use yatra_core::{EntitySlots, ServiceType, SlotKey};

/// What the engine should do with the current intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// A required slot is missing; ask for it and stay collecting.
    Clarify { slot: SlotKey, question: String },
    /// Every required slot is filled; dispatch these services.
    Dispatch { services: Vec<ServiceType> },
    /// Nothing travel-shaped to work with.
    Redirect,
}

/// Decides, per turn, whether the merged slot record is sufficient for
/// the intended services.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotRouter;

impl SlotRouter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Route the current intent.
    ///
    /// When several services are implied, checklists are evaluated in
    /// dispatch order and only the first missing slot is asked for, so
    /// the user answers one question per turn.
    #[must_use]
    pub fn route(&self, slots: &EntitySlots) -> RouteDecision {
        let services: Vec<ServiceType> = slots
            .services
            .iter()
            .copied()
            .filter(|s| *s != ServiceType::Booking)
            .collect();

        if services.is_empty() {
            return RouteDecision::Redirect;
        }

        for service in &services {
            if let Some(slot) = slots.first_missing(*service) {
                debug!("Intent incomplete for {service}: missing {}", slot.as_str());
                return RouteDecision::Clarify {
                    slot,
                    question: Self::clarification_question(slot),
                };
            }
        }

        debug!("Intent ready, dispatching {} services", services.len());
        RouteDecision::Dispatch { services }
    }

    fn clarification_question(slot: SlotKey) -> String {
        format!("Could you tell me {}?", slot.ask_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_date_is_asked_before_travelers() {
        let slots = EntitySlots {
            services: vec![ServiceType::Flight],
            origin: Some("Pune".to_string()),
            destination: Some("Delhi".to_string()),
            ..EntitySlots::default()
        };

        match SlotRouter::new().route(&slots) {
            RouteDecision::Clarify { slot, question } => {
                assert_eq!(slot, SlotKey::Date);
                assert!(question.contains("travel date"));
            }
            other => panic!("expected clarification, got {other:?}"),
        }
    }

    #[test]
    fn complete_flight_intent_dispatches() {
        let slots = EntitySlots {
            services: vec![ServiceType::Flight],
            origin: Some("Pune".to_string()),
            destination: Some("Delhi".to_string()),
            date: Some("2025-12-10".to_string()),
            travelers: Some(1),
            ..EntitySlots::default()
        };

        assert_eq!(
            SlotRouter::new().route(&slots),
            RouteDecision::Dispatch {
                services: vec![ServiceType::Flight]
            }
        );
    }

    #[test]
    fn multi_service_intent_checks_every_checklist() {
        // Flight needs origin; hotel does not. The flight checklist is
        // evaluated first and blocks dispatch.
        let slots = EntitySlots {
            services: vec![ServiceType::Flight, ServiceType::Hotel],
            destination: Some("Goa".to_string()),
            date: Some("tomorrow".to_string()),
            travelers: Some(2),
            ..EntitySlots::default()
        };

        match SlotRouter::new().route(&slots) {
            RouteDecision::Clarify { slot, .. } => assert_eq!(slot, SlotKey::Origin),
            other => panic!("expected clarification, got {other:?}"),
        }
    }

    #[test]
    fn attractions_need_only_destination() {
        let slots = EntitySlots {
            services: vec![ServiceType::Attractions],
            destination: Some("Jaipur".to_string()),
            ..EntitySlots::default()
        };

        assert!(matches!(
            SlotRouter::new().route(&slots),
            RouteDecision::Dispatch { .. }
        ));
    }

    #[test]
    fn no_services_redirects() {
        assert_eq!(
            SlotRouter::new().route(&EntitySlots::default()),
            RouteDecision::Redirect
        );
    }
}
