//! Simulated booking capability.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use yatra_core::{
    BookingConfirmation, CapabilityAgent, EntitySlots, Offer, SearchResult, ServiceType,
    TravelerInfo,
};

/// Issues mock booking confirmations. No reservation leaves the system.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingAgent;

impl BookingAgent {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CapabilityAgent for BookingAgent {
    fn service(&self) -> ServiceType {
        ServiceType::Booking
    }

    fn name(&self) -> &'static str {
        "booking_agent"
    }

    async fn search(&self, _slots: &EntitySlots) -> SearchResult {
        // Booking has nothing to search; the resolver calls book().
        SearchResult::found(ServiceType::Booking, "internal", Vec::new())
    }

    async fn book(
        &self,
        selection: &Offer,
        traveler: &TravelerInfo,
    ) -> anyhow::Result<BookingConfirmation> {
        let missing = traveler.missing();
        if !missing.is_empty() {
            anyhow::bail!(
                "missing traveler details: {}",
                missing
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        let reference = Uuid::now_v7().simple().to_string();
        let confirmation_id = format!("YT-{}", &reference[..8].to_uppercase());
        let traveler_name = traveler.name.clone().unwrap_or_default();

        info!(
            "Simulated booking {} for {} ({})",
            confirmation_id, selection.title, traveler_name
        );

        Ok(BookingConfirmation {
            confirmation_id,
            status: "confirmed".to_string(),
            offer_title: selection.title.clone(),
            traveler_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn booking_requires_complete_traveler_details() {
        let agent = BookingAgent::new();
        let offer = Offer::new("SpiceJet SG-456");

        let incomplete = TravelerInfo {
            name: Some("John Doe".to_string()),
            contact: Some("9876543210".to_string()),
            email: None,
        };
        let err = agent.book(&offer, &incomplete).await.unwrap_err();
        assert!(err.to_string().contains("email"));

        let complete = TravelerInfo {
            name: Some("John Doe".to_string()),
            contact: Some("9876543210".to_string()),
            email: Some("john@example.com".to_string()),
        };
        let confirmation = agent.book(&offer, &complete).await.unwrap();
        assert_eq!(confirmation.status, "confirmed");
        assert!(confirmation.confirmation_id.starts_with("YT-"));
        assert_eq!(confirmation.offer_title, "SpiceJet SG-456");
    }
}
