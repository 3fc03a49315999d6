//! Search-backed capability agents.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use yatra_core::{CapabilityAgent, EntitySlots, SearchProvider, SearchResult, ServiceType};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// A travel-service agent wrapping one external search call.
///
/// Provider errors and timeouts degrade to an empty, flagged result:
/// the turn always proceeds to composition.
pub struct SearchAgent {
    service: ServiceType,
    provider: Arc<dyn SearchProvider>,
    timeout: Duration,
}

impl SearchAgent {
    #[must_use]
    pub fn new(service: ServiceType, provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            service,
            provider,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn slot(value: Option<&String>) -> &str {
        value.map_or("", String::as_str)
    }

    /// Build the provider query from filled slots, per service.
    #[must_use]
    pub fn build_query(&self, slots: &EntitySlots) -> String {
        let travelers = slots.travelers.unwrap_or(1);
        let mut query = match self.service {
            ServiceType::Flight => format!(
                "flights from {} to {} on {} for {} travelers",
                Self::slot(slots.origin.as_ref()),
                Self::slot(slots.destination.as_ref()),
                Self::slot(slots.date.as_ref()),
                travelers,
            ),
            ServiceType::Transport => format!(
                "trains and buses from {} to {} on {}",
                Self::slot(slots.origin.as_ref()),
                Self::slot(slots.destination.as_ref()),
                Self::slot(slots.date.as_ref()),
            ),
            ServiceType::Hotel => format!(
                "hotels in {} check-in {} for {} guests",
                Self::slot(slots.destination.as_ref()),
                Self::slot(slots.date.as_ref()),
                travelers,
            ),
            ServiceType::Attractions | ServiceType::Booking => format!(
                "top attractions and places to visit in {}",
                Self::slot(slots.destination.as_ref()),
            ),
        };

        if let Some(budget) = &slots.budget {
            query.push_str(" under ");
            query.push_str(budget);
        }

        query
    }
}

#[async_trait]
impl CapabilityAgent for SearchAgent {
    fn service(&self) -> ServiceType {
        self.service
    }

    fn name(&self) -> &'static str {
        match self.service {
            ServiceType::Flight => "flight_agent",
            ServiceType::Hotel => "hotel_agent",
            ServiceType::Transport => "transport_agent",
            ServiceType::Attractions => "attractions_agent",
            ServiceType::Booking => "booking_agent",
        }
    }

    async fn search(&self, slots: &EntitySlots) -> SearchResult {
        let query = self.build_query(slots);
        debug!("{} searching: {}", self.name(), query);

        let call = self.provider.search(self.service, &query);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(offers)) => SearchResult::found(self.service, self.provider.name(), offers),
            Ok(Err(e)) => {
                warn!("{} provider error: {e}", self.name());
                SearchResult::unavailable(self.service, self.provider.name())
            }
            Err(_) => {
                warn!("{} timed out after {:?}", self.name(), self.timeout);
                SearchResult::unavailable(self.service, self.provider.name())
            }
        }
    }
}
