use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use yatra_core::{CapabilityAgent, SearchProvider, ServiceType};

use crate::booking::BookingAgent;
use crate::search_agent::SearchAgent;

/// Static mapping from service type to its capability agent.
///
/// Agents are registered once at startup; there is no dynamic
/// discovery.
pub struct AgentRegistry {
    agents: HashMap<ServiceType, Arc<dyn CapabilityAgent>>,
}

impl AgentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Registry with the four search agents on one shared provider,
    /// plus the booking agent.
    #[must_use]
    pub fn with_defaults(provider: Arc<dyn SearchProvider>, timeout: Duration) -> Self {
        let mut registry = Self::new();
        for service in ServiceType::DISPATCH_ORDER {
            registry.register(Arc::new(
                SearchAgent::new(service, Arc::clone(&provider)).with_timeout(timeout),
            ));
        }
        registry.register(Arc::new(BookingAgent::new()));
        registry
    }

    pub fn register(&mut self, agent: Arc<dyn CapabilityAgent>) {
        info!("Registering capability agent: {}", agent.name());
        self.agents.insert(agent.service(), agent);
    }

    #[must_use]
    pub fn get(&self, service: ServiceType) -> Option<&Arc<dyn CapabilityAgent>> {
        self.agents.get(&service)
    }

    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.agents.values().map(|a| a.name()).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use yatra_core::Offer;

    struct NullProvider;

    #[async_trait]
    impl SearchProvider for NullProvider {
        fn name(&self) -> &str {
            "null"
        }

        async fn search(&self, _: ServiceType, _: &str) -> anyhow::Result<Vec<Offer>> {
            Ok(vec![])
        }
    }

    #[test]
    fn default_registry_covers_every_service() {
        let registry =
            AgentRegistry::with_defaults(Arc::new(NullProvider), Duration::from_secs(1));

        for service in ServiceType::DISPATCH_ORDER {
            assert!(registry.get(service).is_some(), "missing {service}");
        }
        assert!(registry.get(ServiceType::Booking).is_some());
        assert_eq!(registry.list().len(), 5);
    }
}
