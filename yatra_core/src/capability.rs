//! Capability contracts: search offers, booking confirmations, and the
//! uniform agent interface every travel service implements.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::intent::{EntitySlots, ServiceType, SlotKey};

/// One option returned by a search capability.
///
/// Offers keep the provider's native ranking; ordinal follow-ups
/// ("the second one") index into that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl Offer {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: None,
            price_text: None,
            departure: None,
            arrival: None,
            details: serde_json::Value::Null,
        }
    }

    /// Price label for display, preferring the provider's own text.
    #[must_use]
    pub fn price_label(&self) -> Option<String> {
        self.price_text
            .clone()
            .or_else(|| self.price.map(|p| format!("₹{p:.0}")))
    }
}

/// Result of one capability search invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub service: ServiceType,
    pub provider: String,
    pub offers: Vec<Offer>,
    /// Set when the provider timed out or errored; the section is
    /// rendered as an explicit "no results" note instead of dropped.
    pub degraded: bool,
}

impl SearchResult {
    #[must_use]
    pub fn found(service: ServiceType, provider: impl Into<String>, offers: Vec<Offer>) -> Self {
        Self {
            service,
            provider: provider.into(),
            offers,
            degraded: false,
        }
    }

    /// An empty result standing in for an unreachable provider.
    #[must_use]
    pub fn unavailable(service: ServiceType, provider: impl Into<String>) -> Self {
        Self {
            service,
            provider: provider.into(),
            offers: Vec::new(),
            degraded: true,
        }
    }
}

/// Simulated booking confirmation. No real reservation is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub confirmation_id: String,
    pub status: String,
    pub offer_title: String,
    pub traveler_name: String,
}

/// Traveler details required before a booking is confirmed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravelerInfo {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}

impl TravelerInfo {
    #[must_use]
    pub fn from_slots(slots: &EntitySlots) -> Self {
        Self {
            name: slots.traveler_name.clone(),
            contact: slots.contact.clone(),
            email: slots.email.clone(),
        }
    }

    /// The identifying details still missing, in the order they are
    /// asked for.
    #[must_use]
    pub fn missing(&self) -> Vec<SlotKey> {
        let mut missing = Vec::new();
        if self.name.as_deref().is_none_or(str::is_empty) {
            missing.push(SlotKey::TravelerName);
        }
        if self.contact.as_deref().is_none_or(str::is_empty) {
            missing.push(SlotKey::Contact);
        }
        if self.email.as_deref().is_none_or(str::is_empty) {
            missing.push(SlotKey::Email);
        }
        missing
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Kind of a persisted agent output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    SearchResults,
    SynthesizedResponse,
    BookingConfirmation,
}

impl OutputKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchResults => "search_results",
            Self::SynthesizedResponse => "synthesized_response",
            Self::BookingConfirmation => "booking_confirmation",
        }
    }

    #[must_use]
    pub fn from_str_lowercase(s: &str) -> Option<Self> {
        match s {
            "search_results" => Some(Self::SearchResults),
            "synthesized_response" => Some(Self::SynthesizedResponse),
            "booking_confirmation" => Some(Self::BookingConfirmation),
            _ => None,
        }
    }
}

/// The external web-search capability behind the search agents.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Run one search and return structured offers in provider ranking
    /// order. Errors are the caller's to absorb.
    async fn search(&self, service: ServiceType, query: &str) -> anyhow::Result<Vec<Offer>>;
}

/// Uniform contract for every travel capability.
///
/// `search` never fails: provider faults and timeouts come back as a
/// degraded empty [`SearchResult`] so one broken capability cannot sink
/// a whole turn.
#[async_trait]
pub trait CapabilityAgent: Send + Sync {
    fn service(&self) -> ServiceType;

    fn name(&self) -> &'static str;

    async fn search(&self, slots: &EntitySlots) -> SearchResult;

    async fn book(
        &self,
        selection: &Offer,
        traveler: &TravelerInfo,
    ) -> anyhow::Result<BookingConfirmation> {
        let _ = (selection, traveler);
        anyhow::bail!("{} does not handle bookings", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traveler_info_reports_missing_in_ask_order() {
        let info = TravelerInfo {
            name: Some("Asha Rao".to_string()),
            contact: None,
            email: None,
        };
        assert_eq!(info.missing(), vec![SlotKey::Contact, SlotKey::Email]);
        assert!(!info.is_complete());
    }

    #[test]
    fn price_label_prefers_provider_text() {
        let mut offer = Offer::new("IndiGo 6E-123");
        offer.price = Some(3500.0);
        offer.price_text = Some("₹3,500".to_string());
        assert_eq!(offer.price_label().as_deref(), Some("₹3,500"));

        offer.price_text = None;
        assert_eq!(offer.price_label().as_deref(), Some("₹3500"));
    }
}
