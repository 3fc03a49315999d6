//! Travel search over an Exa-style search API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};

use yatra_core::{Offer, SearchProvider, ServiceType};

const DEFAULT_BASE_URL: &str = "https://api.exa.ai";
const RESULT_LIMIT: usize = 5;

pub struct ExaSearchClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ExaSearchClient {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        info!("Creating ExaSearchClient");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Data-rich pages rank better when schedule/price words are in the
    /// query; plain "flights X to Y" mostly surfaces blog posts.
    fn enhance_query(service: ServiceType, query: &str) -> String {
        let lower = query.to_lowercase();
        match service {
            ServiceType::Flight | ServiceType::Transport if !lower.contains("price") => {
                format!("{query} price schedule ticket")
            }
            _ => query.to_string(),
        }
    }

    fn parse_offer(value: &serde_json::Value) -> Option<Offer> {
        let title = value["title"].as_str()?.to_string();

        let mut offer = Offer::new(title);
        offer.price = value["price"].as_f64();
        offer.price_text = value["price_text"].as_str().map(str::to_string);
        offer.departure = value["departure"].as_str().map(str::to_string);
        offer.arrival = value["arrival"].as_str().map(str::to_string);
        offer.details = value.clone();
        Some(offer)
    }
}

#[async_trait]
impl SearchProvider for ExaSearchClient {
    fn name(&self) -> &str {
        "exa"
    }

    async fn search(&self, service: ServiceType, query: &str) -> anyhow::Result<Vec<Offer>> {
        let enhanced = Self::enhance_query(service, query);
        debug!("Searching {}: {}", service, enhanced);

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "query": enhanced,
                "numResults": RESULT_LIMIT,
                "type": "auto",
                "contents": {"summary": true},
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let results = response["results"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Invalid search reply: missing results"))?;

        let offers: Vec<Offer> = results
            .iter()
            .filter_map(Self::parse_offer)
            .take(RESULT_LIMIT)
            .collect();

        debug!("Search returned {} offers", offers.len());
        Ok(offers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_enhancement_targets_schedule_pages() {
        let q = ExaSearchClient::enhance_query(ServiceType::Flight, "flights Pune to Delhi");
        assert!(q.contains("price schedule"));

        let q = ExaSearchClient::enhance_query(ServiceType::Flight, "flight price Pune Delhi");
        assert_eq!(q, "flight price Pune Delhi");

        let q = ExaSearchClient::enhance_query(ServiceType::Hotel, "hotels in Goa");
        assert_eq!(q, "hotels in Goa");
    }

    #[test]
    fn offers_parse_leniently() {
        let value = json!({
            "title": "IndiGo 6E-123",
            "price": 3500.0,
            "departure": "06:00",
        });
        let offer = ExaSearchClient::parse_offer(&value).unwrap();
        assert_eq!(offer.title, "IndiGo 6E-123");
        assert_eq!(offer.price, Some(3500.0));
        assert!(offer.price_text.is_none());

        assert!(ExaSearchClient::parse_offer(&json!({"no_title": true})).is_none());
    }
}
