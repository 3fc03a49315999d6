//! Deterministic response composition.

use yatra_core::{BookingConfirmation, Offer, SearchResult, ServiceType};

/// Merges capability outputs into one pivot-language answer.
///
/// Sections always appear in dispatch order (flight, hotel, transport,
/// attractions) with booking last, and a degraded or empty section is
/// rendered as an explicit note rather than dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseComposer;

impl ResponseComposer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn compose(
        &self,
        results: &[SearchResult],
        booking: Option<&BookingConfirmation>,
    ) -> String {
        let mut ordered: Vec<&SearchResult> = results.iter().collect();
        ordered.sort_by_key(|r| section_rank(r.service));

        let mut sections: Vec<String> = ordered.iter().map(|r| Self::section(r)).collect();

        if let Some(confirmation) = booking {
            sections.push(Self::booking_section(confirmation));
        }

        let any_offers = ordered.iter().any(|r| !r.offers.is_empty());
        if any_offers {
            sections.push(
                "Would you like more details about any of these options, or shall I book one?"
                    .to_string(),
            );
        }

        sections.join("\n\n")
    }

    fn section(result: &SearchResult) -> String {
        if result.offers.is_empty() {
            let reason = if result.degraded {
                "the provider did not respond in time"
            } else {
                "nothing matched the search"
            };
            return format!(
                "{}: no results found right now ({reason}). Please try again later.",
                result.service.section_title()
            );
        }

        let mut lines = vec![format!("{}:", result.service.section_title())];
        for (i, offer) in result.offers.iter().enumerate() {
            lines.push(Self::offer_line(i, offer));
        }
        lines.join("\n")
    }

    fn offer_line(index: usize, offer: &Offer) -> String {
        let mut line = format!("{}. {}", index + 1, offer.title);
        if let Some(price) = offer.price_label() {
            line.push_str(" - ");
            line.push_str(&price);
        }
        match (&offer.departure, &offer.arrival) {
            (Some(dep), Some(arr)) => line.push_str(&format!(" ({dep} -> {arr})")),
            (Some(dep), None) => line.push_str(&format!(" (departs {dep})")),
            _ => {}
        }
        line
    }

    fn booking_section(confirmation: &BookingConfirmation) -> String {
        format!(
            "Booking {}: {} for {}. Your reference is {}.",
            confirmation.status,
            confirmation.offer_title,
            confirmation.traveler_name,
            confirmation.confirmation_id
        )
    }
}

const fn section_rank(service: ServiceType) -> u8 {
    match service {
        ServiceType::Flight => 0,
        ServiceType::Hotel => 1,
        ServiceType::Transport => 2,
        ServiceType::Attractions => 3,
        ServiceType::Booking => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(title: &str, price: f64) -> Offer {
        let mut o = Offer::new(title);
        o.price = Some(price);
        o
    }

    #[test]
    fn sections_keep_dispatch_order_regardless_of_input_order() {
        let results = vec![
            SearchResult::found(ServiceType::Hotel, "test", vec![offer("Hotel Taj", 5000.0)]),
            SearchResult::found(
                ServiceType::Flight,
                "test",
                vec![offer("IndiGo 6E-123", 3500.0)],
            ),
        ];

        let text = ResponseComposer::new().compose(&results, None);
        let flight_at = text.find("Flight options").unwrap();
        let hotel_at = text.find("Hotel options").unwrap();
        assert!(flight_at < hotel_at);
    }

    #[test]
    fn degraded_section_is_rendered_not_dropped() {
        let results = vec![
            SearchResult::found(ServiceType::Flight, "test", vec![offer("IndiGo", 3500.0)]),
            SearchResult::unavailable(ServiceType::Hotel, "test"),
        ];

        let text = ResponseComposer::new().compose(&results, None);
        assert!(text.contains("Hotel options: no results found right now"));
        assert!(text.contains("did not respond"));
        // There are offers, so the follow-up invitation still appears.
        assert!(text.contains("Would you like more details"));
    }

    #[test]
    fn booking_section_comes_last() {
        let confirmation = BookingConfirmation {
            confirmation_id: "YT-1A2B3C4D".to_string(),
            status: "confirmed".to_string(),
            offer_title: "SpiceJet SG-456".to_string(),
            traveler_name: "John Doe".to_string(),
        };

        let text = ResponseComposer::new().compose(&[], Some(&confirmation));
        assert!(text.contains("Booking confirmed"));
        assert!(text.contains("YT-1A2B3C4D"));
    }
}
