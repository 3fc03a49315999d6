//! Regex-based entity extraction over pivot text.
//!
//! The extractor is deliberately deterministic: the same pivot text
//! always yields the same partial intent, so routing decisions and
//! clarification questions are reproducible.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use yatra_core::{EntitySlots, ServiceType};

macro_rules! pattern {
    ($name:ident, $re:literal) => {
        #[allow(clippy::unwrap_used)]
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).unwrap());
    };
}

pattern!(FLIGHT, r"(?i)\b(?:flights?|fly|flying|airfare|airlines?|plane)\b");
pattern!(HOTEL, r"(?i)\b(?:hotels?|accommodation|resorts?|rooms?|homestays?)\b");
pattern!(TRANSPORT, r"(?i)\b(?:trains?|bus|buses)\b");
pattern!(
    ATTRACTIONS,
    r"(?i)\b(?:attractions?|sightseeing|places to (?:visit|see)|things to do|landmarks?|restaurants?)\b"
);
pattern!(BOOKING, r"(?i)\b(?:book|booking|reserve|reservation)\b");

pattern!(
    FROM_TO,
    r"\b(?i:from)\s+([A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*)\s+(?i:to)\s+([A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*)"
);
pattern!(
    X_TO_Y,
    r"\b([A-Z][A-Za-z]+)\s+(?i:to)\s+([A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*)"
);
pattern!(TO_DEST, r"\b(?i:to)\s+([A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*)");
pattern!(IN_DEST, r"\b(?i:in|at|near)\s+([A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*)");

pattern!(DATE_ISO, r"\b(\d{4}-\d{2}-\d{2})\b");
pattern!(DATE_SLASH, r"\b(\d{1,2}/\d{1,2}/\d{2,4})\b");
pattern!(
    DATE_DAY_MONTH,
    r"(?i)\b(\d{1,2}(?:st|nd|rd|th)?\s+(?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\.?(?:,?\s+\d{4})?)\b"
);
pattern!(
    DATE_MONTH_DAY,
    r"(?i)\b((?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:\s*-\s*\d{1,2}(?:st|nd|rd|th)?)?(?:,?\s+\d{4})?)\b"
);
pattern!(
    DATE_RELATIVE,
    r"(?i)\b(day after tomorrow|tomorrow|today|tonight|next week|next month|this weekend)\b"
);

pattern!(
    TRAVELERS_NOUN,
    r"(?i)\b(\d{1,2})\s+(?:people|persons?|travell?ers?|passengers?|adults?|guests?|pax)\b"
);
pattern!(TRAVELERS_FOR, r"(?i)\bfor\s+(\d{1,2})(?:\s+([a-z]+))?");

pattern!(
    BUDGET,
    r"(?i)\b(?:under|below|within|budget(?:\s+of)?|max(?:imum)?)\s*(?:rs\.?|inr|₹|\$|€)?\s*([\d,]+)\b"
);

pattern!(
    ORDINAL_WORD,
    r"(?i)\b(first|second|third|fourth|fifth|1st|2nd|3rd|4th|5th)\b"
);
pattern!(OPTION_N, r"(?i)\b(?:option|number|no\.?)\s*(\d{1,2})\b");

pattern!(
    NAME,
    r"(?i)\bname\s*(?:is|[:\-])?\s*([A-Za-z][A-Za-z .]*[A-Za-z])"
);
pattern!(EMAIL, r"([A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,})");
pattern!(
    CONTACT,
    r"(?i)\b(?:contact|phone|mobile|tel|call)\s*(?:no\.?|number)?\s*(?:is|[:\-])?\s*(\+?\d[\d\s\-]{7,13}\d)"
);
pattern!(BARE_PHONE, r"\b(\d{10})\b");

/// Words a place capture can never be: months, relative dates, and the
/// capitalized pronoun all satisfy the place regexes otherwise.
const PLACE_BLOCKLIST: &[&str] = &[
    "i", "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep",
    "sept", "oct", "nov", "dec", "tomorrow", "today", "tonight", "monday", "tuesday", "wednesday",
    "thursday", "friday", "saturday", "sunday",
];

fn clean_place(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let first_word = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if PLACE_BLOCKLIST.contains(&first_word.as_str()) {
        return None;
    }
    Some(trimmed.to_string())
}

/// What the extractor found in one pivot utterance.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Services the utterance implies, in dispatch order.
    pub services: Vec<ServiceType>,
    /// Slots extracted from this utterance only (to be merged).
    pub slots: EntitySlots,
    /// Whether the utterance looks travel-related at all.
    pub is_travel_related: bool,
}

/// Parses pivot-language utterances into a partial travel intent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn extract(&self, text: &str) -> Extraction {
        let services = Self::detect_services(text);

        // Booking is a follow-up concern; only searchable services
        // become part of the persisted intent.
        let mut slots = EntitySlots {
            services: services
                .iter()
                .copied()
                .filter(|s| *s != ServiceType::Booking)
                .collect(),
            ..EntitySlots::default()
        };

        Self::extract_route(text, &mut slots);
        slots.date = Self::extract_date(text);
        slots.travelers = Self::extract_travelers(text);
        slots.budget = BUDGET
            .captures(text)
            .map(|c| c[1].trim().to_string());

        slots.selected_option = self.extract_ordinal(text);
        slots.traveler_name = NAME.captures(text).map(|c| c[1].trim().to_string());
        slots.email = EMAIL.captures(text).map(|c| c[1].to_string());
        slots.contact = CONTACT
            .captures(text)
            .map(|c| c[1].trim().to_string())
            .or_else(|| BARE_PHONE.captures(text).map(|c| c[1].to_string()));

        let is_travel_related = !services.is_empty()
            || slots.origin.is_some()
            || slots.destination.is_some();

        debug!(
            "Extracted services={:?} travel_related={}",
            services, is_travel_related
        );

        Extraction {
            services,
            slots,
            is_travel_related,
        }
    }

    /// A 1-based selection reference ("second one", "option 3").
    #[must_use]
    pub fn extract_ordinal(&self, text: &str) -> Option<usize> {
        if let Some(caps) = OPTION_N.captures(text) {
            return caps[1].parse().ok();
        }
        ORDINAL_WORD.captures(text).map(|caps| {
            match caps[1].to_lowercase().as_str() {
                "first" | "1st" => 1,
                "second" | "2nd" => 2,
                "third" | "3rd" => 3,
                "fourth" | "4th" => 4,
                _ => 5,
            }
        })
    }

    fn detect_services(text: &str) -> Vec<ServiceType> {
        let mut services = Vec::new();
        for service in ServiceType::DISPATCH_ORDER {
            let matched = match service {
                ServiceType::Flight => FLIGHT.is_match(text),
                ServiceType::Hotel => HOTEL.is_match(text),
                ServiceType::Transport => TRANSPORT.is_match(text),
                ServiceType::Attractions => ATTRACTIONS.is_match(text),
                ServiceType::Booking => false,
            };
            if matched {
                services.push(service);
            }
        }
        if BOOKING.is_match(text) {
            services.push(ServiceType::Booking);
        }
        services
    }

    fn extract_route(text: &str, slots: &mut EntitySlots) {
        if let Some(caps) = FROM_TO.captures(text) {
            slots.origin = clean_place(&caps[1]);
            slots.destination = clean_place(&caps[2]);
        } else if let Some(caps) = X_TO_Y.captures(text) {
            slots.origin = clean_place(&caps[1]);
            slots.destination = clean_place(&caps[2]);
        } else if let Some(caps) = TO_DEST.captures(text) {
            slots.destination = clean_place(&caps[1]);
        }

        if slots.destination.is_none() {
            if let Some(caps) = IN_DEST.captures(text) {
                slots.destination = clean_place(&caps[1]);
            }
        }
    }

    fn extract_date(text: &str) -> Option<String> {
        for re in [
            &*DATE_ISO,
            &*DATE_SLASH,
            &*DATE_DAY_MONTH,
            &*DATE_MONTH_DAY,
            &*DATE_RELATIVE,
        ] {
            if let Some(caps) = re.captures(text) {
                return Some(caps[1].trim().to_string());
            }
        }
        None
    }

    fn extract_travelers(text: &str) -> Option<u32> {
        if let Some(caps) = TRAVELERS_NOUN.captures(text) {
            return caps[1].parse().ok();
        }
        if let Some(caps) = TRAVELERS_FOR.captures(text) {
            let unit = caps.get(2).map(|m| m.as_str().to_lowercase());
            let is_duration = unit.as_deref().is_some_and(|u| {
                matches!(u, "night" | "nights" | "day" | "days" | "week" | "weeks")
            });
            if !is_duration {
                return caps[1].parse().ok();
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Extraction {
        EntityExtractor::new().extract(text)
    }

    #[test]
    fn flight_query_with_route_only() {
        let out = extract("flight Pune to Delhi");

        assert_eq!(out.services, vec![ServiceType::Flight]);
        assert!(out.is_travel_related);
        assert_eq!(out.slots.origin.as_deref(), Some("Pune"));
        assert_eq!(out.slots.destination.as_deref(), Some("Delhi"));
        assert!(out.slots.date.is_none());
        assert!(out.slots.travelers.is_none());
    }

    #[test]
    fn full_flight_query() {
        let out = extract("I need a flight from Mumbai to New Delhi on 2025-12-10 for 2 people");

        assert_eq!(out.slots.origin.as_deref(), Some("Mumbai"));
        assert_eq!(out.slots.destination.as_deref(), Some("New Delhi"));
        assert_eq!(out.slots.date.as_deref(), Some("2025-12-10"));
        assert_eq!(out.slots.travelers, Some(2));
    }

    #[test]
    fn hotel_query_with_destination_and_dates() {
        let out = extract("I need a hotel in Goa for 3 guests from Dec 25 - 27");

        assert_eq!(out.services, vec![ServiceType::Hotel]);
        assert_eq!(out.slots.destination.as_deref(), Some("Goa"));
        assert_eq!(out.slots.travelers, Some(3));
        assert!(out.slots.date.is_some());
    }

    #[test]
    fn transport_query() {
        let out = extract("Trains from Pune to Chennai on 10 Dec");

        assert_eq!(out.services, vec![ServiceType::Transport]);
        assert_eq!(out.slots.origin.as_deref(), Some("Pune"));
        assert_eq!(out.slots.destination.as_deref(), Some("Chennai"));
        assert_eq!(out.slots.date.as_deref(), Some("10 Dec"));
    }

    #[test]
    fn multi_service_query_keeps_dispatch_order() {
        let out = extract("hotels and flights in Jaipur tomorrow");

        assert_eq!(out.services, vec![ServiceType::Flight, ServiceType::Hotel]);
        assert_eq!(out.slots.destination.as_deref(), Some("Jaipur"));
        assert_eq!(out.slots.date.as_deref(), Some("tomorrow"));
    }

    #[test]
    fn for_n_nights_is_not_a_traveler_count() {
        let out = extract("hotel in Goa for 2 nights");
        assert!(out.slots.travelers.is_none());

        let out = extract("hotel in Goa for 2");
        assert_eq!(out.slots.travelers, Some(2));
    }

    #[test]
    fn months_are_not_places() {
        let out = extract("attractions in December");
        assert!(out.slots.destination.is_none());
    }

    #[test]
    fn booking_details_are_extracted() {
        let out = extract(
            "Book the third one - Name: John Doe, Contact: 9876543210, Email: john@example.com",
        );

        assert!(out.services.contains(&ServiceType::Booking));
        assert_eq!(out.slots.selected_option, Some(3));
        assert_eq!(out.slots.traveler_name.as_deref(), Some("John Doe"));
        assert_eq!(out.slots.contact.as_deref(), Some("9876543210"));
        assert_eq!(out.slots.email.as_deref(), Some("john@example.com"));
    }

    #[test]
    fn ordinals_and_option_numbers() {
        let extractor = EntityExtractor::new();
        assert_eq!(extractor.extract_ordinal("show me the second one"), Some(2));
        assert_eq!(extractor.extract_ordinal("details of option 4"), Some(4));
        assert_eq!(extractor.extract_ordinal("which is cheapest"), None);
    }

    #[test]
    fn small_talk_is_not_travel() {
        let out = extract("hello, how are you doing?");
        assert!(!out.is_travel_related);
        assert!(out.services.is_empty());
    }

    #[test]
    fn budget_extraction() {
        let out = extract("flights from Pune to Delhi under ₹5000");
        assert_eq!(out.slots.budget.as_deref(), Some("5000"));
    }
}
