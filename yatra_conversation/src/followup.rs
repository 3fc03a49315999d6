//! Follow-up handling over cached results.
//!
//! Informational follow-ups are answered by reasoning over the most
//! recent cached search results. No capability call happens on this
//! path; the cache is the only source.

use once_cell::sync::Lazy;
use regex::Regex;

use yatra_core::{Offer, SearchResult};
use yatra_language::EntityExtractor;

#[allow(clippy::unwrap_used)]
static CHEAPEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:cheapest|cheaper|lowest|least expensive|best price)\b").unwrap()
});
#[allow(clippy::unwrap_used)]
static MOST_EXPENSIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:most expensive|costliest|priciest|highest price)\b").unwrap()
});
#[allow(clippy::unwrap_used)]
static EARLIEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:earliest|soonest)\b").unwrap());
#[allow(clippy::unwrap_used)]
static COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bhow many\b").unwrap());
#[allow(clippy::unwrap_used)]
static BOOKING_VERB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:book|booking|reserve|reservation)\b").unwrap());
#[allow(clippy::unwrap_used)]
static TRAVELER_DETAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bname\b|@|\b\d{10}\b").unwrap());

/// An informational question over cached offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoQuery {
    Cheapest,
    MostExpensive,
    Earliest,
    ByIndex(usize),
    Count,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowupIntent {
    Informational(InfoQuery),
    Booking,
    Ambiguous,
}

/// Answers follow-up questions about already-returned results and
/// detects booking intent. Holds no state and performs no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowupResolver {
    extractor: EntityExtractor,
}

impl FollowupResolver {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            extractor: EntityExtractor::new(),
        }
    }

    /// Classify a pivot-language follow-up utterance.
    ///
    /// Booking triggers on an explicit booking verb, or on a selection
    /// reference accompanied by traveler-identifying details.
    #[must_use]
    pub fn classify(&self, pivot: &str) -> FollowupIntent {
        let ordinal = self.extractor.extract_ordinal(pivot);

        if BOOKING_VERB.is_match(pivot)
            || (ordinal.is_some() && TRAVELER_DETAIL.is_match(pivot))
        {
            return FollowupIntent::Booking;
        }

        if CHEAPEST.is_match(pivot) {
            return FollowupIntent::Informational(InfoQuery::Cheapest);
        }
        if MOST_EXPENSIVE.is_match(pivot) {
            return FollowupIntent::Informational(InfoQuery::MostExpensive);
        }
        if EARLIEST.is_match(pivot) {
            return FollowupIntent::Informational(InfoQuery::Earliest);
        }
        if COUNT.is_match(pivot) {
            return FollowupIntent::Informational(InfoQuery::Count);
        }
        if let Some(index) = ordinal {
            return FollowupIntent::Informational(InfoQuery::ByIndex(index));
        }

        if pivot.split_whitespace().count() < 2 {
            return FollowupIntent::Ambiguous;
        }

        FollowupIntent::Informational(InfoQuery::Summary)
    }

    /// Answer an informational query from a cached result. Pure
    /// function over the cache; offers keep their original 1-based
    /// positions so ordinal references stay stable.
    #[must_use]
    pub fn answer(&self, query: InfoQuery, cached: &SearchResult) -> String {
        if cached.offers.is_empty() {
            return format!(
                "I don't have any {} results cached for this session yet. \
                 Start a new search and I can answer questions about it.",
                cached.service
            );
        }

        match query {
            InfoQuery::Cheapest => Self::answer_by_price(cached, true),
            InfoQuery::MostExpensive => Self::answer_by_price(cached, false),
            InfoQuery::Earliest => Self::answer_earliest(cached),
            InfoQuery::ByIndex(index) => Self::answer_by_index(cached, index),
            InfoQuery::Count => format!(
                "I have {} {} options from the last search. Ask about any of them by number.",
                cached.offers.len(),
                cached.service
            ),
            InfoQuery::Summary => Self::answer_summary(cached),
        }
    }

    fn describe(index: usize, offer: &Offer) -> String {
        let mut line = format!("{}. {}", index + 1, offer.title);
        if let Some(price) = offer.price_label() {
            line.push_str(" - ");
            line.push_str(&price);
        }
        match (&offer.departure, &offer.arrival) {
            (Some(dep), Some(arr)) => {
                line.push_str(&format!(" (departs {dep}, arrives {arr})"));
            }
            (Some(dep), None) => line.push_str(&format!(" (departs {dep})")),
            _ => {}
        }
        line
    }

    fn answer_by_price(cached: &SearchResult, cheapest: bool) -> String {
        let priced = cached
            .offers
            .iter()
            .enumerate()
            .filter(|(_, o)| o.price.is_some());

        let pick = if cheapest {
            priced.min_by(|a, b| compare_price(a.1, b.1))
        } else {
            priced.max_by(|a, b| compare_price(a.1, b.1))
        };

        pick.map_or_else(
            || "None of the cached options carry a comparable price.".to_string(),
            |(i, offer)| {
                let label = if cheapest { "cheapest" } else { "most expensive" };
                format!("The {label} option is {}", Self::describe(i, offer))
            },
        )
    }

    fn answer_earliest(cached: &SearchResult) -> String {
        let pick = cached
            .offers
            .iter()
            .enumerate()
            .filter(|(_, o)| o.departure.is_some())
            .min_by(|a, b| a.1.departure.cmp(&b.1.departure));

        pick.map_or_else(
            || "The cached options don't carry departure times.".to_string(),
            |(i, offer)| format!("The earliest option is {}", Self::describe(i, offer)),
        )
    }

    fn answer_by_index(cached: &SearchResult, index: usize) -> String {
        index
            .checked_sub(1)
            .and_then(|i| cached.offers.get(i).map(|o| (i, o)))
            .map_or_else(
                || {
                    format!(
                        "There are only {} options in the last search, so option {} doesn't exist.",
                        cached.offers.len(),
                        index
                    )
                },
                |(i, offer)| format!("Here is option {}", Self::describe(i, offer)),
            )
    }

    fn answer_summary(cached: &SearchResult) -> String {
        let mut lines = vec![format!("From the last {} search:", cached.service)];
        for (i, offer) in cached.offers.iter().enumerate() {
            lines.push(Self::describe(i, offer));
        }
        lines.push("You can ask about any option by number, or book one.".to_string());
        lines.join("\n")
    }
}

fn compare_price(a: &Offer, b: &Offer) -> std::cmp::Ordering {
    let a = a.price.unwrap_or(f64::MAX);
    let b = b.price.unwrap_or(f64::MAX);
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}
