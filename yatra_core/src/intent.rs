//! Travel intent: service types and the entity slot record.
//!
//! A slot record accumulates across turns. Merging never lets an empty
//! extraction erase a previously filled slot, and switching to a new
//! service type drops only the slots the new service cannot use.

use serde::{Deserialize, Serialize};

/// The travel services a query can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Flight,
    Hotel,
    Transport,
    Attractions,
    Booking,
}

impl ServiceType {
    /// Search services in their fixed dispatch (and synthesis) order.
    pub const DISPATCH_ORDER: [Self; 4] = [Self::Flight, Self::Hotel, Self::Transport, Self::Attractions];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Hotel => "hotel",
            Self::Transport => "transport",
            Self::Attractions => "attractions",
            Self::Booking => "booking",
        }
    }

    #[must_use]
    pub fn from_str_lowercase(s: &str) -> Option<Self> {
        match s {
            "flight" => Some(Self::Flight),
            "hotel" => Some(Self::Hotel),
            "train" | "bus" | "transport" => Some(Self::Transport),
            "attractions" => Some(Self::Attractions),
            "booking" => Some(Self::Booking),
            _ => None,
        }
    }

    /// Slots that must be filled before this service can be dispatched,
    /// in the order clarification questions are asked.
    #[must_use]
    pub const fn required_slots(self) -> &'static [SlotKey] {
        match self {
            Self::Flight | Self::Transport => &[
                SlotKey::Origin,
                SlotKey::Destination,
                SlotKey::Date,
                SlotKey::Travelers,
            ],
            Self::Hotel => &[SlotKey::Destination, SlotKey::Date, SlotKey::Travelers],
            Self::Attractions => &[SlotKey::Destination],
            Self::Booking => &[
                SlotKey::SelectedOption,
                SlotKey::TravelerName,
                SlotKey::Contact,
                SlotKey::Email,
            ],
        }
    }

    /// Whether a slot is meaningful for this service at all. Used to
    /// decide what survives a change of service type mid-session.
    #[must_use]
    pub fn uses_slot(self, key: SlotKey) -> bool {
        match key {
            SlotKey::Destination | SlotKey::Date | SlotKey::Travelers | SlotKey::Budget => true,
            SlotKey::Origin => matches!(self, Self::Flight | Self::Transport),
            SlotKey::SelectedOption | SlotKey::TravelerName | SlotKey::Contact | SlotKey::Email => {
                matches!(self, Self::Booking)
            }
        }
    }

    /// Section heading used when composing the final answer.
    #[must_use]
    pub const fn section_title(self) -> &'static str {
        match self {
            Self::Flight => "Flight options",
            Self::Hotel => "Hotel options",
            Self::Transport => "Train and bus options",
            Self::Attractions => "Places to visit",
            Self::Booking => "Booking",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named fields of the travel intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKey {
    Origin,
    Destination,
    Date,
    Travelers,
    Budget,
    SelectedOption,
    TravelerName,
    Contact,
    Email,
}

impl SlotKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
            Self::Date => "date",
            Self::Travelers => "travelers",
            Self::Budget => "budget",
            Self::SelectedOption => "selected_option",
            Self::TravelerName => "traveler_name",
            Self::Contact => "contact",
            Self::Email => "email",
        }
    }

    /// Phrase inserted into a clarification question for this slot.
    #[must_use]
    pub const fn ask_phrase(self) -> &'static str {
        match self {
            Self::Origin => "where you are travelling from",
            Self::Destination => "where you are travelling to",
            Self::Date => "your travel date",
            Self::Travelers => "how many people are travelling",
            Self::Budget => "your budget",
            Self::SelectedOption => "which option you would like to book",
            Self::TravelerName => "the traveler's full name",
            Self::Contact => "a contact number",
            Self::Email => "an email address",
        }
    }
}

/// The current (partial) travel intent held by a session.
///
/// All fields are optional; an absent field means the slot has not been
/// filled yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySlots {
    /// Services the current intent targets, in dispatch order. Remembered
    /// across clarification turns so "tomorrow" alone can complete a
    /// flight query from two turns ago.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travelers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traveler_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn merge_text(target: &mut Option<String>, incoming: &Option<String>) {
    if filled(incoming) {
        target.clone_from(incoming);
    }
}

impl EntitySlots {
    /// Merge a newly extracted partial record into this one.
    ///
    /// A filled slot is only replaced by a new non-empty value; empty or
    /// absent extractions leave it untouched.
    pub fn merge(&mut self, incoming: &Self) {
        if !incoming.services.is_empty() {
            self.services.clone_from(&incoming.services);
        }
        merge_text(&mut self.origin, &incoming.origin);
        merge_text(&mut self.destination, &incoming.destination);
        merge_text(&mut self.date, &incoming.date);
        merge_text(&mut self.budget, &incoming.budget);
        merge_text(&mut self.traveler_name, &incoming.traveler_name);
        merge_text(&mut self.contact, &incoming.contact);
        merge_text(&mut self.email, &incoming.email);
        if incoming.travelers.is_some() {
            self.travelers = incoming.travelers;
        }
        if incoming.selected_option.is_some() {
            self.selected_option = incoming.selected_option;
        }
    }

    #[must_use]
    pub fn is_filled(&self, key: SlotKey) -> bool {
        match key {
            SlotKey::Origin => filled(&self.origin),
            SlotKey::Destination => filled(&self.destination),
            SlotKey::Date => filled(&self.date),
            SlotKey::Travelers => self.travelers.is_some(),
            SlotKey::Budget => filled(&self.budget),
            SlotKey::SelectedOption => self.selected_option.is_some(),
            SlotKey::TravelerName => filled(&self.traveler_name),
            SlotKey::Contact => filled(&self.contact),
            SlotKey::Email => filled(&self.email),
        }
    }

    /// First unfilled required slot for a service, in checklist order.
    #[must_use]
    pub fn first_missing(&self, service: ServiceType) -> Option<SlotKey> {
        service
            .required_slots()
            .iter()
            .copied()
            .find(|key| !self.is_filled(*key))
    }

    /// Slots that survive a switch to a different set of services.
    ///
    /// Universal slots (destination, date, travelers, budget) carry
    /// over; service-specific slots are dropped when no new service has
    /// a use for them, and booking slots never carry over.
    #[must_use]
    pub fn retained_for(&self, services: &[ServiceType]) -> Self {
        let keeps_origin = services.iter().any(|s| s.uses_slot(SlotKey::Origin));
        Self {
            services: services.to_vec(),
            origin: if keeps_origin { self.origin.clone() } else { None },
            destination: self.destination.clone(),
            date: self.date.clone(),
            travelers: self.travelers,
            budget: self.budget.clone(),
            selected_option: None,
            traveler_name: None,
            contact: None,
            email: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
