use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;

/// Furthest milestone an inquiry reached, in funnel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    NoReply,
    Replied,
    Accepted,
    Booked,
}

impl FunnelStage {
    pub const fn ordered() -> [Self; 4] {
        [Self::NoReply, Self::Replied, Self::Accepted, Self::Booked]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NoReply => "no_reply",
            Self::Replied => "replied",
            Self::Accepted => "accepted",
            Self::Booked => "booked",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::NoReply => 0,
            Self::Replied => 1,
            Self::Accepted => 2,
            Self::Booked => 3,
        }
    }

    /// Stage precedence over the three milestone timestamps, first match
    /// wins. Intermediate gaps are allowed: a booking without a recorded
    /// reply is still `Booked`.
    pub fn from_milestones(
        replied_at: Option<NaiveDateTime>,
        accepted_at: Option<NaiveDateTime>,
        booked_at: Option<NaiveDateTime>,
    ) -> Self {
        if booked_at.is_some() {
            Self::Booked
        } else if accepted_at.is_some() {
            Self::Accepted
        } else if replied_at.is_some() {
            Self::Replied
        } else {
            Self::NoReply
        }
    }
}

/// Mechanism by which the guest initiated contact. Values outside the three
/// known channels are carried through as their own group rather than
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactChannel {
    ContactMe,
    BookIt,
    InstantBook,
    Other(String),
}

impl ContactChannel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "contact_me" => Self::ContactMe,
            "book_it" => Self::BookIt,
            "instant_book" => Self::InstantBook,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::ContactMe => "contact_me",
            Self::BookIt => "book_it",
            Self::InstantBook => "instant_book",
            Self::Other(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GuestUserStage {
    New,
    PastBooker,
    Other(String),
}

impl GuestUserStage {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => Self::New,
            "past booker" | "past_booker" => Self::PastBooker,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::New => "new",
            Self::PastBooker => "past booker",
            Self::Other(value) => value,
        }
    }
}

/// A guest's contact event toward a listing, enriched with the derived
/// booking flag, durations, and funnel stage. Derived fields are computed
/// once at construction and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Inquiry {
    pub listing_id: String,
    pub channel: ContactChannel,
    pub guest_stage: GuestUserStage,
    pub interaction_at: NaiveDateTime,
    pub replied_at: Option<NaiveDateTime>,
    pub accepted_at: Option<NaiveDateTime>,
    pub booked_at: Option<NaiveDateTime>,
    pub checkin_on: Option<NaiveDate>,
    pub checkout_on: Option<NaiveDate>,
    pub booking_happened: bool,
    pub response_time: Option<Duration>,
    pub accept_time: Option<Duration>,
    pub response_time_hours: Option<f64>,
    pub accept_time_hours: Option<f64>,
    pub funnel_stage: FunnelStage,
}

impl Inquiry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        listing_id: String,
        channel: ContactChannel,
        guest_stage: GuestUserStage,
        interaction_at: NaiveDateTime,
        replied_at: Option<NaiveDateTime>,
        accepted_at: Option<NaiveDateTime>,
        booked_at: Option<NaiveDateTime>,
        checkin_on: Option<NaiveDate>,
        checkout_on: Option<NaiveDate>,
    ) -> Self {
        let response_time = replied_at.map(|replied| replied - interaction_at);
        let accept_time = accepted_at.map(|accepted| accepted - interaction_at);
        let funnel_stage = FunnelStage::from_milestones(replied_at, accepted_at, booked_at);

        Self {
            listing_id,
            channel,
            guest_stage,
            interaction_at,
            replied_at,
            accepted_at,
            booked_at,
            checkin_on,
            checkout_on,
            booking_happened: booked_at.is_some(),
            response_time,
            accept_time,
            response_time_hours: response_time.map(duration_hours),
            accept_time_hours: accept_time.map(duration_hours),
            funnel_stage,
        }
    }
}

fn duration_hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / 3600.0
}

/// The three room types retained after listing cleanup. Anything else is
/// dropped from the directory entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    EntireHome,
    PrivateRoom,
    SharedRoom,
}

impl RoomType {
    /// Maps a raw room-type cell to a known variant. Matching is performed
    /// on the trimmed, lowercased value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "entire home" => Some(Self::EntireHome),
            "private room" => Some(Self::PrivateRoom),
            "shared room" => Some(Self::SharedRoom),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EntireHome => "entire home",
            Self::PrivateRoom => "private room",
            Self::SharedRoom => "shared room",
        }
    }
}

/// A cleaned listing row. `neighborhood` stays optional: some listings carry
/// no neighborhood in the export.
#[derive(Debug, Clone)]
pub struct Listing {
    pub id: String,
    pub room_type: RoomType,
    pub neighborhood: Option<String>,
    pub total_reviews: u32,
}

/// Lookup table from listing identifier to its cleaned attributes, used for
/// the left join in the segment analyses. Many inquiries map to one listing;
/// an absent identifier means the inquiry falls into the unknown segment.
#[derive(Debug, Default)]
pub struct ListingDirectory {
    by_id: HashMap<String, Listing>,
}

impl ListingDirectory {
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let by_id = listings
            .into_iter()
            .map(|listing| (listing.id.clone(), listing))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, listing_id: &str) -> Option<&Listing> {
        self.by_id.get(listing_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// A cleaned user row. A missing profile word count is treated as zero.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user_id: String,
    pub words_in_profile: u32,
    pub has_profile: bool,
}

impl UserProfile {
    pub fn new(user_id: String, words_in_profile: u32) -> Self {
        Self {
            user_id,
            words_in_profile,
            has_profile: words_in_profile > 0,
        }
    }
}
