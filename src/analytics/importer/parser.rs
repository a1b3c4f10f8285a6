use crate::analytics::domain::{
    ContactChannel, GuestUserStage, Inquiry, Listing, RoomType, UserProfile,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

/// Parses the contacts export into enriched inquiries. Rows without a
/// parsable interaction timestamp carry no usable milestone anchor and are
/// skipped with a warning.
pub(crate) fn parse_contacts<R: Read>(reader: R) -> Result<Vec<Inquiry>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut inquiries = Vec::new();

    for record in csv_reader.deserialize::<ContactRow>() {
        let row = record?;
        let Some(interaction_at) = row.interaction_at.as_deref().and_then(parse_datetime) else {
            warn!(
                listing_id = %row.listing_id,
                "skipping inquiry without a parsable interaction timestamp"
            );
            continue;
        };

        inquiries.push(Inquiry::new(
            row.listing_id,
            ContactChannel::parse(&row.channel),
            GuestUserStage::parse(&row.guest_stage),
            interaction_at,
            row.replied_at.as_deref().and_then(parse_datetime),
            row.accepted_at.as_deref().and_then(parse_datetime),
            row.booked_at.as_deref().and_then(parse_datetime),
            row.checkin_on.as_deref().and_then(parse_date),
            row.checkout_on.as_deref().and_then(parse_date),
        ));
    }

    Ok(inquiries)
}

/// Parses the listings export. Rows whose normalized room type falls
/// outside the three retained values are filtered out, not errored.
pub(crate) fn parse_listings<R: Read>(reader: R) -> Result<Vec<Listing>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut listings = Vec::new();

    for record in csv_reader.deserialize::<ListingRow>() {
        let row = record?;
        let Some(room_type) = row.room_type.as_deref().and_then(RoomType::parse) else {
            continue;
        };

        listings.push(Listing {
            id: row.id,
            room_type,
            neighborhood: row.neighborhood,
            total_reviews: coerce_count(row.total_reviews.as_deref()),
        });
    }

    Ok(listings)
}

/// Parses the users export. A missing profile word count is zero.
pub(crate) fn parse_users<R: Read>(reader: R) -> Result<Vec<UserProfile>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut users = Vec::new();

    for record in csv_reader.deserialize::<UserRow>() {
        let row = record?;
        users.push(UserProfile::new(
            row.id,
            coerce_count(row.words_in_profile.as_deref()),
        ));
    }

    Ok(users)
}

#[derive(Debug, Deserialize)]
struct ContactRow {
    #[serde(rename = "id_listing_anon")]
    listing_id: String,
    #[serde(rename = "ts_interaction_first", deserialize_with = "empty_string_as_none")]
    interaction_at: Option<String>,
    #[serde(
        rename = "ts_reply_at_first",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    replied_at: Option<String>,
    #[serde(
        rename = "ts_accepted_at_first",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    accepted_at: Option<String>,
    #[serde(
        rename = "ts_booking_at",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    booked_at: Option<String>,
    #[serde(
        rename = "ds_checkin_first",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    checkin_on: Option<String>,
    #[serde(
        rename = "ds_checkout_first",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    checkout_on: Option<String>,
    #[serde(rename = "contact_channel_first")]
    channel: String,
    #[serde(rename = "guest_user_stage_first")]
    guest_stage: String,
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(rename = "id_listing_anon")]
    id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    room_type: Option<String>,
    #[serde(
        rename = "listing_neighborhood",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    neighborhood: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    total_reviews: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    #[serde(rename = "id_user_anon")]
    id: String,
    #[serde(
        rename = "words_in_user_profile",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    words_in_profile: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Lenient count coercion: integer or float cells both land on a
/// non-negative integer, anything unparsable is zero.
fn coerce_count(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
        .map(|value| value as u32)
        .unwrap_or(0)
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
pub(crate) fn parse_datetime_for_tests(value: &str) -> Option<NaiveDateTime> {
    parse_datetime(value)
}

#[cfg(test)]
pub(crate) fn coerce_count_for_tests(raw: Option<&str>) -> u32 {
    coerce_count(raw)
}
