//! Scalar summary statistics over an enriched inquiry snapshot.
//!
//! Every function here is pure: it borrows the snapshot and returns owned
//! results. A mean over zero eligible records is `None`, never zero and
//! never NaN, so downstream formatting has to make the absence explicit.

use super::domain::{ContactChannel, GuestUserStage, Inquiry, UserProfile};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Booking rate for one group of a categorical breakdown. Groups only exist
/// when they contain at least one inquiry, so the rate is always defined.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupConversion<K> {
    pub group: K,
    pub inquiries: usize,
    pub booking_rate: f64,
}

/// Fraction of all inquiries that resulted in a booking, including the ones
/// that never got a reply.
pub fn booking_rate(inquiries: &[Inquiry]) -> Option<f64> {
    fraction(inquiries, |inquiry| inquiry.booking_happened)
}

/// Fraction of inquiries with a recorded host reply.
pub fn response_rate(inquiries: &[Inquiry]) -> Option<f64> {
    fraction(inquiries, |inquiry| inquiry.replied_at.is_some())
}

/// Fraction of inquiries the host accepted.
pub fn acceptance_rate(inquiries: &[Inquiry]) -> Option<f64> {
    fraction(inquiries, |inquiry| inquiry.accepted_at.is_some())
}

/// Mean host response time in hours, over inquiries where it is defined.
pub fn avg_response_time_hours(inquiries: &[Inquiry]) -> Option<f64> {
    mean(inquiries.iter().filter_map(|inquiry| inquiry.response_time_hours))
}

/// Mean time to acceptance in hours, over inquiries where it is defined.
pub fn avg_accept_time_hours(inquiries: &[Inquiry]) -> Option<f64> {
    mean(inquiries.iter().filter_map(|inquiry| inquiry.accept_time_hours))
}

/// Share of users with a non-empty profile.
pub fn profile_rate(users: &[UserProfile]) -> Option<f64> {
    if users.is_empty() {
        return None;
    }
    let with_profile = users.iter().filter(|user| user.has_profile).count();
    Some(with_profile as f64 / users.len() as f64)
}

/// Booking rate per contact channel, sorted by rate descending.
pub fn conversion_by_contact_channel(inquiries: &[Inquiry]) -> Vec<GroupConversion<ContactChannel>> {
    conversion_by(inquiries, |inquiry| inquiry.channel.clone())
}

/// Booking rate per guest user stage, sorted by rate descending.
pub fn conversion_by_guest_user_stage(
    inquiries: &[Inquiry],
) -> Vec<GroupConversion<GuestUserStage>> {
    conversion_by(inquiries, |inquiry| inquiry.guest_stage.clone())
}

pub(crate) fn conversion_by<K, F>(inquiries: &[Inquiry], key: F) -> Vec<GroupConversion<K>>
where
    K: Ord + Clone,
    F: Fn(&Inquiry) -> K,
{
    let mut groups: BTreeMap<K, (usize, usize)> = BTreeMap::new();
    for inquiry in inquiries {
        let entry = groups.entry(key(inquiry)).or_insert((0, 0));
        entry.0 += 1;
        if inquiry.booking_happened {
            entry.1 += 1;
        }
    }

    let mut conversions: Vec<GroupConversion<K>> = groups
        .into_iter()
        .map(|(group, (total, booked))| GroupConversion {
            group,
            inquiries: total,
            booking_rate: booked as f64 / total as f64,
        })
        .collect();

    sort_by_rate_desc(&mut conversions);
    conversions
}

fn sort_by_rate_desc<K: Ord>(conversions: &mut [GroupConversion<K>]) {
    conversions.sort_by(|a, b| {
        b.booking_rate
            .partial_cmp(&a.booking_rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.group.cmp(&b.group))
    });
}

fn fraction<F>(inquiries: &[Inquiry], predicate: F) -> Option<f64>
where
    F: Fn(&Inquiry) -> bool,
{
    if inquiries.is_empty() {
        return None;
    }
    let hits = inquiries.iter().filter(|inquiry| predicate(inquiry)).count();
    Some(hits as f64 / inquiries.len() as f64)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut count = 0usize;
    let mut sum = 0.0;
    for value in values {
        count += 1;
        sum += value;
    }

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
