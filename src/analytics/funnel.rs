//! Funnel distribution and grouped conversion analyses.
//!
//! The segment analyses left-join inquiries to the listing directory. An
//! inquiry whose listing identifier is not in the directory lands in an
//! explicit unknown bucket instead of being dropped, so every inquiry is
//! accounted for in every breakdown.

use super::domain::{
    ContactChannel, FunnelStage, GuestUserStage, Inquiry, ListingDirectory, RoomType,
};
use super::metrics::GroupConversion;
use std::collections::BTreeMap;

/// One row of the funnel stage distribution. `share` is the fraction of all
/// inquiries in this stage; it is 0.0 for an empty snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StageDistributionEntry {
    pub stage: FunnelStage,
    pub count: usize,
    pub share: f64,
}

/// Frequency of each funnel stage, always covering all four stages in
/// funnel order, including stages with zero occurrences.
pub fn funnel_stage_distribution(inquiries: &[Inquiry]) -> Vec<StageDistributionEntry> {
    let mut counts = [0usize; 4];
    for inquiry in inquiries {
        counts[inquiry.funnel_stage.index()] += 1;
    }

    let total = inquiries.len();
    FunnelStage::ordered()
        .into_iter()
        .map(|stage| {
            let count = counts[stage.index()];
            let share = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            };
            StageDistributionEntry { stage, count, share }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageShare {
    pub stage: FunnelStage,
    pub share: f64,
}

/// Per-channel distribution across the four funnel stages. Shares within a
/// row sum to 1.0, so channels are directly comparable regardless of their
/// inquiry volume.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFunnelRow {
    pub channel: ContactChannel,
    pub inquiries: usize,
    pub stages: Vec<StageShare>,
}

/// Row-normalized crosstab of contact channel versus funnel stage.
pub fn funnel_by_contact_channel(inquiries: &[Inquiry]) -> Vec<ChannelFunnelRow> {
    let mut groups: BTreeMap<ContactChannel, [usize; 4]> = BTreeMap::new();
    for inquiry in inquiries {
        let counts = groups.entry(inquiry.channel.clone()).or_insert([0; 4]);
        counts[inquiry.funnel_stage.index()] += 1;
    }

    groups
        .into_iter()
        .map(|(channel, counts)| {
            let total: usize = counts.iter().sum();
            let stages = FunnelStage::ordered()
                .into_iter()
                .map(|stage| StageShare {
                    stage,
                    share: counts[stage.index()] as f64 / total as f64,
                })
                .collect();
            ChannelFunnelRow {
                channel,
                inquiries: total,
                stages,
            }
        })
        .collect()
}

/// Booking rate per guest user stage, sorted by rate descending.
pub fn funnel_by_guest_user_stage(inquiries: &[Inquiry]) -> Vec<GroupConversion<GuestUserStage>> {
    super::metrics::conversion_by_guest_user_stage(inquiries)
}

/// Room-type bucket after the left join. `Unknown` collects inquiries whose
/// listing identifier has no match in the cleaned directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomTypeSegment {
    Known(RoomType),
    Unknown,
}

impl RoomTypeSegment {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Known(room_type) => room_type.label(),
            Self::Unknown => "unknown",
        }
    }
}

/// Booking rate per room type, sorted by rate descending.
pub fn funnel_by_room_type(
    inquiries: &[Inquiry],
    listings: &ListingDirectory,
) -> Vec<GroupConversion<RoomTypeSegment>> {
    super::metrics::conversion_by(inquiries, |inquiry| {
        match listings.get(&inquiry.listing_id) {
            Some(listing) => RoomTypeSegment::Known(listing.room_type),
            None => RoomTypeSegment::Unknown,
        }
    })
}

/// Neighborhood bucket after the left join. Inquiries without a matching
/// listing, and listings without a neighborhood, share the unknown bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NeighborhoodSegment {
    Named(String),
    Unknown,
}

impl NeighborhoodSegment {
    pub fn label(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Unknown => "unknown",
        }
    }
}

/// Booking rate and inquiry count per neighborhood. Neighborhoods with
/// fewer than `min_inquiries` inquiries are excluded; the survivors are
/// sorted by rate descending.
pub fn funnel_by_neighborhood(
    inquiries: &[Inquiry],
    listings: &ListingDirectory,
    min_inquiries: usize,
) -> Vec<GroupConversion<NeighborhoodSegment>> {
    let mut conversions = super::metrics::conversion_by(inquiries, |inquiry| {
        match listings.get(&inquiry.listing_id) {
            Some(listing) => match &listing.neighborhood {
                Some(name) => NeighborhoodSegment::Named(name.clone()),
                None => NeighborhoodSegment::Unknown,
            },
            None => NeighborhoodSegment::Unknown,
        }
    });

    // conversion_by already sorts by rate descending and retain preserves
    // that order.
    conversions.retain(|entry| entry.inquiries >= min_inquiries);
    conversions
}
