use super::domain::{Inquiry, ListingDirectory, UserProfile};
use super::report::FunnelReport;
use crate::config::AnalyticsConfig;

/// Immutable enriched snapshot of the three datasets. All aggregation runs
/// against this snapshot through shared references, so independent analyses
/// can safely run over the same data.
#[derive(Debug)]
pub struct FunnelDataset {
    inquiries: Vec<Inquiry>,
    listings: ListingDirectory,
    users: Vec<UserProfile>,
}

impl FunnelDataset {
    pub fn new(
        inquiries: Vec<Inquiry>,
        listings: ListingDirectory,
        users: Vec<UserProfile>,
    ) -> Self {
        Self {
            inquiries,
            listings,
            users,
        }
    }

    pub fn inquiries(&self) -> &[Inquiry] {
        &self.inquiries
    }

    pub fn listings(&self) -> &ListingDirectory {
        &self.listings
    }

    pub fn users(&self) -> &[UserProfile] {
        &self.users
    }

    /// Computes every aggregate once over this snapshot.
    pub fn report(&self, config: &AnalyticsConfig) -> FunnelReport {
        FunnelReport::build(self, config)
    }
}
