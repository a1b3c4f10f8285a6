use super::super::dataset::FunnelDataset;
use super::super::domain::{ContactChannel, GuestUserStage};
use super::super::funnel::{
    self, ChannelFunnelRow, NeighborhoodSegment, RoomTypeSegment, StageDistributionEntry,
};
use super::super::metrics::{self, GroupConversion};
use super::views::{
    ChannelFunnelView, FunnelReportSummary, GroupConversionView, Recommendation,
    StageDistributionView, StageShareView,
};
use crate::config::AnalyticsConfig;

/// Every aggregate over one enriched snapshot, computed in a single pass so
/// the summary, the renderer, and the recommendation rules all read the
/// same numbers.
#[derive(Debug)]
pub struct FunnelReport {
    pub total_inquiries: usize,
    pub booking_rate: Option<f64>,
    pub response_rate: Option<f64>,
    pub acceptance_rate: Option<f64>,
    pub avg_response_time_hours: Option<f64>,
    pub avg_accept_time_hours: Option<f64>,
    pub profile_rate: Option<f64>,
    pub stage_distribution: Vec<StageDistributionEntry>,
    pub channel_funnel: Vec<ChannelFunnelRow>,
    pub channel_conversion: Vec<GroupConversion<ContactChannel>>,
    pub user_stage_conversion: Vec<GroupConversion<GuestUserStage>>,
    pub room_type_conversion: Vec<GroupConversion<RoomTypeSegment>>,
    pub neighborhood_conversion: Vec<GroupConversion<NeighborhoodSegment>>,
}

impl FunnelReport {
    pub fn build(dataset: &FunnelDataset, config: &AnalyticsConfig) -> Self {
        let inquiries = dataset.inquiries();

        Self {
            total_inquiries: inquiries.len(),
            booking_rate: metrics::booking_rate(inquiries),
            response_rate: metrics::response_rate(inquiries),
            acceptance_rate: metrics::acceptance_rate(inquiries),
            avg_response_time_hours: metrics::avg_response_time_hours(inquiries),
            avg_accept_time_hours: metrics::avg_accept_time_hours(inquiries),
            profile_rate: metrics::profile_rate(dataset.users()),
            stage_distribution: funnel::funnel_stage_distribution(inquiries),
            channel_funnel: funnel::funnel_by_contact_channel(inquiries),
            channel_conversion: metrics::conversion_by_contact_channel(inquiries),
            user_stage_conversion: funnel::funnel_by_guest_user_stage(inquiries),
            room_type_conversion: funnel::funnel_by_room_type(inquiries, dataset.listings()),
            neighborhood_conversion: funnel::funnel_by_neighborhood(
                inquiries,
                dataset.listings(),
                config.min_neighborhood_inquiries,
            ),
        }
    }

    pub fn summary(&self) -> FunnelReportSummary {
        let stage_distribution = self
            .stage_distribution
            .iter()
            .map(|entry| StageDistributionView {
                stage: entry.stage,
                stage_label: entry.stage.label(),
                count: entry.count,
                share: entry.share,
            })
            .collect();

        let funnel_by_channel = self
            .channel_funnel
            .iter()
            .map(|row| ChannelFunnelView {
                channel: row.channel.label().to_string(),
                inquiries: row.inquiries,
                stages: row
                    .stages
                    .iter()
                    .map(|entry| StageShareView {
                        stage: entry.stage,
                        stage_label: entry.stage.label(),
                        share: entry.share,
                    })
                    .collect(),
            })
            .collect();

        let conversion_by_channel = self
            .channel_conversion
            .iter()
            .map(|entry| GroupConversionView {
                group: entry.group.label().to_string(),
                inquiries: entry.inquiries,
                booking_rate: entry.booking_rate,
            })
            .collect();

        let conversion_by_user_stage = self
            .user_stage_conversion
            .iter()
            .map(|entry| GroupConversionView {
                group: entry.group.label().to_string(),
                inquiries: entry.inquiries,
                booking_rate: entry.booking_rate,
            })
            .collect();

        let conversion_by_room_type = self
            .room_type_conversion
            .iter()
            .map(|entry| GroupConversionView {
                group: entry.group.label().to_string(),
                inquiries: entry.inquiries,
                booking_rate: entry.booking_rate,
            })
            .collect();

        let conversion_by_neighborhood = self
            .neighborhood_conversion
            .iter()
            .map(|entry| GroupConversionView {
                group: entry.group.label().to_string(),
                inquiries: entry.inquiries,
                booking_rate: entry.booking_rate,
            })
            .collect();

        FunnelReportSummary {
            total_inquiries: self.total_inquiries,
            booking_rate: self.booking_rate,
            response_rate: self.response_rate,
            acceptance_rate: self.acceptance_rate,
            avg_response_time_hours: self.avg_response_time_hours,
            avg_accept_time_hours: self.avg_accept_time_hours,
            profile_rate: self.profile_rate,
            stage_distribution,
            funnel_by_channel,
            conversion_by_channel,
            conversion_by_user_stage,
            conversion_by_room_type,
            conversion_by_neighborhood,
        }
    }

    pub fn insights(&self, config: &AnalyticsConfig) -> Vec<Recommendation> {
        super::generate_recommendations(self, config)
    }
}
