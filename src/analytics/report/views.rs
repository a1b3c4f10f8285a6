use super::super::domain::FunnelStage;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StageDistributionView {
    pub stage: FunnelStage,
    pub stage_label: &'static str,
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageShareView {
    pub stage: FunnelStage,
    pub stage_label: &'static str,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelFunnelView {
    pub channel: String,
    pub inquiries: usize,
    pub stages: Vec<StageShareView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupConversionView {
    pub group: String,
    pub inquiries: usize,
    pub booking_rate: f64,
}

/// Serializable aggregate of every funnel analysis. Undefined aggregates
/// (means over zero eligible records) stay `None` and are omitted from the
/// JSON body.
#[derive(Debug, Clone, Serialize)]
pub struct FunnelReportSummary {
    pub total_inquiries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_response_time_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_accept_time_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_rate: Option<f64>,
    pub stage_distribution: Vec<StageDistributionView>,
    pub funnel_by_channel: Vec<ChannelFunnelView>,
    pub conversion_by_channel: Vec<GroupConversionView>,
    pub conversion_by_user_stage: Vec<GroupConversionView>,
    pub conversion_by_room_type: Vec<GroupConversionView>,
    pub conversion_by_neighborhood: Vec<GroupConversionView>,
}

/// One templated insight with its suggested follow-up.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub insight: String,
    pub action: String,
}
