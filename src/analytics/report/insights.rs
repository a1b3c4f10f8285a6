use super::summary::FunnelReport;
use super::views::Recommendation;
use crate::analytics::domain::{ContactChannel, GuestUserStage};
use crate::analytics::funnel::RoomTypeSegment;
use crate::config::AnalyticsConfig;

/// Threshold-driven recommendations over the computed aggregates. Every
/// rule checks that the aggregates it reads are defined; a sparse dataset
/// simply produces fewer recommendations.
pub(crate) fn generate_recommendations(
    report: &FunnelReport,
    config: &AnalyticsConfig,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if let (Some(overall), Some(instant_book)) = (
        report.booking_rate,
        channel_rate(report, &ContactChannel::InstantBook),
    ) {
        if instant_book > overall * 1.5 {
            recommendations.push(Recommendation {
                insight: format!(
                    "Instant Book converts at {}, well above the overall booking rate of {}.",
                    percent(instant_book),
                    percent(overall)
                ),
                action: "Encourage more hosts to opt in to Instant Book, with incentives or \
                         feature placement."
                    .to_string(),
            });
        }
    }

    // Rank only real room types; the unknown join bucket is not something
    // hosts can act on.
    let known_rooms: Vec<_> = report
        .room_type_conversion
        .iter()
        .filter(|entry| matches!(entry.group, RoomTypeSegment::Known(_)))
        .collect();
    if known_rooms.len() >= 2 {
        let top = known_rooms[0];
        let bottom = known_rooms[known_rooms.len() - 1];
        recommendations.push(Recommendation {
            insight: format!(
                "{} listings have the highest booking rate at {}; {} listings convert at only {}.",
                title_case(top.group.label()),
                percent(top.booking_rate),
                title_case(bottom.group.label()),
                percent(bottom.booking_rate)
            ),
            action: format!(
                "Surface more {} listings in search results, or improve the visibility of \
                 better-converting room types.",
                top.group.label()
            ),
        });
    }

    if let (Some(new_rate), Some(past_rate)) = (
        user_stage_rate(report, &GuestUserStage::New),
        user_stage_rate(report, &GuestUserStage::PastBooker),
    ) {
        if past_rate > new_rate * 1.3 {
            recommendations.push(Recommendation {
                insight: format!(
                    "Past bookers convert at {}, while new guests only convert at {}.",
                    percent(past_rate),
                    percent(new_rate)
                ),
                action: "Improve onboarding and trust-building for new guests, e.g. better \
                         messaging prompts and social proof."
                    .to_string(),
            });
        }
    }

    if let Some(avg_response) = report.avg_response_time_hours {
        if avg_response > config.slow_response_hours {
            recommendations.push(Recommendation {
                insight: format!(
                    "Average host response time is {avg_response:.1} hours, which may be too \
                     slow for real-time booking expectations."
                ),
                action: "Improve host responsiveness with reply nudges, response SLAs, or \
                         rewards for fast responders."
                    .to_string(),
            });
        }
    }

    recommendations
}

fn channel_rate(report: &FunnelReport, channel: &ContactChannel) -> Option<f64> {
    report
        .channel_conversion
        .iter()
        .find(|entry| &entry.group == channel)
        .map(|entry| entry.booking_rate)
}

fn user_stage_rate(report: &FunnelReport, stage: &GuestUserStage) -> Option<f64> {
    report
        .user_stage_conversion
        .iter()
        .find(|entry| &entry.group == stage)
        .map(|entry| entry.booking_rate)
}

fn percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

fn title_case(label: &str) -> String {
    label
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::domain::{
        ContactChannel, GuestUserStage, Inquiry, Listing, ListingDirectory, RoomType,
    };
    use crate::analytics::FunnelDataset;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .expect("valid date")
            .and_hms_opt(hour, 0, 0)
            .expect("valid time")
    }

    fn inquiry(
        listing_id: &str,
        channel: ContactChannel,
        guest_stage: GuestUserStage,
        replied_at: Option<NaiveDateTime>,
        booked_at: Option<NaiveDateTime>,
    ) -> Inquiry {
        Inquiry::new(
            listing_id.to_string(),
            channel,
            guest_stage,
            ts(0),
            replied_at,
            None,
            booked_at,
            None,
            None,
        )
    }

    fn listing(id: &str, room_type: RoomType) -> Listing {
        Listing {
            id: id.to_string(),
            room_type,
            neighborhood: None,
            total_reviews: 0,
        }
    }

    fn report_for(inquiries: Vec<Inquiry>, listings: Vec<Listing>) -> FunnelReport {
        let dataset = FunnelDataset::new(
            inquiries,
            ListingDirectory::from_listings(listings),
            Vec::new(),
        );
        dataset.report(&AnalyticsConfig::default())
    }

    #[test]
    fn empty_dataset_yields_no_recommendations() {
        let report = report_for(Vec::new(), Vec::new());
        let recommendations = generate_recommendations(&report, &AnalyticsConfig::default());
        assert!(recommendations.is_empty());
    }

    #[test]
    fn instant_book_outperformance_is_flagged() {
        let mut inquiries = Vec::new();
        // Instant book converts 3/3; contact_me 0/7. Overall 0.3.
        for _ in 0..3 {
            inquiries.push(inquiry(
                "l-1",
                ContactChannel::InstantBook,
                GuestUserStage::New,
                None,
                Some(ts(1)),
            ));
        }
        for _ in 0..7 {
            inquiries.push(inquiry(
                "l-1",
                ContactChannel::ContactMe,
                GuestUserStage::New,
                None,
                None,
            ));
        }

        let report = report_for(inquiries, Vec::new());
        let recommendations = generate_recommendations(&report, &AnalyticsConfig::default());
        assert!(recommendations
            .iter()
            .any(|rec| rec.insight.contains("Instant Book")));
    }

    #[test]
    fn room_type_gap_needs_at_least_two_known_groups() {
        // One matched room type plus the unknown join bucket is not enough:
        // the unknown bucket does not count as a comparable group.
        let inquiries = vec![
            inquiry("l-1", ContactChannel::BookIt, GuestUserStage::New, None, Some(ts(1))),
            inquiry("l-missing", ContactChannel::BookIt, GuestUserStage::New, None, None),
        ];
        let report = report_for(
            inquiries,
            vec![listing("l-1", RoomType::EntireHome)],
        );

        let recommendations = generate_recommendations(&report, &AnalyticsConfig::default());
        assert!(!recommendations
            .iter()
            .any(|rec| rec.insight.contains("highest booking rate")));
    }

    #[test]
    fn room_type_gap_names_best_and_worst() {
        let inquiries = vec![
            inquiry("l-1", ContactChannel::BookIt, GuestUserStage::New, None, Some(ts(1))),
            inquiry("l-2", ContactChannel::BookIt, GuestUserStage::New, None, None),
        ];
        let report = report_for(
            inquiries,
            vec![
                listing("l-1", RoomType::EntireHome),
                listing("l-2", RoomType::SharedRoom),
            ],
        );

        let recommendations = generate_recommendations(&report, &AnalyticsConfig::default());
        let room_rec = recommendations
            .iter()
            .find(|rec| rec.insight.contains("highest booking rate"))
            .expect("room type recommendation present");
        assert!(room_rec.insight.contains("Entire Home"));
        assert!(room_rec.insight.contains("Shared Room"));
        assert!(room_rec.action.contains("entire home"));
    }

    #[test]
    fn room_type_gap_never_names_the_unknown_bucket() {
        // The unmatched bucket books at 100% here and would otherwise rank
        // first.
        let inquiries = vec![
            inquiry("l-missing", ContactChannel::BookIt, GuestUserStage::New, None, Some(ts(1))),
            inquiry("l-1", ContactChannel::BookIt, GuestUserStage::New, None, None),
            inquiry("l-2", ContactChannel::BookIt, GuestUserStage::New, None, None),
        ];
        let report = report_for(
            inquiries,
            vec![
                listing("l-1", RoomType::EntireHome),
                listing("l-2", RoomType::SharedRoom),
            ],
        );

        let recommendations = generate_recommendations(&report, &AnalyticsConfig::default());
        let room_rec = recommendations
            .iter()
            .find(|rec| rec.insight.contains("highest booking rate"))
            .expect("room type recommendation present");
        assert!(!room_rec.insight.to_lowercase().contains("unknown"));
        assert!(!room_rec.action.to_lowercase().contains("unknown"));
    }

    #[test]
    fn past_booker_advantage_triggers_onboarding_recommendation() {
        let mut inquiries = Vec::new();
        for i in 0..10 {
            let booked = if i < 6 { Some(ts(1)) } else { None };
            inquiries.push(inquiry(
                "l-1",
                ContactChannel::BookIt,
                GuestUserStage::PastBooker,
                None,
                booked,
            ));
        }
        for i in 0..10 {
            let booked = if i < 2 { Some(ts(1)) } else { None };
            inquiries.push(inquiry(
                "l-1",
                ContactChannel::BookIt,
                GuestUserStage::New,
                None,
                booked,
            ));
        }

        let report = report_for(inquiries, Vec::new());
        let recommendations = generate_recommendations(&report, &AnalyticsConfig::default());
        assert!(recommendations
            .iter()
            .any(|rec| rec.insight.contains("Past bookers")));
    }

    #[test]
    fn slow_response_time_triggers_responsiveness_recommendation() {
        let inquiries = vec![inquiry(
            "l-1",
            ContactChannel::ContactMe,
            GuestUserStage::New,
            Some(ts(20)),
            None,
        )];

        let report = report_for(inquiries, Vec::new());
        let recommendations = generate_recommendations(&report, &AnalyticsConfig::default());
        assert!(recommendations
            .iter()
            .any(|rec| rec.insight.contains("response time")));

        let relaxed = AnalyticsConfig {
            slow_response_hours: 48.0,
            ..AnalyticsConfig::default()
        };
        let recommendations = generate_recommendations(&report, &relaxed);
        assert!(!recommendations
            .iter()
            .any(|rec| rec.insight.contains("response time")));
    }
}
