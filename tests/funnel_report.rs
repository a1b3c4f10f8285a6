use guestflow::analytics::domain::FunnelStage;
use guestflow::analytics::importer::DatasetImporter;
use guestflow::config::AnalyticsConfig;
use std::io::Cursor;

const CONTACT_HEADER: &str = "id_listing_anon,ts_interaction_first,ts_reply_at_first,ts_accepted_at_first,ts_booking_at,ds_checkin_first,ds_checkout_first,contact_channel_first,guest_user_stage_first\n";
const LISTING_HEADER: &str = "id_listing_anon,room_type,listing_neighborhood,total_reviews\n";
const USER_HEADER: &str = "id_user_anon,words_in_user_profile\n";

fn import(contacts: &str, listings: &str, users: &str) -> guestflow::analytics::FunnelDataset {
    DatasetImporter::from_readers(
        Cursor::new(contacts.to_string()),
        Cursor::new(listings.to_string()),
        Cursor::new(users.to_string()),
    )
    .expect("import succeeds")
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn replied_and_no_reply_pair_produces_expected_metrics() {
    // One reply after two hours, one inquiry that never got an answer.
    let contacts = format!(
        "{CONTACT_HEADER}\
l-1,2024-03-01 10:00:00,2024-03-01 12:00:00,,,,,contact_me,new\n\
l-1,2024-03-01 10:00:00,,,,,,contact_me,new\n"
    );
    let dataset = import(&contacts, LISTING_HEADER, USER_HEADER);
    let report = dataset.report(&AnalyticsConfig::default());

    assert_eq!(report.total_inquiries, 2);
    assert_eq!(report.response_rate, Some(0.5));
    assert_eq!(report.avg_response_time_hours, Some(2.0));

    let counts: Vec<(FunnelStage, usize)> = report
        .stage_distribution
        .iter()
        .map(|entry| (entry.stage, entry.count))
        .collect();
    assert_eq!(
        counts,
        vec![
            (FunnelStage::NoReply, 1),
            (FunnelStage::Replied, 1),
            (FunnelStage::Accepted, 0),
            (FunnelStage::Booked, 0),
        ]
    );

    let share_sum: f64 = report.stage_distribution.iter().map(|e| e.share).sum();
    assert!(approx_eq(share_sum, 1.0));
}

#[test]
fn booked_stage_matches_booking_flag_even_with_milestone_gaps() {
    // Second row books without any recorded reply or acceptance.
    let contacts = format!(
        "{CONTACT_HEADER}\
l-1,2024-03-01 10:00:00,2024-03-01 11:00:00,2024-03-01 12:00:00,2024-03-01 13:00:00,,,book_it,new\n\
l-1,2024-03-01 10:00:00,,,2024-03-02 09:00:00,,,instant_book,past booker\n\
l-1,2024-03-01 10:00:00,2024-03-01 11:00:00,,,,,contact_me,new\n"
    );
    let dataset = import(&contacts, LISTING_HEADER, USER_HEADER);

    for inquiry in dataset.inquiries() {
        assert_eq!(
            inquiry.funnel_stage == FunnelStage::Booked,
            inquiry.booking_happened,
            "booked stage must agree with the booking flag"
        );
    }

    assert_eq!(dataset.inquiries()[1].funnel_stage, FunnelStage::Booked);
    assert!(dataset.inquiries()[1].response_time_hours.is_none());
}

#[test]
fn channel_conversion_orders_instant_book_first() {
    let mut contacts = String::from(CONTACT_HEADER);
    // instant_book: 3 bookings out of 5 inquiries.
    for i in 0..5 {
        let booking = if i < 3 { "2024-03-02 09:00:00" } else { "" };
        contacts.push_str(&format!(
            "l-1,2024-03-01 10:00:00,,,{booking},,,instant_book,new\n"
        ));
    }
    // contact_me: 1 booking out of 10 inquiries.
    for i in 0..10 {
        let booking = if i < 1 { "2024-03-02 09:00:00" } else { "" };
        contacts.push_str(&format!(
            "l-1,2024-03-01 10:00:00,,,{booking},,,contact_me,new\n"
        ));
    }

    let dataset = import(&contacts, LISTING_HEADER, USER_HEADER);
    let report = dataset.report(&AnalyticsConfig::default());

    assert_eq!(report.channel_conversion.len(), 2);
    assert_eq!(report.channel_conversion[0].group.label(), "instant_book");
    assert!(approx_eq(report.channel_conversion[0].booking_rate, 0.6));
    assert_eq!(report.channel_conversion[1].group.label(), "contact_me");
    assert!(approx_eq(report.channel_conversion[1].booking_rate, 0.1));
}

#[test]
fn channel_funnel_rows_are_normalized() {
    let contacts = format!(
        "{CONTACT_HEADER}\
l-1,2024-03-01 10:00:00,2024-03-01 11:00:00,,,,,book_it,new\n\
l-1,2024-03-01 10:00:00,,,,,,book_it,new\n\
l-1,2024-03-01 10:00:00,,,2024-03-01 12:00:00,,,instant_book,new\n"
    );
    let dataset = import(&contacts, LISTING_HEADER, USER_HEADER);
    let report = dataset.report(&AnalyticsConfig::default());

    for row in &report.channel_funnel {
        let sum: f64 = row.stages.iter().map(|entry| entry.share).sum();
        assert!(
            approx_eq(sum, 1.0),
            "stage shares for {} must sum to 1.0",
            row.channel.label()
        );
    }
}

#[test]
fn room_type_breakdown_joins_and_buckets_unmatched_listings() {
    let contacts = format!(
        "{CONTACT_HEADER}\
l-home,2024-03-01 10:00:00,,,2024-03-01 12:00:00,,,book_it,new\n\
l-shared,2024-03-01 10:00:00,,,,,,book_it,new\n\
l-gone,2024-03-01 10:00:00,,,,,,book_it,new\n"
    );
    let listings = format!(
        "{LISTING_HEADER}\
l-home,Entire Home ,Mission,12\n\
l-shared, shared room,Sunset,\n\
l-dorm,dorm,Sunset,3\n"
    );
    let dataset = import(&contacts, &listings, USER_HEADER);
    let report = dataset.report(&AnalyticsConfig::default());

    // The dorm listing is filtered out during cleaning.
    assert_eq!(dataset.listings().len(), 2);

    let labels: Vec<&str> = report
        .room_type_conversion
        .iter()
        .map(|entry| entry.group.label())
        .collect();
    assert!(labels.contains(&"entire home"));
    assert!(labels.contains(&"shared room"));
    assert!(labels.contains(&"unknown"));
    assert_eq!(report.room_type_conversion[0].group.label(), "entire home");
    assert!(approx_eq(report.room_type_conversion[0].booking_rate, 1.0));
}

#[test]
fn neighborhood_breakdown_applies_minimum_sample_filter() {
    let mut contacts = String::from(CONTACT_HEADER);
    for i in 0..3 {
        let booking = if i < 2 { "2024-03-02 09:00:00" } else { "" };
        contacts.push_str(&format!(
            "l-mission,2024-03-01 10:00:00,,,{booking},,,book_it,new\n"
        ));
    }
    contacts.push_str("l-sunset,2024-03-01 10:00:00,,,,,,book_it,new\n");

    let listings = format!(
        "{LISTING_HEADER}\
l-mission,entire home,Mission,10\n\
l-sunset,entire home,Sunset,4\n"
    );
    let dataset = import(&contacts, &listings, USER_HEADER);

    // Default threshold of 50 filters everything in this tiny fixture.
    let default_report = dataset.report(&AnalyticsConfig::default());
    assert!(default_report.neighborhood_conversion.is_empty());

    let lowered = AnalyticsConfig {
        min_neighborhood_inquiries: 2,
        ..AnalyticsConfig::default()
    };
    let report = dataset.report(&lowered);
    assert_eq!(report.neighborhood_conversion.len(), 1);
    assert_eq!(report.neighborhood_conversion[0].group.label(), "Mission");
    assert_eq!(report.neighborhood_conversion[0].inquiries, 3);
    assert!(approx_eq(
        report.neighborhood_conversion[0].booking_rate,
        2.0 / 3.0
    ));
}

#[test]
fn empty_exports_produce_undefined_aggregates_and_no_recommendations() {
    let dataset = import(CONTACT_HEADER, LISTING_HEADER, USER_HEADER);
    let analytics = AnalyticsConfig::default();
    let report = dataset.report(&analytics);

    assert_eq!(report.total_inquiries, 0);
    assert!(report.booking_rate.is_none());
    assert!(report.avg_accept_time_hours.is_none());
    assert!(report.profile_rate.is_none());
    assert_eq!(report.stage_distribution.len(), 4);
    assert!(report.stage_distribution.iter().all(|e| e.count == 0));

    assert!(report.insights(&analytics).is_empty());

    let summary = report.summary();
    assert!(summary.booking_rate.is_none());
    assert_eq!(summary.stage_distribution.len(), 4);
}
