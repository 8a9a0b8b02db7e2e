#[cfg(test)]
mod tests {
    use crate::logic::{
        build_booking, compute_availability, compute_availability_in, has_conflict,
        parse_appointment_time, parse_time_zone, AvailabilityPolicy, GcalError, Slot,
        SlotResponse,
    };
    use crate::normalize::{normalize_events, BusyInterval};
    use appointly_common::services::{CalendarEventRecord, EventBoundary};
    use appointly_config::{AvailabilityConfig, GcalConfig};
    use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
    use chrono_tz::Tz;

    const NEW_YORK: Tz = Tz::America__New_York;

    // Monday 2025-05-05, New York (UTC-4).
    fn at(hour: u32, minute: u32) -> DateTime<Tz> {
        NEW_YORK.with_ymd_and_hms(2025, 5, 5, hour, minute, 0).unwrap()
    }

    fn busy(start: DateTime<Tz>, end: DateTime<Tz>) -> BusyInterval {
        BusyInterval::from_datetimes(&start, &end)
    }

    fn starts_on(slots: &[Slot], day: u32) -> Vec<u32> {
        slots
            .iter()
            .filter(|s| s.start.date_naive() == NaiveDate::from_ymd_opt(2025, 5, day).unwrap())
            .map(|s| s.start.hour())
            .collect()
    }

    #[test]
    fn test_before_business_hours_offers_full_days() {
        let slots = compute_availability(at(8, 0), &[], &AvailabilityPolicy::default());

        assert_eq!(slots.len(), 20);
        assert_eq!(slots[0].start, at(9, 0));
        assert_eq!(slots[0].end, at(10, 0));
        assert_eq!(starts_on(&slots, 5), (9..19).collect::<Vec<_>>());
        assert_eq!(slots[9].end, at(19, 0));
        assert_eq!(slots[10].start, at(9, 0) + Duration::days(1));
    }

    #[test]
    fn test_started_day_reanchors_to_next_hour_after_lead_time() {
        let slots = compute_availability(at(12, 10), &[], &AvailabilityPolicy::default());

        assert_eq!(slots[0].start, at(13, 0));
        assert_eq!(slots[0].end, at(14, 0));
        assert_eq!(starts_on(&slots, 5), (13..19).collect::<Vec<_>>());
        assert_eq!(starts_on(&slots, 6).len(), 10);
    }

    #[test]
    fn test_reanchor_on_exact_boundaries() {
        let policy = AvailabilityPolicy::default();
        // 12:30 + 30 min lands exactly on 13:00.
        assert_eq!(compute_availability(at(12, 30), &[], &policy)[0].start, at(13, 0));
        // 12:00 + 30 min is mid-hour, so the first slot is 13:00, not 12:00.
        assert_eq!(compute_availability(at(12, 0), &[], &policy)[0].start, at(13, 0));
        // Business start itself is not re-anchored.
        assert_eq!(compute_availability(at(9, 0), &[], &policy)[0].start, at(9, 0));
    }

    #[test]
    fn test_all_day_event_blocks_the_whole_local_day() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let holiday = CalendarEventRecord {
            id: Some("holiday".to_string()),
            summary: None,
            start: EventBoundary::all_day(day),
            end: EventBoundary::all_day(day.succ_opt().unwrap()),
        };
        let busy = normalize_events(&[holiday], NEW_YORK).unwrap();

        let slots = compute_availability(at(8, 0), &busy, &AvailabilityPolicy::default());

        assert!(starts_on(&slots, 5).is_empty());
        assert_eq!(slots.len(), 10);
        assert_eq!(slots[0].start, at(9, 0) + Duration::days(1));
    }

    #[test]
    fn test_inverted_interval_blocks_nothing() {
        let slots = compute_availability(
            at(8, 0),
            &[busy(at(15, 0), at(14, 0))],
            &AvailabilityPolicy::default(),
        );

        assert_eq!(slots.len(), 20);
        assert_eq!(starts_on(&slots, 5), (9..19).collect::<Vec<_>>());
    }

    #[test]
    fn test_elapsed_day_skips_to_tomorrow() {
        let slots = compute_availability(at(20, 0), &[], &AvailabilityPolicy::default());

        assert!(starts_on(&slots, 5).is_empty());
        assert_eq!(slots.len(), 10);
        assert_eq!(slots[0].start, at(9, 0) + Duration::days(1));
    }

    #[test]
    fn test_late_afternoon_leaves_nothing_today() {
        // 18:20 + 30 min rounds to 19:00, which is business end.
        let slots = compute_availability(at(18, 20), &[], &AvailabilityPolicy::default());
        assert!(starts_on(&slots, 5).is_empty());
        assert_eq!(starts_on(&slots, 6).len(), 10);
    }

    #[test]
    fn test_busy_interval_removes_its_slot() {
        let slots = compute_availability(
            at(8, 0),
            &[busy(at(14, 0), at(15, 0))],
            &AvailabilityPolicy::default(),
        );
        let today = starts_on(&slots, 5);

        assert!(!today.contains(&14));
        assert!(today.contains(&13));
        assert!(today.contains(&15));
        assert_eq!(today.len(), 9);
    }

    #[test]
    fn test_back_to_back_bookings_are_allowed() {
        let slots = compute_availability(
            at(8, 0),
            &[busy(at(14, 0), at(15, 0)), busy(at(16, 0), at(17, 0))],
            &AvailabilityPolicy::default(),
        );
        let today = starts_on(&slots, 5);

        assert!(today.contains(&15));
        assert!(!today.contains(&16));
    }

    #[test]
    fn test_partial_overlap_blocks_every_touched_slot() {
        let slots = compute_availability(
            at(8, 0),
            &[busy(at(10, 30), at(12, 15))],
            &AvailabilityPolicy::default(),
        );
        let today = starts_on(&slots, 5);

        for hour in [10, 11, 12] {
            assert!(!today.contains(&hour), "{}:00 should be blocked", hour);
        }
        assert!(today.contains(&9));
        assert!(today.contains(&13));
    }

    #[test]
    fn test_zero_width_interval_blocks_only_when_strictly_inside() {
        let policy = AvailabilityPolicy::default();

        let inside = compute_availability(at(8, 0), &[busy(at(10, 30), at(10, 30))], &policy);
        assert!(!starts_on(&inside, 5).contains(&10));

        let on_boundary = compute_availability(at(8, 0), &[busy(at(10, 0), at(10, 0))], &policy);
        assert_eq!(starts_on(&on_boundary, 5).len(), 10);
    }

    #[test]
    fn test_unaligned_business_end_overruns_last_slot() {
        let policy = AvailabilityPolicy {
            business_end: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            ..AvailabilityPolicy::default()
        };
        let slots = compute_availability(at(8, 0), &[], &policy);
        let last_today = slots
            .iter()
            .filter(|s| s.start.date_naive() == at(8, 0).date_naive())
            .last()
            .unwrap();

        assert_eq!(last_today.start, at(18, 0));
        assert_eq!(last_today.end, at(19, 0));
    }

    #[test]
    fn test_identical_inputs_give_identical_output() {
        let busy = [busy(at(11, 0), at(12, 0))];
        let policy = AvailabilityPolicy::default();
        assert_eq!(
            compute_availability(at(10, 5), &busy, &policy),
            compute_availability(at(10, 5), &busy, &policy)
        );
    }

    #[test]
    fn test_zero_horizon_is_empty() {
        let policy = AvailabilityPolicy {
            horizon_days: 0,
            ..AvailabilityPolicy::default()
        };
        assert!(compute_availability(at(8, 0), &[], &policy).is_empty());
    }

    #[test]
    fn test_half_hour_offset_zone() {
        let kolkata = Tz::Asia__Kolkata;
        let now = kolkata.with_ymd_and_hms(2025, 5, 5, 12, 10, 0).unwrap();
        let slots = compute_availability(now, &[], &AvailabilityPolicy::default());

        assert_eq!(
            SlotResponse::from(&slots[0]).start,
            "2025-05-05T13:00:00.000+05:30"
        );
    }

    #[test]
    fn test_next_day_across_spring_forward() {
        // New York springs forward on 2025-03-09.
        let now = NEW_YORK.with_ymd_and_hms(2025, 3, 8, 20, 0, 0).unwrap();
        let slots = compute_availability(now, &[], &AvailabilityPolicy::default());

        assert_eq!(slots.len(), 10);
        assert_eq!(
            SlotResponse::from(&slots[0]),
            SlotResponse {
                start: "2025-03-09T09:00:00.000-04:00".to_string(),
                end: "2025-03-09T10:00:00.000-04:00".to_string(),
            }
        );
    }

    #[test]
    fn test_slot_rendering_keeps_local_offset() {
        let slots = compute_availability(at(8, 0), &[], &AvailabilityPolicy::default());
        let rendered = SlotResponse::from(&slots[0]);
        assert_eq!(rendered.start, "2025-05-05T09:00:00.000-04:00");
        assert_eq!(rendered.end, "2025-05-05T10:00:00.000-04:00");
    }

    #[test]
    fn test_compute_availability_in_resolves_zone() {
        let now = Utc.with_ymd_and_hms(2025, 5, 5, 12, 0, 0).unwrap(); // 08:00 in New York
        let slots =
            compute_availability_in(now, "America/New_York", &[], &AvailabilityPolicy::default())
                .unwrap();
        assert_eq!(slots[0].start, at(9, 0));
    }

    #[test]
    fn test_invalid_time_zone_fails_fast() {
        assert_eq!(
            parse_time_zone("Mars/Olympus_Mons"),
            Err(GcalError::InvalidTimezone("Mars/Olympus_Mons".to_string()))
        );
        let result = compute_availability_in(Utc::now(), "", &[], &AvailabilityPolicy::default());
        assert!(matches!(result, Err(GcalError::InvalidTimezone(_))));
    }

    #[test]
    fn test_policy_from_default_config_matches_default() {
        let policy = AvailabilityPolicy::from_config(&AvailabilityConfig::default()).unwrap();
        assert_eq!(policy, AvailabilityPolicy::default());
    }

    #[test]
    fn test_policy_rejects_bad_config() {
        let bad_time = AvailabilityConfig {
            business_start: "9am".to_string(),
            ..AvailabilityConfig::default()
        };
        assert!(matches!(
            AvailabilityPolicy::from_config(&bad_time),
            Err(GcalError::InvalidPolicy(_))
        ));

        let zero_slot = AvailabilityConfig {
            slot_length_minutes: 0,
            ..AvailabilityConfig::default()
        };
        assert!(matches!(
            AvailabilityPolicy::from_config(&zero_slot),
            Err(GcalError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_thirty_minute_slots() {
        let policy = AvailabilityPolicy::from_config(&AvailabilityConfig {
            slot_length_minutes: 30,
            horizon_days: 1,
            ..AvailabilityConfig::default()
        })
        .unwrap();
        let slots = compute_availability(at(8, 0), &[], &policy);

        assert_eq!(slots.len(), 20);
        assert_eq!(slots[1].start, at(9, 30));
    }

    #[test]
    fn test_build_booking() {
        let start = parse_appointment_time("2025-05-05T09:00:00.000-04:00").unwrap();
        let booking = build_booking(
            start,
            "jane@example.com",
            &AvailabilityPolicy::default(),
            &GcalConfig::default(),
        );

        assert_eq!(booking.summary, "Scheduled Appointment");
        assert_eq!(
            booking.description.as_deref(),
            Some("Appointment booked for jane@example.com")
        );
        assert_eq!(booking.end - booking.start, Duration::hours(1));
        assert_eq!(booking.time_zone, "Asia/Kolkata");
        assert_eq!(booking.attendees, vec!["jane@example.com".to_string()]);
        let reminders: Vec<_> = booking
            .reminders
            .iter()
            .map(|r| (r.method.as_str(), r.minutes))
            .collect();
        assert_eq!(reminders, vec![("email", 20), ("popup", 10)]);
    }

    #[test]
    fn test_parse_appointment_time_rejects_garbage() {
        assert!(matches!(
            parse_appointment_time("tomorrow at nine"),
            Err(GcalError::TimeParseError(_))
        ));
    }

    #[test]
    fn test_has_conflict() {
        let busy = [busy(at(14, 0), at(15, 0))];
        assert!(has_conflict(&busy, &at(14, 30), &at(15, 30)));
        assert!(!has_conflict(&busy, &at(15, 0), &at(16, 0)));
        assert!(!has_conflict(&busy, &at(13, 0), &at(14, 0)));
    }
}
