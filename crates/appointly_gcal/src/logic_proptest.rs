#[cfg(test)]
mod tests {
    use crate::logic::{compute_availability, AvailabilityPolicy};
    use crate::normalize::BusyInterval;
    use chrono::{DateTime, Duration, NaiveTime, TimeZone};
    use chrono_tz::Tz;
    use proptest::prelude::*;

    const ZONES: [Tz; 4] = [
        Tz::Europe__Zurich,
        Tz::America__New_York,
        Tz::Asia__Kolkata,
        Tz::Australia__Lord_Howe,
    ];

    // Helper function to pick a reference instant somewhere in 2025
    fn reference_now(zone_index: usize, minutes_into_year: i64) -> DateTime<Tz> {
        let tz = ZONES[zone_index % ZONES.len()];
        tz.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes_into_year)
    }

    // Helper function to scatter busy intervals over the horizon
    fn busy_periods(now: DateTime<Tz>, raw: &[(i64, i64)]) -> Vec<BusyInterval> {
        raw.iter()
            .map(|&(offset_minutes, length_minutes)| {
                let start = now + Duration::minutes(offset_minutes);
                BusyInterval::from_datetimes(&start, &(start + Duration::minutes(length_minutes)))
            })
            .collect()
    }

    fn policy(start_hour: u32, end_hour: u32, slot_minutes: i64, horizon_days: u32) -> AvailabilityPolicy {
        AvailabilityPolicy {
            business_start: NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap(),
            business_end: NaiveTime::from_hms_opt(end_hour, 0, 0).unwrap(),
            slot_length: Duration::minutes(slot_minutes),
            horizon_days,
            lead_time: Duration::minutes(30),
        }
    }

    proptest! {
        // No emitted slot may overlap a busy interval
        #[test]
        fn test_slots_never_overlap_busy_time(
            zone in 0..4usize,
            minutes_into_year in 0..525_600i64,
            raw_busy in prop::collection::vec((-120..4_000i64, 0..300i64), 0..12),
        ) {
            let now = reference_now(zone, minutes_into_year);
            let busy = busy_periods(now, &raw_busy);
            let slots = compute_availability(now, &busy, &AvailabilityPolicy::default());

            for slot in &slots {
                let (s, e) = (slot.start.timestamp_millis(), slot.end.timestamp_millis());
                for b in &busy {
                    prop_assert!(!(b.start_ms < e && b.end_ms > s), "slot {:?} overlaps {:?}", slot, b);
                }
            }
        }

        // Every slot lasts exactly slot_length and the list is chronological
        #[test]
        fn test_granularity_and_ordering(
            zone in 0..4usize,
            minutes_into_year in 0..525_600i64,
            start_hour in 0..12u32,
            end_hour in 12..24u32,
            slot_minutes in prop::sample::select(vec![15i64, 20, 30, 45, 60, 90]),
            horizon_days in 1..5u32,
        ) {
            let now = reference_now(zone, minutes_into_year);
            let slots = compute_availability(now, &[], &policy(start_hour, end_hour, slot_minutes, horizon_days));

            for slot in &slots {
                prop_assert_eq!(slot.end - slot.start, Duration::minutes(slot_minutes));
            }
            for pair in slots.windows(2) {
                prop_assert!(pair[0].start <= pair[1].start);
            }
        }

        // Slots start no earlier than now and inside the horizon's business days
        #[test]
        fn test_window_containment(
            zone in 0..4usize,
            minutes_into_year in 0..525_600i64,
            horizon_days in 1..4u32,
        ) {
            let now = reference_now(zone, minutes_into_year);
            let policy = policy(9, 19, 60, horizon_days);
            let slots = compute_availability(now, &[], &policy);

            let last_day = now.date_naive() + Duration::days(i64::from(horizon_days) - 1);
            for slot in &slots {
                prop_assert!(slot.start >= now, "slot {:?} starts before {}", slot, now);
                prop_assert!(slot.start.date_naive() <= last_day);
                prop_assert!(slot.start.time() >= policy.business_start);
                prop_assert!(slot.start.time() < policy.business_end);
            }
        }

        // Identical inputs always give identical output
        #[test]
        fn test_idempotent(
            zone in 0..4usize,
            minutes_into_year in 0..525_600i64,
            raw_busy in prop::collection::vec((0..3_000i64, 1..240i64), 0..6),
        ) {
            let now = reference_now(zone, minutes_into_year);
            let busy = busy_periods(now, &raw_busy);
            let policy = AvailabilityPolicy::default();
            prop_assert_eq!(
                compute_availability(now, &busy, &policy),
                compute_availability(now, &busy, &policy)
            );
        }
    }
}
