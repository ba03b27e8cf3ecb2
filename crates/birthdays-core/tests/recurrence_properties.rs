//! Property tests for anniversary resolution and alert planning.

use birthdays_core::{
    AlertOffsets, AlertPlanner, Anniversary, AnniversaryCollection, AnniversaryResolver,
    ContactRecord, LeapDayPolicy, MonthDay, RawDate,
};
use chrono::{Datelike, NaiveDate, NaiveTime};
use proptest::prelude::*;

fn today_strategy() -> impl Strategy<Value = NaiveDate> {
    (1970i32..2100, 1u32..=366)
        .prop_filter_map("valid ordinal", |(y, ord)| NaiveDate::from_yo_opt(y, ord))
}

fn month_day_strategy() -> impl Strategy<Value = MonthDay> {
    (1u32..=12, 1u32..=31).prop_filter_map("valid month/day", |(m, d)| MonthDay::new(m, d))
}

fn raw_strategy() -> impl Strategy<Value = RawDate> {
    prop_oneof![
        month_day_strategy().prop_map(RawDate::MonthDay),
        (1900i32..2020, month_day_strategy()).prop_filter_map("valid date", |(y, md)| {
            NaiveDate::from_ymd_opt(y, md.month(), md.day()).map(RawDate::Full)
        }),
    ]
}

fn policy_strategy() -> impl Strategy<Value = LeapDayPolicy> {
    prop_oneof![Just(LeapDayPolicy::Clamp), Just(LeapDayPolicy::Roll)]
}

proptest! {
    #[test]
    fn days_until_is_bounded_and_resolution_is_pure(
        raw in raw_strategy(),
        today in today_strategy(),
        policy in policy_strategy(),
    ) {
        let resolver = AnniversaryResolver::new(policy);
        let first = resolver.resolve(&raw, today).unwrap();
        let second = resolver.resolve(&raw, today).unwrap();

        prop_assert_eq!(first, second);
        prop_assert!(first.days_until <= 366);
        prop_assert!(first.occurrence >= today);
        prop_assert_eq!(
            (first.occurrence - today).num_days(),
            i64::from(first.days_until)
        );
    }

    #[test]
    fn next_age_follows_occurrence_year(
        raw in raw_strategy(),
        today in today_strategy(),
    ) {
        let r = AnniversaryResolver::default().resolve(&raw, today).unwrap();
        match raw.year() {
            Some(born) => prop_assert_eq!(r.next_age, Some(r.occurrence.year() - born)),
            None => prop_assert_eq!(r.next_age, None),
        }
    }

    #[test]
    fn occurrence_keeps_month_and_day_outside_leap_day(
        raw in raw_strategy(),
        today in today_strategy(),
    ) {
        let md = raw.month_day();
        prop_assume!(!md.is_leap_day());
        let r = AnniversaryResolver::default().resolve(&raw, today).unwrap();
        prop_assert_eq!((r.occurrence.month(), r.occurrence.day()), (md.month(), md.day()));
    }

    #[test]
    fn collection_is_sorted_by_days_until(
        raws in proptest::collection::vec(raw_strategy(), 0..40),
        today in today_strategy(),
    ) {
        let records: Vec<_> = raws
            .iter()
            .enumerate()
            .map(|(i, raw)| ContactRecord::new(format!("person-{i}"), raw.to_string()))
            .collect();
        let collection =
            AnniversaryCollection::build(&records, today, &AnniversaryResolver::default());

        prop_assert_eq!(collection.len(), records.len());
        let days: Vec<u32> = collection.iter().map(|a| a.days_until).collect();
        prop_assert!(days.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn disabled_offsets_never_plan_anything(
        raws in proptest::collection::vec(raw_strategy(), 0..20),
        today in today_strategy(),
        hour in 0u32..24,
    ) {
        let resolver = AnniversaryResolver::default();
        let anniversaries: Vec<Anniversary> = raws
            .iter()
            .map(|raw| Anniversary::new("x", *raw, resolver.resolve(raw, today).unwrap()))
            .collect();
        let now = today.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap());

        prop_assert!(AlertPlanner::default()
            .plan(&anniversaries, &AlertOffsets::none(), now)
            .is_empty());
    }

    #[test]
    fn planned_jobs_are_in_the_future_and_not_before_today(
        raws in proptest::collection::vec(raw_strategy(), 0..20),
        today in today_strategy(),
        hour in 0u32..24,
    ) {
        let resolver = AnniversaryResolver::default();
        let anniversaries: Vec<Anniversary> = raws
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                Anniversary::new(format!("p{i}"), *raw, resolver.resolve(raw, today).unwrap())
            })
            .collect();
        let now = today.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap());

        let jobs = AlertPlanner::default().plan(&anniversaries, &AlertOffsets::all(), now);
        for job in &jobs {
            prop_assert!(job.fire_at > now);
            prop_assert!(job.fire_at.date() >= today);
        }
        let mut keys: Vec<_> = jobs.iter().map(|j| (j.subject.clone(), j.offset)).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), total);
    }
}
