//! End-to-end scheduling scenarios: contacts in, pending jobs out, fired
//! jobs rendered.

use std::sync::{Arc, Mutex};

use birthdays_core::alerts::prepare_notification;
use birthdays_core::{
    AlertDispatcher, AlertKind, AlertPayload, AlertPipeline, AlertsConfig, Config,
    ConfiguredContactBook, ContactBook, ContactRecord, FixedClock, JobStore, LeadTimeOffset,
    MemorySubstrate, Notification, Notifier,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn pipeline(
    contacts: Vec<ContactRecord>,
    now: NaiveDateTime,
) -> (Arc<MemorySubstrate>, AlertPipeline) {
    let substrate = Arc::new(MemorySubstrate::new());
    let pipeline =
        AlertPipeline::new(contacts, substrate.clone()).with_clock(Arc::new(FixedClock(now)));
    (substrate, pipeline)
}

fn only(offset: LeadTimeOffset) -> AlertsConfig {
    AlertsConfig {
        same_day: offset == LeadTimeOffset::SameDay,
        three_day: offset == LeadTimeOffset::ThreeDay,
        seven_day: offset == LeadTimeOffset::SevenDay,
        ..AlertsConfig::default()
    }
}

#[test]
fn yearless_birthday_today_fires_at_nine() {
    let (substrate, pipeline) = pipeline(
        vec![ContactRecord::new("Ada", "--03-10")],
        at(2024, 3, 10, 8, 0),
    );
    let settings = only(LeadTimeOffset::SameDay);

    let collection = pipeline.collection(&settings);
    let ada = &collection.as_slice()[0];
    assert_eq!(ada.occurrence, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    assert_eq!(ada.days_until, 0);
    assert_eq!(ada.next_age, None);

    let jobs = pipeline.plan(&settings);
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].fire_at, at(2024, 3, 10, 9, 0));

    pipeline.recompute(&settings);
    let pending = substrate.active();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].request.delay_ms, 60 * 60 * 1000);
}

#[test]
fn seven_day_lead_already_passed_emits_nothing() {
    let (substrate, pipeline) = pipeline(
        vec![ContactRecord::new("Bob", "1990-03-15")],
        at(2024, 3, 10, 8, 0),
    );
    let settings = only(LeadTimeOffset::SevenDay);

    assert_eq!(pipeline.collection(&settings).as_slice()[0].days_until, 5);
    assert!(pipeline.plan(&settings).is_empty());
    assert_eq!(pipeline.recompute(&settings).submitted, 0);
    assert!(substrate.is_empty());
}

#[test]
fn seven_day_lead_in_future_emits_one_job_with_age() {
    let (substrate, pipeline) = pipeline(
        vec![ContactRecord::new("Cy", "1990-03-20")],
        at(2024, 3, 10, 8, 30),
    );
    let settings = only(LeadTimeOffset::SevenDay);

    let jobs = pipeline.plan(&settings);
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].fire_at, at(2024, 3, 13, 9, 0));
    assert_eq!(jobs[0].payload.age, Some(34));
    assert_eq!(jobs[0].payload.days, Some(7));

    pipeline.recompute(&settings);
    let pending = substrate.with_tag("birthday_seven_day");
    assert_eq!(pending.len(), 1);
    let payload = AlertPayload::from_map(&pending[0].request.payload).unwrap();
    assert_eq!(payload.kind, AlertKind::Advance(7));

    let notification = prepare_notification(&pending[0].request.payload).unwrap();
    assert_eq!(notification.title, "Birthday in 7 Days");
    assert_eq!(notification.body, "Cy will turn 34 in 7 days");
}

#[test]
fn empty_contact_list_cancels_everything() {
    let now = at(2024, 3, 10, 8, 0);
    let substrate = Arc::new(MemorySubstrate::new());
    let full = AlertPipeline::new(
        vec![
            ContactRecord::new("Ada", "--03-20"),
            ContactRecord::new("Bob", "--04-20"),
        ],
        substrate.clone(),
    )
    .with_clock(Arc::new(FixedClock(now)));
    let settings = AlertsConfig {
        three_day: true,
        seven_day: true,
        ..AlertsConfig::default()
    };
    assert_eq!(full.recompute(&settings).submitted, 6);

    let empty = AlertPipeline::new(Vec::<ContactRecord>::new(), substrate.clone())
        .with_clock(Arc::new(FixedClock(now)));
    let report = empty.recompute(&settings);
    assert_eq!(report.cancelled, 6);
    assert!(substrate.is_empty());
}

#[test]
fn recomputes_from_two_processes_leave_one_plan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.db");
    let settings = AlertsConfig {
        three_day: true,
        seven_day: true,
        ..AlertsConfig::default()
    };
    let contacts = vec![ContactRecord::new("Ada", "--03-20")];
    let now = at(2024, 3, 10, 8, 0);

    let pipelines: Vec<AlertPipeline> = (0..2)
        .map(|_| {
            let store = Arc::new(JobStore::open(&path).unwrap());
            AlertPipeline::new(contacts.clone(), store).with_clock(Arc::new(FixedClock(now)))
        })
        .collect();
    let planned = pipelines[0].plan(&settings).len();
    assert_eq!(planned, 3);

    std::thread::scope(|s| {
        for pipeline in &pipelines {
            let settings = &settings;
            s.spawn(move || {
                for _ in 0..20 {
                    pipeline.recompute(settings);
                }
            });
        }
    });

    let store = JobStore::open(&path).unwrap();
    assert_eq!(store.pending().unwrap().len(), planned);
}

#[test]
fn recompute_follows_contacts_file_change() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    let family = ContactBook::new(dir.path().join("family.toml"));
    let work = ContactBook::new(dir.path().join("work.toml"));
    family.add("Ada", "--03-20").unwrap();
    work.add("Bob", "--03-21").unwrap();

    let use_book = |book: &ContactBook| {
        let mut config = Config::default();
        config.set("contacts_file", book.path().to_str().unwrap()).unwrap();
        config.save_to(&config_path).unwrap();
    };

    let substrate = Arc::new(MemorySubstrate::new());
    let pipeline = AlertPipeline::new(ConfiguredContactBook::new(&config_path), substrate.clone())
        .with_clock(Arc::new(FixedClock(at(2024, 3, 10, 8, 0))));
    let settings = AlertsConfig::default();

    use_book(&family);
    pipeline.recompute(&settings);
    let subjects: Vec<String> = substrate
        .active()
        .iter()
        .map(|j| AlertPayload::from_map(&j.request.payload).unwrap().name)
        .collect();
    assert_eq!(subjects, vec!["Ada".to_string()]);

    use_book(&work);
    pipeline.recompute(&settings);
    let subjects: Vec<String> = substrate
        .active()
        .iter()
        .map(|j| AlertPayload::from_map(&j.request.payload).unwrap().name)
        .collect();
    assert_eq!(subjects, vec!["Bob".to_string()]);
}

#[derive(Default)]
struct Collected(Mutex<Vec<Notification>>);

impl Notifier for Collected {
    fn notify(&self, notification: &Notification) -> birthdays_core::error::Result<()> {
        self.0.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

#[test]
fn contact_book_to_job_store_to_notification() {
    let dir = tempfile::tempdir().unwrap();
    let book = ContactBook::new(dir.path().join("contacts.toml"));
    book.add("Ada", "1990-03-10").unwrap();
    book.add("Grace", "--03-14").unwrap();

    let store = Arc::new(JobStore::open(&dir.path().join("jobs.db")).unwrap());
    let pipeline = AlertPipeline::new(book, store.clone())
        .with_clock(Arc::new(FixedClock(at(2024, 3, 10, 8, 0))));
    let settings = AlertsConfig {
        three_day: true,
        ..AlertsConfig::default()
    };

    let report = pipeline.recompute(&settings);
    // Ada: same day. Grace: same day and three days ahead.
    assert_eq!(report.submitted, 3);
    assert_eq!(store.pending().unwrap().len(), 3);

    // Re-running leaves the same number pending.
    pipeline.recompute(&settings);
    assert_eq!(store.pending().unwrap().len(), 3);

    let far_future = Utc::now() + chrono::Duration::days(3650);
    let dispatcher = AlertDispatcher::new(Collected::default());
    assert_eq!(dispatcher.fire_due(&store, far_future).unwrap(), 3);

    let bodies: Vec<String> = dispatcher
        .notifier()
        .0
        .lock()
        .unwrap()
        .iter()
        .map(|n| n.body.clone())
        .collect();
    assert!(bodies.contains(&"Ada is turning 34 today!".to_string()));
    assert!(bodies.contains(&"Grace's birthday is in 3 days".to_string()));
    assert!(bodies.contains(&"Grace's birthday is today!".to_string()));
    assert!(store.pending().unwrap().is_empty());
}
