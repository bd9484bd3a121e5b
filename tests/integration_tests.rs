use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mta_segments::error::{FetchError, ProcessError};
use mta_segments::feed::FeedSource;
use mta_segments::model::{FeedHeader, FeedStatus, Leg, Segment, Trip};
use mta_segments::processor::StateProcessor;
use mta_segments::store::{MemoryStore, StateStore};
use mta_segments::system::TransitSystem;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays one queued response per fetch.
struct ScriptedFeed {
    name: &'static str,
    responses: Mutex<VecDeque<Result<Vec<Trip>, FetchError>>>,
}

impl ScriptedFeed {
    fn new(name: &'static str, responses: Vec<Result<Vec<Trip>, FetchError>>) -> Self {
        Self {
            name,
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl FeedSource for ScriptedFeed {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self) -> Result<FeedStatus, FetchError> {
        let trips = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("feed polled more often than scripted")?;
        Ok(FeedStatus {
            header: FeedHeader {
                gtfs_realtime_version: "1.0".to_string(),
                timestamp: None,
                nyct_subway_version: "1.0".to_string(),
                trip_replacement_periods: vec![],
            },
            trips,
        })
    }
}

/// A clock the test moves forward between ticks.
fn test_clock() -> (Arc<Mutex<DateTime<Utc>>>, mta_segments::processor::Clock) {
    let now = Arc::new(Mutex::new(time("2023-07-20T14:00:00-04:00")));
    let handle = Arc::clone(&now);
    (now, Arc::new(move || *handle.lock().unwrap()))
}

#[tokio::test]
async fn test_single_trip_end_to_end() {
    let ticks = vec![
        (
            "2023-07-20T14:04:08-04:00",
            vec![
                g_train(vec![
                    stop("F27N", "2023-07-20T14:04:11-04:00"),
                    stop("F26N", "2023-07-20T14:06:11-04:00"),
                    stop("F25N", "2023-07-20T14:08:41-04:00"),
                ]),
                unassigned(),
            ],
        ),
        (
            "2023-07-20T14:05:08-04:00",
            vec![
                g_train(vec![
                    stop("F26N", "2023-07-20T14:06:15-04:00"),
                    stop("F25N", "2023-07-20T14:08:41-04:00"),
                ]),
                unassigned(),
            ],
        ),
        (
            "2023-07-20T14:06:16-04:00",
            vec![
                g_train(vec![stop("F25N", "2023-07-20T14:08:41-04:00")]),
                unassigned(),
            ],
        ),
        ("2023-07-20T14:10:16-04:00", vec![g_train(vec![]), unassigned()]),
    ];

    let feed = ScriptedFeed::new(
        "g",
        ticks.iter().map(|(_, trips)| Ok(trips.clone())).collect(),
    );
    let (now, clock) = test_clock();
    let processor = StateProcessor::new(TransitSystem::new(vec![Box::new(feed)]), MemoryStore::new())
        .with_clock(clock);

    let mut per_tick = Vec::new();
    for (at, _) in &ticks {
        *now.lock().unwrap() = time(at);
        let results = processor.process_updates().await.unwrap();

        let state = processor.store().prior_state().await.unwrap();
        assert!(!state.contains("unassigned"));

        per_tick.push(results.completed_segments);
    }

    assert!(per_tick[0].is_empty());
    assert!(per_tick[1].is_empty());
    assert_eq!(per_tick[2].len(), 1);
    assert_eq!(per_tick[3].len(), 1);

    let all: Vec<Segment> = per_tick.into_iter().flatten().collect();
    assert_eq!(
        all,
        vec![
            segment(
                "F27N",
                "F26N",
                "2023-07-20T14:04:11-04:00",
                "2023-07-20T14:06:15-04:00"
            ),
            segment(
                "F26N",
                "F25N",
                "2023-07-20T14:06:15-04:00",
                "2023-07-20T14:08:41-04:00"
            ),
        ]
    );
    assert!(processor.store().prior_state().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_vanished_final_leg_is_recovered() {
    let feed = ScriptedFeed::new(
        "g",
        vec![
            Ok(vec![g_train(vec![
                stop("F26N", "2023-07-20T14:06:15-04:00"),
                stop("F25N", "2023-07-20T14:08:41-04:00"),
            ])]),
            Ok(vec![g_train(vec![stop("F25N", "2023-07-20T14:08:41-04:00")])]),
            Ok(vec![]),
        ],
    );
    let (now, clock) = test_clock();
    let processor = StateProcessor::new(TransitSystem::new(vec![Box::new(feed)]), MemoryStore::new())
        .with_clock(clock);

    let mut got = Vec::new();
    for at in [
        "2023-07-20T14:05:08-04:00",
        "2023-07-20T14:06:16-04:00",
        "2023-07-20T14:09:00-04:00",
    ] {
        *now.lock().unwrap() = time(at);
        got.extend(processor.process_updates().await.unwrap().completed_segments);
    }

    assert_eq!(
        got,
        vec![segment(
            "F26N",
            "F25N",
            "2023-07-20T14:06:15-04:00",
            "2023-07-20T14:08:41-04:00"
        )]
    );
    assert!(processor.store().prior_state().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failing_feed_does_not_advance_state() {
    let healthy = ScriptedFeed::new(
        "g",
        vec![
            Ok(vec![g_train(vec![
                stop("F27N", "2023-07-20T14:04:11-04:00"),
                stop("F26N", "2023-07-20T14:06:11-04:00"),
            ])]),
            Ok(vec![g_train(vec![stop("F26N", "2023-07-20T14:06:11-04:00")])]),
        ],
    );
    let flaky = ScriptedFeed::new(
        "ace",
        vec![
            Ok(vec![]),
            Err(FetchError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)),
        ],
    );
    let (_, clock) = test_clock();
    let processor = StateProcessor::new(
        TransitSystem::new(vec![Box::new(healthy), Box::new(flaky)]),
        MemoryStore::new(),
    )
    .with_clock(clock);

    processor.process_updates().await.unwrap();
    let before = processor.store().prior_state().await.unwrap();

    let err = processor.process_updates().await.unwrap_err();

    match err {
        ProcessError::Source(source) => assert_eq!(source.feed, "ace"),
        other => panic!("unexpected error: {other}"),
    }
    let after = processor.store().prior_state().await.unwrap();
    assert_eq!(*before, *after);
    assert!(after.get("084421_G..N").unwrap().legs.iter().all(|l| !l.is_complete));
}

// Helper functions for tests
fn time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn stop(stop_id: &str, at: &str) -> Leg {
    Leg {
        stop_id: stop_id.to_string(),
        arrival: Some(time(at)),
        departure: Some(time(at)),
        scheduled_track: Some("B2".to_string()),
        actual_track: Some("B2".to_string()),
        is_complete: false,
    }
}

fn g_train(legs: Vec<Leg>) -> Trip {
    Trip {
        trip_id: "084421_G..N".to_string(),
        route_id: "G".to_string(),
        train_id: "1G 1404 CHU/CRS".to_string(),
        is_assigned: true,
        direction: None,
        legs,
    }
}

fn unassigned() -> Trip {
    Trip {
        trip_id: "unassigned".to_string(),
        route_id: "G".to_string(),
        train_id: "1G 1430 CRS/CHU".to_string(),
        is_assigned: false,
        direction: None,
        legs: vec![stop("F20S", "2023-07-20T14:30:00-04:00")],
    }
}

fn segment(from: &str, to: &str, depart: &str, arrive: &str) -> Segment {
    Segment {
        from_station: from.to_string(),
        to_station: to.to_string(),
        depart_at: Some(time(depart)),
        arrive_at: Some(time(arrive)),
        trip_id: "084421_G..N".to_string(),
        route_id: "G".to_string(),
        train_id: "1G 1404 CHU/CRS".to_string(),
        is_assigned: true,
        scheduled_track: Some("B2".to_string()),
        actual_track: Some("B2".to_string()),
    }
}
