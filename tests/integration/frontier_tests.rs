//! Integration tests for the frontier
//!
//! These drive the public API the way a crawler's worker tasks would: schedule
//! seeds, loop on `next()`, report outcomes through `finished()`. Timing tests
//! run on tokio's paused clock.

use ripple_frontier::config::{parse_config, Config, RetryPolicy};
use ripple_frontier::{
    CandidateUri, CheckpointManager, Disposition, FetchStatus, Frontier, MemoryStorage,
    QueueState, SqliteStorage, Storage,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

/// delayFactor 5, politeness window 1s..30s
fn polite_config() -> Config {
    let mut config = Config::default();
    config.politeness.delay_factor = 5.0;
    config.politeness.min_delay_ms = 1_000;
    config.politeness.max_delay_ms = 30_000;
    config.retry.max_retries = 3;
    config
}

/// No politeness delay at all, for throughput tests
fn eager_config() -> Config {
    let mut config = Config::default();
    config.politeness.delay_factor = 0.0;
    config.politeness.min_delay_ms = 0;
    config.politeness.max_delay_ms = 0;
    config
}

fn curi(url: &str) -> CandidateUri {
    CandidateUri::parse(url).unwrap()
}

fn succeeded(mut curi: CandidateUri, fetch: Duration, bytes: u64) -> CandidateUri {
    curi.record_fetch(FetchStatus::Http(200), fetch, bytes);
    curi
}

fn failed(mut curi: CandidateUri, status: FetchStatus) -> CandidateUri {
    curi.record_fetch(status, Duration::from_millis(50), 0);
    curi
}

/// Returns the next URI if one is available without waiting
async fn try_next<S: Storage>(frontier: &Frontier<S>) -> Option<CandidateUri> {
    tokio::time::timeout(Duration::from_millis(1), frontier.next())
        .await
        .ok()
        .and_then(|result| result.unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_politeness_example_scenario() {
    let frontier = Frontier::new(polite_config(), MemoryStorage::new()).unwrap();
    for url in [
        "https://a.example/1",
        "https://a.example/2",
        "https://a.example/3",
        "https://b.example/1",
    ] {
        assert!(frontier.schedule(curi(url)).unwrap());
    }

    // One from each queue; a second "a.example" URI is never handed out
    let first = try_next(&frontier).await.unwrap();
    let second = try_next(&frontier).await.unwrap();
    let mut keys = vec![
        first.scheduling_key().to_string(),
        second.scheduling_key().to_string(),
    ];
    keys.sort();
    assert_eq!(keys, vec!["a.example", "b.example"]);
    assert!(try_next(&frontier).await.is_none());

    let (a, b) = if first.scheduling_key() == "a.example" {
        (first, second)
    } else {
        (second, first)
    };

    let completed_at = Instant::now();
    frontier
        .finished(succeeded(a, Duration::from_secs(2), 1_000))
        .unwrap();

    // b.example is unaffected by a.example's snooze
    frontier
        .finished(succeeded(b, Duration::from_millis(100), 100))
        .unwrap();

    let next_a = frontier.next().await.unwrap().unwrap();
    assert_eq!(next_a.scheduling_key(), "a.example");
    assert_eq!(next_a.url().path(), "/2");
    assert!(Instant::now() - completed_at >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_politeness_gap_stays_in_window() {
    let frontier = Frontier::new(polite_config(), MemoryStorage::new()).unwrap();
    for i in 0..4 {
        frontier
            .schedule(curi(&format!("https://slow.example/{}", i)))
            .unwrap();
    }

    // Fetch times spanning below the floor, inside the window and above the cap
    let fetch_times = [
        Duration::from_millis(10),
        Duration::from_secs(3),
        Duration::from_secs(120),
    ];
    let expected = [
        Duration::from_secs(1),
        Duration::from_secs(15),
        Duration::from_secs(30),
    ];

    let mut current = frontier.next().await.unwrap().unwrap();
    for (fetch, want) in fetch_times.iter().zip(expected) {
        frontier
            .finished(succeeded(current, *fetch, 10))
            .unwrap();
        let completed_at = Instant::now();

        current = frontier.next().await.unwrap().unwrap();
        let gap = Instant::now() - completed_at;
        assert!(gap >= want, "gap {:?} shorter than {:?}", gap, want);
        assert!(gap <= want + Duration::from_millis(5), "gap {:?}", gap);
    }
}

#[tokio::test(start_paused = true)]
async fn test_no_duplicate_dispatch() {
    let frontier = Frontier::new(eager_config(), MemoryStorage::new()).unwrap();
    let spellings = [
        "https://example.com/page",
        "https://EXAMPLE.com/page",
        "https://www.example.com/page#top",
        "https://example.com/./page",
        "https://example.com/page?utm_source=feed",
    ];
    let accepted = spellings
        .iter()
        .filter(|url| frontier.schedule(curi(url)).unwrap())
        .count();
    assert_eq!(accepted, 1);

    let mut dispatched = 0;
    while let Some(c) = frontier.next().await.unwrap() {
        dispatched += 1;
        frontier
            .finished(succeeded(c, Duration::ZERO, 0))
            .unwrap();
    }
    assert_eq!(dispatched, 1);
    assert_eq!(frontier.stats().duplicates, 4);

    // A forced refetch is the only way back in
    assert!(!frontier.schedule(curi("https://example.com/page")).unwrap());
    assert!(frontier
        .schedule(curi("https://example.com/page").forced())
        .unwrap());
    assert!(frontier.next().await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_in_flight_per_queue_under_contention() {
    let frontier = Arc::new(Frontier::new(eager_config(), MemoryStorage::new()).unwrap());
    for host in 0..5 {
        for page in 0..20 {
            let url = format!("https://host{}.example/{}", host, page);
            frontier.schedule(curi(&url)).unwrap();
            // Rediscovered links are dropped
            frontier.schedule(curi(&url)).unwrap();
        }
    }

    let in_flight = Arc::new(Mutex::new(HashSet::<String>::new()));
    let fetched = Arc::new(Mutex::new(Vec::<String>::new()));

    let mut workers = Vec::new();
    for _ in 0..8 {
        let frontier = Arc::clone(&frontier);
        let in_flight = Arc::clone(&in_flight);
        let fetched = Arc::clone(&fetched);

        workers.push(tokio::spawn(async move {
            while let Some(c) = frontier.next().await.unwrap() {
                let key = c.scheduling_key().to_string();
                assert!(
                    in_flight.lock().unwrap().insert(key.clone()),
                    "two URIs of {} in flight",
                    key
                );
                tokio::task::yield_now().await;
                fetched.lock().unwrap().push(c.as_str().to_string());
                in_flight.lock().unwrap().remove(&key);

                frontier
                    .finished(succeeded(c, Duration::from_micros(10), 1))
                    .unwrap();
            }
        }));
    }

    for worker in workers {
        tokio::time::timeout(Duration::from_secs(30), worker)
            .await
            .expect("worker hung")
            .unwrap();
    }

    let fetched = fetched.lock().unwrap();
    assert_eq!(fetched.len(), 100);
    let unique: HashSet<&String> = fetched.iter().collect();
    assert_eq!(unique.len(), 100);

    let stats = frontier.stats();
    assert_eq!(stats.succeeded, 100);
    assert_eq!(stats.duplicates, 100);
    assert!(frontier.is_exhausted());
}

#[tokio::test(start_paused = true)]
async fn test_retry_ceiling_and_escalation() {
    let frontier = Frontier::new(polite_config(), MemoryStorage::new()).unwrap();
    frontier.schedule(curi("https://down.example/")).unwrap();
    frontier.schedule(curi("https://down.example/other")).unwrap();

    let mut attempts = 0;
    loop {
        let c = frontier.next().await.unwrap().unwrap();
        assert_eq!(c.url().path(), "/", "the retried URI stays at the head");
        attempts += 1;
        let disposition = frontier
            .finished(failed(c, FetchStatus::ConnectFailed))
            .unwrap();
        if disposition == Disposition::Dispositive {
            break;
        }
        assert_eq!(disposition, Disposition::Retryable);
    }
    assert_eq!(attempts, 3);

    // The queue moves on without a politeness delay
    let other = try_next(&frontier).await.unwrap();
    assert_eq!(other.url().path(), "/other");

    let report = frontier.queue_report("down.example").unwrap();
    assert_eq!(report.retries, 2);
    assert_eq!(frontier.stats().failed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_does_not_block_other_queues() {
    let mut config = polite_config();
    config.retry.policy = RetryPolicy::Backoff;
    config.retry.backoff_base_ms = 5_000;
    config.retry.backoff_max_ms = 60_000;
    let frontier = Frontier::new(config, MemoryStorage::new()).unwrap();
    frontier.schedule(curi("https://flaky.example/")).unwrap();
    frontier.schedule(curi("https://fine.example/")).unwrap();

    let first = try_next(&frontier).await.unwrap();
    let second = try_next(&frontier).await.unwrap();
    let (flaky, fine) = if first.scheduling_key() == "flaky.example" {
        (first, second)
    } else {
        (second, first)
    };

    let failed_at = Instant::now();
    frontier
        .finished(failed(flaky, FetchStatus::Timeout))
        .unwrap();
    frontier
        .finished(succeeded(fine, Duration::from_millis(10), 0))
        .unwrap();

    let report = frontier.queue_report("flaky.example").unwrap();
    assert_eq!(report.state, QueueState::Snoozed);
    assert_eq!(report.wake_in_ms, Some(5_000));

    let retried = frontier.next().await.unwrap().unwrap();
    assert_eq!(retried.scheduling_key(), "flaky.example");
    assert_eq!(retried.fetch_attempts, 1);
    assert!(Instant::now() - failed_at >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_byte_budget_retires_queue_until_reactivated() {
    let mut config = polite_config();
    config.budget.queue_byte_budget = 1_000;
    let frontier = Frontier::new(config, MemoryStorage::new()).unwrap();
    for i in 0..3 {
        frontier
            .schedule(curi(&format!("https://big.example/{}", i)))
            .unwrap();
    }

    let c = frontier.next().await.unwrap().unwrap();
    frontier
        .finished(succeeded(c, Duration::from_millis(100), 600))
        .unwrap();
    let c = frontier.next().await.unwrap().unwrap();
    frontier
        .finished(succeeded(c, Duration::from_millis(100), 600))
        .unwrap();

    let report = frontier.queue_report("big.example").unwrap();
    assert_eq!(report.state, QueueState::Retired);
    assert_eq!(report.bytes_charged, 1_200);
    assert_eq!(report.pending, 1);

    // Nothing else can produce work
    assert!(frontier.next().await.unwrap().is_none());

    // New discoveries for a retired queue wait with it
    frontier.schedule(curi("https://big.example/late")).unwrap();
    assert!(frontier.next().await.unwrap().is_none());

    frontier.reactivate_queue("big.example").unwrap();
    let report = frontier.queue_report("big.example").unwrap();
    assert_eq!(report.bytes_charged, 0);
    assert_eq!(report.total_bytes, 1_200);

    let c = try_next(&frontier).await.unwrap();
    assert_eq!(c.url().path(), "/2");
}

#[tokio::test(start_paused = true)]
async fn test_hold_queues_serve_one_site_at_a_time() {
    let mut config = eager_config();
    config.queues.hold_queues = true;
    let frontier = Frontier::new(config, MemoryStorage::new()).unwrap();
    for host in ["first.example", "second.example"] {
        for page in 0..2 {
            frontier
                .schedule(curi(&format!("https://{}/{}", host, page)))
                .unwrap();
        }
    }

    let mut order = Vec::new();
    while let Some(c) = frontier.next().await.unwrap() {
        order.push(c.scheduling_key().to_string());
        frontier
            .finished(succeeded(c, Duration::ZERO, 0))
            .unwrap();
    }

    // The second queue is only activated when the first has nothing ready
    assert_eq!(order.len(), 4);
    assert_eq!(order[0], "first.example");
}

#[tokio::test(start_paused = true)]
async fn test_held_queues_take_turns() {
    let mut config = eager_config();
    config.queues.hold_queues = true;
    config.queues.balance_replenish_amount = 2;
    let frontier = Frontier::new(config, MemoryStorage::new()).unwrap();
    for host in ["first.example", "second.example"] {
        for page in 0..4 {
            frontier
                .schedule(curi(&format!("https://{}/{}", host, page)))
                .unwrap();
        }
    }

    let mut order = Vec::new();
    while let Some(c) = frontier.next().await.unwrap() {
        order.push(c.scheduling_key().to_string());
        frontier
            .finished(succeeded(c, Duration::ZERO, 0))
            .unwrap();
    }

    // Each activation is good for two dispatches, then the other site gets a turn
    let expected: Vec<&str> = ["first.example", "second.example"]
        .iter()
        .cycle()
        .take(4)
        .flat_map(|host| [*host, *host])
        .collect();
    assert_eq!(order, expected);
    assert_eq!(frontier.stats().succeeded, 8);
}

#[tokio::test(start_paused = true)]
async fn test_resource_selecting_params_not_deduplicated() {
    let frontier = Frontier::new(eager_config(), MemoryStorage::new()).unwrap();
    let distinct = [
        "https://github.com/o/r/blob/x.rs?ref=main",
        "https://github.com/o/r/blob/x.rs?ref=dev",
        "https://example.com/feed?source=rss",
        "https://example.com/feed?source=atom",
    ];
    for url in distinct {
        assert!(frontier.schedule(curi(url)).unwrap(), "{} dropped", url);
    }

    // Session ids still collapse
    assert!(frontier
        .schedule(curi("https://example.com/cart?item=4"))
        .unwrap());
    assert!(!frontier
        .schedule(curi("https://example.com/cart?item=4&PHPSESSID=f00d"))
        .unwrap());
    assert_eq!(frontier.stats().duplicates, 1);
}

#[tokio::test(start_paused = true)]
async fn test_operator_discard_and_forget() {
    let frontier = Frontier::new(eager_config(), MemoryStorage::new()).unwrap();
    for i in 0..5 {
        frontier
            .schedule(curi(&format!("https://spam.example/{}", i)))
            .unwrap();
    }
    frontier.schedule(curi("https://good.example/")).unwrap();

    assert_eq!(frontier.discard_queue("spam.example").unwrap(), 5);
    let c = frontier.next().await.unwrap().unwrap();
    assert_eq!(c.scheduling_key(), "good.example");
    frontier
        .finished(succeeded(c, Duration::ZERO, 0))
        .unwrap();
    assert!(frontier.next().await.unwrap().is_none());

    // Discarded URIs stay known until forgotten
    let uri = curi("https://spam.example/0");
    assert!(!frontier.schedule(uri.clone()).unwrap());
    assert!(frontier.forget(&uri).unwrap());
    assert!(frontier.schedule(uri).unwrap());
    assert_eq!(
        frontier.next().await.unwrap().unwrap().scheduling_key(),
        "spam.example"
    );
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_reaps_abandoned_uri() {
    let frontier = Arc::new(Frontier::new(polite_config(), MemoryStorage::new()).unwrap());
    frontier.schedule(curi("https://lost.example/")).unwrap();

    // A worker takes the URI and never reports back
    let abandoned = frontier.next().await.unwrap().unwrap();
    let watchdog = frontier.spawn_watchdog(Duration::from_secs(60));

    let again = frontier.next().await.unwrap().unwrap();
    assert_eq!(again.as_str(), abandoned.as_str());
    assert_eq!(again.fetch_attempts, 1);
    assert!(frontier.finished(abandoned).is_err());

    frontier
        .finished(succeeded(again, Duration::ZERO, 0))
        .unwrap();
    frontier.terminate();
    watchdog.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_background_watchdog_from_config() {
    let mut config = polite_config();
    config.queues.stuck_grace_ms = 60_000;
    let frontier = Arc::new(Frontier::new(config, MemoryStorage::new()).unwrap());
    frontier.schedule(curi("https://lost.example/")).unwrap();

    let abandoned = frontier.next().await.unwrap().unwrap();
    let handles = frontier.spawn_background();
    assert_eq!(handles.len(), 1);

    let again = frontier.next().await.unwrap().unwrap();
    assert_eq!(again.as_str(), abandoned.as_str());
    assert_eq!(frontier.stats().retried, 1);

    frontier.terminate();
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_background_checkpoints_from_config() {
    let dir = TempDir::new().unwrap();
    let config = parse_config(&format!(
        r#"
[storage]
backend = "sqlite"
path = "{db}"

[checkpoint]
directory = "{checkpoints}"
interval-secs = 1
"#,
        db = dir.path().join("frontier.db").display(),
        checkpoints = dir.path().join("checkpoints").display(),
    ))
    .unwrap();

    let frontier = Arc::new(Frontier::open(config).unwrap());
    frontier.schedule(curi("https://a.example/1")).unwrap();
    assert!(dir.path().join("frontier.db").exists());

    let handles = frontier.spawn_background();
    assert_eq!(handles.len(), 1, "no watchdog without stuck-grace-ms");

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    frontier.terminate();
    for handle in handles {
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    let manager = CheckpointManager::new(dir.path().join("checkpoints"));
    let latest = manager.latest().unwrap().unwrap();
    assert_eq!(manager.read_manifest(&latest).unwrap().pending_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_site_rules_from_toml() {
    let config = parse_config(
        r#"
[politeness]
delay-factor = 1.0
min-delay-ms = 500
max-delay-ms = 5000

[[site]]
domain = "*.bigsite.example"
queue-key = "bigsite"
min-delay-ms = 20000
precedence = 1
"#,
    )
    .unwrap();
    let frontier = Frontier::new(config, MemoryStorage::new()).unwrap();

    frontier.schedule(curi("https://a.other.example/")).unwrap();
    frontier
        .schedule(curi("https://cdn.bigsite.example/x"))
        .unwrap();
    frontier
        .schedule(curi("https://www2.bigsite.example/y"))
        .unwrap();

    // Pinned precedence 1 beats the default
    let first = try_next(&frontier).await.unwrap();
    assert_eq!(first.scheduling_key(), "bigsite");
    let completed_at = Instant::now();
    frontier
        .finished(succeeded(first, Duration::from_millis(100), 0))
        .unwrap();

    let other = try_next(&frontier).await.unwrap();
    assert_eq!(other.scheduling_key(), "a.other.example");
    frontier
        .finished(succeeded(other, Duration::from_millis(100), 0))
        .unwrap();

    // The site floor outranks the 5s ceiling
    let second = frontier.next().await.unwrap().unwrap();
    assert_eq!(second.scheduling_key(), "bigsite");
    assert!(Instant::now() - completed_at >= Duration::from_secs(20));
}

/// Builds a frontier mid-crawl: two queues with pending URIs, one with a URI
/// in flight and one snoozed
async fn mid_crawl<S: Storage>(frontier: &Frontier<S>) -> CandidateUri {
    for url in [
        "https://a.example/1",
        "https://a.example/2",
        "https://a.example/3",
        "https://b.example/1",
        "https://b.example/2",
    ] {
        frontier.schedule(curi(url)).unwrap();
    }

    let mut dispatched = HashMap::new();
    for _ in 0..2 {
        let c = try_next(frontier).await.unwrap();
        dispatched.insert(c.scheduling_key().to_string(), c);
    }
    let b = dispatched.remove("b.example").unwrap();
    frontier
        .finished(succeeded(b, Duration::from_secs(1), 2_048))
        .unwrap();

    dispatched.remove("a.example").unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_checkpoint_round_trip_sqlite() {
    let dir = TempDir::new().unwrap();
    let live_storage = SqliteStorage::new(&dir.path().join("live.db")).unwrap();
    let frontier = Frontier::new(polite_config(), live_storage).unwrap();
    let in_flight = mid_crawl(&frontier).await;

    let manager = CheckpointManager::new(dir.path().join("checkpoints"));
    let id = frontier.checkpoint(manager.root()).unwrap();
    assert_eq!(manager.list().unwrap(), vec![id.clone()]);

    let before_pending = frontier.pending_count();
    let before_fingerprints = frontier.fingerprint_count().unwrap();

    let restored_storage = SqliteStorage::new(&dir.path().join("restored.db")).unwrap();
    let recovered = manager
        .recover(&id, polite_config(), restored_storage)
        .unwrap();

    // The in-flight URI is pending again
    assert_eq!(recovered.pending_count(), before_pending + 1);
    assert_eq!(
        recovered.fingerprint_count().unwrap(),
        before_fingerprints
    );
    assert_eq!(recovered.stats(), frontier.stats());
    assert_eq!(recovered.in_flight_count(), 0);

    for url in ["https://a.example/1", "https://b.example/2", "https://c.example/"] {
        assert_eq!(
            recovered.has_seen(&curi(url)).unwrap(),
            frontier.has_seen(&curi(url)).unwrap(),
            "{}",
            url
        );
    }

    let a = recovered.queue_report("a.example").unwrap();
    assert_eq!(a.state, QueueState::Ready);
    assert_eq!(a.pending, 3);
    let b = recovered.queue_report("b.example").unwrap();
    assert_eq!(b.state, QueueState::Snoozed);
    assert_eq!(b.total_bytes, 2_048);

    // The interrupted URI goes out first
    let first = try_next(&recovered).await.unwrap();
    assert_eq!(first.as_str(), in_flight.as_str());
}

#[tokio::test(start_paused = true)]
async fn test_checkpoint_round_trip_into_other_backend() {
    let dir = TempDir::new().unwrap();
    let frontier = Frontier::new(polite_config(), MemoryStorage::new()).unwrap();
    mid_crawl(&frontier).await;

    let id = frontier.checkpoint(dir.path()).unwrap();
    let recovered = CheckpointManager::new(dir.path())
        .recover(&id, polite_config(), SqliteStorage::new_in_memory().unwrap())
        .unwrap();

    assert_eq!(recovered.pending_count(), frontier.pending_count() + 1);
    assert_eq!(
        recovered.queue_counts()[&QueueState::Ready],
        1,
        "a.example is ready again"
    );

    // Crawl the rest to completion
    let mut remaining = 0;
    while let Some(c) = recovered.next().await.unwrap() {
        remaining += 1;
        recovered
            .finished(succeeded(c, Duration::from_millis(10), 1))
            .unwrap();
    }
    assert_eq!(remaining, 4);
    assert!(!recovered.schedule(curi("https://a.example/2")).unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_recover_rejects_missing_checkpoint() {
    let dir = TempDir::new().unwrap();
    let manager = CheckpointManager::new(dir.path());
    let id: ripple_frontier::CheckpointId = "20260101T000000.000Z".parse().unwrap();
    assert!(manager
        .recover(&id, Config::default(), MemoryStorage::new())
        .is_err());
}

#[tokio::test(start_paused = true)]
async fn test_checkpoint_while_crawling() {
    let dir = TempDir::new().unwrap();
    let frontier = Arc::new(Frontier::new(eager_config(), MemoryStorage::new()).unwrap());
    for i in 0..50 {
        frontier
            .schedule(curi(&format!("https://h{}.example/", i % 5)))
            .unwrap();
        frontier
            .schedule(curi(&format!("https://h{}.example/{}", i % 5, i)))
            .unwrap();
    }

    let worker = {
        let frontier = Arc::clone(&frontier);
        tokio::spawn(async move {
            let mut done = 0;
            while let Some(c) = frontier.next().await.unwrap() {
                frontier
                    .finished(succeeded(c, Duration::ZERO, 0))
                    .unwrap();
                done += 1;
                tokio::task::yield_now().await;
            }
            done
        })
    };

    tokio::task::yield_now().await;
    let id = frontier.checkpoint(dir.path()).unwrap();
    let done = worker.await.unwrap();
    assert_eq!(done, 55);

    // Whatever the checkpoint saw, it is internally consistent
    let manifest = CheckpointManager::new(dir.path())
        .read_manifest(&id)
        .unwrap();
    assert_eq!(manifest.fingerprint_count, 55);
    assert_eq!(
        manifest.pending_count + manifest.stats.succeeded,
        manifest.stats.scheduled
    );
}
