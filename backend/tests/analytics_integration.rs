//! End-to-end engine tests against the in-memory store.

mod support;

use chrono::Duration;
use osem_rust::api::SeasonalWindow;
use osem_rust::config::SamplingPolicy;
use osem_rust::db::{services, LocalRepository};
use osem_rust::services::{
    distributions, get_conditions, get_data, record_measurement, resolve_time_range,
    AnalyticsError, BucketEvaluation, Downsampler,
};

#[tokio::test]
async fn test_conditions_partition_with_open_boundaries() {
    let repo = LocalRepository::new();
    let (box_id, sensors) = support::seed_box(&repo, &["Temperatur"]).await;
    support::seed_series(
        &repo,
        sensors[0],
        support::t0(),
        Duration::minutes(10),
        &["5", "50", "150", "250", "99", "101", "100", "200"],
    );

    let bounds = distributions::parse_bounds("[200,100]").unwrap();
    let result = get_conditions(
        &repo,
        box_id,
        "Temperatur",
        &bounds,
        SeasonalWindow::default(),
        BucketEvaluation::Sequential,
    )
    .await
    .unwrap();

    assert_eq!(result.total_count, 8);
    let counts: Vec<u64> = result.buckets.iter().map(|b| b.count).collect();
    // 5, 50, 99 | 150, 101 | 250; the values 100 and 200 sit on a boundary.
    assert_eq!(counts, vec![3, 2, 1]);
    assert_eq!(result.accounted_count(), 6);
    assert!(result.accounted_count() <= result.total_count);
    assert!((result.percentage_sum() - 75.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_conditions_for_missing_measurement_is_distinct_outcome() {
    let repo = LocalRepository::new();
    let (box_id, _) = support::seed_box(&repo, &["Temperatur"]).await;

    let err = get_conditions(
        &repo,
        box_id,
        "Light",
        &[100.0],
        SeasonalWindow::default(),
        BucketEvaluation::Sequential,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AnalyticsError::MeasurementNotFound { .. }));

    // A known measurement without samples is a valid, empty distribution.
    let (box_id, _) = support::seed_box(&repo, &["Light"]).await;
    let empty = get_conditions(
        &repo,
        box_id,
        "Light",
        &[100.0],
        SeasonalWindow::default(),
        BucketEvaluation::Sequential,
    )
    .await
    .unwrap();
    assert_eq!(empty.total_count, 0);
    assert!(empty.buckets.iter().all(|b| b.percentage == 0.0));
}

#[tokio::test]
async fn test_conditions_with_seasonal_window() {
    let repo = LocalRepository::new();
    let (box_id, sensors) = support::seed_box(&repo, &["Temperatur"]).await;
    // One sample per hour for two days, values 0..47.
    let values: Vec<String> = (0..48).map(|i| i.to_string()).collect();
    let values: Vec<&str> = values.iter().map(String::as_str).collect();
    support::seed_series(&repo, sensors[0], support::t0(), Duration::hours(1), &values);

    let window = distributions::parse_window(Some("6-6"), Some("22-2")).unwrap();
    let result = get_conditions(
        &repo,
        box_id,
        "Temperatur",
        &[23.5],
        window,
        BucketEvaluation::Parallel,
    )
    .await
    .unwrap();

    // Hours 22, 23, 0, 1 on each day: 0, 1, 22, 23 | 24, 25, 46, 47
    assert_eq!(result.total_count, 8);
    assert_eq!(result.buckets[0].count, 4);
    assert_eq!(result.buckets[1].count, 4);
}

#[tokio::test]
async fn test_store_outage_fails_whole_distribution() {
    let repo = LocalRepository::new();
    let (box_id, sensors) = support::seed_box(&repo, &["Temperatur"]).await;
    support::seed_series(&repo, sensors[0], support::t0(), Duration::minutes(1), &["1", "2"]);
    repo.set_healthy(false);

    let err = get_conditions(
        &repo,
        box_id,
        "Temperatur",
        &[1.5],
        SeasonalWindow::default(),
        BucketEvaluation::Sequential,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AnalyticsError::StoreQuery(_)));
}

#[tokio::test]
async fn test_data_window_and_downsampling() {
    let repo = LocalRepository::new();
    let (_, sensors) = support::seed_box(&repo, &["Temperatur"]).await;
    let values: Vec<String> = (0..5000).map(|i| i.to_string()).collect();
    let values: Vec<&str> = values.iter().map(String::as_str).collect();
    support::seed_series(&repo, sensors[0], support::t0(), Duration::minutes(1), &values);

    let policy = SamplingPolicy::default();
    let now = support::t0() + Duration::days(4);
    let range = resolve_time_range(Some("2016-06-01T00:00:00Z"), None, now, &policy).unwrap();
    let sampler = Downsampler::new(policy.query_limit, policy.result_limit).unwrap();

    let points = get_data(&repo, sensors[0], range, &sampler).await.unwrap();
    // 5000 rows, stride 5
    assert_eq!(points.len(), 1000);
    assert_eq!(points[0].value, "0");
    assert_eq!(points[999].value, "4995");
}

#[tokio::test]
async fn test_recorded_measurement_shows_up_everywhere() {
    let repo = LocalRepository::new();
    let (box_id, sensors) = support::seed_box(&repo, &["Temperatur", "Light"]).await;
    let now = support::t0() + Duration::hours(1);

    let stored = record_measurement(&repo, box_id, sensors[1], "1200", now)
        .await
        .unwrap();

    let overview = services::latest_measurements(&repo, box_id).await.unwrap();
    let light = overview.sensors.iter().find(|s| s.id == sensors[1]).unwrap();
    assert_eq!(light.last_measurement.as_ref().map(|m| m.id), Some(stored.id));

    let range = resolve_time_range(None, None, now, &SamplingPolicy::default()).unwrap();
    let sampler = Downsampler::new(100, 10).unwrap();
    let points = get_data(&repo, sensors[1], range, &sampler).await.unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].value, "1200");
}
