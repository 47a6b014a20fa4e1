#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use osem_rust::api::{BoxId, Measurement, SenseBox, Sensor, SensorId};
use osem_rust::db::{BoxRepository, LocalRepository};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process environment, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Fixed reference instant for seeded series.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 6, 1, 0, 0, 0).unwrap()
}

/// Store a box with one sensor per title; returns the box and sensor ids in title order.
pub async fn seed_box(repo: &LocalRepository, titles: &[&str]) -> (BoxId, Vec<SensorId>) {
    let mut sensebox = SenseBox::new("senseBox Garten", "fixed");
    let mut ids = Vec::new();
    for title in titles {
        let sensor = Sensor::new(*title, "unit");
        ids.push(sensor.id);
        sensebox = sensebox.with_sensor(sensor);
    }
    let box_id = repo.store_box(sensebox).await.unwrap();
    (box_id, ids)
}

/// Insert `values` for `sensor`, one every `step` starting at `start`.
pub fn seed_series(
    repo: &LocalRepository,
    sensor: SensorId,
    start: DateTime<Utc>,
    step: Duration,
    values: &[&str],
) {
    repo.insert_measurements(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Measurement::new(sensor, *v, start + step * i as i32)),
    );
}
