//! Scripted metric sources.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use warden_core::errors::CollectionError;
use warden_core::traits::IMetricSource;

use crate::Scenario;

/// What a [`ScriptedSource`] does on one call to `collect`.
#[derive(Debug, Clone)]
pub enum Step {
    Values(HashMap<String, f64>),
    Fail(String),
    Panic,
    /// Sleep, then report the last values.
    Hang(Duration),
}

/// Metric source that replays a fixed script, one step per call.
///
/// Once the script runs out it keeps reporting the last values it returned.
pub struct ScriptedSource {
    name: String,
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<HashMap<String, f64>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Mutex::new(VecDeque::new()),
            last: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// One step per value of a single metric.
    pub fn from_series(name: impl Into<String>, metric: &str, values: &[f64]) -> Self {
        values
            .iter()
            .fold(Self::new(name), |source, v| source.then_values([(metric, *v)]))
    }

    pub fn from_scenario(scenario: &Scenario) -> Self {
        scenario
            .ticks
            .iter()
            .fold(Self::new(scenario.source.clone()), |source, tick| {
                source.then_values(tick.iter().map(|(k, v)| (k.as_str(), *v)))
            })
    }

    pub fn then_values<'a>(self, values: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let values = values.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        self.then(Step::Values(values))
    }

    pub fn then_fail(self, reason: impl Into<String>) -> Self {
        self.then(Step::Fail(reason.into()))
    }

    pub fn then_panic(self) -> Self {
        self.then(Step::Panic)
    }

    pub fn then_hang(self, duration: Duration) -> Self {
        self.then(Step::Hang(duration))
    }

    pub fn then(self, step: Step) -> Self {
        lock(&self.steps).push_back(step);
        self
    }

    /// Number of times `collect` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IMetricSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> Result<HashMap<String, f64>, CollectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = lock(&self.steps).pop_front();
        match step {
            Some(Step::Values(values)) => {
                *lock(&self.last) = values.clone();
                Ok(values)
            }
            Some(Step::Fail(reason)) => Err(CollectionError::SourceFailed {
                source_name: self.name.clone(),
                reason,
            }),
            Some(Step::Panic) => panic!("scripted source {} panicked", self.name),
            Some(Step::Hang(duration)) => {
                std::thread::sleep(duration);
                Ok(lock(&self.last).clone())
            }
            None => Ok(lock(&self.last).clone()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
