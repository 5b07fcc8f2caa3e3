//! Parallel fan-out over independent acquisition paths.
//!
//! Each path is degraded to an empty batch on failure. Surviving batches
//! are concatenated in path order, the curated baseline goes last, and the
//! result is deduplicated by identifier with the last write winning. When no
//! path contributed anything live, the full static set is served instead.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use futures_util::future::join_all;

use crate::acquisition::{elapsed_ms, FetchResult};
use crate::envelope::{Envelope, EnvelopeError, EnvelopeMeta};
use crate::{CharacterMeet, ScheduleItem};

/// Records deduplicated by a stable identifier.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for ScheduleItem {
    fn key(&self) -> &str {
        self.id()
    }
}

impl Keyed for CharacterMeet {
    fn key(&self) -> &str {
        self.id()
    }
}

pub type PathFuture<'a, T> = Pin<Box<dyn Future<Output = FetchResult<Vec<T>>> + Send + 'a>>;

/// One named fan-out branch.
pub struct AcquisitionPath<'a, T> {
    pub name: &'static str,
    pub future: PathFuture<'a, T>,
}

impl<'a, T> AcquisitionPath<'a, T> {
    pub fn new<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = FetchResult<Vec<T>>> + Send + 'a,
    {
        Self {
            name,
            future: Box::pin(future),
        }
    }
}

/// Settled outcome of one path.
#[derive(Debug)]
pub struct PathOutcome<T> {
    pub name: &'static str,
    pub result: FetchResult<Vec<T>>,
}

/// Runs every path concurrently and waits for all of them; no path cancels
/// another.
pub async fn fan_out<T>(paths: Vec<AcquisitionPath<'_, T>>) -> Vec<PathOutcome<T>> {
    let names = paths.iter().map(|path| path.name).collect::<Vec<_>>();
    let results = join_all(paths.into_iter().map(|path| path.future)).await;
    names
        .into_iter()
        .zip(results)
        .map(|(name, result)| PathOutcome { name, result })
        .collect()
}

/// Concatenates `batches` in order and keeps one record per key.
///
/// A later record replaces an earlier one with the same key but keeps the
/// earlier record's position.
pub fn merge<T: Keyed>(batches: impl IntoIterator<Item = Vec<T>>) -> Vec<T> {
    let mut merged: Vec<T> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in batches.into_iter().flatten() {
        let existing = index.get(record.key()).copied();
        match existing {
            Some(position) => merged[position] = record,
            None => {
                index.insert(record.key().to_owned(), merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

/// Merges settled path outcomes with `baseline` into one envelope.
///
/// The freshness score is the share of paths that produced live records.
/// If none did, `fallback` supplies the data and the score is 0.
pub fn aggregate<T, F>(
    outcomes: Vec<PathOutcome<T>>,
    baseline: Vec<T>,
    fallback: F,
    started: Instant,
) -> Envelope<Vec<T>>
where
    T: Keyed,
    F: FnOnce() -> Vec<T>,
{
    let total_paths = outcomes.len();
    let mut batches = Vec::with_capacity(total_paths + 1);
    let mut sources = Vec::new();
    let mut source_chain = Vec::new();
    let mut warnings = Vec::new();
    let mut errors: Vec<EnvelopeError> = Vec::new();

    for outcome in outcomes {
        match outcome.result {
            Ok(success) => {
                sources.push(success.source);
                source_chain.extend(success.source_chain);
                warnings.extend(success.errors.iter().map(EnvelopeError::warning));
                errors.extend(success.errors);
                batches.push(success.records);
            }
            Err(failure) => {
                tracing::warn!(path = outcome.name, "acquisition path failed, degraded to empty");
                warnings.push(format!("{}: no live data, degraded to empty", outcome.name));
                warnings.extend(failure.warnings());
                source_chain.extend(failure.source_chain);
                errors.extend(failure.errors);
            }
        }
    }

    let live_paths = batches.len();
    if live_paths == 0 {
        tracing::info!(paths = total_paths, "no live entertainment data, serving fallback");
        let meta = EnvelopeMeta::fallback(source_chain)
            .with_warnings(warnings)
            .with_latency_ms(elapsed_ms(started));
        return Envelope::with_errors(meta, fallback(), errors);
    }

    batches.push(baseline);
    let data = merge(batches);
    let score = (100 * live_paths / total_paths.max(1)) as u8;

    let meta = EnvelopeMeta::new(sources.join("+"), source_chain, score)
        .with_warnings(warnings)
        .with_latency_ms(elapsed_ms(started));
    Envelope::with_errors(meta, data, errors)
}
