//! Best-effort batch application of lifecycle operations
//!
//! Items are processed strictly one after another in input order. Operations
//! like confirm have side effects on related quotes and policies, so two of
//! them are never in flight at once. A failing item is recorded and the batch
//! continues.

use std::fmt::Display;
use std::future::Future;

use tracing::{info, warn};

use core_kernel::{Notice, WorkflowError};

/// Outcome for one item of a batch
#[derive(Debug)]
pub struct BatchItem<K, T> {
    pub item: K,
    pub outcome: Result<T, WorkflowError>,
}

impl<K, T> BatchItem<K, T> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Per-item outcomes of a batch, in input order
#[derive(Debug)]
pub struct BatchReport<K, T> {
    operation: String,
    items: Vec<BatchItem<K, T>>,
}

impl<K, T> BatchReport<K, T> {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: K, outcome: Result<T, WorkflowError>) {
        self.items.push(BatchItem { item, outcome });
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn items(&self) -> &[BatchItem<K, T>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<BatchItem<K, T>> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = (&K, &T)> {
        self.items
            .iter()
            .filter_map(|i| i.outcome.as_ref().ok().map(|t| (&i.item, t)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&K, &WorkflowError)> {
        self.items
            .iter()
            .filter_map(|i| i.outcome.as_ref().err().map(|e| (&i.item, e)))
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    /// One error notice per failed item
    pub fn failure_notices(&self, entity: &str) -> Vec<Notice> {
        let action = format!("{} {entity}", self.operation);
        self.failed()
            .map(|(_, error)| Notice::failure(&action, error))
            .collect()
    }
}

/// Runs `operation` on each item sequentially, collecting every outcome
///
/// Empty input yields an empty report.
pub async fn apply_to_each<K, T, F, Fut>(
    items: impl IntoIterator<Item = K>,
    operation_name: &str,
    mut operation: F,
) -> BatchReport<K, T>
where
    K: Clone + Display,
    F: FnMut(K) -> Fut,
    Fut: Future<Output = Result<T, WorkflowError>>,
{
    let mut report = BatchReport::new(operation_name);

    for item in items {
        let outcome = operation(item.clone()).await;
        if let Err(error) = &outcome {
            warn!(item = %item, operation = operation_name, kind = %error.kind(), "Batch item failed: {}", error);
        }
        report.push(item, outcome);
    }

    info!(
        operation = operation_name,
        total = report.len(),
        failed = report.failure_count(),
        "Batch finished"
    );
    report
}
