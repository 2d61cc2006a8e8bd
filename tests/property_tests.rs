//! Property-based tests for provenance-db
//!
//! - Top-K ordering invariants
//! - Statistics bounds
//! - Store round-trips for arbitrary text fields
//! - Run with ProptestConfig::with_cases(64)

use proptest::prelude::*;
use provenance_db::record::{DatasetRecord, EdgeRecord, ModelRecord};
use provenance_db::stats::{per_dataset_average_accuracy, round_to, top_models};
use provenance_db::topk::{select_top_k, SortOrder};
use provenance_db::ProvenanceStore;
use tempfile::TempDir;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Accuracy values with deliberate duplicates (3 decimals, like the simulator)
fn arb_accuracy() -> impl Strategy<Value = f64> {
    (0u32..=1000).prop_map(|n| f64::from(n) / 1000.0)
}

fn arb_models(max: usize) -> impl Strategy<Value = Vec<ModelRecord>> {
    proptest::collection::vec(arb_accuracy(), 0..max).prop_map(|accuracies| {
        accuracies
            .into_iter()
            .enumerate()
            .map(|(i, accuracy)| {
                ModelRecord::builder(format!("m{i}"), format!("Net{i}"))
                    .accuracy(accuracy)
                    .timestamp("2024-01-01T00:00:00")
                    .build()
            })
            .collect()
    })
}

/// Free text including separators, quotes and non-ASCII
fn arb_field() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,\"'=.é-]{0,24}"
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: Top-K returns exactly min(k, n) items
    #[test]
    fn prop_topk_length(models in arb_models(40), k in 0usize..50) {
        let top = top_models(&models, k);
        prop_assert_eq!(top.len(), k.min(models.len()));
    }

    /// Property: Top-K is sorted best first, ties in input order
    #[test]
    fn prop_topk_sorted_and_stable(scores in proptest::collection::vec(arb_accuracy(), 0..60), k in 1usize..60) {
        let top = select_top_k(&scores, k, SortOrder::Descending, |s| Some(*s));
        for pair in top.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(scores[a] > scores[b] || (scores[a] == scores[b] && a < b));
        }
    }

    /// Property: Top-K agrees with a full stable sort
    #[test]
    fn prop_topk_matches_stable_sort(scores in proptest::collection::vec(arb_accuracy(), 0..60), k in 0usize..60) {
        let mut expected: Vec<usize> = (0..scores.len()).collect();
        expected.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        expected.truncate(k);
        prop_assert_eq!(select_top_k(&scores, k, SortOrder::Descending, |s| Some(*s)), expected);
    }

    /// Property: Ascending order returns the smallest values
    #[test]
    fn prop_topk_ascending(scores in proptest::collection::vec(arb_accuracy(), 1..40)) {
        let top = select_top_k(&scores, 1, SortOrder::Ascending, |s| Some(*s));
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        prop_assert_eq!(scores[top[0]], min);
    }

    /// Property: every average lies within [0, 1] and within the range of its inputs
    #[test]
    fn prop_average_bounded(models in arb_models(30), links in proptest::collection::vec((0usize..3, 0usize..30), 0..60)) {
        let datasets: Vec<DatasetRecord> = (0..3)
            .map(|i| DatasetRecord::new(format!("d{i}"), format!("D{i}"), "x", "MIT"))
            .collect();
        let edges: Vec<EdgeRecord> = links
            .iter()
            .map(|&(d, m)| EdgeRecord::trained_on(format!("d{d}"), format!("m{m}")))
            .collect();

        let stats = per_dataset_average_accuracy(&datasets, &models, &edges);
        let (lo, hi) = models.iter().filter_map(ModelRecord::accuracy)
            .fold((1.0f64, 0.0f64), |(lo, hi), a| (lo.min(a), hi.max(a)));
        for average in stats.values() {
            prop_assert!((0.0..=1.0).contains(average));
            prop_assert!(*average >= round_to(lo, 3) - 1e-9 && *average <= round_to(hi, 3) + 1e-9);
        }
    }

    /// Property: dataset rows survive a store round-trip unchanged
    #[test]
    fn prop_dataset_round_trip(rows in proptest::collection::vec((arb_field(), arb_field(), arb_field(), arb_field()), 1..10)) {
        let dir = TempDir::new().unwrap();
        let store = ProvenanceStore::open(dir.path());
        let records: Vec<DatasetRecord> = rows
            .into_iter()
            .map(|(id, name, creator, license)| DatasetRecord::new(id, name, creator, license))
            .collect();
        for record in &records {
            store.append(record).unwrap();
        }
        let loaded: Vec<DatasetRecord> = store.load_all().unwrap();
        prop_assert_eq!(loaded, records);
    }
}
