//! Edge case tests for gather-engine
//!
//! These tests cover boundary conditions and unusual inputs.

use gather_engine::{
    Activity, EntityCache, Error, OpToken, PageRequest, PageSlice, Paginator, Sequencer,
    VecSource, MAX_PAGE_SIZE,
};
use serde_json::json;

fn activity(id: &str, date: &str) -> Activity {
    Activity::new(id, format!("Activity {}", id), date)
}

fn numbers(n: u64) -> VecSource<u64> {
    VecSource::new((1..=n).collect())
}

// ============================================================================
// Page Request Edge Cases
// ============================================================================

#[test]
fn extreme_page_numbers() {
    assert_eq!(PageRequest::new(i64::MIN, 10).page_number(), 1);
    assert_eq!(PageRequest::new(0, 10).page_number(), 1);
    assert_eq!(PageRequest::new(i64::MAX, 10).page_number(), i64::MAX as u64);
}

#[test]
fn extreme_page_sizes() {
    assert_eq!(PageRequest::new(1, i64::MIN).page_size(), 1);
    assert_eq!(PageRequest::new(1, 0).page_size(), 1);
    assert_eq!(PageRequest::new(1, i64::MAX).page_size(), MAX_PAGE_SIZE);
}

#[test]
fn skip_saturates_for_huge_page_numbers() {
    let request = PageRequest::new(i64::MAX, 50);
    assert_eq!(request.skip(), u64::MAX);
}

#[test]
fn request_from_query_json() {
    let request: PageRequest =
        serde_json::from_value(json!({"pageNumber": -4, "pageSize": 500})).unwrap();
    assert_eq!(request.page_number(), 1);
    assert_eq!(request.page_size(), MAX_PAGE_SIZE);

    let request: PageRequest = serde_json::from_value(json!({})).unwrap();
    assert_eq!(request, PageRequest::default());

    let request: PageRequest = serde_json::from_value(json!({"pageSize": 20})).unwrap();
    assert_eq!(request.page_number(), 1);
    assert_eq!(request.page_size(), 20);
}

#[test]
fn reassignment_clamps_again() {
    let mut request = PageRequest::new(3, 10);
    request.set_page_size(51);
    assert_eq!(request.page_size(), 50);
    request.set_page_size(-1);
    assert_eq!(request.page_size(), 1);
    request.set_page_number(-7);
    assert_eq!(request.page_number(), 1);
}

// ============================================================================
// Page Slice Edge Cases
// ============================================================================

#[test]
fn empty_sequence_has_zero_pages() {
    let page: PageSlice<u64> = PageSlice::new(vec![], 0, 1, 10).unwrap();
    assert_eq!(page.total_pages(), 0);
    assert!(page.is_empty());
    assert!(!page.has_next());
    assert!(!page.has_previous());
}

#[test]
fn exact_multiple_of_page_size() {
    let page = PageSlice::new(vec![1, 2, 3, 4, 5], 50, 10, 5).unwrap();
    assert_eq!(page.total_pages(), 10);
    assert!(!page.has_next());
    assert!(page.has_previous());
}

#[test]
fn one_over_page_size_adds_a_page() {
    let page = PageSlice::new(vec![1], 51, 11, 5).unwrap();
    assert_eq!(page.total_pages(), 11);
}

#[test]
fn overfull_slice_is_rejected() {
    let result = PageSlice::new(vec![1, 2, 3], 3, 1, 2);
    assert_eq!(
        result,
        Err(Error::PageOverflow {
            len: 3,
            page_size: 2
        })
    );
}

#[test]
fn page_wire_shape() {
    let page = PageSlice::new(vec!["x"], 3, 2, 1).unwrap();
    let value = serde_json::to_value(&page).unwrap();
    assert_eq!(
        value,
        json!({
            "items": ["x"],
            "currentPage": 2,
            "pageSize": 1,
            "totalCount": 3,
            "totalPages": 3
        })
    );

    let header = serde_json::to_value(page.header()).unwrap();
    assert_eq!(
        header,
        json!({
            "currentPage": 2,
            "itemsPerPage": 1,
            "totalItems": 3,
            "totalPages": 3
        })
    );
}

// ============================================================================
// Paginator Edge Cases
// ============================================================================

#[tokio::test]
async fn page_past_the_end_is_empty_with_metadata() {
    let page = Paginator::new()
        .fetch_page(&numbers(12), &PageRequest::new(9, 5))
        .await
        .unwrap();

    assert!(page.is_empty());
    assert_eq!(page.current_page(), 9);
    assert_eq!(page.total_count(), 12);
    assert_eq!(page.total_pages(), 3);
}

#[tokio::test]
async fn last_partial_page() {
    let page = Paginator::new()
        .fetch_page(&numbers(12), &PageRequest::new(3, 5))
        .await
        .unwrap();

    assert_eq!(page.items(), &[11, 12]);
    assert!(!page.has_next());
}

#[tokio::test]
async fn pages_cover_sequence_exactly_once() {
    let source = numbers(103);
    let paginator = Paginator::new();
    let mut seen = Vec::new();

    let mut request = PageRequest::new(1, 50);
    loop {
        let page = paginator.fetch_page(&source, &request).await.unwrap();
        let has_next = page.has_next();
        seen.extend(page.into_items());
        if !has_next {
            break;
        }
        request.set_page_number(request.page_number() as i64 + 1);
    }

    assert_eq!(seen, (1..=103).collect::<Vec<_>>());
}

#[tokio::test]
async fn empty_source() {
    let page = Paginator::new()
        .fetch_page(&numbers(0), &PageRequest::default())
        .await
        .unwrap();

    assert!(page.is_empty());
    assert_eq!(page.total_pages(), 0);
}

// ============================================================================
// Date Edge Cases
// ============================================================================

#[test]
fn dates_with_offsets_and_fractions() {
    let mut cache = EntityCache::new();
    cache.upsert(activity("a", "2024-06-01T23:59:59.999+02:00"));
    cache.upsert(activity("b", "2024-06-01T00:00:00Z"));

    let groups = cache.grouped_by_date();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].date, "2024-06-01");
    assert_eq!(groups[0].entities.len(), 2);
}

#[test]
fn unparseable_dates_sort_last_and_group_by_text() {
    let mut cache = EntityCache::new();
    cache.upsert(activity("bad1", "someday"));
    cache.upsert(activity("good", "2024-01-01"));
    cache.upsert(activity("bad2", "someday"));
    cache.upsert(activity("empty", ""));

    let ids: Vec<&str> = cache.by_date().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids[0], "good");

    let groups = cache.grouped_by_date();
    assert_eq!(groups[0].date, "2024-01-01");
    let someday = groups.iter().find(|g| g.date == "someday").unwrap();
    assert_eq!(someday.entities.len(), 2);
}

#[test]
fn year_boundaries_sort_chronologically() {
    let mut cache = EntityCache::new();
    cache.upsert(activity("c", "2025-01-01"));
    cache.upsert(activity("a", "2023-12-31"));
    cache.upsert(activity("b", "2024-02-29"));

    let ids: Vec<&str> = cache.by_date().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

// ============================================================================
// Cache Edge Cases
// ============================================================================

#[test]
fn ids_with_special_characters() {
    let mut cache = EntityCache::new();
    let ids = ["", " ", "a/b", "ünïcødé", "🎉", "id with spaces"];

    for id in ids {
        cache.upsert(activity(id, "2024-01-01"));
    }

    assert_eq!(cache.len(), ids.len());
    for id in ids {
        assert!(cache.contains(id), "missing {:?}", id);
    }
}

#[test]
fn remove_middle_keeps_lookup_consistent() {
    let mut cache = EntityCache::new();
    for i in 0..100 {
        cache.upsert(activity(&format!("a{}", i), "2024-01-01"));
    }

    for i in (0..100).step_by(3) {
        cache.remove(&format!("a{}", i));
    }

    for i in 0..100 {
        let id = format!("a{}", i);
        match cache.get(&id) {
            Some(found) => assert_eq!(found.id, id),
            None => assert_eq!(i % 3, 0),
        }
    }
}

#[test]
fn rapid_updates_same_entity() {
    let mut cache = EntityCache::new();
    let mut sequencer = Sequencer::new();

    for i in 0..1000 {
        let mut a = activity("a", "2024-01-01");
        a.title = format!("v{}", i);
        assert!(cache.apply_upsert(a, sequencer.issue()));
    }

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("a").unwrap().title, "v999");
    assert_eq!(cache.stamp("a"), Some(sequencer.last()));
}

#[test]
fn stale_results_applied_in_reverse_order() {
    let mut cache = EntityCache::new();
    let mut sequencer = Sequencer::new();
    let tokens: Vec<OpToken> = (0..10).map(|_| sequencer.issue()).collect();

    // Completions arrive newest first; only the first applies
    let applied: Vec<bool> = tokens
        .iter()
        .rev()
        .map(|&token| {
            let mut a = activity("a", "2024-01-01");
            a.title = token.to_string();
            cache.apply_upsert(a, token)
        })
        .collect();

    assert!(applied[0]);
    assert!(applied[1..].iter().all(|&a| !a));
    assert_eq!(cache.get("a").unwrap().title, tokens[9].to_string());
}

#[test]
fn stale_upsert_cannot_resurrect_removed_entity() {
    let mut cache = EntityCache::new();
    let mut sequencer = Sequencer::new();
    let load = sequencer.issue();
    let update = sequencer.issue();
    let delete = sequencer.issue();

    cache.apply_upsert(activity("a", "2024-01-01"), load);
    assert!(cache.apply_remove("a", delete));
    assert!(!cache.apply_upsert(activity("a", "2024-01-02"), update));
    assert!(cache.get("a").is_none());
}

#[test]
fn restore_after_later_operation_is_skipped() {
    let mut cache = EntityCache::new();
    let mut sequencer = Sequencer::new();

    let create = sequencer.issue();
    let checkpoint = cache.checkpoint("a");
    cache.apply_upsert(activity("a", "2024-01-01"), create);

    let update = sequencer.issue();
    let mut updated = activity("a", "2024-01-01");
    updated.title = "Updated".into();
    cache.apply_upsert(updated, update);

    assert!(!cache.restore(checkpoint, create));
    assert_eq!(cache.get("a").unwrap().title, "Updated");
}

#[test]
fn activity_json_accepts_missing_descriptive_fields() {
    let a: Activity = serde_json::from_value(json!({
        "id": "a",
        "title": "Walk",
        "date": "2024-01-01T09:00:00"
    }))
    .unwrap();

    assert_eq!(a.description, "");
    assert_eq!(a.venue, "");

    let mut cache = EntityCache::new();
    cache.upsert(a);
    assert_eq!(cache.get("a").unwrap().date, "2024-01-01");
}
