//! Behavioural tests for the depth-aware node cache.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use framecache_core::tree::subtree_depth;
use framecache_core::{CacheKey, FileMeta, Node, Snapshot};
use framecache_store::{FileMetaSource, NodeCache};
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Metadata source that always reports the same marker and counts calls.
struct FixedMeta {
    marker: Option<String>,
    calls: AtomicUsize,
}

impl FixedMeta {
    fn touched(marker: &str) -> Self {
        Self {
            marker: Some(marker.to_owned()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FileMetaSource for FixedMeta {
    type Error = String;

    async fn file_meta(&self, _file_key: &str) -> Result<FileMeta, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FileMeta {
            last_touched_at: self.marker.clone(),
            ..FileMeta::default()
        })
    }
}

/// Metadata source whose fetch always fails.
struct BrokenMeta {
    seen: Mutex<Vec<String>>,
}

impl FileMetaSource for BrokenMeta {
    type Error = String;

    async fn file_meta(&self, file_key: &str) -> Result<FileMeta, Self::Error> {
        self.seen.lock().unwrap().push(file_key.to_owned());
        Err("timed out".into())
    }
}

/// Metadata source that stores a newer snapshot while answering, as a
/// concurrent fetch completing mid-validation would.
struct RefreshingMeta<'a> {
    cache: &'a NodeCache,
    key: CacheKey,
}

impl FileMetaSource for RefreshingMeta<'_> {
    type Error = String;

    async fn file_meta(&self, _file_key: &str) -> Result<FileMeta, Self::Error> {
        let mut newer = snapshot(vec![Node::new("9:9", "redesign", "CANVAS")]);
        newer.last_modified = "T2".into();
        self.cache.put(self.key.clone(), newer, "T2");
        Ok(FileMeta::touched_at("T2"))
    }
}

fn cache(capacity: usize) -> NodeCache {
    NodeCache::new(NonZeroUsize::new(capacity).unwrap())
}

fn snapshot(nodes: Vec<Node>) -> Snapshot {
    Snapshot {
        name: "Marketing site".into(),
        last_modified: "2024-05-01T10:00:00Z".into(),
        thumbnail_url: "https://example.invalid/t.png".into(),
        nodes,
        ..Snapshot::default()
    }
}

/// Three-level source tree:
/// page(1:1) -> frame(2:1) -> group(3:1) -> text(4:1, no children)
fn full_tree() -> Node {
    Node::new("1:1", "page", "CANVAS").with_children(vec![
        Node::new("2:1", "frame", "FRAME").with_children(vec![
            Node::new("3:1", "group", "GROUP")
                .with_children(vec![Node::new("4:1", "label", "TEXT").with_children(Vec::new())]),
        ]),
        Node::new("2:2", "divider", "LINE").with_children(Vec::new()),
    ])
}

#[test]
fn inserting_past_capacity_evicts_least_recently_touched() {
    let cache = cache(2);
    let a = CacheKey::file("a", None);
    let b = CacheKey::file("b", None);
    let c = CacheKey::file("c", None);

    cache.put(a.clone(), snapshot(Vec::new()), "");
    cache.put(b.clone(), snapshot(Vec::new()), "");
    assert!(cache.get(&a).is_some());
    cache.put(c.clone(), snapshot(Vec::new()), "");

    assert!(cache.has(&a));
    assert!(!cache.has(&b));
    assert!(cache.has(&c));
    assert_eq!(cache.len(), 2);
}

#[test]
fn unbounded_query_rejects_possibly_truncated_subtrees() {
    // Fetched with depth=1: page plus its direct children, grandchildren cut off.
    let shallow = Node::new("1:1", "page", "CANVAS").with_children(vec![
        Node::new("2:1", "frame", "FRAME"),
        Node::new("2:2", "divider", "LINE").with_children(Vec::new()),
    ]);
    let lonely = Node::new("1:9", "blank page", "CANVAS").with_children(Vec::new());
    let cache = cache(4);
    cache.put(CacheKey::file("f1", Some(1)), snapshot(vec![shallow, lonely]), "");

    assert_eq!(cache.find_node_data("f1", "1:1", None), None);
    assert_eq!(cache.find_node_data("f1", "2:1", None), None);
    assert_eq!(cache.find_node_data("f1", "2:2", None), None);

    let found = cache.find_node_data("f1", "1:9", None).expect("fully captured");
    assert_eq!(found.children, Some(Vec::new()));
}

#[test]
fn unbounded_query_on_unbounded_snapshot_returns_whole_subtree() {
    let cache = cache(4);
    cache.put(CacheKey::file("f1", None), snapshot(vec![full_tree()]), "");

    let frame = cache.find_node_data("f1", "2:1", None).expect("cached");
    assert_eq!(subtree_depth(&frame), 2);
}

#[test]
fn bounded_query_is_truncated_to_requested_depth() {
    let cache = cache(4);
    let two_levels = Node::new("1:1", "page", "CANVAS").with_children(vec![
        Node::new("2:1", "frame", "FRAME").with_children(vec![Node::new("3:1", "group", "GROUP")]),
    ]);
    cache.put(CacheKey::file("f1", Some(2)), snapshot(vec![two_levels]), "");

    for required in 0..=2 {
        let page = cache.find_node_data("f1", "1:1", Some(required)).expect("depth satisfied");
        assert_eq!(subtree_depth(&page), required);
        // Permissive rule: the snapshot is 2 deep, so even the leaf qualifies.
        assert!(cache.find_node_data("f1", "3:1", Some(required)).is_some());
    }
    let cut = cache.find_node_data("f1", "1:1", Some(0)).expect("cached");
    assert_eq!(cut.children, None);
    assert_eq!(cache.find_node_data("f1", "1:1", Some(3)), None);
}

#[test]
fn returned_nodes_are_independent_copies() {
    let cache = cache(4);
    let key = CacheKey::file("f1", None);
    cache.put(key.clone(), snapshot(vec![full_tree()]), "");

    let mut node = cache.find_node_data("f1", "1:1", Some(1)).expect("cached");
    node.name = "mutated".into();
    node.children = None;

    let stored = cache.get(&key).expect("still cached");
    assert_eq!(stored.nodes[0].name, "page");
    assert_eq!(stored.nodes[0], full_tree());
}

#[tokio::test]
async fn changed_marker_invalidates_on_get() {
    let cache = cache(4);
    let key = CacheKey::file("f1", None);
    cache.put(key.clone(), snapshot(vec![full_tree()]), "T1");

    let meta = FixedMeta::touched("T2");
    assert!(cache.get_validated(&key, &meta).await.is_none());
    assert!(!cache.has(&key));
    assert_eq!(meta.calls(), 1);
}

#[tokio::test]
async fn stale_get_keeps_entry_replaced_during_validation() {
    let cache = cache(4);
    let key = CacheKey::file("f1", None);
    cache.put(key.clone(), snapshot(vec![full_tree()]), "T1");

    let meta = RefreshingMeta {
        cache: &cache,
        key: key.clone(),
    };
    assert!(cache.get_validated(&key, &meta).await.is_none());

    let current = cache.get(&key).expect("replacement survives");
    assert_eq!(current.nodes[0].id, "9:9");
    assert_eq!(current.last_modified, "T2");
}

#[tokio::test]
async fn matching_marker_keeps_entry() {
    let cache = cache(4);
    let key = CacheKey::file("f1", None);
    cache.put(key.clone(), snapshot(vec![full_tree()]), "T1");

    let meta = FixedMeta::touched("T1");
    assert!(cache.get_validated(&key, &meta).await.is_some());
    assert!(cache.has(&key));
}

#[tokio::test]
async fn empty_marker_passes_through_without_remote_call() {
    let cache = cache(4);
    let key = CacheKey::file("f1", None);
    cache.put(key.clone(), snapshot(vec![full_tree()]), "");

    let meta = FixedMeta::touched("anything");
    let hit = cache.get_validated(&key, &meta).await.expect("fresh");
    assert_eq!(hit.nodes[0].id, "1:1");
    assert_eq!(meta.calls(), 0);
}

#[tokio::test]
async fn failed_validation_fetch_keeps_serving() {
    let cache = cache(4);
    let key = CacheKey::file("f1", None);
    cache.put(key.clone(), snapshot(vec![full_tree()]), "T1");

    let meta = BrokenMeta {
        seen: Mutex::new(Vec::new()),
    };
    assert!(cache.get_validated(&key, &meta).await.is_some());
    assert!(
        cache
            .find_node_data_validated("f1", "2:1", None, &meta)
            .await
            .is_some()
    );
    assert_eq!(*meta.seen.lock().unwrap(), vec!["f1".to_owned(), "f1".to_owned()]);
}

#[tokio::test]
async fn stale_node_hit_clears_every_view_of_the_file() {
    let cache = cache(8);
    let whole = CacheKey::file("f1", None);
    let part = CacheKey::nodes("f1", ["2:1"], Some(1));
    let other = CacheKey::file("f2", None);
    cache.put(whole.clone(), snapshot(vec![full_tree()]), "T1");
    cache.put(part.clone(), snapshot(vec![Node::new("2:1", "frame", "FRAME")]), "T1");
    cache.put(other.clone(), snapshot(vec![full_tree()]), "T1");

    let meta = FixedMeta::touched("T2");
    let found = cache.find_node_data_validated("f1", "1:1", None, &meta).await;

    assert!(found.is_none());
    assert!(!cache.has(&whole));
    assert!(!cache.has(&part));
    assert!(cache.has(&other));
}

#[test]
fn multi_node_lookup_splits_hits_and_misses() {
    let cache = cache(4);
    let deep = Node::new("1:1", "page", "CANVAS").with_children(vec![
        Node::new("2:1", "card", "FRAME").with_children(vec![
            Node::new("3:1", "body", "FRAME").with_children(vec![Node::new("4:1", "copy", "TEXT")]),
        ]),
    ]);
    // A shallow node-only snapshot for B: realized depth 0.
    let shallow = Node::new("9:1", "badge", "INSTANCE");
    cache.put(CacheKey::nodes("f1", ["1:1"], None), snapshot(vec![deep]), "");
    cache.put(CacheKey::nodes("f2", ["9:1"], Some(0)), snapshot(vec![shallow.clone()]), "");
    cache.put(CacheKey::nodes("f1", ["9:1"], Some(0)), snapshot(vec![shallow]), "");

    let ids = vec!["2:1".to_owned(), "9:1".to_owned()];
    let lookup = cache.find_multiple_nodes("f1", &ids, Some(2));

    assert_eq!(lookup.hits.len(), 1);
    assert_eq!(lookup.hits[0].id, "2:1");
    assert_eq!(subtree_depth(&lookup.hits[0]), 2);
    assert_eq!(lookup.misses, vec!["9:1".to_owned()]);
    assert!(!lookup.is_complete());
    let source = lookup.source.expect("first hit supplies metadata");
    assert_eq!(source.nodes[0].id, "1:1");
}

#[test]
fn multi_node_lookup_keeps_request_order() {
    let cache = cache(4);
    cache.put(CacheKey::file("f1", None), snapshot(vec![full_tree()]), "");

    let ids = vec!["4:1".to_owned(), "missing".to_owned(), "2:2".to_owned(), "1:1".to_owned()];
    let lookup = cache.find_multiple_nodes("f1", &ids, None);

    let hit_ids: Vec<_> = lookup.hits.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(hit_ids, vec!["4:1", "2:2", "1:1"]);
    assert_eq!(lookup.misses, vec!["missing".to_owned()]);
}

#[test]
fn empty_multi_node_query_has_no_source() {
    let cache = cache(4);
    cache.put(CacheKey::file("f1", None), snapshot(vec![full_tree()]), "");

    let lookup = cache.find_multiple_nodes("f1", &[], Some(1));
    assert!(lookup.hits.is_empty());
    assert!(lookup.misses.is_empty());
    assert!(lookup.source.is_none());
}

#[tokio::test]
async fn validated_multi_lookup_treats_stale_file_as_misses() {
    let cache = cache(4);
    cache.put(CacheKey::file("f1", None), snapshot(vec![full_tree()]), "T1");

    let meta = FixedMeta::touched("T2");
    let ids = vec!["2:1".to_owned(), "2:2".to_owned()];
    let lookup = cache.find_multiple_nodes_validated("f1", &ids, None, &meta).await;

    assert!(lookup.hits.is_empty());
    assert_eq!(lookup.misses, ids);
    assert!(lookup.source.is_none());
    assert!(cache.is_empty());
}

#[test]
fn merge_reuses_source_metadata() {
    let source = snapshot(vec![full_tree()]);
    let merged = NodeCache::merge_nodes_as_design(&source, vec![Node::new("2:2", "divider", "LINE")]);

    assert_eq!(merged.name, source.name);
    assert_eq!(merged.last_modified, source.last_modified);
    assert_eq!(merged.thumbnail_url, source.thumbnail_url);
    assert_eq!(merged.nodes.len(), 1);
    assert_eq!(merged.nodes[0].id, "2:2");
}

#[test]
fn clearing_is_scoped_by_file_prefix() {
    let cache = cache(8);
    let keys = [
        CacheKey::file("f1", None),
        CacheKey::nodes("f1", ["1:1", "2:1"], Some(3)),
        CacheKey::file("f10", None),
        CacheKey::file("f2", Some(1)),
    ];
    for key in &keys {
        cache.put(key.clone(), snapshot(Vec::new()), "");
    }

    assert_eq!(cache.clear_file_cache("f1"), 2);
    assert!(!cache.has(&keys[0]));
    assert!(!cache.has(&keys[1]));
    assert!(cache.has(&keys[2]));
    assert!(cache.has(&keys[3]));

    cache.clear_all_cache();
    assert!(cache.is_empty());
}
