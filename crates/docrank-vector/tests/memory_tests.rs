use docrank_core::traits::VectorIndex;
use docrank_core::types::SourceKind;
use docrank_vector::MemoryVectorIndex;

#[test]
fn search_orders_by_cosine_then_upsert_order() {
    let index = MemoryVectorIndex::new();
    index.upsert("far", &[0.0, 1.0]).unwrap();
    index.upsert("near-b", &[1.0, 0.1]).unwrap();
    index.upsert("near-a", &[1.0, 0.1]).unwrap();
    index.upsert("exact", &[2.0, 0.0]).unwrap();

    let hits = index.search(&[1.0, 0.0], 3).unwrap();
    let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["exact", "near-b", "near-a"]);
    assert!((hits[0].score - 1.0).abs() < 1e-6);
    assert!(hits.iter().all(|h| h.source == SourceKind::Vector));
}

#[test]
fn upsert_replaces_and_delete_removes() {
    let index = MemoryVectorIndex::new();
    index.upsert("a", &[1.0, 0.0]).unwrap();
    index.upsert("a", &[0.0, 1.0]).unwrap();
    assert_eq!(index.len(), 1);
    assert!((index.search(&[0.0, 1.0], 1).unwrap()[0].score - 1.0).abs() < 1e-6);

    index.upsert("b", &[1.0, 1.0]).unwrap();
    index.delete(&["a".to_string(), "missing".to_string()]).unwrap();
    assert!(!index.contains("a"));
    assert_eq!(index.len(), 1);

    index.delete_all().unwrap();
    assert!(index.is_empty());
    assert!(index.search(&[1.0, 0.0], 5).unwrap().is_empty());
}

#[test]
fn dimension_mismatch_is_an_error() {
    let index = MemoryVectorIndex::new();
    index.upsert("a", &[1.0, 0.0, 0.0]).unwrap();
    assert!(index.upsert("b", &[1.0, 0.0]).is_err());
    assert!(index.search(&[1.0], 3).is_err());
    // an emptied index accepts a new dimension
    index.delete_all().unwrap();
    index.upsert("b", &[1.0, 0.0]).unwrap();
}
