// tests/propagation_tests.rs

mod common;

use common::assert_xssed_never_active;
use liveknoxss_rs::adapters::storage::MemoryStorage;
use liveknoxss_rs::core::domain::LabelCount;
use liveknoxss_rs::core::models::DomainPatch;
use liveknoxss_rs::core::propagation::{is_subdomain_of, propagate};
use liveknoxss_rs::core::store::StateStore;
use std::sync::Arc;

async fn store_with(domains: &[&str]) -> (StateStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::default());
    let mut store = StateStore::new(storage.clone(), Arc::new(LabelCount));
    for domain in domains {
        store.get_or_create(domain).await.unwrap();
    }
    (store, storage)
}

#[tokio::test]
async fn activating_a_parent_activates_its_subdomains_only() {
    let (mut store, storage) =
        store_with(&["example.com", "shop.example.com", "a.b.example.com", "other.org", "shop.other.org"]).await;
    store.merge("example.com", DomainPatch::active(true)).await.unwrap();

    let mut touched = propagate(&mut store, "example.com").await.unwrap();
    touched.sort();
    assert_eq!(touched, vec!["a.b.example.com".to_string(), "shop.example.com".to_string()]);

    assert!(store.get("shop.example.com").unwrap().active);
    assert!(store.get("a.b.example.com").unwrap().active);
    assert!(!store.get("shop.other.org").unwrap().active);
    assert!(!store.get("other.org").unwrap().active);
    assert!(storage.current().domain_state["shop.example.com"].active);
}

#[tokio::test]
async fn disabling_subdomain_handling_deactivates_children() {
    let (mut store, _) = store_with(&["example.com", "shop.example.com"]).await;
    store.merge("example.com", DomainPatch::active(true)).await.unwrap();
    propagate(&mut store, "example.com").await.unwrap();

    store.merge("example.com", DomainPatch::handle_subdomains(false)).await.unwrap();
    propagate(&mut store, "example.com").await.unwrap();

    assert!(store.get("example.com").unwrap().active);
    assert!(!store.get("shop.example.com").unwrap().active);
}

#[tokio::test]
async fn reactivation_clears_a_childs_finding_flag() {
    let (mut store, storage) = store_with(&["example.com", "shop.example.com"]).await;
    store
        .merge(
            "shop.example.com",
            DomainPatch { xssed: Some(true), urls: Some(vec!["https://shop.example.com/?q=x".into()]), ..Default::default() },
        )
        .await
        .unwrap();

    store.merge("example.com", DomainPatch::active(true)).await.unwrap();
    propagate(&mut store, "example.com").await.unwrap();

    let child = store.get("shop.example.com").unwrap();
    assert!(child.active);
    assert!(!child.xssed);
    assert_eq!(child.urls.len(), 1);
    assert_xssed_never_active(&storage.current());
}

#[tokio::test]
async fn propagating_from_a_subdomain_is_a_no_op() {
    let (mut store, _) = store_with(&["example.com", "shop.example.com", "x.shop.example.com"]).await;
    store.merge("shop.example.com", DomainPatch::active(true)).await.unwrap();
    let touched = propagate(&mut store, "shop.example.com").await.unwrap();
    assert!(touched.is_empty());
    assert!(!store.get("x.shop.example.com").unwrap().active);
}

#[tokio::test]
async fn propagating_creates_a_missing_parent() {
    let (mut store, _) = store_with(&["shop.example.com"]).await;
    propagate(&mut store, "example.com").await.unwrap();
    assert!(store.has("example.com"));
}

#[tokio::test]
async fn subdomain_relation_requires_matching_parent() {
    let (store, _) = store_with(&["example.com", "shop.example.com", "shop.other.org"]).await;
    let parent = store.get("example.com").unwrap();
    assert!(is_subdomain_of("example.com", parent, store.get("shop.example.com").unwrap()));
    assert!(!is_subdomain_of("example.com", parent, store.get("shop.other.org").unwrap()));
    assert!(!is_subdomain_of("example.com", parent, parent));
}
