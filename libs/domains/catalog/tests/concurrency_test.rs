//! Concurrent writers against one catalog.
//!
//! The service takes no locks, so these pin down what the repository
//! contract guarantees: one winner per version, one winner per SKU.

use domain_catalog::*;
use futures_util::future::join_all;
use rust_decimal::Decimal;
use std::sync::Arc;

fn create_request(sku: &str, name: &str) -> CreateProductRequest {
    CreateProductRequest {
        sku: sku.to_string(),
        name: name.to_string(),
        description: None,
        price: Decimal::new(999, 2),
        stock: Some(1),
        category: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_sku_created_concurrently_has_one_winner() {
    let service = CatalogService::new(InMemoryProductRepository::new(), CatalogConfig::default());

    let attempts = (0..8).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .create_product(create_request("SKU-RACE", &format!("Racer {i}")))
                .await
        })
    });

    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(ProductError::DuplicateSku(sku)) if sku == "SKU-RACE"))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(duplicates, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_writes_against_same_version_have_one_winner() {
    let repo = Arc::new(InMemoryProductRepository::new());
    let saved = repo
        .save(ProductRecord {
            sku: "SKU-1".to_string(),
            name: "Juice".to_string(),
            price: Decimal::ONE,
            ..Default::default()
        })
        .await
        .unwrap();

    let writers = (0..2).map(|i| {
        let repo = Arc::clone(&repo);
        let mut candidate = saved.clone();
        candidate.name = format!("Writer {i}");
        tokio::spawn(async move { repo.save(candidate).await })
    });

    let results: Vec<_> = join_all(writers)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(ProductError::VersionConflict(_))))
            .count(),
        1
    );

    let stored = repo.find_by_id(saved.id.as_ref().unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.version, Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_never_lose_a_write_silently() {
    let service = CatalogService::new(InMemoryProductRepository::new(), CatalogConfig::default());
    let created = service
        .create_product(create_request("SKU-1", "Juice"))
        .await
        .unwrap();
    let id = ProductId::new(created.id);

    let updates = (1..=16).map(|i| {
        let service = service.clone();
        let id = id.clone();
        tokio::spawn(async move {
            service
                .update_product(
                    &id,
                    UpdateProductRequest {
                        price: Some(Decimal::new(i * 100, 2)),
                        ..Default::default()
                    },
                )
                .await
        })
    });

    let results: Vec<_> = join_all(updates)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    // Every attempt either landed or was told it lost the race.
    for result in &results {
        assert!(matches!(result, Ok(_) | Err(ProductError::VersionConflict(_))));
    }
    let landed: Vec<_> = results.into_iter().filter_map(Result::ok).collect();
    assert!(!landed.is_empty());

    let current = service.get_product(&id).await.unwrap();
    assert!(landed.iter().any(|p| p.price == current.price));
}
