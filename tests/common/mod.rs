// Fixtures and backend-independent scenarios shared by the adapter suites.
#![allow(dead_code)]

use equity::{
    Address, AssetEquity, BigUint, EquityDao, EquityError, EquityKey, EquityStore, Hash, Page,
    StoredEquity,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn owner() -> Address {
    "0x01234".parse().unwrap()
}

pub fn other_owner() -> Address {
    "0x05678".parse().unwrap()
}

pub fn code() -> Hash {
    "0x0abcd".parse().unwrap()
}

pub fn other_code() -> Hash {
    "0x0ef01".parse().unwrap()
}

/// Twenty asset ids whose hex form sorts in the same order they are listed.
pub fn batch20() -> Vec<Hash> {
    [
        "0x023456789",
        "0x123456789",
        "0x223456789",
        "0x323456789",
        "0x423456789",
        "0x523456789",
        "0x623456789",
        "0x723456789",
        "0x823456789",
        "0x923456789",
        "0x1023456789",
        "0x1123456789",
        "0x1223456789",
        "0x1323456789",
        "0x1423456789",
        "0x1523456789",
        "0x1623456789",
        "0x1723456789",
        "0x1823456789",
        "0x1923456789",
    ]
    .iter()
    .map(|raw| raw.parse().unwrap())
    .collect()
}

pub fn holding(id: Hash, amount: u64) -> AssetEquity {
    AssetEquity::new(code(), id, amount)
}

/// Writes the twenty-position fixture for `owner()` and returns it in write order.
pub async fn seed_twenty(dao: &EquityDao) -> Vec<AssetEquity> {
    let mut written = Vec::new();
    for (i, id) in batch20().into_iter().enumerate() {
        let position = holding(id, 1_000 + i as u64);
        dao.set(&owner(), &position).await.unwrap();
        written.push(position);
    }
    written
}

pub async fn stored_version(dao: &EquityDao, owner: &Address, asset_id: &Hash) -> i64 {
    dao.store()
        .find(&EquityKey {
            owner: *owner,
            asset_id: *asset_id,
        })
        .await
        .unwrap()
        .unwrap()
        .version
}

pub mod scenarios {
    use super::*;

    fn invalid<T>(result: &Result<T, EquityError>) -> bool {
        matches!(result, Err(EquityError::InvalidArgument(_)))
    }

    pub async fn create_then_read(dao: &EquityDao) {
        let id = batch20()[0];
        let position = holding(id, 100);

        dao.set(&owner(), &position).await.unwrap();

        let read = dao.get(&owner(), &id).await.unwrap();
        assert_eq!(read, position);
        assert_eq!(stored_version(dao, &owner(), &id).await, 1);
    }

    pub async fn re_set_replaces_balance(dao: &EquityDao) {
        let id = batch20()[1];

        dao.set(&owner(), &holding(id, 100)).await.unwrap();
        dao.set(&owner(), &holding(id, 100)).await.unwrap();
        dao.set(&owner(), &holding(id, 250)).await.unwrap();

        let read = dao.get(&owner(), &id).await.unwrap();
        assert_eq!(read.equity, BigUint::from(250u32));
        assert_eq!(stored_version(dao, &owner(), &id).await, 3);
    }

    pub async fn stale_version_is_rejected(dao: &EquityDao) {
        let id = batch20()[2];
        let key = EquityKey {
            owner: owner(),
            asset_id: id,
        };
        dao.set(&owner(), &holding(id, 10)).await.unwrap();

        assert_eq!(dao.store().try_advance(&key, 1, "11").await.unwrap(), 1);
        assert_eq!(dao.store().try_advance(&key, 1, "12").await.unwrap(), 0);

        let read = dao.get(&owner(), &id).await.unwrap();
        assert_eq!(read.equity, BigUint::from(11u32));
        assert_eq!(stored_version(dao, &owner(), &id).await, 2);

        // a fresh read sees version 2, so the next set goes through
        dao.set(&owner(), &holding(id, 13)).await.unwrap();
        assert_eq!(stored_version(dao, &owner(), &id).await, 3);
    }

    pub async fn duplicate_insert_reports_zero_rows(dao: &EquityDao) {
        let id = batch20()[3];
        dao.set(&owner(), &holding(id, 1)).await.unwrap();

        let duplicate = StoredEquity {
            owner: owner(),
            asset_code: code(),
            asset_id: id,
            equity: "2".to_string(),
            created_at: 0,
            version: 1,
        };
        assert_eq!(dao.store().try_insert(&duplicate).await.unwrap(), 0);
        assert_eq!(
            dao.get(&owner(), &id).await.unwrap().equity,
            BigUint::from(1u32)
        );
    }

    pub async fn unbounded_balance_round_trips(dao: &EquityDao) {
        let id = batch20()[4];
        let huge = BigUint::from(10u32).pow(60) + BigUint::from(123u32);
        let position = AssetEquity::new(code(), id, huge.clone());

        dao.set(&owner(), &position).await.unwrap();
        assert_eq!(dao.get(&owner(), &id).await.unwrap().equity, huge);

        let raw = dao
            .store()
            .find(&EquityKey {
                owner: owner(),
                asset_id: id,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw.equity, format!("1{}123", "0".repeat(57)));
    }

    pub async fn malformed_balance_surfaces(dao: &EquityDao) {
        let id = batch20()[5];
        let corrupt = StoredEquity {
            owner: owner(),
            asset_code: code(),
            asset_id: id,
            equity: "12.5".to_string(),
            created_at: 1,
            version: 1,
        };
        assert_eq!(dao.store().try_insert(&corrupt).await.unwrap(), 1);

        assert!(matches!(
            dao.get(&owner(), &id).await,
            Err(EquityError::MalformedNumber(ref raw)) if raw == "12.5"
        ));
        assert!(matches!(
            dao.set(&owner(), &holding(id, 1)).await,
            Err(EquityError::MalformedNumber(_))
        ));
        assert!(matches!(
            dao.get_page(&owner(), 0, 10).await,
            Err(EquityError::MalformedNumber(_))
        ));
    }

    pub async fn paging_boundaries(dao: &EquityDao) {
        let written = seed_twenty(dao).await;

        let first = dao.get_page(&owner(), 0, 5).await.unwrap();
        assert_eq!(first, written[..5].to_vec());

        let last = dao.get_page(&owner(), 15, 10).await.unwrap();
        assert_eq!(last, written[15..].to_vec());

        let past_end = dao.get_page(&owner(), 20, 1).await.unwrap();
        assert!(past_end.is_empty());
    }

    pub async fn page_with_total(dao: &EquityDao) {
        seed_twenty(dao).await;

        let page = dao.get_page_with_total(&owner(), 0, 5).await.unwrap();
        assert_eq!(page.total, 20);
        assert_eq!(page.items.len(), 5);

        let page = dao.get_page_with_total(&owner(), 20, 1).await.unwrap();
        assert_eq!(page.total, 20);
        assert!(page.items.is_empty());
    }

    pub async fn page_by_code(dao: &EquityDao) {
        let written = seed_twenty(dao).await;
        let foreign = AssetEquity::new(other_code(), batch20()[0], 7u32);
        dao.set(&other_owner(), &foreign).await.unwrap();

        let page = dao.get_page_by_code(&code(), 0, 5).await.unwrap();
        assert_eq!(page, written[..5].to_vec());
        assert!(dao.get_page_by_code(&code(), 20, 1).await.unwrap().is_empty());

        let page = dao.get_page_by_code_with_total(&code(), 0, 5).await.unwrap();
        assert_eq!(page.total, 20);
        assert_eq!(page.items.len(), 5);

        let page = dao
            .get_page_by_code_with_total(&other_code(), 0, 5)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items, vec![foreign]);
    }

    pub async fn page_by_owner_and_code(dao: &EquityDao) {
        let written = seed_twenty(dao).await;
        dao.set(&owner(), &AssetEquity::new(other_code(), "0x77".parse().unwrap(), 1u32))
            .await
            .unwrap();
        dao.set(&other_owner(), &holding(batch20()[0], 5))
            .await
            .unwrap();

        let page = dao
            .get_page_by_owner_and_code_with_total(&owner(), &code(), 18, 5)
            .await
            .unwrap();
        assert_eq!(page.total, 20);
        assert_eq!(page.items, written[18..].to_vec());

        let page = dao
            .get_page_by_owner_and_code(&other_owner(), &code(), 0, 5)
            .await
            .unwrap();
        assert_eq!(page, vec![holding(batch20()[0], 5)]);

        let mixed = dao.get_page_with_total(&owner(), 0, 50).await.unwrap();
        assert_eq!(mixed.total, 21);
    }

    pub async fn invalid_arguments(dao: &EquityDao) {
        let id = batch20()[0];

        assert!(invalid(&dao.get(&Address::ZERO, &id).await));
        assert!(invalid(&dao.get(&owner(), &Hash::ZERO).await));
        assert!(invalid(&dao.set(&Address::ZERO, &holding(id, 1)).await));
        assert!(invalid(&dao.set(&owner(), &holding(Hash::ZERO, 1)).await));

        assert!(invalid(&dao.get_page(&owner(), -1, 5).await));
        assert!(invalid(&dao.get_page(&owner(), 0, 0).await));
        assert!(invalid(&dao.get_page(&Address::ZERO, 0, 5).await));
        assert!(invalid(&dao.get_page_by_code(&code(), 0, -3).await));
        assert!(invalid(&dao.get_page_by_code(&Hash::ZERO, 0, 5).await));
        assert!(invalid(
            &dao.get_page_by_owner_and_code(&owner(), &Hash::ZERO, 0, 5)
                .await
        ));

        for result in [
            dao.get_page_with_total(&owner(), -1, 5).await,
            dao.get_page_with_total(&owner(), 0, 0).await,
            dao.get_page_with_total(&Address::ZERO, 0, 5).await,
            dao.get_page_by_code_with_total(&code(), -5, 5).await,
            dao.get_page_by_code_with_total(&Hash::ZERO, 0, 5).await,
            dao.get_page_by_owner_and_code_with_total(&Address::ZERO, &code(), 0, 5)
                .await,
        ] {
            assert!(invalid(&result));
            assert_eq!(Page::reported_total(&result), Page::UNKNOWN_TOTAL);
        }

        // nothing was written
        assert!(dao.get_page(&owner(), 0, 100).await.unwrap().is_empty());
    }

    pub async fn not_found_is_not_an_empty_page(dao: &EquityDao) {
        assert!(matches!(
            dao.get(&owner(), &batch20()[0]).await,
            Err(EquityError::NotFound)
        ));

        let page = dao.get_page(&owner(), 0, 5).await.unwrap();
        assert!(page.is_empty());

        let page = dao.get_page_with_total(&owner(), 0, 5).await.unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }
}
