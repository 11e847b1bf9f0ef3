//! Account service tests over the in-memory store and a real cache.

use std::sync::Arc;

use investa_shared::types::{AccountId, Money, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::AccountService;
use crate::account::{AccountDetail, AccountType, AccountUpdateRequest, InvestmentAccount, NewAccountRequest};
use crate::auth::NewUser;
use crate::cache::{AccountCache, CacheKey, CacheTtls, CachedValue, DisabledCache, MokaAccountCache};
use crate::ledger::{LedgerError, TransactionType};
use crate::policy::{AccountAccessPolicy, Principal};
use crate::reports::UserReport;
use crate::store::{LedgerStore, MemoryStore, UserStore};

struct Harness {
    store: Arc<MemoryStore>,
    cache: Arc<MokaAccountCache>,
    service: AccountService,
}

fn harness_with_policy(policy: AccountAccessPolicy) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MokaAccountCache::new(100));
    let service = AccountService::new(store.clone(), cache.clone(), policy, CacheTtls::default());
    Harness {
        store,
        cache,
        service,
    }
}

fn harness() -> Harness {
    harness_with_policy(AccountAccessPolicy::default())
}

async fn user(store: &MemoryStore, username: &str) -> Principal {
    let record = store
        .create_user(NewUser {
            username: username.to_string(),
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "hash".to_string(),
            is_staff: false,
        })
        .await
        .unwrap();
    Principal::user(record.id)
}

fn create_request(account_type: &str, balance: Decimal) -> NewAccountRequest {
    NewAccountRequest {
        name: Some("Portfolio".to_string()),
        description: Some("long term".to_string()),
        balance: Some(balance),
        account_type: Some(account_type.to_string()),
    }
}

fn delta(amount: Decimal) -> AccountUpdateRequest {
    AccountUpdateRequest {
        balance: Some(amount),
        ..Default::default()
    }
}

/// Inserts an account of any type directly, bypassing the create policy.
async fn seed_account(
    store: &MemoryStore,
    owner: UserId,
    account_type: AccountType,
    balance: Decimal,
) -> InvestmentAccount {
    let account = InvestmentAccount {
        id: AccountId::new(),
        name: "Seeded".to_string(),
        description: None,
        balance: Money::new(balance).unwrap(),
        account_type,
        owner_id: owner,
    };
    store.insert_account(&account, None).await.unwrap()
}

#[tokio::test]
async fn test_create_with_opening_deposit() {
    let h = harness();
    let alice = user(&h.store, "alice").await;

    let account = h
        .service
        .create(&alice, create_request("ACC2", dec!(500)))
        .await
        .unwrap();

    assert_eq!(account.balance.to_string(), "500.00");
    assert_eq!(account.owner_id, alice.user_id);

    let detail = h.service.read(&alice, account.id).await.unwrap();
    assert_eq!(detail.transactions.len(), 1);
    assert_eq!(detail.transactions[0].transaction_type, TransactionType::Deposit);
    assert_eq!(detail.transactions[0].amount.amount(), dec!(500));
}

#[tokio::test]
async fn test_create_acc3_allowed_but_not_readable() {
    let h = harness();
    let alice = user(&h.store, "alice").await;

    let account = h
        .service
        .create(&alice, create_request("ACC3", dec!(0)))
        .await
        .unwrap();
    assert_eq!(account.account_type, AccountType::Type3);
    assert_eq!(h.store.transaction_count().await, 0);

    assert_eq!(
        h.service.read(&alice, account.id).await.unwrap_err(),
        LedgerError::permission_denied()
    );
}

#[tokio::test]
async fn test_create_denied_for_acc1_unknown_and_missing_type() {
    let h = harness();
    let alice = user(&h.store, "alice").await;

    for raw in [Some("ACC1"), Some("BOGUS"), None] {
        let request = NewAccountRequest {
            account_type: raw.map(str::to_string),
            ..create_request("ACC2", dec!(10))
        };
        let err = h.service.create(&alice, request).await.unwrap_err();
        assert_eq!(err, LedgerError::permission_denied());
    }
    assert!(h.store.accounts_for_owner(alice.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_denial_precedes_validation() {
    let h = harness();
    let alice = user(&h.store, "alice").await;
    let request = NewAccountRequest {
        name: None,
        balance: Some(dec!(-1)),
        account_type: Some("ACC1".to_string()),
        description: None,
    };
    assert_eq!(
        h.service.create(&alice, request).await.unwrap_err(),
        LedgerError::permission_denied()
    );
}

#[tokio::test]
async fn test_create_negative_balance() {
    let h = harness();
    let alice = user(&h.store, "alice").await;
    assert_eq!(
        h.service
            .create(&alice, create_request("ACC2", dec!(-50)))
            .await
            .unwrap_err(),
        LedgerError::InvalidBalance(dec!(-50))
    );
}

#[tokio::test]
async fn test_withdrawal_updates_balance_and_history() {
    let h = harness();
    let alice = user(&h.store, "alice").await;
    let account = h
        .service
        .create(&alice, create_request("ACC2", dec!(1000)))
        .await
        .unwrap();

    let updated = h
        .service
        .update(&alice, account.id, delta(dec!(-200)))
        .await
        .unwrap();
    assert_eq!(updated.balance.to_string(), "800.00");

    let detail = h.service.read(&alice, account.id).await.unwrap();
    assert_eq!(detail.transactions.len(), 2);
    let newest = &detail.transactions[0];
    assert_eq!(newest.transaction_type, TransactionType::Withdrawal);
    assert_eq!(newest.amount.to_string(), "-200.00");
    assert_eq!(newest.transaction_by, alice.user_id);
}

#[tokio::test]
async fn test_overdraw_rejected_without_side_effects() {
    let h = harness();
    let alice = user(&h.store, "alice").await;
    let account = h
        .service
        .create(&alice, create_request("ACC2", dec!(100)))
        .await
        .unwrap();

    let err = h
        .service
        .update(&alice, account.id, delta(dec!(-150)))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_FUNDS");

    let stored = h.store.find_account(account.id).await.unwrap().unwrap();
    assert_eq!(stored.balance.to_string(), "100.00");
    assert_eq!(h.store.transaction_count().await, 1);
}

#[tokio::test]
async fn test_update_denied_for_view_only_account() {
    let h = harness();
    let alice = user(&h.store, "alice").await;
    let account = seed_account(&h.store, alice.user_id, AccountType::Type1, dec!(10)).await;

    assert!(h.service.read(&alice, account.id).await.is_ok());
    assert_eq!(
        h.service
            .update(&alice, account.id, delta(dec!(5)))
            .await
            .unwrap_err(),
        LedgerError::permission_denied()
    );
    assert_eq!(
        h.service.delete(&alice, account.id).await.unwrap_err(),
        LedgerError::permission_denied()
    );
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let h = harness();
    let alice = user(&h.store, "alice").await;
    let missing = AccountId::new();

    assert_eq!(
        h.service.read(&alice, missing).await.unwrap_err().http_status_code(),
        404
    );
    assert_eq!(
        h.service
            .update(&alice, missing, delta(dec!(1)))
            .await
            .unwrap_err()
            .http_status_code(),
        404
    );
    assert_eq!(
        h.service.delete(&alice, missing).await.unwrap_err().http_status_code(),
        404
    );
}

fn placeholder_report() -> CachedValue {
    CachedValue::Report(UserReport {
        username: "alice".to_string(),
        total_balance: dec!(100),
        transactions: vec![],
        from: "2024-01-01".to_string(),
        to: "All Transactions".to_string(),
    })
}

#[tokio::test]
async fn test_create_evicts_owner_report() {
    let h = harness();
    let alice = user(&h.store, "alice").await;
    let bob = user(&h.store, "bob").await;
    let ttl = std::time::Duration::from_secs(60);
    h.cache.set(CacheKey::User(alice.user_id), placeholder_report(), ttl);
    h.cache.set(CacheKey::User(bob.user_id), placeholder_report(), ttl);

    h.service
        .create(&alice, create_request("ACC2", dec!(10)))
        .await
        .unwrap();

    assert!(h.cache.get(&CacheKey::User(alice.user_id)).is_none());
    assert!(h.cache.get(&CacheKey::User(bob.user_id)).is_some());
}

/// Id-free view of a read, so two stores can be compared.
fn shape(detail: &AccountDetail) -> (String, String, AccountType, Vec<(TransactionType, String)>) {
    (
        detail.account.name.clone(),
        detail.account.balance.to_string(),
        detail.account.account_type,
        detail
            .transactions
            .iter()
            .map(|tx| (tx.transaction_type, tx.amount.to_string()))
            .collect(),
    )
}

#[tokio::test]
async fn test_disabled_cache_gives_same_results() {
    let mut shapes = Vec::new();

    for cache in [
        Arc::new(MokaAccountCache::new(100)) as Arc<dyn AccountCache>,
        Arc::new(DisabledCache),
    ] {
        let store = Arc::new(MemoryStore::new());
        let service = AccountService::new(
            store.clone(),
            cache,
            AccountAccessPolicy::default(),
            CacheTtls::default(),
        );
        let alice = user(&store, "alice").await;
        let account = service
            .create(&alice, create_request("ACC2", dec!(100)))
            .await
            .unwrap();

        let mut reads = vec![shape(&service.read(&alice, account.id).await.unwrap())];
        reads.push(shape(&service.read(&alice, account.id).await.unwrap()));
        service
            .update(&alice, account.id, delta(dec!(-40)))
            .await
            .unwrap();
        reads.push(shape(&service.read(&alice, account.id).await.unwrap()));
        let rename = AccountUpdateRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        service.update(&alice, account.id, rename).await.unwrap();
        reads.push(shape(&service.read(&alice, account.id).await.unwrap()));
        let refused = service
            .update(&alice, account.id, delta(dec!(-500)))
            .await
            .unwrap_err();
        reads.push(shape(&service.read(&alice, account.id).await.unwrap()));
        service.delete(&alice, account.id).await.unwrap();
        let gone = service.read(&alice, account.id).await.unwrap_err();

        shapes.push((reads, refused.error_code(), gone.error_code()));
    }

    assert_eq!(shapes[0], shapes[1]);
    assert_eq!(shapes[0].0[3].0, "Renamed");
    assert_eq!(shapes[0].0[4].1, "60.00");
}

#[tokio::test]
async fn test_read_is_cached_and_update_invalidates() {
    let h = harness();
    let alice = user(&h.store, "alice").await;
    let account = h
        .service
        .create(&alice, create_request("ACC2", dec!(100)))
        .await
        .unwrap();

    let first = h.service.read(&alice, account.id).await.unwrap();
    assert!(h.cache.get(&CacheKey::Account(account.id)).is_some());
    let second = h.service.read(&alice, account.id).await.unwrap();
    assert_eq!(first, second);

    h.cache.set(
        CacheKey::User(alice.user_id),
        placeholder_report(),
        std::time::Duration::from_secs(60),
    );

    h.service
        .update(&alice, account.id, delta(dec!(25)))
        .await
        .unwrap();
    assert!(h.cache.get(&CacheKey::Account(account.id)).is_none());
    assert!(h.cache.get(&CacheKey::User(alice.user_id)).is_none());

    let fresh = h.service.read(&alice, account.id).await.unwrap();
    assert_eq!(fresh.account.balance.to_string(), "125.00");
    assert_eq!(fresh.transactions.len(), 2);
}

#[tokio::test]
async fn test_delete_removes_account_and_cache_entry() {
    let h = harness();
    let alice = user(&h.store, "alice").await;
    let account = h
        .service
        .create(&alice, create_request("ACC2", dec!(100)))
        .await
        .unwrap();
    h.service.read(&alice, account.id).await.unwrap();
    h.cache.set(
        CacheKey::User(alice.user_id),
        placeholder_report(),
        std::time::Duration::from_secs(60),
    );

    h.service.delete(&alice, account.id).await.unwrap();

    assert!(h.cache.get(&CacheKey::Account(account.id)).is_none());
    assert!(h.cache.get(&CacheKey::User(alice.user_id)).is_none());
    assert_eq!(
        h.service.read(&alice, account.id).await.unwrap_err().error_code(),
        "NOT_FOUND"
    );
    assert_eq!(h.store.transaction_count().await, 0);
}

#[tokio::test]
async fn test_ownership_enforcement() {
    let h = harness_with_policy(AccountAccessPolicy::new(true));
    let alice = user(&h.store, "alice").await;
    let bob = user(&h.store, "bob").await;
    let account = h
        .service
        .create(&alice, create_request("ACC2", dec!(100)))
        .await
        .unwrap();

    assert_eq!(
        h.service.read(&bob, account.id).await.unwrap_err(),
        LedgerError::permission_denied()
    );
    assert!(h.service.read(&alice, account.id).await.is_ok());
    assert!(
        h.service
            .read(&Principal::staff(bob.user_id), account.id)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_shared_access_without_ownership_enforcement() {
    let h = harness();
    let alice = user(&h.store, "alice").await;
    let bob = user(&h.store, "bob").await;
    let account = h
        .service
        .create(&alice, create_request("ACC2", dec!(100)))
        .await
        .unwrap();

    h.service
        .update(&bob, account.id, delta(dec!(-40)))
        .await
        .unwrap();

    let detail = h.service.read(&alice, account.id).await.unwrap();
    assert_eq!(detail.transactions[0].transaction_by, bob.user_id);
    assert_eq!(detail.account.owner_id, alice.user_id);
}

#[tokio::test]
async fn test_concurrent_updates_through_service() {
    let h = harness();
    let alice = user(&h.store, "alice").await;
    let account = h
        .service
        .create(&alice, create_request("ACC2", dec!(100)))
        .await
        .unwrap();

    let service = Arc::new(h.service.clone());
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.update(&alice, account.id, delta(dec!(-25))).await })
        })
        .collect();
    let results = futures::future::join_all(tasks).await;
    let committed = results
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(_))))
        .count();

    assert_eq!(committed, 4);
    let stored = h.store.find_account(account.id).await.unwrap().unwrap();
    assert!(stored.balance.is_zero());
}
