mod common;

use rust_decimal_macros::dec;

use investr_core::constants::{
    MAX_SINGLE_DEPOSIT, TRANSACTION_TYPE_DEPOSIT, TRANSACTION_TYPE_WITHDRAWAL,
};
use investr_core::investments::{InvestmentService, SettlementEngine};
use investr_core::transactions::{TransactionError, TransactionFilters, TransactionService};

#[tokio::test]
async fn test_deposit_credits_wallet_and_appends_ledger_entry() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "depositor@investr.test").await;

    let service = TransactionService::new(pool.clone());
    let receipt = service.deposit(&user.id, dec!(1500)).await.unwrap();

    assert_eq!(receipt.new_balance, dec!(1500));
    assert_eq!(receipt.transaction.transaction_type, TRANSACTION_TYPE_DEPOSIT);
    assert_eq!(receipt.transaction.amount, dec!(1500));
    assert!(receipt.transaction.reference_id.starts_with("TXN-"));

    assert_eq!(common::wallet_balance(&pool, &user.id), dec!(1500));

    let entry = service
        .get_transaction(&user.id, &receipt.transaction.id)
        .unwrap();
    assert_eq!(entry.transaction.amount, dec!(1500));
    assert!(entry.property_name.is_none());
}

#[tokio::test]
async fn test_deposit_above_ceiling_rejected() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "whale@investr.test").await;

    let service = TransactionService::new(pool.clone());
    let err = service
        .deposit(&user.id, MAX_SINGLE_DEPOSIT + dec!(0.01))
        .await
        .unwrap_err();
    assert!(matches!(err, TransactionError::AmountTooLarge(_)));

    // The ceiling itself is accepted.
    service.deposit(&user.id, MAX_SINGLE_DEPOSIT).await.unwrap();
    assert_eq!(common::wallet_balance(&pool, &user.id), MAX_SINGLE_DEPOSIT);
}

#[tokio::test]
async fn test_deposit_rejects_non_positive_amounts() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "zero@investr.test").await;

    let service = TransactionService::new(pool.clone());
    assert!(matches!(
        service.deposit(&user.id, dec!(0)).await.unwrap_err(),
        TransactionError::InvalidData(_)
    ));
    assert!(matches!(
        service.deposit(&user.id, dec!(-50)).await.unwrap_err(),
        TransactionError::InvalidData(_)
    ));
}

#[tokio::test]
async fn test_withdraw_rejects_overdraft() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "overdrawn@investr.test").await;
    common::fund_wallet(&pool, &user.id, dec!(300)).await;

    let service = TransactionService::new(pool.clone());
    let err = service.withdraw(&user.id, dec!(300.01)).await.unwrap_err();
    assert!(matches!(
        err,
        TransactionError::InsufficientFunds { available } if available == dec!(300)
    ));
    assert_eq!(common::wallet_balance(&pool, &user.id), dec!(300));
}

#[tokio::test]
async fn test_withdraw_debits_wallet() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "withdrawer@investr.test").await;
    common::fund_wallet(&pool, &user.id, dec!(1000)).await;

    let service = TransactionService::new(pool.clone());
    let receipt = service.withdraw(&user.id, dec!(400)).await.unwrap();

    assert_eq!(receipt.new_balance, dec!(600));
    assert_eq!(
        receipt.transaction.transaction_type,
        TRANSACTION_TYPE_WITHDRAWAL
    );
    assert_eq!(common::wallet_balance(&pool, &user.id), dec!(600));
}

#[tokio::test]
async fn test_ledger_search_filters_and_summary() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "ledger@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(100)).await;

    let service = TransactionService::new(pool.clone());
    service.deposit(&user.id, dec!(5000)).await.unwrap();
    service.withdraw(&user.id, dec!(500)).await.unwrap();

    let engine = InvestmentService::new(pool.clone());
    engine.invest(&user.id, &property.id, dec!(2000)).await.unwrap();

    let all = service
        .search_transactions(&user.id, &TransactionFilters::default(), 1, 20)
        .unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.transactions.len(), 3);
    assert_eq!(all.summary.total_deposited, dec!(5000));
    assert_eq!(all.summary.total_withdrawn, dec!(500));
    assert_eq!(all.summary.total_invested, dec!(2000));
    assert_eq!(all.summary.transaction_count, 3);

    // Newest first.
    assert_eq!(
        all.transactions[0].transaction.transaction_type,
        "investment"
    );

    let deposits_only = service
        .search_transactions(
            &user.id,
            &TransactionFilters {
                transaction_type: Some(TRANSACTION_TYPE_DEPOSIT.to_string()),
                ..Default::default()
            },
            1,
            20,
        )
        .unwrap();
    assert_eq!(deposits_only.total, 1);
    assert_eq!(deposits_only.transactions[0].transaction.amount, dec!(5000));

    // The investment entry carries its property context.
    let investment_entry = all
        .transactions
        .iter()
        .find(|t| t.transaction.transaction_type == "investment")
        .unwrap();
    assert_eq!(
        investment_entry.property_name.as_deref(),
        Some("Skyline Towers")
    );
}

#[tokio::test]
async fn test_ledger_is_scoped_to_owner() {
    let (_dir, pool) = common::setup_db();
    let alice = common::create_user(&pool, "alice@investr.test").await;
    let bob = common::create_user(&pool, "bob@investr.test").await;

    let service = TransactionService::new(pool.clone());
    let receipt = service.deposit(&alice.id, dec!(100)).await.unwrap();

    let err = service
        .get_transaction(&bob.id, &receipt.transaction.id)
        .unwrap_err();
    assert!(matches!(err, TransactionError::NotFound(_)));

    let bobs = service
        .search_transactions(&bob.id, &TransactionFilters::default(), 1, 20)
        .unwrap();
    assert_eq!(bobs.total, 0);
}
