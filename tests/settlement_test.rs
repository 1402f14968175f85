mod common;

use rust_decimal_macros::dec;

use investr_core::constants::{
    INVESTMENT_STATUS_ACTIVE, INVESTMENT_STATUS_EXITED, PROPERTY_STATUS_FUNDED,
    TRANSACTION_TYPE_INVESTMENT, TRANSACTION_TYPE_SALE,
};
use investr_core::investments::{InvestmentError, InvestmentService, SettlementEngine};

#[tokio::test]
async fn test_buy_floors_shares_and_charges_actual_cost() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "buyer@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(100)).await;
    common::seed_shares_sold(&pool, &property.id, 500);
    common::fund_wallet(&pool, &user.id, dec!(5000)).await;

    let engine = InvestmentService::new(pool.clone());
    let receipt = engine.invest(&user.id, &property.id, dec!(2500)).await.unwrap();

    // Share price is 1000, so $2500 buys exactly 2 whole shares for $2000.
    assert_eq!(receipt.shares_bought, 2);
    assert_eq!(receipt.amount_invested, dec!(2000));
    assert_eq!(receipt.share_price, dec!(1000));
    assert_eq!(
        receipt.transaction.transaction_type,
        TRANSACTION_TYPE_INVESTMENT
    );
    assert_eq!(receipt.transaction.shares, Some(2));
    assert!(receipt.transaction.reference_id.starts_with("TXN-"));

    // The uncharged remainder stays in the wallet.
    assert_eq!(common::wallet_balance(&pool, &user.id), dec!(3000));

    let property = common::reload_property(&pool, &property.id);
    assert_eq!(property.shares_sold, 502);

    let positions = engine.get_my_investments(&user.id).unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].shares, 2);
    assert_eq!(positions[0].amount, dec!(2000));
    assert_eq!(positions[0].status, INVESTMENT_STATUS_ACTIVE);
}

#[tokio::test]
async fn test_buy_below_one_share_price_leaves_state_unchanged() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "small@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(100)).await;
    common::fund_wallet(&pool, &user.id, dec!(5000)).await;

    let engine = InvestmentService::new(pool.clone());
    let err = engine
        .invest(&user.id, &property.id, dec!(999))
        .await
        .unwrap_err();
    assert!(matches!(err, InvestmentError::InsufficientAmount));

    assert_eq!(common::wallet_balance(&pool, &user.id), dec!(5000));
    assert_eq!(common::reload_property(&pool, &property.id).shares_sold, 0);
    assert!(engine.get_my_investments(&user.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_buy_below_minimum_investment_rejected() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "min@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(2000)).await;
    common::fund_wallet(&pool, &user.id, dec!(5000)).await;

    let engine = InvestmentService::new(pool.clone());
    let err = engine
        .invest(&user.id, &property.id, dec!(1500))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InvestmentError::BelowMinimumInvestment(min) if min == dec!(2000)
    ));
}

#[tokio::test]
async fn test_oversubscription_leaves_state_unchanged() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "late@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(100)).await;
    common::seed_shares_sold(&pool, &property.id, 999);
    common::fund_wallet(&pool, &user.id, dec!(5000)).await;

    let engine = InvestmentService::new(pool.clone());
    let err = engine
        .invest(&user.id, &property.id, dec!(2500))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InvestmentError::Oversubscribed { remaining: 1 }
    ));

    assert_eq!(common::wallet_balance(&pool, &user.id), dec!(5000));
    assert_eq!(common::reload_property(&pool, &property.id).shares_sold, 999);
}

#[tokio::test]
async fn test_insufficient_funds_rejected() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "broke@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(100)).await;
    common::fund_wallet(&pool, &user.id, dec!(1000)).await;

    let engine = InvestmentService::new(pool.clone());
    let err = engine
        .invest(&user.id, &property.id, dec!(2500))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InvestmentError::InsufficientFunds { available, required }
            if available == dec!(1000) && required == dec!(2000)
    ));

    assert_eq!(common::wallet_balance(&pool, &user.id), dec!(1000));
    assert!(engine.get_my_investments(&user.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_exact_fill_marks_property_funded() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "closer@investr.test").await;
    let property = common::create_property(&pool, dec!(10000), 10, dec!(100)).await;
    common::seed_shares_sold(&pool, &property.id, 8);
    common::fund_wallet(&pool, &user.id, dec!(5000)).await;

    let engine = InvestmentService::new(pool.clone());
    let receipt = engine.invest(&user.id, &property.id, dec!(2000)).await.unwrap();
    assert_eq!(receipt.shares_bought, 2);

    let property = common::reload_property(&pool, &property.id);
    assert_eq!(property.shares_sold, 10);
    assert_eq!(property.status, PROPERTY_STATUS_FUNDED);

    // The funded listing accepts no further buys.
    let err = engine
        .invest(&user.id, &property.id, dec!(1000))
        .await
        .unwrap_err();
    assert!(matches!(err, InvestmentError::PropertyNotActive(_)));
}

#[tokio::test]
async fn test_repeat_buys_accumulate_one_position() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "repeat@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(100)).await;
    common::fund_wallet(&pool, &user.id, dec!(10000)).await;

    let engine = InvestmentService::new(pool.clone());
    engine.invest(&user.id, &property.id, dec!(2000)).await.unwrap();
    engine.invest(&user.id, &property.id, dec!(2000)).await.unwrap();

    let positions = engine.get_my_investments(&user.id).unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].shares, 4);
    assert_eq!(positions[0].amount, dec!(4000));

    assert_eq!(common::wallet_balance(&pool, &user.id), dec!(6000));
    assert_eq!(common::reload_property(&pool, &property.id).shares_sold, 4);
}

#[tokio::test]
async fn test_full_sell_exits_position() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "seller@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(100)).await;
    common::fund_wallet(&pool, &user.id, dec!(5000)).await;

    let engine = InvestmentService::new(pool.clone());
    engine.invest(&user.id, &property.id, dec!(2000)).await.unwrap();
    let position_id = engine.get_my_investments(&user.id).unwrap()[0].id.clone();

    let receipt = engine.sell(&user.id, &position_id, 2).await.unwrap();
    assert_eq!(receipt.sale_value, dec!(2000));
    assert_eq!(receipt.shares_sold, 2);
    assert_eq!(receipt.transaction.transaction_type, TRANSACTION_TYPE_SALE);

    assert_eq!(common::wallet_balance(&pool, &user.id), dec!(5000));
    assert_eq!(common::reload_property(&pool, &property.id).shares_sold, 0);

    let positions = engine.get_my_investments(&user.id).unwrap();
    assert_eq!(positions[0].shares, 0);
    assert_eq!(positions[0].amount, dec!(0));
    assert_eq!(positions[0].status, INVESTMENT_STATUS_EXITED);
}

#[tokio::test]
async fn test_partial_sell_reduces_cost_basis_proportionally() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "trimmer@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(100)).await;
    common::fund_wallet(&pool, &user.id, dec!(5000)).await;

    let engine = InvestmentService::new(pool.clone());
    engine.invest(&user.id, &property.id, dec!(4000)).await.unwrap();
    let position_id = engine.get_my_investments(&user.id).unwrap()[0].id.clone();

    let receipt = engine.sell(&user.id, &position_id, 1).await.unwrap();
    assert_eq!(receipt.sale_value, dec!(1000));

    let positions = engine.get_my_investments(&user.id).unwrap();
    assert_eq!(positions[0].shares, 3);
    assert_eq!(positions[0].amount, dec!(3000));
    assert_eq!(positions[0].status, INVESTMENT_STATUS_ACTIVE);

    assert_eq!(common::wallet_balance(&pool, &user.id), dec!(2000));
    assert_eq!(common::reload_property(&pool, &property.id).shares_sold, 3);
}

#[tokio::test]
async fn test_sell_more_shares_than_held_rejected() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "greedy@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(100)).await;
    common::fund_wallet(&pool, &user.id, dec!(5000)).await;

    let engine = InvestmentService::new(pool.clone());
    engine.invest(&user.id, &property.id, dec!(2000)).await.unwrap();
    let position_id = engine.get_my_investments(&user.id).unwrap()[0].id.clone();

    let err = engine.sell(&user.id, &position_id, 5).await.unwrap_err();
    assert!(matches!(err, InvestmentError::InvalidData(_)));

    // Nothing moved.
    assert_eq!(common::wallet_balance(&pool, &user.id), dec!(3000));
    assert_eq!(engine.get_my_investments(&user.id).unwrap()[0].shares, 2);
}

#[tokio::test]
async fn test_sell_someone_elses_position_rejected() {
    let (_dir, pool) = common::setup_db();
    let owner = common::create_user(&pool, "owner@investr.test").await;
    let thief = common::create_user(&pool, "thief@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(100)).await;
    common::fund_wallet(&pool, &owner.id, dec!(5000)).await;

    let engine = InvestmentService::new(pool.clone());
    engine.invest(&owner.id, &property.id, dec!(2000)).await.unwrap();
    let position_id = engine.get_my_investments(&owner.id).unwrap()[0].id.clone();

    let err = engine.sell(&thief.id, &position_id, 1).await.unwrap_err();
    assert!(matches!(err, InvestmentError::NotFound(_)));
}

#[tokio::test]
async fn test_rebuy_after_exit_reactivates_position() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "returnee@investr.test").await;
    let property = common::create_property(&pool, dec!(1000000), 1000, dec!(100)).await;
    common::fund_wallet(&pool, &user.id, dec!(10000)).await;

    let engine = InvestmentService::new(pool.clone());
    engine.invest(&user.id, &property.id, dec!(2000)).await.unwrap();
    let position_id = engine.get_my_investments(&user.id).unwrap()[0].id.clone();
    engine.sell(&user.id, &position_id, 2).await.unwrap();

    engine.invest(&user.id, &property.id, dec!(1000)).await.unwrap();

    let positions = engine.get_my_investments(&user.id).unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].shares, 1);
    assert_eq!(positions[0].amount, dec!(1000));
    assert_eq!(positions[0].status, INVESTMENT_STATUS_ACTIVE);
}

#[tokio::test]
async fn test_buy_conserves_wallet_plus_cost_basis() {
    let (_dir, pool) = common::setup_db();
    let user = common::create_user(&pool, "auditor@investr.test").await;
    let property = common::create_property(&pool, dec!(750000), 500, dec!(100)).await;
    common::fund_wallet(&pool, &user.id, dec!(9000)).await;

    let engine = InvestmentService::new(pool.clone());
    let before = common::wallet_balance(&pool, &user.id);
    let receipt = engine.invest(&user.id, &property.id, dec!(3700)).await.unwrap();
    let after = common::wallet_balance(&pool, &user.id);

    assert_eq!(before - after, receipt.amount_invested);
    assert_eq!(receipt.transaction.amount, receipt.amount_invested);

    let position = &engine.get_my_investments(&user.id).unwrap()[0];
    assert_eq!(position.amount, receipt.amount_invested);
}
