//! End-to-end chaining flows against mock collaborators.

mod common;

use chains_tx::prelude::*;
use common::{address, client, txid, utxo};

#[tokio::test]
async fn it_partitions_change_and_posterior_outputs() {
    let owner = address(0x01);
    let x = address(0x02);
    let client = client(owner.clone(), vec![utxo(0xa1, 0, &owner, 100)]);

    let available = client.owned_utxos().await.unwrap();
    let seed = Outpoint::new(txid(0xa1), 0);
    assert!(available.has(&seed));

    let mut tx = client.tx(available);
    tx.pay_assets(x.clone(), Value::coin(40), None).unwrap();
    let built = tx.complete().await.unwrap();

    // The mock builder appends change after the declared payments
    let id = built.tx.id();
    assert_eq!(built.tx.outputs().len(), 2);

    let residual = built.residual().unwrap();
    assert_eq!(residual.len(), 1);
    let change = residual.get(&Outpoint::new(id, 1)).unwrap();
    assert_eq!(change.utxo.output.address, owner);
    assert_eq!(change.utxo.output.value.coin, 60);

    let posterior = built.posterior().unwrap();
    assert_eq!(posterior.len(), 1);
    let paid = posterior.get(&Outpoint::new(id, 0)).unwrap();
    assert_eq!(paid.utxo.output.address, x);
    assert_eq!(paid.utxo.output.value.coin, 40);

    // The consumed seed output appears in neither half
    assert!(!residual.has(&seed));
    assert!(!posterior.has(&seed));

    // Chaining with no chainers seeds the follow-up with exactly the residual
    let next = built.chain(NextAccount::Same, &[]).await.unwrap();
    let next_available = next.available().unwrap();
    assert_eq!(next_available, residual);
    assert!(!next_available.has(&seed));
}

#[tokio::test]
async fn it_chains_idempotently_within_the_same_account() {
    let owner = address(0x01);
    let client = client(owner.clone(), vec![utxo(0xa1, 0, &owner, 100)]);

    let mut tx = client.tx(client.owned_utxos().await.unwrap());
    tx.pay_assets(address(0x02), Value::coin(40), None).unwrap();
    let built = tx.complete().await.unwrap();

    let first = built.chain(NextAccount::Same, &[]).await.unwrap();
    let second = built.chain(NextAccount::Same, &[]).await.unwrap();
    assert_eq!(first.available().unwrap(), second.available().unwrap());
}

#[tokio::test]
async fn it_rejects_every_mutation_after_completion() {
    let owner = address(0x01);
    let client = client(owner.clone(), vec![utxo(0xa1, 0, &owner, 100)]);

    let mut tx = client.tx(client.owned_utxos().await.unwrap());
    tx.pay_assets(address(0x02), Value::coin(40), None).unwrap();
    tx.complete().await.unwrap();

    assert!(matches!(
        tx.pay_assets(address(0x03), Value::coin(1), None),
        Err(ChainError::AlreadyComplete)
    ));
    assert!(matches!(
        tx.add_input(utxo(0xb2, 0, &owner, 5), None, None),
        Err(ChainError::AlreadyComplete)
    ));
    assert!(matches!(
        tx.add_unspent_outputs(vec![utxo(0xb3, 0, &owner, 5)]),
        Err(ChainError::AlreadyComplete)
    ));
    assert!(matches!(
        tx.set_valid_from(Slot(1)),
        Err(ChainError::AlreadyComplete)
    ));
    assert!(matches!(tx.try_clone(), Err(ChainError::AlreadyComplete)));
    assert!(matches!(
        tx.complete().await,
        Err(ChainError::AlreadyComplete)
    ));
}

#[tokio::test]
async fn it_applies_chainer_inclusion_modes() {
    let owner = address(0x01);
    let x = address(0x02);
    let client = client(owner.clone(), vec![utxo(0xa1, 0, &owner, 100)]);

    let mut tx = client.tx(client.owned_utxos().await.unwrap());
    tx.pay_assets(x.clone(), Value::coin(40), None).unwrap();
    let built = tx.complete().await.unwrap();
    let paid_at = Outpoint::new(built.tx.id(), 0);

    let everything = |inclusion: Inclusion| {
        move |posterior: &UtxoSet| -> Vec<ChainedUtxo> {
            posterior
                .iter()
                .map(|traced| ChainedUtxo {
                    utxo: traced.clone(),
                    inclusion: inclusion.clone(),
                })
                .collect()
        }
    };

    // Supply: admitted to the available set, not forced into the transaction
    let supply = everything(Inclusion::Supply);
    let next = built.chain(NextAccount::Same, &[&supply]).await.unwrap();
    assert!(next.available().unwrap().has(&paid_at));
    assert!(matches!(
        next.steps().unwrap(),
        [BuildStep::UnspentOutputs(utxos)] if utxos.len() == 1
    ));

    // Coerce: a mandatory plain spend, not admitted to the available set
    let coerce = everything(Inclusion::Coerce);
    let next = built.chain(NextAccount::Same, &[&coerce]).await.unwrap();
    assert!(!next.available().unwrap().has(&paid_at));
    assert!(matches!(
        next.steps().unwrap(),
        [BuildStep::Input { utxo, redeemer: None, .. }] if utxo.outpoint == paid_at
    ));

    // Read: reference only
    let read = everything(Inclusion::Read);
    let next = built.chain(NextAccount::Same, &[&read]).await.unwrap();
    assert!(matches!(
        next.steps().unwrap(),
        [BuildStep::ReferenceInput(utxo)] if utxo.outpoint == paid_at
    ));

    // A redeemer makes it a mandatory script spend
    let redeem = everything(Inclusion::Redeem(Datum::from(vec![0x0f])));
    let next = built.chain(NextAccount::Same, &[&redeem]).await.unwrap();
    assert!(matches!(
        next.steps().unwrap(),
        [BuildStep::Input { redeemer: Some(_), .. }]
    ));
}

#[tokio::test]
async fn it_chains_into_a_different_account() {
    let owner = address(0x01);
    let x = address(0x02);
    let client = client(owner.clone(), vec![utxo(0xa1, 0, &owner, 100)]);
    let other = common::client(x.clone(), vec![]);

    let mut tx = client.tx(client.owned_utxos().await.unwrap());
    tx.pay_assets(x.clone(), Value::coin(40), None).unwrap();
    let built = tx.complete().await.unwrap();
    let id = built.tx.id();

    // Against the other account's change address the 40-coin payment is the change half
    let next = built
        .chain(NextAccount::Switch(&other), &[])
        .await
        .unwrap();
    let next_available = next.available().unwrap();
    assert_eq!(next_available.len(), 1);
    assert!(next_available.has(&Outpoint::new(id, 0)));

    // The cached same-account partition is unaffected
    let residual = built.residual().unwrap();
    assert!(residual.has(&Outpoint::new(id, 1)));
    assert!(!residual.has(&Outpoint::new(id, 0)));
}

#[tokio::test]
async fn it_propagates_balancing_failures_unchanged() {
    let owner = address(0x01);
    let client = client(owner.clone(), vec![utxo(0xa1, 0, &owner, 100)]);

    let mut tx = client.tx(client.owned_utxos().await.unwrap());
    tx.pay_assets(address(0x02), Value::coin(500), None).unwrap();
    let err = tx.complete().await.unwrap_err();
    assert!(matches!(
        err,
        ChainError::Build(BuildError::Balancing(_))
    ));
}

#[tokio::test]
async fn it_fails_partitioning_when_the_builder_consumed_an_untracked_output() {
    let owner = address(0x01);
    let client = client(owner.clone(), vec![utxo(0xa1, 0, &owner, 100)]);

    let mut tx = client.tx(client.owned_utxos().await.unwrap());
    let foreign = utxo(0xdd, 7, &owner, 50);
    let foreign_at = foreign.outpoint;
    tx.add_input(foreign, None, None).unwrap();
    tx.pay_assets(address(0x02), Value::coin(40), None).unwrap();
    let built = tx.complete().await.unwrap();

    let err = built.residual().unwrap_err();
    assert!(matches!(
        err,
        ChainError::UnknownUtxo { outpoint } if outpoint == foreign_at
    ));
}

#[tokio::test]
async fn it_converts_validity_bounds_from_milliseconds() {
    let owner = address(0x01);
    let client = client(owner.clone(), vec![utxo(0xa1, 0, &owner, 100)]);

    let mut tx = client.tx(client.owned_utxos().await.unwrap());
    tx.pay_assets(address(0x02), Value::coin(40), None)
        .unwrap()
        .set_valid_from_ms(1_500, Rounding::Down)
        .unwrap()
        .set_valid_until_ms(2_500, Rounding::Up)
        .unwrap();
    let built = tx.complete().await.unwrap();

    assert_eq!(built.tx.body.valid_from, Some(Slot(1)));
    assert_eq!(built.tx.body.valid_until, Some(Slot(3)));
}

#[tokio::test]
async fn it_keeps_supplied_outputs_consistent_with_the_builder() {
    let owner = address(0x01);
    let client = client(owner.clone(), vec![utxo(0xa1, 0, &owner, 10)]);

    let mut tx = client.tx(client.owned_utxos().await.unwrap());
    // The declared payment needs the supplied output to balance
    tx.add_unspent_outputs(vec![utxo(0xb1, 0, &owner, 90)])
        .unwrap()
        .pay_assets(address(0x02), Value::coin(95), None)
        .unwrap();
    assert!(tx.available().unwrap().has(&Outpoint::new(txid(0xb1), 0)));

    // Supplying the same output twice is a contract violation
    let err = tx
        .add_unspent_outputs(vec![utxo(0xb1, 0, &owner, 90)])
        .unwrap_err();
    assert!(matches!(err, ChainError::DuplicateUtxo { .. }));

    let built = tx.complete().await.unwrap();
    assert_eq!(built.tx.inputs().len(), 2);
}

#[tokio::test]
async fn it_branches_speculatively_with_try_clone() {
    let owner = address(0x01);
    let client = client(owner.clone(), vec![utxo(0xa1, 0, &owner, 100)]);

    let mut tx = client.tx(client.owned_utxos().await.unwrap());
    tx.pay_assets(address(0x02), Value::coin(40), None).unwrap();

    let mut branch = tx.try_clone().unwrap();
    branch
        .pay_assets(address(0x03), Value::coin(10), None)
        .unwrap();
    assert_eq!(tx.steps().unwrap().len(), 1);
    assert_eq!(branch.steps().unwrap().len(), 2);

    // Both branches complete independently from the same starting collection
    let left = tx.complete().await.unwrap();
    let right = branch.complete().await.unwrap();
    assert_eq!(left.tx.outputs().len(), 2);
    assert_eq!(right.tx.outputs().len(), 3);
}

#[tokio::test]
async fn it_signs_and_submits_through_the_wallet() {
    let owner = address(0x01);
    let client = client(owner.clone(), vec![utxo(0xa1, 0, &owner, 100)]);

    let mut tx = client.tx(client.owned_utxos().await.unwrap());
    tx.pay_assets(address(0x02), Value::coin(40), None).unwrap();
    let built = tx.complete().await.unwrap();

    let signed = built.sign().await.unwrap();
    assert_eq!(signed.tx.witnesses.len(), 1);
    // Witnesses do not change identity
    assert_eq!(signed.tx.id(), built.tx.id());

    let submitted = signed.submit().await.unwrap();
    assert_eq!(submitted, built.tx.id());
}
