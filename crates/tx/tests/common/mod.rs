//! Mock collaborators for exercising the chaining flows end to end: a wallet with fixed
//! answers, a provider whose drafts balance with naive in-order coin selection, and zero
//! fees so scenario arithmetic stays exact.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chains_tx::prelude::*;

pub fn address(tag: u8) -> Address {
    Address::new(NetworkId::Testnet, vec![tag])
}

pub fn txid(tag: u8) -> TxId {
    TxId::from([tag; 32])
}

pub fn utxo(txid_tag: u8, index: u64, owner: &Address, coin: u64) -> Utxo {
    Utxo::new(
        Outpoint::new(txid(txid_tag), index),
        TxOut::new(owner.clone(), Value::coin(coin)),
    )
}

#[derive(Debug)]
pub struct MockWallet {
    pub network: NetworkId,
    pub change_address: Address,
    pub utxos: Vec<Utxo>,
}

#[async_trait]
impl Wallet for MockWallet {
    async fn network_id(&self) -> Result<NetworkId, WalletError> {
        Ok(self.network)
    }

    async fn change_address(&self) -> Result<Address, WalletError> {
        Ok(self.change_address.clone())
    }

    async fn unspent_outputs(&self) -> Result<Vec<Utxo>, WalletError> {
        Ok(self.utxos.clone())
    }

    async fn sign(&self, tx: &Transaction) -> Result<Transaction, WalletError> {
        let mut signed = tx.clone();
        signed.witnesses.push(Witness {
            signer: KeyHash::from([0xaa; 32]),
            signature: Signature::from(vec![0x55; 64]),
        });
        Ok(signed)
    }

    async fn submit(&self, tx: &Transaction) -> Result<TxId, WalletError> {
        Ok(tx.id())
    }
}

pub struct MockDraft {
    change_address: Address,
    available: Vec<Utxo>,
    inputs: Vec<(Utxo, Option<Datum>)>,
    reference_inputs: Vec<Utxo>,
    outputs: Vec<TxOut>,
    mint: BTreeMap<AssetId, i64>,
    valid_from: Option<Slot>,
    valid_until: Option<Slot>,
    required_signers: Vec<KeyHash>,
}

#[async_trait]
impl DraftTx for MockDraft {
    fn add_input(&mut self, utxo: Utxo, redeemer: Option<Datum>, _unhashed_datum: Option<Datum>) {
        self.inputs.push((utxo, redeemer));
    }

    fn add_reference_input(&mut self, utxo: Utxo) {
        self.reference_inputs.push(utxo);
    }

    fn add_unspent_outputs(&mut self, utxos: Vec<Utxo>) {
        self.available.extend(utxos);
    }

    fn pay_assets(&mut self, address: Address, value: Value, datum: Option<OutputDatum>) {
        self.outputs.push(TxOut {
            address,
            value,
            datum,
            script_ref: None,
        });
    }

    fn lock_assets(
        &mut self,
        address: Address,
        value: Value,
        datum: OutputDatum,
        script_ref: Option<Script>,
    ) {
        self.outputs.push(TxOut {
            address,
            value,
            datum: Some(datum),
            script_ref,
        });
    }

    fn add_mint(
        &mut self,
        policy: PolicyId,
        assets: BTreeMap<AssetName, i64>,
        _redeemer: Option<Datum>,
    ) {
        for (name, amount) in assets {
            *self.mint.entry(AssetId::new(policy, name)).or_insert(0) += amount;
        }
    }

    fn set_valid_from(&mut self, slot: Slot) {
        self.valid_from = Some(slot);
    }

    fn set_valid_until(&mut self, slot: Slot) {
        self.valid_until = Some(slot);
    }

    fn add_required_signer(&mut self, signer: KeyHash) {
        self.required_signers.push(signer);
    }

    fn provide_script(&mut self, _script: Script) {
        // Script execution is out of scope for the mock chain
    }

    async fn complete(self) -> Result<Transaction, BuildError> {
        let target: u64 = self.outputs.iter().map(|out| out.value.coin).sum();

        let mut inputs: Vec<Outpoint> = vec![];
        let mut selected: u64 = 0;
        for (utxo, _redeemer) in &self.inputs {
            inputs.push(utxo.outpoint);
            selected += utxo.output.value.coin;
        }
        for utxo in &self.available {
            if selected >= target {
                break;
            }
            if inputs.contains(&utxo.outpoint) {
                continue;
            }
            inputs.push(utxo.outpoint);
            selected += utxo.output.value.coin;
        }
        if selected < target {
            return Err(BuildError::Balancing(format!(
                "needed {target} coin, selected {selected}"
            )));
        }

        let mut outputs = self.outputs;
        // Zero fees on the mock chain; everything left over is change
        let change = selected - target;
        if change > 0 {
            outputs.push(TxOut::new(self.change_address.clone(), Value::coin(change)));
        }

        Ok(Transaction::new(TxBody {
            inputs,
            reference_inputs: self.reference_inputs.iter().map(|u| u.outpoint).collect(),
            outputs,
            fee: 0,
            mint: self.mint,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            required_signers: self.required_signers,
        }))
    }
}

#[derive(Debug)]
pub struct MockProvider {
    pub slot_config: SlotConfig,
}

#[async_trait]
impl Provider for MockProvider {
    type Draft = MockDraft;

    fn slot_config(&self) -> SlotConfig {
        self.slot_config
    }

    fn draft(
        &self,
        _network: NetworkId,
        change_address: &Address,
        available: Vec<Utxo>,
    ) -> MockDraft {
        MockDraft {
            change_address: change_address.clone(),
            available,
            inputs: vec![],
            reference_inputs: vec![],
            outputs: vec![],
            mint: BTreeMap::new(),
            valid_from: None,
            valid_until: None,
            required_signers: vec![],
        }
    }

    async fn evaluate(
        &self,
        _tx: &Transaction,
        _additional: &[Utxo],
    ) -> Result<ExUnits, ProviderError> {
        Ok(ExUnits::default())
    }
}

pub fn client(change_address: Address, utxos: Vec<Utxo>) -> Client<MockProvider, MockWallet> {
    Client::new(
        MockProvider {
            slot_config: SlotConfig::new(1_000),
        },
        MockWallet {
            network: NetworkId::Testnet,
            change_address,
            utxos,
        },
    )
}
