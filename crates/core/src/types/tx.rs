//! Transaction artifacts: the body produced by an external builder, plus witnesses added by
//! signing. The body serialization is the preimage of the transaction id.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::{
    hashes::{Blake2b256Writer, KeyHash, MarkedDigestWriter, TxId},
    ser::{ByteFormat, SerError, SerResult},
    time::Slot,
    types::{
        outpoint::Outpoint,
        script::Signature,
        txout::TxOut,
        utxo::Utxo,
        value::AssetId,
    },
};

/// The body of a transaction: everything that is signed.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TxBody {
    /// Consumed outputs, in the order the builder selected them.
    pub inputs: Vec<Outpoint>,
    /// Outputs read but not consumed.
    pub reference_inputs: Vec<Outpoint>,
    /// Produced outputs, in declared order. Output `i` lives at `(id, i)`.
    pub outputs: Vec<TxOut>,
    /// The fee paid, in coin.
    pub fee: u64,
    /// Minted (positive) or burned (negative) asset quantities.
    pub mint: BTreeMap<AssetId, i64>,
    /// The transaction is invalid before this slot.
    pub valid_from: Option<Slot>,
    /// The transaction is invalid at or after this slot.
    pub valid_until: Option<Slot>,
    /// Key hashes that must witness the transaction.
    pub required_signers: Vec<KeyHash>,
}

fn option_slot_length(opt: &Option<Slot>) -> usize {
    1 + opt.as_ref().map(|s| s.serialized_length()).unwrap_or(0)
}

fn read_option_slot<R: Read>(reader: &mut R) -> SerResult<Option<Slot>> {
    match TxBody::read_u8(reader)? {
        0 => Ok(None),
        1 => Ok(Some(Slot::read_from(reader, 0)?)),
        got => Err(SerError::UnknownTag {
            got,
            reading: "Option<Slot>",
        }),
    }
}

fn write_option_slot<W: Write>(writer: &mut W, opt: &Option<Slot>) -> SerResult<usize> {
    match opt {
        None => TxBody::write_u8(writer, 0),
        Some(slot) => Ok(TxBody::write_u8(writer, 1)? + slot.write_to(writer)?),
    }
}

impl ByteFormat for TxBody {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        let mut len = 4 + self.inputs.serialized_length();
        len += 4 + self.reference_inputs.serialized_length();
        len += 4 + self.outputs.serialized_length();
        len += 8;
        len += 4;
        len += self
            .mint
            .iter()
            .map(|(id, _)| id.serialized_length() + 8)
            .sum::<usize>();
        len += option_slot_length(&self.valid_from);
        len += option_slot_length(&self.valid_until);
        len += 4 + self.required_signers.serialized_length();
        len
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        let count = Self::read_count_prefix(reader)?;
        let inputs = Vec::<Outpoint>::read_from(reader, count)?;
        let count = Self::read_count_prefix(reader)?;
        let reference_inputs = Vec::<Outpoint>::read_from(reader, count)?;
        let count = Self::read_count_prefix(reader)?;
        let outputs = Vec::<TxOut>::read_from(reader, count)?;
        let fee = Self::read_u64_le(reader)?;
        let count = Self::read_count_prefix(reader)?;
        let mut mint = BTreeMap::new();
        for _ in 0..count {
            let id = AssetId::read_from(reader, 0)?;
            let amount = Self::read_i64_le(reader)?;
            mint.insert(id, amount);
        }
        let valid_from = read_option_slot(reader)?;
        let valid_until = read_option_slot(reader)?;
        let count = Self::read_count_prefix(reader)?;
        let required_signers = Vec::<KeyHash>::read_from(reader, count)?;
        Ok(TxBody {
            inputs,
            reference_inputs,
            outputs,
            fee,
            mint,
            valid_from,
            valid_until,
            required_signers,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut written = Self::write_u32_le(writer, self.inputs.len() as u32)?;
        written += self.inputs.write_to(writer)?;
        written += Self::write_u32_le(writer, self.reference_inputs.len() as u32)?;
        written += self.reference_inputs.write_to(writer)?;
        written += Self::write_u32_le(writer, self.outputs.len() as u32)?;
        written += self.outputs.write_to(writer)?;
        written += Self::write_u64_le(writer, self.fee)?;
        written += Self::write_u32_le(writer, self.mint.len() as u32)?;
        for (id, amount) in &self.mint {
            written += id.write_to(writer)?;
            written += Self::write_i64_le(writer, *amount)?;
        }
        written += write_option_slot(writer, &self.valid_from)?;
        written += write_option_slot(writer, &self.valid_until)?;
        written += Self::write_u32_le(writer, self.required_signers.len() as u32)?;
        written += self.required_signers.write_to(writer)?;
        Ok(written)
    }
}

/// A witness: the hash of the key that signed, plus the signature bytes.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Witness {
    /// The hash of the signing key.
    pub signer: KeyHash,
    /// The signature over the body.
    pub signature: Signature,
}

impl ByteFormat for Witness {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.signer.serialized_length() + self.signature.serialized_length()
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        Ok(Witness {
            signer: KeyHash::read_from(reader, 0)?,
            signature: Signature::read_from(reader, 0)?,
        })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        Ok(self.signer.write_to(writer)? + self.signature.write_to(writer)?)
    }
}

/// A transaction artifact: a body plus however many witnesses have been attached so far.
///
/// Balancing, fee computation and signing happen in external collaborators; this type only
/// carries the result and derives identity from it.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    /// The signed (or to-be-signed) body.
    pub body: TxBody,
    /// Witnesses attached by signing.
    pub witnesses: Vec<Witness>,
}

impl Transaction {
    /// Instantiate an unwitnessed transaction from a body.
    pub fn new(body: TxBody) -> Self {
        Self {
            body,
            witnesses: vec![],
        }
    }

    /// The id of this transaction: the blake2b-256 digest of the serialized body.
    pub fn id(&self) -> TxId {
        let mut w = Blake2b256Writer::default();
        self.body
            .write_to(&mut w)
            .expect("no error on sink writes");
        w.finish_marked()
    }

    /// The outputs this transaction consumes.
    pub fn inputs(&self) -> &[Outpoint] {
        &self.body.inputs
    }

    /// The outputs this transaction produces, in declared order.
    pub fn outputs(&self) -> &[TxOut] {
        &self.body.outputs
    }

    /// The produced outputs as UTXOs, keyed `(id, 0..n)` in declared order.
    pub fn produced(&self) -> Vec<Utxo> {
        let txid = self.id();
        self.body
            .outputs
            .iter()
            .enumerate()
            .map(|(idx, output)| Utxo::new(Outpoint::new(txid, idx as u64), output.clone()))
            .collect()
    }
}

impl ByteFormat for Transaction {
    type Error = SerError;

    fn serialized_length(&self) -> usize {
        self.body.serialized_length() + 4 + self.witnesses.serialized_length()
    }

    fn read_from<R>(reader: &mut R, _limit: usize) -> SerResult<Self>
    where
        R: Read,
        Self: std::marker::Sized,
    {
        let body = TxBody::read_from(reader, 0)?;
        let count = Self::read_count_prefix(reader)?;
        let witnesses = Vec::<Witness>::read_from(reader, count)?;
        Ok(Transaction { body, witnesses })
    }

    fn write_to<W>(&self, writer: &mut W) -> SerResult<usize>
    where
        W: Write,
    {
        let mut written = self.body.write_to(writer)?;
        written += Self::write_u32_le(writer, self.witnesses.len() as u32)?;
        written += self.witnesses.write_to(writer)?;
        Ok(written)
    }
}
