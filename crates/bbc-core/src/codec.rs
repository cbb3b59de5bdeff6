//! Canonical transaction encoding and signing digest.
//!
//! # Layout
//!
//! All integers little-endian, variable-length fields prefixed with a
//! compact size:
//!
//! ```text
//! version u16 | tx_type u16 | timestamp u32 | lock_until u32 | anchor [32]
//! | n_inputs compact | n × (txid [32], vout u8)
//! | send_to compact+bytes | amount u64 | fee u64 | memo compact+bytes
//! | signature compact+bytes
//! ```
//!
//! The digest is BLAKE3 over everything before the signature field, so a
//! signature never commits to itself and combining is deterministic.

use bytes::{Buf, BufMut};

use crate::constants::TX_VERSION;
use crate::error::CodecError;
use crate::types::{Address, Hash256};

/// One spent output in encoded form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxInput {
    pub txid: Hash256,
    pub vout: u8,
}

/// A token transfer with exactly one explicit output. Change returns to the
/// source address implicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTransaction {
    pub version: u16,
    pub tx_type: u16,
    /// Creation time in unix seconds.
    pub timestamp: u32,
    pub lock_until: u32,
    /// Genesis hash of the targeted fork.
    pub anchor: Hash256,
    pub inputs: Vec<TxInput>,
    pub send_to: Address,
    pub amount: u64,
    pub fee: u64,
    pub memo: Vec<u8>,
    /// Empty until a verified signature is combined in.
    pub signature: Vec<u8>,
}

impl RawTransaction {
    /// Bytes covered by the digest (everything but the signature).
    pub fn payload(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            64 + self.inputs.len() * 33 + self.send_to.as_bytes().len() + self.memo.len(),
        );
        buf.put_u16_le(self.version);
        buf.put_u16_le(self.tx_type);
        buf.put_u32_le(self.timestamp);
        buf.put_u32_le(self.lock_until);
        buf.put_slice(self.anchor.as_bytes());

        put_compact(&mut buf, self.inputs.len() as u64);
        for input in &self.inputs {
            buf.put_slice(input.txid.as_bytes());
            buf.put_u8(input.vout);
        }

        put_var_bytes(&mut buf, self.send_to.as_bytes());
        buf.put_u64_le(self.amount);
        buf.put_u64_le(self.fee);
        put_var_bytes(&mut buf, &self.memo);
        buf
    }

    /// The signable hash of this transaction.
    pub fn digest(&self) -> Hash256 {
        Hash256(blake3::hash(&self.payload()).into())
    }

    /// Full canonical encoding including the (possibly empty) signature.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = self.payload();
        put_var_bytes(&mut buf, &self.signature);
        buf
    }

    /// Decode a canonical encoding. Rejects truncated data and trailing
    /// bytes.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let mut buf = data;

        need(&buf, 12, "header")?;
        let version = buf.get_u16_le();
        if version != TX_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let tx_type = buf.get_u16_le();
        let timestamp = buf.get_u32_le();
        let lock_until = buf.get_u32_le();

        need(&buf, 32, "anchor")?;
        let mut anchor = [0u8; 32];
        buf.copy_to_slice(&mut anchor);

        let n_inputs = get_compact(&mut buf, "inputs")?;
        let n_inputs = usize::try_from(n_inputs)
            .map_err(|_| CodecError::Truncated { field: "inputs" })?;
        need(&buf, n_inputs.saturating_mul(33), "inputs")?;
        let mut inputs = Vec::with_capacity(n_inputs);
        for _ in 0..n_inputs {
            let mut txid = [0u8; 32];
            buf.copy_to_slice(&mut txid);
            let vout = buf.get_u8();
            inputs.push(TxInput {
                txid: Hash256(txid),
                vout,
            });
        }

        let send_to = get_var_bytes(&mut buf, "send_to")?;
        let send_to = String::from_utf8(send_to).map_err(|_| CodecError::InvalidUtf8("send_to"))?;

        need(&buf, 16, "amounts")?;
        let amount = buf.get_u64_le();
        let fee = buf.get_u64_le();

        let memo = get_var_bytes(&mut buf, "memo")?;
        let signature = get_var_bytes(&mut buf, "signature")?;

        if buf.has_remaining() {
            return Err(CodecError::TrailingBytes(buf.remaining()));
        }

        Ok(Self {
            version,
            tx_type,
            timestamp,
            lock_until,
            anchor: Hash256(anchor),
            inputs,
            send_to: Address::new(send_to),
            amount,
            fee,
            memo,
            signature,
        })
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// Replace the signature field.
    pub fn with_signature(mut self, signature: &[u8]) -> Self {
        self.signature = signature.to_vec();
        self
    }
}

fn need(buf: &&[u8], n: usize, field: &'static str) -> Result<(), CodecError> {
    if buf.remaining() < n {
        return Err(CodecError::Truncated { field });
    }
    Ok(())
}

/// Write a Bitcoin-style compact size.
pub fn put_compact(buf: &mut impl BufMut, n: u64) {
    match n {
        0..=0xfc => buf.put_u8(n as u8),
        0xfd..=0xffff => {
            buf.put_u8(0xfd);
            buf.put_u16_le(n as u16);
        }
        0x1_0000..=0xffff_ffff => {
            buf.put_u8(0xfe);
            buf.put_u32_le(n as u32);
        }
        _ => {
            buf.put_u8(0xff);
            buf.put_u64_le(n);
        }
    }
}

/// Read a Bitcoin-style compact size.
pub fn get_compact(buf: &mut &[u8], field: &'static str) -> Result<u64, CodecError> {
    need(buf, 1, field)?;
    match buf.get_u8() {
        0xfd => {
            need(buf, 2, field)?;
            Ok(buf.get_u16_le() as u64)
        }
        0xfe => {
            need(buf, 4, field)?;
            Ok(buf.get_u32_le() as u64)
        }
        0xff => {
            need(buf, 8, field)?;
            Ok(buf.get_u64_le())
        }
        n => Ok(n as u64),
    }
}

fn put_var_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    put_compact(buf, bytes.len() as u64);
    buf.put_slice(bytes);
}

fn get_var_bytes(buf: &mut &[u8], field: &'static str) -> Result<Vec<u8>, CodecError> {
    let len = get_compact(buf, field)?;
    let len = usize::try_from(len).map_err(|_| CodecError::Truncated { field })?;
    need(buf, len, field)?;
    let mut out = vec![0u8; len];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{NO_LOCK_UNTIL, TX_TYPE_TOKEN};

    fn sample() -> RawTransaction {
        RawTransaction {
            version: TX_VERSION,
            tx_type: TX_TYPE_TOKEN,
            timestamp: 1_600_000_000,
            lock_until: NO_LOCK_UNTIL,
            anchor: Hash256([0x11; 32]),
            inputs: vec![
                TxInput {
                    txid: Hash256([0x22; 32]),
                    vout: 0,
                },
                TxInput {
                    txid: Hash256([0x33; 32]),
                    vout: 1,
                },
            ],
            send_to: Address::from("1destination"),
            amount: 80,
            fee: 5,
            memo: b"hello".to_vec(),
            signature: vec![],
        }
    }

    #[test]
    fn unsigned_ends_with_empty_signature() {
        let tx = sample();
        let encoded = tx.encode();
        assert_eq!(encoded.len(), tx.payload().len() + 1);
        assert_eq!(*encoded.last().unwrap(), 0);
    }

    #[test]
    fn decode_recovers_fields() {
        let tx = sample().with_signature(&[9u8; 64]);
        let decoded = RawTransaction::decode(&tx.encode()).unwrap();
        assert_eq!(decoded, tx);
        assert!(decoded.is_signed());
    }

    #[test]
    fn digest_ignores_signature() {
        let tx = sample();
        let signed = tx.clone().with_signature(&[1u8; 64]);
        assert_eq!(tx.digest(), signed.digest());
        assert_ne!(tx.encode(), signed.encode());
    }

    #[test]
    fn digest_commits_to_fields() {
        let base = sample();
        let mut changed = sample();
        changed.amount += 1;
        assert_ne!(base.digest(), changed.digest());

        let mut changed = sample();
        changed.inputs[1].vout = 2;
        assert_ne!(base.digest(), changed.digest());

        let mut changed = sample();
        changed.anchor = Hash256::ZERO;
        assert_ne!(base.digest(), changed.digest());

        let mut changed = sample();
        changed.memo.clear();
        assert_ne!(base.digest(), changed.digest());
    }

    #[test]
    fn decode_rejects_truncated() {
        let encoded = sample().encode();
        for cut in [0, 5, 20, encoded.len() - 1] {
            assert!(
                RawTransaction::decode(&encoded[..cut]).is_err(),
                "cut at {cut} should fail"
            );
        }
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut encoded = sample().encode();
        encoded.push(0);
        assert_eq!(
            RawTransaction::decode(&encoded),
            Err(CodecError::TrailingBytes(1))
        );
    }

    #[test]
    fn decode_rejects_unknown_version() {
        let mut tx = sample();
        tx.version = 9;
        assert_eq!(
            RawTransaction::decode(&tx.encode()),
            Err(CodecError::UnsupportedVersion(9))
        );
    }

    #[test]
    fn compact_size_boundaries() {
        for n in [0u64, 0xfc, 0xfd, 0xffff, 0x1_0000, 0xffff_ffff, 0x1_0000_0000] {
            let mut buf = Vec::new();
            put_compact(&mut buf, n);
            let mut slice = buf.as_slice();
            assert_eq!(get_compact(&mut slice, "n").unwrap(), n);
            assert!(slice.is_empty());
        }
    }

    #[test]
    fn long_memo_uses_wide_prefix() {
        let mut tx = sample();
        tx.memo = vec![b'x'; 300];
        let decoded = RawTransaction::decode(&tx.encode()).unwrap();
        assert_eq!(decoded.memo.len(), 300);
    }
}
