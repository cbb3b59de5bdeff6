//! Error types shared by the BigBang driver crates.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("transport: {0}")] Transport(String),
    #[error("rpc error [{code}]: {message}")] Rpc { code: i64, message: String },
    #[error("empty response")] EmptyResponse,
    #[error("malformed response: {0}")] MalformedResponse(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed hash: {0}")] MalformedHash(String),
    #[error("malformed outpoint {txid}:{index}")] MalformedOutPoint { txid: String, index: u32 },
    #[error("value out of range: {0}")] ValueOutOfRange(String),
    #[error("unexpected end of data at {field}")] Truncated { field: &'static str },
    #[error("{0} trailing bytes")] TrailingBytes(usize),
    #[error("unsupported version {0}")] UnsupportedVersion(u16),
    #[error("invalid utf-8 in {0}")] InvalidUtf8(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")] Empty,
    #[error("invalid character in amount: {0}")] InvalidCharacter(String),
    #[error("too many fractional digits: {got} > {max}")] TooPrecise { got: usize, max: u32 },
    #[error("decimal scale {0} exceeds maximum")] ScaleTooLarge(u32),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("no key for path {0}")] UnknownPath(String),
    #[error("unsupported scheme: {0}")] UnsupportedScheme(String),
    #[error("key holder unavailable: {0}")] Unavailable(String),
}
