//! # bbc-core
//! Foundation types, canonical transaction codec and collaborator traits for
//! the BigBang wallet driver.

pub mod amount;
pub mod codec;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod traits;
pub mod types;
