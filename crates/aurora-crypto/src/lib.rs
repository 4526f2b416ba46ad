//! Aurora Crypto Library
//!
//! Admin credential hashing (Argon2id, salted, PHC-encoded) and the
//! generator for registrant serial IDs.

pub mod password;
pub mod serial;
