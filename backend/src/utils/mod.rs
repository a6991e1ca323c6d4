//! Collection of general utility functions shared by the auth pipeline.
//!
//! Token signing, credential hashing, claim timestamps and random strings live
//! here; none of them know about HTTP or storage.

pub mod hasher;
pub mod jwt;
pub mod random;
pub mod timestamp;
