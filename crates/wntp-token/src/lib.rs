pub mod claim;
pub mod error;
pub mod jwt;
pub mod key;
pub mod random;
