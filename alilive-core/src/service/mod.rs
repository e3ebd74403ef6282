pub mod expiry;
pub mod hash;
pub mod signer;
pub mod snowflake;

pub use expiry::{expiry_from, expiry_in, shanghai_expiry, DEFAULT_TTL_SECS, SHANGHAI_OFFSET_SECS};
pub use hash::md5_hex;
pub use signer::{LiveSigner, LiveSignerBuilder};
pub use snowflake::{SnowflakeId, SnowflakeNode};
