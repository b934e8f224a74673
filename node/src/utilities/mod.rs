pub mod encoding;
pub mod hash;

pub use encoding::{from_hex, to_hex};
pub use hash::{blake2_256, HashType};
