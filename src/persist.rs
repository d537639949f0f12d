//! Serializes a minimized, packed [`Dfa`] to and from a portable byte stream.
//!
//! The stream is a small header (magic, format version, state count) followed by a `bincode`
//! payload of the packed states and start-state table; on load, states are reconnected
//! purely by index, so no mutable "placeholder" objects are needed during deserialization.

use serde::{de::DeserializeOwned, Serialize};

use crate::dfa::Dfa;
use crate::errors::{DfalexErrorKind, Result};

const MAGIC: &[u8; 4] = b"DFLX";
const FORMAT_VERSION: u32 = 1;

/// Serializes `dfa` into a portable byte stream.
pub fn to_bytes<M: Serialize>(dfa: &Dfa<M>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(dfa.state_count() as u64).to_le_bytes());
    let payload = bincode::serialize(dfa).expect("packed DFA is always serializable");
    out.extend_from_slice(&payload);
    out
}

/// Deserializes a DFA previously produced by [`to_bytes`].
///
/// Returns `SerializationError` if the header is malformed, the version is unsupported, or
/// the payload does not decode.
pub fn from_bytes<M: DeserializeOwned>(bytes: &[u8]) -> Result<Dfa<M>> {
    if bytes.len() < 16 || &bytes[0..4] != MAGIC {
        return Err(DfalexErrorKind::SerializationError("bad header".to_string()).into());
    }
    let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    if version != FORMAT_VERSION {
        return Err(DfalexErrorKind::SerializationError(format!(
            "unsupported format version {version}"
        ))
        .into());
    }
    let declared_states = u64::from_le_bytes(bytes[8..16].try_into().unwrap());
    let dfa: Dfa<M> = bincode::deserialize(&bytes[16..])
        .map_err(|e| DfalexErrorKind::SerializationError(e.to_string()))?;
    if dfa.state_count() as u64 != declared_states {
        return Err(DfalexErrorKind::SerializationError(
            "state count header does not match payload".to_string(),
        )
        .into());
    }
    Ok(dfa)
}
