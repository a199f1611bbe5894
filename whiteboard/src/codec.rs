use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug)]
pub enum CodecError {
    Serialize(serde_json::Error),
    Decompress(lz4_flex::block::DecompressError),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Serialize(e) => write!(f, "serialize: {}", e),
            CodecError::Decompress(e) => write!(f, "decompress: {}", e),
        }
    }
}

impl std::error::Error for CodecError {}

/// Serialize a payload to canonical JSON bytes and compress them. Used for
/// `media`/`other` file payloads and bulk element updates before fan-out.
pub fn pack<T: Serialize>(payload: &T) -> Result<Vec<u8>, CodecError> {
    let json = serde_json::to_vec(payload).map_err(CodecError::Serialize)?;
    Ok(lz4_flex::compress_prepend_size(&json))
}

pub fn unpack<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    let json = lz4_flex::decompress_size_prepended(bytes).map_err(CodecError::Decompress)?;
    serde_json::from_slice(&json).map_err(CodecError::Serialize)
}
