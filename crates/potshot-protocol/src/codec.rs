//! Codec trait and the JSON implementation.
//!
//! The server never hard-codes a serialization format. It holds something
//! that implements [`Codec`] and asks it to turn [`ServerEvent`]s into frames
//! and frames into [`ClientEvent`]s.
//!
//! [`ServerEvent`]: crate::ServerEvent
//! [`ClientEvent`]: crate::ClientEvent

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to frame bytes and decodes frame bytes back.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every connection task through the server state.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected shape.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] producing JSON text, which is what the browser client speaks.
///
/// ```rust
/// use potshot_protocol::{Codec, JsonCodec, ServerEvent};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&ServerEvent::Safe).unwrap();
/// assert_eq!(bytes, br#"{"event":"safe"}"#);
///
/// let decoded: ServerEvent = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, ServerEvent::Safe);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
