//! Opaque keyset cursors.
//!
//! A cursor wraps the sort key of the last item a client has seen. The key is
//! serialised as JSON and encoded with URL-safe base64 so clients treat it as
//! an opaque token.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors raised while decoding a client-supplied cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The token is not valid URL-safe base64.
    #[error("cursor is not valid base64: {message}")]
    Encoding {
        /// Decoder diagnostic.
        message: String,
    },
    /// The decoded bytes do not describe a key of the expected shape.
    #[error("cursor payload is malformed: {message}")]
    Payload {
        /// Deserialiser diagnostic.
        message: String,
    },
}

/// Keyset cursor over sort keys of type `K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap a sort key.
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the wrapped key.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Unwrap the key.
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Encode the key as an opaque token.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Payload`] if the key cannot be serialised.
    pub fn encode(&self) -> Result<String, CursorError> {
        let json = serde_json::to_vec(&self.key).map_err(|err| CursorError::Payload {
            message: err.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Decode an opaque token produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CursorError`] when the token is not base64 or does not hold a
    /// key of type `K`.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|err| CursorError::Encoding {
                message: err.to_string(),
            })?;
        let key = serde_json::from_slice(&bytes).map_err(|err| CursorError::Payload {
            message: err.to_string(),
        })?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    //! Cursor encoding behaviour.

    use super::*;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct FeedKey {
        created_at: String,
        id: String,
    }

    #[rstest]
    fn decoded_cursor_matches_encoded_key() {
        let key = FeedKey {
            created_at: "2026-01-02T03:04:05Z".to_owned(),
            id: "abc".to_owned(),
        };
        let token = Cursor::new(key.clone()).encode().expect("encodes");
        assert!(!token.contains('='));
        let decoded: Cursor<FeedKey> = Cursor::decode(&token).expect("decodes");
        assert_eq!(decoded.into_key(), key);
    }

    #[rstest]
    #[case("***")]
    #[case("bm90LWpzb24")]
    fn rejects_foreign_tokens(#[case] token: &str) {
        assert!(Cursor::<FeedKey>::decode(token).is_err());
    }
}
