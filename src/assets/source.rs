use std::sync::Arc;

use crate::foundation::math::Fnv1a64;

/// Where the pixels of an image layer come from.
///
/// Snapshots store the source rather than decoded pixels; restoring a snapshot
/// re-decodes from here.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    /// Encoded image bytes owned by the document (uploads, cutout results, drawings).
    Embedded { bytes: Arc<Vec<u8>> },
    /// A catalog asset resolved by the asset loader (relative path or registered name).
    Linked { uri: String },
}

impl ImageSource {
    pub fn embedded(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Embedded {
            bytes: Arc::new(bytes.into()),
        }
    }

    pub fn linked(uri: impl Into<String>) -> Self {
        Self::Linked { uri: uri.into() }
    }

    /// Encoded bytes when the document carries them itself.
    pub fn embedded_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Embedded { bytes } => Some(bytes.as_slice()),
            Self::Linked { .. } => None,
        }
    }

    /// Stable identity used to detect that a layer's source changed while a decode was in flight.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        match self {
            Self::Embedded { bytes } => {
                h.write_u8(b'E');
                h.write_bytes(bytes);
            }
            Self::Linked { uri } => {
                h.write_u8(b'L');
                h.write_bytes(uri.as_bytes());
            }
        }
        h.finish()
    }
}
