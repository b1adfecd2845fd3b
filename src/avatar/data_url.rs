use std::{fmt, str::FromStr};

use base64::prelude::*;

use super::error::DataUrlError;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";
// RFC 2397 default when the media type is omitted
const DEFAULT_MIME: &str = "text/plain;charset=US-ASCII";

/// Image bytes together with their declared MIME type, as carried by a
/// `data:<mime>;base64,<payload>` string.
#[derive(Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime_type: String,
    data: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> DataUrl {
        DataUrl {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Length of the textual form, which is what gets shipped to the store.
    pub fn encoded_len(&self) -> usize {
        SCHEME.len()
            + self.mime_type.len()
            + BASE64_MARKER.len()
            + 1
            + base64::encoded_len(self.data.len(), true).unwrap_or(usize::MAX)
    }
}

impl FromStr for DataUrl {
    type Err = DataUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .trim()
            .strip_prefix(SCHEME)
            .ok_or(DataUrlError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPayload)?;
        let header = header
            .strip_suffix(BASE64_MARKER)
            .ok_or(DataUrlError::NotBase64)?;

        // parameters such as `;name=foo.png` are not part of the type
        let mime_type = match header.split(';').next().map(str::trim) {
            Some(mime) if !mime.is_empty() => mime.to_ascii_lowercase(),
            _ => DEFAULT_MIME.to_string(),
        };
        let data = BASE64_STANDARD
            .decode(payload.trim())
            .map_err(DataUrlError::Payload)?;

        Ok(DataUrl { mime_type, data })
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{SCHEME}{}{BASE64_MARKER},{}",
            self.mime_type,
            BASE64_STANDARD.encode(&self.data)
        )
    }
}

// the payload can be megabytes long, keep logs readable
impl fmt::Debug for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUrl")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}
