use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

const MAX_LENGTH: usize = 256;
const FORBIDDEN_CHARACTERS: [char; 3] = ['/', '?', '#'];

/// Identifier of the entity on whose behalf digests are sent. It namespaces
/// contact lists and recurring jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelegatorAddress(String);

impl DelegatorAddress {
    pub fn parse(s: String) -> Result<DelegatorAddress, String> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err("Delegator address is empty".to_string());
        }

        if trimmed.graphemes(true).count() > MAX_LENGTH {
            return Err(format!(
                "Delegator address is longer than {MAX_LENGTH} characters"
            ));
        }

        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || FORBIDDEN_CHARACTERS.contains(&c))
        {
            return Err(format!(
                "Delegator address {trimmed} contains whitespace or one of {FORBIDDEN_CHARACTERS:?}"
            ));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for DelegatorAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DelegatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
