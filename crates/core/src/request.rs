//! The two-message image generation request and its validation.

use crate::error::CoreError;

/// Query parameter name for the first message.
pub const MESSAGE1_PARAM: &str = "message1";
/// Query parameter name for the second message.
pub const MESSAGE2_PARAM: &str = "message2";

/// A validated image generation request.
///
/// Both messages are trimmed of surrounding whitespace and guaranteed
/// non-empty. The only way to obtain one is [`JobRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    message1: String,
    message2: String,
}

impl JobRequest {
    /// Trim and validate both messages.
    pub fn new(message1: &str, message2: &str) -> Result<Self, CoreError> {
        let message1 = message1.trim();
        let message2 = message2.trim();

        if message1.is_empty() || message2.is_empty() {
            return Err(CoreError::Validation(
                "both messages are required".to_string(),
            ));
        }

        Ok(Self {
            message1: message1.to_string(),
            message2: message2.to_string(),
        })
    }

    pub fn message1(&self) -> &str {
        &self.message1
    }

    pub fn message2(&self) -> &str {
        &self.message2
    }

    /// The request as `(name, value)` query pairs, in wire order.
    pub fn query_pairs(&self) -> [(&'static str, &str); 2] {
        [
            (MESSAGE1_PARAM, self.message1.as_str()),
            (MESSAGE2_PARAM, self.message2.as_str()),
        ]
    }
}
