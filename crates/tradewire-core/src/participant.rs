//! Participant records carried on conversations.

use serde::{Deserialize, Serialize};

use crate::id::ParticipantId;

/// A marketplace user as they appear inside a conversation.
///
/// The avatar is a reference (URL or asset key) resolved by the image
/// loading layer, which is outside this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Remote-assigned user id.
    pub id: ParticipantId,
    /// Display name shown in the chat UI.
    pub display_name: String,
    /// Avatar reference, if the user has one.
    pub avatar_url: Option<String>,
}

impl Participant {
    /// Create a participant record.
    pub fn new(id: impl Into<ParticipantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            avatar_url: None,
        }
    }

    /// Attach an avatar reference.
    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_builder() {
        let p = Participant::new(ParticipantId::new("u1"), "Alice").with_avatar("cdn://avatars/u1");
        assert_eq!(p.display_name, "Alice");
        assert_eq!(p.avatar_url.as_deref(), Some("cdn://avatars/u1"));
    }
}
