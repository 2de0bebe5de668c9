//! Chat transcript primitives.

/// Author of one transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// A question typed by the user.
    User,
    /// A grounded answer from the question-answering service.
    Assistant,
}

/// One labeled line in a unit's chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// Who authored the line.
    pub role: ChatRole,
    /// The line's text.
    pub text: String,
}

impl ChatLine {
    /// Build a user line.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// Build an assistant line.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}
