use serde::{Deserialize, Serialize};

/// Transcript text appended when the user interrupts a reply.
pub const STOPPED_BY_USER_NOTICE: &str = "⚠️ Response generation stopped by user.";

/// Transcript text appended for every other generation failure.
pub const GENERATION_FAILED_NOTICE: &str = "❌ Error occurred while generating response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sender {
    User,
    Bot,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
            Sender::System => "system",
        }
    }

    pub fn is_bot(self) -> bool {
        self == Sender::Bot
    }

    pub fn is_system(self) -> bool {
        self == Sender::System
    }
}

impl TryFrom<&str> for Sender {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            "system" => Ok(Sender::System),
            _ => Err(format!("invalid message sender: {value}")),
        }
    }
}

impl TryFrom<String> for Sender {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Sender> for String {
    fn from(value: Sender) -> Self {
        value.as_str().to_string()
    }
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// Empty bot message that the next streamed reply grows into.
    pub fn bot_placeholder() -> Self {
        Self::new(Sender::Bot, String::new())
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Sender::System, text)
    }

    pub fn is_bot(&self) -> bool {
        self.sender.is_bot()
    }

    pub fn is_system(&self) -> bool {
        self.sender.is_system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_an_empty_bot_message() {
        let placeholder = Message::bot_placeholder();
        assert!(placeholder.is_bot());
        assert!(placeholder.text.is_empty());
    }

    #[test]
    fn sender_round_trips_through_strings() {
        for sender in [Sender::User, Sender::Bot, Sender::System] {
            let text: String = sender.into();
            assert_eq!(Sender::try_from(text).expect("valid sender"), sender);
        }
    }

    #[test]
    fn invalid_sender_strings_are_rejected() {
        assert!(Sender::try_from("assistant").is_err());
    }

    #[test]
    fn messages_serialize_with_lowercase_senders() {
        let json = serde_json::to_string(&Message::system("hi")).expect("serialize");
        assert_eq!(json, r#"{"sender":"system","text":"hi"}"#);
    }
}
