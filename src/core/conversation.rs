use crate::core::message::Message;

/// In-memory conversation state: the transcript, the pending input, and
/// whether a reply is currently being generated.
///
/// The transcript only ever grows. While a reply streams, the last message's
/// text is replaced in place with the running accumulator.
#[derive(Debug, Default, Clone)]
pub struct ConversationState {
    messages: Vec<Message>,
    input: String,
    generating: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Replace the text of the last message. Returns `false` (and changes
    /// nothing) when the transcript is empty.
    pub fn update_last_message(&mut self, text: &str) -> bool {
        match self.messages.last_mut() {
            Some(last) => {
                last.text.clear();
                last.text.push_str(text);
                true
            }
            None => false,
        }
    }

    pub fn input_buffer(&self) -> &str {
        &self.input
    }

    pub fn set_input_buffer(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn clear_input_buffer(&mut self) {
        self.input.clear();
    }

    pub fn push_input_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn pop_input_char(&mut self) -> Option<char> {
        self.input.pop()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn set_generating(&mut self, generating: bool) {
        self.generating = generating;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Sender;

    #[test]
    fn append_preserves_insertion_order() {
        let mut state = ConversationState::new();
        state.append_message(Message::user("one"));
        state.append_message(Message::bot_placeholder());
        state.append_message(Message::system("three"));

        let senders: Vec<Sender> = state.messages().iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Bot, Sender::System]);
    }

    #[test]
    fn update_last_message_only_touches_the_tail() {
        let mut state = ConversationState::new();
        state.append_message(Message::user("question"));
        state.append_message(Message::bot_placeholder());

        assert!(state.update_last_message("partial"));
        assert!(state.update_last_message("partial answer"));

        assert_eq!(state.messages()[0].text, "question");
        assert_eq!(state.last_message().expect("last").text, "partial answer");
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn update_last_message_on_empty_transcript_is_a_no_op() {
        let mut state = ConversationState::new();
        assert!(!state.update_last_message("orphan"));
        assert!(state.is_empty());
    }

    #[test]
    fn input_buffer_is_independent_of_transcript() {
        let mut state = ConversationState::new();
        state.set_input_buffer("draft");
        state.push_input_char('!');
        assert_eq!(state.input_buffer(), "draft!");
        assert_eq!(state.pop_input_char(), Some('!'));

        state.append_message(Message::user("sent"));
        assert_eq!(state.input_buffer(), "draft");

        state.clear_input_buffer();
        assert!(state.input_buffer().is_empty());
        assert_eq!(state.len(), 1);
    }
}
