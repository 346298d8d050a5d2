use crate::nlp::SentenceTokenizer;
use chatstats_core::constants::QUESTION_MARKS;
use chatstats_core::{Message, MessageId};
use std::collections::HashMap;

/// Whether any sentence of `text` contains a Latin or Arabic question mark.
pub fn is_question_text(text: &str) -> bool {
    SentenceTokenizer
        .tokenize(text)
        .into_iter()
        .any(|sentence| sentence.contains(&QUESTION_MARKS[..]))
}

/// Whether the flattened text of `message` asks a question.
pub fn message_has_question(message: &Message) -> bool {
    is_question_text(&message.flat_text())
}

/// Question status of a message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    /// The message asks a question.
    Question,
    /// The message exists and does not ask a question.
    NotQuestion,
    /// No message with this id was seen.
    Unknown,
}

/// Question flag of every message in a chat, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct QuestionFlags {
    flags: HashMap<MessageId, bool>,
}

impl QuestionFlags {
    /// Flag every message. A repeated id keeps the flag of its last message.
    pub fn from_messages<'a, I>(messages: I) -> Self
    where
        I: IntoIterator<Item = &'a Message>,
    {
        let flags = messages
            .into_iter()
            .map(|message| (message.id, message_has_question(message)))
            .collect();
        Self { flags }
    }

    /// Status of `id`, telling unseen ids apart from non-questions.
    pub fn status(&self, id: MessageId) -> QuestionStatus {
        match self.flags.get(&id) {
            Some(true) => QuestionStatus::Question,
            Some(false) => QuestionStatus::NotQuestion,
            None => QuestionStatus::Unknown,
        }
    }

    /// Whether `id` is a question. Unseen ids are not questions.
    pub fn is_question(&self, id: MessageId) -> bool {
        self.status(id) == QuestionStatus::Question
    }

    /// Number of messages flagged as questions.
    pub fn question_count(&self) -> usize {
        self.flags.values().filter(|flag| **flag).count()
    }

    /// Number of flagged ids.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true if no message was flagged.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(value: serde_json::Value) -> Message {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn detects_latin_and_persian_question_marks() {
        assert!(is_question_text("are you free?"));
        assert!(is_question_text("کجا هستی؟"));
        assert!(is_question_text("I am here. Where are you? Call me."));
    }

    #[test]
    fn statements_and_empty_text_are_not_questions() {
        assert!(!is_question_text("I am free."));
        assert!(!is_question_text(""));
        assert!(!is_question_text("من هستم!"));
    }

    #[test]
    fn fragmented_text_is_flattened_before_detection() {
        let msg = message(json!({
            "id": 1,
            "text": ["how does ", {"type": "code", "text": "Vec::new"}, " work?"]
        }));
        assert!(message_has_question(&msg));
    }

    #[test]
    fn status_separates_unknown_ids() {
        let messages = vec![
            message(json!({"id": 1, "text": "why?"})),
            message(json!({"id": 2, "text": "because"})),
        ];
        let flags = QuestionFlags::from_messages(&messages);

        assert_eq!(flags.status(1), QuestionStatus::Question);
        assert_eq!(flags.status(2), QuestionStatus::NotQuestion);
        assert_eq!(flags.status(99), QuestionStatus::Unknown);
        assert!(!flags.is_question(99));
        assert_eq!(flags.question_count(), 1);
        assert_eq!(flags.len(), 2);
    }
}
