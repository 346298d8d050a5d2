use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info};

/// Telegram message identifier.
pub type MessageId = i64;

/// A Telegram chat export.
///
/// Only `messages` is interpreted. Every other top-level key (`name`, `type`,
/// `id`, ...) is carried through untouched so that a loaded chat serializes
/// back to the same JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Messages in export order.
    pub messages: Vec<Message>,

    /// Remaining export keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Chat {
    /// Load a chat export from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let chat = Self::from_json_str(&content)?;
        info!(
            "Loaded {} messages from {}",
            chat.messages.len(),
            path.display()
        );
        Ok(chat)
    }

    /// Parse a chat export from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let chat: Self = serde_json::from_str(content)?;
        debug!("Parsed chat export with {} messages", chat.messages.len());
        Ok(chat)
    }

    /// Number of messages in the chat.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the chat has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A single exported message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message id, unique within the chat.
    pub id: MessageId,

    /// Message body.
    pub text: MessageText,

    /// Sender display name. The outer `Option` records whether the key was
    /// present at all, the inner one whether it was `null`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub from: Option<Option<String>>,

    /// Id of the message this one replies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<MessageId>,

    /// Remaining message keys (`date`, `type`, `from_id`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sender of a message as it appears in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender<'a> {
    /// The `from` key is absent (service messages).
    Missing,
    /// The `from` key is `null` (deleted accounts).
    Deleted,
    /// A named sender.
    Named(&'a str),
}

impl Message {
    /// Sender of this message.
    pub fn sender(&self) -> Sender<'_> {
        match &self.from {
            None => Sender::Missing,
            Some(None) => Sender::Deleted,
            Some(Some(name)) => Sender::Named(name),
        }
    }

    /// Message text flattened into one string.
    pub fn flat_text(&self) -> Cow<'_, str> {
        self.text.flatten()
    }
}

/// The `text` field of a message: a plain string or a list of fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageText {
    /// Plain text.
    Plain(String),
    /// Ordered text fragments (plain runs mixed with formatted entities).
    Fragments(Vec<Fragment>),
}

/// One entry of a fragmented message text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fragment {
    /// Bare string run.
    Plain(String),
    /// Formatted entity (link, mention, bold, ...).
    Entity(TextEntity),
}

/// A formatted entity inside a fragmented message text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEntity {
    /// Entity text, when the entity carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Remaining entity keys (`type`, `href`, `user_id`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which fragments of a fragmented text take part in word extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentPolicy {
    /// Only entities carrying `text`; bare string runs are skipped.
    #[default]
    EntitiesOnly,
    /// Bare string runs and entity texts, like [`MessageText::flatten`].
    All,
}

impl MessageText {
    /// Concatenate all text into one string, with no separators.
    ///
    /// Plain strings and entity texts are kept in order; entities without
    /// text are skipped. A plain text is returned borrowed.
    pub fn flatten(&self) -> Cow<'_, str> {
        match self {
            Self::Plain(text) => Cow::Borrowed(text),
            Self::Fragments(fragments) => {
                let mut text = String::new();
                for fragment in fragments {
                    if let Some(part) = fragment.text() {
                        text.push_str(part);
                    }
                }
                Cow::Owned(text)
            }
        }
    }

    /// Text fragments selected by `policy`, in order.
    ///
    /// A plain text always yields itself once.
    pub fn fragments(&self, policy: FragmentPolicy) -> Vec<&str> {
        match self {
            Self::Plain(text) => vec![text.as_str()],
            Self::Fragments(fragments) => fragments
                .iter()
                .filter_map(|fragment| match (fragment, policy) {
                    (Fragment::Plain(_), FragmentPolicy::EntitiesOnly) => None,
                    _ => fragment.text(),
                })
                .collect(),
        }
    }
}

impl Fragment {
    /// Text carried by this fragment, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Plain(text) => Some(text),
            Self::Entity(entity) => entity.text.as_deref(),
        }
    }
}

fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
