use crate::error::{AnalysisError, AnalysisResult};
use crate::nlp::TextPipeline;
use crate::question::QuestionFlags;
use crate::wordcloud::WordCloud;
use chatstats_core::constants::DELETED_ACCOUNT_NAME;
use chatstats_core::{Chat, FragmentPolicy, Sender};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Number of question replies sent by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserReplyCount {
    /// Sender display name.
    pub user: String,
    /// Replies to questions.
    pub count: usize,
}

/// Statistics over one loaded chat.
///
/// Reply and question statistics work on the chat alone; the word cloud also
/// needs a [`TextPipeline`].
#[derive(Debug, Clone)]
pub struct ChatStatistics {
    chat: Chat,
    pipeline: Option<TextPipeline>,
    fragment_policy: FragmentPolicy,
}

impl ChatStatistics {
    /// Wrap a loaded chat with the pipeline used for the word cloud.
    pub fn new(chat: Chat, pipeline: TextPipeline) -> Self {
        Self::from_chat(chat).with_pipeline(pipeline)
    }

    /// Wrap a loaded chat without a text pipeline.
    pub fn from_chat(chat: Chat) -> Self {
        Self {
            chat,
            pipeline: None,
            fragment_policy: FragmentPolicy::default(),
        }
    }

    /// Load a chat export and wrap it.
    pub fn from_path(path: impl AsRef<Path>, pipeline: TextPipeline) -> AnalysisResult<Self> {
        Ok(Self::load(path)?.with_pipeline(pipeline))
    }

    /// Load a chat export for reply and question statistics only.
    pub fn load(path: impl AsRef<Path>) -> AnalysisResult<Self> {
        let chat = Chat::load(path)?;
        Ok(Self::from_chat(chat))
    }

    /// Attach the text pipeline used for the word cloud.
    pub fn with_pipeline(mut self, pipeline: TextPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Choose which fragments of list-shaped texts feed the word cloud.
    pub fn with_fragment_policy(mut self, policy: FragmentPolicy) -> Self {
        self.fragment_policy = policy;
        self
    }

    /// The analyzed chat.
    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    /// Text pipeline used for the word cloud, if one is attached.
    pub fn pipeline(&self) -> Option<&TextPipeline> {
        self.pipeline.as_ref()
    }

    /// Flag every message as question or not.
    pub fn question_flags(&self) -> QuestionFlags {
        QuestionFlags::from_messages(&self.chat.messages)
    }

    /// Users who answered the most questions, at most `top_n` of them.
    ///
    /// A message counts when it replies to a message flagged as a question.
    /// Replies to unknown ids count as replies to non-questions. Ties keep the
    /// order in which users first replied.
    pub fn top_users(&self, top_n: usize) -> AnalysisResult<Vec<UserReplyCount>> {
        let flags = self.question_flags();
        debug!(
            "{} of {} messages are questions",
            flags.question_count(),
            flags.len()
        );

        let mut ranking: Vec<UserReplyCount> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();

        for message in &self.chat.messages {
            let Some(target) = message.reply_to_message_id else {
                continue;
            };
            if !flags.is_question(target) {
                continue;
            }

            let user = match message.sender() {
                Sender::Named(name) => name,
                Sender::Deleted => DELETED_ACCOUNT_NAME,
                Sender::Missing => {
                    return Err(AnalysisError::MissingField {
                        id: message.id,
                        field: "from",
                    })
                }
            };

            match slots.get(user) {
                Some(&slot) => ranking[slot].count += 1,
                None => {
                    slots.insert(user, ranking.len());
                    ranking.push(UserReplyCount {
                        user: user.to_string(),
                        count: 1,
                    });
                }
            }
        }

        ranking.sort_by(|a, b| b.count.cmp(&a.count));
        ranking.truncate(top_n);
        Ok(ranking)
    }

    /// Stop-word-filtered text of the whole chat, normalized.
    ///
    /// Fragments are joined with the pipeline separator. Fails when no
    /// pipeline is attached.
    pub fn word_cloud_corpus(&self) -> AnalysisResult<String> {
        let pipeline = self.pipeline.as_ref().ok_or_else(|| {
            AnalysisError::Config("word cloud needs a text pipeline".to_string())
        })?;
        let separator = pipeline.separator();
        let mut corpus = String::new();

        for message in &self.chat.messages {
            for fragment in message.text.fragments(self.fragment_policy) {
                let kept = pipeline.remove_stop_words(fragment);
                if kept.is_empty() {
                    continue;
                }
                if !corpus.is_empty() {
                    corpus.push_str(separator);
                }
                corpus.push_str(&kept);
            }
        }

        Ok(pipeline.normalizer().normalize(&corpus))
    }

    /// Render the chat word cloud to `word_cloud.png` inside `output_dir`.
    pub fn generate_word_cloud(
        &self,
        output_dir: &Path,
        renderer: &WordCloud,
    ) -> AnalysisResult<PathBuf> {
        let corpus = self.word_cloud_corpus()?;
        info!("Word cloud corpus has {} characters", corpus.chars().count());
        renderer.render_to_dir(&corpus, output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::{Normalizer, StopWords};
    use serde_json::json;

    fn pipeline(stop_words: &[&str]) -> TextPipeline {
        let normalizer = Normalizer::new().unwrap();
        let stop_words = StopWords::from_words(stop_words, &normalizer);
        TextPipeline::new(normalizer, stop_words)
    }

    fn stats(messages: serde_json::Value) -> ChatStatistics {
        let chat: Chat = serde_json::from_value(json!({ "messages": messages })).unwrap();
        ChatStatistics::from_chat(chat)
    }

    fn ranking(pairs: &[(&str, usize)]) -> Vec<UserReplyCount> {
        pairs
            .iter()
            .map(|(user, count)| UserReplyCount {
                user: user.to_string(),
                count: *count,
            })
            .collect()
    }

    #[test]
    fn counts_only_replies_to_questions() {
        let stats = stats(json!([
            {"id": 1, "text": "are you free?", "from": "A"},
            {"id": 2, "text": "yes", "from": "B", "reply_to_message_id": 1},
            {"id": 3, "text": "no reply", "from": "C"}
        ]));
        assert_eq!(stats.top_users(10).unwrap(), ranking(&[("B", 1)]));
    }

    #[test]
    fn replies_to_statements_and_unknown_ids_are_ignored() {
        let stats = stats(json!([
            {"id": 1, "text": "hello", "from": "A"},
            {"id": 2, "text": "hi", "from": "B", "reply_to_message_id": 1},
            {"id": 3, "text": "what?", "from": "C", "reply_to_message_id": 404}
        ]));
        assert!(stats.top_users(10).unwrap().is_empty());
    }

    #[test]
    fn ranking_is_descending_with_first_seen_ties() {
        let stats = stats(json!([
            {"id": 1, "text": "question one?", "from": "Q"},
            {"id": 2, "text": "سوال دوم؟", "from": "Q"},
            {"id": 3, "text": "a", "from": "Zed", "reply_to_message_id": 1},
            {"id": 4, "text": "b", "from": "Amir", "reply_to_message_id": 1},
            {"id": 5, "text": "c", "from": "Bob", "reply_to_message_id": 2},
            {"id": 6, "text": "d", "from": "Bob", "reply_to_message_id": 1},
            {"id": 7, "text": "e", "from": "Amir", "reply_to_message_id": 2},
            {"id": 8, "text": "f", "from": "Cyrus", "reply_to_message_id": 2}
        ]));

        assert_eq!(
            stats.top_users(10).unwrap(),
            ranking(&[("Amir", 2), ("Bob", 2), ("Zed", 1), ("Cyrus", 1)])
        );
        assert_eq!(
            stats.top_users(3).unwrap(),
            ranking(&[("Amir", 2), ("Bob", 2), ("Zed", 1)])
        );
        assert!(stats.top_users(0).unwrap().is_empty());
    }

    #[test]
    fn deleted_accounts_are_grouped_and_missing_senders_fail() {
        let deleted = stats(json!([
            {"id": 1, "text": "why?", "from": "A"},
            {"id": 2, "text": "because", "from": null, "reply_to_message_id": 1}
        ]));
        assert_eq!(
            deleted.top_users(10).unwrap(),
            ranking(&[(DELETED_ACCOUNT_NAME, 1)])
        );

        let missing = stats(json!([
            {"id": 1, "text": "why?", "from": "A"},
            {"id": 2, "text": "", "reply_to_message_id": 1}
        ]));
        assert!(matches!(
            missing.top_users(10),
            Err(AnalysisError::MissingField { id: 2, field: "from" })
        ));
    }

    #[test]
    fn corpus_skips_bare_string_fragments_by_default() {
        let chat: Chat = serde_json::from_value(json!({"messages": [
            {"id": 1, "text": "the cat sat", "from": "A"},
            {"id": 2, "text": ["the dog ", {"type": "bold", "text": "a big dog"}], "from": "B"}
        ]}))
        .unwrap();

        let merged = ChatStatistics::new(chat.clone(), pipeline(&["the", "a"]));
        assert_eq!(merged.word_cloud_corpus().unwrap(), "catsatbigdog");

        let spaced = ChatStatistics::new(chat, pipeline(&["the", "a"]).with_separator(" "))
            .with_fragment_policy(FragmentPolicy::All);
        assert_eq!(spaced.word_cloud_corpus().unwrap(), "cat sat dog big dog");
    }

    #[test]
    fn corpus_without_pipeline_is_a_config_error() {
        let stats = stats(json!([{"id": 1, "text": "hello there", "from": "A"}]));
        assert!(stats.pipeline().is_none());
        assert!(matches!(
            stats.word_cloud_corpus(),
            Err(AnalysisError::Config(_))
        ));
    }
}
