//! Persona tiers: the "who is <name>?" two-turn dialogue, canned small-talk
//! rules, and the creator attribution override for LLM replies.

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::intent::{self, Gender, NameQuery};
use crate::provider::{AnswerProvider, ChatTurn};
use crate::text;

pub const CREATOR_ATTRIBUTION: &str = "My creator is Abhiranjan Singh — smart, funny, and a bit pagal 😜";

/// Company name that must never be credited as the bot's creator.
const DISALLOWED_CREATOR: &str = "meta";

/// Unconfirmed person queries, one slot per session.
///
/// Bounded by an LRU so abandoned sessions cannot grow the map without
/// limit; an evicted session simply loses its pending question.
pub struct PendingQueries {
    slots: Mutex<LruCache<String, NameQuery>>,
}

impl PendingQueries {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Store `query` for the session, replacing any earlier one.
    pub fn set(&self, session_id: &str, query: NameQuery) {
        self.slots.lock().put(session_id.to_string(), query);
    }

    /// Remove and return the session's pending query.
    pub fn take(&self, session_id: &str) -> Option<NameQuery> {
        self.slots.lock().pop(session_id)
    }

    pub fn peek(&self, session_id: &str) -> Option<NameQuery> {
        self.slots.lock().peek(session_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PendingQueries {
    fn default() -> Self {
        Self::new(1024)
    }
}

pub fn probe_question(gender: Gender) -> &'static str {
    match gender {
        Gender::Female => "Is she from RRSDEC Begusarai?",
        Gender::Male => "Is he from RRSDEC Begusarai?",
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn confirmation_reply(query: &NameQuery) -> String {
    let name = capitalize(&query.name);
    match query.gender {
        Gender::Female => format!(
            "Aree {} is a really sweet and confident girl from RRSDEC! 🌸 \
             Always active in events and known for her smile that can fix a whole bad day 😄. \
             Fun fact: College ke canteen wale bhi uska naam leke discount de dete hain — bas naam ka jaadu hi aisa hai! 😂",
            name
        ),
        Gender::Male => format!(
            "{} bhai is a proper RRSDEC legend 😎. \
             Coding me tez, attendance me kam, par style me full marks! 💪 \
             Fun fact: Teachers bhi kehte hain “iska confidence alag level pe hai” — par result ke time silent mode on kar deta hai 😅",
            name
        ),
    }
}

/// Name-pattern detection followed by yes/no confirmation, scoped to the
/// turn's session.
pub struct PersonDialogue {
    pending: Arc<PendingQueries>,
}

impl PersonDialogue {
    pub fn new(pending: Arc<PendingQueries>) -> Self {
        Self { pending }
    }

    /// A new name question: remember it and ask the probe question.
    pub fn detect(&self, turn: &ChatTurn) -> Option<String> {
        let query = intent::detect_name_query(&turn.message)?;
        tracing::info!("🧑 Name query for '{}' ({:?}) in session {}", query.name, query.gender, turn.session_id);
        let probe = probe_question(query.gender);
        self.pending.set(&turn.session_id, query);
        Some(probe.to_string())
    }

    /// An affirmative answer to a pending question: consume it and reply.
    pub fn confirm(&self, turn: &ChatTurn) -> Option<String> {
        if !intent::is_affirmative(&turn.message) {
            return None;
        }
        let query = self.pending.take(&turn.session_id)?;
        Some(confirmation_reply(&query))
    }
}

#[async_trait]
impl AnswerProvider for PersonDialogue {
    fn name(&self) -> &str {
        "person-dialogue"
    }

    async fn attempt(&self, turn: &ChatTurn) -> Option<String> {
        self.detect(turn).or_else(|| self.confirm(turn))
    }
}

struct Rule {
    triggers: &'static [&'static str],
    /// Whole-message match instead of substring
    exact: bool,
    reply: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        triggers: &["hi", "hello", "hey", "hii", "namaste"],
        exact: true,
        reply: "Hey there! 👋 I'm the RRSDEC campus buddy. Ask me anything about the college, or anything else really.",
    },
    Rule {
        triggers: &["what is your name", "what's your name", "who are you"],
        exact: false,
        reply: "I'm the RRSDEC Begusarai chat buddy 🤖, here to answer your questions.",
    },
    Rule {
        triggers: &["how are you", "how r u"],
        exact: false,
        reply: "Full energy mode on! 😄 How can I help you today?",
    },
    Rule {
        triggers: &["thank you", "thanks", "thx", "dhanyavad"],
        exact: false,
        reply: "Anytime! 😊",
    },
    Rule {
        triggers: &["bye", "goodbye", "good night", "see you"],
        exact: true,
        reply: "Bye! Padhai pe dhyan dena 📚",
    },
];

/// Fixed small-talk replies.
#[derive(Default)]
pub struct PersonalityRules;

impl PersonalityRules {
    /// Triggers match whole words of the normalized message, so "thanks"
    /// does not fire on "thanksgiving".
    pub fn reply(&self, message: &str) -> Option<&'static str> {
        let normalized = text::normalize(message);
        let padded = format!(" {} ", normalized);
        RULES
            .iter()
            .find(|rule| {
                rule.triggers.iter().any(|t| {
                    let trigger = text::normalize(t);
                    if rule.exact {
                        normalized == trigger
                    } else {
                        padded.contains(&format!(" {} ", trigger))
                    }
                })
            })
            .map(|rule| rule.reply)
    }
}

#[async_trait]
impl AnswerProvider for PersonalityRules {
    fn name(&self) -> &str {
        "personality"
    }

    async fn attempt(&self, turn: &ChatTurn) -> Option<String> {
        self.reply(&turn.message).map(str::to_string)
    }
}

/// Replace an LLM reply that credits the disallowed company when the user
/// asked who created something.
pub fn apply_creator_attribution(message: &str, reply: String) -> String {
    if reply.to_lowercase().contains(DISALLOWED_CREATOR) && intent::asks_who_created(message) {
        tracing::info!("🪪 Rewriting creator attribution");
        CREATOR_ATTRIBUTION.to_string()
    } else {
        reply
    }
}

/// Wraps a provider (the LLM tier) and applies the creator attribution
/// override to whatever it returns.
pub struct CreatorAttribution<P> {
    inner: P,
}

impl<P> CreatorAttribution<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: AnswerProvider> AnswerProvider for CreatorAttribution<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn attempt(&self, turn: &ChatTurn) -> Option<String> {
        let reply = self.inner.attempt(turn).await?;
        Some(apply_creator_attribution(&turn.message, reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialogue() -> (PersonDialogue, Arc<PendingQueries>) {
        let pending = Arc::new(PendingQueries::new(16));
        (PersonDialogue::new(pending.clone()), pending)
    }

    #[tokio::test]
    async fn test_female_probe_and_pending_slot() {
        let (dialogue, pending) = dialogue();
        let reply = dialogue.attempt(&ChatTurn::new("who is Priya", None)).await;
        assert_eq!(reply.as_deref(), Some("Is she from RRSDEC Begusarai?"));

        let stored = pending.peek("default").unwrap();
        assert_eq!(stored.name, "priya");
        assert_eq!(stored.gender, Gender::Female);
    }

    #[tokio::test]
    async fn test_male_probe() {
        let (dialogue, pending) = dialogue();
        let reply = dialogue.attempt(&ChatTurn::new("who is Rohan", None)).await;
        assert_eq!(reply.as_deref(), Some("Is he from RRSDEC Begusarai?"));
        assert_eq!(pending.peek("default").unwrap().gender, Gender::Male);
    }

    #[tokio::test]
    async fn test_confirmation_consumes_pending() {
        let (dialogue, pending) = dialogue();
        dialogue.attempt(&ChatTurn::new("who is Priya", None)).await;

        let reply = dialogue.attempt(&ChatTurn::new("yes", None)).await.unwrap();
        assert!(reply.starts_with("Aree Priya is a really sweet"));
        assert!(pending.is_empty());

        assert_eq!(dialogue.attempt(&ChatTurn::new("yes", None)).await, None);
    }

    #[tokio::test]
    async fn test_male_confirmation_template() {
        let (dialogue, _) = dialogue();
        dialogue.attempt(&ChatTurn::new("do you know rohan", None)).await;
        let reply = dialogue.attempt(&ChatTurn::new("Haan", None)).await.unwrap();
        assert!(reply.starts_with("Rohan bhai is a proper RRSDEC legend"));
    }

    #[tokio::test]
    async fn test_unrelated_message_keeps_pending() {
        let (dialogue, pending) = dialogue();
        dialogue.attempt(&ChatTurn::new("who is Priya", None)).await;
        assert_eq!(dialogue.attempt(&ChatTurn::new("hostel fee?", None)).await, None);
        assert_eq!(pending.peek("default").unwrap().name, "priya");
    }

    #[tokio::test]
    async fn test_new_name_overwrites_pending() {
        let (dialogue, pending) = dialogue();
        dialogue.attempt(&ChatTurn::new("who is Priya", None)).await;
        dialogue.attempt(&ChatTurn::new("what about Rohan", None)).await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.peek("default").unwrap().name, "rohan");
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_pending() {
        let (dialogue, _) = dialogue();
        dialogue
            .attempt(&ChatTurn::new("who is Priya", Some("alice".into())))
            .await;
        assert_eq!(
            dialogue.attempt(&ChatTurn::new("yes", Some("bob".into()))).await,
            None
        );
        assert!(dialogue
            .attempt(&ChatTurn::new("yes", Some("alice".into())))
            .await
            .unwrap()
            .contains("Priya"));
    }

    #[test]
    fn test_pending_capacity_evicts_oldest() {
        let pending = PendingQueries::new(2);
        for (session, name) in [("s1", "amit"), ("s2", "neha"), ("s3", "ravi")] {
            pending.set(
                session,
                NameQuery {
                    name: name.to_string(),
                    gender: Gender::guess_from_name(name),
                },
            );
        }
        assert_eq!(pending.len(), 2);
        assert!(pending.peek("s1").is_none());
        assert!(pending.peek("s3").is_some());
    }

    #[test]
    fn test_personality_rules() {
        let rules = PersonalityRules;
        assert!(rules.reply("Hello!").unwrap().starts_with("Hey there"));
        assert!(rules.reply("what's your name?").is_some());
        assert!(rules.reply("thanks a lot").is_some());
        assert!(rules.reply("hello, what is the hostel fee").is_none());
        assert!(rules.reply("who created you").is_none());
        assert!(rules.reply("this ship is high").is_none());
    }

    #[test]
    fn test_rules_match_whole_words_only() {
        let rules = PersonalityRules;
        assert_eq!(rules.reply("how are your exams scheduled"), None);
        assert_eq!(rules.reply("who are your teachers"), None);
        assert_eq!(rules.reply("what is thanksgiving"), None);
        assert!(rules.reply("hey, how are you?").is_some());
        assert!(rules.reply("ok thanks!").is_some());
    }

    #[test]
    fn test_creator_attribution_override() {
        let replaced = apply_creator_attribution(
            "who created you",
            "I was created by Meta AI.".to_string(),
        );
        assert_eq!(replaced, CREATOR_ATTRIBUTION);

        let kept = apply_creator_attribution("what is meta learning", "Meta learning is...".to_string());
        assert_eq!(kept, "Meta learning is...");

        let kept = apply_creator_attribution("who created python", "Guido van Rossum".to_string());
        assert_eq!(kept, "Guido van Rossum");
    }

    struct Fixed(&'static str);

    #[async_trait]
    impl AnswerProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn attempt(&self, _turn: &ChatTurn) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_creator_attribution_wrapper() {
        let wrapped = CreatorAttribution::new(Fixed("Meta built me"));
        let reply = wrapped.attempt(&ChatTurn::new("Who created you?", None)).await;
        assert_eq!(reply.as_deref(), Some(CREATOR_ATTRIBUTION));
    }
}
