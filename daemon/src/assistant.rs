//! Help-dialog chat assistant.
//!
//! Independent of the voice command grammar: an utterance is classified against
//! a fixed, ordered list of topic rules and answered with a canned reply.

use shared::{ChatLine, ChatSender};
use std::fmt;
use tokio::time::{Duration, Instant};
use tracing::debug;

pub const GREETING: &str = "Hello! How can I help you today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Scanner,
    Payment,
    Returns,
    Voice,
    Catalogue,
    Membership,
    TryOn,
    Cart,
    Greeting,
    Thanks,
}

impl Topic {
    pub fn name(&self) -> &'static str {
        match self {
            Topic::Scanner => "scanning items",
            Topic::Payment => "payment",
            Topic::Returns => "returns",
            Topic::Voice => "voice commands",
            Topic::Catalogue => "browsing the catalogue",
            Topic::Membership => "membership",
            Topic::TryOn => "virtual try-on",
            Topic::Cart => "your cart",
            Topic::Greeting => "greetings",
            Topic::Thanks => "thanks",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct TopicRule {
    topic: Topic,
    keywords: &'static [&'static str],
    response: &'static str,
}

const RULES: &[TopicRule] = &[
    TopicRule {
        topic: Topic::Scanner,
        keywords: &["scan", "scanner", "checkout", "barcode"],
        response: "The scanner is on the \"Start Checkout\" page. Hold each item's barcode under the scanner, or say \"scan item\", to add it to your cart.",
    },
    TopicRule {
        topic: Topic::Payment,
        keywords: &["pay", "payment", "card", "face id", "faceid"],
        response: "After adding items to your cart, choose \"Pay Now\" and pick a payment method: Credit Card or Face ID Payment.",
    },
    TopicRule {
        topic: Topic::Returns,
        keywords: &["return", "refund", "exchange"],
        response: "Go to \"Return Items\" from the home page, scan your receipt and select the items to return. Items can be returned within 30 days.",
    },
    TopicRule {
        topic: Topic::Voice,
        keywords: &["voice", "speak", "microphone", "talk", "listen"],
        response: "Switch to voice and touch mode and just say what you need, for example \"go home\", \"browse catalogue\" or \"pay now\".",
    },
    TopicRule {
        topic: Topic::Catalogue,
        keywords: &["catalogue", "catalog", "browse", "product", "clothes", "size"],
        response: "Visit the \"Catalogue\" page to see all available products. You can filter by category (Men/Women/Unisex) and size.",
    },
    TopicRule {
        topic: Topic::Membership,
        keywords: &["member", "loyalty", "sign up", "signup", "join", "account", "register"],
        response: "Choose \"Not a member? Join Now\" on the home page or open the Signup page. Enter your name and phone number to join the loyalty program.",
    },
    TopicRule {
        topic: Topic::TryOn,
        keywords: &["try on", "try-on", "fitting", "mirror"],
        response: "Open the \"Try-On\" page, or pick \"Try On\" on any product in the catalogue, then select a product to see how it looks.",
    },
    TopicRule {
        topic: Topic::Cart,
        keywords: &["cart", "basket", "remove item", "items i have"],
        response: "Your cart is shown on the scanner page. You can remove single items there, or say \"clear cart\" to start over.",
    },
    TopicRule {
        topic: Topic::Greeting,
        keywords: &["hello", "hey", "good morning", "good afternoon", "good evening", "hi there"],
        response: "Hi! I can help you with checkout, payment, returns and more. What would you like to do?",
    },
    TopicRule {
        topic: Topic::Thanks,
        keywords: &["thank", "cheers", "appreciate"],
        response: "You're welcome! Let me know if there is anything else I can help with.",
    },
];

const FALLBACK_TOPICS: [Topic; 8] = [
    Topic::Scanner,
    Topic::Payment,
    Topic::Returns,
    Topic::Voice,
    Topic::Catalogue,
    Topic::Membership,
    Topic::TryOn,
    Topic::Cart,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub topic: Option<Topic>,
    pub text: String,
}

pub fn classify(utterance: &str) -> Reply {
    let lowered = utterance.to_lowercase();
    if let Some(rule) = RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
    {
        debug!("Chat utterance classified as {:?}", rule.topic);
        return Reply {
            topic: Some(rule.topic),
            text: rule.response.to_string(),
        };
    }

    let topics = FALLBACK_TOPICS
        .iter()
        .map(Topic::name)
        .collect::<Vec<_>>()
        .join(", ");
    Reply {
        topic: None,
        text: format!(
            "I understand you're asking about \"{}\". I'm not sure about that one yet. Try asking about: {}.",
            utterance.trim(),
            topics
        ),
    }
}

/// Message log of one help-dialog lifetime.
pub struct ChatSession {
    messages: Vec<ChatLine>,
    next_id: u64,
    thinking_delay: Duration,
    pending: Vec<(Instant, String)>,
}

impl ChatSession {
    pub fn open(thinking_delay: Duration) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            next_id: 1,
            thinking_delay,
            pending: Vec::new(),
        };
        session.push(ChatSender::Assistant, GREETING.to_string());
        session
    }

    fn push(&mut self, sender: ChatSender, text: String) {
        self.messages.push(ChatLine {
            id: self.next_id,
            sender,
            text,
        });
        self.next_id += 1;
    }

    /// Appends the user message and schedules the reply. Returns when it is due.
    pub fn submit(&mut self, text: &str, now: Instant) -> Instant {
        let text = text.trim().to_string();
        let due = now + self.thinking_delay;
        self.push(ChatSender::User, text.clone());
        self.pending.push((due, text));
        due
    }

    /// Appends every reply whose thinking delay has elapsed, in submission order.
    pub fn poll(&mut self, now: Instant) {
        while self.pending.first().is_some_and(|(due, _)| *due <= now) {
            let (_, utterance) = self.pending.remove(0);
            let reply = classify(&utterance);
            self.push(ChatSender::Assistant, reply.text);
        }
    }

    pub fn messages(&self) -> &[ChatLine] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_falls_back_with_topic_list() {
        let reply = classify("what is the weather");
        assert_eq!(reply.topic, None);
        assert!(reply.text.contains("what is the weather"));
        assert!(reply.text.contains("Try asking about:"));
        for topic in FALLBACK_TOPICS {
            assert!(reply.text.contains(topic.name()), "missing {}", topic);
        }
    }

    #[test]
    fn test_topics_classified() {
        let cases = [
            ("Where is the scanner?", Topic::Scanner),
            ("How do I PAY?", Topic::Payment),
            ("Can I get a refund", Topic::Returns),
            ("does the microphone work", Topic::Voice),
            ("browse jackets", Topic::Catalogue),
            ("how do I join the loyalty program", Topic::Membership),
            ("can I try on this shirt", Topic::TryOn),
            ("what's in my basket", Topic::Cart),
            ("hello", Topic::Greeting),
            ("thank you", Topic::Thanks),
        ];
        for (utterance, topic) in cases {
            assert_eq!(classify(utterance).topic, Some(topic), "{}", utterance);
        }
    }

    #[test]
    fn test_first_rule_wins() {
        // Mentions both checkout and payment; scanner is listed first.
        assert_eq!(
            classify("checkout and pay").topic,
            Some(Topic::Scanner)
        );
    }

    #[test]
    fn test_session_starts_with_greeting() {
        let session = ChatSession::open(Duration::from_secs(1));
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].sender, ChatSender::Assistant);
        assert_eq!(session.messages()[0].text, GREETING);
    }

    #[test]
    fn test_reply_appended_after_thinking_delay() {
        let mut session = ChatSession::open(Duration::from_secs(1));
        let now = Instant::now();

        let due = session.submit("  How do I pay? ", now);
        assert_eq!(due, now + Duration::from_secs(1));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].text, "How do I pay?");

        session.poll(now + Duration::from_millis(999));
        assert_eq!(session.messages().len(), 2);

        session.poll(due);
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2].sender, ChatSender::Assistant);
        assert!(session.messages()[2].text.contains("Pay Now"));

        session.poll(due + Duration::from_secs(5));
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut session = ChatSession::open(Duration::ZERO);
        let now = Instant::now();
        session.submit("hello", now);
        session.submit("thanks", now);
        session.poll(now);

        let ids: Vec<u64> = session.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        let senders: Vec<ChatSender> = session.messages().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![
                ChatSender::Assistant,
                ChatSender::User,
                ChatSender::User,
                ChatSender::Assistant,
                ChatSender::Assistant,
            ]
        );
    }
}
