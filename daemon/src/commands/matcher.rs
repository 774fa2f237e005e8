use tokio::time::{Duration, Instant};
use tracing::{debug, info};

use super::registry::{CommandRegistry, VoiceCommand};

/// Last successful match, kept briefly for UI feedback only.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub command: VoiceCommand,
    pub matched_at: Instant,
}

/// First command in registry order with a trigger contained in the transcript.
pub fn find_command<'a>(registry: &'a CommandRegistry, transcript: &str) -> Option<&'a VoiceCommand> {
    let lowered = transcript.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    registry.iter().find(|command| command.matches(&lowered))
}

pub struct CommandMatcher {
    auto_execute: bool,
    clear_delay: Duration,
    last_match: Option<MatchResult>,
    clear_at: Option<Instant>,
}

impl CommandMatcher {
    pub fn new(auto_execute: bool, clear_delay: Duration) -> Self {
        Self {
            auto_execute,
            clear_delay,
            last_match: None,
            clear_at: None,
        }
    }

    /// Resolves one finalized transcript and fires at most one action.
    pub fn dispatch(
        &mut self,
        transcript: &str,
        registry: &CommandRegistry,
        now: Instant,
    ) -> Option<&MatchResult> {
        let Some(command) = find_command(registry, transcript) else {
            debug!("No voice command matched '{}'", transcript.trim());
            return None;
        };

        info!("Voice command matched: {}", command.label());
        self.last_match = Some(MatchResult {
            command: command.clone(),
            matched_at: now,
        });
        self.clear_at = Some(now + self.clear_delay);

        if self.auto_execute {
            command.invoke();
        }

        self.last_match.as_ref()
    }

    pub fn last_match(&self) -> Option<&MatchResult> {
        self.last_match.as_ref()
    }

    pub fn clear(&mut self) {
        self.last_match = None;
        self.clear_at = None;
    }

    pub fn poll_timers(&mut self, now: Instant) {
        if self.clear_at.is_some_and(|at| at <= now) {
            self.clear();
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.clear_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counted {
        registry: CommandRegistry,
        counters: Vec<Arc<AtomicUsize>>,
    }

    impl Counted {
        fn new(specs: &[(&str, &[&str])]) -> Self {
            let mut commands = Vec::new();
            let mut counters = Vec::new();
            for (label, triggers) in specs {
                let counter = Arc::new(AtomicUsize::new(0));
                let hits = Arc::clone(&counter);
                commands.push(
                    VoiceCommand::new(*label, triggers.iter().copied(), "", move || {
                        hits.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap(),
                );
                counters.push(counter);
            }
            Self {
                registry: CommandRegistry::new(commands).unwrap(),
                counters,
            }
        }

        fn hits(&self) -> Vec<usize> {
            self.counters
                .iter()
                .map(|c| c.load(Ordering::SeqCst))
                .collect()
        }
    }

    fn matcher() -> CommandMatcher {
        CommandMatcher::new(true, Duration::from_millis(2000))
    }

    #[test]
    fn test_every_keyword_selects_its_command() {
        let specs: &[(&str, &[&str])] = &[
            ("Go Home", &["go home", "main page"]),
            ("Scan Item", &["scan item", "add item"]),
            ("Show Women's", &["women", "female"]),
        ];
        let counted = Counted::new(specs);

        for (label, triggers) in specs {
            for trigger in *triggers {
                let exact = find_command(&counted.registry, trigger).unwrap();
                assert_eq!(exact.label(), *label);

                let sentence = format!("Could you please {} for me", trigger.to_uppercase());
                let embedded = find_command(&counted.registry, &sentence).unwrap();
                assert_eq!(embedded.label(), *label);
            }
        }
    }

    #[test]
    fn test_no_match_invokes_nothing() {
        let counted = Counted::new(&[("Go Home", &["home"]), ("Pay Now", &["pay now"])]);
        let mut matcher = matcher();

        assert!(matcher
            .dispatch("what is the weather", &counted.registry, Instant::now())
            .is_none());
        assert_eq!(counted.hits(), vec![0, 0]);
        assert!(matcher.last_match().is_none());
        assert!(matcher.next_deadline().is_none());
    }

    #[test]
    fn test_blank_transcript_matches_nothing() {
        let counted = Counted::new(&[("Go Home", &["home"])]);
        assert!(find_command(&counted.registry, "   ").is_none());
    }

    #[test]
    fn test_overlapping_keywords_fire_only_first() {
        let counted = Counted::new(&[
            ("Scan Item", &["scan item"]),
            ("Start Checkout", &["scan"]),
            ("Scan Again", &["item"]),
        ]);
        let mut matcher = matcher();

        let result = matcher
            .dispatch("please scan item", &counted.registry, Instant::now())
            .unwrap();
        assert_eq!(result.command.label(), "Scan Item");
        assert_eq!(counted.hits(), vec![1, 0, 0]);
    }

    #[test]
    fn test_each_dispatch_fires_once() {
        let counted = Counted::new(&[("Go Home", &["home"])]);
        let mut matcher = matcher();
        let now = Instant::now();

        matcher.dispatch("home", &counted.registry, now);
        assert_eq!(counted.hits(), vec![1]);
        matcher.dispatch("home home home", &counted.registry, now);
        assert_eq!(counted.hits(), vec![2]);
    }

    #[test]
    fn test_match_result_clears_after_delay() {
        let counted = Counted::new(&[("Go Home", &["home"])]);
        let mut matcher = matcher();
        let now = Instant::now();

        matcher.dispatch("go home", &counted.registry, now);
        assert_eq!(matcher.last_match().unwrap().matched_at, now);

        matcher.poll_timers(now + Duration::from_millis(1999));
        assert!(matcher.last_match().is_some());

        matcher.poll_timers(now + Duration::from_millis(2000));
        assert!(matcher.last_match().is_none());
        assert!(matcher.next_deadline().is_none());
    }

    #[test]
    fn test_auto_execute_disabled_records_only() {
        let counted = Counted::new(&[("Go Home", &["home"])]);
        let mut matcher = CommandMatcher::new(false, Duration::from_millis(2000));

        let result = matcher.dispatch("home", &counted.registry, Instant::now());
        assert!(result.is_some());
        assert_eq!(counted.hits(), vec![0]);
    }
}
