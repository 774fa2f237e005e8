use shared::CommandInfo;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::VoiceError;

pub type CommandAction = Arc<dyn Fn() + Send + Sync>;

/// A recognizable phrase group and the side effect it triggers.
#[derive(Clone)]
pub struct VoiceCommand {
    label: String,
    triggers: Vec<String>,
    description: String,
    action: CommandAction,
}

impl VoiceCommand {
    /// Trigger phrases are lowercased and de-duplicated. At least one
    /// non-blank phrase is required.
    pub fn new<I, S>(
        label: impl Into<String>,
        triggers: I,
        description: impl Into<String>,
        action: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self, VoiceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let label = label.into();
        let mut seen = HashSet::new();
        let mut phrases = Vec::new();
        for trigger in triggers {
            let phrase = trigger.as_ref().trim().to_lowercase();
            if phrase.is_empty() {
                return Err(VoiceError::EmptyTriggers(label));
            }
            if seen.insert(phrase.clone()) {
                phrases.push(phrase);
            }
        }
        if phrases.is_empty() {
            return Err(VoiceError::EmptyTriggers(label));
        }

        Ok(Self {
            label,
            triggers: phrases,
            description: description.into(),
            action: Arc::new(action),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Substring containment against an already lowercased transcript.
    pub fn matches(&self, lowered_transcript: &str) -> bool {
        self.triggers
            .iter()
            .any(|trigger| lowered_transcript.contains(trigger.as_str()))
    }

    pub fn invoke(&self) {
        (self.action)()
    }

    pub fn info(&self) -> CommandInfo {
        CommandInfo {
            label: self.label.clone(),
            description: self.description.clone(),
            keywords: self.triggers.clone(),
        }
    }
}

impl fmt::Debug for VoiceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceCommand")
            .field("label", &self.label)
            .field("triggers", &self.triggers)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Immutable, ordered snapshot of the commands available in one context.
///
/// Cloning shares the snapshot; a rebuild produces a new one, so a command held
/// by an in-flight match stays valid.
#[derive(Clone, Debug)]
pub struct CommandRegistry {
    commands: Arc<[VoiceCommand]>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self {
            commands: Arc::from(Vec::new()),
        }
    }
}

impl CommandRegistry {
    pub fn new(commands: Vec<VoiceCommand>) -> Result<Self, VoiceError> {
        let mut labels = HashSet::new();
        for command in &commands {
            if !labels.insert(command.label()) {
                return Err(VoiceError::DuplicateLabel(command.label().to_string()));
            }
        }
        Ok(Self {
            commands: commands.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoiceCommand> {
        self.commands.iter()
    }

    pub fn get(&self, label: &str) -> Option<&VoiceCommand> {
        self.commands.iter().find(|c| c.label() == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.commands.iter().map(VoiceCommand::label).collect()
    }

    pub fn describe(&self) -> Vec<CommandInfo> {
        self.commands.iter().map(VoiceCommand::info).collect()
    }

    pub fn same_snapshot(&self, other: &CommandRegistry) -> bool {
        Arc::ptr_eq(&self.commands, &other.commands)
    }
}
