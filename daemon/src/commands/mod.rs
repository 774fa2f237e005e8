pub mod builder;
pub mod matcher;
pub mod registry;

pub use builder::{NavigationContext, RegistryBuilder};
pub use matcher::{CommandMatcher, MatchResult};
pub use registry::{CommandRegistry, VoiceCommand};
