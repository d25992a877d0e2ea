//! Provider selection

use std::fmt;

/// The AI providers a request can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Claude,
    Gemini,
}

/// Request `provider` names, already lower-cased, and the provider each selects
const DISPATCH: &[(&str, Provider)] = &[
    ("openai", Provider::OpenAi),
    ("claude", Provider::Claude),
    ("gemini", Provider::Gemini),
];

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Claude, Provider::Gemini];

    /// Look up a provider by its lower-cased request name
    pub fn from_name(name: &str) -> Option<Self> {
        DISPATCH
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, provider)| *provider)
    }

    /// Name used in the request payload and as the cargo feature
    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Claude => "claude",
            Provider::Gemini => "gemini",
        }
    }

    /// Model used when the request leaves `model` empty
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Claude => "claude-3-5-haiku-20241022",
            Provider::Gemini => "gemini-2.5-flash-preview-05-20",
        }
    }

    /// Prefix of a call failure, as in `"OpenAI Error: ..."`
    pub fn error_tag(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Claude => "Claude",
            Provider::Gemini => "Gemini",
        }
    }

    /// Vendor client name used when the provider was not built in
    pub fn library_name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Claude => "Anthropic",
            Provider::Gemini => "Google GenAI",
        }
    }

    pub fn install_hint(self) -> String {
        format!("cargo install ai-processor --features {}", self.name())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
