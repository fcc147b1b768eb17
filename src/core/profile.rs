//! Chatbot profile model.
//!
//! A [`Profile`] is a user-authored tutor configuration: a name, a free-text
//! personality, optional reference material, and two presentation choices.
//! [`ProfileInput`] is the caller-supplied part of a profile (everything the
//! store does not stamp itself) and [`ProfilePatch`] describes a partial edit.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::core::constants::{
    NAME_MAX_CHARS, PERSONALITY_MAX_CHARS, PERSONALITY_MIN_CHARS, REFERENCE_MAX_CHARS,
};

/// Tone the tutor adopts in conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStyle {
    #[default]
    Friendly,
    Professional,
    Casual,
    Academic,
    Encouraging,
}

impl ConversationStyle {
    pub const ALL: [ConversationStyle; 5] = [
        ConversationStyle::Friendly,
        ConversationStyle::Professional,
        ConversationStyle::Casual,
        ConversationStyle::Academic,
        ConversationStyle::Encouraging,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConversationStyle::Friendly => "friendly",
            ConversationStyle::Professional => "professional",
            ConversationStyle::Casual => "casual",
            ConversationStyle::Academic => "academic",
            ConversationStyle::Encouraging => "encouraging",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConversationStyle::Friendly => "Friendly & Supportive",
            ConversationStyle::Professional => "Professional",
            ConversationStyle::Casual => "Casual & Relaxed",
            ConversationStyle::Academic => "Academic",
            ConversationStyle::Encouraging => "Motivational",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ConversationStyle::Friendly => "Warm, encouraging, and helpful",
            ConversationStyle::Professional => "Clear, direct, and informative",
            ConversationStyle::Casual => "Easy-going and conversational",
            ConversationStyle::Academic => "Scholarly and detailed explanations",
            ConversationStyle::Encouraging => "Inspiring and confidence-building",
        }
    }

    fn opener(self, name: &str) -> String {
        match self {
            ConversationStyle::Friendly => {
                format!("Hi there! I'm {name}, and I'm so excited to help you learn! 😊")
            }
            ConversationStyle::Professional => format!(
                "Hello. I'm {name}, your AI tutor. I'm here to provide educational support."
            ),
            ConversationStyle::Casual => {
                format!("Hey! I'm {name}. What's up? Ready to dive into some learning?")
            }
            ConversationStyle::Academic => format!(
                "Greetings. I am {name}, your scholarly assistant. I look forward to our intellectual discourse."
            ),
            ConversationStyle::Encouraging => format!(
                "Hello, amazing learner! I'm {name}, and I believe in your potential! Let's achieve great things together!"
            ),
        }
    }

    /// Welcome line shown when a chat with this style opens.
    ///
    /// Combines the style's opener with the first sentence of the personality.
    pub fn greeting(self, name: &str, personality: &str) -> String {
        let first_sentence = personality.split('.').next().unwrap_or_default().trim();
        format!(
            "{} {}. What would you like to explore today?",
            self.opener(name),
            first_sentence
        )
    }

    /// Reply synthesised locally when the chat service cannot be reached.
    pub fn fallback_reply(self) -> &'static str {
        match self {
            ConversationStyle::Friendly => "I'm having trouble connecting to my backend service right now, but I'd love to help you! Could you try asking your question again in a moment?",
            ConversationStyle::Professional => "I'm experiencing technical difficulties with my connection. Please retry your request momentarily.",
            ConversationStyle::Casual => "Oops! Looks like I'm having some connection issues. Give me a sec and try again?",
            ConversationStyle::Academic => "I regret to inform you that I am currently experiencing connectivity issues with my knowledge base. Please attempt your inquiry again shortly.",
            ConversationStyle::Encouraging => "Don't worry! Even though I'm having some technical hiccups right now, we'll get through this together. Try asking again in just a moment!",
        }
    }
}

/// Accent colour used when rendering a profile's chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Blue,
    Green,
    Purple,
    Red,
    Orange,
    Teal,
    Pink,
}

impl ColorTheme {
    pub const ALL: [ColorTheme; 7] = [
        ColorTheme::Blue,
        ColorTheme::Green,
        ColorTheme::Purple,
        ColorTheme::Red,
        ColorTheme::Orange,
        ColorTheme::Teal,
        ColorTheme::Pink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorTheme::Blue => "blue",
            ColorTheme::Green => "green",
            ColorTheme::Purple => "purple",
            ColorTheme::Red => "red",
            ColorTheme::Orange => "orange",
            ColorTheme::Teal => "teal",
            ColorTheme::Pink => "pink",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorTheme::Blue => "Ocean Blue",
            ColorTheme::Green => "Forest Green",
            ColorTheme::Purple => "Royal Purple",
            ColorTheme::Red => "Crimson Red",
            ColorTheme::Orange => "Sunset Orange",
            ColorTheme::Teal => "Teal Ocean",
            ColorTheme::Pink => "Rose Pink",
        }
    }
}

/// Error returned when a style or theme name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChoiceError {
    kind: &'static str,
    input: String,
    expected: Vec<&'static str>,
}

impl fmt::Display for ParseChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown {} '{}' (expected one of: {})",
            self.kind,
            self.input,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for ParseChoiceError {}

impl FromStr for ConversationStyle {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseChoiceError {
                kind: "conversation style",
                input: s.to_string(),
                expected: Self::ALL.iter().map(|style| style.as_str()).collect(),
            })
    }
}

impl FromStr for ColorTheme {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseChoiceError {
                kind: "color theme",
                input: s.to_string(),
                expected: Self::ALL.iter().map(|theme| theme.as_str()).collect(),
            })
    }
}

impl fmt::Display for ConversationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted chatbot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub personality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_materials: Option<String>,
    pub conversation_style: ConversationStyle,
    pub color_theme: ColorTheme,
    #[serde(serialize_with = "serialize_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_millis")]
    pub updated_at: DateTime<Utc>,
}

/// ISO-8601 with exactly three fractional digits, e.g. `2024-05-01T10:00:00.000Z`.
fn serialize_millis<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl Profile {
    /// The caller-editable part of this profile.
    pub fn input(&self) -> ProfileInput {
        ProfileInput {
            name: self.name.clone(),
            personality: self.personality.clone(),
            reference_materials: self.reference_materials.clone(),
            conversation_style: self.conversation_style,
            color_theme: self.color_theme,
        }
    }

    pub fn greeting(&self) -> String {
        self.conversation_style
            .greeting(&self.name, &self.personality)
    }
}

/// Everything a caller supplies when creating a profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub name: String,
    pub personality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_materials: Option<String>,
    #[serde(default)]
    pub conversation_style: ConversationStyle,
    #[serde(default)]
    pub color_theme: ColorTheme,
}

impl ProfileInput {
    pub fn new(name: impl Into<String>, personality: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            personality: personality.into(),
            ..Default::default()
        }
    }

    pub fn with_reference_materials(mut self, materials: impl Into<String>) -> Self {
        self.reference_materials = Some(materials.into());
        self
    }

    pub fn with_style(mut self, style: ConversationStyle) -> Self {
        self.conversation_style = style;
        self
    }

    pub fn with_theme(mut self, theme: ColorTheme) -> Self {
        self.color_theme = theme;
        self
    }

    /// Check the form rules a profile must satisfy before it is saved.
    ///
    /// Lengths are counted in characters, not bytes. An empty list means the
    /// input is acceptable.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let name_len = self.name.chars().count();
        if self.name.trim().is_empty() {
            issues.push(ValidationIssue::NameMissing);
        } else if name_len > NAME_MAX_CHARS {
            issues.push(ValidationIssue::NameTooLong { actual: name_len });
        }

        let personality_len = self.personality.chars().count();
        if personality_len < PERSONALITY_MIN_CHARS {
            issues.push(ValidationIssue::PersonalityTooShort {
                actual: personality_len,
            });
        } else if personality_len > PERSONALITY_MAX_CHARS {
            issues.push(ValidationIssue::PersonalityTooLong {
                actual: personality_len,
            });
        }

        if let Some(materials) = &self.reference_materials {
            let len = materials.chars().count();
            if len > REFERENCE_MAX_CHARS {
                issues.push(ValidationIssue::ReferenceTooLong { actual: len });
            }
        }

        issues
    }
}

/// A rule broken by a [`ProfileInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    NameMissing,
    NameTooLong { actual: usize },
    PersonalityTooShort { actual: usize },
    PersonalityTooLong { actual: usize },
    ReferenceTooLong { actual: usize },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::NameMissing => write!(f, "Chatbot name is required"),
            ValidationIssue::NameTooLong { actual } => write!(
                f,
                "Name must be {NAME_MAX_CHARS} characters or less (got {actual})"
            ),
            ValidationIssue::PersonalityTooShort { actual } => write!(
                f,
                "Personality description must be at least {PERSONALITY_MIN_CHARS} characters (got {actual})"
            ),
            ValidationIssue::PersonalityTooLong { actual } => write!(
                f,
                "Personality description must be {PERSONALITY_MAX_CHARS} characters or less (got {actual})"
            ),
            ValidationIssue::ReferenceTooLong { actual } => write!(
                f,
                "Reference materials must be {REFERENCE_MAX_CHARS} characters or less (got {actual})"
            ),
        }
    }
}

/// A partial edit of a profile. `None` leaves the field unchanged.
///
/// `reference_materials` is doubly optional: `Some(None)` clears the
/// materials, `Some(Some(text))` replaces them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub personality: Option<String>,
    pub reference_materials: Option<Option<String>>,
    pub conversation_style: Option<ConversationStyle>,
    pub color_theme: Option<ColorTheme>,
}

impl ProfilePatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }

    pub fn reference_materials(mut self, materials: Option<String>) -> Self {
        self.reference_materials = Some(materials);
        self
    }

    pub fn style(mut self, style: ConversationStyle) -> Self {
        self.conversation_style = Some(style);
        self
    }

    pub fn theme(mut self, theme: ColorTheme) -> Self {
        self.color_theme = Some(theme);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == ProfilePatch::default()
    }

    /// Apply the patch to an input, returning the merged result.
    pub fn apply(&self, mut input: ProfileInput) -> ProfileInput {
        if let Some(name) = &self.name {
            input.name = name.clone();
        }
        if let Some(personality) = &self.personality {
            input.personality = personality.clone();
        }
        if let Some(materials) = &self.reference_materials {
            input.reference_materials = materials.clone();
        }
        if let Some(style) = self.conversation_style {
            input.conversation_style = style;
        }
        if let Some(theme) = self.color_theme {
            input.color_theme = theme;
        }
        input
    }
}
