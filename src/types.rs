//! Core types shared across the keyboard.
//!
//! - [`Key`] - A single logical key on the rendered keyboard
//! - [`LayoutName`] - The three key arrangements
//! - [`ShiftTransform`] - Display label and inserted text for a key
//! - [`Direction`] - Caret movement direction
//! - [`InputType`] - Declared type of a single-line input

use std::fmt;

// =============================================================================
// Key
// =============================================================================

/// A key token.
///
/// Literal characters carry the character itself. Control keys are the fixed
/// set of named tokens that the controller handles instead of inserting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Space,
    Enter,
    Backspace,
    Decimal,
    Left,
    Right,
    Sign,
    Shift,
}

impl Key {
    /// Parse a token identifier (`"a"`, `"space"`, `"backspace"`, ...).
    ///
    /// Returns `None` for empty strings and for multi-character strings that
    /// are not one of the control tokens.
    pub fn parse(token: &str) -> Option<Self> {
        let key = match token {
            "space" => Self::Space,
            "enter" => Self::Enter,
            "backspace" => Self::Backspace,
            "decimal" => Self::Decimal,
            "left" => Self::Left,
            "right" => Self::Right,
            "sign" => Self::Sign,
            "shift" => Self::Shift,
            _ => {
                let mut chars = token.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Self::Char(c)
            }
        };
        Some(key)
    }

    /// The token identifier for this key.
    pub fn token(&self) -> String {
        match self {
            Self::Char(c) => c.to_string(),
            Self::Space => "space".to_string(),
            Self::Enter => "enter".to_string(),
            Self::Backspace => "backspace".to_string(),
            Self::Decimal => "decimal".to_string(),
            Self::Left => "left".to_string(),
            Self::Right => "right".to_string(),
            Self::Sign => "sign".to_string(),
            Self::Shift => "shift".to_string(),
        }
    }

    /// True for named control tokens.
    pub fn is_control(&self) -> bool {
        !matches!(self, Self::Char(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

// =============================================================================
// Layout Name
// =============================================================================

/// Named key arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutName {
    #[default]
    Alpha,
    AlphaEmail,
    Numeric,
}

impl LayoutName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::AlphaEmail => "alphaEmail",
            Self::Numeric => "numeric",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric)
    }

    /// The input mode this layout belongs to. The email variant is an
    /// alphabetic layout picked per field, so it folds to `Alpha`.
    pub fn base(&self) -> Self {
        match self {
            Self::AlphaEmail => Self::Alpha,
            other => *other,
        }
    }
}

impl fmt::Display for LayoutName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Shift Transform
// =============================================================================

/// What a key shows and what it inserts under the current shift state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftTransform {
    pub label: String,
    pub text: String,
}

impl ShiftTransform {
    /// Transform whose label and inserted text are the same string.
    pub fn same(s: impl Into<String>) -> Self {
        let s = s.into();
        Self { label: s.clone(), text: s }
    }
}

// =============================================================================
// Direction
// =============================================================================

/// Caret movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

// =============================================================================
// Input Type
// =============================================================================

/// Declared `type` of a single-line input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum InputType {
    #[default]
    Text,
    Search,
    Password,
    Url,
    Tel,
    Email,
    Number,
    /// Anything outside the whitelist (checkbox, date, ...), lowercased.
    Other(String),
}

impl InputType {
    /// Parse a declared type. Matching is case-insensitive and an empty
    /// string means `Text`, as an input without a type attribute is a text box.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Self::Text,
            "search" => Self::Search,
            "password" => Self::Password,
            "url" => Self::Url,
            "tel" => Self::Tel,
            "email" => Self::Email,
            "number" => Self::Number,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Search => "search",
            Self::Password => "password",
            Self::Url => "url",
            Self::Tel => "tel",
            Self::Email => "email",
            Self::Number => "number",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Types a user can type free text into.
    pub fn is_text_entry(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Types whose element exposes a selection range. Number and email
    /// inputs report no selection, which is why numeric fields are coerced
    /// to text while the keyboard edits them.
    pub fn supports_selection(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Search | Self::Password | Self::Url | Self::Tel
        )
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse_controls() {
        assert_eq!(Key::parse("space"), Some(Key::Space));
        assert_eq!(Key::parse("backspace"), Some(Key::Backspace));
        assert_eq!(Key::parse("sign"), Some(Key::Sign));
        assert_eq!(Key::parse("ñ"), Some(Key::Char('ñ')));
        assert_eq!(Key::parse(""), None);
        assert_eq!(Key::parse("ab"), None);
    }

    #[test]
    fn test_key_token() {
        assert_eq!(Key::Decimal.token(), "decimal");
        assert_eq!(Key::Char('@').to_string(), "@");
        assert!(Key::Shift.is_control());
        assert!(!Key::Char('a').is_control());
    }

    #[test]
    fn test_layout_base() {
        assert_eq!(LayoutName::AlphaEmail.base(), LayoutName::Alpha);
        assert_eq!(LayoutName::Numeric.base(), LayoutName::Numeric);
        assert_eq!(LayoutName::default(), LayoutName::Alpha);
    }

    #[test]
    fn test_input_type_parse() {
        assert_eq!(InputType::parse("NUMBER"), InputType::Number);
        assert_eq!(InputType::parse(""), InputType::Text);
        assert_eq!(InputType::parse("checkbox"), InputType::Other("checkbox".into()));
        assert!(!InputType::parse("date").is_text_entry());
        assert!(!InputType::Number.supports_selection());
        assert!(!InputType::Email.supports_selection());
        assert!(InputType::Tel.supports_selection());
    }
}
