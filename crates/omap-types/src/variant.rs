use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Second-level address of a value stored under a primary key.
///
/// Every primary key holds at most one value per `VariantTag`. The
/// [`Dynamic`](VariantTag::Dynamic) tag marks a value with no explicit
/// variant; join-aware reads treat it as the generic fallback for the other
/// variants under the same key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantTag {
    /// The untyped variant. Displayed and parsed as `*`.
    #[default]
    Dynamic,
    /// An explicitly named variant.
    Named(Cow<'static, str>),
}

impl VariantTag {
    /// Textual form of [`VariantTag::Dynamic`].
    pub const DYNAMIC_STR: &'static str = "*";

    /// Create a named tag from a static string.
    ///
    /// The name is not validated; use [`VariantTag::parse`] for untrusted
    /// input.
    pub const fn named(name: &'static str) -> Self {
        Self::Named(Cow::Borrowed(name))
    }

    /// Parse a tag from text. `*` yields [`VariantTag::Dynamic`].
    ///
    /// Names must be non-empty and must not contain whitespace.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s == Self::DYNAMIC_STR {
            return Ok(Self::Dynamic);
        }
        if s.is_empty() {
            return Err(TypeError::InvalidVariantName {
                name: s.to_string(),
                reason: "name is empty".into(),
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidVariantName {
                name: s.to_string(),
                reason: "name contains whitespace".into(),
            });
        }
        Ok(Self::Named(Cow::Owned(s.to_string())))
    }

    /// Returns `true` for the untyped variant.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }

    /// The variant name, or `None` for the untyped variant.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Dynamic => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic => f.write_str(Self::DYNAMIC_STR),
            Self::Named(name) => f.write_str(name),
        }
    }
}

impl FromStr for VariantTag {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_dynamic() {
        assert_eq!(VariantTag::default(), VariantTag::Dynamic);
        assert!(VariantTag::default().is_dynamic());
    }

    #[test]
    fn named_and_parsed_are_equal() {
        let a = VariantTag::named("button");
        let b: VariantTag = "button".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name(), Some("button"));
        assert!(!a.is_dynamic());
    }

    #[test]
    fn parse_star_is_dynamic() {
        assert_eq!(VariantTag::parse("*").unwrap(), VariantTag::Dynamic);
        assert_eq!(VariantTag::Dynamic.name(), None);
    }

    #[test]
    fn parse_rejects_empty_and_whitespace() {
        assert!(matches!(
            VariantTag::parse(""),
            Err(TypeError::InvalidVariantName { .. })
        ));
        assert!(matches!(
            VariantTag::parse("two words"),
            Err(TypeError::InvalidVariantName { .. })
        ));
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for tag in [VariantTag::Dynamic, VariantTag::named("label")] {
            let text = tag.to_string();
            assert_eq!(VariantTag::parse(&text).unwrap(), tag);
        }
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_string(&VariantTag::named("int")).unwrap();
        assert_eq!(json, r#"{"named":"int"}"#);
        let back: VariantTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, VariantTag::named("int"));

        let dynamic: VariantTag = serde_json::from_str(r#""dynamic""#).unwrap();
        assert!(dynamic.is_dynamic());
    }
}
