use crate::error::{Result, TemplateError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A namespaced resource identifier, e.g. `minecraft:armor_stand`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    namespace: SmolStr,
    path: SmolStr,
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl Identifier {
    pub fn new(namespace: &str, path: &str) -> Result<Self> {
        if namespace.is_empty()
            || path.is_empty()
            || !namespace.chars().all(is_namespace_char)
            || !path.chars().all(is_path_char)
        {
            return Err(TemplateError::InvalidIdentifier(format!(
                "{}:{}",
                namespace, path
            )));
        }
        Ok(Identifier {
            namespace: namespace.into(),
            path: path.into(),
        })
    }

    /// Parses `namespace:path`, falling back to the `minecraft` namespace.
    pub fn parse(value: &str) -> Result<Self> {
        match value.split_once(':') {
            Some((namespace, path)) => Identifier::new(namespace, path)
                .map_err(|_| TemplateError::InvalidIdentifier(value.to_string())),
            None => Identifier::new(DEFAULT_NAMESPACE, value)
                .map_err(|_| TemplateError::InvalidIdentifier(value.to_string())),
        }
    }

    /// Builds a `minecraft:` identifier from a path known to be valid.
    pub(crate) fn vanilla(path: &'static str) -> Self {
        debug_assert!(!path.is_empty() && path.chars().all(is_path_char));
        Identifier {
            namespace: SmolStr::new(DEFAULT_NAMESPACE),
            path: SmolStr::new(path),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for Identifier {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        Identifier::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Identifier::parse(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_namespace() {
        let id = Identifier::parse("arena:maps/lobby").unwrap();
        assert_eq!(id.namespace(), "arena");
        assert_eq!(id.path(), "maps/lobby");
        assert_eq!(id.to_string(), "arena:maps/lobby");
    }

    #[test]
    fn test_default_namespace() {
        let id = Identifier::parse("painting").unwrap();
        assert_eq!(id.to_string(), "minecraft:painting");
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(Identifier::parse("").is_err());
        assert!(Identifier::parse("arena:").is_err());
        assert!(Identifier::parse(":lobby").is_err());
        assert!(Identifier::parse("Arena:Lobby").is_err());
        assert!(Identifier::parse("arena:lob by").is_err());
        assert!(Identifier::parse("a:b:c").is_err());
        assert!(Identifier::parse("name/space:path").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let id = Identifier::parse("minecraft:item_frame").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"minecraft:item_frame\"");
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
