use crate::error::Result;
use crate::identifier::Identifier;
use serde::{Deserialize, Serialize};

/// Options for a compile pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileSettings {
    /// Entity types copied into the template. Anything else is left behind.
    #[serde(default = "default_entity_types")]
    pub entity_types: Vec<String>,
}

/// Entity types compiled when no allow-list is configured.
pub const DEFAULT_ENTITY_TYPES: [&str; 3] = ["armor_stand", "item_frame", "painting"];

fn default_entity_types() -> Vec<String> {
    DEFAULT_ENTITY_TYPES
        .into_iter()
        .map(|path| format!("minecraft:{}", path))
        .collect()
}

pub(crate) fn default_allow_list() -> Vec<Identifier> {
    DEFAULT_ENTITY_TYPES
        .into_iter()
        .map(Identifier::vanilla)
        .collect()
}

impl Default for CompileSettings {
    fn default() -> Self {
        CompileSettings {
            entity_types: default_entity_types(),
        }
    }
}

impl CompileSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The default settings as pretty JSON, a starting point for config files.
    pub fn schema_json() -> Result<String> {
        Ok(serde_json::to_string_pretty(&CompileSettings::default())?)
    }

    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        if !self.entity_types.contains(&entity_type) {
            self.entity_types.push(entity_type);
        }
        self
    }

    /// The allow-list as parsed identifiers, duplicates removed, order kept.
    pub fn entity_allow_list(&self) -> Result<Vec<Identifier>> {
        let mut allow_list: Vec<Identifier> = Vec::with_capacity(self.entity_types.len());
        for entity_type in &self.entity_types {
            let id = Identifier::parse(entity_type)?;
            if !allow_list.contains(&id) {
                allow_list.push(id);
            }
        }
        Ok(allow_list)
    }
}
