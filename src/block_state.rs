use crate::error::{Result, TemplateError};
use crate::nbt;
use quartz_nbt::{NbtCompound, NbtTag};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

pub const AIR: &str = "minecraft:air";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    pub name: SmolStr,
    pub properties: Vec<(SmolStr, SmolStr)>,
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.properties.is_empty() {
            write!(f, "[")?;
            for (i, (key, value)) in self.properties.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}={}", key, value)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl Default for BlockState {
    fn default() -> Self {
        BlockState::air()
    }
}

impl BlockState {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        BlockState {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn air() -> Self {
        BlockState::new(AIR)
    }

    pub fn is_air(&self) -> bool {
        self.name == AIR
    }

    pub fn with_property(mut self, key: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.properties.push((key, value)),
        }
        self
    }

    pub fn get_property(&self, key: &str) -> Option<&SmolStr> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn to_nbt(&self) -> NbtTag {
        let mut compound = NbtCompound::new();
        compound.insert("Name", self.name.to_string());

        if !self.properties.is_empty() {
            let mut properties = NbtCompound::new();
            for (key, value) in &self.properties {
                properties.insert(key.to_string(), value.to_string());
            }
            compound.insert("Properties", properties);
        }

        NbtTag::Compound(compound)
    }

    /// Property order is not preserved by NBT; properties come back sorted by key.
    pub fn from_nbt(compound: &NbtCompound) -> Result<Self> {
        let name: SmolStr = nbt::get_str(compound, "Name")?.into();

        let mut properties = Vec::new();
        if compound.contains_key("Properties") {
            let props = nbt::get_compound(compound, "Properties")?;
            for (key, value) in props.inner() {
                match value {
                    NbtTag::String(value) => properties.push((SmolStr::new(key), SmolStr::new(value))),
                    _ => {
                        return Err(TemplateError::malformed(format!(
                            "Block property {} of {} is not a string",
                            key, name
                        )))
                    }
                }
            }
            properties.sort();
        }

        Ok(BlockState { name, properties })
    }

    /// Copy with properties sorted by key, the form [`BlockState::from_nbt`] returns.
    pub fn normalized(&self) -> Self {
        let mut properties = self.properties.clone();
        properties.sort();
        BlockState {
            name: self.name.clone(),
            properties,
        }
    }
}
