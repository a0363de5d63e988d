use crate::block_position::BlockPosition;
use crate::error::{Result, TemplateError};
use crate::identifier::Identifier;
use crate::nbt;
use quartz_nbt::{NbtCompound, NbtTag};

/// Keys that belong to the record itself or to a single live instance.
const RESERVED_KEYS: [&str; 3] = ["id", "Pos", "UUID"];

/// Anchor block of hanging decorations (item frames, paintings).
const DECORATION_ANCHOR: [&str; 3] = ["TileX", "TileY", "TileZ"];

/// An entity captured into a template, positioned in local coordinates.
///
/// The payload never holds `id`, `Pos` or `UUID`; those are record fields or
/// belong to a single live instance.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateEntity {
    pub entity_type: Identifier,
    pub position: (f64, f64, f64),
    nbt: NbtCompound,
}

impl TemplateEntity {
    pub fn new(entity_type: Identifier, position: (f64, f64, f64)) -> Self {
        TemplateEntity {
            entity_type,
            position,
            nbt: NbtCompound::new(),
        }
    }

    pub fn nbt(&self) -> &NbtCompound {
        &self.nbt
    }

    /// Sets a payload field. Reserved keys are rejected with [`TemplateError::ReservedKey`].
    pub fn insert_nbt(&mut self, key: &str, value: impl Into<NbtTag>) -> Result<()> {
        if RESERVED_KEYS.contains(&key) {
            return Err(TemplateError::ReservedKey(key.to_string()));
        }
        self.nbt.insert(key, value.into());
        Ok(())
    }

    /// Captures a world entity's saved state, moving it into the local space
    /// whose origin is `origin` in world coordinates.
    ///
    /// The world `Pos` and `UUID` are dropped and decoration anchors are
    /// rewritten so the record carries no world coordinates.
    pub fn capture(
        entity_type: Identifier,
        world_position: (f64, f64, f64),
        mut state: NbtCompound,
        origin: BlockPosition,
    ) -> Self {
        let (ox, oy, oz) = origin.to_f64();
        let position = (
            world_position.0 - ox,
            world_position.1 - oy,
            world_position.2 - oz,
        );

        for key in RESERVED_KEYS {
            state.inner_mut().remove(key);
        }
        nbt::localize_int_fields(&mut state, DECORATION_ANCHOR, origin);

        TemplateEntity {
            entity_type,
            position,
            nbt: state,
        }
    }

    pub fn to_nbt(&self) -> NbtTag {
        let mut compound = self.nbt.clone();
        compound.insert("id", NbtTag::String(self.entity_type.to_string()));
        compound.insert("Pos", nbt::vec3_to_nbt(self.position));
        NbtTag::Compound(compound)
    }

    pub fn from_nbt(compound: &NbtCompound) -> Result<Self> {
        let entity_type = Identifier::parse(nbt::get_str(compound, "id")?)
            .map_err(|e| TemplateError::malformed(format!("Invalid entity id: {}", e)))?;
        let position = nbt::get_vec3(compound, "Pos")?;

        let mut state = compound.clone();
        for key in RESERVED_KEYS {
            state.inner_mut().remove(key);
        }

        Ok(TemplateEntity {
            entity_type,
            position,
            nbt: state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quartz_nbt::NbtList;

    fn painting_state() -> NbtCompound {
        let mut state = NbtCompound::new();
        state.insert("id", NbtTag::String("minecraft:painting".to_string()));
        state.insert("Pos", nbt::vec3_to_nbt((105.5, 66.5, 200.03)));
        state.insert("UUID", NbtTag::IntArray(vec![1, 2, 3, 4]));
        state.insert("TileX", NbtTag::Int(105));
        state.insert("TileY", NbtTag::Int(66));
        state.insert("TileZ", NbtTag::Int(200));
        state.insert("variant", NbtTag::String("minecraft:kebab".to_string()));
        state
    }

    #[test]
    fn test_capture_localizes() {
        let painting = Identifier::parse("minecraft:painting").unwrap();
        let entity = TemplateEntity::capture(
            painting.clone(),
            (105.5, 66.5, 200.03),
            painting_state(),
            BlockPosition::new(100, 64, 200),
        );

        assert_eq!(entity.entity_type, painting);
        assert_eq!(entity.position.0, 5.5);
        assert_eq!(entity.position.1, 2.5);
        assert!((entity.position.2 - 0.03).abs() < 1e-9);
        assert!(!entity.nbt().contains_key("UUID"));
        assert!(!entity.nbt().contains_key("Pos"));
        assert!(!entity.nbt().contains_key("id"));
        assert_eq!(entity.nbt().get::<_, i32>("TileX").unwrap(), 5);
        assert_eq!(entity.nbt().get::<_, i32>("TileY").unwrap(), 2);
        assert_eq!(entity.nbt().get::<_, i32>("TileZ").unwrap(), 0);
        assert_eq!(
            entity.nbt().get::<_, &str>("variant").unwrap(),
            "minecraft:kebab"
        );
    }

    #[test]
    fn test_entity_serialization() {
        let mut entity = TemplateEntity::new(
            Identifier::parse("minecraft:armor_stand").unwrap(),
            (1.5, 0.0, 3.25),
        );
        entity.insert_nbt("Invisible", NbtTag::Byte(1)).unwrap();

        let NbtTag::Compound(compound) = entity.to_nbt() else {
            panic!("Expected Compound NBT tag");
        };
        assert_eq!(compound.get::<_, &str>("id").unwrap(), "minecraft:armor_stand");
        let pos = compound.get::<_, &NbtList>("Pos").unwrap();
        assert_eq!(pos.get::<f64>(0).unwrap(), 1.5);
        assert_eq!(pos.get::<f64>(2).unwrap(), 3.25);
        assert_eq!(compound.get::<_, i8>("Invisible").unwrap(), 1);

        assert_eq!(TemplateEntity::from_nbt(&compound).unwrap(), entity);
    }

    #[test]
    fn test_reserved_keys_stay_out_of_the_payload() {
        let mut entity = TemplateEntity::new(
            Identifier::parse("minecraft:armor_stand").unwrap(),
            (1.5, 0.0, 3.25),
        );
        for key in RESERVED_KEYS {
            assert!(matches!(
                entity.insert_nbt(key, NbtTag::IntArray(vec![1, 2, 3, 4])),
                Err(TemplateError::ReservedKey(_))
            ));
        }
        entity.insert_nbt("NoGravity", NbtTag::Byte(1)).unwrap();
        assert_eq!(entity.nbt().inner().len(), 1);

        let NbtTag::Compound(compound) = entity.to_nbt() else {
            panic!("Expected Compound NBT tag");
        };
        assert_eq!(TemplateEntity::from_nbt(&compound).unwrap(), entity);
    }

    #[test]
    fn test_invalid_nbt() {
        let mut missing_id = NbtCompound::new();
        missing_id.insert("Pos", nbt::vec3_to_nbt((0.0, 0.0, 0.0)));
        assert!(TemplateEntity::from_nbt(&missing_id).is_err());

        let mut short_pos = NbtCompound::new();
        short_pos.insert("id", NbtTag::String("minecraft:painting".to_string()));
        short_pos.insert(
            "Pos",
            NbtTag::List(NbtList::from(vec![NbtTag::Double(0.0), NbtTag::Double(0.0)])),
        );
        assert!(TemplateEntity::from_nbt(&short_pos).is_err());

        let mut bad_id = NbtCompound::new();
        bad_id.insert("id", NbtTag::String("Not An Id".to_string()));
        bad_id.insert("Pos", nbt::vec3_to_nbt((0.0, 0.0, 0.0)));
        assert!(matches!(
            TemplateEntity::from_nbt(&bad_id),
            Err(TemplateError::Malformed(_))
        ));
    }
}
