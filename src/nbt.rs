//! Typed field access on NBT compounds.
//!
//! Every accessor maps a missing or mistyped field to
//! [`TemplateError::Malformed`] naming the offending key, so decoders can stay
//! linear chains of `?`.

use crate::block_position::BlockPosition;
use crate::error::{Result, TemplateError};
use quartz_nbt::{NbtCompound, NbtList, NbtTag};

pub(crate) fn get_str<'a>(root: &'a NbtCompound, key: &str) -> Result<&'a str> {
    root.get::<_, &str>(key)
        .map_err(|e| TemplateError::malformed(format!("Failed to get {}: {}", key, e)))
}

pub(crate) fn get_int(root: &NbtCompound, key: &str) -> Result<i32> {
    root.get::<_, i32>(key)
        .map_err(|e| TemplateError::malformed(format!("Failed to get {}: {}", key, e)))
}

pub(crate) fn get_compound<'a>(root: &'a NbtCompound, key: &str) -> Result<&'a NbtCompound> {
    root.get::<_, &NbtCompound>(key)
        .map_err(|e| TemplateError::malformed(format!("Failed to get {}: {}", key, e)))
}

pub(crate) fn get_list<'a>(root: &'a NbtCompound, key: &str) -> Result<&'a NbtList> {
    root.get::<_, &NbtList>(key)
        .map_err(|e| TemplateError::malformed(format!("Failed to get {}: {}", key, e)))
}

/// Reads an `IntArray` of exactly three elements.
pub(crate) fn get_position(root: &NbtCompound, key: &str) -> Result<BlockPosition> {
    match root.inner().get(key) {
        Some(NbtTag::IntArray(values)) => BlockPosition::from_int_array(values).ok_or_else(|| {
            TemplateError::malformed(format!(
                "Invalid {} tag: expected 3 integers, got {}",
                key,
                values.len()
            ))
        }),
        Some(_) => Err(TemplateError::malformed(format!(
            "Invalid {} tag: expected an int array",
            key
        ))),
        None => Err(TemplateError::malformed(format!("Missing {} tag", key))),
    }
}

/// Every element of `list` as a compound, in order.
pub(crate) fn compounds<'a>(list: &'a NbtList, what: &str) -> Result<Vec<&'a NbtCompound>> {
    list.iter()
        .enumerate()
        .map(|(index, tag)| match tag {
            NbtTag::Compound(compound) => Ok(compound),
            _ => Err(TemplateError::malformed(format!(
                "{} entry {} is not a compound",
                what, index
            ))),
        })
        .collect()
}

/// Reads a three-element list of doubles (entity `Pos`).
pub(crate) fn get_vec3(root: &NbtCompound, key: &str) -> Result<(f64, f64, f64)> {
    let list = get_list(root, key)?;
    if list.len() != 3 {
        return Err(TemplateError::malformed(format!(
            "Invalid {} data: expected 3 components, got {}",
            key,
            list.len()
        )));
    }
    let component = |index: usize| {
        list.get::<f64>(index).map_err(|e| {
            TemplateError::malformed(format!("Failed to get {}[{}]: {}", key, index, e))
        })
    };
    Ok((component(0)?, component(1)?, component(2)?))
}

pub(crate) fn vec3_to_nbt(position: (f64, f64, f64)) -> NbtTag {
    NbtTag::List(NbtList::from(vec![
        NbtTag::Double(position.0),
        NbtTag::Double(position.1),
        NbtTag::Double(position.2),
    ]))
}

/// Rewrites the integer fields `keys` (x, y, z order) by subtracting `offset`.
/// Fields that are absent or not ints are left untouched.
pub(crate) fn localize_int_fields(
    compound: &mut NbtCompound,
    keys: [&str; 3],
    offset: BlockPosition,
) {
    let deltas = [offset.x, offset.y, offset.z];
    for (key, delta) in keys.iter().zip(deltas) {
        if let Ok(value) = compound.get::<_, i32>(*key) {
            compound.insert(*key, NbtTag::Int(value - delta));
        }
    }
}
