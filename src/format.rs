//! Gzip-compressed NBT encoding of templates.

use crate::compiled::CompiledMapTemplate;
use crate::error::Result;
use crate::manager::StagingMapManager;
use crate::staging::StagingMapTemplate;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use quartz_nbt::io::Flavor;
use quartz_nbt::NbtCompound;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

/// Level 3 trades a slightly larger file for roughly twice the speed of the default.
const DEFAULT_COMPRESSION: flate2::Compression = flate2::Compression::new(3);

pub fn write_compressed(root: &NbtCompound) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), DEFAULT_COMPRESSION);
    quartz_nbt::io::write_nbt(&mut encoder, None, root, Flavor::Uncompressed)?;
    Ok(encoder.finish()?)
}

pub fn read_compressed(data: &[u8]) -> Result<NbtCompound> {
    let reader = std::io::BufReader::new(data);
    let mut gz = GzDecoder::new(reader);
    let (root, _) = quartz_nbt::io::read_nbt(&mut gz, Flavor::Uncompressed)?;
    Ok(root)
}

pub fn write_compiled(template: &CompiledMapTemplate) -> Result<Vec<u8>> {
    write_compressed(&template.serialize(NbtCompound::new()))
}

pub fn read_compiled(data: &[u8]) -> Result<CompiledMapTemplate> {
    CompiledMapTemplate::deserialize(&read_compressed(data)?)
}

pub fn write_staging(template: &StagingMapTemplate) -> Result<Vec<u8>> {
    write_compressed(&template.serialize(NbtCompound::new()))
}

pub fn read_staging(data: &[u8]) -> Result<StagingMapTemplate> {
    StagingMapTemplate::deserialize(&read_compressed(data)?)
}

pub fn write_manager(manager: &StagingMapManager) -> Result<Vec<u8>> {
    write_compressed(&manager.serialize())
}

pub fn read_manager(data: &[u8]) -> Result<StagingMapManager> {
    StagingMapManager::deserialize(&read_compressed(data)?)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_compiled(path: &Path, template: &CompiledMapTemplate) -> Result<()> {
    let bytes = write_compiled(template)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    log::debug!("Saved compiled template to {}", path.display());
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_compiled(path: &Path) -> Result<CompiledMapTemplate> {
    let data = std::fs::read(path)?;
    read_compiled(&data)
}
