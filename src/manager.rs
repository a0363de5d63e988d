//! Ownership of a world's staging templates and their dirty tracking.
//!
//! Templates report edits as [`StagingEvent`]s over a channel. The manager
//! owns the receiving end and folds the events into a single dirty flag that
//! the persistence layer polls to decide when to save.

use crate::error::Result;
use crate::identifier::Identifier;
use crate::nbt;
use crate::staging::StagingMapTemplate;
use quartz_nbt::{NbtCompound, NbtList, NbtTag};
use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingEvent {
    /// The template with this identifier changed and needs saving.
    Dirty(Identifier),
}

/// The staging templates of one world.
#[derive(Debug)]
pub struct StagingMapManager {
    templates: BTreeMap<Identifier, StagingMapTemplate>,
    sender: Sender<StagingEvent>,
    receiver: Receiver<StagingEvent>,
    dirty: bool,
}

impl Default for StagingMapManager {
    fn default() -> Self {
        StagingMapManager::new()
    }
}

impl StagingMapManager {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        StagingMapManager {
            templates: BTreeMap::new(),
            sender,
            receiver,
            dirty: false,
        }
    }

    /// Stores `template`, replacing and returning any template with the same identifier.
    pub fn insert(&mut self, mut template: StagingMapTemplate) -> Option<StagingMapTemplate> {
        template.attach_events(self.sender.clone());
        self.dirty = true;
        let mut previous = self.templates.insert(template.identifier().clone(), template);
        if let Some(previous) = previous.as_mut() {
            previous.detach_events();
        }
        previous
    }

    pub fn remove(&mut self, identifier: &Identifier) -> Option<StagingMapTemplate> {
        let mut removed = self.templates.remove(identifier)?;
        removed.detach_events();
        self.dirty = true;
        Some(removed)
    }

    pub fn get(&self, identifier: &Identifier) -> Option<&StagingMapTemplate> {
        self.templates.get(identifier)
    }

    pub fn get_mut(&mut self, identifier: &Identifier) -> Option<&mut StagingMapTemplate> {
        self.templates.get_mut(identifier)
    }

    /// Templates ordered by identifier.
    pub fn templates(&self) -> impl Iterator<Item = &StagingMapTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Drains pending events into the dirty flag and returns how many there were.
    pub fn poll_dirty(&mut self) -> usize {
        let drained = self.receiver.try_iter().count();
        if drained > 0 {
            self.dirty = true;
        }
        drained
    }

    /// Dirty state as of the last [`StagingMapManager::poll_dirty`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Polls, then returns and clears the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        self.poll_dirty();
        std::mem::take(&mut self.dirty)
    }

    pub fn serialize(&self) -> NbtCompound {
        let mut root = NbtCompound::new();
        let list = NbtList::from(
            self.templates
                .values()
                .map(|t| NbtTag::Compound(t.serialize(NbtCompound::new())))
                .collect::<Vec<NbtTag>>(),
        );
        root.insert("templates", NbtTag::List(list));
        root
    }

    /// Rebuilds a manager from [`StagingMapManager::serialize`] output. The result is clean.
    pub fn deserialize(root: &NbtCompound) -> Result<Self> {
        let mut manager = StagingMapManager::new();
        for tag in nbt::compounds(nbt::get_list(root, "templates")?, "templates")? {
            manager.insert(StagingMapTemplate::deserialize(tag)?);
        }
        manager.dirty = false;
        Ok(manager)
    }
}
