//! Entity table - live entities and the components attached to them.
//!
//! Entity slots are recycled through a [`HandleAllocator`], so a record is
//! reset whenever its slot is handed to a new entity.

use smallvec::SmallVec;

use crate::{
    component::ComponentId,
    error::{EcsError, EcsResult},
    handle::{ComponentHandle, EntityHandle, HandleAllocator},
};

/// One entity -> component link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub type_id: ComponentId,
    pub component: ComponentHandle,
}

/// Attachments of one entity, sorted by type id, at most one per type.
pub(crate) type Attachments = SmallVec<[Attachment; 4]>;

#[derive(Default, Debug)]
struct EntityRecord {
    attachments: Attachments,
}

pub(crate) struct EntityTable {
    allocator: HandleAllocator<EntityHandle>,
    /// Indexed by entity slot.
    records: Vec<EntityRecord>,
}

impl EntityTable {
    pub fn with_capacity(capacity: usize, limit: Option<usize>) -> Self {
        Self {
            allocator: HandleAllocator::with_capacity(capacity, limit),
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn create(&mut self) -> EcsResult<EntityHandle> {
        let entity = self.allocator.allocate()?;
        let index = entity.index() as usize;

        if index >= self.records.len() {
            self.records.resize_with(index + 1, EntityRecord::default);
        }
        self.records[index].attachments.clear();

        Ok(entity)
    }

    /// Remove an entity, returning what was attached to it.
    pub fn destroy(&mut self, entity: EntityHandle) -> EcsResult<Attachments> {
        self.allocator.check(entity)?;
        let attachments = std::mem::take(&mut self.records[entity.index() as usize].attachments);
        self.allocator.deallocate(entity);
        Ok(attachments)
    }

    #[must_use]
    pub fn is_alive(&self, entity: EntityHandle) -> bool {
        self.allocator.is_alive(entity)
    }

    pub fn check(&self, entity: EntityHandle) -> EcsResult<()> {
        self.allocator.check(entity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Number of entity slots, live or not.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.allocator.capacity()
    }

    #[must_use]
    pub fn handle_at(&self, index: u32) -> Option<EntityHandle> {
        self.allocator.handle_at(index)
    }

    pub fn attachments(&self, entity: EntityHandle) -> EcsResult<&[Attachment]> {
        self.allocator.check(entity)?;
        Ok(self.records[entity.index() as usize].attachments.as_slice())
    }

    /// Attachments of the entity in slot `index`, without a liveness check.
    pub fn attachments_at(&self, index: u32) -> &[Attachment] {
        self.records
            .get(index as usize)
            .map_or(&[][..], |record| record.attachments.as_slice())
    }

    /// The component of type `type_id` attached to a live entity.
    pub fn get(
        &self,
        entity: EntityHandle,
        type_id: ComponentId,
    ) -> EcsResult<Option<ComponentHandle>> {
        let attachments = self.attachments(entity)?;
        Ok(find(attachments, type_id)
            .ok()
            .map(|position| attachments[position].component))
    }

    /// Link `attachment` to `entity`, rejecting a second component of the same type.
    pub fn attach(&mut self, entity: EntityHandle, attachment: Attachment) -> EcsResult<()> {
        self.allocator.check(entity)?;
        let attachments = &mut self.records[entity.index() as usize].attachments;

        match find(attachments, attachment.type_id) {
            Ok(_) => Err(EcsError::AlreadyAttached {
                entity,
                type_id: attachment.type_id,
            }),
            Err(position) => {
                attachments.insert(position, attachment);
                Ok(())
            }
        }
    }

    /// Unlink `component` from `entity`.
    pub fn detach(
        &mut self,
        entity: EntityHandle,
        component: ComponentHandle,
    ) -> EcsResult<Attachment> {
        self.allocator.check(entity)?;
        let attachments = &mut self.records[entity.index() as usize].attachments;

        let position = attachments
            .iter()
            .position(|attachment| attachment.component == component)
            .ok_or(EcsError::NotAttached { entity, component })?;

        Ok(attachments.remove(position))
    }
}

fn find(attachments: &[Attachment], type_id: ComponentId) -> Result<usize, usize> {
    attachments.binary_search_by_key(&type_id, |attachment| attachment.type_id)
}
