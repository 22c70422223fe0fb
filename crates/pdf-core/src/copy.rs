//! Deep copy of objects between two lopdf documents

use crate::Result;
use lopdf::{Document, Object, ObjectId};
use std::collections::HashMap;

/// Copies objects from `source` into `target`, giving each copied object a
/// fresh ID and rewriting every reference it carries.
///
/// Each source object is copied at most once. IDs are registered before
/// recursing, so reference cycles (page -> annotation -> page) terminate.
pub(crate) struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    pub(crate) fn new(source: &'a Document, target: &'a mut Document) -> Self {
        Self {
            source,
            target,
            id_map: HashMap::new(),
        }
    }

    /// Allocate a target ID for `source_id` without copying anything yet
    ///
    /// References to a reserved object resolve to the reserved ID; the caller
    /// fills it in later with [`ObjectCopier::insert`].
    pub(crate) fn reserve(&mut self, source_id: ObjectId) -> ObjectId {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return *target_id;
        }
        let target_id = self.target.new_object_id();
        self.id_map.insert(source_id, target_id);
        target_id
    }

    /// Make references to `source_id` resolve to an existing target object
    ///
    /// The source object itself is never copied.
    pub(crate) fn alias(&mut self, source_id: ObjectId, target_id: ObjectId) {
        self.id_map.insert(source_id, target_id);
    }

    /// Place an already remapped object under a reserved ID
    pub(crate) fn insert(&mut self, target_id: ObjectId, object: Object) {
        self.target.objects.insert(target_id, object);
    }

    /// Copy one object (and everything it references) into the target
    pub(crate) fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        let target_id = self.reserve(source_id);
        let object = self.source.get_object(source_id)?.clone();
        let object = self.remap(object)?;
        self.insert(target_id, object);

        Ok(target_id)
    }

    /// Rewrite all references inside `object`, copying their targets
    pub(crate) fn remap(&mut self, object: Object) -> Result<Object> {
        match object {
            Object::Reference(id) => Ok(Object::Reference(self.copy_object(id)?)),
            Object::Array(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.remap(item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Object::Array(items))
            }
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap(value.clone())?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap(value.clone())?;
                }
                Ok(Object::Stream(stream))
            }
            primitive => Ok(primitive),
        }
    }
}
