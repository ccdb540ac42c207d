//! Window Registry (spec §4.3): id-keyed map of live window records plus
//! a label reverse index. Owned exclusively by the UI event loop — no
//! internal locking, matching the Window/Popover/Monitor "owned by the
//! UI loop, accessed through the command channel" policy of spec §5.

use std::collections::HashMap;

use tracing::debug;

use halo_core::{Error, Result, WindowRecord};

use crate::native::NativeHandle;

struct Entry {
    record: WindowRecord,
    handle: NativeHandle,
}

#[derive(Default)]
pub struct WindowRegistry {
    by_id: HashMap<String, Entry>,
    label_to_id: HashMap<String, String>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: WindowRecord, handle: NativeHandle) -> Result<()> {
        if self.by_id.contains_key(&record.id) {
            return Err(Error::DuplicateId(record.id.clone()));
        }
        self.label_to_id.insert(record.label.clone(), record.id.clone());
        self.by_id.insert(record.id.clone(), Entry { record, handle });
        Ok(())
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<&WindowRecord> {
        self.by_id.get(id).map(|e| &e.record)
    }

    pub fn lookup_by_label(&self, label: &str) -> Option<&WindowRecord> {
        let id = self.label_to_id.get(label)?;
        self.lookup_by_id(id)
    }

    pub fn handle_of(&self, id: &str) -> Option<&NativeHandle> {
        self.by_id.get(id).map(|e| &e.handle)
    }

    pub fn update_rectangle(&mut self, id: &str, rect: halo_core::Rect) -> Result<()> {
        let entry = self
            .by_id
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        entry.record.rectangle = rect;
        Ok(())
    }

    pub fn set_status(&mut self, id: &str, status: halo_core::Status) -> Result<()> {
        let entry = self
            .by_id
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        entry.record.status = status;
        Ok(())
    }

    /// Removing an id that isn't live is a no-op logged at debug, per
    /// spec §4.3's idempotent-remove invariant.
    pub fn remove(&mut self, id: &str) -> Option<WindowRecord> {
        match self.by_id.remove(id) {
            Some(entry) => {
                self.label_to_id.remove(&entry.record.label);
                Some(entry.record)
            }
            None => {
                debug!(id, "remove called for a window id that is not live");
                None
            }
        }
    }

    pub fn ids_by_role(&self, role: halo_core::Role) -> Vec<String> {
        self.by_id
            .values()
            .filter(|e| e.record.role == role)
            .map(|e| e.record.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::{Rect, Role, Status, WindowConfig};

    fn record(id: &str) -> WindowRecord {
        WindowRecord::new(id, Role::InlineWindow, Rect::new(0.0, 0.0, 10.0, 10.0), None, WindowConfig::default())
    }

    #[test]
    fn insert_then_lookup_by_id_and_label() {
        let mut registry = WindowRegistry::new();
        registry.insert(record("bar"), NativeHandle(1)).unwrap();
        assert!(registry.lookup_by_id("bar").is_some());
        assert!(registry.lookup_by_label("inline-window-bar").is_some());
    }

    #[test]
    fn duplicate_insert_fails() {
        let mut registry = WindowRegistry::new();
        registry.insert(record("bar"), NativeHandle(1)).unwrap();
        let err = registry.insert(record("bar"), NativeHandle(2)).unwrap_err();
        assert!(matches!(err, Error::DuplicateId(id) if id == "bar"));
    }

    #[test]
    fn remove_missing_id_is_idempotent_no_op() {
        let mut registry = WindowRegistry::new();
        assert!(registry.remove("missing").is_none());
    }

    #[test]
    fn remove_clears_label_index() {
        let mut registry = WindowRegistry::new();
        registry.insert(record("bar"), NativeHandle(1)).unwrap();
        registry.remove("bar");
        assert!(registry.lookup_by_label("inline-window-bar").is_none());
    }

    #[test]
    fn set_status_and_update_rectangle_roundtrip() {
        let mut registry = WindowRegistry::new();
        registry.insert(record("bar"), NativeHandle(1)).unwrap();
        registry.set_status("bar", Status::Visible).unwrap();
        registry.update_rectangle("bar", Rect::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        let rec = registry.lookup_by_id("bar").unwrap();
        assert_eq!(rec.status, Status::Visible);
        assert_eq!(rec.rectangle, Rect::new(1.0, 2.0, 3.0, 4.0));
    }
}
