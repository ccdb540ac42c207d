//! Inline Window Controller (spec §4.4): create/destroy/show/hide/
//! reposition of declarative overlay windows.

use std::sync::Arc;

use tracing::{info, warn};

use halo_core::{Error, HostConfig, MonitorTable, PositionDescriptor, Result, Role, Status, WindowConfig, WindowRecord};

use crate::native::{NativeBackend, NativeWindowSpec};
use crate::registry::WindowRegistry;

pub struct InlineWindowController {
    backend: Arc<dyn NativeBackend>,
    origin: String,
    path: String,
}

impl InlineWindowController {
    pub fn new(backend: Arc<dyn NativeBackend>, config: &HostConfig) -> Self {
        Self {
            backend,
            origin: config.coordinator.origin.clone(),
            path: config.coordinator.path.clone(),
        }
    }

    fn default_url(&self, id: &str) -> String {
        format!("{}{}?window={}", self.origin, self.path, id)
    }

    /// `create` is atomic at the record level (spec §4.4): if native
    /// creation fails after the solver succeeds, no record is left
    /// behind.
    pub fn create(
        &self,
        registry: &mut WindowRegistry,
        monitors: &MonitorTable,
        id: &str,
        position: PositionDescriptor,
        config: WindowConfig,
        url: Option<String>,
    ) -> Result<()> {
        if registry.lookup_by_id(id).is_some() {
            return Err(Error::DuplicateId(id.to_string()));
        }

        let solved = halo_core::geometry::solve(&position, monitors)?;
        let url = url.unwrap_or_else(|| self.default_url(id));

        let handle = self
            .backend
            .create_window(NativeWindowSpec {
                rect: solved.rect,
                url: url.clone(),
                transparent: config.transparent,
                always_on_top: config.always_on_top,
                resizable: config.resizable,
                decorations: config.decorations,
                skip_taskbar: config.skip_taskbar,
                click_through: config.click_through,
            })
            .map_err(|e| Error::NativeCreateFailed(e.to_string()))?;

        let mut record = WindowRecord::new(id, Role::InlineWindow, solved.rect, Some(position), config);
        record.status = Status::Pending;

        if let Err(e) = registry.insert(record, handle.clone()) {
            // Roll back the native surface; the record never landed.
            let _ = self.backend.close(&handle);
            return Err(e);
        }

        if let Err(e) = self.backend.set_visible(&handle, true) {
            registry.remove(id);
            let _ = self.backend.close(&handle);
            return Err(Error::NativeCreateFailed(e.to_string()));
        }
        registry.set_status(id, Status::Visible)?;

        info!(id, url, "created inline window");
        Ok(())
    }

    pub fn update_position(
        &self,
        registry: &mut WindowRegistry,
        monitors: &MonitorTable,
        id: &str,
        position: PositionDescriptor,
    ) -> Result<()> {
        if registry.lookup_by_id(id).is_none() {
            return Err(Error::NotFound(id.to_string()));
        }
        let solved = halo_core::geometry::solve(&position, monitors)?;
        let handle = registry
            .handle_of(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?
            .clone();
        self.backend.set_rect(&handle, solved.rect)?;
        registry.update_rectangle(id, solved.rect)?;
        Ok(())
    }

    pub fn show(&self, registry: &mut WindowRegistry, id: &str) -> Result<()> {
        let handle = registry
            .handle_of(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?
            .clone();
        self.backend.set_visible(&handle, true)?;
        registry.set_status(id, Status::Visible)
    }

    pub fn hide(&self, registry: &mut WindowRegistry, id: &str) -> Result<()> {
        let handle = registry
            .handle_of(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?
            .clone();
        self.backend.set_visible(&handle, false)?;
        registry.set_status(id, Status::Hidden)
    }

    /// `idempotent` suppresses `NotFound` for callers that treat close as
    /// a no-op on an already-closed id (spec §4.4 failure column).
    pub fn close(&self, registry: &mut WindowRegistry, id: &str, idempotent: bool) -> Result<()> {
        let handle = match registry.handle_of(id) {
            Some(h) => h.clone(),
            None => {
                return if idempotent {
                    Ok(())
                } else {
                    Err(Error::NotFound(id.to_string()))
                };
            }
        };
        self.backend.close(&handle)?;
        registry.remove(id);
        info!(id, "closed inline window");
        Ok(())
    }

    /// Reposition every inline window after `MonitorTopologyChanged`
    /// (spec §4.4). A window whose stored descriptor no longer resolves
    /// falls back to the primary monitor (spec §4.1, §9 Open Question
    /// (c)); failures are logged and skip that window, per spec §7's
    /// "background events that fail are logged and skipped."
    pub fn reposition_all(&self, registry: &mut WindowRegistry, monitors: &MonitorTable) {
        let ids = registry.ids_by_role(Role::InlineWindow);
        for id in ids {
            let Some(record) = registry.lookup_by_id(&id) else {
                continue;
            };
            let Some(position) = record.position.clone() else {
                continue;
            };
            if let Err(e) = self.update_position(registry, monitors, &id, position) {
                warn!(id, error = %e, "failed to reposition inline window after topology change");
            }
        }
    }
}
