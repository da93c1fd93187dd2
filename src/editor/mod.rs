// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Edit session state machine.
//!
//! [`Editor`] owns the site's boundary cache, the selection, the display flags and at most one
//! edit session. A session owns the single working overlay; undo/redo replace that overlay with
//! a freshly built one instead of patching it. Cache mutations happen only after the gateway
//! confirms, so a failed call leaves cache and session as they were.

mod session;

pub use session::Mode;

use std::fmt;

use tracing::{debug, info, warn};

use self::session::{ActiveShape, EditSession};
use crate::codec::{self, CloneError};
use crate::config::EditorConfig;
use crate::gateway::{with_timeout, BoundaryGateway, BoundaryPatch, GatewayError, GatewayOp};
use crate::history::ShapeHistory;
use crate::map::{MapEvent, MapProvider, MutationKind, OverlayHandle, OverlayId, ProviderError};
use crate::model::{
    BoundaryId, BoundaryList, BoundaryRecord, Geometry, GeometryError, GeometryKind, LatLng,
    SiteId,
};
use crate::visibility::{render_all, BoundaryRender, VisibilityContext};

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyName,
    InvalidGeometry(GeometryError),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => f.write_str("boundary name must not be empty"),
            Self::InvalidGeometry(source) => write!(f, "invalid boundary geometry: {source}"),
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyName => None,
            Self::InvalidGeometry(source) => Some(source),
        }
    }
}

#[derive(Debug)]
pub enum EditorError {
    Validation(ValidationError),
    Clone(CloneError),
    Persistence(GatewayError),
    Provider(ProviderError),
    SessionActive { mode: Mode },
    NothingToSave { mode: Mode },
    NoSelection,
    UnknownBoundary { boundary_id: BoundaryId },
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(source) => write!(f, "{source}"),
            Self::Clone(source) => write!(f, "{source}"),
            Self::Persistence(source) => write!(f, "persistence failed: {source}"),
            Self::Provider(source) => write!(f, "map provider error: {source}"),
            Self::SessionActive { mode } => {
                write!(f, "not allowed while an edit session is active (mode: {mode})")
            }
            Self::NothingToSave { mode } => write!(f, "nothing to save in mode {mode}"),
            Self::NoSelection => f.write_str("no boundary selected"),
            Self::UnknownBoundary { boundary_id } => write!(f, "unknown boundary {boundary_id}"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(source) => Some(source),
            Self::Clone(source) => Some(source),
            Self::Persistence(source) => Some(source),
            Self::Provider(source) => Some(source),
            _ => None,
        }
    }
}

impl From<ValidationError> for EditorError {
    fn from(source: ValidationError) -> Self {
        Self::Validation(source)
    }
}

impl From<CloneError> for EditorError {
    fn from(source: CloneError) -> Self {
        Self::Clone(source)
    }
}

impl From<GatewayError> for EditorError {
    fn from(source: GatewayError) -> Self {
        Self::Persistence(source)
    }
}

impl From<ProviderError> for EditorError {
    fn from(source: ProviderError) -> Self {
        Self::Provider(source)
    }
}

fn log_failure(operation: &'static str, err: EditorError) -> EditorError {
    warn!(operation, error = %err, "editor operation failed");
    err
}

#[derive(Debug, Clone, Copy)]
enum HistoryStep {
    Undo,
    Redo,
}

/// Interactive boundary editor for one site.
pub struct Editor<P: MapProvider, G: BoundaryGateway> {
    provider: P,
    gateway: G,
    config: EditorConfig,
    site_id: SiteId,
    boundaries: BoundaryList,
    selected: Option<BoundaryId>,
    editing_mode: bool,
    view_all: bool,
    session: Option<EditSession>,
}

impl<P: MapProvider, G: BoundaryGateway> Editor<P, G> {
    /// Creates an editor with an empty cache. Call [`Editor::load_site`] to fetch records.
    pub fn new(provider: P, gateway: G, config: EditorConfig, site_id: SiteId) -> Self {
        Self {
            provider,
            gateway,
            config,
            site_id,
            boundaries: BoundaryList::default(),
            selected: None,
            editing_mode: false,
            view_all: false,
            session: None,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Direct provider access, e.g. to feed pointer input into a headless map.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn site_id(&self) -> &SiteId {
        &self.site_id
    }

    pub fn boundaries(&self) -> &BoundaryList {
        &self.boundaries
    }

    pub fn selected(&self) -> Option<&BoundaryId> {
        self.selected.as_ref()
    }

    pub fn editing_mode(&self) -> bool {
        self.editing_mode
    }

    pub fn view_all(&self) -> bool {
        self.view_all
    }

    pub fn mode(&self) -> Mode {
        self.session.as_ref().map_or(Mode::Idle, EditSession::mode)
    }

    pub fn can_undo(&self) -> bool {
        self.active_shape()
            .is_some_and(|shape| shape.history.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.active_shape()
            .is_some_and(|shape| shape.history.can_redo())
    }

    pub fn history_cursor(&self) -> Option<usize> {
        self.active_shape().map(|shape| shape.history.cursor())
    }

    /// Geometry at the history cursor of the active session.
    pub fn working_geometry(&self) -> Option<&Geometry> {
        self.active_shape().map(|shape| shape.history.current())
    }

    pub fn working_overlay(&self) -> Option<OverlayId> {
        self.active_shape().map(|shape| shape.overlay().id())
    }

    /// Boundary being edited, if the session is in [`Mode::Editing`].
    pub fn session_target(&self) -> Option<&BoundaryId> {
        self.session.as_ref().and_then(EditSession::target)
    }

    pub fn boundaries_containing<'a>(
        &'a self,
        point: &'a LatLng,
    ) -> impl Iterator<Item = &'a BoundaryRecord> {
        self.boundaries.containing(point)
    }

    /// Render options for every cached boundary, in cache order.
    pub fn render_state(&self) -> Vec<BoundaryRender> {
        let ctx = VisibilityContext {
            editing_mode_on: self.editing_mode,
            view_all: self.view_all,
            selected_id: self.selected.as_ref(),
            default_id: self.boundaries.default_id(),
            session_target_id: self.session_target(),
        };
        render_all(&self.boundaries, &ctx, &self.config.theme)
    }

    /// Replaces the cache with the records of `site_id`.
    ///
    /// Any session is discarded once the list arrived; a failed list leaves everything as it was.
    /// A site listed without a default gets its first record promoted.
    pub async fn load_site(&mut self, site_id: SiteId) -> Result<(), EditorError> {
        let timeout = self.config.gateway_timeout;
        let records = with_timeout(timeout, GatewayOp::List, self.gateway.list(&site_id))
            .await
            .map_err(|err| log_failure("load_site", err.into()))?;

        self.end_session();
        self.boundaries = BoundaryList::new(records);
        info!(
            site = %site_id,
            boundaries = self.boundaries.len(),
            "site loaded"
        );
        self.site_id = site_id;
        self.repair_default().await;
        self.selected = self
            .boundaries
            .default_id()
            .or_else(|| self.boundaries.first().map(BoundaryRecord::boundary_id))
            .cloned();
        self.resync();
        Ok(())
    }

    /// Promotes the first record of a non-empty site that has no default.
    ///
    /// Failure is logged and tolerated; the next create claims the default instead.
    async fn repair_default(&mut self) {
        if self.boundaries.default_id().is_some() {
            return;
        }
        let Some(first) = self.boundaries.first().map(|r| r.boundary_id().clone()) else {
            return;
        };

        let timeout = self.config.gateway_timeout;
        let promoted = with_timeout(
            timeout,
            GatewayOp::SetDefault,
            self.gateway.set_default(&self.site_id, &first),
        )
        .await;
        match promoted {
            Ok(()) => {
                self.boundaries.set_default(&first);
                info!(site = %self.site_id, boundary = %first, "missing default repaired");
            }
            Err(err) => {
                warn!(site = %self.site_id, error = %err, "site left without a default");
            }
        }
    }

    /// Turning editing mode off cancels any session.
    pub fn set_editing_mode(&mut self, on: bool) {
        if !on {
            self.end_session();
        }
        if self.editing_mode != on {
            debug!(on, "editing mode changed");
        }
        self.editing_mode = on;
        self.resync();
    }

    pub fn set_view_all(&mut self, on: bool) {
        self.view_all = on;
        self.resync();
    }

    /// Re-selecting the current selection is always allowed; anything else needs [`Mode::Idle`].
    pub fn select(&mut self, boundary_id: &BoundaryId) -> Result<(), EditorError> {
        if self.selected.as_ref() == Some(boundary_id) {
            return Ok(());
        }
        if let Some(session) = &self.session {
            return Err(log_failure(
                "select",
                EditorError::SessionActive {
                    mode: session.mode(),
                },
            ));
        }
        if !self.boundaries.contains(boundary_id) {
            return Err(log_failure(
                "select",
                EditorError::UnknownBoundary {
                    boundary_id: boundary_id.clone(),
                },
            ));
        }

        debug!(boundary = %boundary_id, "boundary selected");
        self.selected = Some(boundary_id.clone());
        self.resync();
        Ok(())
    }

    /// Starts draw capture for a new boundary, discarding any active session.
    pub fn start_draw(&mut self, kind: GeometryKind) -> Result<(), EditorError> {
        self.provider
            .start_drawing(kind)
            .map_err(|err| log_failure("start_draw", err.into()))?;

        match self.session.take() {
            // The provider already switched capture to `kind`.
            None | Some(EditSession::Drawing { .. }) => {}
            Some(previous) => {
                debug!(mode = %previous.mode(), "discarding session for new draw");
                previous.release(&mut self.provider);
            }
        }

        info!(site = %self.site_id, %kind, "drawing started");
        self.session = Some(EditSession::Drawing { kind });
        self.editing_mode = true;
        self.resync();
        Ok(())
    }

    /// Opens an edit session on the selected boundary.
    ///
    /// The working overlay is built before any active session is discarded, so a
    /// [`CloneError`] leaves the previous state intact.
    pub fn start_edit(&mut self) -> Result<(), EditorError> {
        self.start_edit_inner()
            .map_err(|err| log_failure("start_edit", err))
    }

    fn start_edit_inner(&mut self) -> Result<(), EditorError> {
        let target = self.selected.clone().ok_or(EditorError::NoSelection)?;
        let geometry = self
            .boundaries
            .get(&target)
            .map(|record| record.geometry().clone())
            .ok_or_else(|| EditorError::UnknownBoundary {
                boundary_id: target.clone(),
            })?;

        let overlay = codec::from_normalized(&mut self.provider, &geometry)?;

        self.end_session_without_sync();
        let history = ShapeHistory::new(geometry).with_limit(self.config.history_limit);
        let shape = ActiveShape::open(&mut self.provider, overlay, history);
        info!(site = %self.site_id, boundary = %target, "edit started");
        self.session = Some(EditSession::Editing { target, shape });
        self.editing_mode = true;
        self.resync();
        Ok(())
    }

    /// Discards the active session without persisting. Returns `false` when already idle.
    pub fn cancel(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        info!(mode = %session.mode(), "session cancelled");
        session.release(&mut self.provider);
        self.resync();
        true
    }

    /// Feeds one provider event into the state machine.
    pub fn handle_event(&mut self, event: MapEvent) -> Result<(), EditorError> {
        match event {
            MapEvent::OverlayComplete(overlay) => self
                .overlay_complete(overlay)
                .map_err(|err| log_failure("overlay_complete", err)),
            MapEvent::Mutated { overlay, mutation } => self
                .overlay_mutated(overlay, mutation)
                .map_err(|err| log_failure("overlay_mutated", err)),
        }
    }

    fn overlay_complete(&mut self, overlay: OverlayHandle) -> Result<(), EditorError> {
        let kind = match &self.session {
            Some(EditSession::Drawing { kind }) => *kind,
            _ => {
                debug!(overlay = %overlay.id(), "ignoring overlay completed outside drawing");
                self.provider.remove_overlay(overlay);
                return Ok(());
            }
        };

        if overlay.kind() != kind {
            let found = overlay.kind();
            self.provider.remove_overlay(overlay);
            self.restart_capture(kind)?;
            return Err(ProviderError::KindMismatch {
                expected: kind,
                found,
            }
            .into());
        }

        let geometry = match codec::to_normalized(&self.provider, &overlay) {
            Ok(geometry) => geometry,
            Err(err) => {
                self.provider.remove_overlay(overlay);
                return Err(err.into());
            }
        };

        if let Err(err) = geometry.validate() {
            self.provider.remove_overlay(overlay);
            self.restart_capture(kind)?;
            return Err(ValidationError::InvalidGeometry(err).into());
        }

        self.provider.stop_drawing();
        let history = ShapeHistory::new(geometry).with_limit(self.config.history_limit);
        let shape = ActiveShape::open(&mut self.provider, overlay, history);
        info!(site = %self.site_id, %kind, "drawing completed");
        self.session = Some(EditSession::Creating(shape));
        self.resync();
        Ok(())
    }

    /// Re-arms draw capture after a rejected overlay so the user can draw again.
    ///
    /// If the provider refuses, the drawing session ends instead of idling without capture.
    fn restart_capture(&mut self, kind: GeometryKind) -> Result<(), EditorError> {
        if let Err(err) = self.provider.start_drawing(kind) {
            self.session = None;
            self.resync();
            return Err(err.into());
        }
        Ok(())
    }

    fn overlay_mutated(
        &mut self,
        overlay: OverlayId,
        mutation: MutationKind,
    ) -> Result<(), EditorError> {
        let Some(shape) = self.session.as_mut().and_then(EditSession::shape_mut) else {
            return Ok(());
        };
        if shape.overlay().id() != overlay {
            debug!(%overlay, "ignoring mutation of foreign overlay");
            return Ok(());
        }

        let geometry = codec::to_normalized(&self.provider, shape.overlay())?;
        shape.history.push(geometry);
        debug!(
            ?mutation,
            cursor = shape.history.cursor(),
            "working geometry recorded"
        );
        Ok(())
    }

    /// Steps the working geometry back. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.step(HistoryStep::Undo)
            .map_err(|err| log_failure("undo", err))
    }

    /// Steps the working geometry forward. `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.step(HistoryStep::Redo)
            .map_err(|err| log_failure("redo", err))
    }

    fn step(&mut self, step: HistoryStep) -> Result<bool, EditorError> {
        let Some(shape) = self.session.as_mut().and_then(EditSession::shape_mut) else {
            return Ok(false);
        };
        let destination = match step {
            HistoryStep::Undo => shape.history.peek_undo(),
            HistoryStep::Redo => shape.history.peek_redo(),
        };
        let Some(geometry) = destination.cloned() else {
            return Ok(false);
        };

        let overlay = codec::from_normalized(&mut self.provider, &geometry)?;
        shape.replace_overlay(&mut self.provider, overlay);
        match step {
            HistoryStep::Undo => shape.history.undo(),
            HistoryStep::Redo => shape.history.redo(),
        };
        debug!(?step, cursor = shape.history.cursor(), "history moved");
        Ok(true)
    }

    /// Persists the working geometry under `name` and returns to [`Mode::Idle`].
    ///
    /// Creating sessions create a record (the first record of a site becomes its default);
    /// editing sessions update their target. On failure nothing changes.
    pub async fn save(&mut self, name: &str) -> Result<BoundaryId, EditorError> {
        self.save_inner(name)
            .await
            .map_err(|err| log_failure("save", err))
    }

    async fn save_inner(&mut self, name: &str) -> Result<BoundaryId, EditorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let mode = self.mode();
        let (geometry, target) = match &self.session {
            Some(EditSession::Creating(shape)) => (shape.history.current().clone(), None),
            Some(EditSession::Editing { target, shape }) => {
                (shape.history.current().clone(), Some(target.clone()))
            }
            _ => return Err(EditorError::NothingToSave { mode }),
        };
        geometry.validate().map_err(ValidationError::InvalidGeometry)?;

        let timeout = self.config.gateway_timeout;
        let boundary_id = match target {
            None => {
                // Also claims the default for a site that lost it to a failed reassignment.
                let is_default = self.boundaries.default_id().is_none();
                let record = with_timeout(
                    timeout,
                    GatewayOp::Create,
                    self.gateway
                        .create(&self.site_id, name, &geometry, is_default),
                )
                .await?;

                let boundary_id = record.boundary_id().clone();
                self.boundaries.push(record);
                if is_default {
                    self.boundaries.set_default(&boundary_id);
                }
                info!(
                    site = %self.site_id,
                    boundary = %boundary_id,
                    is_default,
                    "boundary created"
                );
                boundary_id
            }
            Some(target) => {
                let patch = BoundaryPatch {
                    name: name.into(),
                    geometry,
                };
                with_timeout(
                    timeout,
                    GatewayOp::Update,
                    self.gateway.update(&target, &patch),
                )
                .await?;

                if let Some(record) = self.boundaries.get_mut(&target) {
                    record.set_name(patch.name);
                    record.set_geometry(patch.geometry);
                }
                info!(site = %self.site_id, boundary = %target, "boundary updated");
                target
            }
        };

        self.end_session_without_sync();
        self.selected = Some(boundary_id.clone());
        self.resync();
        Ok(boundary_id)
    }

    /// Deletes the selected boundary and returns its id.
    ///
    /// A deleted default is handed to the first remaining record. The selection falls back to
    /// the first remaining record as well.
    pub async fn delete_selected(&mut self) -> Result<BoundaryId, EditorError> {
        self.delete_selected_inner()
            .await
            .map_err(|err| log_failure("delete", err))
    }

    async fn delete_selected_inner(&mut self) -> Result<BoundaryId, EditorError> {
        let boundary_id = self.idle_selection()?;
        let was_default = self
            .boundaries
            .get(&boundary_id)
            .is_some_and(BoundaryRecord::is_default);

        let timeout = self.config.gateway_timeout;
        with_timeout(
            timeout,
            GatewayOp::Delete,
            self.gateway.delete(&boundary_id),
        )
        .await?;

        self.boundaries.remove(&boundary_id);
        let first = self.boundaries.first().map(|r| r.boundary_id().clone());
        self.selected = first.clone();
        info!(site = %self.site_id, boundary = %boundary_id, "boundary deleted");

        if let (true, Some(successor)) = (was_default, first) {
            let reassigned = with_timeout(
                timeout,
                GatewayOp::SetDefault,
                self.gateway.set_default(&self.site_id, &successor),
            )
            .await;
            if let Err(err) = reassigned {
                // The delete stands; the cache shows no default until one is confirmed.
                self.resync();
                return Err(err.into());
            }
            self.boundaries.set_default(&successor);
            info!(site = %self.site_id, boundary = %successor, "default reassigned");
        }

        self.resync();
        Ok(boundary_id)
    }

    /// Makes the selected boundary the site default.
    pub async fn set_default_selected(&mut self) -> Result<(), EditorError> {
        self.set_default_selected_inner()
            .await
            .map_err(|err| log_failure("set_default", err))
    }

    async fn set_default_selected_inner(&mut self) -> Result<(), EditorError> {
        let boundary_id = self.idle_selection()?;

        let timeout = self.config.gateway_timeout;
        with_timeout(
            timeout,
            GatewayOp::SetDefault,
            self.gateway.set_default(&self.site_id, &boundary_id),
        )
        .await?;

        self.boundaries.set_default(&boundary_id);
        info!(site = %self.site_id, boundary = %boundary_id, "default set");
        self.resync();
        Ok(())
    }

    /// Selected boundary for record-level actions, which need [`Mode::Idle`].
    fn idle_selection(&self) -> Result<BoundaryId, EditorError> {
        if let Some(session) = &self.session {
            return Err(EditorError::SessionActive {
                mode: session.mode(),
            });
        }
        let boundary_id = self.selected.clone().ok_or(EditorError::NoSelection)?;
        if !self.boundaries.contains(&boundary_id) {
            return Err(EditorError::UnknownBoundary { boundary_id });
        }
        Ok(boundary_id)
    }

    fn active_shape(&self) -> Option<&ActiveShape> {
        self.session.as_ref().and_then(EditSession::shape)
    }

    fn end_session(&mut self) {
        if self.end_session_without_sync() {
            self.resync();
        }
    }

    fn end_session_without_sync(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                debug!(mode = %session.mode(), "session ended");
                session.release(&mut self.provider);
                true
            }
            None => false,
        }
    }

    /// Pushes the complete render list to the provider.
    fn resync(&mut self) {
        let renders = self.render_state();
        let visible = renders.iter().filter(|r| r.options.visible).count();
        debug!(
            boundaries = renders.len(),
            visible,
            mode = %self.mode(),
            "boundaries synced"
        );
        self.provider.sync_boundaries(&renders);
    }
}

impl<P: MapProvider, G: BoundaryGateway> Drop for Editor<P, G> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.release(&mut self.provider);
        }
    }
}
