// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Render-state policy for saved boundaries.
//!
//! The policy is a pure function of the boundary and the editor's display context. The editor
//! recomputes every boundary's options on each cache/selection/mode/flag change and hands the
//! complete list to the map provider; nothing is diffed.

pub mod theme;

pub use theme::{Palette, Rgb, Theme};

use crate::model::{BoundaryId, BoundaryList, BoundaryRecord, Geometry};

pub const Z_HIDDEN: i32 = 0;
pub const Z_VIEW_ALL: i32 = 1;
pub const Z_DEFAULT: i32 = 2;
pub const Z_SELECTED: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub visible: bool,
    pub fill_color: Rgb,
    pub stroke_color: Rgb,
    pub opacity: f32,
    pub z_index: i32,
}

impl RenderOptions {
    fn hidden(theme: &Theme) -> Self {
        Self {
            visible: false,
            fill_color: theme.view_all.fill,
            stroke_color: theme.view_all.stroke,
            opacity: 0.0,
            z_index: Z_HIDDEN,
        }
    }

    fn styled(palette: &Palette, z_index: i32) -> Self {
        Self {
            visible: true,
            fill_color: palette.fill,
            stroke_color: palette.stroke,
            opacity: palette.opacity,
            z_index,
        }
    }
}

/// Display inputs shared by every boundary in one recomputation.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityContext<'a> {
    pub editing_mode_on: bool,
    pub view_all: bool,
    pub selected_id: Option<&'a BoundaryId>,
    pub default_id: Option<&'a BoundaryId>,
    /// Target of the active edit session; `None` when idle or creating.
    pub session_target_id: Option<&'a BoundaryId>,
}

/// One saved boundary as handed to the map provider.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRender {
    pub boundary_id: BoundaryId,
    pub geometry: Geometry,
    pub options: RenderOptions,
}

pub fn render_options(
    boundary: &BoundaryRecord,
    ctx: &VisibilityContext<'_>,
    theme: &Theme,
) -> RenderOptions {
    let id = boundary.boundary_id();
    let is = |other: Option<&BoundaryId>| other.is_some_and(|other| other == id);

    // The live working overlay stands in for the record being edited.
    if is(ctx.session_target_id) {
        return RenderOptions::hidden(theme);
    }

    if ctx.editing_mode_on {
        if is(ctx.selected_id) {
            return RenderOptions::styled(&theme.selected, Z_SELECTED);
        }
        return RenderOptions::hidden(theme);
    }

    let is_default = is(ctx.default_id);
    if ctx.view_all {
        return if is_default {
            RenderOptions::styled(&theme.default, Z_DEFAULT)
        } else {
            RenderOptions::styled(&theme.view_all, Z_VIEW_ALL)
        };
    }

    if is_default {
        return RenderOptions::styled(&theme.default, Z_DEFAULT);
    }

    RenderOptions::hidden(theme)
}

/// Full render list, in cache order.
pub fn render_all(
    boundaries: &BoundaryList,
    ctx: &VisibilityContext<'_>,
    theme: &Theme,
) -> Vec<BoundaryRender> {
    boundaries
        .iter()
        .map(|boundary| BoundaryRender {
            boundary_id: boundary.boundary_id().clone(),
            geometry: boundary.geometry().clone(),
            options: render_options(boundary, ctx, theme),
        })
        .collect()
}
