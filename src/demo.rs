// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scripted editing walkthrough on a headless map, used by `perimeter demo`.

use tracing::info;

use crate::config::EditorConfig;
use crate::editor::{Editor, EditorError};
use crate::gateway::BoundaryGateway;
use crate::map::{HeadlessMap, MutationKind};
use crate::model::{BoundaryRecord, Bounds, Geometry, LatLng, SiteId};
use crate::visibility::BoundaryRender;

#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub boundaries: Vec<BoundaryRecord>,
    pub renders: Vec<BoundaryRender>,
    pub history_cursor: Option<usize>,
}

const ZONE_PATH: [LatLng; 4] = [
    LatLng::new(45.8150, 15.9819),
    LatLng::new(45.8161, 15.9877),
    LatLng::new(45.8123, 15.9890),
    LatLng::new(45.8109, 15.9832),
];

pub fn demo_zone() -> Geometry {
    Geometry::polygon(ZONE_PATH.to_vec())
}

pub fn demo_yard() -> Geometry {
    Geometry::rectangle(Bounds::new(45.8201, 45.8172, 15.9950, 15.9891))
}

/// `demo_zone` with its first vertex dragged north by `step` small increments.
fn nudged_zone(step: u32) -> Geometry {
    let mut path = ZONE_PATH;
    path[0].lat += 0.0005 * f64::from(step);
    Geometry::polygon(path.to_vec())
}

/// Draws two zones, moves the default between them, deletes one and leaves an edit of the other
/// open with a partly undone history.
pub async fn run_demo<G: BoundaryGateway>(
    gateway: G,
    site_id: SiteId,
    config: EditorConfig,
) -> Result<DemoReport, EditorError> {
    let mut editor = Editor::new(HeadlessMap::new(), gateway, config, site_id.clone());
    editor.load_site(site_id).await?;
    editor.set_editing_mode(true);

    for (name, geometry) in [("Zone_01", demo_zone()), ("Zone_02", demo_yard())] {
        editor.start_draw(geometry.kind())?;
        let event = editor.provider_mut().complete_drawing(geometry)?;
        editor.handle_event(event)?;
        editor.save(name).await?;
    }

    editor.set_default_selected().await?;
    editor.delete_selected().await?;

    editor.start_edit()?;
    for step in 1..=3 {
        let Some(overlay) = editor.working_overlay() else {
            break;
        };
        let event = editor
            .provider_mut()
            .mutate(overlay, nudged_zone(step), MutationKind::VertexSet)?;
        if let Some(event) = event {
            editor.handle_event(event)?;
        }
    }
    editor.undo()?;
    editor.undo()?;

    let report = DemoReport {
        boundaries: editor.boundaries().iter().cloned().collect(),
        renders: editor.render_state(),
        history_cursor: editor.history_cursor(),
    };
    info!(
        boundaries = report.boundaries.len(),
        cursor = ?report.history_cursor,
        "demo finished"
    );
    editor.cancel();
    Ok(report)
}
