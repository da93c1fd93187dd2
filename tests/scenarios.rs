// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use perimeter::config::EditorConfig;
use perimeter::demo::{demo_yard, demo_zone, run_demo};
use perimeter::editor::{Editor, Mode};
use perimeter::gateway::{BoundaryGateway, MemoryGateway};
use perimeter::map::{HeadlessMap, MutationKind};
use perimeter::model::{Geometry, GeometryKind, LatLng, SiteId};
use perimeter::store::SiteFolder;

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("perimeter-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

fn site() -> SiteId {
    SiteId::new("hq").unwrap()
}

fn nudged(step: u32) -> Geometry {
    let Geometry::Polygon { mut path } = demo_zone() else {
        panic!("demo zone is a polygon");
    };
    path[1].lng += 0.001 * f64::from(step);
    Geometry::polygon(path)
}

async fn draw_and_save<G: BoundaryGateway>(
    editor: &mut Editor<HeadlessMap, G>,
    geometry: Geometry,
    name: &str,
) {
    editor.start_draw(geometry.kind()).unwrap();
    let event = editor.provider_mut().complete_drawing(geometry).unwrap();
    editor.handle_event(event).unwrap();
    editor.save(name).await.unwrap();
}

fn assert_default_invariant<G: BoundaryGateway>(editor: &Editor<HeadlessMap, G>) {
    let boundaries = editor.boundaries();
    if boundaries.is_empty() {
        assert_eq!(boundaries.default_count(), 0);
    } else {
        assert_eq!(boundaries.default_count(), 1);
    }
}

async fn run_scenarios<G: BoundaryGateway>(gateway: G) -> Editor<HeadlessMap, G> {
    let mut editor = Editor::new(HeadlessMap::new(), gateway, EditorConfig::default(), site());
    editor.load_site(site()).await.unwrap();
    assert!(editor.boundaries().is_empty());

    // A: first polygon becomes the default.
    draw_and_save(&mut editor, demo_zone(), "Zone_01").await;
    assert_eq!(editor.boundaries().len(), 1);
    let zone_01 = editor.boundaries().first().unwrap().clone();
    assert_eq!(zone_01.name(), "Zone_01");
    assert!(zone_01.is_default());
    match zone_01.geometry() {
        Geometry::Polygon { path } => assert_eq!(path.len(), 4),
        other => panic!("expected polygon, got {other:?}"),
    }
    assert_default_invariant(&editor);

    // B: second boundary is not the default.
    draw_and_save(&mut editor, demo_yard(), "Zone_02").await;
    assert_eq!(editor.boundaries().len(), 2);
    let zone_02 = editor.boundaries().iter().nth(1).unwrap().clone();
    assert_eq!(zone_02.name(), "Zone_02");
    assert_eq!(zone_02.geometry().kind(), GeometryKind::Rectangle);
    assert!(!zone_02.is_default());
    assert_eq!(editor.selected(), Some(zone_02.boundary_id()));
    assert_default_invariant(&editor);

    // C: move the default.
    editor.set_default_selected().await.unwrap();
    let zone_01_now = editor.boundaries().get(zone_01.boundary_id()).unwrap();
    let zone_02_now = editor.boundaries().get(zone_02.boundary_id()).unwrap();
    assert!(!zone_01_now.is_default());
    assert!(zone_02_now.is_default());
    assert_default_invariant(&editor);

    // D: deleting the default hands it back to the first record.
    editor.delete_selected().await.unwrap();
    assert_eq!(editor.boundaries().len(), 1);
    assert_eq!(editor.boundaries().default_id(), Some(zone_01.boundary_id()));
    assert_eq!(editor.selected(), Some(zone_01.boundary_id()));
    assert_default_invariant(&editor);

    // E: three drags, two undos, one more drag drops the redo branch.
    editor.start_edit().unwrap();
    for step in 1..=3 {
        let overlay = editor.working_overlay().unwrap();
        let event = editor
            .provider_mut()
            .mutate(overlay, nudged(step), MutationKind::VertexSet)
            .unwrap()
            .unwrap();
        editor.handle_event(event).unwrap();
    }
    assert_eq!(editor.history_cursor(), Some(3));
    assert!(editor.undo().unwrap());
    assert!(editor.undo().unwrap());
    assert_eq!(editor.history_cursor(), Some(1));
    assert_eq!(editor.working_geometry(), Some(&nudged(1)));
    assert!(editor.can_redo());

    let overlay = editor.working_overlay().unwrap();
    let event = editor
        .provider_mut()
        .mutate(overlay, nudged(9), MutationKind::DragEnd)
        .unwrap()
        .unwrap();
    editor.handle_event(event).unwrap();
    assert!(!editor.can_redo());
    assert_eq!(editor.history_cursor(), Some(2));

    editor
}

#[tokio::test]
async fn scenarios_against_memory_gateway() {
    let editor = run_scenarios(MemoryGateway::new()).await;
    let stored = editor.gateway().records(&site());
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_default());
}

#[tokio::test]
async fn scenarios_against_site_folder_survive_reload() {
    let tmp = TempDir::new("scenarios");
    let mut editor = run_scenarios(SiteFolder::new(&tmp.path)).await;
    editor.save("Zone_01 moved").await.unwrap();
    assert_eq!(editor.mode(), Mode::Idle);
    drop(editor);

    let mut reopened = Editor::new(
        HeadlessMap::new(),
        SiteFolder::new(&tmp.path),
        EditorConfig::default(),
        site(),
    );
    reopened.load_site(site()).await.unwrap();
    let record = reopened.boundaries().first().unwrap();
    assert_eq!(reopened.boundaries().len(), 1);
    assert_eq!(record.name(), "Zone_01 moved");
    assert_eq!(record.geometry(), &nudged(9));
    assert!(record.is_default());
    assert_eq!(reopened.selected(), Some(record.boundary_id()));
}

#[tokio::test]
async fn starting_any_action_discards_the_previous_session() {
    let mut editor = Editor::new(
        HeadlessMap::new(),
        MemoryGateway::new(),
        EditorConfig::default(),
        site(),
    );
    draw_and_save(&mut editor, demo_zone(), "Zone_01").await;

    editor.start_draw(GeometryKind::Circle).unwrap();
    let circle = Geometry::circle(LatLng::new(45.81, 15.98), 120.0);
    let event = editor.provider_mut().complete_drawing(circle).unwrap();
    editor.handle_event(event).unwrap();
    assert_eq!(editor.mode(), Mode::Creating);

    editor.start_edit().unwrap();
    assert_eq!(editor.mode(), Mode::Editing);
    assert_eq!(editor.provider().overlay_count(), 1);
    assert_eq!(editor.provider().listener_count(), 1);
    assert_eq!(editor.working_geometry(), Some(&demo_zone()));

    editor.start_draw(GeometryKind::Polygon).unwrap();
    assert_eq!(editor.mode(), Mode::Drawing);
    assert_eq!(editor.provider().overlay_count(), 0);
    assert_eq!(editor.provider().listener_count(), 0);
    assert_eq!(editor.boundaries().len(), 1);
}

#[tokio::test]
async fn demo_walkthrough_reports_single_default_and_open_edit() {
    let report = run_demo(MemoryGateway::new(), site(), EditorConfig::default())
        .await
        .unwrap();

    assert_eq!(report.boundaries.len(), 1);
    assert_eq!(report.boundaries[0].name(), "Zone_01");
    assert!(report.boundaries[0].is_default());
    assert_eq!(report.history_cursor, Some(1));
    // The record under edit is represented by the working overlay only.
    assert_eq!(report.renders.len(), 1);
    assert!(!report.renders[0].options.visible);
}
