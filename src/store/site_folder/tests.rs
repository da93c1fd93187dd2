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

use rstest::{fixture, rstest};

use super::{encode_persisted_id_segment, SiteFolder, StoreError, WriteDurability};
use crate::gateway::{BoundaryGateway, BoundaryPatch, GatewayError};
use crate::model::{BoundaryId, Bounds, Geometry, LatLng, SiteId};

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

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

struct SiteFolderTestCtx {
    _tmp: TempDir,
    folder: SiteFolder,
}

impl SiteFolderTestCtx {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        let folder = SiteFolder::new(tmp.path().join("store"));
        Self { _tmp: tmp, folder }
    }
}

#[fixture]
fn ctx() -> SiteFolderTestCtx {
    SiteFolderTestCtx::new("site-folder")
}

fn site(id: &str) -> SiteId {
    SiteId::new(id).unwrap()
}

fn rectangle() -> Geometry {
    Geometry::rectangle(Bounds::new(45.9, 45.8, 16.1, 15.9))
}

fn polygon() -> Geometry {
    Geometry::polygon(vec![
        LatLng::new(45.81, 15.97),
        LatLng::new(45.82, 15.98),
        LatLng::new(45.80, 15.99),
    ])
}

#[rstest]
#[tokio::test]
async fn missing_site_lists_empty(ctx: SiteFolderTestCtx) {
    let records = ctx.folder.list(&site("hq")).await.unwrap();
    assert!(records.is_empty());
    assert!(!ctx.folder.sites_dir().exists());
}

#[rstest]
#[tokio::test]
async fn create_persists_records_across_instances(mut ctx: SiteFolderTestCtx) {
    let hq = site("hq");
    let first = ctx.folder.create(&hq, "Yard", &rectangle(), true).await.unwrap();
    let second = ctx.folder.create(&hq, "Gate", &polygon(), false).await.unwrap();
    assert_eq!(first.boundary_id().as_str(), "hq#1");
    assert_eq!(second.boundary_id().as_str(), "hq#2");

    let reopened = SiteFolder::new(ctx.folder.root());
    let records = reopened.list(&hq).await.unwrap();
    assert_eq!(records, vec![first, second]);
    assert_eq!(reopened.site_ids().unwrap(), vec![hq]);
}

#[rstest]
#[tokio::test]
async fn create_with_default_clears_previous_default(mut ctx: SiteFolderTestCtx) {
    let hq = site("hq");
    ctx.folder.create(&hq, "A", &rectangle(), true).await.unwrap();
    let b = ctx.folder.create(&hq, "B", &rectangle(), true).await.unwrap();

    let records = ctx.folder.load_site(&hq).unwrap();
    let defaults: Vec<_> = records.iter().filter(|r| r.is_default()).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].boundary_id(), b.boundary_id());
}

#[rstest]
#[tokio::test]
async fn update_delete_and_set_default_find_the_owning_site(mut ctx: SiteFolderTestCtx) {
    let a = site("a");
    let b = site("b");
    let a1 = ctx.folder.create(&a, "A1", &rectangle(), true).await.unwrap();
    let a2 = ctx.folder.create(&a, "A2", &rectangle(), false).await.unwrap();
    let b1 = ctx.folder.create(&b, "B1", &polygon(), true).await.unwrap();

    let patch = BoundaryPatch {
        name: "Renamed".into(),
        geometry: polygon(),
    };
    ctx.folder.update(b1.boundary_id(), &patch).await.unwrap();
    let b_records = ctx.folder.load_site(&b).unwrap();
    assert_eq!(b_records[0].name(), "Renamed");
    assert_eq!(b_records[0].geometry(), &polygon());

    ctx.folder.set_default(&a, a2.boundary_id()).await.unwrap();
    let a_records = ctx.folder.load_site(&a).unwrap();
    assert!(!a_records[0].is_default());
    assert!(a_records[1].is_default());

    let err = ctx.folder.set_default(&a, b1.boundary_id()).await.unwrap_err();
    assert!(matches!(err, GatewayError::WrongSite { .. }));

    ctx.folder.delete(a1.boundary_id()).await.unwrap();
    assert_eq!(ctx.folder.load_site(&a).unwrap().len(), 1);
    let err = ctx.folder.delete(a1.boundary_id()).await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }));
}

#[rstest]
#[tokio::test]
async fn ids_are_not_reissued_after_delete(mut ctx: SiteFolderTestCtx) {
    let hq = site("hq");
    ctx.folder.create(&hq, "A", &rectangle(), false).await.unwrap();
    let b = ctx.folder.create(&hq, "B", &rectangle(), false).await.unwrap();
    ctx.folder.delete(b.boundary_id()).await.unwrap();

    let c = ctx.folder.create(&hq, "C", &rectangle(), false).await.unwrap();
    assert_eq!(c.boundary_id().as_str(), "hq#3");
}

#[rstest]
fn counter_is_recovered_from_ids_when_missing(ctx: SiteFolderTestCtx) {
    let path = ctx.folder.site_path(&site("hq"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{
  "site_id": "hq",
  "boundaries": [
    { "id": "hq#7", "site_id": "hq", "name": "Yard",
      "geometry": { "type": "circle", "center": { "lat": 1.0, "lng": 2.0 }, "radius": 50.0 } }
  ]
}"#,
    )
    .unwrap();

    let file = ctx.folder.load_site_file(&site("hq")).unwrap();
    assert_eq!(file.next_seq, 7);
    assert!(!file.boundaries[0].is_default());
}

#[rstest]
fn load_rejects_two_defaults(ctx: SiteFolderTestCtx) {
    let path = ctx.folder.site_path(&site("hq"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let boundary = |id: &str| {
        format!(
            r#"{{ "id": "{id}", "site_id": "hq", "name": "{id}", "is_default": true,
                 "geometry": {{ "type": "circle", "center": {{ "lat": 0.0, "lng": 0.0 }}, "radius": 5.0 }} }}"#
        )
    };
    std::fs::write(
        &path,
        format!(
            r#"{{ "site_id": "hq", "next_seq": 2, "boundaries": [{}, {}] }}"#,
            boundary("a"),
            boundary("b")
        ),
    )
    .unwrap();

    let err = ctx.folder.load_site(&site("hq")).unwrap_err();
    assert!(matches!(err, StoreError::DefaultConflict { count: 2, .. }));
}

#[rstest]
fn load_rejects_records_of_another_site(ctx: SiteFolderTestCtx) {
    let path = ctx.folder.site_path(&site("hq"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{ "site_id": "hq", "boundaries": [
            { "id": "x", "site_id": "other", "name": "X",
              "geometry": { "type": "rectangle", "bounds": { "north": 1.0, "south": 0.0, "east": 1.0, "west": 0.0 } } }
        ] }"#,
    )
    .unwrap();

    let err = ctx.folder.load_site(&site("hq")).unwrap_err();
    assert!(matches!(err, StoreError::SiteMismatch { .. }));
}

#[rstest]
fn load_rejects_malformed_json(ctx: SiteFolderTestCtx) {
    let path = ctx.folder.site_path(&site("hq"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    let err = ctx.folder.load_site(&site("hq")).unwrap_err();
    assert!(matches!(err, StoreError::Json { .. }));
}

#[cfg(unix)]
#[rstest]
#[tokio::test]
async fn refuses_to_write_through_symlinked_site_file(mut ctx: SiteFolderTestCtx) {
    let hq = site("hq");
    ctx.folder.create(&hq, "A", &rectangle(), false).await.unwrap();

    let path = ctx.folder.site_path(&hq);
    let target = ctx.folder.root().join("elsewhere.json");
    std::fs::rename(&path, &target).unwrap();
    std::os::unix::fs::symlink(&target, &path).unwrap();

    let err = ctx.folder.create(&hq, "B", &rectangle(), false).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Store(StoreError::SymlinkRefused { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn durable_writes_produce_the_same_file(ctx: SiteFolderTestCtx) {
    let mut folder = SiteFolder::new(ctx.folder.root()).with_durability(WriteDurability::Durable);
    assert_eq!(folder.durability(), WriteDurability::Durable);

    let record = folder.create(&site("hq"), "A", &rectangle(), true).await.unwrap();
    assert_eq!(ctx.folder.load_site(&site("hq")).unwrap(), vec![record]);

    let leftovers: Vec<_> = std::fs::read_dir(ctx.folder.sites_dir())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(".perimeter.tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[rstest]
#[case("hq", "hq")]
#[case("north.yard", "north.yard")]
#[case("CON", "~434f4e")]
#[case("a:b", "~613a62")]
#[case("a#b", "~612362")]
#[case(".hidden", "~2e68696464656e")]
fn site_ids_are_encoded_for_filenames(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(encode_persisted_id_segment(raw), expected);
}

#[test]
fn missing_boundary_update_is_not_found() {
    let tmp = TempDir::new("site-folder-missing");
    let mut folder = SiteFolder::new(tmp.path());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let patch = BoundaryPatch {
        name: "x".into(),
        geometry: rectangle(),
    };
    let err = runtime
        .block_on(folder.update(&BoundaryId::new("nope").unwrap(), &patch))
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }));
}
