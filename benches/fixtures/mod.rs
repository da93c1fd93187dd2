// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use perimeter::model::{
    BoundaryId, BoundaryList, BoundaryRecord, Bounds, Geometry, LatLng, SiteId,
};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("perimeter_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

pub fn site_id() -> SiteId {
    SiteId::new("bench").expect("site id")
}

/// Regular polygon around a fixed center; `phase` rotates the vertices.
pub fn ring(vertices: usize, phase: f64) -> Geometry {
    let center = LatLng::new(45.81, 15.98);
    let path = (0..vertices)
        .map(|idx| {
            let angle = phase + (idx as f64) * std::f64::consts::TAU / (vertices as f64);
            LatLng::new(center.lat + 0.01 * angle.sin(), center.lng + 0.01 * angle.cos())
        })
        .collect::<Vec<_>>();
    Geometry::polygon(path)
}

/// `count` boundaries cycling through all three kinds; the first one is the default.
pub fn boundary_list(count: usize) -> BoundaryList {
    let site = site_id();
    let records = (0..count)
        .map(|idx| {
            let boundary_id = BoundaryId::new(format!("bench#{idx:06}")).expect("boundary id");
            let offset = (idx as f64) * 0.001;
            let geometry = match idx % 3 {
                0 => ring(8, offset),
                1 => Geometry::rectangle(Bounds::new(
                    45.82 + offset,
                    45.80 + offset,
                    15.99,
                    15.97,
                )),
                _ => Geometry::circle(LatLng::new(45.81 + offset, 15.98), 50.0 + offset),
            };
            BoundaryRecord::new(
                boundary_id,
                site.clone(),
                format!("Zone_{idx:06}"),
                geometry,
                idx == 0,
            )
        })
        .collect();
    BoundaryList::new(records)
}
