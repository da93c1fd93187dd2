// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use perimeter::gateway::{BoundaryGateway, BoundaryPatch};
use perimeter::store::SiteFolder;

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group name in this file: `store.site_folder`
// - Case IDs: `list_<count>`, `update_<count>`.
fn benches_store(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let mut group = c.benchmark_group("store.site_folder");

    for count in [10usize, 200] {
        let tmp = fixtures::TempDir::new("store");
        let mut folder = SiteFolder::new(tmp.path());
        let site = fixtures::site_id();
        let mut ids = Vec::with_capacity(count);
        for record in fixtures::boundary_list(count).iter() {
            let created = runtime
                .block_on(folder.create(
                    &site,
                    record.name(),
                    record.geometry(),
                    record.is_default(),
                ))
                .expect("create");
            ids.push(created.boundary_id().clone());
        }

        group.bench_function(format!("list_{count}"), |b| {
            b.iter(|| {
                let records = runtime.block_on(folder.list(&site)).expect("list");
                black_box(records.len())
            })
        });

        let patch = BoundaryPatch {
            name: "Renamed".into(),
            geometry: fixtures::ring(16, 0.5),
        };
        let target = ids[count / 2].clone();
        group.bench_function(format!("update_{count}"), |b| {
            b.iter(|| {
                runtime
                    .block_on(folder.update(&target, &patch))
                    .expect("update");
            })
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_store
}
criterion_main!(benches);
