// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{BoundaryGateway, BoundaryPatch, GatewayError, GatewayOp};
use crate::model::{BoundaryId, BoundaryRecord, Geometry, SiteId};

/// In-memory gateway with call recording and failure injection.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    sites: BTreeMap<SiteId, Vec<BoundaryRecord>>,
    next_seq: u64,
    calls: RefCell<Vec<GatewayOp>>,
    failures: RefCell<Vec<(GatewayOp, String)>>,
    stalls: RefCell<Vec<GatewayOp>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(mut self, site_id: SiteId, records: Vec<BoundaryRecord>) -> Self {
        self.next_seq += records.len() as u64;
        self.sites.insert(site_id, records);
        self
    }

    pub fn records(&self, site_id: &SiteId) -> &[BoundaryRecord] {
        self.sites.get(site_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn calls(&self) -> Vec<GatewayOp> {
        self.calls.borrow().clone()
    }

    /// The next call of `operation` fails with [`GatewayError::Unavailable`].
    pub fn fail_next(&self, operation: GatewayOp, reason: impl Into<String>) {
        self.failures.borrow_mut().push((operation, reason.into()));
    }

    /// The next call of `operation` never completes.
    pub fn stall_next(&self, operation: GatewayOp) {
        self.stalls.borrow_mut().push(operation);
    }

    async fn enter(&self, operation: GatewayOp) -> Result<(), GatewayError> {
        self.calls.borrow_mut().push(operation);

        let stalled = take_first(&mut self.stalls.borrow_mut(), |op| *op == operation).is_some();
        if stalled {
            std::future::pending::<()>().await;
        }

        let failure = take_first(&mut self.failures.borrow_mut(), |(op, _)| *op == operation);
        match failure {
            Some((_, reason)) => Err(GatewayError::Unavailable { operation, reason }),
            None => Ok(()),
        }
    }

    fn find_mut(&mut self, boundary_id: &BoundaryId) -> Option<&mut BoundaryRecord> {
        self.sites
            .values_mut()
            .flat_map(|records| records.iter_mut())
            .find(|record| record.boundary_id() == boundary_id)
    }
}

fn take_first<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> Option<T> {
    let index = items.iter().position(matches)?;
    Some(items.remove(index))
}

impl BoundaryGateway for MemoryGateway {
    async fn list(&self, site_id: &SiteId) -> Result<Vec<BoundaryRecord>, GatewayError> {
        self.enter(GatewayOp::List).await?;
        Ok(self.records(site_id).to_vec())
    }

    async fn create(
        &mut self,
        site_id: &SiteId,
        name: &str,
        geometry: &Geometry,
        is_default: bool,
    ) -> Result<BoundaryRecord, GatewayError> {
        self.enter(GatewayOp::Create).await?;

        self.next_seq += 1;
        let boundary_id = BoundaryId::issued(site_id, self.next_seq);
        let record = BoundaryRecord::new(
            boundary_id,
            site_id.clone(),
            name,
            geometry.clone(),
            is_default,
        );

        let records = self.sites.entry(site_id.clone()).or_default();
        if is_default {
            for existing in records.iter_mut() {
                existing.set_default(false);
            }
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn update(
        &mut self,
        boundary_id: &BoundaryId,
        patch: &BoundaryPatch,
    ) -> Result<(), GatewayError> {
        self.enter(GatewayOp::Update).await?;

        let record = self.find_mut(boundary_id).ok_or_else(|| GatewayError::NotFound {
            boundary_id: boundary_id.clone(),
        })?;
        record.set_name(patch.name.clone());
        record.set_geometry(patch.geometry.clone());
        Ok(())
    }

    async fn delete(&mut self, boundary_id: &BoundaryId) -> Result<(), GatewayError> {
        self.enter(GatewayOp::Delete).await?;

        for records in self.sites.values_mut() {
            if let Some(index) = records.iter().position(|r| r.boundary_id() == boundary_id) {
                records.remove(index);
                return Ok(());
            }
        }
        Err(GatewayError::NotFound {
            boundary_id: boundary_id.clone(),
        })
    }

    async fn set_default(
        &mut self,
        site_id: &SiteId,
        boundary_id: &BoundaryId,
    ) -> Result<(), GatewayError> {
        self.enter(GatewayOp::SetDefault).await?;

        let in_site = self
            .sites
            .get(site_id)
            .is_some_and(|records| records.iter().any(|r| r.boundary_id() == boundary_id));
        if !in_site {
            return Err(match self.find_mut(boundary_id) {
                Some(_) => GatewayError::WrongSite {
                    boundary_id: boundary_id.clone(),
                    site_id: site_id.clone(),
                },
                None => GatewayError::NotFound {
                    boundary_id: boundary_id.clone(),
                },
            });
        }

        if let Some(records) = self.sites.get_mut(site_id) {
            for record in records.iter_mut() {
                let is_target = record.boundary_id() == boundary_id;
                record.set_default(is_target);
            }
        }
        Ok(())
    }
}
