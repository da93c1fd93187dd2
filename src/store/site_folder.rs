// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::format::{boundary_from_json, boundary_to_json, BoundaryJson, WireError};
use crate::gateway::{BoundaryGateway, BoundaryPatch, GatewayError};
use crate::model::{BoundaryId, BoundaryRecord, Geometry, IdError, SiteId};

const SITES_DIRNAME: &str = "sites";
const SITE_FILE_SUFFIX: &str = ".boundaries.json";

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Wire {
        path: PathBuf,
        source: Box<WireError>,
    },
    InvalidId {
        field: &'static str,
        value: String,
        source: Box<IdError>,
    },
    SiteMismatch {
        path: PathBuf,
        expected: SiteId,
        found: String,
    },
    DefaultConflict {
        path: PathBuf,
        count: usize,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::Wire { path, source } => write!(f, "invalid boundary in {path:?}: {source}"),
            Self::InvalidId {
                field,
                value,
                source,
            } => write!(f, "invalid id for {field}: {value:?}: {source}"),
            Self::SiteMismatch {
                path,
                expected,
                found,
            } => write!(
                f,
                "site file {path:?} belongs to {found:?}, expected {expected}"
            ),
            Self::DefaultConflict { path, count } => {
                write!(f, "site file {path:?} marks {count} boundaries as default")
            }
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Wire { source, .. } => Some(source),
            Self::InvalidId { source, .. } => Some(source),
            Self::SiteMismatch { .. } => None,
            Self::DefaultConflict { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Writes a temp file and renames it into place, without fsync.
    #[default]
    BestEffort,

    /// Also flushes the file contents and the rename to stable storage where the platform allows.
    Durable,
}

/// On-disk shape of one site file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SiteFileJson {
    site_id: String,
    #[serde(default)]
    next_seq: u64,
    #[serde(default)]
    boundaries: Vec<BoundaryJson>,
}

/// Decoded site file.
#[derive(Debug, Clone, PartialEq)]
struct SiteFile {
    site_id: SiteId,
    next_seq: u64,
    boundaries: Vec<BoundaryRecord>,
}

impl SiteFile {
    fn empty(site_id: SiteId) -> Self {
        Self {
            site_id,
            next_seq: 0,
            boundaries: Vec::new(),
        }
    }

    fn position(&self, boundary_id: &BoundaryId) -> Option<usize> {
        self.boundaries
            .iter()
            .position(|record| record.boundary_id() == boundary_id)
    }

    fn mark_default(&mut self, boundary_id: &BoundaryId) {
        for record in &mut self.boundaries {
            let is_target = record.boundary_id() == boundary_id;
            record.set_default(is_target);
        }
    }
}

/// File-backed boundary gateway.
///
/// Layout under `root`:
///
/// ```text
/// sites/<site id>.boundaries.json
/// ```
///
/// Each site file holds the site's records in creation order plus the id sequence counter.
/// Every write replaces the whole file atomically.
#[derive(Debug, Clone)]
pub struct SiteFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl SiteFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sites_dir(&self) -> PathBuf {
        self.root.join(SITES_DIRNAME)
    }

    pub fn site_path(&self, site_id: &SiteId) -> PathBuf {
        let segment = encode_persisted_id_segment(site_id.as_str());
        self.sites_dir().join(format!("{segment}{SITE_FILE_SUFFIX}"))
    }

    /// Site ids with a file in the folder, sorted.
    pub fn site_ids(&self) -> Result<Vec<SiteId>, StoreError> {
        let mut ids = Vec::new();
        for path in self.site_file_paths()? {
            let file = read_site_file(&path)?;
            ids.push(file.site_id);
        }
        ids.sort();
        Ok(ids)
    }

    pub fn load_site(&self, site_id: &SiteId) -> Result<Vec<BoundaryRecord>, StoreError> {
        Ok(self.load_site_file(site_id)?.boundaries)
    }

    fn load_site_file(&self, site_id: &SiteId) -> Result<SiteFile, StoreError> {
        let path = self.site_path(site_id);
        match fs::symlink_metadata(&path) {
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(SiteFile::empty(site_id.clone()))
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        }

        let file = read_site_file(&path)?;
        if &file.site_id != site_id {
            return Err(StoreError::SiteMismatch {
                path,
                expected: site_id.clone(),
                found: file.site_id.into_string(),
            });
        }
        Ok(file)
    }

    fn save_site_file(&self, file: &SiteFile) -> Result<(), StoreError> {
        let path = self.site_path(&file.site_id);
        let json = site_file_to_json(file);
        let mut bytes = serde_json::to_vec_pretty(&json).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        bytes.push(b'\n');
        write_atomic_in_root(&self.root, &path, &bytes, self.durability)
    }

    fn site_file_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.sites_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            let is_site_file = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(SITE_FILE_SUFFIX) && !name.starts_with('.'));
            if is_site_file {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Finds the site file holding `boundary_id`.
    fn find_boundary(
        &self,
        boundary_id: &BoundaryId,
    ) -> Result<Option<(SiteFile, usize)>, StoreError> {
        for path in self.site_file_paths()? {
            let file = read_site_file(&path)?;
            if let Some(index) = file.position(boundary_id) {
                return Ok(Some((file, index)));
            }
        }
        Ok(None)
    }
}

impl BoundaryGateway for SiteFolder {
    async fn list(&self, site_id: &SiteId) -> Result<Vec<BoundaryRecord>, GatewayError> {
        Ok(self.load_site(site_id)?)
    }

    async fn create(
        &mut self,
        site_id: &SiteId,
        name: &str,
        geometry: &Geometry,
        is_default: bool,
    ) -> Result<BoundaryRecord, GatewayError> {
        let mut file = self.load_site_file(site_id)?;
        file.next_seq += 1;
        let boundary_id = BoundaryId::issued(site_id, file.next_seq);

        let record = BoundaryRecord::new(
            boundary_id.clone(),
            site_id.clone(),
            name,
            geometry.clone(),
            is_default,
        );
        file.boundaries.push(record.clone());
        if is_default {
            file.mark_default(&boundary_id);
        }
        self.save_site_file(&file)?;
        Ok(record)
    }

    async fn update(
        &mut self,
        boundary_id: &BoundaryId,
        patch: &BoundaryPatch,
    ) -> Result<(), GatewayError> {
        let Some((mut file, index)) = self.find_boundary(boundary_id)? else {
            return Err(GatewayError::NotFound {
                boundary_id: boundary_id.clone(),
            });
        };
        let record = &mut file.boundaries[index];
        record.set_name(patch.name.clone());
        record.set_geometry(patch.geometry.clone());
        self.save_site_file(&file)?;
        Ok(())
    }

    async fn delete(&mut self, boundary_id: &BoundaryId) -> Result<(), GatewayError> {
        let Some((mut file, index)) = self.find_boundary(boundary_id)? else {
            return Err(GatewayError::NotFound {
                boundary_id: boundary_id.clone(),
            });
        };
        file.boundaries.remove(index);
        self.save_site_file(&file)?;
        Ok(())
    }

    async fn set_default(
        &mut self,
        site_id: &SiteId,
        boundary_id: &BoundaryId,
    ) -> Result<(), GatewayError> {
        let mut file = self.load_site_file(site_id)?;
        if file.position(boundary_id).is_none() {
            return Err(match self.find_boundary(boundary_id)? {
                Some(_) => GatewayError::WrongSite {
                    boundary_id: boundary_id.clone(),
                    site_id: site_id.clone(),
                },
                None => GatewayError::NotFound {
                    boundary_id: boundary_id.clone(),
                },
            });
        }
        file.mark_default(boundary_id);
        self.save_site_file(&file)?;
        Ok(())
    }
}

// Path encoding, json conversion and atomic writes for `SiteFolder`.
include!("site_folder/helpers.rs");

#[cfg(test)]
mod tests;
