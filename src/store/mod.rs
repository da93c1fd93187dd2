// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for boundary records on disk.
//!
//! The store module reads/writes the site folder format (one json file per site) and exposes it
//! through the [`crate::gateway::BoundaryGateway`] contract.

pub mod site_folder;

pub use site_folder::{SiteFolder, StoreError, WriteDurability};
