// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Perimeter: interactive geofence editor core.
//!
//! Boundaries (polygon, rectangle or circle geofences) are drawn and edited on a map provider,
//! tracked with per-session undo/redo, rendered through a pure visibility policy and persisted
//! through a gateway. The map and the gateway are traits; [`map::HeadlessMap`],
//! [`gateway::MemoryGateway`] and [`store::SiteFolder`] are the bundled implementations.

pub mod codec;
pub mod config;
pub mod demo;
pub mod editor;
pub mod format;
pub mod gateway;
pub mod history;
pub mod map;
pub mod model;
pub mod store;
pub mod visibility;
