// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses `#RRGGBB`, `0xRRGGBB`, bare `RRGGBB` or `rgb:RR/GG/BB` (2 or 4 hex digits each).
    pub fn parse(value: &str) -> Result<Self, String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("empty color".to_string());
        }

        let lower = trimmed.to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix("rgb:") {
            let parts: Vec<&str> = rest.split('/').collect();
            if parts.len() != 3 {
                return Err(format!("invalid rgb: value: {trimmed}"));
            }
            let r = parse_hex_channel(parts[0])?;
            let g = parse_hex_channel(parts[1])?;
            let b = parse_hex_channel(parts[2])?;
            return Ok(Self(r, g, b));
        }

        let hex = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(format!("invalid hex color: {trimmed} (expected #RRGGBB)"));
        }
        let rgb =
            u32::from_str_radix(hex, 16).map_err(|_| format!("invalid hex color: {trimmed}"))?;
        Ok(Self(
            ((rgb >> 16) & 0xFF) as u8,
            ((rgb >> 8) & 0xFF) as u8,
            (rgb & 0xFF) as u8,
        ))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

fn parse_hex_channel(value: &str) -> Result<u8, String> {
    let value = value.trim();
    if value.len() == 2 {
        return u8::from_str_radix(value, 16)
            .map_err(|_| format!("invalid rgb: component {value}"));
    }
    if value.len() == 4 {
        let parsed = u16::from_str_radix(value, 16)
            .map_err(|_| format!("invalid rgb: component {value}"))?;
        return Ok((parsed >> 8) as u8);
    }
    Err(format!(
        "invalid rgb: component {value} (expected 2 or 4 hex digits)"
    ))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub fill: Rgb,
    pub stroke: Rgb,
    pub opacity: f32,
}

impl Palette {
    pub const fn new(fill: Rgb, stroke: Rgb, opacity: f32) -> Self {
        Self {
            fill,
            stroke,
            opacity,
        }
    }
}

/// Colors for the three visible boundary states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub selected: Palette,
    pub default: Palette,
    pub view_all: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            selected: Palette::new(Rgb(0xf5, 0x9e, 0x0b), Rgb(0xb4, 0x53, 0x09), 0.45),
            default: Palette::new(Rgb(0x25, 0x63, 0xeb), Rgb(0x1e, 0x3a, 0x8a), 0.35),
            view_all: Palette::new(Rgb(0x94, 0xa3, 0xb8), Rgb(0x64, 0x74, 0x8b), 0.2),
        }
    }
}

impl Theme {
    const CSV_LEN: usize = 6;

    /// Parses six comma-separated colors: selected fill and stroke, default fill and stroke,
    /// view-all fill and stroke.
    ///
    /// Opacities are kept from the built-in theme.
    pub fn parse_csv(value: &str) -> Result<Self, String> {
        let parts: Vec<&str> = value.split(',').map(|part| part.trim()).collect();
        if parts.len() != Self::CSV_LEN {
            return Err(format!(
                "expected {} comma-separated colors (selected_fill,selected_stroke,default_fill,default_stroke,view_all_fill,view_all_stroke), got {}",
                Self::CSV_LEN,
                parts.len()
            ));
        }

        let mut colors = [Rgb(0, 0, 0); 6];
        for (idx, part) in parts.iter().enumerate() {
            colors[idx] = Rgb::parse(part)?;
        }

        let base = Self::default();
        Ok(Self {
            selected: Palette::new(colors[0], colors[1], base.selected.opacity),
            default: Palette::new(colors[2], colors[3], base.default.opacity),
            view_all: Palette::new(colors[4], colors[5], base.view_all.opacity),
        })
    }
}
