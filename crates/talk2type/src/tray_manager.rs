//! System tray icon reflecting the indicator state.
//!
//! Icons are drawn at runtime as filled circles: grey when idle, red while
//! recording, amber while transcribing. The context menu opens the
//! recordings folder or exits.

use crate::{AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use talk2type_core::IndicatorState;
use tracing::{info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

/// Edge length of the generated icons in pixels.
pub(crate) const ICON_SIZE: u32 = 32;

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    recordings_item_id: MenuId,
    exit_item_id: MenuId,
}

impl TrayManager {
    /// Create the tray icon in the idle state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let recordings_item = MenuItem::new("Open Recordings", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let recordings_item_id = recordings_item.id().clone();
        let exit_item_id = exit_item.id().clone();

        menu.append(&recordings_item)
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to add recordings menu: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        menu.append(&exit_item).map_err(|e| AppError::TrayError {
            reason: format!("Failed to add exit menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(tooltip(IndicatorState::Idle))
            .with_menu(Box::new(menu))
            .with_icon(load_icon(IndicatorState::Idle)?)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            recordings_item_id,
            exit_item_id,
        })
    }

    /// Swap icon and tooltip for `state`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: IndicatorState) -> AppResult<()> {
        self.tray_icon
            .set_icon(Some(load_icon(state)?))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(tooltip(state)))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(())
    }

    /// Get the "Open Recordings" menu item ID.
    pub fn recordings_item_id(&self) -> &MenuId {
        &self.recordings_item_id
    }

    /// Get the exit menu item ID.
    pub fn exit_item_id(&self) -> &MenuId {
        &self.exit_item_id
    }
}

pub(crate) fn tooltip(state: IndicatorState) -> &'static str {
    match state {
        IndicatorState::Idle => "Talk2Type - Ready",
        IndicatorState::Recording => "Talk2Type - Recording...",
        IndicatorState::Processing => "Talk2Type - Transcribing...",
    }
}

pub(crate) fn icon_color(state: IndicatorState) -> [u8; 3] {
    match state {
        IndicatorState::Idle => [0x8a, 0x8a, 0x8a],
        IndicatorState::Recording => [0xe0, 0x2f, 0x2f],
        IndicatorState::Processing => [0xf0, 0xa0, 0x1e],
    }
}

/// RGBA pixels of a filled circle in the state's colour on transparency.
pub(crate) fn icon_rgba(state: IndicatorState) -> Vec<u8> {
    let [r, g, b] = icon_color(state);
    let center = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0 - 1.0;

    let mut pixels = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let distance = (dx * dx + dy * dy).sqrt();
            // One pixel of anti-aliasing on the rim.
            let coverage = (radius - distance + 0.5).clamp(0.0, 1.0);
            pixels.extend_from_slice(&[r, g, b, (coverage * 255.0).round() as u8]);
        }
    }
    pixels
}

#[track_caller]
fn load_icon(state: IndicatorState) -> AppResult<Icon> {
    Icon::from_rgba(icon_rgba(state), ICON_SIZE, ICON_SIZE).map_err(|e| AppError::TrayError {
        reason: format!("Failed to create icon from RGBA: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}
