//! Native preview window for the saved figure.
//!
//! Opens the rendered PNG in a blocking window so the figure can be
//! inspected right after it is saved. Compiled only with the `preview`
//! feature.

use crate::{BibtrendError, Result};
use eframe::egui;
use std::path::Path;

/// Shows the saved figure in a native window, blocking until it is closed.
///
/// # Errors
///
/// Returns [`BibtrendError::Io`] if the figure path cannot be resolved and
/// [`BibtrendError::Chart`] when the window cannot be opened, for example
/// in a headless environment
pub fn show<P: AsRef<Path>>(path: P, title: &str) -> Result<()> {
    let absolute = path.as_ref().canonicalize()?;
    let uri = format!("file://{}", absolute.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1020.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render the png
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(FigurePreview { uri }))
        }),
    )
    .map_err(|e| BibtrendError::Chart(e.to_string()))
}

/// Single-panel application that displays the figure image.
struct FigurePreview {
    uri: String,
}

impl eframe::App for FigurePreview {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.add(egui::Image::from_uri(self.uri.clone()).shrink_to_fit());
            });
        });
    }
}
