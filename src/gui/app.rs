//! Figure Viewer Application
//! Main window with a figure list and an interactive chart area.

use crate::charts::{ChartPlotter, Figure, StaticChartRenderer};
use egui::{Button, CentralPanel, RichText, SidePanel};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info};

/// Export result from background thread
enum ExportResult {
    Complete(PathBuf),
    Error(String),
}

/// Main application window.
pub struct FigureViewerApp {
    figures: Vec<Figure>,
    selected: usize,
    export_size: (u32, u32),
    status: String,

    // Async export
    export_rx: Option<Receiver<ExportResult>>,
    is_exporting: bool,
}

impl FigureViewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        figures: Vec<Figure>,
        export_size: (u32, u32),
    ) -> Self {
        Self {
            figures,
            selected: 0,
            export_size,
            status: String::new(),
            export_rx: None,
            is_exporting: false,
        }
    }

    /// Ask for a destination and render the selected figure off the UI thread.
    fn handle_save(&mut self) {
        if self.is_exporting {
            return;
        }
        let Some(figure) = self.figures.get(self.selected).cloned() else {
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .add_filter("SVG image", &["svg"])
            .add_filter("JPEG image", &["jpg", "jpeg"])
            .set_file_name(format!("{}.png", figure.file_stem()))
            .save_file()
        else {
            return;
        };

        let (tx, rx) = channel();
        self.export_rx = Some(rx);
        self.is_exporting = true;
        self.status = format!("Saving {}...", path.display());

        let size = self.export_size;
        thread::spawn(move || {
            let result = match StaticChartRenderer::save(&figure, &path, size) {
                Ok(()) => ExportResult::Complete(path),
                Err(e) => ExportResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for export results
    fn check_export_results(&mut self) {
        let Some(rx) = self.export_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(ExportResult::Complete(path)) => {
                info!(path = %path.display(), "figure saved from viewer");
                self.status = format!("Saved {}", path.display());
                self.is_exporting = false;
            }
            Ok(ExportResult::Error(e)) => {
                error!(error = %e, "figure export failed");
                self.status = format!("Error: {}", e);
                self.is_exporting = false;
            }
            Err(_) => self.export_rx = Some(rx),
        }
    }
}

impl eframe::App for FigureViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_export_results();
        if self.is_exporting {
            ctx.request_repaint();
        }

        let mut save_clicked = false;
        SidePanel::left("figure_list")
            .resizable(false)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Figures");
                ui.separator();
                for (i, figure) in self.figures.iter().enumerate() {
                    if ui
                        .selectable_label(self.selected == i, figure.title())
                        .clicked()
                    {
                        self.selected = i;
                    }
                }
                ui.separator();
                save_clicked = ui
                    .add_enabled(!self.is_exporting, Button::new("Save..."))
                    .clicked();
                if !self.status.is_empty() {
                    ui.label(RichText::new(&self.status).small());
                }
            });

        CentralPanel::default().show(ctx, |ui| match self.figures.get(self.selected) {
            Some(figure) => ChartPlotter::draw(ui, figure),
            None => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0));
                });
            }
        });

        if save_clicked {
            self.handle_save();
        }
    }
}

/// Open the viewer window; returns when it is closed.
pub fn run_viewer(figures: Vec<Figure>, export_size: (u32, u32)) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Climate Insights"),
        ..Default::default()
    };

    eframe::run_native(
        "Climate Insights",
        options,
        Box::new(move |cc| Ok(Box::new(FigureViewerApp::new(cc, figures, export_size)))),
    )
}
