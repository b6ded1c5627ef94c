//! Transport bar: playback, seek steps, zoom, edit mode and project actions

use egui::{Color32, RichText, Ui};
use storyline_core::EditMode;

/// Actions that can be triggered from transport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportAction {
    None,
    TogglePlay,
    Stop,
    SeekStart,
    SeekEnd,
    PreviousBoundary,
    NextBoundary,
    PlaySegment,
    ZoomIn,
    ZoomOut,
    ZoomToFit,
    SetMode(EditMode),
    Undo,
    ImportAudio,
    DownloadAll,
    Close,
}

/// Read-only state the bar displays
pub struct TransportView {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub pixels_per_second: f64,
    pub mode: EditMode,
    pub has_segment_selection: bool,
    pub can_undo: bool,
    pub loading_peaks: bool,
}

pub struct TransportPanel;

impl TransportPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn ui(&mut self, ui: &mut Ui, view: &TransportView) -> TransportAction {
        let mut action = TransportAction::None;

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 8.0;

            if ui.button(RichText::new("\u{23EE}").size(18.0)).on_hover_text("Go to start").clicked() {
                action = TransportAction::SeekStart;
            }
            if ui.button(RichText::new("\u{25C2}").size(18.0)).on_hover_text("Previous cut").clicked() {
                action = TransportAction::PreviousBoundary;
            }

            let play_text = if view.is_playing { "\u{23F8}" } else { "\u{25B6}" };
            if ui.button(RichText::new(play_text).size(18.0)).clicked() {
                action = TransportAction::TogglePlay;
            }
            if ui.button(RichText::new("\u{23F9}").size(18.0)).clicked() {
                action = TransportAction::Stop;
            }

            if ui.button(RichText::new("\u{25B8}").size(18.0)).on_hover_text("Next cut").clicked() {
                action = TransportAction::NextBoundary;
            }
            if ui.button(RichText::new("\u{23ED}").size(18.0)).on_hover_text("Go to end").clicked() {
                action = TransportAction::SeekEnd;
            }

            let play_segment = ui
                .add_enabled(view.has_segment_selection, egui::Button::new("Play segment"))
                .on_hover_text("Play the selected segment and stop at its cut");
            if play_segment.clicked() {
                action = TransportAction::PlaySegment;
            }

            ui.separator();

            ui.monospace(format!(
                "{} / {}",
                format_clock(view.current_time),
                format_clock(view.duration)
            ));

            ui.separator();

            if ui.button("\u{2212}").on_hover_text("Zoom out").clicked() {
                action = TransportAction::ZoomOut;
            }
            ui.monospace(format!("{:>4.0} px/s", view.pixels_per_second));
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                action = TransportAction::ZoomIn;
            }
            if ui.button("Fit").clicked() {
                action = TransportAction::ZoomToFit;
            }

            ui.separator();

            let mut mode = view.mode;
            ui.selectable_value(&mut mode, EditMode::Clips, "Clips");
            ui.selectable_value(&mut mode, EditMode::LinkedRegions, "Linked regions");
            if mode != view.mode {
                action = TransportAction::SetMode(mode);
            }

            let undo = ui
                .add_enabled(view.can_undo, egui::Button::new("Undo"))
                .on_hover_text("Undo the last region edit (Ctrl+Z)");
            if undo.clicked() {
                action = TransportAction::Undo;
            }

            ui.separator();

            if ui.button("Import WAV\u{2026}").clicked() {
                action = TransportAction::ImportAudio;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Close").clicked() {
                    action = TransportAction::Close;
                }
                if ui.button("Download all").clicked() {
                    action = TransportAction::DownloadAll;
                }
                if view.loading_peaks {
                    ui.spinner();
                    ui.label(RichText::new("Loading waveforms").color(Color32::from_gray(150)));
                }
            });
        });

        action
    }
}

/// `mm:ss.cc` transport readout
fn format_clock(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0) as u32;
    let secs_rem = seconds - mins as f64 * 60.0;
    format!("{:02}:{:05.2}", mins, secs_rem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00.00");
        assert_eq!(format_clock(75.25), "01:15.25");
        assert_eq!(format_clock(-3.0), "00:00.00");
    }
}
