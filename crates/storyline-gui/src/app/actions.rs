use std::time::Instant;

use egui::Context;
use storyline_core::{EditMode, Segment, TimelineEvent, ZoomAnchor};

use super::project::export_segments;
use super::StorylineApp;
use crate::panels::TransportAction;

/// Boundaries closer than this to the playhead are skipped when stepping
const BOUNDARY_STEP_EPSILON: f64 = 1e-3;

impl StorylineApp {
    pub(super) fn handle_timeline_events(&mut self, events: Vec<TimelineEvent>) {
        for event in events {
            self.handle_timeline_event(event);
        }
    }

    fn handle_timeline_event(&mut self, event: TimelineEvent) {
        match event {
            TimelineEvent::InteractionStart => self.playhead.begin_drag(),
            TimelineEvent::InteractionEnd => self.playhead.end_drag(),
            TimelineEvent::Seek(time) => self.playhead.seek(time),
            TimelineEvent::SegmentClick(index) => {
                tracing::debug!("Segment {} clicked", index);
                self.selected_segment = Some(index);
            }
            TimelineEvent::SelectClip(id) => {
                self.selected_clip = Some(id);
            }
            TimelineEvent::UpdateAudioClip { id, patch } => {
                if patch.is_empty() {
                    return;
                }
                let Some(clip) = self.clips.iter_mut().find(|c| c.id == id) else {
                    tracing::warn!("Update for unknown clip {}", id);
                    return;
                };
                clip.apply(&patch);
                self.selected_clip = Some(id);
                self.bump_revision();
            }
            TimelineEvent::MoveBoundary { index, edge, time } => {
                match self.region_editor.set_boundary(index, edge, time, Instant::now()) {
                    Ok(_) => self.bump_revision(),
                    Err(e) => tracing::warn!("Boundary move rejected: {}", e),
                }
            }
        }
    }

    pub(super) fn undo_region_edit(&mut self) {
        if self.region_editor.undo().is_some() {
            tracing::info!("Undid region edit ({} left)", self.region_editor.history_len());
            self.bump_revision();
        } else {
            tracing::debug!("Nothing to undo");
        }
    }

    pub(super) fn handle_transport_action(&mut self, ctx: &Context, action: TransportAction) {
        match action {
            TransportAction::None => {}
            TransportAction::TogglePlay => self.playhead.toggle(),
            TransportAction::Stop => {
                self.playhead.pause();
                self.playhead.seek(0.0);
                self.reveal_playhead();
            }
            TransportAction::SeekStart => {
                self.playhead.seek(0.0);
                self.reveal_playhead();
            }
            TransportAction::SeekEnd => {
                self.playhead.seek(self.playhead.duration());
                self.reveal_playhead();
            }
            TransportAction::PreviousBoundary | TransportAction::NextBoundary => {
                let forward = action == TransportAction::NextBoundary;
                let now = self.playhead.current_time();
                if let Some(time) = adjacent_boundary(self.region_editor.segments(), now, forward) {
                    self.playhead.seek(time);
                    self.reveal_playhead();
                }
            }
            TransportAction::PlaySegment => self.play_selected_segment(),
            TransportAction::ZoomIn => {
                let anchor = ZoomAnchor::Time(self.playhead.current_time());
                self.viewport.zoom_in(anchor);
            }
            TransportAction::ZoomOut => {
                let anchor = ZoomAnchor::Time(self.playhead.current_time());
                self.viewport.zoom_out(anchor);
            }
            TransportAction::ZoomToFit => self.viewport.zoom_to_fit(),
            TransportAction::SetMode(mode) => self.set_edit_mode(mode),
            TransportAction::Undo => self.undo_region_edit(),
            TransportAction::ImportAudio => {
                let files = rfd::FileDialog::new()
                    .add_filter("WAV audio", &["wav", "WAV"])
                    .pick_files();
                for path in files.unwrap_or_default() {
                    self.import_wav(&path);
                }
            }
            TransportAction::DownloadAll => {
                let Some(path) = rfd::FileDialog::new()
                    .set_file_name("segments.json")
                    .add_filter("JSON", &["json"])
                    .save_file()
                else {
                    return;
                };
                match export_segments(&path, self.region_editor.segments()) {
                    Ok(()) => tracing::info!("Exported segments to {}", path.display()),
                    Err(e) => tracing::error!("Export failed: {:#}", e),
                }
            }
            TransportAction::Close => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    fn play_selected_segment(&mut self) {
        let Some(index) = self.selected_segment else { return };
        let Some(segment) = self.region_editor.segments().iter().find(|s| s.index == index) else {
            tracing::warn!("Selected segment {} no longer exists", index);
            return;
        };
        let (start, end) = (segment.start_time, segment.end_time);
        tracing::info!("Playing segment {} ({:.2}s..{:.2}s)", index, start, end);
        self.playhead.play_range(start, end);
        self.reveal_playhead();
    }

    pub(super) fn set_edit_mode(&mut self, mode: EditMode) {
        let events = self.timeline_panel.set_mode(mode);
        self.handle_timeline_events(events);
        self.config.interaction.edit_mode = mode;
        tracing::info!("Edit mode: {:?}", mode);
    }

    /// Scroll so the playhead sits mid-viewport when it is off-screen
    fn reveal_playhead(&mut self) {
        let mapper = self.viewport.target_mapper();
        let width = self.viewport.viewport_width();
        let x = mapper.time_to_pixel(self.playhead.current_time());
        if mapper.is_visible(x, width) {
            return;
        }
        let centred = self.playhead.current_time() * mapper.pixels_per_second - width / 2.0;
        self.viewport.scroll_to(centred);
    }
}

/// Nearest segment boundary strictly before or after `time`
fn adjacent_boundary(segments: &[Segment], time: f64, forward: bool) -> Option<f64> {
    let boundaries = segments.iter().flat_map(|s| [s.start_time, s.end_time]);
    if forward {
        boundaries
            .filter(|&b| b > time + BOUNDARY_STEP_EPSILON)
            .min_by(f64::total_cmp)
    } else {
        boundaries
            .filter(|&b| b < time - BOUNDARY_STEP_EPSILON)
            .max_by(f64::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::AppConfig;
    use crate::app::project::demo_project;
    use storyline_services::PeakLoader;

    fn app() -> StorylineApp {
        StorylineApp::with_project(AppConfig::default(), demo_project(), PeakLoader::with_worker(None, 10))
    }

    #[test]
    fn test_adjacent_boundary() {
        let segments = demo_project().segments;
        assert_eq!(adjacent_boundary(&segments, 5.0, true), Some(7.0));
        assert_eq!(adjacent_boundary(&segments, 5.0, false), Some(4.0));
        assert_eq!(adjacent_boundary(&segments, 4.0, false), Some(0.0));
        assert_eq!(adjacent_boundary(&segments, 0.0, false), None);
        assert_eq!(adjacent_boundary(&segments, 94.5, true), None);
    }

    #[test]
    fn test_play_selected_segment_stops_at_cut() {
        let mut app = app();
        app.handle_timeline_events(vec![TimelineEvent::SegmentClick(2)]);
        app.play_selected_segment();
        assert!(app.playhead.is_playing());
        assert_eq!(app.playhead.current_time(), 4.0);

        for _ in 0..400 {
            app.playhead.advance(1.0 / 60.0);
        }
        assert!(!app.playhead.is_playing());
        assert_eq!(app.playhead.current_time(), 7.0);
    }

    #[test]
    fn test_mode_switch_is_remembered() {
        let mut app = app();
        app.set_edit_mode(EditMode::LinkedRegions);
        assert_eq!(app.timeline_panel.mode(), EditMode::LinkedRegions);
        assert_eq!(app.config.interaction.edit_mode, EditMode::LinkedRegions);
    }

    #[test]
    fn test_unknown_clip_update_is_ignored() {
        let mut app = app();
        let revision = app.revision;
        app.handle_timeline_events(vec![TimelineEvent::UpdateAudioClip {
            id: storyline_core::ClipId(99),
            patch: storyline_core::ClipPatch {
                start_time: Some(3.0),
                ..Default::default()
            },
        }]);
        assert_eq!(app.revision, revision);
    }

    #[test]
    fn test_empty_clip_patch_is_ignored() {
        let mut app = app();
        app.clips.push(storyline_core::AudioClip::new(
            storyline_core::ClipId(1),
            storyline_core::SourceId("a.wav".into()),
            2.0,
            4.0,
        ));
        let revision = app.revision;
        app.handle_timeline_events(vec![TimelineEvent::UpdateAudioClip {
            id: storyline_core::ClipId(1),
            patch: Default::default(),
        }]);
        assert_eq!(app.revision, revision);
        assert_eq!(app.selected_clip, None);
    }
}
