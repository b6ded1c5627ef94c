//! Main application state

mod actions;
mod clock;
mod config;
mod media;
mod project;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::CreationContext;
use egui::Context;
use storyline_core::{
    AudioClip, ClipId, PlaybackTick, PlayheadSync, RegionEditor, SourceId, ViewportController,
};
use storyline_services::PeakLoader;

use clock::FrameClock;
use config::{load_config, save_config, AppConfig};
use project::{demo_project, load_project, Project};

use crate::panels::{TimelinePanel, TimelineView, TransportPanel, TransportView};

/// Continuous audio under the segments, drawn when there are no clips
struct LegacyTrack {
    source: SourceId,
    path: PathBuf,
    duration: f64,
}

pub struct StorylineApp {
    config: AppConfig,

    // Timeline state
    clips: Vec<AudioClip>,
    legacy: Option<LegacyTrack>,
    viewport: ViewportController,
    region_editor: RegionEditor,
    playhead: PlayheadSync,
    peaks: PeakLoader,
    clock: FrameClock,

    // Panels
    transport_panel: TransportPanel,
    timeline_panel: TimelinePanel,

    // Selection state
    selected_segment: Option<usize>,
    selected_clip: Option<ClipId>,

    /// Bumped whenever segments or clips change so cached layers rebuild
    revision: u64,
    next_clip_id: u64,
}

impl StorylineApp {
    pub fn new(_cc: &CreationContext<'_>, project_path: Option<PathBuf>) -> Self {
        let config = load_config();

        let project = match project_path {
            Some(path) => load_project(&path).unwrap_or_else(|e| {
                tracing::error!("Failed to load project: {:#}", e);
                Project::default()
            }),
            None => demo_project(),
        };

        let peaks = PeakLoader::new(config.peaks.peaks_per_second);
        let mut app = Self::with_project(config, project, peaks);
        app.request_all_peaks();
        app
    }

    fn with_project(config: AppConfig, project: Project, peaks: PeakLoader) -> Self {
        let next_clip_id = project.next_clip_id();
        let legacy = project.legacy_audio.and_then(|path| media::probe_legacy(&path));

        let viewport = ViewportController::new(config.viewport);
        let region_editor = RegionEditor::new(config.region_link_config(), project.segments);
        let timeline_panel = TimelinePanel::new(config.interaction_config(), config.interaction.edit_mode);

        let mut app = Self {
            config,
            clips: project.clips,
            legacy,
            viewport,
            region_editor,
            playhead: PlayheadSync::new(0.0),
            peaks,
            clock: FrameClock::new(),
            transport_panel: TransportPanel::new(),
            timeline_panel,
            selected_segment: None,
            selected_clip: None,
            revision: 0,
            next_clip_id,
        };
        app.refresh_duration();
        app.viewport.zoom_to_fit();
        app
    }

    /// End of the furthest segment, clip or continuous track
    fn duration(&self) -> f64 {
        let segments = self.region_editor.segments().iter().map(|s| s.end_time);
        let clips = self.clips.iter().map(|c| c.end_time());
        let legacy = self.legacy.iter().map(|l| l.duration);
        segments.chain(clips).chain(legacy).fold(0.0, f64::max)
    }

    fn refresh_duration(&mut self) {
        let duration = self.duration();
        self.viewport.set_duration(duration);
        self.playhead.set_duration(duration);
    }

    /// Segments or clips changed
    fn bump_revision(&mut self) {
        self.revision += 1;
        self.refresh_duration();
    }

    fn handle_keyboard(&mut self, ctx: &Context) {
        // Skip if a text field is focused
        let text_focused = ctx.memory(|mem| mem.focused().is_some())
            && ctx.input(|i| i.events.iter().any(|e| matches!(e, egui::Event::Text(_))));
        if text_focused {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.playhead.toggle();
        }

        let undo = ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z));
        if undo {
            self.undo_region_edit();
        }
    }

    /// Advance playback and viewport animation by one frame. Returns true
    /// when new peak data landed.
    fn tick(&mut self, now: Instant) -> bool {
        let dt = self.clock.tick(now);

        match self.playhead.advance(dt) {
            PlaybackTick::StoppedAtCut(time) => tracing::info!("Playback stopped at cut {:.3}s", time),
            PlaybackTick::ReachedEnd(time) => tracing::debug!("Playback reached end at {:.3}s", time),
            PlaybackTick::Advanced(_) | PlaybackTick::Idle => {}
        }

        self.viewport.tick(dt);

        if self.region_editor.poll(now) {
            tracing::debug!("Region edit settled ({} in history)", self.region_editor.history_len());
        }

        self.peaks.poll()
    }

    /// When the next frame is needed: right away while something animates,
    /// at the debounce deadline while only a region edit is settling.
    fn next_repaint(&self, now: Instant) -> Option<Duration> {
        let animating =
            self.playhead.is_playing() || self.viewport.is_animating() || self.peaks.has_pending();
        if animating {
            return Some(Duration::ZERO);
        }
        self.region_editor.pending_remaining(now)
    }
}

impl eframe::App for StorylineApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        // Handle dropped files
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .filter(|path| path.extension().is_some_and(|e| e.eq_ignore_ascii_case("wav")))
                .collect()
        });
        for path in dropped {
            self.import_wav(&path);
        }

        self.handle_keyboard(ctx);
        let now = Instant::now();
        let peaks_landed = self.tick(now);

        // 1. Transport bar
        let transport_view = TransportView {
            is_playing: self.playhead.is_playing(),
            current_time: self.playhead.current_time(),
            duration: self.playhead.duration(),
            pixels_per_second: self.viewport.pixels_per_second(),
            mode: self.timeline_panel.mode(),
            has_segment_selection: self.selected_segment.is_some(),
            can_undo: self.region_editor.history_len() > 0 || self.region_editor.has_pending(),
            loading_peaks: self.peaks.has_pending(),
        };
        let transport_action = egui::TopBottomPanel::top("transport")
            .show(ctx, |ui| self.transport_panel.ui(ui, &transport_view))
            .inner;
        self.handle_transport_action(ctx, transport_action);

        // 2. Central panel: timeline
        let events = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let view = TimelineView {
                    segments: self.region_editor.segments(),
                    clips: &self.clips,
                    peaks: &self.peaks,
                    legacy_source: self.legacy.as_ref().map(|l| &l.source),
                    legacy_duration: self.legacy.as_ref().map(|l| l.duration),
                    duration: self.playhead.duration(),
                    playhead: &self.playhead,
                    selected_segment: self.selected_segment,
                    selected_clip: self.selected_clip,
                    revision: self.revision,
                };
                self.timeline_panel.ui(ui, &view, &mut self.viewport)
            })
            .inner;
        self.handle_timeline_events(events);

        // Request repaint for animation
        if peaks_landed {
            ctx.request_repaint();
        } else if let Some(delay) = self.next_repaint(now) {
            ctx.request_repaint_after(delay);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let events = self.timeline_panel.teardown();
        self.handle_timeline_events(events);
        self.viewport.cancel_animation();
        self.region_editor.cancel_pending();
        save_config(&self.config);
    }
}
