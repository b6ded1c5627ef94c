//! Timeline panel - ruler, segment track and audio track over one shared viewport

mod drawing;
mod input;
mod types;

pub use types::TimelineView;
use types::{TimelineContext, WaveformCache};

use egui::{Color32, FontId, Sense, Ui};
use storyline_core::{
    AudioLayout, EditMode, InteractionConfig, InteractionController, RenderInputs, RenderPipeline,
    SourceId, TimelineEvent, ViewportController, WaveformRequest,
};
use storyline_services::PeakLoader;

const TITLE_FONT_SIZE: f32 = 12.0;

/// Timeline panel state
pub struct TimelinePanel {
    controller: InteractionController,
    pipeline: RenderPipeline,
    waveforms: WaveformCache,
    /// Last pointer x seen during a gesture, for releases outside the window
    last_pointer_x: f64,
}

impl TimelinePanel {
    pub fn new(config: InteractionConfig, mode: EditMode) -> Self {
        let mut controller = InteractionController::new(config);
        controller.set_mode(mode);
        Self {
            controller,
            pipeline: RenderPipeline::new(),
            waveforms: WaveformCache::default(),
            last_pointer_x: 0.0,
        }
    }

    pub fn mode(&self) -> EditMode {
        self.controller.mode()
    }

    /// Switch editing model. A drag in progress is ended first.
    pub fn set_mode(&mut self, mode: EditMode) -> Vec<TimelineEvent> {
        self.pipeline.invalidate();
        self.controller.set_mode(mode)
    }

    /// Drop any gesture in flight
    pub fn teardown(&mut self) -> Vec<TimelineEvent> {
        self.controller.teardown()
    }

    pub fn ui(
        &mut self,
        ui: &mut Ui,
        view: &TimelineView<'_>,
        viewport: &mut ViewportController,
    ) -> Vec<TimelineEvent> {
        let available_rect = ui.available_rect_before_wrap();
        let (response, painter) = ui.allocate_painter(available_rect.size(), Sense::click_and_drag());
        let rect = response.rect;

        viewport.set_viewport_width(rect.width() as f64);
        let mapper = viewport.mapper();
        let pixels_per_point = ui.ctx().pixels_per_point();

        let ctx = TimelineContext::new(rect, pixels_per_point, view.playhead, &mapper);

        let inputs = RenderInputs {
            mapper,
            width: ctx.width(),
            audio_track_height: ctx.audio_rect.height(),
            pixels_per_point,
            segments: view.segments,
            clips: view.clips,
            legacy_duration: view.legacy_duration,
            selected_segment: view.selected_segment,
            selected_clip: view.selected_clip,
            revision: view.revision,
        };
        let font = FontId::proportional(TITLE_FONT_SIZE);
        let rebuilt = ui.fonts(|fonts| {
            self.pipeline.prepare(&inputs, |text| {
                fonts
                    .layout_no_wrap(text.to_owned(), font.clone(), Color32::WHITE)
                    .size()
                    .x as f64
            })
        });
        if rebuilt.ruler || rebuilt.segments || rebuilt.audio {
            tracing::trace!(
                ruler = rebuilt.ruler,
                segments = rebuilt.segments,
                audio = rebuilt.audio,
                "Timeline layers rebuilt"
            );
        }
        self.refresh_waveforms(view);

        // Drawing layers (order matters)
        self.draw_backgrounds(&painter, &ctx);
        self.draw_ruler(&painter, &ctx);
        self.draw_segments(&painter, &ctx);
        self.draw_audio(&painter, &ctx, view);
        self.draw_playhead(&painter, &ctx);

        let events = self.handle_pointer(ui, &response, &ctx, view, viewport);
        self.handle_scroll_zoom(ui, &ctx, view, viewport);
        self.update_cursor(ui, &ctx, view, viewport);

        events
    }

    /// Refold waveform columns when the audio layout or the peak data changed.
    /// Returns true when the columns were rebuilt.
    fn refresh_waveforms(&mut self, view: &TimelineView<'_>) -> bool {
        let key = (self.pipeline.audio_generation(), view.peaks.revision());
        if self.waveforms.key == Some(key) {
            return false;
        }
        self.waveforms.key = Some(key);
        self.waveforms.columns = match self.pipeline.audio() {
            AudioLayout::Empty => Vec::new(),
            AudioLayout::Clips(clips) => clips
                .iter()
                .map(|clip| fold_columns(view.peaks, &clip.source, clip.waveform.as_ref()))
                .collect(),
            AudioLayout::Legacy { waveform, .. } => vec![
                view.legacy_source
                    .and_then(|source| fold_columns(view.peaks, source, waveform.as_ref())),
            ],
        };
        true
    }
}

fn fold_columns(
    peaks: &PeakLoader,
    source: &SourceId,
    request: Option<&WaveformRequest>,
) -> Option<Vec<(f32, f32)>> {
    let data = peaks.get(source)?;
    // A bad range just leaves the clip body empty
    request?.columns(data).ok()
}
