use egui::{Align2, Color32, FontId, Rect, Stroke, Vec2};
use storyline_core::render::{CLIP_INSET_PX, SEGMENT_PADDING_PX};
use storyline_core::{AudioLayout, ClipBox, SourceId, WaveformRequest};
use storyline_services::PeakEntry;

use super::types::{TimelineContext, TimelineView};
use super::{TimelinePanel, TITLE_FONT_SIZE};

const PLAYHEAD_COLOR: Color32 = Color32::from_rgb(255, 100, 100);
const WAVEFORM_COLOR: Color32 = Color32::from_rgb(170, 200, 230);

impl TimelinePanel {
    pub(super) fn draw_backgrounds(&self, painter: &egui::Painter, ctx: &TimelineContext) {
        painter.rect_filled(ctx.ruler_rect, 0.0, Color32::from_gray(45));
        painter.rect_filled(ctx.segment_rect, 0.0, Color32::from_gray(38));
        painter.rect_filled(ctx.audio_rect, 0.0, Color32::from_gray(30));

        for y in [ctx.ruler_rect.bottom(), ctx.segment_rect.bottom()] {
            painter.line_segment(
                [egui::pos2(ctx.rect.left(), y), egui::pos2(ctx.rect.right(), y)],
                Stroke::new(1.0, Color32::from_gray(60)),
            );
        }
    }

    pub(super) fn draw_ruler(&self, painter: &egui::Painter, ctx: &TimelineContext) {
        for tick in self.pipeline.ruler() {
            let x = ctx.screen_x(tick.x);
            let (tick_height, tick_color) = if tick.major {
                (10.0, Color32::from_gray(140))
            } else {
                (4.0, Color32::from_gray(90))
            };

            painter.line_segment(
                [
                    egui::pos2(x, ctx.ruler_rect.bottom() - tick_height),
                    egui::pos2(x, ctx.ruler_rect.bottom()),
                ],
                Stroke::new(1.0, tick_color),
            );

            if let Some(label) = &tick.label {
                painter.text(
                    egui::pos2(x + 4.0, ctx.ruler_rect.top() + 3.0),
                    Align2::LEFT_TOP,
                    label,
                    FontId::monospace(10.0),
                    Color32::from_gray(200),
                );
            }
        }
    }

    pub(super) fn draw_segments(&self, painter: &egui::Painter, ctx: &TimelineContext) {
        let pad = SEGMENT_PADDING_PX as f32;
        let top = ctx.segment_rect.top() + 4.0;
        let bottom = ctx.segment_rect.bottom() - 4.0;

        for segment in self.pipeline.segments() {
            let x0 = ctx.screen_x(segment.x0);
            let x1 = ctx.screen_x(segment.x1);
            let rect = Rect::from_min_max(egui::pos2(x0, top), egui::pos2(x1, bottom));

            let fill = match (segment.selected, segment.index % 2 == 0) {
                (true, _) => Color32::from_rgb(80, 120, 170),
                (false, true) => Color32::from_rgb(58, 74, 98),
                (false, false) => Color32::from_rgb(52, 66, 88),
            };
            let border = if segment.selected {
                Stroke::new(2.0, Color32::from_rgb(140, 180, 230))
            } else {
                Stroke::new(1.0, Color32::from_rgb(80, 100, 130))
            };
            painter.rect_filled(rect, 3.0, fill);
            painter.rect_stroke(rect, 3.0, border, egui::StrokeKind::Inside);

            let roomy = rect.width() > 48.0;
            if roomy {
                painter.text(
                    egui::pos2(rect.left() + pad, rect.top() + 3.0),
                    Align2::LEFT_TOP,
                    &segment.index_label,
                    FontId::proportional(10.0),
                    Color32::from_gray(170),
                );
                painter.text(
                    egui::pos2(rect.right() - pad, rect.top() + 3.0),
                    Align2::RIGHT_TOP,
                    segment.glyph,
                    FontId::proportional(10.0),
                    Color32::from_gray(210),
                );
            }

            if !segment.title.is_empty() {
                painter.text(
                    egui::pos2(rect.left() + pad, rect.center().y),
                    Align2::LEFT_CENTER,
                    &segment.title,
                    FontId::proportional(TITLE_FONT_SIZE),
                    Color32::WHITE,
                );
            }

            if roomy {
                painter.text(
                    egui::pos2(rect.left() + pad, rect.bottom() - 3.0),
                    Align2::LEFT_BOTTOM,
                    &segment.duration_label,
                    FontId::proportional(10.0),
                    Color32::from_gray(160),
                );
                if let Some(media) = &segment.media_label {
                    painter.text(
                        egui::pos2(rect.right() - pad, rect.bottom() - 3.0),
                        Align2::RIGHT_BOTTOM,
                        media,
                        FontId::proportional(10.0),
                        Color32::from_rgb(150, 200, 150),
                    );
                }
            }
        }
    }

    pub(super) fn draw_audio(&self, painter: &egui::Painter, ctx: &TimelineContext, view: &TimelineView<'_>) {
        match self.pipeline.audio() {
            AudioLayout::Empty => {
                painter.text(
                    ctx.audio_rect.center(),
                    Align2::CENTER_CENTER,
                    "Drop WAV files here",
                    FontId::proportional(13.0),
                    Color32::from_gray(110),
                );
            }
            AudioLayout::Clips(clips) => {
                for (slot, clip) in clips.iter().enumerate() {
                    self.draw_clip(painter, ctx, view, clip, self.waveforms.get(slot));
                }
            }
            AudioLayout::Legacy { waveform, dividers } => {
                if let (Some(request), Some(source)) = (waveform, view.legacy_source) {
                    draw_source_waveform(painter, ctx, view, source, request, self.waveforms.get(0));
                }
                for &x in dividers {
                    let x = ctx.screen_x(x);
                    painter.line_segment(
                        [egui::pos2(x, ctx.audio_rect.top()), egui::pos2(x, ctx.audio_rect.bottom())],
                        Stroke::new(1.0, Color32::from_rgb(100, 150, 200)),
                    );
                }
            }
        }
    }

    fn draw_clip(
        &self,
        painter: &egui::Painter,
        ctx: &TimelineContext,
        view: &TimelineView<'_>,
        clip: &ClipBox,
        columns: Option<&[(f32, f32)]>,
    ) {
        let rect = Rect::from_min_max(
            egui::pos2(ctx.screen_x(clip.x0), ctx.audio_rect.top() + CLIP_INSET_PX),
            egui::pos2(ctx.screen_x(clip.x1), ctx.audio_rect.bottom() - CLIP_INSET_PX),
        );

        let (fill, border_width) = if clip.selected {
            (Color32::from_rgb(80, 130, 180), 2.0)
        } else {
            (Color32::from_rgb(60, 100, 140), 1.0)
        };
        painter.rect_filled(rect, 4.0, fill);

        if let Some(request) = &clip.waveform {
            draw_source_waveform(painter, ctx, view, &clip.source, request, columns);
        }

        painter.rect_stroke(
            rect,
            4.0,
            Stroke::new(border_width, Color32::from_rgb(100, 150, 200)),
            egui::StrokeKind::Outside,
        );

        // Trim handles
        if clip.selected && rect.width() > 12.0 {
            let handle = Vec2::new(3.0, rect.height() - 8.0);
            for x in [rect.left() + 2.0, rect.right() - 5.0] {
                painter.rect_filled(
                    Rect::from_min_size(egui::pos2(x, rect.top() + 4.0), handle),
                    1.0,
                    Color32::from_rgb(190, 220, 250),
                );
            }
        }

        painter.text(
            egui::pos2(rect.left().max(ctx.rect.left()) + 4.0, rect.top() + 2.0),
            Align2::LEFT_TOP,
            &clip.name,
            FontId::proportional(10.0),
            Color32::WHITE,
        );
    }

    pub(super) fn draw_playhead(&self, painter: &egui::Painter, ctx: &TimelineContext) {
        let Some(x) = ctx.playhead_x else { return };
        let x = ctx.screen_x((x - ctx.rect.left()) as f64);

        painter.line_segment(
            [egui::pos2(x, ctx.rect.top()), egui::pos2(x, ctx.rect.bottom())],
            Stroke::new(2.0, PLAYHEAD_COLOR),
        );

        let triangle = vec![
            egui::pos2(x, ctx.ruler_rect.bottom() + 4.0),
            egui::pos2(x - 6.0, ctx.ruler_rect.bottom() - 6.0),
            egui::pos2(x + 6.0, ctx.ruler_rect.bottom() - 6.0),
        ];
        painter.add(egui::Shape::convex_polygon(triangle, PLAYHEAD_COLOR, Stroke::NONE));
    }
}

/// Waveform for `source`, or a loading hint. Failed sources draw nothing.
fn draw_source_waveform(
    painter: &egui::Painter,
    ctx: &TimelineContext,
    view: &TimelineView<'_>,
    source: &SourceId,
    request: &WaveformRequest,
    columns: Option<&[(f32, f32)]>,
) {
    match view.peaks.entry(source) {
        Some(PeakEntry::Ready(_)) => {
            if let Some(columns) = columns {
                draw_waveform(painter, ctx, request, columns);
            }
        }
        Some(PeakEntry::Failed) => {}
        None if view.peaks.is_loading(source) => {
            painter.text(
                egui::pos2(ctx.rect.left() + request.x + 4.0, ctx.audio_rect.bottom() - 6.0),
                Align2::LEFT_BOTTOM,
                "loading\u{2026}",
                FontId::proportional(10.0),
                Color32::from_gray(150),
            );
        }
        None => {}
    }
}

fn draw_waveform(painter: &egui::Painter, ctx: &TimelineContext, request: &WaveformRequest, columns: &[(f32, f32)]) {
    if columns.is_empty() || request.height < 4.0 {
        return;
    }

    let left = ctx.rect.left() + request.x;
    let center_y = ctx.audio_rect.top() + request.y + request.height / 2.0;
    let amplitude = request.height / 2.0 - 2.0;
    let column_width = request.width / columns.len() as f32;
    let min_height = 1.0 / ctx.pixels_per_point.max(0.1);

    for (i, &(lo, hi)) in columns.iter().enumerate() {
        let x = left + i as f32 * column_width;
        let top = center_y - hi.clamp(-1.0, 1.0) * amplitude;
        let bottom = (center_y - lo.clamp(-1.0, 1.0) * amplitude).max(top + min_height);
        painter.rect_filled(
            Rect::from_min_max(egui::pos2(x, top), egui::pos2(x + column_width.max(min_height), bottom)),
            0.0,
            WAVEFORM_COLOR,
        );
    }
}
