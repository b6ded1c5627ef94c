use egui::{CursorIcon, MouseWheelUnit, Response, Ui};
use storyline_core::{CursorHint, PointerContext, TimelineEvent, ViewportController};

use super::types::{TimelineContext, TimelineView};
use super::TimelinePanel;

/// Points per wheel notch for line-based wheels
const LINE_SCROLL_POINTS: f32 = 40.0;

impl TimelinePanel {
    /// Feed raw primary-button state to the gesture controller.
    ///
    /// A gesture keeps receiving moves and its release even when the pointer
    /// leaves the panel, like a globally attached drag listener.
    pub(super) fn handle_pointer(
        &mut self,
        ui: &Ui,
        response: &Response,
        ctx: &TimelineContext,
        view: &TimelineView<'_>,
        viewport: &ViewportController,
    ) -> Vec<TimelineEvent> {
        let pctx = pointer_context(view, viewport);
        let (pos, pressed, down, released) = ui.input(|i| {
            (
                i.pointer.interact_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
            )
        });

        let mut events = Vec::new();

        if pressed && !self.controller.is_active() && response.contains_pointer() {
            if let Some(pos) = pos {
                let x = ctx.local_x(pos);
                self.last_pointer_x = x;
                events.extend(self.controller.pointer_down(x, ctx.target_at(pos), &pctx));
            }
        }

        if !self.controller.is_active() {
            return events;
        }

        if let Some(pos) = pos {
            let x = ctx.local_x(pos);
            if x != self.last_pointer_x {
                self.last_pointer_x = x;
                events.extend(self.controller.pointer_move(x, &pctx));
            }
        }

        if released || !down {
            events.extend(self.controller.pointer_up(self.last_pointer_x, &pctx));
        }

        events
    }

    /// Plain wheel pans, Ctrl/Cmd + wheel zooms around the playhead
    pub(super) fn handle_scroll_zoom(
        &self,
        ui: &Ui,
        ctx: &TimelineContext,
        view: &TimelineView<'_>,
        viewport: &mut ViewportController,
    ) {
        let pointer_in_rect = ui.input(|i| {
            i.pointer.hover_pos().is_some_and(|p| ctx.rect.contains(p))
        });
        if !pointer_in_rect {
            return;
        }

        let (wheel_y, scroll, zoom_modifier) = ui.input(|i| {
            let wheel: f32 = i
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::MouseWheel { unit, delta, .. } => Some(wheel_points(*unit, delta.y)),
                    _ => None,
                })
                .sum();
            (wheel, i.smooth_scroll_delta, i.modifiers.ctrl || i.modifiers.command)
        });

        // With the zoom modifier held egui routes the wheel to zoom, not scroll
        if zoom_modifier {
            self.controller
                .wheel(0.0, wheel_y as f64, true, view.playhead.current_time(), viewport);
        } else {
            self.controller
                .wheel(scroll.x as f64, scroll.y as f64, false, view.playhead.current_time(), viewport);
        }
    }

    pub(super) fn update_cursor(
        &self,
        ui: &Ui,
        ctx: &TimelineContext,
        view: &TimelineView<'_>,
        viewport: &ViewportController,
    ) {
        let Some(pos) = ui.input(|i| i.pointer.hover_pos()) else { return };
        if !ctx.rect.contains(pos) && !self.controller.is_active() {
            return;
        }

        let pctx = pointer_context(view, viewport);
        let hint = self
            .controller
            .hover(ctx.local_x(pos), ctx.target_at(pos), &pctx);
        if let Some(icon) = cursor_icon(hint) {
            ui.ctx().set_cursor_icon(icon);
        }
    }
}

fn pointer_context<'a>(view: &TimelineView<'a>, viewport: &ViewportController) -> PointerContext<'a> {
    PointerContext {
        mapper: viewport.mapper(),
        duration: view.duration,
        segments: view.segments,
        clips: view.clips,
    }
}

fn wheel_points(unit: MouseWheelUnit, delta: f32) -> f32 {
    match unit {
        MouseWheelUnit::Point => delta,
        MouseWheelUnit::Line => delta * LINE_SCROLL_POINTS,
        MouseWheelUnit::Page => delta * LINE_SCROLL_POINTS * 10.0,
    }
}

fn cursor_icon(hint: CursorHint) -> Option<CursorIcon> {
    match hint {
        CursorHint::Default => None,
        CursorHint::Grab => Some(CursorIcon::Grab),
        CursorHint::Grabbing => Some(CursorIcon::Grabbing),
        CursorHint::ResizeHorizontal => Some(CursorIcon::ResizeHorizontal),
    }
}
