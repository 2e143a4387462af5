use wasm_bindgen::JsCast;
use wave_regions_core::overlay::{Coverage, OverlaySegment};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

// ── Played/unplayed overlay ──────────────────────────────────────────────────

fn get_canvas_ctx(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()?
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
}

/// Hard color stops for a horizontal gradient: each segment contributes
/// its color at both ends so neighbouring segments meet without blending.
fn color_stops<'a>(segments: &[OverlaySegment], covered: &'a str, uncovered: &'a str) -> Vec<(f32, &'a str)> {
    let mut stops = Vec::with_capacity(segments.len() * 2);
    for seg in segments {
        let color = match seg.coverage {
            Coverage::Covered => covered,
            Coverage::Uncovered => uncovered,
        };
        stops.push(((seg.from / 100.0).clamp(0.0, 1.0) as f32, color));
        stops.push(((seg.to / 100.0).clamp(0.0, 1.0) as f32, color));
    }
    stops
}

/// Paint the overlay across the whole canvas. No segments clears it.
pub fn draw(canvas: &HtmlCanvasElement, segments: &[OverlaySegment], covered: &str, uncovered: &str) {
    // Sync canvas internal resolution with display size
    let rect = canvas.get_bounding_client_rect();
    let display_w = rect.width() as u32;
    let display_h = rect.height() as u32;
    if display_w == 0 || display_h == 0 {
        return;
    }
    if canvas.width() != display_w || canvas.height() != display_h {
        canvas.set_width(display_w);
        canvas.set_height(display_h);
    }

    let Some(ctx) = get_canvas_ctx(canvas) else {
        log::warn!("overlay canvas has no 2d context");
        return;
    };
    let (w, h) = (display_w as f64, display_h as f64);
    ctx.clear_rect(0.0, 0.0, w, h);
    if segments.is_empty() {
        return;
    }

    let gradient = ctx.create_linear_gradient(0.0, 0.0, w, 0.0);
    for (offset, color) in color_stops(segments, covered, uncovered) {
        if let Err(e) = gradient.add_color_stop(offset, color) {
            log::warn!("bad overlay color {color}: {:?}", e);
            return;
        }
    }
    ctx.set_fill_style_canvas_gradient(&gradient);
    ctx.fill_rect(0.0, 0.0, w, h);
}
