//! Pointer gesture recognition for a single tracked element.
//!
//! A [`GestureRecognizer`] turns press / move / release samples into
//! start, drag and end events. Drag deltas are measured sample-to-sample
//! once the session has moved past the activation threshold. The host feeds
//! the element's current bounds with every sample so the recognizer can
//! report element-relative positions and apply the directional lock.

use serde::{Deserialize, Serialize};

/// Which edge of the tracked element a drag is locked to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockSide {
    Start,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

impl PointerKind {
    /// Map a DOM `pointerType` string. Unknown types count as mouse.
    pub fn from_pointer_type(pointer_type: &str) -> Self {
        match pointer_type {
            "touch" => PointerKind::Touch,
            "pen" => PointerKind::Pen,
            _ => PointerKind::Mouse,
        }
    }
}

/// One pointer position in client (viewport) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub time_ms: f64,
    pub kind: PointerKind,
}

impl PointerSample {
    pub fn mouse(x: f64, y: f64, time_ms: f64) -> Self {
        Self { x, y, time_ms, kind: PointerKind::Mouse }
    }

    pub fn touch(x: f64, y: f64, time_ms: f64) -> Self {
        Self { x, y, time_ms, kind: PointerKind::Touch }
    }
}

/// Bounding box of the tracked element, client coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GestureConfig {
    /// Pixels the pointer must travel on either axis before the drag starts.
    pub threshold: f64,
    /// Mouse button that starts a session (0 = primary).
    pub button: i16,
    pub touch_delay_ms: f64,
    pub lock_side: Option<LockSide>,
    /// Drop samples that move away from the pointer while it is still behind
    /// the reference edge. Off for surfaces that never follow the pointer.
    pub suppress_lagging: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            button: 0,
            touch_delay_ms: 100.0,
            lock_side: None,
            suppress_lagging: true,
        }
    }
}

/// Output of the recognizer. Positions are relative to the element's
/// top-left corner at the time of the sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    Start { x: f64, y: f64 },
    Drag { dx: f64, dy: f64, x: f64, y: f64 },
    End { x: f64, y: f64 },
}

#[derive(Clone, Debug)]
struct GestureSession {
    anchor_x: f64,
    anchor_y: f64,
    activated: bool,
    started_at_ms: f64,
    kind: PointerKind,
    /// Pointer offset from the element's left edge at press time. Only
    /// tracked for unlocked (whole-element) drags.
    grab_offset: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct GestureRecognizer {
    config: GestureConfig,
    session: Option<GestureSession>,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self { config, session: None }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// A press has been accepted and not yet released.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The current session has passed the activation threshold.
    pub fn is_dragging(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.activated)
    }

    /// Begin a session. Returns false (and records nothing) for any button
    /// other than the configured one, or while a session is already open.
    pub fn press(&mut self, button: i16, sample: PointerSample, bounds: Bounds) -> bool {
        if button != self.config.button || self.session.is_some() {
            return false;
        }
        let grab_offset = match self.config.lock_side {
            None => Some(sample.x - bounds.left),
            Some(_) => None,
        };
        self.session = Some(GestureSession {
            anchor_x: sample.x,
            anchor_y: sample.y,
            activated: false,
            started_at_ms: sample.time_ms,
            kind: sample.kind,
            grab_offset,
        });
        log::debug!("gesture session opened at ({:.1}, {:.1})", sample.x, sample.y);
        true
    }

    /// Process one move sample, emitting `Start` (once) and `Drag` events.
    pub fn pointer_move(
        &mut self,
        sample: PointerSample,
        bounds: Bounds,
        mut emit: impl FnMut(GestureEvent),
    ) {
        let config = &self.config;
        let Some(session) = self.session.as_mut() else { return };

        if session.kind == PointerKind::Touch
            && sample.time_ms - session.started_at_ms < config.touch_delay_ms
        {
            return;
        }

        let dx = sample.x - session.anchor_x;
        let dy = sample.y - session.anchor_y;

        if !session.activated {
            if dx.abs() <= config.threshold && dy.abs() <= config.threshold {
                return;
            }
            session.activated = true;
            emit(GestureEvent::Start {
                x: session.anchor_x - bounds.left,
                y: session.anchor_y - bounds.top,
            });
        }

        let reference = match config.lock_side {
            Some(LockSide::Start) => bounds.left,
            Some(LockSide::End) => bounds.right(),
            None => bounds.left + session.grab_offset.unwrap_or(0.0),
        };
        // Pointer is behind the reference edge relative to its travel.
        let lagging = config.suppress_lagging
            && ((dx > 0.0 && sample.x < reference) || (dx < 0.0 && sample.x > reference));

        if lagging {
            log::trace!("drag sample suppressed: pointer {:.1} vs edge {:.1}", sample.x, reference);
        } else {
            emit(GestureEvent::Drag {
                dx,
                dy,
                x: sample.x - bounds.left,
                y: sample.y - bounds.top,
            });
        }

        session.anchor_x = sample.x;
        session.anchor_y = sample.y;
    }

    /// End the session on pointer release or on leaving the root surface.
    /// `End` is only reported for sessions that activated.
    pub fn release(&mut self, sample: PointerSample, bounds: Bounds) -> Option<GestureEvent> {
        let session = self.session.take()?;
        log::debug!("gesture session closed (activated: {})", session.activated);
        session.activated.then(|| GestureEvent::End {
            x: sample.x - bounds.left,
            y: sample.y - bounds.top,
        })
    }

    /// Drop any open session without reporting anything.
    pub fn cancel(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(rec: &mut GestureRecognizer, sample: PointerSample, bounds: Bounds) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        rec.pointer_move(sample, bounds, |ev| out.push(ev));
        out
    }

    fn bounds() -> Bounds {
        Bounds::new(100.0, 50.0, 200.0, 40.0)
    }

    #[test]
    fn test_wrong_button_creates_no_session() {
        let mut rec = GestureRecognizer::new(GestureConfig::default());
        assert!(!rec.press(2, PointerSample::mouse(150.0, 60.0, 0.0), bounds()));
        assert!(!rec.is_active());
        assert!(collect(&mut rec, PointerSample::mouse(180.0, 60.0, 10.0), bounds()).is_empty());
    }

    #[test]
    fn test_threshold_gates_activation() {
        let mut rec = GestureRecognizer::new(GestureConfig::default());
        assert!(rec.press(0, PointerSample::mouse(150.0, 60.0, 0.0), bounds()));

        assert!(collect(&mut rec, PointerSample::mouse(153.0, 57.0, 5.0), bounds()).is_empty());
        assert!(!rec.is_dragging());

        let events = collect(&mut rec, PointerSample::mouse(155.0, 60.0, 10.0), bounds());
        assert_eq!(
            events,
            vec![
                GestureEvent::Start { x: 50.0, y: 10.0 },
                GestureEvent::Drag { dx: 5.0, dy: 0.0, x: 55.0, y: 10.0 },
            ]
        );
        assert!(rec.is_dragging());
    }

    #[test]
    fn test_deltas_are_sample_to_sample_after_activation() {
        let mut rec = GestureRecognizer::new(GestureConfig::default());
        rec.press(0, PointerSample::mouse(150.0, 60.0, 0.0), bounds());
        collect(&mut rec, PointerSample::mouse(160.0, 60.0, 1.0), bounds());

        // Element followed the pointer by 10 px.
        let moved = Bounds::new(110.0, 50.0, 200.0, 40.0);
        let events = collect(&mut rec, PointerSample::mouse(162.0, 61.0, 2.0), moved);
        assert_eq!(events, vec![GestureEvent::Drag { dx: 2.0, dy: 1.0, x: 52.0, y: 11.0 }]);
    }

    #[test]
    fn test_touch_delay_ignores_early_samples() {
        let mut rec = GestureRecognizer::new(GestureConfig::default());
        rec.press(0, PointerSample::touch(150.0, 60.0, 1000.0), bounds());

        // Large move inside the delay window: ignored, anchor untouched.
        assert!(collect(&mut rec, PointerSample::touch(200.0, 60.0, 1050.0), bounds()).is_empty());
        assert!(!rec.is_dragging());

        let events = collect(&mut rec, PointerSample::touch(170.0, 60.0, 1150.0), bounds());
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], GestureEvent::Drag { dx, .. } if dx == 20.0));
    }

    #[test]
    fn test_end_lock_suppresses_but_advances_anchor() {
        let config = GestureConfig { threshold: 1.0, lock_side: Some(LockSide::End), ..Default::default() };
        let mut rec = GestureRecognizer::new(config);
        // Region spans 100..300; grab the end handle just outside its right edge.
        rec.press(0, PointerSample::mouse(302.0, 60.0, 0.0), bounds());
        let events = collect(&mut rec, PointerSample::mouse(310.0, 60.0, 1.0), bounds());
        assert!(matches!(events.last(), Some(GestureEvent::Drag { dx, .. }) if *dx == 8.0));

        // Region stuck at 300 (clamped by a neighbor); pointer overshot to 340.
        collect(&mut rec, PointerSample::mouse(340.0, 60.0, 2.0), bounds());

        // Moving back left while still right of the edge: suppressed.
        let events = collect(&mut rec, PointerSample::mouse(320.0, 60.0, 3.0), bounds());
        assert!(events.is_empty());

        // Anchor advanced to 320, so the next delta is measured from there.
        let events = collect(&mut rec, PointerSample::mouse(290.0, 60.0, 4.0), bounds());
        assert_eq!(events, vec![GestureEvent::Drag { dx: -30.0, dy: 0.0, x: 190.0, y: 10.0 }]);
    }

    #[test]
    fn test_start_lock_suppresses_rightward_lag() {
        let config = GestureConfig { threshold: 1.0, lock_side: Some(LockSide::Start), ..Default::default() };
        let mut rec = GestureRecognizer::new(config);
        // Grab the start handle just left of the region's left edge (100).
        rec.press(0, PointerSample::mouse(98.0, 60.0, 0.0), bounds());
        let events = collect(&mut rec, PointerSample::mouse(90.0, 60.0, 1.0), bounds());
        assert!(matches!(events.last(), Some(GestureEvent::Drag { dx, .. }) if *dx == -8.0));

        // Start stuck at 100 (clamped by a neighbor); pointer overshot to 60.
        collect(&mut rec, PointerSample::mouse(60.0, 60.0, 2.0), bounds());

        // Moving back right while still left of the edge: suppressed.
        let events = collect(&mut rec, PointerSample::mouse(80.0, 60.0, 3.0), bounds());
        assert!(events.is_empty());

        // Past the edge the drag is live again, measured from the advanced anchor.
        let events = collect(&mut rec, PointerSample::mouse(110.0, 60.0, 4.0), bounds());
        assert_eq!(events, vec![GestureEvent::Drag { dx: 30.0, dy: 0.0, x: 10.0, y: 10.0 }]);
    }

    #[test]
    fn test_free_drag_reports_every_reversal() {
        let config = GestureConfig { suppress_lagging: false, ..Default::default() };
        let mut rec = GestureRecognizer::new(config);
        // Static surface: bounds never move while the pointer sweeps.
        rec.press(0, PointerSample::mouse(200.0, 60.0, 0.0), bounds());
        let mut events = collect(&mut rec, PointerSample::mouse(210.0, 60.0, 1.0), bounds());
        events.extend(collect(&mut rec, PointerSample::mouse(250.0, 60.0, 2.0), bounds()));
        events.extend(collect(&mut rec, PointerSample::mouse(220.0, 60.0, 3.0), bounds()));
        let deltas: Vec<f64> = events
            .iter()
            .filter_map(|ev| match ev {
                GestureEvent::Drag { dx, .. } => Some(*dx),
                _ => None,
            })
            .collect();
        assert_eq!(deltas, vec![10.0, 40.0, -30.0]);
    }

    #[test]
    fn test_unlocked_drag_uses_grab_offset() {
        let mut rec = GestureRecognizer::new(GestureConfig::default());
        // Grab 40 px into the element.
        rec.press(0, PointerSample::mouse(140.0, 60.0, 0.0), bounds());
        collect(&mut rec, PointerSample::mouse(150.0, 60.0, 1.0), bounds());

        // Element did not follow (still at 100); pointer keeps moving right,
        // then reverses while still right of its grab point (140).
        collect(&mut rec, PointerSample::mouse(180.0, 60.0, 2.0), bounds());
        let events = collect(&mut rec, PointerSample::mouse(170.0, 60.0, 3.0), bounds());
        assert!(events.is_empty());

        // Reversing left of the grab point is live again.
        let events = collect(&mut rec, PointerSample::mouse(130.0, 60.0, 4.0), bounds());
        assert!(matches!(events.as_slice(), [GestureEvent::Drag { dx, .. }] if *dx == -40.0));
    }

    #[test]
    fn test_release_reports_end_only_when_activated() {
        let mut rec = GestureRecognizer::new(GestureConfig::default());
        rec.press(0, PointerSample::mouse(150.0, 60.0, 0.0), bounds());
        assert_eq!(rec.release(PointerSample::mouse(151.0, 60.0, 5.0), bounds()), None);
        assert!(!rec.is_active());

        rec.press(0, PointerSample::mouse(150.0, 60.0, 10.0), bounds());
        collect(&mut rec, PointerSample::mouse(170.0, 60.0, 11.0), bounds());
        assert_eq!(
            rec.release(PointerSample::mouse(170.0, 70.0, 12.0), bounds()),
            Some(GestureEvent::End { x: 70.0, y: 20.0 })
        );
    }

    #[test]
    fn test_second_press_while_active_is_ignored() {
        let mut rec = GestureRecognizer::new(GestureConfig::default());
        assert!(rec.press(0, PointerSample::mouse(150.0, 60.0, 0.0), bounds()));
        assert!(!rec.press(0, PointerSample::mouse(10.0, 10.0, 1.0), bounds()));
        rec.cancel();
        assert!(!rec.is_active());
    }
}
