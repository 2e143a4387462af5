use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    #[default]
    All,
    Index(u32),
}

/// A `[start, end]` interval in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Creation parameters, deserializable so hosts can hand over JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionParams {
    pub id: Option<String>,
    pub start: f64,
    /// Defaults to `start`, producing a marker.
    pub end: Option<f64>,
    pub drag: bool,
    pub resize: bool,
    pub resize_start: bool,
    pub resize_end: bool,
    pub min_length: f64,
    /// `None` means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<f64>,
    /// `None` spans every channel.
    pub channel: Option<u32>,
    pub color: Option<String>,
    pub content: Option<String>,
}

impl Default for RegionParams {
    fn default() -> Self {
        Self {
            id: None,
            start: 0.0,
            end: None,
            drag: true,
            resize: true,
            resize_start: true,
            resize_end: true,
            min_length: 0.0,
            max_length: None,
            channel: None,
            color: None,
            content: None,
        }
    }
}

impl RegionParams {
    pub fn span(start: f64, end: f64) -> Self {
        Self { start, end: Some(end), ..Default::default() }
    }

    pub fn marker(at: f64) -> Self {
        Self { start: at, ..Default::default() }
    }
}

/// Partial update for [`crate::Regions::update_region`]. `None` leaves the
/// field alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionUpdate {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub drag: Option<bool>,
    pub resize: Option<bool>,
    pub resize_start: Option<bool>,
    pub resize_end: Option<bool>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    pub color: Option<String>,
    pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub start: f64,
    pub end: f64,
    pub drag: bool,
    pub resize: bool,
    pub resize_start: bool,
    pub resize_end: bool,
    pub min_length: f64,
    pub max_length: f64,
    pub channel: Channel,
    pub color: String,
    pub content: Option<String>,
    total_duration: f64,
}

impl Region {
    /// Build a region, clamping both edges into `[0, total_duration]`.
    pub fn from_params(id: RegionId, params: RegionParams, total_duration: f64, default_color: &str) -> Self {
        let total_duration = total_duration.max(0.0);
        let clamp = |t: f64| t.clamp(0.0, total_duration);
        let start = clamp(params.start);
        let end = clamp(params.end.unwrap_or(params.start)).max(start);
        Self {
            id,
            start,
            end,
            drag: params.drag,
            resize: params.resize,
            resize_start: params.resize_start,
            resize_end: params.resize_end,
            min_length: params.min_length,
            max_length: params.max_length.unwrap_or(f64::INFINITY),
            channel: params.channel.map(Channel::Index).unwrap_or(Channel::All),
            color: params.color.unwrap_or_else(|| default_color.to_string()),
            content: params.content,
            total_duration,
        }
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_marker(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn start_percent(&self) -> f64 {
        to_percent(self.start, self.total_duration)
    }

    pub fn end_percent(&self) -> f64 {
        to_percent(self.end, self.total_duration)
    }

    /// Distance of the end edge from the right side of the timeline, as the
    /// surface positions regions with `left` / `right`.
    pub fn right_percent(&self) -> f64 {
        100.0 - self.end_percent()
    }

    pub(crate) fn set_span(&mut self, span: Span) {
        self.start = span.start;
        self.end = span.end;
    }

    pub(crate) fn set_total_duration(&mut self, total_duration: f64) {
        self.total_duration = total_duration.max(0.0);
        self.start = self.start.clamp(0.0, self.total_duration);
        self.end = self.end.clamp(self.start, self.total_duration);
    }

    /// Apply an option update. Returns true when the span changed.
    pub(crate) fn apply(&mut self, update: RegionUpdate) -> bool {
        if let Some(v) = update.drag { self.drag = v; }
        if let Some(v) = update.resize { self.resize = v; }
        if let Some(v) = update.resize_start { self.resize_start = v; }
        if let Some(v) = update.resize_end { self.resize_end = v; }
        if let Some(v) = update.min_length { self.min_length = v; }
        if let Some(v) = update.max_length { self.max_length = v; }
        if let Some(v) = update.color { self.color = v; }
        if update.content.is_some() {
            self.content = update.content;
        }

        let before = self.span();
        let start = update.start.unwrap_or(self.start).clamp(0.0, self.total_duration);
        let end = update.end.unwrap_or(self.end).clamp(0.0, self.total_duration);
        // An explicit start past the old end drags a marker along with it.
        let end = if update.end.is_none() && self.is_marker() { start } else { end.max(start) };
        self.set_span(Span::new(start, end));
        before != self.span()
    }
}

fn to_percent(t: f64, total: f64) -> f64 {
    if total > 0.0 {
        (t * 100.0 / total).clamp(0.0, 100.0)
    } else {
        0.0
    }
}
