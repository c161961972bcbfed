//! Call-site capture for error values.
//!
//! Two pieces are recorded per error:
//!
//! - **current**: the source location that asked for the error, followed
//!   by up to `depth - 1` of its callers. The location comes from
//!   `#[track_caller]`: every crate function between the caller and
//!   [`capture`] carries the attribute, so the compiler does the skipping.
//!   The callers come from a `std::backtrace::Backtrace`, with the frames
//!   that belong to this crate and to the backtrace machinery dropped from
//!   the top.
//! - **context**: in [`CaptureMode::Full`], every frame below the crate's
//!   own, for the full report.
//!
//! Anything the platform cannot provide comes back empty.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::Location;

/// Frames kept in `current` unless configured otherwise, counting the
/// immediate caller.
pub const DEFAULT_DEPTH: usize = 5;

/// Symbols of frames that sit between the user's call and the capture.
/// Only a run of these at the top of the trace is dropped.
const CAPTURE_FRAMES: &[&str] = &[
    "std::backtrace",
    "backtrace_rs::",
    "errtpl::stack::capture",
    "errtpl::handle::TemplateHandle::",
    "errtpl::convert::ResultExt",
];

/// How much call-site information to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// Record nothing.
    Off,
    /// Record the calling location and its nearest callers.
    #[default]
    Caller,
    /// Also record every caller frame as the deep trace.
    Full,
}

impl std::str::FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "0" => Ok(CaptureMode::Off),
            "caller" | "1" => Ok(CaptureMode::Caller),
            "full" | "2" => Ok(CaptureMode::Full),
            other => Err(format!("unknown capture mode `{}`", other)),
        }
    }
}

/// Captured call-site information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackCapture {
    /// Immediate caller as `at file:line:column`, then numbered caller
    /// frames.
    pub current: String,
    /// Deep trace, possibly empty.
    pub context: String,
}

/// Capture the caller of the outermost `#[track_caller]` frame.
///
/// `depth` is the number of frames kept in `current`, the calling
/// location included. Never fails.
#[track_caller]
pub fn capture(mode: CaptureMode, depth: usize) -> StackCapture {
    if mode == CaptureMode::Off || depth == 0 {
        return StackCapture::default();
    }
    let location = Location::caller();
    let mut current = format!("at {}:{}:{}", location.file(), location.line(), location.column());

    if depth == 1 && mode == CaptureMode::Caller {
        return StackCapture { current, context: String::new() };
    }

    let frames = caller_frames(&Backtrace::force_capture());
    // frames[0] is the location above; the callers start after it.
    for frame in frames.iter().skip(1).take(depth - 1) {
        current.push('\n');
        current.push_str(&frame.render());
    }
    let context = match mode {
        CaptureMode::Full => frames.iter().map(Frame::render).collect::<Vec<_>>().join("\n"),
        _ => String::new(),
    };
    StackCapture { current, context }
}

/// One frame of a rendered `std` backtrace: the symbol line and the
/// `at` lines under it, renumbered from zero.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    index: usize,
    symbol: String,
    locations: Vec<String>,
}

impl Frame {
    fn render(&self) -> String {
        let mut out = format!("{:>4}: {}", self.index, self.symbol);
        for location in &self.locations {
            out.push_str("\n             ");
            out.push_str(location);
        }
        out
    }

    fn is_capture_frame(&self) -> bool {
        CAPTURE_FRAMES.iter().any(|s| self.symbol.contains(s))
    }
}

/// Frames below the crate's own, or nothing if no backtrace was captured.
fn caller_frames(trace: &Backtrace) -> Vec<Frame> {
    if trace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    let mut frames: Vec<Frame> = split_frames(&trace.to_string())
        .into_iter()
        .skip_while(Frame::is_capture_frame)
        .collect();
    for (index, frame) in frames.iter_mut().enumerate() {
        frame.index = index;
    }
    frames
}

fn split_frames(text: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(symbol) = frame_header(line) {
            frames.push(Frame { index: frames.len(), symbol: symbol.to_string(), locations: Vec::new() });
        } else if let Some(frame) = frames.last_mut() {
            if !line.is_empty() {
                frame.locations.push(line.to_string());
            }
        }
    }
    frames
}

/// `"12: path::to::fn"` → `"path::to::fn"`.
fn frame_header(line: &str) -> Option<&str> {
    let (index, symbol) = line.split_once(": ")?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(symbol.trim())
}
