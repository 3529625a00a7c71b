//! Built-in animations.
//!
//! None of them touch a display directly: every frame is handed to a callback
//! that applies it to whatever the host renders into.

use crate::easing::slow_in_slow_out;
use crate::scheduler::{Animation, Timing};
use serde::Serialize;

fn lerp(from: f64, to: f64, f: f64) -> f64 {
    from + (to - from) * f
}

/// Panel height while opening or closing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderFrame {
    /// `None` once fully open: the panel goes back to its natural height
    pub height: Option<f64>,
    pub opacity: f64,
    pub visible: bool,
}

pub struct Slider {
    opening: bool,
    full_height: f64,
    step: f64,
    on_frame: Box<dyn FnMut(SliderFrame)>,
}

impl Slider {
    pub fn new(
        opening: bool,
        full_height: f64,
        timing: Timing,
        on_frame: Box<dyn FnMut(SliderFrame)>,
    ) -> Self {
        Self {
            opening,
            full_height,
            step: timing.step(),
            on_frame,
        }
    }
}

impl Animation for Slider {
    fn step(&self) -> f64 {
        self.step
    }

    fn tick(&mut self, progress: f64) {
        let f = slow_in_slow_out(progress);
        let shown = if self.opening { f } else { 1.0 - f };
        (self.on_frame)(SliderFrame {
            height: Some(shown * self.full_height),
            opacity: shown,
            visible: true,
        });
    }

    fn stop(&mut self) {
        let frame = if self.opening {
            SliderFrame {
                height: None,
                opacity: 1.0,
                visible: true,
            }
        } else {
            SliderFrame {
                height: Some(0.0),
                opacity: 0.0,
                visible: false,
            }
        };
        (self.on_frame)(frame);
    }

    fn name(&self) -> &str {
        "slider"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn lerp(&self, to: &Rect, f: f64) -> Rect {
        Rect {
            left: lerp(self.left, to.left, f),
            top: lerp(self.top, to.top, f),
            width: lerp(self.width, to.width, f),
            height: lerp(self.height, to.height, f),
        }
    }
}

/// Ghost rectangle growing from a link to the opened tiddler
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomFrame {
    pub rect: Rect,
    pub opacity: f64,
    pub visible: bool,
}

pub struct Zoomer {
    from: Rect,
    to: Rect,
    step: f64,
    on_frame: Box<dyn FnMut(ZoomFrame)>,
}

impl Zoomer {
    pub fn new(from: Rect, to: Rect, timing: Timing, on_frame: Box<dyn FnMut(ZoomFrame)>) -> Self {
        Self {
            from,
            to,
            step: timing.step(),
            on_frame,
        }
    }
}

impl Animation for Zoomer {
    fn step(&self) -> f64 {
        self.step
    }

    fn tick(&mut self, progress: f64) {
        let f = slow_in_slow_out(progress);
        (self.on_frame)(ZoomFrame {
            rect: self.from.lerp(&self.to, f),
            opacity: 1.0 - f,
            visible: true,
        });
    }

    fn stop(&mut self) {
        (self.on_frame)(ZoomFrame {
            rect: self.to,
            opacity: 0.0,
            visible: false,
        });
    }

    fn name(&self) -> &str {
        "zoomer"
    }
}

/// Scrolls the viewport from one offset to another
pub struct Scroller {
    from: f64,
    to: f64,
    step: f64,
    on_frame: Box<dyn FnMut(f64)>,
}

impl Scroller {
    pub fn new(from: f64, to: f64, timing: Timing, on_frame: Box<dyn FnMut(f64)>) -> Self {
        Self {
            from,
            to,
            step: timing.step(),
            on_frame,
        }
    }
}

impl Animation for Scroller {
    fn step(&self) -> f64 {
        self.step
    }

    fn tick(&mut self, progress: f64) {
        (self.on_frame)(lerp(self.from, self.to, slow_in_slow_out(progress)));
    }

    fn stop(&mut self) {
        (self.on_frame)(self.to);
    }

    fn name(&self) -> &str {
        "scroller"
    }
}
