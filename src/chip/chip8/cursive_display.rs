use crate::chip::chip8::Frame;

use cursive::{
    event::{Event, EventResult},
    theme::{BaseColor, Color, ColorStyle},
    view::View,
    Printer, Vec2,
};

/// Renders a [`Frame`] in a terminal, one character cell per pixel.
#[derive(Default)]
pub struct FrameView {
    frame: Frame,
}

impl FrameView {
    pub fn new(frame: Frame) -> Self {
        FrameView { frame }
    }

    /// Replaces the shown frame. Takes effect on the next redraw.
    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

/// Implements cursive::view::View for FrameView to enable drawing it
/// as a View out of the box.
impl View for FrameView {
    fn draw(&self, printer: &Printer) {
        printer.with_color(
            ColorStyle::new(Color::Dark(BaseColor::Black), Color::Light(BaseColor::White)),
            |printer| {
                for y in 0..Frame::HEIGHT {
                    for x in 0..Frame::WIDTH {
                        if self.frame.is_lit(x, y) {
                            printer.print((x, y), " ");
                        }
                    }
                }
            },
        );
    }

    fn on_event(&mut self, _event: Event) -> EventResult {
        EventResult::Ignored
    }

    fn required_size(&mut self, _: Vec2) -> Vec2 {
        Vec2::new(Frame::WIDTH, Frame::HEIGHT)
    }
}
