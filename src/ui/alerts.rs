use crate::monitor::detector::{Crossing, Direction, DisplayEntry, Role};
use crate::ui::format::format_entry;
use chrono::Local;
use crossterm::style::{style, Color, Stylize};
use log::{debug, info};
use std::io::{self, Write};
use std::sync::Mutex;

/// Presentation side of a monitoring tick.
pub trait AlertSink: Send + Sync {
    /// Shows the ordered display list of a tick.
    fn render(&self, display: &[DisplayEntry], direction: Direction);

    /// Signals one crossed level.
    fn alert(&self, crossing: &Crossing);
}

/// Audible signal parameters for a crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertTone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

impl AlertTone {
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self {
                frequency_hz: 800,
                duration_ms: 700,
            },
            Direction::Down | Direction::Flat => Self {
                frequency_hz: 400,
                duration_ms: 700,
            },
        }
    }
}

const BELL: &str = "\x07";

/// Prints ticks to a terminal and rings its bell on alerts.
pub struct ConsoleAlertSink {
    out: Mutex<Box<dyn Write + Send>>,
    stop_hint: String,
}

impl ConsoleAlertSink {
    pub fn stdout(stop_hint: impl Into<String>) -> Self {
        Self::new(Box::new(io::stdout()), stop_hint)
    }

    pub fn new(out: Box<dyn Write + Send>, stop_hint: impl Into<String>) -> Self {
        Self {
            out: Mutex::new(out),
            stop_hint: stop_hint.into(),
        }
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|p| p.into_inner());
        // a closed terminal is not worth stopping the monitor for
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            debug!("Console write failed: {}", e);
        }
    }
}

fn entry_color(entry: &DisplayEntry, direction: Direction) -> Option<Color> {
    match (entry.role, direction) {
        (Role::Level, _) => None,
        (Role::PreviousPrice, _) => Some(Color::Blue),
        (Role::CurrentPrice, Direction::Up) => Some(Color::Green),
        (Role::CurrentPrice, Direction::Down) => Some(Color::Red),
        (Role::CurrentPrice, Direction::Flat) => Some(Color::Blue),
    }
}

impl AlertSink for ConsoleAlertSink {
    fn render(&self, display: &[DisplayEntry], direction: Direction) {
        let header = format!(
            "Price Check at {}   ({})",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            self.stop_hint
        );
        let mut text = format!("\n{}\n{}\n", header, "=".repeat(header.len()));
        for entry in display {
            let line = format_entry(entry);
            match entry_color(entry, direction) {
                Some(color) => text.push_str(&style(line).with(color).to_string()),
                None => text.push_str(&line),
            }
            text.push('\n');
        }
        self.write(&text);
    }

    fn alert(&self, crossing: &Crossing) {
        let tone = AlertTone::for_direction(crossing.direction);
        info!(
            "Level {} crossed ({:?}), tone {} Hz / {} ms",
            crossing.level, crossing.direction, tone.frequency_hz, tone.duration_ms
        );
        let line = format!("Alarm: {:.2}", crossing.level);
        self.write(&format!("{}{}\n", style(line).with(Color::Green), BELL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn entry(role: Role, value: f64) -> DisplayEntry {
        DisplayEntry {
            role,
            value,
            crossed: false,
        }
    }

    #[test]
    fn test_tone_depends_on_direction() {
        assert_eq!(AlertTone::for_direction(Direction::Up).frequency_hz, 800);
        assert_eq!(AlertTone::for_direction(Direction::Down).frequency_hz, 400);
        assert_eq!(AlertTone::for_direction(Direction::Flat).frequency_hz, 400);
    }

    #[test]
    fn test_render_prints_entries_in_given_order() {
        let capture = Capture::default();
        let sink = ConsoleAlertSink::new(Box::new(capture.clone()), "Press Enter to stop");
        sink.render(
            &[
                entry(Role::Level, 100.0),
                entry(Role::PreviousPrice, 105.0),
                entry(Role::CurrentPrice, 115.0),
            ],
            Direction::Up,
        );

        let text = capture.text();
        assert!(text.contains("Press Enter to stop"));
        let level = text.find("Price Level:").unwrap();
        let previous = text.find("Previous Price:").unwrap();
        let current = text.find("Current Price:").unwrap();
        assert!(level < previous && previous < current);
    }

    #[test]
    fn test_alert_rings_bell() {
        let capture = Capture::default();
        let sink = ConsoleAlertSink::new(Box::new(capture.clone()), "");
        sink.alert(&Crossing {
            level: 110.0,
            direction: Direction::Up,
        });

        let text = capture.text();
        assert!(text.contains("Alarm: 110.00"));
        assert!(text.contains(BELL));
    }
}
