//! The character-display capability.
//!
//! The controller only needs fire-and-forget text output; the bit-banged
//! protocol of a real panel lives behind this trait and is out of scope
//! here.

use log::info;
use seclock_gpio::GpioResult;

pub trait Display {
    fn print(&mut self, text: &str) -> GpioResult<()>;
    fn new_line(&mut self) -> GpioResult<()>;
}

/// A display that writes through the log instead of a panel.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    line: String,
}

impl Display for ConsoleDisplay {
    fn print(&mut self, text: &str) -> GpioResult<()> {
        self.line.push_str(text);
        Ok(())
    }

    fn new_line(&mut self) -> GpioResult<()> {
        info!("[display] {}", self.line);
        self.line.clear();
        Ok(())
    }
}

/// Prints the startup banner the lock shows while waiting for input.
pub fn show_banner(display: &mut dyn Display) -> GpioResult<()> {
    display.print("Security system")?;
    display.new_line()?;
    display.print("Enter password")?;
    display.new_line()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingDisplay {
        lines: Vec<String>,
        current: String,
    }

    impl Display for RecordingDisplay {
        fn print(&mut self, text: &str) -> GpioResult<()> {
            self.current.push_str(text);
            Ok(())
        }

        fn new_line(&mut self) -> GpioResult<()> {
            self.lines.push(std::mem::take(&mut self.current));
            Ok(())
        }
    }

    #[test]
    fn banner_prints_both_lines() {
        let mut display = RecordingDisplay::default();
        show_banner(&mut display).unwrap();
        assert_eq!(display.lines, vec!["Security system", "Enter password"]);
    }
}
