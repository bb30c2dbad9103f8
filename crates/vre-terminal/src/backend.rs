//! Raw-mode + alternate-screen lifecycle, as an RAII guard so a panic mid
//! render still restores the caller's shell.

use anyhow::Result;
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use std::io::stderr;

/// Enters raw mode and the alternate screen buffer on stderr, hides the
/// cursor, and restores all three on drop. `crossterm` resolves the
/// controlling TTY itself (falling back from stdin to `/dev/tty`), so this
/// works whether or not stdin is the piped corpus.
pub struct TerminalGuard {
    entered: bool,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stderr(), EnterAlternateScreen, Hide)?;
        Ok(Self { entered: true })
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stderr(), Show, LeaveAlternateScreen)?;
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
