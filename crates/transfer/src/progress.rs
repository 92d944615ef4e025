//! Per-file text progress bar.
//!
//! Output for one file is `[`, exactly `ticks` tick symbols spread over the
//! body, then `] ` and a newline. Ticks are printed as their share of the
//! body is sent; whatever is still due is printed by [`ProgressBar::finish`].

use std::io::{self, Write};

/// Symbol printed per tick.
pub const TICK_SYMBOL: u8 = b'=';

/// Progress of one file body.
#[derive(Debug)]
pub struct ProgressBar<W: Write> {
    out: W,
    ticks: u32,
    total: u64,
    printed: u32,
}

impl<W: Write> ProgressBar<W> {
    /// Starts a bar for a body of `total` bytes and prints the opening bracket.
    pub fn start(mut out: W, ticks: u32, total: u64) -> io::Result<Self> {
        out.write_all(b"[")?;
        out.flush()?;
        Ok(Self {
            out,
            ticks,
            total,
            printed: 0,
        })
    }

    /// Bytes represented by one tick.
    #[must_use]
    pub fn bytes_per_tick(&self) -> u64 {
        if self.ticks == 0 {
            0
        } else {
            self.total / u64::from(self.ticks)
        }
    }

    /// Records that `sent` bytes in total have been sent.
    pub fn update(&mut self, sent: u64) -> io::Result<()> {
        let due = self.due(sent);
        if due > self.printed {
            self.emit(due - self.printed)?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Prints the remaining ticks and closes the bar.
    pub fn finish(mut self) -> io::Result<W> {
        let remaining = self.ticks - self.printed;
        self.emit(remaining)?;
        self.out.write_all(b"] \n")?;
        self.out.flush()?;
        Ok(self.out)
    }

    /// Ticks printed so far.
    #[must_use]
    pub const fn printed(&self) -> u32 {
        self.printed
    }

    fn due(&self, sent: u64) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let share = u128::from(sent) * u128::from(self.ticks) / u128::from(self.total);
        u32::try_from(share).map_or(self.ticks, |share| share.min(self.ticks))
    }

    fn emit(&mut self, count: u32) -> io::Result<()> {
        for _ in 0..count {
            self.out.write_all(&[TICK_SYMBOL])?;
        }
        self.printed += count;
        Ok(())
    }
}
