//! Text dumps of the counter bank
//!
//! Both reports implement [`core::fmt::Display`], so they can be written to
//! a `heapless::String`, a UART via `core::fmt::Write`, or `stderr` on a host.

use core::fmt;

use super::bank::{CounterBank, CounterKind};

/// Single-line dump: every value, tab separated, in [`CounterKind::ALL`] order
pub struct TerseReport<'a>(&'a CounterBank);

/// One `label:\tvalue` line per counter
pub struct DetailedReport<'a>(&'a CounterBank);

impl CounterBank {
    pub fn terse(&self) -> TerseReport<'_> {
        TerseReport(self)
    }

    pub fn detailed(&self) -> DetailedReport<'_> {
        DetailedReport(self)
    }
}

impl fmt::Display for TerseReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (_, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\t")?;
            }
            write!(f, "{:4}", value)?;
        }
        Ok(())
    }
}

impl fmt::Display for DetailedReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (kind, value) in self.0.iter() {
            writeln!(f, "{}:\t{:4}", kind.description(), value)?;
        }
        Ok(())
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use heapless::String;

    #[test]
    fn test_terse_dump() {
        let mut bank = CounterBank::new();
        bank.increment(CounterKind::Bytes);
        bank.increment(CounterKind::Frames);
        bank.increment(CounterKind::Frames);

        let mut out: String<128> = String::new();
        write!(out, "{}", bank.terse()).unwrap();
        assert_eq!(
            out.as_str(),
            "   1\t   2\t   0\t   0\t   0\t   0\t   0\t   0\t   0\t   0"
        );
    }

    #[test]
    fn test_detailed_dump() {
        let mut bank = CounterBank::new();
        bank.increment(CounterKind::ChecksumErrors);

        let mut out: String<512> = String::new();
        write!(out, "{}", bank.detailed()).unwrap();

        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Total bytes:\t   0"));
        assert_eq!(lines.nth(4), Some("Cksum errors:\t   1"));
        assert_eq!(out.lines().count(), CounterKind::COUNT);
    }

    #[test]
    fn test_kind_display() {
        let mut out: String<32> = String::new();
        write!(out, "{}", CounterKind::WriteOverrun).unwrap();
        assert_eq!(out.as_str(), "Write overrun");
    }
}
