use std::sync::atomic::{AtomicU8, Ordering};

use tracing::debug;

use crate::Error;

/// Lifecycle of a sharing engine.
///
/// `Unbound` moves to exactly one of two branches: `FanningOut` then
/// `FannedEnumerating`, or `Direct`. Once a branch is taken the other can never
/// be entered.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Unbound = 0,
    /// Cursors were handed out but none has pulled yet.
    FanningOut = 1,
    /// A fanned cursor has pulled; no further cursors can be handed out.
    FannedEnumerating = 2,
    /// The engine is being enumerated straight through, without a buffer.
    Direct = 3,
}

impl Mode {
    fn from_u8(raw: u8) -> Mode {
        match raw {
            0 => Mode::Unbound,
            1 => Mode::FanningOut,
            2 => Mode::FannedEnumerating,
            _ => Mode::Direct,
        }
    }
}

/// An atomically updated [`Mode`] with a single compare-and-commit transition.
#[derive(Debug)]
pub(crate) struct ModeCell(AtomicU8);

impl ModeCell {
    pub(crate) fn new(mode: Mode) -> Self {
        ModeCell(AtomicU8::new(mode as u8))
    }

    pub(crate) fn load(&self) -> Mode {
        Mode::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move from `from` to `to`.
    ///
    /// The first caller wins. A caller asking for the transition that already
    /// happened succeeds without effect; any other caller gets
    /// [`Error::IllegalMode`].
    pub(crate) fn commit(&self, from: Mode, to: Mode) -> Result<(), Error> {
        match self
            .0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                debug!(?from, ?to, "sharing mode committed");
                Ok(())
            }
            Err(raw) if raw == to as u8 => Ok(()),
            Err(raw) => Err(Error::IllegalMode {
                requested: to,
                current: Mode::from_u8(raw),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn test_repeated_commit_is_idempotent() {
        let cell = ModeCell::new(Mode::Unbound);
        cell.commit(Mode::Unbound, Mode::FanningOut).unwrap();
        cell.commit(Mode::Unbound, Mode::FanningOut).unwrap();
        assert_eq!(cell.load(), Mode::FanningOut);
    }

    #[test]
    fn test_branches_exclude_each_other() {
        let cell = ModeCell::new(Mode::Unbound);
        cell.commit(Mode::Unbound, Mode::Direct).unwrap();
        let err = cell.commit(Mode::Unbound, Mode::FanningOut).unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalMode {
                requested: Mode::FanningOut,
                current: Mode::Direct
            }
        ));
        assert_eq!(cell.load(), Mode::Direct);
    }

    #[test]
    fn test_one_thread_wins_a_contended_transition() {
        let cell = Arc::new(ModeCell::new(Mode::Unbound));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cell = cell.clone();
                let to = if i % 2 == 0 { Mode::Direct } else { Mode::FanningOut };
                thread::spawn(move || cell.commit(Mode::Unbound, to).is_ok())
            })
            .collect();
        let wins: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winner = cell.load();
        assert_ne!(winner, Mode::Unbound);
        // Every thread that asked for the winning mode succeeded, every other one failed.
        for (i, won) in wins.into_iter().enumerate() {
            let asked = if i % 2 == 0 { Mode::Direct } else { Mode::FanningOut };
            assert_eq!(won, asked == winner);
        }
    }
}
