// SPDX-License-Identifier: BSD-2-Clause

//! The sticky exception-flag register.

use bitflags::bitflags;

bitflags! {
    /// IEEE 754 exception flags.
    ///
    /// Flags are sticky: once raised they stay raised until the owning
    /// [`Session`] is explicitly cleared.
    pub struct ExceptionFlags: u32 {
        const INVALID_OPERATION = 0b00001;
        const DIVISION_BY_ZERO = 0b00010;
        const OVERFLOW = 0b00100;
        const UNDERFLOW = 0b01000;
        const INEXACT = 0b10000;
    }
}

impl Default for ExceptionFlags {
    fn default() -> Self {
        ExceptionFlags::empty()
    }
}

/// Owns the exception flags for one logical sequence of operations.
///
/// A `Session` is passed by mutable reference into every
/// [`ArithmeticEngine`](crate::ArithmeticEngine) call that should accumulate
/// flags. It is never global: independent simulations each own their own
/// `Session`, so flag updates from concurrent computations cannot interleave.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Session {
    flags: ExceptionFlags,
}

impl Session {
    /// A fresh session with all flags clear.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> ExceptionFlags {
        self.flags
    }

    /// Sticky OR; never clears anything.
    pub fn raise(&mut self, flags: ExceptionFlags) {
        self.flags |= flags;
    }

    pub fn is_raised(&self, flags: ExceptionFlags) -> bool {
        self.flags.contains(flags)
    }

    /// Reset every flag, e.g. between independent test cases.
    pub fn clear(&mut self) {
        self.flags = ExceptionFlags::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_sticky() {
        let mut session = Session::new();
        assert_eq!(session.flags(), ExceptionFlags::empty());
        session.raise(ExceptionFlags::INEXACT);
        session.raise(ExceptionFlags::OVERFLOW | ExceptionFlags::INEXACT);
        assert!(session.is_raised(ExceptionFlags::INEXACT));
        assert!(session.is_raised(ExceptionFlags::OVERFLOW));
        assert!(!session.is_raised(ExceptionFlags::UNDERFLOW));
        session.raise(ExceptionFlags::empty());
        assert_eq!(
            session.flags(),
            ExceptionFlags::OVERFLOW | ExceptionFlags::INEXACT
        );
    }

    #[test]
    fn clear_resets_everything() {
        let mut session = Session::new();
        session.raise(ExceptionFlags::all());
        session.clear();
        assert_eq!(session.flags(), ExceptionFlags::empty());
    }
}
