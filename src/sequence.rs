//! Request sequencing for latest-wins view updates.

/// Identifies one issued request.
///
/// Tickets are only comparable with the [`RequestSequence`] that issued
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    /// Returns the sequence number of this ticket.
    #[inline]
    #[must_use]
    pub const fn number(self) -> u64 {
        self.0
    }
}

/// Monotonically increasing request counter owned by one view.
///
/// Only the most recently issued ticket may update view state; responses
/// carrying older tickets are dropped.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    /// Number of the last issued ticket (`0` = none issued yet).
    issued: u64,
}

impl RequestSequence {
    /// Creates a sequence that has not issued any ticket.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { issued: 0 }
    }

    /// Issues the next ticket, superseding every earlier one.
    #[inline]
    pub const fn issue(&mut self) -> RequestTicket {
        self.issued = self.issued.saturating_add(1);
        RequestTicket(self.issued)
    }

    /// Returns `true` if `ticket` is the most recently issued one.
    #[inline]
    #[must_use]
    pub const fn is_latest(&self, ticket: RequestTicket) -> bool {
        self.issued != 0 && ticket.0 == self.issued
    }
}
