//! Transfer application
//!
//! A transfer records that one member actually paid another out of band.
//! Applying it moves both balances toward zero: the payer's debt shrinks
//! (credit), the payee's outstanding credit shrinks (debit). Reversal is the
//! same effect with the endpoints swapped; there is no separate undo path.
//! Updating a recorded transfer composes as reverse(old) then apply(new),
//! deleting as reverse(old) alone; either composition leaves the zero-sum
//! invariant intact.

use crate::error::{Error, Result};
use crate::ledger::BalanceLedger;
use crate::types::{GroupId, MemberId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The ledger-level effect of one transfer: `from` paid `amount` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEffect {
    /// Group both members belong to
    pub group_id: GroupId,

    /// Member who paid
    pub from: MemberId,

    /// Member who received payment
    pub to: MemberId,

    /// Amount transferred; never negative
    pub amount: Decimal,
}

impl TransferEffect {
    /// Build a transfer effect. A negative amount would silently invert the
    /// transfer's meaning and is rejected here; zero is tolerated as a no-op
    /// so the ledger path never panics on degenerate input.
    pub fn new(
        group_id: GroupId,
        from: MemberId,
        to: MemberId,
        amount: Decimal,
    ) -> Result<Self> {
        if amount < Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        Ok(Self {
            group_id,
            from,
            to,
            amount,
        })
    }

    /// The inverse effect: endpoints swapped, same amount. Applying an effect
    /// and then its reversal restores every balance exactly.
    pub fn reversed(&self) -> Self {
        Self {
            group_id: self.group_id,
            from: self.to,
            to: self.from,
            amount: self.amount,
        }
    }
}

/// Apply a transfer effect to the ledger: credit `from`, debit `to`.
pub fn apply_transfer(ledger: &BalanceLedger, effect: &TransferEffect) {
    ledger.credit(effect.group_id, effect.from, effect.amount);
    ledger.debit(effect.group_id, effect.to, effect.amount);

    tracing::debug!(
        group_id = %effect.group_id,
        from = %effect.from,
        to = %effect.to,
        amount = %effect.amount,
        "transfer applied to ledger"
    );
}
