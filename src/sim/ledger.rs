//! Structure health, kill currency and projectile stock

use serde::{Deserialize, Serialize};

use crate::tuning::{AmmoPrices, EconomyTuning};

/// Projectile stock types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AmmoKind {
    #[default]
    Normal,
    Explosive,
    TripleShot,
}

impl AmmoKind {
    pub const ALL: [AmmoKind; 3] = [AmmoKind::Normal, AmmoKind::Explosive, AmmoKind::TripleShot];

    pub fn as_str(&self) -> &'static str {
        match self {
            AmmoKind::Normal => "normal",
            AmmoKind::Explosive => "explosive",
            AmmoKind::TripleShot => "triple_shot",
        }
    }
}

/// Per-type projectile counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileStock {
    pub normal: u32,
    pub explosive: u32,
    pub triple_shot: u32,
}

impl ProjectileStock {
    pub fn get(&self, kind: AmmoKind) -> u32 {
        match kind {
            AmmoKind::Normal => self.normal,
            AmmoKind::Explosive => self.explosive,
            AmmoKind::TripleShot => self.triple_shot,
        }
    }

    fn slot(&mut self, kind: AmmoKind) -> &mut u32 {
        match kind {
            AmmoKind::Normal => &mut self.normal,
            AmmoKind::Explosive => &mut self.explosive,
            AmmoKind::TripleShot => &mut self.triple_shot,
        }
    }
}

/// Structure state after a debit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureStatus {
    Standing,
    /// Structure health hit zero: the defense failed
    Breached,
}

/// Result of a purchase attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    Completed { kind: AmmoKind, cost: u32 },
    Declined { kind: AmmoKind, cost: u32, balance: u32 },
}

/// Point-in-time copy of the ledger for the UI boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub structure_health: u32,
    pub structure_max: u32,
    pub kill_currency: u32,
    pub stock: ProjectileStock,
}

/// The defended structure and the player's purse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLedger {
    structure_health: u32,
    structure_max: u32,
    kill_currency: u32,
    stock: ProjectileStock,
}

impl ResourceLedger {
    pub fn new(structure_max: u32, kill_currency: u32, stock: ProjectileStock) -> Self {
        Self {
            structure_health: structure_max,
            structure_max,
            kill_currency,
            stock,
        }
    }

    pub fn from_tuning(economy: &EconomyTuning) -> Self {
        Self::new(
            economy.structure_max,
            economy.starting_currency,
            economy.starting_stock,
        )
    }

    pub fn structure_health(&self) -> u32 {
        self.structure_health
    }

    pub fn structure_max(&self) -> u32 {
        self.structure_max
    }

    pub fn kill_currency(&self) -> u32 {
        self.kill_currency
    }

    pub fn stock(&self) -> &ProjectileStock {
        &self.stock
    }

    pub fn is_breached(&self) -> bool {
        self.structure_health == 0
    }

    /// Apply one enemy attack cycle
    pub fn debit_structure(&mut self, amount: u32) -> StructureStatus {
        self.structure_health = self
            .structure_health
            .saturating_sub(amount)
            .min(self.structure_max);
        if self.structure_health == 0 {
            StructureStatus::Breached
        } else {
            StructureStatus::Standing
        }
    }

    /// Reward for a slain enemy
    pub fn credit_kill(&mut self, amount: u32) {
        self.kill_currency = self.kill_currency.saturating_add(amount);
    }

    /// Buy one unit of stock if the balance covers it
    pub fn purchase(&mut self, kind: AmmoKind, prices: &AmmoPrices) -> Purchase {
        let cost = prices.price(kind);
        if self.kill_currency < cost {
            return Purchase::Declined {
                kind,
                cost,
                balance: self.kill_currency,
            };
        }
        self.kill_currency -= cost;
        let slot = self.stock.slot(kind);
        *slot = slot.saturating_add(1);
        Purchase::Completed { kind, cost }
    }

    /// Scheduled refill; only normal stock regenerates, and never past `cap`
    pub fn regenerate(&mut self, kind: AmmoKind, cap: u32) -> bool {
        if kind != AmmoKind::Normal || self.stock.normal >= cap {
            return false;
        }
        self.stock.normal += 1;
        true
    }

    /// Consume one unit for a fire action. Returns false on empty stock.
    pub fn take_shot(&mut self, kind: AmmoKind) -> bool {
        let slot = self.stock.slot(kind);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            structure_health: self.structure_health,
            structure_max: self.structure_max,
            kill_currency: self.kill_currency,
            stock: self.stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ledger(currency: u32) -> ResourceLedger {
        ResourceLedger::new(100, currency, ProjectileStock::default())
    }

    #[test]
    fn test_debit_clamps_and_breaches() {
        let mut l = ledger(0);
        assert_eq!(l.debit_structure(30), StructureStatus::Standing);
        assert_eq!(l.structure_health(), 70);
        assert_eq!(l.debit_structure(500), StructureStatus::Breached);
        assert_eq!(l.structure_health(), 0);
        assert!(l.is_breached());
    }

    #[test]
    fn test_purchase_declined_leaves_state_untouched() {
        let mut l = ledger(5);
        let prices = AmmoPrices {
            normal: 1,
            explosive: 6,
            triple_shot: 4,
        };
        let before = l.snapshot();
        let result = l.purchase(AmmoKind::Explosive, &prices);
        assert_eq!(
            result,
            Purchase::Declined {
                kind: AmmoKind::Explosive,
                cost: 6,
                balance: 5
            }
        );
        assert_eq!(l.snapshot(), before);
    }

    #[test]
    fn test_purchase_completed_debits_and_stocks() {
        let mut l = ledger(10);
        let result = l.purchase(AmmoKind::TripleShot, &AmmoPrices::default());
        assert_eq!(
            result,
            Purchase::Completed {
                kind: AmmoKind::TripleShot,
                cost: 4
            }
        );
        assert_eq!(l.kill_currency(), 6);
        assert_eq!(l.stock().triple_shot, 1);
    }

    #[test]
    fn test_regenerate_normal_only_up_to_cap() {
        let mut l = ResourceLedger::new(
            100,
            0,
            ProjectileStock {
                normal: 2,
                explosive: 0,
                triple_shot: 0,
            },
        );
        assert!(!l.regenerate(AmmoKind::Explosive, 10));
        assert_eq!(l.stock().explosive, 0);
        assert!(l.regenerate(AmmoKind::Normal, 3));
        assert!(!l.regenerate(AmmoKind::Normal, 3));
        assert_eq!(l.stock().normal, 3);
    }

    #[test]
    fn test_take_shot_rejects_empty() {
        let mut l = ledger(0);
        assert!(!l.take_shot(AmmoKind::Normal));
        l.credit_kill(1);
        l.purchase(AmmoKind::Normal, &AmmoPrices::default());
        assert!(l.take_shot(AmmoKind::Normal));
        assert_eq!(l.stock().normal, 0);
    }

    proptest! {
        #[test]
        fn prop_structure_stays_bounded(debits in proptest::collection::vec(0u32..40, 0..20)) {
            let mut l = ledger(0);
            for d in debits {
                l.debit_structure(d);
                prop_assert!(l.structure_health() <= l.structure_max());
            }
        }

        #[test]
        fn prop_currency_never_underflows(
            credits in proptest::collection::vec(0u32..10, 0..10),
            buys in proptest::collection::vec(0usize..3, 0..20),
        ) {
            let mut l = ledger(0);
            for c in credits {
                l.credit_kill(c);
            }
            let prices = AmmoPrices::default();
            for b in buys {
                let before = l.kill_currency();
                match l.purchase(AmmoKind::ALL[b], &prices) {
                    Purchase::Completed { cost, .. } => prop_assert_eq!(l.kill_currency(), before - cost),
                    Purchase::Declined { .. } => prop_assert_eq!(l.kill_currency(), before),
                }
            }
        }
    }
}
