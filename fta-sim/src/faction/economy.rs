//! Faction economy: income, staff, power, production and the item market.
use log::{debug, info, warn};

use super::Faction;
use super::research::reallocate;
use crate::constants::ENGINEER_WORK_PER_WINDOW;
use crate::events::FactionEvent;
use crate::rules::{EconomyConfig, FactionRule, ProductionRule, RuleSet, StaffRole};

impl Faction {
    /// Credit monthly income plus treaty funds.
    pub fn collect_income(&mut self, rule: &FactionRule) -> Vec<FactionEvent> {
        let (treaty_funds, _) = self.treaty_bonus(rule);
        let amount = rule
            .monthly_income
            .saturating_add(treaty_funds)
            .max(-self.funds);
        if amount == 0 {
            return Vec::new();
        }
        self.funds += amount;
        debug!("{} collected {} income", self.id, amount);
        vec![FactionEvent::IncomeCollected { amount }]
    }

    /// Pay salaries, dismissing staff that cannot be paid, then hire toward
    /// the rule's targets without dipping into the reserve.
    pub fn manage_staff(
        &mut self,
        economy: &EconomyConfig,
        rule: &FactionRule,
    ) -> Vec<FactionEvent> {
        let mut events = Vec::new();

        let mut dismissed = [0_u32; 3];
        while self.funds < economy.salaries.bill(&self.staff) && self.staff.total() > 0 {
            let Some((slot, role)) = StaffRole::DISMISSAL_ORDER
                .iter()
                .enumerate()
                .find(|(_, role)| self.staff.get(**role) > 0)
            else {
                break;
            };
            *self.staff.get_mut(*role) -= 1;
            dismissed[slot] += 1;
        }
        for (role, count) in StaffRole::DISMISSAL_ORDER.iter().zip(dismissed) {
            if count > 0 {
                warn!(
                    "{} dismissed {} {}(s) it could not pay",
                    self.id,
                    count,
                    role.key()
                );
                events.push(FactionEvent::StaffDismissed { role: *role, count });
            }
        }

        let bill = economy.salaries.bill(&self.staff);
        if bill > 0 {
            self.funds -= bill;
            events.push(FactionEvent::SalariesPaid { amount: bill });
        }

        for role in StaffRole::ALL {
            let price = economy.hire_costs.get(role);
            let target = rule.staff_targets.get(role);
            let mut count = 0_u32;
            while self.staff.get(role) < target && self.funds - price >= rule.funds_reserve {
                self.funds -= price;
                *self.staff.get_mut(role) += 1;
                count += 1;
            }
            if count > 0 {
                debug!("{} hired {} {}(s)", self.id, count, role.key());
                events.push(FactionEvent::StaffHired {
                    role,
                    count,
                    cost: price.saturating_mul(i64::from(count)),
                });
            }
        }

        reallocate(
            &mut self.research,
            self.staff.scientists,
            economy.scientist_efficiency_pct.max(1),
        );
        events
    }

    /// Monthly power cycle: decay, growth, conversion of surplus funds.
    pub fn manage_power(&mut self, rule: &FactionRule) -> Vec<FactionEvent> {
        let before = self.power;
        let funds_before = self.funds;
        let cap = rule.power_cap.max(0);
        let (_, treaty_power) = self.treaty_bonus(rule);

        let mut power = i64::from(self.power);
        power -= power * i64::from(rule.power_decay_pct.min(100)) / 100;
        power += i64::from(rule.power_growth) + i64::from(treaty_power);

        let reserve = rule.power_conversion_reserve.max(0);
        if rule.funds_per_power > 0 && self.funds > reserve {
            let headroom = (i64::from(cap) - power).max(0);
            let bought = ((self.funds - reserve) / rule.funds_per_power).min(headroom);
            if bought > 0 {
                self.funds -= bought * rule.funds_per_power;
                power += bought;
            }
        }
        // Clamped into 0..=cap, so the narrowing cannot fail.
        self.power = i32::try_from(power.clamp(0, i64::from(cap))).unwrap_or(cap);
        self.vigilance = (self.vigilance - rule.vigilance_decay.max(0)).max(0);

        let funds_spent = funds_before - self.funds;
        if self.power == before && funds_spent == 0 {
            return Vec::new();
        }
        debug!(
            "{} power {} -> {} ({} funds converted)",
            self.id, before, self.power, funds_spent
        );
        vec![FactionEvent::PowerChanged {
            before,
            after: self.power,
            funds_spent,
        }]
    }

    /// Engineers split their window of work evenly across buildable lines.
    pub fn handle_production(&mut self, rule: &FactionRule) -> Vec<FactionEvent> {
        let lines: Vec<&ProductionRule> = rule
            .production
            .iter()
            .filter(|line| self.has_discovered_all(&line.requires))
            .collect();
        let Ok(line_count) = u32::try_from(lines.len()) else {
            return Vec::new();
        };
        if line_count == 0 || self.staff.engineers == 0 {
            return Vec::new();
        }

        let capacity = self.staff.engineers.saturating_mul(ENGINEER_WORK_PER_WINDOW);
        let base = capacity / line_count;
        let extra = capacity % line_count;
        let mut events = Vec::new();
        for (index, line) in (0_u32..).zip(lines) {
            let share = base + u32::from(index < extra);
            let quantity = share / line.work_per_unit.max(1);
            if quantity == 0 {
                continue;
            }
            self.stock.add(&line.item, quantity);
            events.push(FactionEvent::ItemsManufactured {
                item: line.item.clone(),
                quantity,
            });
        }
        events
    }

    /// Buy toward restock targets with funds above the reserve.
    pub fn handle_restock(&mut self, rules: &RuleSet, rule: &FactionRule) -> Vec<FactionEvent> {
        let mut events = Vec::new();
        for (item_id, target) in &rule.restock {
            let Some(item) = rules.item(item_id) else {
                continue;
            };
            if !self.has_discovered_all(&item.requires) {
                continue;
            }
            let deficit = target.saturating_sub(self.stock.get(item_id));
            if deficit == 0 {
                continue;
            }
            let quantity = if item.buy_price == 0 {
                deficit
            } else {
                let spendable = self.funds - rule.funds_reserve;
                if spendable <= 0 {
                    0
                } else {
                    let affordable = u32::try_from(spendable / item.buy_price).unwrap_or(u32::MAX);
                    deficit.min(affordable)
                }
            };
            if quantity == 0 {
                continue;
            }
            let spent = item.buy_price.saturating_mul(i64::from(quantity));
            self.funds -= spent;
            self.stock.add(item_id, quantity);
            debug!("{} restocked {} x{} for {}", self.id, item_id, quantity, spent);
            events.push(FactionEvent::ItemsRestocked {
                item: item_id.clone(),
                quantity,
                spent,
            });
        }
        events
    }

    /// Sell stock above the keep level (a margin over the restock target).
    pub fn handle_selling(&mut self, rules: &RuleSet, rule: &FactionRule) -> Vec<FactionEvent> {
        let keep_pct = u64::from(rules.economy.sell_keep_pct);
        let lines: Vec<(String, u32)> = self
            .stock
            .iter()
            .map(|(id, qty)| (id.to_string(), qty))
            .collect();

        let mut events = Vec::new();
        for (item_id, quantity) in lines {
            let Some(item) = rules.item(&item_id) else {
                continue;
            };
            let target = u64::from(rule.restock_target(&item_id));
            let keep = u32::try_from((target * keep_pct).div_ceil(100)).unwrap_or(u32::MAX);
            if quantity <= keep {
                continue;
            }
            let excess = quantity - keep;
            if !self.stock.remove(&item_id, excess) {
                continue;
            }
            let earned = item.sell_price.saturating_mul(i64::from(excess));
            self.funds += earned;
            info!("{} sold {} x{} for {}", self.id, item_id, excess, earned);
            events.push(FactionEvent::ItemsSold {
                item: item_id,
                quantity: excess,
                earned,
            });
        }
        events
    }
}
