//! Item stockpiles held by factions and by the player.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quantities keyed by item id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemStock {
    items: BTreeMap<String, u32>,
}

impl ItemStock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity on hand for an item.
    #[must_use]
    pub fn get(&self, item_id: &str) -> u32 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    /// Add quantity, returning the new total.
    pub fn add(&mut self, item_id: &str, qty: u32) -> u32 {
        if qty == 0 {
            return self.get(item_id);
        }
        let entry = self.items.entry(item_id.to_string()).or_insert(0);
        *entry = entry.saturating_add(qty);
        *entry
    }

    /// Remove exactly `qty` units. Returns false and leaves the stock
    /// untouched when fewer are available.
    pub fn remove(&mut self, item_id: &str, qty: u32) -> bool {
        if qty == 0 {
            return true;
        }
        let Some(entry) = self.items.get_mut(item_id) else {
            return false;
        };
        if *entry < qty {
            return false;
        }
        *entry -= qty;
        if *entry == 0 {
            self.items.remove(item_id);
        }
        true
    }

    /// Whether every line of `other` is covered by this stock.
    #[must_use]
    pub fn contains_all(&self, other: &Self) -> bool {
        other.iter().all(|(id, qty)| self.get(id) >= qty)
    }

    /// Iterate non-empty lines in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.items.values().map(|qty| u64::from(*qty)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for ItemStock {
    fn from_iter<T: IntoIterator<Item = (S, u32)>>(iter: T) -> Self {
        let mut stock = Self::new();
        for (id, qty) in iter {
            let id: String = id.into();
            stock.add(&id, qty);
        }
        stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_track_quantities() {
        let mut stock = ItemStock::new();
        assert_eq!(stock.add("rifle", 3), 3);
        assert_eq!(stock.add("rifle", 2), 5);
        assert!(stock.remove("rifle", 4));
        assert_eq!(stock.get("rifle"), 1);
        assert!(!stock.remove("rifle", 2));
        assert_eq!(stock.get("rifle"), 1);
        assert!(stock.remove("rifle", 1));
        assert!(stock.is_empty());
    }

    #[test]
    fn contains_all_checks_every_line() {
        let stock: ItemStock = [("medkit", 2), ("rifle", 1)].into_iter().collect();
        let wanted: ItemStock = [("medkit", 2)].into_iter().collect();
        let too_many: ItemStock = [("rifle", 2)].into_iter().collect();
        assert!(stock.contains_all(&wanted));
        assert!(!stock.contains_all(&too_many));
        assert_eq!(stock.total_units(), 3);
    }

    #[test]
    fn zero_quantities_are_not_stored() {
        let stock: ItemStock = [("ghost", 0)].into_iter().collect();
        assert!(stock.is_empty());
    }
}
