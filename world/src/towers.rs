//! Authoritative tower state management and upgrade arithmetic.

use std::collections::BTreeMap;

use social_defence_core::{
    GridCell, TowerId, TowerKind, TowerSnapshot, WorldPoint, MAX_UPGRADE_LEVEL, MIN_FIRE_PERIOD,
};

/// Mutable state of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) cell: GridCell,
    pub(crate) position: WorldPoint,
    pub(crate) range: f32,
    pub(crate) damage: f32,
    pub(crate) fire_period: u32,
    pub(crate) cooldown: u32,
    pub(crate) level: u8,
}

impl TowerState {
    fn place(id: TowerId, kind: TowerKind, cell: GridCell) -> Self {
        Self {
            id,
            kind,
            cell,
            position: cell.center(),
            range: kind.base_range(),
            damage: kind.base_damage(),
            fire_period: kind.base_fire_period(),
            cooldown: 0,
            level: 0,
        }
    }

    pub(crate) fn can_upgrade(&self) -> bool {
        self.level < MAX_UPGRADE_LEVEL
    }

    /// Applies one level of multiplicative growth, refusing at the cap.
    pub(crate) fn upgrade(&mut self) -> bool {
        if !self.can_upgrade() {
            return false;
        }

        self.level += 1;
        self.range = (self.range * 1.2).round();
        self.damage = (self.damage * 1.4 * 10.0).round() / 10.0;
        self.fire_period = ((self.fire_period as f32 * 0.85).round() as u32).max(MIN_FIRE_PERIOD);
        true
    }

    /// Refund credited when the tower is sold: 70% of cumulative spend,
    /// with each upgrade counted at 60% of the base cost.
    pub(crate) fn sell_refund(&self) -> u32 {
        let base = self.kind.cost() as f32;
        ((base + self.level as f32 * (base * 0.6)) * 0.7).round() as u32
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            range: self.range,
            damage: self.damage,
            fire_period: self.fire_period,
            cooldown: self.cooldown,
            level: self.level,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Constructs a tower anchored at the provided cell and returns its id.
    pub(crate) fn place(&mut self, kind: TowerKind, cell: GridCell) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get() + 1);
        let _ = self.entries.insert(id, TowerState::place(id, kind, cell));
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Iterates towers in placement order; identifiers allocate monotonically.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }

    pub(crate) fn occupies(&self, cell: GridCell) -> bool {
        self.entries.values().any(|tower| tower.cell == cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placed_tower_starts_with_base_stats() {
        let mut registry = TowerRegistry::new();
        let id = registry.place(TowerKind::PhoneCheck, GridCell::new(2, 2));
        let tower = registry.get_mut(id).expect("tower exists");

        assert_eq!(tower.range, 120.0);
        assert_eq!(tower.damage, 1.0);
        assert_eq!(tower.fire_period, 30);
        assert_eq!(tower.cooldown, 0);
        assert_eq!(tower.level, 0);
        assert_eq!(tower.position, GridCell::new(2, 2).center());
    }

    #[test]
    fn identifiers_allocate_monotonically() {
        let mut registry = TowerRegistry::new();
        let first = registry.place(TowerKind::PhoneCheck, GridCell::new(0, 0));
        let second = registry.place(TowerKind::Headphones, GridCell::new(1, 0));
        assert!(first < second);
        assert!(registry.occupies(GridCell::new(1, 0)));
        assert!(!registry.occupies(GridCell::new(2, 0)));
    }

    #[test]
    fn upgrade_applies_multiplicative_growth() {
        let mut registry = TowerRegistry::new();
        let id = registry.place(TowerKind::PhoneCheck, GridCell::new(0, 0));
        let tower = registry.get_mut(id).expect("tower exists");

        assert!(tower.upgrade());
        assert_eq!(tower.level, 1);
        assert_eq!(tower.range, 144.0);
        assert_eq!(tower.damage, 1.4);
        assert_eq!(tower.fire_period, 26);
    }

    #[test]
    fn fire_period_floors_at_minimum() {
        let mut registry = TowerRegistry::new();
        let id = registry.place(TowerKind::Headphones, GridCell::new(0, 0));
        let tower = registry.get_mut(id).expect("tower exists");

        assert!(tower.upgrade());
        assert_eq!(tower.fire_period, 9);
        assert!(tower.upgrade());
        assert_eq!(tower.fire_period, 8);
    }

    #[test]
    fn third_upgrade_is_refused_and_leaves_stats_unchanged() {
        let mut registry = TowerRegistry::new();
        let id = registry.place(TowerKind::AwkwardJoke, GridCell::new(0, 0));
        let tower = registry.get_mut(id).expect("tower exists");

        assert!(tower.upgrade());
        assert!(tower.upgrade());
        let before = tower.snapshot();

        assert!(!tower.upgrade());
        assert_eq!(tower.snapshot(), before);
    }

    #[test]
    fn sell_refund_matches_economy_rule() {
        let mut registry = TowerRegistry::new();
        let id = registry.place(TowerKind::PhoneCheck, GridCell::new(0, 0));
        let tower = registry.get_mut(id).expect("tower exists");

        assert_eq!(tower.sell_refund(), 35);
        assert!(tower.upgrade());
        assert_eq!(tower.sell_refund(), 56);
        assert!(tower.upgrade());
        assert_eq!(tower.sell_refund(), 77);

        let removed = registry.remove(id);
        assert!(removed.is_some());
        assert!(registry.remove(id).is_none());
    }
}
