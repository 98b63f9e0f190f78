//! Name -> collector store.
//!
//! Write-rarely, read-often: one successful insert per name for the process
//! lifetime, arbitrary concurrent lookups. Entries are never removed or
//! replaced once live.
//!
//! Inserts go through a reservation so that a side effect (exposition
//! registration) can run between "name claimed" and "name visible" without
//! holding a shard lock across it. A reserved name is invisible to `lookup`
//! but already taken for every other insert.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::collector::Collector;

enum Slot {
    Reserved,
    Live(Collector),
}

#[derive(Default)]
pub struct CollectorRegistry {
    collectors: DashMap<String, Slot>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self {
            collectors: DashMap::new(),
        }
    }

    /// Live collector for `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<Collector> {
        match self.collectors.get(name)?.value() {
            Slot::Live(c) => Some(c.clone()),
            Slot::Reserved => None,
        }
    }

    /// Store `collector` under `name` unless the name is taken.
    /// Returns `true` if stored.
    pub fn insert_if_absent(&self, name: &str, collector: Collector) -> bool {
        match self.reserve(name) {
            Some(reservation) => {
                reservation.commit(collector);
                true
            }
            None => false,
        }
    }

    /// Like [`insert_if_absent`](Self::insert_if_absent), but runs `publish`
    /// on the collector after claiming the name and before making it visible.
    /// If `publish` fails the claim is released and nothing is stored.
    ///
    /// `Ok(false)` means the name was already taken; `publish` did not run.
    pub fn insert_if_absent_with<E, F>(&self, name: &str, collector: Collector, publish: F) -> Result<bool, E>
    where
        F: FnOnce(&Collector) -> Result<(), E>,
    {
        let Some(reservation) = self.reserve(name) else {
            return Ok(false);
        };
        publish(&collector)?;
        reservation.commit(collector);
        Ok(true)
    }

    /// Number of live collectors.
    pub fn len(&self) -> usize {
        self.collectors
            .iter()
            .filter(|e| matches!(e.value(), Slot::Live(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live collector names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collectors
            .iter()
            .filter(|e| matches!(e.value(), Slot::Live(_)))
            .map(|e| e.key().clone())
            .collect();
        names.sort();
        names
    }

    fn reserve(&self, name: &str) -> Option<Reservation<'_>> {
        match self.collectors.entry(name.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Slot::Reserved);
                Some(Reservation {
                    registry: self,
                    name: name.to_string(),
                    committed: false,
                })
            }
        }
    }
}

/// Claim on a name. Released on drop unless committed.
struct Reservation<'a> {
    registry: &'a CollectorRegistry,
    name: String,
    committed: bool,
}

impl Reservation<'_> {
    fn commit(mut self, collector: Collector) {
        if let Some(mut slot) = self.registry.collectors.get_mut(&self.name) {
            *slot = Slot::Live(collector);
        }
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.registry
                .collectors
                .remove_if(&self.name, |_, slot| matches!(slot, Slot::Reserved));
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use metricsd_core::CollectorDescriptor;

    fn gauge(name: &str) -> Collector {
        crate::collector::build(&CollectorDescriptor::new(name, "gauge")).unwrap()
    }

    #[test]
    fn insert_once() {
        let reg = CollectorRegistry::new();
        assert!(reg.lookup("g").is_none());
        assert!(reg.insert_if_absent("g", gauge("g")));
        assert!(!reg.insert_if_absent("g", gauge("g")));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.names(), vec!["g".to_string()]);
    }

    #[test]
    fn first_insert_wins() {
        let reg = CollectorRegistry::new();
        let first = gauge("g");
        assert!(reg.insert_if_absent("g", first.clone()));
        assert!(!reg.insert_if_absent("g", gauge("g")));

        let Collector::Gauge(g) = first else { unreachable!() };
        g.set(7.0);
        let Some(Collector::Gauge(live)) = reg.lookup("g") else {
            panic!("gauge expected");
        };
        assert_eq!(live.get(), 7.0);
    }

    #[test]
    fn failed_publish_releases_name() {
        let reg = CollectorRegistry::new();
        let res: Result<bool, &str> = reg.insert_if_absent_with("g", gauge("g"), |_| Err("boom"));
        assert_eq!(res, Err("boom"));
        assert!(reg.lookup("g").is_none());
        assert!(reg.is_empty());

        let res: Result<bool, &str> = reg.insert_if_absent_with("g", gauge("g"), |_| Ok(()));
        assert_eq!(res, Ok(true));
        assert!(reg.lookup("g").is_some());
    }

    #[test]
    fn reserved_name_is_invisible_and_taken() {
        let reg = CollectorRegistry::new();
        let res: Result<bool, ()> = reg.insert_if_absent_with("g", gauge("g"), |_| {
            assert!(reg.lookup("g").is_none());
            assert!(!reg.insert_if_absent("g", gauge("g")));
            Ok(())
        });
        assert_eq!(res, Ok(true));
        assert!(reg.lookup("g").is_some());
    }

    #[test]
    fn skipped_publish_when_taken() {
        let reg = CollectorRegistry::new();
        assert!(reg.insert_if_absent("g", gauge("g")));
        let mut ran = false;
        let res: Result<bool, ()> = reg.insert_if_absent_with("g", gauge("g"), |_| {
            ran = true;
            Ok(())
        });
        assert_eq!(res, Ok(false));
        assert!(!ran);
    }
}
