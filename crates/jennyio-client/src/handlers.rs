use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

/// A channel callback, invoked with the `data` of each inbound message.
pub type Handler = Rc<RefCell<dyn FnMut(Value)>>;

/// Wrap a closure as a [`Handler`].
pub fn handler(callback: impl FnMut(Value) + 'static) -> Handler {
    Rc::new(RefCell::new(callback))
}

enum Slot {
    Active(Handler),
    /// Left behind by an unsubscribe so a late message is dropped quietly.
    Disabled,
}

/// Result of looking a channel up.
pub enum Lookup {
    Active(Handler),
    Disabled,
    Missing,
}

/// Channel name to handler mapping. At most one slot per channel.
#[derive(Default)]
pub struct HandlerTable {
    slots: HashMap<String, Slot>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` for `channel`, replacing whatever was there.
    ///
    /// Returns true if an active handler was replaced.
    pub fn insert(&mut self, channel: &str, handler: Handler) -> bool {
        matches!(
            self.slots.insert(channel.to_string(), Slot::Active(handler)),
            Some(Slot::Active(_))
        )
    }

    /// Disable `channel`. Returns true if it had an active handler.
    pub fn disable(&mut self, channel: &str) -> bool {
        matches!(
            self.slots.insert(channel.to_string(), Slot::Disabled),
            Some(Slot::Active(_))
        )
    }

    pub fn lookup(&self, channel: &str) -> Lookup {
        match self.slots.get(channel) {
            Some(Slot::Active(handler)) => Lookup::Active(Rc::clone(handler)),
            Some(Slot::Disabled) => Lookup::Disabled,
            None => Lookup::Missing,
        }
    }

    pub fn is_active(&self, channel: &str) -> bool {
        matches!(self.slots.get(channel), Some(Slot::Active(_)))
    }

    /// Names of channels with an active handler, in no particular order.
    pub fn active_channels(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(|(name, slot)| match slot {
            Slot::Active(_) => Some(name.as_str()),
            Slot::Disabled => None,
        })
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut active: Vec<&str> = self.active_channels().collect();
        active.sort_unstable();
        f.debug_struct("HandlerTable")
            .field("active", &active)
            .field("slots", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;

    fn call(table: &HandlerTable, channel: &str, data: Value) -> bool {
        match table.lookup(channel) {
            Lookup::Active(handler) => {
                let mut callback = handler.borrow_mut();
                (*callback)(data);
                true
            }
            Lookup::Disabled | Lookup::Missing => false,
        }
    }

    #[test]
    fn insert_replaces_existing() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let mut table = HandlerTable::new();

        let f = first.clone();
        assert!(!table.insert("jobs", handler(move |_| f.set(f.get() + 1))));
        let s = second.clone();
        assert!(table.insert("jobs", handler(move |_| s.set(s.get() + 1))));

        assert!(call(&table, "jobs", json!(1)));
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn disable_leaves_sentinel() {
        let mut table = HandlerTable::new();
        table.insert("jobs", handler(|_| {}));
        assert!(table.disable("jobs"));
        assert!(!table.disable("jobs"));
        assert!(matches!(table.lookup("jobs"), Lookup::Disabled));
        assert!(!table.is_active("jobs"));
        assert!(matches!(table.lookup("other"), Lookup::Missing));
    }

    #[test]
    fn active_channels_skips_disabled() {
        let mut table = HandlerTable::new();
        table.insert("a", handler(|_| {}));
        table.insert("b", handler(|_| {}));
        table.disable("b");
        let active: Vec<&str> = table.active_channels().collect();
        assert_eq!(active, vec!["a"]);
    }
}
