//! Strategies for finding a ledger entry by one of its handles

use super::entries::LedgerEntry;

/// Compare two hex addresses, ignoring case
pub fn addresses_equal(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// One way of matching a lookup key against an entry
pub trait MatchStrategy: Sync {
    /// Whether `entry` is identified by `key` under this strategy
    fn matches(&self, entry: &dyn LedgerEntry, key: &str) -> bool;
}

/// Matches the entry's name exactly
pub struct ByName;

impl MatchStrategy for ByName {
    fn matches(&self, entry: &dyn LedgerEntry, key: &str) -> bool {
        entry.name() == key
    }
}

/// Matches the entry's symbol exactly
pub struct BySymbol;

impl MatchStrategy for BySymbol {
    fn matches(&self, entry: &dyn LedgerEntry, key: &str) -> bool {
        entry.symbol() == Some(key)
    }
}

/// Matches the entry's address, ignoring case
pub struct ByAddress;

impl MatchStrategy for ByAddress {
    fn matches(&self, entry: &dyn LedgerEntry, key: &str) -> bool {
        entry
            .address()
            .is_some_and(|address| addresses_equal(&format!("{:#x}", address), key))
    }
}

/// The order in which strategies are tried: every entry is checked against a strategy before
/// falling through to the next
pub static LOOKUP_ORDER: [&dyn MatchStrategy; 3] = [&ByName, &BySymbol, &ByAddress];

/// The position of the entry identified by `key`, if any
pub fn position<E: LedgerEntry>(entries: &[E], key: &str) -> Option<usize> {
    LOOKUP_ORDER.iter().find_map(|strategy| {
        entries
            .iter()
            .position(|entry| strategy.matches(entry, key))
    })
}
