use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::entry::{EntryId, FixedExpense, IncomeEntry, InstallmentPlan};
use super::month::MonthKey;

/// Identifies one monthly occurrence of an entry in a paid-status map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaidKey {
    pub entry_id: EntryId,
    pub month: MonthKey,
}

impl PaidKey {
    pub fn new(entry_id: EntryId, month: MonthKey) -> Self {
        Self { entry_id, month }
    }
}

/// Paid flags per `(entry, month)`. A missing key means unpaid.
///
/// Keys for deleted entries may linger; nothing reads them unless an entry
/// with the same id exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaidMap(BTreeMap<PaidKey, bool>);

impl PaidMap {
    pub fn is_paid(&self, entry_id: EntryId, month: &MonthKey) -> bool {
        self.0
            .get(&PaidKey::new(entry_id, month.clone()))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, key: PaidKey, paid: bool) {
        self.0.insert(key, paid);
    }

    /// Flip the flag at `key` and return the new value.
    pub fn toggle(&mut self, key: PaidKey) -> bool {
        let flag = self.0.entry(key).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Keep only the keys for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&PaidKey) -> bool) {
        self.0.retain(|key, _| keep(key));
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PaidKey, bool)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }
}

/// On-disk shape of one paid-map entry. JSON object keys cannot hold a
/// composite key, so the map is stored as a list of records.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaidRecord {
    entry_id: EntryId,
    month: MonthKey,
    paid: bool,
}

impl Serialize for PaidMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|(key, paid)| PaidRecord {
            entry_id: key.entry_id,
            month: key.month.clone(),
            paid,
        }))
    }
}

impl<'de> Deserialize<'de> for PaidMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Self::default();
        for record in Vec::<PaidRecord>::deserialize(deserializer)? {
            map.set(PaidKey::new(record.entry_id, record.month), record.paid);
        }
        Ok(map)
    }
}

/// Everything one user has recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default)]
    pub income: Vec<IncomeEntry>,
    #[serde(default)]
    pub fixed_expenses: Vec<FixedExpense>,
    #[serde(default)]
    pub installment_plans: Vec<InstallmentPlan>,
    #[serde(default)]
    pub fixed_paid: PaidMap,
    #[serde(default)]
    pub installment_paid: PaidMap,
}

impl Ledger {
    /// Ids across all three entry collections, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.income
            .iter()
            .map(|e| e.id)
            .chain(self.fixed_expenses.iter().map(|e| e.id))
            .chain(self.installment_plans.iter().map(|p| p.id))
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.ids().any(|existing| existing == id)
    }

    /// Number of stored paid-map keys, set or cleared, in both maps.
    pub fn paid_key_count(&self) -> usize {
        self.fixed_paid.iter().count() + self.installment_paid.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.fixed_expenses.is_empty() && self.installment_plans.is_empty()
    }
}
