use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::model::{GroupKey, Passenger};

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

/// Survivors as a percentage of `total`, rounded to one decimal.
/// An empty group has rate `0.0`.
pub fn rate_pct(survived: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(survived as f64 * 100.0 / total as f64)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Headline counts for the metric cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub survived: usize,
    pub died: usize,
}

impl Summary {
    pub fn of(rows: &[Passenger]) -> Self {
        let survived = rows.iter().filter(|p| p.survived).count();
        Summary {
            total: rows.len(),
            survived,
            died: rows.len() - survived,
        }
    }

    /// `None` when there is nothing to take a percentage of.
    pub fn survived_pct(&self) -> Option<f64> {
        (self.total > 0).then(|| rate_pct(self.survived, self.total))
    }

    pub fn died_pct(&self) -> Option<f64> {
        (self.total > 0).then(|| rate_pct(self.died, self.total))
    }
}

// ---------------------------------------------------------------------------
// Group rate
// ---------------------------------------------------------------------------

/// Field a group rate is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Sex,
    Class,
    FamilySize,
    Port,
}

impl GroupBy {
    /// The passenger's key for this field; `None` drops the row from the grouping.
    fn key(self, p: &Passenger) -> Option<GroupKey> {
        match self {
            GroupBy::Sex => Some(GroupKey::Text(p.sex.clone())),
            GroupBy::Class => Some(GroupKey::Integer(p.class as i64)),
            GroupBy::FamilySize => Some(GroupKey::Integer(p.family_size as i64)),
            GroupBy::Port => p.port.clone().map(GroupKey::Text),
        }
    }
}

/// Survival rate of one observed group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRate {
    pub key: GroupKey,
    pub count: usize,
    pub survived: usize,
    /// Percentage in `[0, 100]`, one decimal.
    pub rate: f64,
}

impl GroupRate {
    fn new(key: GroupKey, (count, survived): (usize, usize)) -> Self {
        GroupRate {
            key,
            count,
            survived,
            rate: rate_pct(survived, count),
        }
    }

    /// Exact comparison of the underlying ratios, ignoring rounding.
    fn cmp_rate(&self, other: &Self) -> Ordering {
        (self.survived * other.count).cmp(&(other.survived * self.count))
    }
}

/// Survival rate per observed value of `by`, ordered by key.
pub fn group_rate(rows: &[Passenger], by: GroupBy) -> Vec<GroupRate> {
    let mut groups: BTreeMap<GroupKey, (usize, usize)> = BTreeMap::new();
    for p in rows {
        if let Some(key) = by.key(p) {
            let entry = groups.entry(key).or_default();
            entry.0 += 1;
            entry.1 += p.survived as usize;
        }
    }
    groups
        .into_iter()
        .map(|(key, counts)| GroupRate::new(key, counts))
        .collect()
}

/// The `n` highest-rate groups. Equal rates keep their input order.
pub fn top_groups(rates: &[GroupRate], n: usize) -> Vec<GroupRate> {
    let mut ranked = rates.to_vec();
    ranked.sort_by(|a, b| b.cmp_rate(a));
    ranked.truncate(n);
    ranked
}

// ---------------------------------------------------------------------------
// Binned rate: class × age bin
// ---------------------------------------------------------------------------

/// Half-open age interval `[lo, lo + width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgeBin {
    pub lo: u32,
    pub width: u32,
}

impl AgeBin {
    /// Bin of `age` among `count` bins of `width` starting at 0, or `None`
    /// when the age lies past the last bin.
    pub fn of(age: f64, width: u32, count: u32) -> Option<AgeBin> {
        if width == 0 || age.is_nan() || age < 0.0 {
            return None;
        }
        let idx = (age / width as f64).floor();
        (idx < count as f64).then(|| AgeBin {
            lo: idx as u32 * width,
            width,
        })
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.lo, self.lo + self.width - 1)
    }
}

/// Survival rate of one (class, age bin) cell.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedRate {
    pub class: u8,
    pub bin: AgeBin,
    pub count: usize,
    pub rate: f64,
}

/// Survival rate per (class, age bin). Rows without an age, or older than the
/// last bin, are skipped; empty cells are omitted.
pub fn binned_rate(rows: &[Passenger], width: u32, count: u32) -> Vec<BinnedRate> {
    let mut cells: BTreeMap<(u8, AgeBin), (usize, usize)> = BTreeMap::new();
    for p in rows {
        let Some(bin) = p.age.and_then(|age| AgeBin::of(age, width, count)) else {
            continue;
        };
        let entry = cells.entry((p.class, bin)).or_default();
        entry.0 += 1;
        entry.1 += p.survived as usize;
    }
    cells
        .into_iter()
        .map(|((class, bin), (n, survived))| BinnedRate {
            class,
            bin,
            count: n,
            rate: rate_pct(survived, n),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Row-level top-K
// ---------------------------------------------------------------------------

/// Display projection of a passenger for the fare ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct FareRow {
    pub name: String,
    pub fare: f64,
    pub survived: bool,
}

/// The `k` highest fares, descending. Passengers without a fare are skipped;
/// equal fares keep view order.
pub fn top_fares(rows: &[Passenger], k: usize) -> Vec<FareRow> {
    let mut ranked: Vec<FareRow> = rows
        .iter()
        .filter_map(|p| {
            p.fare.map(|fare| FareRow {
                name: p.name.clone(),
                fare,
                survived: p.survived,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.fare.total_cmp(&a.fare));
    ranked.truncate(k);
    ranked
}
