use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// GroupKey – the value a passenger is grouped by
// ---------------------------------------------------------------------------

/// A grouping value. Numeric keys (class, family size) sort numerically,
/// text keys (sex, port) lexically; the derived `Ord` keeps every group table
/// in the order a `groupby` over observed values would produce.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Integer(i64),
    Text(String),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Integer(i) => write!(f, "{i}"),
            GroupKey::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Passenger – one row of the source table
// ---------------------------------------------------------------------------

/// A single passenger record.
#[derive(Debug, Clone, PartialEq)]
pub struct Passenger {
    pub name: String,
    /// Ticket class, 1 (upper) to 3 (lower).
    pub class: u8,
    pub sex: String,
    pub age: Option<f64>,
    /// Siblings / spouses aboard.
    pub sibsp: u32,
    /// Parents / children aboard.
    pub parch: u32,
    pub fare: Option<f64>,
    /// Embarkation port code (C, Q, S).
    pub port: Option<String>,
    pub survived: bool,
    /// `sibsp + parch`, derived once at construction.
    pub family_size: u32,
}

impl Passenger {
    /// Build a passenger and derive its family size.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        class: u8,
        sex: impl Into<String>,
        age: Option<f64>,
        sibsp: u32,
        parch: u32,
        fare: Option<f64>,
        port: Option<String>,
        survived: bool,
    ) -> Self {
        Self {
            name: name.into(),
            class,
            sex: sex.into(),
            age,
            sibsp,
            parch,
            fare,
            port,
            survived,
            family_size: sibsp.saturating_add(parch),
        }
    }
}

// ---------------------------------------------------------------------------
// PassengerTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The loaded passengers plus the option lists the filter widgets offer.
#[derive(Debug, Clone)]
pub struct PassengerTable {
    pub passengers: Vec<Passenger>,
    /// Distinct classes, ascending.
    pub classes: BTreeSet<u8>,
    /// Distinct sexes in first-appearance order.
    pub sexes: Vec<String>,
    /// Distinct embarkation ports in first-appearance order (missing excluded).
    pub ports: Vec<String>,
    /// Observed (min, max) age, `None` if every age is missing.
    pub age_bounds: Option<(f64, f64)>,
    /// Observed (min, max) fare, `None` if every fare is missing.
    pub fare_bounds: Option<(f64, f64)>,
    /// Observed (min, max) family size, `(0, 0)` for an empty table.
    pub family_bounds: (u32, u32),
}

impl PassengerTable {
    /// Build option lists and bounds from the loaded passengers.
    pub fn from_passengers(passengers: Vec<Passenger>) -> Self {
        let mut classes = BTreeSet::new();
        let mut sexes: Vec<String> = Vec::new();
        let mut ports: Vec<String> = Vec::new();

        for p in &passengers {
            classes.insert(p.class);
            if !sexes.contains(&p.sex) {
                sexes.push(p.sex.clone());
            }
            if let Some(port) = &p.port {
                if !ports.contains(port) {
                    ports.push(port.clone());
                }
            }
        }

        let age_bounds = bounds(passengers.iter().filter_map(|p| p.age));
        let fare_bounds = bounds(passengers.iter().filter_map(|p| p.fare));
        let family_bounds = passengers
            .iter()
            .map(|p| p.family_size)
            .fold(None, |acc: Option<(u32, u32)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0, 0));

        PassengerTable {
            passengers,
            classes,
            sexes,
            ports,
            age_bounds,
            fare_bounds,
            family_bounds,
        }
    }

    /// Number of passengers.
    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
    })
}
