use std::collections::BTreeSet;
use std::ops::Deref;

use super::model::{Passenger, PassengerTable};

// ---------------------------------------------------------------------------
// Inclusive numeric range
// ---------------------------------------------------------------------------

/// Closed interval `[lo, hi]` used by the slider filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange<T> {
    pub lo: T,
    pub hi: T,
}

impl<T: PartialOrd + Copy> NumericRange<T> {
    pub fn new(lo: T, hi: T) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, value: T) -> bool {
        self.lo <= value && value <= self.hi
    }
}

impl Default for NumericRange<f64> {
    fn default() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }
}

impl Default for NumericRange<u32> {
    fn default() -> Self {
        Self::new(0, u32::MAX)
    }
}

// ---------------------------------------------------------------------------
// FilterSpec: the selections read from the sidebar widgets
// ---------------------------------------------------------------------------

/// Every active selection, ANDed together by [`apply`].
///
/// An empty categorical set means "no filter" on that field, matching a
/// multiselect whose default is everything. `FilterSpec::default()` therefore
/// keeps every row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    pub classes: BTreeSet<u8>,
    pub sexes: BTreeSet<String>,
    pub ports: BTreeSet<String>,
    pub age: NumericRange<f64>,
    pub fare: NumericRange<f64>,
    pub family_size: NumericRange<u32>,
    pub drop_missing_age: bool,
    pub drop_missing_port: bool,
}

impl FilterSpec {
    /// The widget defaults for a freshly loaded table: every option selected
    /// and every slider spanning the observed values.
    ///
    /// Age bounds are widened to whole years so an integer slider at its
    /// extremes never cuts off a fractional age.
    pub fn for_table(table: &PassengerTable) -> Self {
        let age = table
            .age_bounds
            .map(|(lo, hi)| NumericRange::new(lo.floor(), hi.ceil()))
            .unwrap_or_default();
        let fare = table
            .fare_bounds
            .map(|(lo, hi)| NumericRange::new(lo, hi))
            .unwrap_or_default();
        let (fam_lo, fam_hi) = table.family_bounds;

        Self {
            classes: table.classes.clone(),
            sexes: table.sexes.iter().cloned().collect(),
            ports: table.ports.iter().cloned().collect(),
            age,
            fare,
            family_size: NumericRange::new(fam_lo, fam_hi),
            drop_missing_age: false,
            drop_missing_port: false,
        }
    }

    /// Whether a single passenger passes every predicate.
    ///
    /// Missing age/fare pass their range filters; only the drop flags remove
    /// rows for missingness. A non-empty port selection excludes a missing
    /// port.
    pub fn matches(&self, p: &Passenger) -> bool {
        if !self.classes.is_empty() && !self.classes.contains(&p.class) {
            return false;
        }
        if !self.sexes.is_empty() && !self.sexes.contains(&p.sex) {
            return false;
        }
        if !self.ports.is_empty()
            && !p.port.as_ref().is_some_and(|port| self.ports.contains(port))
        {
            return false;
        }
        if !p.age.map_or(true, |age| self.age.contains(age)) {
            return false;
        }
        if !p.fare.map_or(true, |fare| self.fare.contains(fare)) {
            return false;
        }
        if !self.family_size.contains(p.family_size) {
            return false;
        }
        if self.drop_missing_age && p.age.is_none() {
            return false;
        }
        if self.drop_missing_port && p.port.is_none() {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// Owned working copy of the passengers that passed a [`FilterSpec`].
/// Rebuilt from scratch on every filter change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilteredView {
    passengers: Vec<Passenger>,
}

impl Deref for FilteredView {
    type Target = [Passenger];

    fn deref(&self) -> &[Passenger] {
        &self.passengers
    }
}

/// Return the passengers that pass all active filters, in input order.
pub fn apply(records: &[Passenger], spec: &FilterSpec) -> FilteredView {
    FilteredView {
        passengers: records
            .iter()
            .filter(|p| spec.matches(p))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn passenger(class: u8, sex: &str, age: Option<f64>, fare: Option<f64>, port: Option<&str>) -> Passenger {
        Passenger::new("X", class, sex, age, 0, 0, fare, port.map(str::to_string), false)
    }

    fn sample() -> Vec<Passenger> {
        vec![
            passenger(1, "female", Some(38.0), Some(71.28), Some("C")),
            passenger(3, "male", None, Some(8.05), Some("S")),
            passenger(2, "male", Some(54.0), None, None),
            passenger(3, "female", Some(4.0), Some(16.7), Some("Q")),
        ]
    }

    #[test]
    fn default_spec_keeps_everything() {
        let rows = sample();
        assert_eq!(apply(&rows, &FilterSpec::default()).len(), rows.len());
    }

    #[test]
    fn table_defaults_keep_every_row_with_a_port() {
        let rows = sample();
        let table = PassengerTable::from_passengers(rows.clone());
        let spec = FilterSpec::for_table(&table);
        assert_eq!(spec.age, NumericRange::new(4.0, 54.0));
        let view = apply(&rows, &spec);
        assert_eq!(view.len(), rows.len() - 1);
        assert!(view.iter().all(|p| p.port.is_some()));
    }

    #[test]
    fn port_selection_excludes_missing_port() {
        let rows = vec![
            Passenger::new("A", 3, "male", None, 0, 0, None, Some("S".into()), false),
            Passenger::new("B", 3, "male", None, 0, 0, None, None, false),
        ];
        let spec = FilterSpec {
            ports: BTreeSet::from(["S".to_string()]),
            ..FilterSpec::default()
        };
        let names: Vec<_> = apply(&rows, &spec).iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["A"]);

        // An empty selection lifts the filter, missing port included.
        assert_eq!(apply(&rows, &FilterSpec::default()).len(), 2);
    }

    #[test]
    fn fractional_age_extremes_survive_table_defaults() {
        let rows = vec![
            passenger(3, "male", Some(0.42), None, None),
            passenger(1, "male", Some(74.5), None, None),
        ];
        let table = PassengerTable::from_passengers(rows.clone());
        let spec = FilterSpec::for_table(&table);
        assert_eq!(spec.age, NumericRange::new(0.0, 75.0));
        assert_eq!(apply(&rows, &spec).len(), 2);
    }

    #[test]
    fn categorical_selection_filters_rows() {
        let spec = FilterSpec {
            classes: BTreeSet::from([3]),
            ..FilterSpec::default()
        };
        let view = apply(&sample(), &spec);
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|p| p.class == 3));
    }

    #[test]
    fn missing_values_pass_range_filters() {
        let spec = FilterSpec {
            age: NumericRange::new(30.0, 40.0),
            fare: NumericRange::new(50.0, 100.0),
            ..FilterSpec::default()
        };
        let view = apply(&sample(), &spec);
        // age 38 / fare 71.28 matches; missing age and missing fare rows pass
        // their own range and are cut by the other one.
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].age, Some(38.0));

        let spec = FilterSpec {
            age: NumericRange::new(30.0, 40.0),
            ..FilterSpec::default()
        };
        let view = apply(&sample(), &spec);
        assert_eq!(view.len(), 2);
        assert!(view.iter().any(|p| p.age.is_none()));
    }

    #[test]
    fn drop_flags_remove_missing() {
        let spec = FilterSpec {
            drop_missing_age: true,
            drop_missing_port: true,
            ..FilterSpec::default()
        };
        let view = apply(&sample(), &spec);
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|p| p.age.is_some() && p.port.is_some()));
    }

    #[test]
    fn family_size_range_is_inclusive() {
        let rows = vec![
            Passenger::new("A", 3, "male", None, 0, 0, None, None, false),
            Passenger::new("B", 3, "male", None, 2, 1, None, None, false),
            Passenger::new("C", 3, "male", None, 4, 2, None, None, false),
        ];
        let spec = FilterSpec {
            family_size: NumericRange::new(0, 3),
            ..FilterSpec::default()
        };
        let names: Vec<_> = apply(&rows, &spec).iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn empty_result_is_valid() {
        let spec = FilterSpec {
            sexes: BTreeSet::from(["other".to_string()]),
            ..FilterSpec::default()
        };
        assert!(apply(&sample(), &spec).is_empty());
    }

    // -- property tests --

    fn arb_passenger() -> impl Strategy<Value = Passenger> {
        (
            1u8..=3,
            prop_oneof![Just("male"), Just("female")],
            proptest::option::of(0.0f64..80.0),
            0u32..5,
            0u32..4,
            proptest::option::of(0.0f64..300.0),
            proptest::option::of(prop_oneof![Just("C"), Just("Q"), Just("S")]),
            any::<bool>(),
        )
            .prop_map(|(class, sex, age, sibsp, parch, fare, port, survived)| {
                Passenger::new(
                    "P",
                    class,
                    sex,
                    age,
                    sibsp,
                    parch,
                    fare,
                    port.map(str::to_string),
                    survived,
                )
            })
    }

    fn subset<T: Clone + Ord + std::fmt::Debug + 'static>(
        values: Vec<T>,
    ) -> impl Strategy<Value = BTreeSet<T>> {
        let len = values.len();
        proptest::sample::subsequence(values, 0..=len).prop_map(|v| v.into_iter().collect())
    }

    fn arb_spec() -> impl Strategy<Value = FilterSpec> {
        (
            subset(vec![1u8, 2, 3]),
            subset(vec!["male".to_string(), "female".to_string()]),
            subset(vec!["C".to_string(), "Q".to_string(), "S".to_string()]),
            (0.0f64..80.0, 0.0f64..80.0),
            (0.0f64..300.0, 0.0f64..300.0),
            (0u32..9, 0u32..9),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(classes, sexes, ports, age, fare, fam, drop_age, drop_port)| FilterSpec {
                classes,
                sexes,
                ports,
                age: NumericRange::new(age.0.min(age.1), age.0.max(age.1)),
                fare: NumericRange::new(fare.0.min(fare.1), fare.0.max(fare.1)),
                family_size: NumericRange::new(fam.0.min(fam.1), fam.0.max(fam.1)),
                drop_missing_age: drop_age,
                drop_missing_port: drop_port,
            })
    }

    proptest! {
        #[test]
        fn apply_is_idempotent(
            rows in proptest::collection::vec(arb_passenger(), 0..60),
            spec in arb_spec(),
        ) {
            let once = apply(&rows, &spec);
            let twice = apply(&once, &spec);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn result_is_a_subset_satisfying_every_predicate(
            rows in proptest::collection::vec(arb_passenger(), 0..60),
            spec in arb_spec(),
        ) {
            let view = apply(&rows, &spec);
            prop_assert!(view.len() <= rows.len());
            for p in view.iter() {
                prop_assert!(spec.classes.is_empty() || spec.classes.contains(&p.class));
                prop_assert!(spec.sexes.is_empty() || spec.sexes.contains(&p.sex));
                prop_assert!(
                    spec.ports.is_empty()
                        || p.port.as_ref().is_some_and(|port| spec.ports.contains(port))
                );
                prop_assert!(p.age.map_or(true, |a| spec.age.contains(a)));
                prop_assert!(p.fare.map_or(true, |f| spec.fare.contains(f)));
                prop_assert!(spec.family_size.contains(p.family_size));
                prop_assert!(!spec.drop_missing_age || p.age.is_some());
                prop_assert!(!spec.drop_missing_port || p.port.is_some());
            }
        }

        #[test]
        fn empty_selection_equals_full_selection(
            rows in proptest::collection::vec(arb_passenger(), 0..60),
            spec in arb_spec(),
        ) {
            let empty = FilterSpec { classes: BTreeSet::new(), ..spec.clone() };
            let full = FilterSpec { classes: BTreeSet::from([1, 2, 3]), ..spec };
            prop_assert_eq!(apply(&rows, &empty), apply(&rows, &full));
        }
    }
}
