//! Tri-state selectors over nullable columns
//!
//! A nullable column can be filtered three ways: not at all, "is null", or
//! "equals this value". Each case is its own variant rather than an
//! `Option<Option<T>>`, so "no filter" and "explicitly null" cannot be
//! confused.

/// Which version space of the data a query sees
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SnapshotSelector {
    /// Live rows and every snapshot copy
    Unconstrained,
    /// Only the mutable live rows (`snapshot_id IS NULL`)
    #[default]
    LiveOnly,
    /// Only the copies frozen under one snapshot
    Exactly(String),
}

impl SnapshotSelector {
    pub fn exactly(snapshot_id: impl Into<String>) -> Self {
        SnapshotSelector::Exactly(snapshot_id.into())
    }

    /// Evaluate the selector against a row's `snapshot_id`
    pub fn matches(&self, snapshot_id: Option<&str>) -> bool {
        match self {
            SnapshotSelector::Unconstrained => true,
            SnapshotSelector::LiveOnly => snapshot_id.is_none(),
            SnapshotSelector::Exactly(id) => snapshot_id == Some(id.as_str()),
        }
    }
}

/// Filter over any nullable column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NullableFilter<T> {
    Any,
    Null,
    Equals(T),
}

impl<T> Default for NullableFilter<T> {
    fn default() -> Self {
        NullableFilter::Any
    }
}

impl<T> NullableFilter<T> {
    pub fn is_any(&self) -> bool {
        matches!(self, NullableFilter::Any)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> NullableFilter<U> {
        match self {
            NullableFilter::Any => NullableFilter::Any,
            NullableFilter::Null => NullableFilter::Null,
            NullableFilter::Equals(v) => NullableFilter::Equals(f(v)),
        }
    }
}

impl<T: PartialEq> NullableFilter<T> {
    pub fn matches(&self, value: Option<&T>) -> bool {
        match self {
            NullableFilter::Any => true,
            NullableFilter::Null => value.is_none(),
            NullableFilter::Equals(expected) => value == Some(expected),
        }
    }
}

impl From<SnapshotSelector> for NullableFilter<String> {
    fn from(selector: SnapshotSelector) -> Self {
        match selector {
            SnapshotSelector::Unconstrained => NullableFilter::Any,
            SnapshotSelector::LiveOnly => NullableFilter::Null,
            SnapshotSelector::Exactly(id) => NullableFilter::Equals(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_cases_are_disjoint() {
        let live = SnapshotSelector::LiveOnly;
        let exact = SnapshotSelector::exactly("s1");
        let any = SnapshotSelector::Unconstrained;

        assert!(live.matches(None));
        assert!(!live.matches(Some("s1")));

        assert!(exact.matches(Some("s1")));
        assert!(!exact.matches(Some("s2")));
        assert!(!exact.matches(None));

        assert!(any.matches(None));
        assert!(any.matches(Some("s2")));
    }

    #[test]
    fn test_selector_maps_onto_nullable_filter() {
        let f: NullableFilter<String> = SnapshotSelector::LiveOnly.into();
        assert_eq!(f, NullableFilter::Null);
        let f: NullableFilter<String> = SnapshotSelector::exactly("s9").into();
        assert_eq!(f, NullableFilter::Equals("s9".to_string()));
        let f: NullableFilter<String> = SnapshotSelector::Unconstrained.into();
        assert!(f.is_any());
    }

    #[test]
    fn test_nullable_filter_matches() {
        let f = NullableFilter::Equals(3);
        assert!(f.matches(Some(&3)));
        assert!(!f.matches(None));
        assert!(NullableFilter::<i32>::Null.matches(None));
        assert_eq!(f.map(|v| v * 2), NullableFilter::Equals(6));
    }
}
