//! The current query predicate.

use sky_core::{CoreError, FilterPredicate};

/// Owns the predicate for the session; mutated only through
/// [`apply`](Self::apply) and [`clear`](Self::clear).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    predicate: FilterPredicate,
    default_page_size: u32,
}

impl FilterState {
    #[must_use]
    pub fn new(default_page_size: u32) -> Self {
        Self {
            predicate: FilterPredicate::match_all().with_page_size(default_page_size),
            default_page_size,
        }
    }

    #[must_use]
    pub const fn predicate(&self) -> &FilterPredicate {
        &self.predicate
    }

    /// Validate and adopt `predicate`. A missing page size takes the
    /// configured default. On error the previous predicate is kept.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when the date range is inverted or
    /// the page size is out of range.
    pub fn apply(&mut self, mut predicate: FilterPredicate) -> Result<&FilterPredicate, CoreError> {
        if predicate.page_size.is_none() {
            predicate.page_size = Some(self.default_page_size);
        }
        predicate.validate()?;
        self.predicate = predicate;
        Ok(&self.predicate)
    }

    /// Back to no date bound and no category bound.
    pub fn clear(&mut self) -> &FilterPredicate {
        self.predicate = FilterPredicate::match_all().with_page_size(self.default_page_size);
        &self.predicate
    }

    /// Query string for the current predicate.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.predicate.to_query_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_unconstrained_with_default_page_size() {
        let state = FilterState::new(1000);
        assert_eq!(state.predicate().page_size, Some(1000));
        assert_eq!(state.to_query_string(), "limit=1000");
    }

    #[test]
    fn apply_fills_page_size() {
        let mut state = FilterState::new(250);
        let applied = state
            .apply(FilterPredicate::match_all().with_shape("disk").with_region("nm"))
            .unwrap();
        assert_eq!(applied.page_size, Some(250));
        assert_eq!(state.to_query_string(), "shape=disk&state=NM&limit=250");
    }

    #[test]
    fn rejected_predicate_keeps_previous() {
        let mut state = FilterState::new(1000);
        state
            .apply(FilterPredicate::match_all().with_shape("light"))
            .unwrap();

        let inverted = FilterPredicate::match_all().with_dates(
            NaiveDate::from_ymd_opt(2020, 1, 2),
            NaiveDate::from_ymd_opt(2020, 1, 1),
        );
        assert!(state.apply(inverted).is_err());
        assert_eq!(state.predicate().shape.as_deref(), Some("light"));
    }

    #[test]
    fn clear_resets_everything_but_page_size() {
        let mut state = FilterState::new(500);
        state
            .apply(FilterPredicate::match_all().with_city("Phoenix").with_page_size(20))
            .unwrap();
        let cleared = state.clear().clone();
        assert_eq!(cleared, FilterPredicate::match_all().with_page_size(500));
    }
}
