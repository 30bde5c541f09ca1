//! Reactive single-value state for an asynchronously loaded listing.

use std::sync::Arc;

use crate::error::ListingError;

/// Current state of an asynchronously loaded value.
///
/// `Loading` and `Failure` carry the previous data, if any, so consumers can
/// keep showing the last good snapshot while a reload is in flight or after
/// a failed pass.
#[derive(Debug, Clone)]
pub enum Stateful<T> {
    Loading(Option<T>),
    Success(T),
    Failure {
        previous: Option<T>,
        error: Arc<ListingError>,
    },
}

impl<T> Stateful<T> {
    /// The most recent data, regardless of state.
    pub fn data(&self) -> Option<&T> {
        match self {
            Stateful::Loading(data) => data.as_ref(),
            Stateful::Success(data) => Some(data),
            Stateful::Failure { previous, .. } => previous.as_ref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Stateful::Loading(_))
    }

    pub fn error(&self) -> Option<&ListingError> {
        match self {
            Stateful::Failure { error, .. } => Some(error),
            _ => None,
        }
    }
}
