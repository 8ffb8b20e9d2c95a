//! The outcome of a per-repository fetch.

use tracing::error;

use crate::{WallError, WallResult};

/// A state that carries the outcome of fetching data for a single repository.
///
/// Unlike a plain [`Result`], a failed state is expected to be collapsed with [`State::unwrap_or_log`] rather than propagated.
#[non_exhaustive]
#[derive(Debug)]
pub enum State<T> {
    /// The data was fetched.
    Success(T),
    /// The data could not be fetched. The error is kept for logging.
    Failed(WallError),
}

impl<T> State<T> {
    /// Converts [`self`] back into a [`WallResult`].
    ///
    /// # Errors
    ///
    /// Returns the kept error if [`self`] is [`State::Failed`].
    pub fn into_result(self) -> WallResult<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failed(err) => Err(err),
        }
    }

    /// Returns the value, or logs the failure and returns [`T::default`](Default::default).
    pub fn unwrap_or_log(self) -> T
    where
        T: Default,
    {
        match self {
            Self::Success(value) => value,
            Self::Failed(err) => {
                error!("{err}, omitting");
                T::default()
            }
        }
    }
}

impl<T> From<WallResult<T>> for State<T> {
    fn from(result: WallResult<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failed(err),
        }
    }
}

/// Unwraps a [`State`], returning early from the enclosing function with the failure otherwise.
macro_rules! unwrap {
    ($state:expr) => {
        match $crate::state::State::from($state) {
            $crate::state::State::Success(value) => value,
            $crate::state::State::Failed(err) => return $crate::state::State::Failed(err),
        }
    };
}

pub(crate) use unwrap;

#[cfg(test)]
mod tests {
    use super::State;
    use crate::WallError;

    fn failed() -> State<Vec<u8>> {
        State::Failed(WallError::fetch_failed("acme", "api", "connection refused"))
    }

    #[test]
    fn failures_collapse_to_default() {
        assert!(failed().unwrap_or_log().is_empty());
        assert_eq!(State::Success(vec![1, 2]).unwrap_or_log(), vec![1, 2]);
    }

    #[test]
    fn failures_convert_back_to_errors() {
        assert!(failed().into_result().is_err());
        assert_eq!(State::Success(vec![1, 2, 3]).into_result().unwrap(), [1, 2, 3]);
    }

    #[test]
    fn unwrap_returns_early() {
        fn first(state: State<Vec<u8>>) -> State<u8> {
            let values = unwrap!(state);
            State::Success(values.first().copied().unwrap_or_default())
        }

        assert!(first(failed()).into_result().is_err());
        assert_eq!(first(State::Success(vec![7])).into_result().unwrap(), 7);
    }
}
