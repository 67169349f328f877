use serde::{Deserialize, Serialize};

/// Whether a piece of job-derived data exists yet.
///
/// `Pending` means "no data yet" (the job has not produced it) and is
/// distinct from `Ready` holding an empty value. `Unavailable` means the
/// data will never arrive for this job, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Availability<T> {
    Pending,
    Ready(T),
    Unavailable(String),
}

impl<T> Default for Availability<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T> Availability<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Availability<&T> {
        match self {
            Self::Pending => Availability::Pending,
            Self::Ready(value) => Availability::Ready(value),
            Self::Unavailable(reason) => Availability::Unavailable(reason.clone()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Availability<U> {
        match self {
            Self::Pending => Availability::Pending,
            Self::Ready(value) => Availability::Ready(f(value)),
            Self::Unavailable(reason) => Availability::Unavailable(reason),
        }
    }

    /// Combine two sides. Unavailable wins over pending, so a caller never
    /// waits on a side that can no longer arrive.
    pub fn zip<U>(self, other: Availability<U>) -> Availability<(T, U)> {
        match (self, other) {
            (Self::Ready(a), Availability::Ready(b)) => Availability::Ready((a, b)),
            (Self::Unavailable(reason), _) | (_, Availability::Unavailable(reason)) => {
                Availability::Unavailable(reason)
            }
            _ => Availability::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_waits_for_both_sides() {
        let a: Availability<u32> = Availability::Ready(1);
        let b: Availability<u32> = Availability::Pending;
        assert!(a.zip(b).is_pending());
    }

    #[test]
    fn test_zip_unavailable_wins_over_pending() {
        let a: Availability<u32> = Availability::Pending;
        let b: Availability<u32> = Availability::unavailable("job failed");
        assert_eq!(a.zip(b), Availability::Unavailable("job failed".to_string()));
    }

    #[test]
    fn test_zip_ready() {
        let a = Availability::Ready("a");
        let b = Availability::Ready(2);
        assert_eq!(a.zip(b), Availability::Ready(("a", 2)));
    }

    #[test]
    fn test_ready_empty_is_not_pending() {
        let empty: Availability<Vec<u8>> = Availability::Ready(vec![]);
        assert!(empty.is_ready());
        assert!(!empty.is_pending());
    }

    #[test]
    fn test_serde_shape() {
        let value: Availability<u32> = Availability::Ready(7);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({"state": "ready", "data": 7}));

        let pending: Availability<u32> = serde_json::from_str(r#"{"state":"pending"}"#).unwrap();
        assert!(pending.is_pending());
    }
}
