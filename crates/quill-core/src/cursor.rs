//! Pagination cursors.
//!
//! Listings scan descending by creation time with the row id as tiebreak. A
//! cursor is the sort key of the last row the caller has seen, serialized as
//! `"<created_at>.<id>"`, and the next page resumes strictly below it.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// An explicit pagination continuation: the `(created_at, id)` sort key of
/// the last item on the previous page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Creation time of the last-seen row, in unix seconds.
    pub created_at: u32,
    /// Row id of the last-seen row, for tie-breaking equal timestamps.
    pub id: String,
}

impl Cursor {
    /// Cursor pointing just past the given row.
    pub fn after(created_at: u32, id: impl Into<String>) -> Self {
        Self {
            created_at,
            id: id.into(),
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.created_at, self.id)
    }
}

impl FromStr for Cursor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ts, id) = s
            .split_once('.')
            .ok_or_else(|| Error::InvalidCursor(s.to_string()))?;
        let created_at: u32 = ts
            .parse()
            .map_err(|_| Error::InvalidCursor(s.to_string()))?;
        if id.is_empty() {
            return Err(Error::InvalidCursor(s.to_string()));
        }
        Ok(Self {
            created_at,
            id: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display() {
        let cursor = Cursor::after(1700000000, "a1b2c3");
        let parsed: Cursor = cursor.to_string().parse().unwrap();
        assert_eq!(parsed, cursor);
    }

    #[test]
    fn id_may_contain_dots() {
        // split_once keeps everything after the first separator in the id
        let parsed: Cursor = "42.a.b".parse().unwrap();
        assert_eq!(parsed.created_at, 42);
        assert_eq!(parsed.id, "a.b");
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(matches!(
            "1700000000".parse::<Cursor>(),
            Err(Error::InvalidCursor(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_timestamp() {
        assert!("abc.def".parse::<Cursor>().is_err());
    }

    #[test]
    fn rejects_empty_id() {
        assert!("1700000000.".parse::<Cursor>().is_err());
    }
}
