/// Download progress events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Starting { total: Option<u64> },
    Chunk { current: u64, total: Option<u64> },
    Complete { current: u64, total: Option<u64> },
}

impl Progress {
    /// Maps the event to a `(completed, total)` pair for display.
    ///
    /// `completed == total` only for [`Progress::Complete`]. With a known length `L`
    /// the total is fixed at `L + 1` for the whole transfer, the extra unit standing
    /// for "not yet fully received". Without one, the total stays one ahead of the
    /// bytes received.
    pub fn sample(&self) -> (u64, u64) {
        match *self {
            Progress::Starting {
                total,
            } => (0, total.unwrap_or(0) + 1),
            Progress::Chunk {
                current,
                total: Some(total),
            } => (current.min(total), total + 1),
            Progress::Chunk {
                current,
                total: None,
            } => (current, current + 1),
            Progress::Complete {
                current,
                total,
            } => {
                let done = total.unwrap_or(current) + 1;
                (done, done)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_known_length() {
        let total = Some(100);
        assert_eq!(Progress::Starting { total }.sample(), (0, 101));
        assert_eq!(
            Progress::Chunk {
                current: 100,
                total
            }
            .sample(),
            (100, 101)
        );
        assert_eq!(
            Progress::Complete {
                current: 100,
                total
            }
            .sample(),
            (101, 101)
        );
    }

    #[test]
    fn test_sample_unknown_length() {
        assert_eq!(Progress::Starting { total: None }.sample(), (0, 1));
        assert_eq!(
            Progress::Chunk {
                current: 42,
                total: None
            }
            .sample(),
            (42, 43)
        );
        assert_eq!(
            Progress::Complete {
                current: 42,
                total: None
            }
            .sample(),
            (43, 43)
        );
    }
}
