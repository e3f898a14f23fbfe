use super::*;

/// Single-row shape produced by count and sum rollup queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct Tally {
    pub total: i64,
}
