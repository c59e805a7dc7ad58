use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{FexError, FexResult, PatchCellIndex};

/// Acquisition time token layout, minute precision
pub const TIME_FORMAT: &str = "%Y%m%d%H%M";

/// Name token labelling a patch product or feature record.
///
/// `X0122Y0033` for a cell, `X0122_Y0033_T200708030956` when an acquisition time is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatchName {
    pub cell: PatchCellIndex,
    pub acquired: Option<NaiveDateTime>,
}

impl PatchName {
    pub fn new(cell: PatchCellIndex) -> Self {
        Self { cell, acquired: None }
    }

    pub fn with_time(cell: PatchCellIndex, acquired: NaiveDateTime) -> Self {
        Self { cell, acquired: Some(acquired) }
    }

    /// Parse either name form, ignoring a trailing file extension such as `.dim`.
    ///
    /// The untimed form never separates its tokens and the timed form always does,
    /// so `X0001_Y0002` and `X0001Y0002_T200708030956` are rejected.
    pub fn parse(name: &str) -> FexResult<Self> {
        let pattern = Regex::new(r"^X(-?\d+)(_?)Y(-?\d+)(?:_T(\d{12}))?(?:\.[A-Za-z0-9]+)?$")
            .map_err(|e| FexError::InvalidPatchName(format!("Regex error: {}", e)))?;

        let captures = pattern
            .captures(name)
            .ok_or_else(|| FexError::InvalidPatchName(name.to_string()))?;

        let parse_index = |i: usize| -> FexResult<i64> {
            captures[i]
                .parse::<i64>()
                .map_err(|e| FexError::InvalidPatchName(format!("{}: {}", name, e)))
        };
        let cell = PatchCellIndex::new(parse_index(1)?, parse_index(3)?);

        let separated = !captures[2].is_empty();
        let acquired = match (separated, captures.get(4)) {
            (true, Some(token)) => Some(
                NaiveDateTime::parse_from_str(token.as_str(), TIME_FORMAT)
                    .map_err(|e| FexError::InvalidPatchName(format!("{}: {}", name, e)))?,
            ),
            (false, None) => None,
            _ => return Err(FexError::InvalidPatchName(name.to_string())),
        };

        Ok(Self { cell, acquired })
    }
}

impl std::fmt::Display for PatchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.acquired {
            Some(time) => write!(
                f,
                "X{:04}_Y{:04}_T{}",
                self.cell.x,
                self.cell.y,
                time.format(TIME_FORMAT)
            ),
            None => write!(f, "{}", self.cell),
        }
    }
}

/// Signed seconds from `first` to `second`; both names must carry an acquisition time
pub fn time_difference_seconds(first: &PatchName, second: &PatchName) -> FexResult<i64> {
    match (first.acquired, second.acquired) {
        (Some(t1), Some(t2)) => Ok((t2 - t1).num_seconds()),
        _ => Err(FexError::InvalidPatchName(format!(
            "{} / {}: acquisition time missing",
            first, second
        ))),
    }
}

/// Pair bitemporal patches of the same cell whose acquisition times differ by
/// `min_seconds..=max_seconds`.
///
/// Names are grouped by cell and ordered by acquisition time inside each group, so the
/// input order does not matter. Per cell, the second cursor advances while the gap is
/// too short and the first when it is too long; a pair inside the window is offered to
/// `accept` (an ROI overlap check, typically) and on success both names are consumed.
/// Returned pairs index into `names`, earlier acquisition first.
pub fn find_patch_pairs<F>(
    names: &[PatchName],
    min_seconds: i64,
    max_seconds: i64,
    mut accept: F,
) -> FexResult<Vec<(usize, usize)>>
where
    F: FnMut(&PatchName, &PatchName) -> bool,
{
    let mut order: Vec<usize> = (0..names.len()).collect();
    order.sort_by_key(|&i| (names[i].cell, names[i].acquired));

    let mut pairs = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let cell = names[order[start]].cell;
        let end = order[start..]
            .iter()
            .position(|&i| names[i].cell != cell)
            .map_or(order.len(), |offset| start + offset);

        sweep_cell(names, &order[start..end], min_seconds, max_seconds, &mut accept, &mut pairs)?;
        start = end;
    }

    Ok(pairs)
}

fn sweep_cell<F>(
    names: &[PatchName],
    series: &[usize],
    min_seconds: i64,
    max_seconds: i64,
    accept: &mut F,
    pairs: &mut Vec<(usize, usize)>,
) -> FexResult<()>
where
    F: FnMut(&PatchName, &PatchName) -> bool,
{
    let mut i1 = 0;
    let mut i2 = 1;

    while i2 < series.len() {
        let (first, second) = (&names[series[i1]], &names[series[i2]]);
        let distance = time_difference_seconds(first, second)?;
        if distance < min_seconds {
            i2 += 1;
        } else if distance > max_seconds {
            i1 += 1;
            i2 = i1 + 1;
        } else if accept(first, second) {
            log::debug!("Paired {} with {} ({} s)", first, second, distance);
            pairs.push((series[i1], series[i2]));
            i1 = i2 + 1;
            i2 = i1 + 1;
        } else {
            i2 += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(s: &str) -> PatchName {
        PatchName::parse(s).unwrap()
    }

    #[test]
    fn test_display_forms() {
        let cell = PatchCellIndex::new(22, 17);
        assert_eq!(PatchName::new(cell).to_string(), "X0022Y0017");

        let time = NaiveDateTime::parse_from_str("200708030956", TIME_FORMAT).unwrap();
        assert_eq!(PatchName::with_time(cell, time).to_string(), "X0022_Y0017_T200708030956");
    }

    #[test]
    fn test_parse_both_forms() {
        assert_eq!(named("X0122Y0033").cell, PatchCellIndex::new(122, 33));
        assert!(named("X0122Y0033").acquired.is_none());

        let timed = named("X0118_Y0013_T200708030956.dim");
        assert_eq!(timed.cell, PatchCellIndex::new(118, 13));
        assert!(timed.acquired.is_some());
        assert_eq!(timed.to_string(), "X0118_Y0013_T200708030956");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(PatchName::parse("patch").is_err());
        assert!(PatchName::parse("X12").is_err());
        assert!(PatchName::parse("X0001Y0002_T200708030956").is_err());
        assert!(PatchName::parse("X0001_Y0002_T200713030956").is_err());
        assert!(PatchName::parse("X0001_Y0002").is_err());
    }

    #[test]
    fn test_negative_cells_round_trip() {
        let cell = PatchCellIndex::new(-1, 44);
        let untimed = PatchName::new(cell);
        assert_eq!(untimed.to_string(), "X-001Y0044");
        assert_eq!(named(&untimed.to_string()), untimed);

        let time = NaiveDateTime::parse_from_str("201001010000", TIME_FORMAT).unwrap();
        let timed = PatchName::with_time(cell, time);
        assert_eq!(named(&timed.to_string()), timed);
    }

    #[test]
    fn test_time_difference() {
        let a = named("X0118_Y0013_T200708030956.dim");
        assert_eq!(time_difference_seconds(&a, &a).unwrap(), 0);
        assert_eq!(time_difference_seconds(&a, &named("X0118_Y0013_T200708030957.dim")).unwrap(), 60);
        assert_eq!(
            time_difference_seconds(&a, &named("X0118_Y0013_T200708040956.dim")).unwrap(),
            24 * 60 * 60
        );
        assert!(time_difference_seconds(&a, &named("X0118Y0013")).is_err());
    }

    #[test]
    fn test_find_pairs_window() {
        let names: Vec<PatchName> = [
            "X0001_Y0001_T201001010000",
            "X0001_Y0001_T201001010001",
            "X0001_Y0001_T201001010030",
            "X0001_Y0001_T201001020000",
            "X0001_Y0001_T201001020020",
        ]
        .iter()
        .map(|s| named(s))
        .collect();

        // 10 to 60 minutes apart
        let pairs = find_patch_pairs(&names, 600, 3600, |_, _| true).unwrap();
        assert_eq!(pairs, vec![(0, 2), (3, 4)]);

        let none = find_patch_pairs(&names, 600, 3600, |_, _| false).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_find_pairs_within_cell_only() {
        let neighbours = [named("X0001_Y0001_T201001010000"), named("X0002_Y0001_T201001010020")];
        assert!(find_patch_pairs(&neighbours, 600, 3600, |_, _| true).unwrap().is_empty());

        // Two cells acquired interleaved in time
        let names: Vec<PatchName> = [
            "X0001_Y0001_T201001010000",
            "X0002_Y0001_T201001010020",
            "X0001_Y0001_T201001010030",
            "X0002_Y0001_T201001010045",
        ]
        .iter()
        .map(|s| named(s))
        .collect();

        let pairs = find_patch_pairs(&names, 600, 3600, |a, b| {
            assert_eq!(a.cell, b.cell);
            true
        })
        .unwrap();
        assert_eq!(pairs, vec![(0, 2), (1, 3)]);
    }
}
