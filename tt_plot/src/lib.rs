//! Parsing and statistics for HeFTy time-temperature inversion exports.
//!
//! HeFTy writes its inversion results as a tab-delimited text file. The layout
//! this crate accepts, with 0-based line numbers:
//!
//! | lines                  | content                                                   |
//! |------------------------|-----------------------------------------------------------|
//! | 0..2                   | title and constraints section header, ignored             |
//! | 2..C                   | constraint boxes, numeric cells in columns 1-4            |
//! | C                      | first cell is exactly `Inversion completed`               |
//! | C+1..I                 | run summary, ignored                                      |
//! | I                      | first cell is exactly `Individual paths`                  |
//! | I+1                    | measurement labels in columns 1..=N                       |
//! | I+2..F                 | per-measurement header rows, ignored                      |
//! | F                      | first cell is exactly `Fit`                               |
//! | F+1..                  | path table, two rows per path                             |
//!
//! A constraint row carries, in columns 1-4: oldest time, youngest time,
//! highest temperature, lowest temperature (Ma and degrees C).
//!
//! Each path occupies a row pair. The first row holds the category label in
//! column 0, one modeled date per measurement in columns 1..=N, a separator
//! column, then the time coordinates of the path nodes from column N+2 on.
//! The second row repeats the label, holds one goodness-of-fit value per
//! measurement in columns 1..=N, the separator, then the temperature
//! coordinates. Rows are padded to a common width with empty cells; empty or
//! non-numeric cells parse as NaN. The first pair in the table is HeFTy's
//! best-fit path and is kept apart from the envelope members.
//!
//! [`parse_inversion`] turns one export into an [`Inversion`]; the [`score`]
//! module reduces per-measurement goodness-of-fit values to the per-path
//! scalars used for coloring and draw order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod score;

/// Errors from [`parse_inversion`]. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum TtError {
    #[error("missing '{0}' marker row")]
    MissingMarker(&'static str),
    #[error("no measurement labels on line {line}")]
    MissingMeasurements { line: usize },
    #[error("malformed constraint on line {line}: {reason}")]
    MalformedConstraint { line: usize, reason: String },
    #[error("truncated path table: row starting on line {line} has no partner")]
    TruncatedPathTable { line: usize },
    #[error("path table is empty")]
    EmptyPathTable,
    #[error("path table holds only the best-fit pair")]
    NoIndividualPaths,
}

/// One constraint box the inversion was run against.
///
/// Times are Ma before present, temperatures degrees C. `t_max` is the older
/// edge of the box, `temp_max` the hotter edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub t_max: f64,
    pub t_min: f64,
    pub temp_max: f64,
    pub temp_min: f64,
}

/// HeFTy's own classification of a path, read from the row label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathCategory {
    Best,
    Good,
    Acceptable,
    Unknown,
}

impl PathCategory {
    /// Case-insensitive substring match on the row label. HeFTy writes labels
    /// like `Good 12` or `Acc 3`; anything unrecognized maps to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_ascii_lowercase();
        if lower.contains("best") {
            PathCategory::Best
        } else if lower.contains("good") {
            PathCategory::Good
        } else if lower.contains("acc") {
            PathCategory::Acceptable
        } else {
            PathCategory::Unknown
        }
    }
}

impl std::fmt::Display for PathCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PathCategory::Best => "best",
            PathCategory::Good => "good",
            PathCategory::Acceptable => "acceptable",
            PathCategory::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One time-temperature path with its per-measurement results.
///
/// `dates` and `gofs` are aligned with [`Inversion::measurements`] and may
/// contain NaN where the export left a cell blank. `points` holds the
/// plottable (time Ma, temperature C) nodes; pairs with a non-finite
/// coordinate are dropped, which also strips the padding cells at the end of
/// each row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtPath {
    pub label: String,
    pub category: PathCategory,
    pub dates: Vec<f64>,
    pub gofs: Vec<f64>,
    pub points: Vec<(f64, f64)>,
}

/// A parsed HeFTy export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inversion {
    pub constraints: Vec<Constraint>,
    pub measurements: Vec<String>,
    /// The best-fit path HeFTy puts first in the table.
    pub best_fit: TtPath,
    /// Envelope members in file order, best-fit pair excluded.
    pub paths: Vec<TtPath>,
}

impl Inversion {
    /// Oldest time (Ma) over all path nodes and constraint boxes.
    pub fn time_max(&self) -> f64 {
        let paths = self
            .all_paths()
            .flat_map(|p| p.points.iter().map(|&(t, _)| t));
        let boxes = self.constraints.iter().map(|c| c.t_max);
        paths.chain(boxes).fold(f64::NAN, f64::max)
    }

    /// Highest temperature (C) over all path nodes and constraint boxes.
    pub fn temp_max(&self) -> f64 {
        let paths = self
            .all_paths()
            .flat_map(|p| p.points.iter().map(|&(_, temp)| temp));
        let boxes = self.constraints.iter().map(|c| c.temp_max);
        paths.chain(boxes).fold(f64::NAN, f64::max)
    }

    fn all_paths(&self) -> impl Iterator<Item = &TtPath> {
        std::iter::once(&self.best_fit).chain(self.paths.iter())
    }
}

/// Parses the text of a HeFTy inversion export.
///
/// The format is described in the [module documentation](crate). Blank rows
/// inside the constraint block and after the path table are tolerated; a
/// dangling half pair in the path table is not.
pub fn parse_inversion(text: &str) -> Result<Inversion, TtError> {
    let rows: Vec<Vec<&str>> = text
        .lines()
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            line.split('\t').collect()
        })
        .collect();

    let completed = find_marker(&rows, 0, "Inversion completed")?;
    let individual = find_marker(&rows, completed, "Individual paths")?;
    let fit = find_marker(&rows, individual, "Fit")?;

    let mut constraints = Vec::new();
    for idx in 2..completed {
        let row = &rows[idx];
        if row_is_blank(row) {
            continue;
        }
        constraints.push(parse_constraint(idx + 1, row)?);
    }

    let labels = rows
        .get(individual + 1)
        .ok_or(TtError::MissingMeasurements {
            line: individual + 2,
        })?;
    let measurements: Vec<String> = labels
        .iter()
        .skip(1)
        .take_while(|cell| !cell.trim().is_empty())
        .map(|cell| cell.trim().to_string())
        .collect();
    if measurements.is_empty() {
        return Err(TtError::MissingMeasurements {
            line: individual + 2,
        });
    }

    let mut body = &rows[fit + 1..];
    while let [head @ .., tail] = body {
        if row_is_blank(tail) {
            body = head;
        } else {
            break;
        }
    }
    if body.is_empty() {
        return Err(TtError::EmptyPathTable);
    }
    if body.len() % 2 != 0 {
        return Err(TtError::TruncatedPathTable {
            line: fit + 1 + body.len(),
        });
    }

    let mut pairs = body
        .chunks_exact(2)
        .map(|pair| parse_path_pair(&pair[0], &pair[1], measurements.len()));
    // chunks_exact(2) on a non-empty even body yields at least one pair
    let mut best_fit = pairs.next().ok_or(TtError::EmptyPathTable)?;
    best_fit.category = PathCategory::Best;
    let paths: Vec<TtPath> = pairs.collect();
    if paths.is_empty() {
        return Err(TtError::NoIndividualPaths);
    }

    Ok(Inversion {
        constraints,
        measurements,
        best_fit,
        paths,
    })
}

fn find_marker(rows: &[Vec<&str>], from: usize, marker: &'static str) -> Result<usize, TtError> {
    rows.iter()
        .enumerate()
        .skip(from)
        .find(|(_, row)| row.first().map(|cell| cell.trim()) == Some(marker))
        .map(|(idx, _)| idx)
        .ok_or(TtError::MissingMarker(marker))
}

fn parse_constraint(line: usize, row: &[&str]) -> Result<Constraint, TtError> {
    let cell = |col: usize| {
        row.get(col)
            .map(|c| parse_cell(c))
            .filter(|v| v.is_finite())
            .ok_or_else(|| TtError::MalformedConstraint {
                line,
                reason: format!("column {col} is not numeric"),
            })
    };
    Ok(Constraint {
        t_max: cell(1)?,
        t_min: cell(2)?,
        temp_max: cell(3)?,
        temp_min: cell(4)?,
    })
}

fn parse_path_pair(row_a: &[&str], row_b: &[&str], n: usize) -> TtPath {
    let label = row_a.first().map(|c| c.trim()).unwrap_or("").to_string();
    let dates = numeric_cells(row_a, 1, n);
    let gofs = numeric_cells(row_b, 1, n);
    let times = numeric_tail(row_a, n + 2);
    let temps = numeric_tail(row_b, n + 2);
    let points: Vec<(f64, f64)> = times
        .iter()
        .zip(temps.iter())
        .filter(|(t, temp)| t.is_finite() && temp.is_finite())
        .map(|(&t, &temp)| (t, temp))
        .collect();
    TtPath {
        category: PathCategory::from_label(&label),
        label,
        dates,
        gofs,
        points,
    }
}

fn numeric_cells(row: &[&str], start: usize, count: usize) -> Vec<f64> {
    (start..start + count)
        .map(|i| row.get(i).map(|c| parse_cell(c)).unwrap_or(f64::NAN))
        .collect()
}

fn numeric_tail(row: &[&str], from: usize) -> Vec<f64> {
    row.iter().skip(from).map(|c| parse_cell(c)).collect()
}

fn parse_cell(cell: &str) -> f64 {
    cell.trim().parse().unwrap_or(f64::NAN)
}

fn row_is_blank(row: &[&str]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tsv(rows: &[&[&str]]) -> String {
        rows.iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn fixture() -> String {
        tsv(&[
            &["HeFTy v1.9.3  5/12/2024 16:02"],
            &["Constraint boxes"],
            &["1", "95.0", "65.0", "220.0", "160.0"],
            &["2", "40.0", "10.0", "120.0", "60.0"],
            &["Inversion completed"],
            &["Paths tried", "50000"],
            &["Individual paths"],
            &["", "AHe: KT-07a", "AFT: KT-07a", "", ""],
            &["", "Date (Ma)", "Date (Ma)", "", ""],
            &["Fit", "", "", "", ""],
            &["Best fit", "52.31", "48.77", "", "0.00", "12.00", "35.00", "80.00"],
            &["Best fit", "0.93", "0.88", "", "20.00", "45.00", "105.00", "190.00"],
            &["Good 1", "51.02", "47.65", "", "0.00", "14.50", "40.00", "80.00"],
            &["Good 1", "0.81", "0.74", "", "20.00", "48.00", "110.00", "185.00"],
            &["Good 2", "49.88", "47.01", "", "0.00", "16.00", "44.00", "80.00", ""],
            &["Good 2", "0.64", "0.58", "", "20.00", "52.00", "118.00", "182.00", ""],
            &["Acc 1", "47.40", "45.92", "", "0.00", "22.00", "80.00"],
            &["Acc 1", "0.22", "0.31", "", "20.00", "70.00", "195.00"],
            &["Acc 2", "44.16", "", "", "0.00", "30.00", "80.00"],
            &["Acc 2", "0.12", "", "", "20.00", "85.00", "205.00"],
        ])
    }

    #[test]
    fn parses_fixture_shape() {
        let inv = parse_inversion(&fixture()).unwrap();
        assert_eq!(inv.measurements, vec!["AHe: KT-07a", "AFT: KT-07a"]);
        assert_eq!(inv.constraints.len(), 2);
        assert_eq!(inv.paths.len(), 4);
        assert_eq!(inv.best_fit.label, "Best fit");
        assert_eq!(inv.best_fit.category, PathCategory::Best);
    }

    #[test]
    fn parses_constraint_columns() {
        let inv = parse_inversion(&fixture()).unwrap();
        let c = inv.constraints[0];
        assert_eq!(c.t_max, 95.0);
        assert_eq!(c.t_min, 65.0);
        assert_eq!(c.temp_max, 220.0);
        assert_eq!(c.temp_min, 160.0);
    }

    #[test]
    fn constraint_block_starts_on_line_three() {
        // two preamble rows, then every row up to the marker is a box
        let text = tsv(&[
            &["HeFTy v1.9.3  5/12/2024 16:02"],
            &["Constraint boxes"],
            &["1", "95.0", "65.0", "220.0", "160.0"],
            &["2", "40.0", "10.0", "120.0", "60.0"],
            &["Inversion completed"],
            &["Individual paths"],
            &["", "AHe: KT-07a"],
            &["Fit"],
            &["Best fit", "52.31", "", "0.00", "80.00"],
            &["Best fit", "0.93", "", "20.00", "190.00"],
            &["Good 1", "51.02", "", "0.00", "80.00"],
            &["Good 1", "0.81", "", "20.00", "185.00"],
        ]);
        let inv = parse_inversion(&text).unwrap();
        assert_eq!(inv.constraints.len(), 2);
        assert_eq!(inv.constraints[0].t_max, 95.0);
        assert_eq!(inv.constraints[0].temp_min, 160.0);
        assert_eq!(inv.constraints[1].t_max, 40.0);
    }

    #[test]
    fn no_constraints_falls_back_to_path_extents() {
        let text = tsv(&[
            &["HeFTy v1.9.3  5/12/2024 16:02"],
            &["Constraint boxes"],
            &["Inversion completed"],
            &["Individual paths"],
            &["", "AHe: KT-07a"],
            &["Fit"],
            &["Best fit", "52.31", "", "0.00", "35.00", "80.00"],
            &["Best fit", "0.93", "", "20.00", "105.00", "190.00"],
            &["Good 1", "51.02", "", "0.00", "40.00", "78.00"],
            &["Good 1", "0.81", "", "20.00", "110.00", "185.00"],
        ]);
        let inv = parse_inversion(&text).unwrap();
        assert!(inv.constraints.is_empty());
        assert_eq!(inv.time_max(), 80.0);
        assert_eq!(inv.temp_max(), 190.0);
    }

    #[test]
    fn splits_dates_gofs_and_nodes() {
        let inv = parse_inversion(&fixture()).unwrap();
        let good = &inv.paths[0];
        assert_eq!(good.label, "Good 1");
        assert_eq!(good.category, PathCategory::Good);
        assert_eq!(good.dates, vec![51.02, 47.65]);
        assert_eq!(good.gofs, vec![0.81, 0.74]);
        assert_eq!(
            good.points,
            vec![(0.0, 20.0), (14.5, 48.0), (40.0, 110.0), (80.0, 185.0)]
        );
    }

    #[test]
    fn blank_cells_parse_as_nan() {
        let inv = parse_inversion(&fixture()).unwrap();
        let acc = &inv.paths[3];
        assert_eq!(acc.label, "Acc 2");
        assert_eq!(acc.dates[0], 44.16);
        assert!(acc.dates[1].is_nan());
        assert_eq!(acc.gofs[0], 0.12);
        assert!(acc.gofs[1].is_nan());
        // padding cells never survive into the node list
        assert_eq!(acc.points.len(), 3);
    }

    #[test]
    fn trailing_padding_is_dropped() {
        let inv = parse_inversion(&fixture()).unwrap();
        assert_eq!(inv.paths[1].points.len(), 4);
    }

    #[test]
    fn node_pairing_stops_at_the_shorter_row() {
        // four times against three temperatures
        let mut text = fixture();
        text.push_str("\nGood 3\t50.0\t46.0\t\t0.0\t10.0\t20.0\t30.0");
        text.push_str("\nGood 3\t0.7\t0.6\t\t15.0\t60.0\t110.0");
        let inv = parse_inversion(&text).unwrap();
        let path = inv.paths.last().unwrap();
        assert_eq!(path.points, vec![(0.0, 15.0), (10.0, 60.0), (20.0, 110.0)]);
    }

    #[test]
    fn extrema_cover_paths_and_boxes() {
        let inv = parse_inversion(&fixture()).unwrap();
        assert_eq!(inv.time_max(), 95.0);
        assert_eq!(inv.temp_max(), 220.0);
    }

    #[test]
    fn category_from_label_is_substring_match() {
        assert_eq!(PathCategory::from_label("Best fit"), PathCategory::Best);
        assert_eq!(PathCategory::from_label("GOOD 3"), PathCategory::Good);
        assert_eq!(PathCategory::from_label("Acc 12"), PathCategory::Acceptable);
        assert_eq!(
            PathCategory::from_label("acceptable 4"),
            PathCategory::Acceptable
        );
        assert_eq!(PathCategory::from_label("path 9"), PathCategory::Unknown);
    }

    #[test]
    fn crlf_input_parses() {
        let text = fixture().replace('\n', "\r\n");
        let inv = parse_inversion(&text).unwrap();
        assert_eq!(inv.paths.len(), 4);
        assert_eq!(inv.measurements.len(), 2);
    }

    #[test]
    fn missing_marker_is_an_error() {
        let text = fixture().replace("Individual paths", "Individual");
        let err = parse_inversion(&text).unwrap_err();
        assert!(matches!(err, TtError::MissingMarker("Individual paths")));
    }

    #[test]
    fn dangling_half_pair_is_an_error() {
        let mut text = fixture();
        text.push_str("\nGood 3\t0.5\t0.5\t\t0.0\t80.0");
        let err = parse_inversion(&text).unwrap_err();
        assert!(matches!(err, TtError::TruncatedPathTable { .. }));
    }

    #[test]
    fn empty_path_table_is_an_error() {
        let rows: Vec<String> = fixture().lines().take(10).map(String::from).collect();
        let err = parse_inversion(&rows.join("\n")).unwrap_err();
        assert!(matches!(err, TtError::EmptyPathTable));
    }

    #[test]
    fn best_fit_pair_alone_is_an_error() {
        let rows: Vec<String> = fixture().lines().take(12).map(String::from).collect();
        let err = parse_inversion(&rows.join("\n")).unwrap_err();
        assert!(matches!(err, TtError::NoIndividualPaths));
    }

    #[test]
    fn malformed_constraint_reports_line() {
        let text = fixture().replace("95.0\t65.0", "95.0\tplenty");
        match parse_inversion(&text).unwrap_err() {
            TtError::MalformedConstraint { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
