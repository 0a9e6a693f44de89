//! Trimming year-indexed series onto a common inclusive year range.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::records::{EmissionColumn, RegionSeries, YearSeries};

/// Inclusive range of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(CoreError::Range {
                start,
                end,
                reason: "start year is after end year".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn len(&self) -> usize {
        (i64::from(self.end) - i64::from(self.start)) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

/// Aligns series onto a [`YearRange`]. Missing years are an error, never imputed.
pub struct DataAligner;

impl DataAligner {
    /// Returns the values for every year of `range`, oldest first.
    ///
    /// # Example
    /// ```
    /// use std::collections::BTreeMap;
    /// use bird_ghg::align::{DataAligner, YearRange};
    /// use bird_ghg::records::{PopulationSeries, Species};
    ///
    /// let by_year: BTreeMap<i32, f64> = (1990..=2016).map(|y| (y, y as f64)).collect();
    /// let birds = PopulationSeries::new(Species::Seabirds, by_year);
    /// let values = DataAligner::align(&birds, YearRange::new(2000, 2002).unwrap()).unwrap();
    /// assert_eq!(values, vec![2000.0, 2001.0, 2002.0]);
    /// ```
    pub fn align<S: YearSeries + ?Sized>(series: &S, range: YearRange) -> Result<Vec<f64>> {
        let values = range
            .years()
            .map(|year| {
                series.value(year).ok_or_else(|| CoreError::Range {
                    start: range.start,
                    end: range.end,
                    reason: format!("year {year} missing from series"),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        debug!(
            start = range.start,
            end = range.end,
            points = values.len(),
            "aligned series"
        );
        Ok(values)
    }

    /// Aligns several columns of one region to the same range.
    pub fn align_columns(
        region: &RegionSeries,
        columns: &[EmissionColumn],
        range: YearRange,
    ) -> Result<Vec<Vec<f64>>> {
        columns
            .iter()
            .map(|&column| Self::align(&region.column(column), range))
            .collect()
    }
}

fn default_start_overrides() -> BTreeMap<String, i32> {
    // Emission records for these territories begin in 1999.
    BTreeMap::from([
        ("Northwest Territories".to_string(), 1999),
        ("Nunavut".to_string(), 1999),
    ])
}

/// Which years a region's data is aligned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentPolicy {
    pub default_start: i32,
    pub end: i32,
    /// Regions whose series start later than `default_start`.
    pub start_overrides: BTreeMap<String, i32>,
}

impl Default for AlignmentPolicy {
    fn default() -> Self {
        Self {
            default_start: 1990,
            end: 2016,
            start_overrides: default_start_overrides(),
        }
    }
}

impl AlignmentPolicy {
    pub fn start_year(&self, region: &str) -> i32 {
        self.start_overrides
            .get(region)
            .copied()
            .unwrap_or(self.default_start)
    }

    pub fn range_for(&self, region: &str) -> Result<YearRange> {
        YearRange::new(self.start_year(region), self.end)
    }
}
