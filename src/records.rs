//! Closed enumerations and year-indexed data containers.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// One of the seven greenhouse gases reported per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gas {
    Co2,
    Ch4,
    N2o,
    Hfc,
    Pfc,
    Sf6,
    Nf3,
}

const GAS_TABLE: [(Gas, &str, &str); 7] = [
    (Gas::Co2, "CO2", "co2"),
    (Gas::Ch4, "CH4", "ch4"),
    (Gas::N2o, "N2O", "n2o"),
    (Gas::Hfc, "HFC", "hfc"),
    (Gas::Pfc, "PFC", "pfc"),
    (Gas::Sf6, "SF6", "sf6"),
    (Gas::Nf3, "NF3", "nf3"),
];

impl Gas {
    /// All gases in display and column order.
    pub const ALL: [Gas; 7] = [
        Gas::Co2,
        Gas::Ch4,
        Gas::N2o,
        Gas::Hfc,
        Gas::Pfc,
        Gas::Sf6,
        Gas::Nf3,
    ];

    /// Column index within an emission record (0-6).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Gas::ALL
            .get(index)
            .copied()
            .ok_or_else(|| CoreError::lookup("gas", index.to_string()))
    }

    /// Display name, e.g. `CO2`.
    pub fn name(self) -> &'static str {
        GAS_TABLE[self.index()].1
    }

    /// Lowercase key used for regression data columns.
    pub fn key(self) -> &'static str {
        GAS_TABLE[self.index()].2
    }

    /// Case-insensitive lookup by display name or key.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        GAS_TABLE
            .iter()
            .find(|(_, display, _)| display.eq_ignore_ascii_case(name))
            .map(|(gas, _, _)| *gas)
            .ok_or_else(|| CoreError::lookup("gas", name))
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the eight numeric columns of a region's yearly record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmissionColumn {
    Gas(Gas),
    Total,
}

impl EmissionColumn {
    pub const TOTAL_INDEX: usize = 7;

    pub fn index(self) -> usize {
        match self {
            EmissionColumn::Gas(gas) => gas.index(),
            EmissionColumn::Total => Self::TOTAL_INDEX,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EmissionColumn::Gas(gas) => gas.name(),
            EmissionColumn::Total => "Total",
        }
    }
}

/// What the user picked on the gas page: a single column, or every gas at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GasSelection {
    Column(EmissionColumn),
    Multiple,
}

impl GasSelection {
    /// Index used by the menu for the multiple-regression button.
    pub const MULTIPLE_INDEX: usize = 9;

    pub fn index(self) -> usize {
        match self {
            GasSelection::Column(column) => column.index(),
            GasSelection::Multiple => Self::MULTIPLE_INDEX,
        }
    }

    /// Maps 0-6 to a gas, 7 to the total and 9 to multiple regression.
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            EmissionColumn::TOTAL_INDEX => Ok(GasSelection::Column(EmissionColumn::Total)),
            Self::MULTIPLE_INDEX => Ok(GasSelection::Multiple),
            i => Gas::from_index(i).map(|gas| GasSelection::Column(EmissionColumn::Gas(gas))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GasSelection::Column(column) => column.name(),
            GasSelection::Multiple => "Multiple Regression",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        if trimmed.eq_ignore_ascii_case("total") {
            return Ok(GasSelection::Column(EmissionColumn::Total));
        }
        if trimmed.eq_ignore_ascii_case("multiple regression")
            || trimmed.eq_ignore_ascii_case("multiple")
        {
            return Ok(GasSelection::Multiple);
        }
        Gas::from_name(trimmed).map(|gas| GasSelection::Column(EmissionColumn::Gas(gas)))
    }
}

/// Bird population category, numbered by its column in the raw bird data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    Waterfowl,
    BirdsOfPrey,
    WetlandBirds,
    Seabirds,
    ForestBirds,
    AllOtherBirds,
    Shorebirds,
    GrasslandBirds,
    AerialInsectivores,
}

const SPECIES_TABLE: [(Species, &str); 9] = [
    (Species::Waterfowl, "Waterfowl"),
    (Species::BirdsOfPrey, "Birds of Prey"),
    (Species::WetlandBirds, "Wetland Birds"),
    (Species::Seabirds, "Seabirds"),
    (Species::ForestBirds, "Forest Birds"),
    (Species::AllOtherBirds, "All Other Birds"),
    (Species::Shorebirds, "Shorebirds"),
    (Species::GrasslandBirds, "Grassland Birds"),
    (Species::AerialInsectivores, "Aerial Insectivores"),
];

impl Species {
    pub const ALL: [Species; 9] = [
        Species::Waterfowl,
        Species::BirdsOfPrey,
        Species::WetlandBirds,
        Species::Seabirds,
        Species::ForestBirds,
        Species::AllOtherBirds,
        Species::Shorebirds,
        Species::GrasslandBirds,
        Species::AerialInsectivores,
    ];

    /// Column of this species in a raw bird data row.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Species::ALL
            .get(index)
            .copied()
            .ok_or_else(|| CoreError::lookup("species", index.to_string()))
    }

    pub fn name(self) -> &'static str {
        SPECIES_TABLE[self.index()].1
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        SPECIES_TABLE
            .iter()
            .find(|(_, display)| display.eq_ignore_ascii_case(name))
            .map(|(species, _)| *species)
            .ok_or_else(|| CoreError::lookup("species", name))
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Emissions of one region in one year, in kilotonnes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub year: i32,
    pub region: String,
    pub co2: f64,
    pub ch4: f64,
    pub n2o: f64,
    pub hfc: f64,
    pub pfc: f64,
    pub sf6: f64,
    pub nf3: f64,
    pub total: f64,
}

impl EmissionRecord {
    /// The eight columns in index order, total last.
    pub fn columns(&self) -> [f64; 8] {
        [
            self.co2, self.ch4, self.n2o, self.hfc, self.pfc, self.sf6, self.nf3, self.total,
        ]
    }
}

/// A series of values keyed by year.
pub trait YearSeries {
    fn value(&self, year: i32) -> Option<f64>;

    /// Covered years in ascending order.
    fn years(&self) -> Vec<i32>;
}

/// All emission columns of one region keyed by year.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSeries {
    region: String,
    by_year: BTreeMap<i32, [f64; 8]>,
}

impl RegionSeries {
    pub fn from_records(records: &[EmissionRecord]) -> Result<Self> {
        let first = records
            .first()
            .ok_or_else(|| CoreError::InvalidData("no emission records for region".to_string()))?;
        let region = first.region.clone();

        let mut by_year = BTreeMap::new();
        for record in records {
            if record.region != region {
                return Err(CoreError::InvalidData(format!(
                    "record for '{}' mixed into series for '{}'",
                    record.region, region
                )));
            }
            if by_year.insert(record.year, record.columns()).is_some() {
                return Err(CoreError::DuplicateYear {
                    region,
                    year: record.year,
                });
            }
        }

        Ok(Self { region, by_year })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn first_year(&self) -> Option<i32> {
        self.by_year.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.by_year.keys().next_back().copied()
    }

    /// Borrowed view of a single column.
    pub fn column(&self, column: EmissionColumn) -> ColumnView<'_> {
        ColumnView {
            series: self,
            index: column.index(),
        }
    }
}

/// One column of a [`RegionSeries`].
#[derive(Debug, Clone, Copy)]
pub struct ColumnView<'a> {
    series: &'a RegionSeries,
    index: usize,
}

impl YearSeries for ColumnView<'_> {
    fn value(&self, year: i32) -> Option<f64> {
        self.series.by_year.get(&year).map(|row| row[self.index])
    }

    fn years(&self) -> Vec<i32> {
        self.series.by_year.keys().copied().collect()
    }
}

/// Percentage change since 1970 of one bird category, keyed by year.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationSeries {
    species: Species,
    by_year: BTreeMap<i32, f64>,
}

impl PopulationSeries {
    pub fn new(species: Species, by_year: BTreeMap<i32, f64>) -> Self {
        Self { species, by_year }
    }

    /// Parses the species' column out of raw per-year string rows.
    pub fn from_raw_columns(raw: &BTreeMap<i32, Vec<String>>, species: Species) -> Result<Self> {
        let column = species.index();
        let mut by_year = BTreeMap::new();
        for (&year, row) in raw {
            let cell = row.get(column).ok_or_else(|| {
                CoreError::lookup("species column", format!("{column} in year {year}"))
            })?;
            let value = cell
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    CoreError::InvalidData(format!(
                        "year {year}: '{cell}' is not a finite number for {species}"
                    ))
                })?;
            by_year.insert(year, value);
        }
        Ok(Self { species, by_year })
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn len(&self) -> usize {
        self.by_year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}

impl YearSeries for PopulationSeries {
    fn value(&self, year: i32) -> Option<f64> {
        self.by_year.get(&year).copied()
    }

    fn years(&self) -> Vec<i32> {
        self.by_year.keys().copied().collect()
    }
}

/// Read-only view of every dataset the core works with.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    regions: HashMap<String, RegionSeries>,
    populations: HashMap<Species, PopulationSeries>,
}

impl DatasetSnapshot {
    /// Builds the snapshot from region-grouped records and raw bird rows.
    ///
    /// Every record under a key must name that key as its region.
    pub fn from_raw(
        emissions: &HashMap<String, Vec<EmissionRecord>>,
        birds: &BTreeMap<i32, Vec<String>>,
    ) -> Result<Self> {
        let regions = emissions
            .iter()
            .map(|(name, records)| {
                let series = RegionSeries::from_records(records)?;
                if series.region() != name {
                    return Err(CoreError::InvalidData(format!(
                        "records for '{}' filed under '{name}'",
                        series.region()
                    )));
                }
                Ok((name.clone(), series))
            })
            .collect::<Result<HashMap<_, _>>>()?;
        let populations = Species::ALL
            .iter()
            .map(|&species| Ok((species, PopulationSeries::from_raw_columns(birds, species)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self {
            regions,
            populations,
        })
    }

    pub fn region(&self, name: &str) -> Result<&RegionSeries> {
        self.regions
            .get(name)
            .ok_or_else(|| CoreError::lookup("region", name))
    }

    pub fn population(&self, species: Species) -> Result<&PopulationSeries> {
        self.populations
            .get(&species)
            .ok_or_else(|| CoreError::lookup("species", species.name()))
    }

    /// Region names in alphabetical order.
    pub fn region_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.regions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
