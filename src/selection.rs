//! Turns the user's three menu choices into a fitted model.

use std::collections::HashMap;

use tracing::info;

use crate::align::{AlignmentPolicy, DataAligner};
use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::multiple::MultipleRegressionModel;
use crate::records::{DatasetSnapshot, EmissionColumn, Gas, GasSelection, Species};
use crate::simple::SimpleRegressionModel;

/// The menu page a choice comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Region,
    Species,
    Gas,
}

/// Progress through the menus. Derived from which choices are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    AwaitingRegion,
    AwaitingSpecies,
    AwaitingGas,
    Ready,
}

/// The user's current choices; any of them may be overwritten at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub region: Option<String>,
    pub species: Option<Species>,
    pub gas: Option<GasSelection>,
}

impl SelectionState {
    pub fn state(&self) -> ResolverState {
        if self.region.is_none() {
            ResolverState::AwaitingRegion
        } else if self.species.is_none() {
            ResolverState::AwaitingSpecies
        } else if self.gas.is_none() {
            ResolverState::AwaitingGas
        } else {
            ResolverState::Ready
        }
    }
}

/// A model fitted for one complete selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    Simple(SimpleRegressionModel),
    Multiple(MultipleRegressionModel),
}

impl Model {
    pub fn r_squared(&self) -> f64 {
        match self {
            Model::Simple(model) => model.r_squared(),
            Model::Multiple(model) => model.r_squared(),
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleRegressionModel> {
        match self {
            Model::Simple(model) => Some(model),
            Model::Multiple(_) => None,
        }
    }

    pub fn as_multiple(&self) -> Option<&MultipleRegressionModel> {
        match self {
            Model::Multiple(model) => Some(model),
            Model::Simple(_) => None,
        }
    }
}

/// Records menu choices and builds the matching model on demand.
#[derive(Debug, Clone)]
pub struct SelectionResolver {
    policy: AlignmentPolicy,
    predictors: Vec<Gas>,
    selection: SelectionState,
}

impl Default for SelectionResolver {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

impl SelectionResolver {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            policy: config.alignment.clone(),
            predictors: config.regression.predictors.clone(),
            selection: SelectionState::default(),
        }
    }

    /// Records the display name chosen on `stage`, replacing any earlier choice.
    pub fn record_choice(&mut self, stage: Stage, value: &str) -> Result<ResolverState> {
        match stage {
            Stage::Region => {
                let region = value.trim();
                if region.is_empty() {
                    return Err(CoreError::lookup("region", value));
                }
                self.selection.region = Some(region.to_string());
            }
            Stage::Species => self.selection.species = Some(Species::from_name(value)?),
            Stage::Gas => self.selection.gas = Some(GasSelection::from_name(value)?),
        }
        Ok(self.state())
    }

    pub fn state(&self) -> ResolverState {
        self.selection.state()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn policy(&self) -> &AlignmentPolicy {
        &self.policy
    }

    pub fn build_model(&self, snapshot: &DatasetSnapshot) -> Result<Model> {
        build_model(&self.selection, snapshot, &self.policy, &self.predictors)
    }
}

/// Aligns the selected data and fits a simple or multiple regression.
pub fn build_model(
    selection: &SelectionState,
    snapshot: &DatasetSnapshot,
    policy: &AlignmentPolicy,
    predictors: &[Gas],
) -> Result<Model> {
    let region_name = selection
        .region
        .as_deref()
        .ok_or(CoreError::SelectionIncomplete { missing: "region" })?;
    let species = selection
        .species
        .ok_or(CoreError::SelectionIncomplete { missing: "species" })?;
    let gas = selection
        .gas
        .ok_or(CoreError::SelectionIncomplete { missing: "gas" })?;

    let range = policy.range_for(region_name)?;
    let region = snapshot.region(region_name)?;
    let birds = DataAligner::align(snapshot.population(species)?, range)?;

    let model = match gas {
        GasSelection::Multiple => {
            let columns: Vec<EmissionColumn> =
                predictors.iter().map(|&gas| EmissionColumn::Gas(gas)).collect();
            let aligned = DataAligner::align_columns(region, &columns, range)?;
            let x: HashMap<Gas, Vec<f64>> = predictors.iter().copied().zip(aligned).collect();
            Model::Multiple(MultipleRegressionModel::fit(&x, &birds)?)
        }
        GasSelection::Column(column) => {
            let x = DataAligner::align(&region.column(column), range)?;
            Model::Simple(SimpleRegressionModel::fit(&x, &birds)?)
        }
    };

    info!(
        region = region_name,
        species = %species,
        gas = gas.name(),
        start = range.start(),
        end = range.end(),
        r_squared = model.r_squared(),
        "built regression model"
    );
    Ok(model)
}
