//! Recursive day-by-day forecast engine.

use chrono::{Days, NaiveDate};
use tracing::{debug, info};

use super::clock::DayClock;
use super::types::{EngineConfig, EngineState, ForecastRecord};
use crate::error::ForecastError;
use crate::features::{FeatureSchema, derive};
use crate::history::{HistoryBuffer, Observation};
use crate::model::{Predictor, Target};

/// Rolls a predictor forward over a growing history buffer.
///
/// Each step derives features for the next day, predicts demand and price,
/// and appends the synthesized observation to history. Later steps therefore
/// read earlier *predictions* through their lag, rolling and diff features,
/// and forecast error compounds across the horizon.
///
/// Generic over `P: Predictor` for static dispatch, so tests can drive the
/// loop with stub predictors.
pub struct ForecastEngine<P: Predictor> {
    config: EngineConfig,
    schema: FeatureSchema,
    predictor: P,
    buffer: HistoryBuffer,
    state: EngineState,
}

impl<P: Predictor> ForecastEngine<P> {
    /// Creates an engine in the `Seeding` state.
    ///
    /// # Arguments
    ///
    /// * `config` - Seed floor and optional forecast origin
    /// * `schema` - Ordered feature rules the predictor was trained on
    /// * `predictor` - Scores demand and price from a feature vector
    pub fn new(config: EngineConfig, schema: FeatureSchema, predictor: P) -> Self {
        Self {
            config,
            schema,
            predictor,
            buffer: HistoryBuffer::default(),
            state: EngineState::Seeding,
        }
    }

    /// Loads seed history and moves to `Stepping`.
    ///
    /// # Errors
    ///
    /// * `InsufficientSeed` - fewer rows than the schema's lookback (at least 7)
    /// * `TimestampCollision` / `NonContiguousHistory` - unordered or gapped
    ///   rows, or a configured start date that overlaps or leaves a gap after
    ///   the history
    /// * `EngineFinished` - the engine was already seeded
    pub fn seed(&mut self, rows: Vec<Observation>) -> Result<(), ForecastError> {
        if self.state != EngineState::Seeding {
            return Err(ForecastError::EngineFinished);
        }

        let required = self.required_seed();
        if rows.len() < required {
            return Err(ForecastError::InsufficientSeed {
                required,
                available: rows.len(),
            });
        }

        let buffer = HistoryBuffer::load(rows)?;
        let last = buffer.latest()?.date();
        if let Some(start) = self.config.start_date {
            if start <= last {
                return Err(ForecastError::TimestampCollision { date: start, last });
            }
            let expected = next_day(last)?;
            if start != expected {
                return Err(ForecastError::NonContiguousHistory {
                    expected,
                    found: start,
                });
            }
        }

        info!(rows = buffer.len(), %last, "seeded forecast history");
        self.buffer = buffer;
        self.state = EngineState::Stepping { completed: 0 };
        Ok(())
    }

    /// Produces the forecast for the day after the latest buffered row.
    pub fn step(&mut self) -> Result<ForecastRecord, ForecastError> {
        let date = match self.state {
            EngineState::Seeding => return Err(ForecastError::NotSeeded),
            EngineState::Done => return Err(ForecastError::EngineFinished),
            EngineState::Stepping { .. } => next_day(self.buffer.latest()?.date())?,
        };
        self.advance(date)
    }

    /// Runs exactly `n_days` steps and finishes the run.
    ///
    /// Only this run's records are returned; rows from earlier [`ForecastEngine::step`]
    /// calls stay in history but are not repeated. On any error the run is aborted and no partial forecast is returned.
    ///
    /// # Errors
    ///
    /// `InvalidHorizon` for `n_days == 0`, plus anything [`ForecastEngine::step`]
    /// can return.
    pub fn run(&mut self, n_days: usize) -> Result<Vec<ForecastRecord>, ForecastError> {
        if n_days == 0 {
            return Err(ForecastError::InvalidHorizon(n_days));
        }
        let first = match self.state {
            EngineState::Seeding => return Err(ForecastError::NotSeeded),
            EngineState::Done => return Err(ForecastError::EngineFinished),
            EngineState::Stepping { .. } => next_day(self.buffer.latest()?.date())?,
        };

        let mut records = Vec::with_capacity(n_days);
        let mut clock = DayClock::new(first, n_days);
        while let Some((_, date)) = clock.tick() {
            match self.advance(date) {
                Ok(record) => records.push(record),
                Err(e) => {
                    self.state = EngineState::Done;
                    return Err(e);
                }
            }
        }

        self.state = EngineState::Done;
        info!(days = n_days, "forecast run complete");
        Ok(records)
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// History as it stands: seed rows followed by synthesized rows.
    pub fn history(&self) -> &HistoryBuffer {
        &self.buffer
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Seed rows needed: the larger of the configured floor and the schema's lookback.
    pub fn required_seed(&self) -> usize {
        self.config.min_seed_rows.max(self.schema.min_seed())
    }

    fn advance(&mut self, date: NaiveDate) -> Result<ForecastRecord, ForecastError> {
        let EngineState::Stepping { completed } = self.state else {
            return Err(ForecastError::NotSeeded);
        };

        // 1. Features for `date`, read from the current tail
        let features = derive(&self.buffer, &self.schema)?;

        // 2. Both targets from the same vector
        let predicted_demand = self.predictor.predict(Target::Demand, &features)?;
        let predicted_price = self.predictor.predict(Target::Price, &features)?;

        // 3. Synthesized row: exogenous fields carried forward, no weather forecast
        let next = self
            .buffer
            .latest()?
            .carried_to(date, predicted_demand, predicted_price);

        // 4. Feed the prediction back into history
        self.buffer.append(next)?;

        // 5. Record
        let record = ForecastRecord {
            date,
            predicted_demand,
            predicted_price,
        };
        debug!(
            step = completed,
            %date,
            demand = predicted_demand,
            price = predicted_price,
            "forecast step"
        );
        self.state = EngineState::Stepping {
            completed: completed + 1,
        };
        Ok(record)
    }
}

/// Seeds a fresh engine and runs it for `n_days`.
pub fn forecast<P: Predictor>(
    config: EngineConfig,
    schema: FeatureSchema,
    predictor: P,
    rows: Vec<Observation>,
    n_days: usize,
) -> Result<Vec<ForecastRecord>, ForecastError> {
    if n_days == 0 {
        return Err(ForecastError::InvalidHorizon(n_days));
    }
    let mut engine = ForecastEngine::new(config, schema, predictor);
    engine.seed(rows)?;
    engine.run(n_days)
}

fn next_day(date: NaiveDate) -> Result<NaiveDate, ForecastError> {
    date.checked_add_days(Days::new(1))
        .ok_or(ForecastError::CalendarOverflow(date))
}
