use itertools::izip;
use ordered_float::OrderedFloat;
use rmpfit::{MPFitter, MPPar, MPResult};
use thiserror::Error;
use tracing::{debug, warn};

use crate::variography::experimental_variogram::ExperimentalVariogram;

use super::{IsoVariogramModel, IsoVariogramType, VariogramModelKind};

/// Smallest range the fitter may propose, relative to the largest lag.
const MIN_RANGE_FRACTION: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("no lags to fit")]
    NoRange,
    #[error("semivariance is zero at every lag")]
    NoSill,
    #[error("invalid sill: {0}")]
    InvalidSill(f64),
    #[error("invalid range: {0}")]
    InvalidRange(f64),
}

/// Bounded least-squares fit of one variogram model to an experimental variogram.
///
/// Parameters are constrained to be non-negative. Initial guesses are
/// derived from the experimental variogram, so the fit is deterministic.
pub struct IsoVariogramFitter {
    pub lags: Vec<f64>,
    pub semivariance: Vec<f64>,
    pub variogram: IsoVariogramType,
    pub mppar_params: Vec<MPPar>,
    initial: Vec<f64>,
}

impl IsoVariogramFitter {
    pub fn new(
        experimental: &ExperimentalVariogram,
        kind: VariogramModelKind,
    ) -> Result<Self, FitError> {
        let max_lag = experimental
            .lags
            .iter()
            .copied()
            .max_by_key(|l| OrderedFloat(*l))
            .map_or_else(
                || Err(FitError::NoRange),
                |x| {
                    if x.is_finite() && x > 0f64 {
                        Ok(x)
                    } else {
                        Err(FitError::InvalidRange(x))
                    }
                },
            )?;
        let min_lag = experimental
            .lags
            .iter()
            .copied()
            .min_by_key(|l| OrderedFloat(*l))
            .unwrap_or(max_lag);

        let max_sill = experimental
            .semivariance
            .iter()
            .copied()
            .max_by_key(|v| OrderedFloat(*v))
            .map_or_else(
                || Err(FitError::NoSill),
                |x| {
                    if x.is_finite() {
                        Ok(x)
                    } else {
                        Err(FitError::InvalidSill(x))
                    }
                },
            )?;
        if max_sill <= 0f64 {
            return Err(FitError::NoSill);
        }
        let min_sill = experimental
            .semivariance
            .iter()
            .copied()
            .min_by_key(|v| OrderedFloat(*v))
            .unwrap_or(0f64);

        let variogram = IsoVariogramType::from_kind(kind);

        let (initial, mppar_params) = match kind {
            VariogramModelKind::Linear => {
                let slope = if max_lag > min_lag {
                    (max_sill - min_sill) / (max_lag - min_lag)
                } else {
                    max_sill / max_lag
                };
                (
                    vec![slope, min_sill],
                    vec![lower_bounded(0f64), bounded(0f64, max_sill)],
                )
            }
            VariogramModelKind::Gaussian | VariogramModelKind::Exponential => {
                let psill = if max_sill > min_sill {
                    max_sill - min_sill
                } else {
                    max_sill
                };
                let min_range = max_lag * MIN_RANGE_FRACTION;
                (
                    vec![psill, (0.25 * max_lag).max(min_range), min_sill],
                    vec![
                        bounded(0f64, 10f64 * max_sill),
                        bounded(min_range, max_lag),
                        bounded(0f64, max_sill),
                    ],
                )
            }
        };

        Ok(Self {
            lags: experimental.lags.clone(),
            semivariance: experimental.semivariance.clone(),
            variogram,
            mppar_params,
            initial,
        })
    }

    pub fn set_params_from_slice(&mut self, params: &[f64]) {
        self.variogram.update_params(params);
    }

    /// Fit the model. When the optimizer cannot run (too few lags for the
    /// number of parameters) or diverges, the initial guess is kept.
    pub fn fit(mut self) -> IsoVariogramType {
        let mut params = self.initial.clone();

        match self.mpfit(params.as_mut_slice()) {
            Ok(status) if params.iter().all(|p| p.is_finite()) => {
                let rss = status.resid.iter().map(|r| r * r).sum::<f64>();
                debug!(rss, "variogram fit converged");
                self.set_params_from_slice(&params);
            }
            Ok(_) => {
                warn!("variogram fit produced non-finite parameters, using initial guess");
                let initial = self.initial.clone();
                self.set_params_from_slice(&initial);
            }
            Err(e) => {
                warn!(error = %e, "variogram fit failed, using initial guess");
                let initial = self.initial.clone();
                self.set_params_from_slice(&initial);
            }
        }

        self.variogram
    }
}

impl MPFitter for IsoVariogramFitter {
    fn eval(&mut self, params: &[f64], deviates: &mut [f64]) -> MPResult<()> {
        //update variogram parameters
        self.set_params_from_slice(params);

        //compute deviates
        for (d, x, y) in izip!(
            deviates.iter_mut(),
            self.lags.iter(),
            self.semivariance.iter()
        ) {
            *d = *y - self.variogram.variogram(*x);
        }

        Ok(())
    }

    fn number_of_points(&self) -> usize {
        self.lags.len()
    }

    fn parameters(&self) -> Option<&[MPPar]> {
        Some(self.mppar_params.as_slice())
    }
}

fn lower_bounded(low: f64) -> MPPar {
    MPPar {
        limited_low: true,
        limit_low: low,
        ..Default::default()
    }
}

fn bounded(low: f64, up: f64) -> MPPar {
    MPPar {
        limited_low: true,
        limit_low: low,
        limited_up: true,
        limit_up: up,
        ..Default::default()
    }
}
