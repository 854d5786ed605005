//! The output analysis module provides aggregate queueing metrics over a
//! simulation's customer record log.  Aggregation is a thin consumer of
//! the log - it holds no simulation state and can be computed for any
//! prefix of a run.

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::simulator::{CustomerRecord, ServerId};
use crate::utils::errors::SimulationError;

fn sum<T: Float>(points: &[T]) -> T
where
    f64: Into<T>,
{
    points.iter().fold(0.0.into(), |sum, point| sum + *point)
}

/// This function calculates the sample mean from a set of points - a simple
/// arithmetic mean.
fn sample_mean<T: Float>(points: &[T]) -> Result<T, SimulationError>
where
    f64: Into<T>,
{
    Ok(sum(points) / usize_to_float(points.len())?)
}

/// This function calculates sample variance, given a set of points and the
/// sample mean.
fn sample_variance<T: Float>(points: &[T], mean: &T) -> Result<T, SimulationError>
where
    f64: Into<T>,
{
    Ok(points
        .iter()
        .fold(0.0.into(), |acc, point| acc + (*point - *mean).powi(2))
        / usize_to_float(points.len())?)
}

/// This function converts a usize to a Float, with an associated
/// `SimulationError` returned for failed conversions
fn usize_to_float<T: Float>(unconv: usize) -> Result<T, SimulationError> {
    T::from(unconv).ok_or(SimulationError::FloatConvError)
}

/// The `SimulationSummary` holds the standard teaching metrics of a
/// two-server queueing run, computed once from the customer log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    customers: usize,
    average_queue_wait: f64,
    queue_wait_variance: f64,
    waiting_proportion: f64,
    average_service_time: f64,
    average_inter_arrival: f64,
    average_time_in_system: f64,
    completion_clock: f64,
    server_1_utilization: f64,
    server_2_utilization: f64,
}

impl SimulationSummary {
    /// This constructor method computes the summary statistics from an
    /// ordered customer log.
    pub fn post(records: &[CustomerRecord]) -> Result<Self, SimulationError> {
        if records.is_empty() {
            return Err(SimulationError::EmptyRecordLog);
        }
        let queue_waits: Vec<f64> = records.iter().map(|record| record.queue_wait).collect();
        let average_queue_wait = sample_mean(&queue_waits)?;
        let queue_wait_variance = sample_variance(&queue_waits, &average_queue_wait)?;
        let waiting_proportion = records
            .iter()
            .filter(|record| record.queue_wait > 0.0)
            .count() as f64
            / records.len() as f64;
        let service_times: Vec<f64> = records.iter().map(|record| record.service_time).collect();
        let average_service_time = sample_mean(&service_times)?;
        let inter_arrivals: Vec<f64> = records
            .iter()
            .filter_map(|record| record.inter_arrival)
            .collect();
        let average_inter_arrival = if inter_arrivals.is_empty() {
            0.0
        } else {
            sample_mean(&inter_arrivals)?
        };
        let times_in_system: Vec<f64> = records
            .iter()
            .map(|record| record.service_end - record.arrival_clock)
            .collect();
        let average_time_in_system = sample_mean(&times_in_system)?;
        let completion_clock = records
            .iter()
            .fold(0.0, |max, record| f64::max(max, record.service_end));
        Ok(Self {
            customers: records.len(),
            average_queue_wait,
            queue_wait_variance,
            waiting_proportion,
            average_service_time,
            average_inter_arrival,
            average_time_in_system,
            completion_clock,
            server_1_utilization: busy_fraction(records, ServerId::Server1, completion_clock),
            server_2_utilization: busy_fraction(records, ServerId::Server2, completion_clock),
        })
    }

    pub fn customers(&self) -> usize {
        self.customers
    }

    pub fn average_queue_wait(&self) -> f64 {
        self.average_queue_wait
    }

    pub fn queue_wait_variance(&self) -> f64 {
        self.queue_wait_variance
    }

    /// The fraction of customers who waited in the queue before service.
    pub fn waiting_proportion(&self) -> f64 {
        self.waiting_proportion
    }

    pub fn average_service_time(&self) -> f64 {
        self.average_service_time
    }

    pub fn average_inter_arrival(&self) -> f64 {
        self.average_inter_arrival
    }

    pub fn average_time_in_system(&self) -> f64 {
        self.average_time_in_system
    }

    /// The clock at which the last service completes.
    pub fn completion_clock(&self) -> f64 {
        self.completion_clock
    }

    /// The fraction of the run a server spent serving customers.
    pub fn utilization(&self, server: ServerId) -> f64 {
        match server {
            ServerId::Server1 => self.server_1_utilization,
            ServerId::Server2 => self.server_2_utilization,
        }
    }
}

fn busy_fraction(records: &[CustomerRecord], server: ServerId, completion_clock: f64) -> f64 {
    let busy: f64 = records
        .iter()
        .filter(|record| record.server == server)
        .map(|record| record.service_time)
        .sum();
    busy / completion_clock
}
