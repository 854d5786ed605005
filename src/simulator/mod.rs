//! The simulator module provides the mechanics to advance a two-server
//! queueing system customer-by-customer.  User interaction is also
//! captured in this module - simulation stepping and manual variate
//! injection.  When the manual variate strategy is selected and its queue
//! is exhausted, a step suspends at a well-defined point (awaiting an
//! arrival or service variate) and the caller resumes it by supplying one
//! value; the resumed step continues from the suspension point without
//! re-consuming any variate already obtained for that customer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::input_modeling::{DistributionRow, DistributionTable, VariateDraw, VariateSource};
use crate::utils::errors::SimulationError;

pub mod server_pool;

pub use self::server_pool::{Assignment, ServerId, ServerPool};

/// The two stopping modes: halt once a customer's arrival clock reaches
/// the limit, or once a customer's service completion reaches the limit.
/// Both boundaries are inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoppingRule {
    ArrivalClock { limit: f64 },
    ServiceCompletion { limit: f64 },
}

impl StoppingRule {
    fn limit(&self) -> f64 {
        match self {
            StoppingRule::ArrivalClock { limit } => *limit,
            StoppingRule::ServiceCompletion { limit } => *limit,
        }
    }

    fn is_met(&self, record: &CustomerRecord) -> bool {
        match self {
            StoppingRule::ArrivalClock { limit } => record.arrival_clock >= *limit,
            StoppingRule::ServiceCompletion { limit } => record.service_end >= *limit,
        }
    }
}

/// The pseudo-random generation strategy for a simulation, with its
/// parameters.  The manual strategy may carry pre-supplied values for
/// each stream; further values arrive through `Simulation::resume`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RandomMethod {
    Manual {
        #[serde(default)]
        arrival_values: Vec<f64>,
        #[serde(default)]
        service_values: Vec<f64>,
    },
    Lcg {
        multiplier: u64,
        increment: u64,
        modulus: u64,
        seed: u64,
    },
    MidSquare {
        seed: u32,
    },
}

impl RandomMethod {
    /// Each simulation stream receives its own independently-stated
    /// generator instance; state is never shared between the arrival and
    /// service streams.
    fn sources(&self) -> Result<(VariateSource, VariateSource), SimulationError> {
        match self {
            RandomMethod::Manual {
                arrival_values,
                service_values,
            } => Ok((
                VariateSource::manual(arrival_values.clone())?,
                VariateSource::manual(service_values.clone())?,
            )),
            RandomMethod::Lcg {
                multiplier,
                increment,
                modulus,
                seed,
            } => Ok((
                VariateSource::lcg(*multiplier, *increment, *modulus, *seed)?,
                VariateSource::lcg(*multiplier, *increment, *modulus, *seed)?,
            )),
            RandomMethod::MidSquare { seed } => Ok((
                VariateSource::mid_square(*seed)?,
                VariateSource::mid_square(*seed)?,
            )),
        }
    }
}

/// The full configuration of a simulation: the arrival and per-server
/// service distribution specifications, the digit scale, the stopping
/// rule, and the variate generation method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub arrival_rows: Vec<DistributionRow>,
    pub service_rows_1: Vec<DistributionRow>,
    pub service_rows_2: Vec<DistributionRow>,
    #[serde(default = "default_scale")]
    pub scale: u32,
    pub stopping_rule: StoppingRule,
    pub random_method: RandomMethod,
}

fn default_scale() -> u32 {
    100
}

/// The variate the simulation is suspended on, and the customer it
/// belongs to.  Inspection has no side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PendingInput {
    AwaitingArrival { customer: usize },
    AwaitingService { customer: usize },
}

/// One customer's row of the simulation table.  Created once per step and
/// immutable after creation.  Customer 1 is special: no arrival variate
/// is consumed and the arrival clock is 0, so the arrival digit and
/// inter-arrival time are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub index: usize,
    pub arrival_digit: Option<u32>,
    pub inter_arrival: Option<f64>,
    pub arrival_clock: f64,
    pub service_digit: u32,
    pub server: ServerId,
    pub service_begin: f64,
    pub service_time: f64,
    pub service_end: f64,
    pub queue_wait: f64,
}

/// The product of one step or resume call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepOutcome {
    /// A customer record was appended to the simulation log
    Customer(CustomerRecord),
    /// The step suspended; the caller must supply one manual value
    AwaitingInput(PendingInput),
    /// The stopping rule was already met; the call was a no-op
    Complete,
}

/// Partial progress of a suspended step.  The arrival variate is stashed
/// here once drawn, so a step that suspends on the service variate never
/// re-consumes the arrival variate when resumed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InFlight {
    arrival_digit: Option<u32>,
}

/// The `Simulation` struct is the core of queue-step-sim, and includes
/// everything needed to run a simulation - the distribution tables, the
/// two variate streams, the server pool, and the stopping rule.  State
/// information, specifically the customer log and any pending-input
/// suspension, is additionally retained in the struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    arrival_table: DistributionTable,
    service_table_1: DistributionTable,
    service_table_2: DistributionTable,
    arrival_source: VariateSource,
    service_source: VariateSource,
    server_pool: ServerPool,
    stopping_rule: StoppingRule,
    customers: Vec<CustomerRecord>,
    pending_input: Option<PendingInput>,
    in_flight: InFlight,
    stopped: bool,
}

impl Simulation {
    /// This constructor method creates a simulation from a supplied
    /// configuration.  All validation happens here, before any simulation
    /// step runs - invalid generator parameters, a non-positive stopping
    /// limit, or distribution probabilities summing past one are surfaced
    /// immediately and never silently corrected.
    pub fn post(config: SimulationConfig) -> Result<Self, SimulationError> {
        if config.stopping_rule.limit() <= 0.0 {
            return Err(SimulationError::InvalidStoppingLimit);
        }
        let arrival_table = DistributionTable::post(config.arrival_rows, config.scale)?;
        let service_table_1 = DistributionTable::post(config.service_rows_1, config.scale)?;
        let service_table_2 = DistributionTable::post(config.service_rows_2, config.scale)?;
        let (arrival_source, service_source) = config.random_method.sources()?;
        Ok(Self {
            arrival_table,
            service_table_1,
            service_table_2,
            arrival_source,
            service_source,
            server_pool: ServerPool::default(),
            stopping_rule: config.stopping_rule,
            customers: Vec::new(),
            pending_input: None,
            in_flight: InFlight::default(),
            stopped: false,
        })
    }

    /// This constructor method creates a simulation from a JSON
    /// representation of the configuration.
    pub fn post_json(config: &str) -> Result<Self, SimulationError> {
        Self::post(serde_json::from_str(config)?)
    }

    /// An accessor method for the ordered customer log.
    pub fn get_customers(&self) -> &Vec<CustomerRecord> {
        &self.customers
    }

    /// An accessor method for the pending-input signal.  `None` means the
    /// next step needs no external value.
    pub fn get_pending_input(&self) -> Option<PendingInput> {
        self.pending_input
    }

    /// An accessor method for the server pool clocks.
    pub fn get_server_pool(&self) -> &ServerPool {
        &self.server_pool
    }

    /// The simulation is complete once the stopping rule has been met;
    /// further steps are no-ops.
    pub fn is_complete(&self) -> bool {
        self.stopped
    }

    /// The simulation step is foundational - it processes exactly one
    /// customer: an arrival variate (customers after the first), a
    /// service variate, a distribution lookup for each, a server pool
    /// assignment, and the stopping rule evaluation.  When a manual
    /// variate stream is exhausted the step suspends, mutating nothing
    /// beyond the pending-input signal and any variate already stashed
    /// for this customer.
    pub fn step(&mut self) -> Result<StepOutcome, SimulationError> {
        if self.stopped {
            return Ok(StepOutcome::Complete);
        }
        let index = self.customers.len() + 1;
        let (arrival_digit, inter_arrival, arrival_clock) = if index == 1 {
            (None, None, 0.0)
        } else {
            let digit = match self.in_flight.arrival_digit {
                Some(digit) => digit,
                None => match self.arrival_source.next() {
                    VariateDraw::Value(value) => {
                        let digit = VariateSource::to_digit(value, self.arrival_table.scale());
                        self.in_flight.arrival_digit = Some(digit);
                        digit
                    }
                    VariateDraw::NeedsInput => {
                        return Ok(self.suspend(PendingInput::AwaitingArrival { customer: index }))
                    }
                },
            };
            let inter_arrival = self.arrival_table.lookup(digit);
            let previous_clock = self.customers[index - 2].arrival_clock;
            (
                Some(digit),
                Some(inter_arrival),
                previous_clock + inter_arrival,
            )
        };
        let service_digit = match self.service_source.next() {
            VariateDraw::Value(value) => {
                VariateSource::to_digit(value, self.service_table_1.scale())
            }
            VariateDraw::NeedsInput => {
                return Ok(self.suspend(PendingInput::AwaitingService { customer: index }))
            }
        };
        // Both service times are looked up before the assignment decision,
        // because the decision can pick either server
        let service_1 = self.service_table_1.lookup(service_digit);
        let service_2 = self.service_table_2.lookup(service_digit);
        let assignment = self
            .server_pool
            .assign(arrival_clock, service_1, service_2);
        let record = CustomerRecord {
            index,
            arrival_digit,
            inter_arrival,
            arrival_clock,
            service_digit,
            server: assignment.server,
            service_begin: assignment.begin,
            service_time: assignment.end - assignment.begin,
            service_end: assignment.end,
            queue_wait: assignment.queue_wait,
        };
        self.customers.push(record.clone());
        self.in_flight = InFlight::default();
        self.pending_input = None;
        if self.stopping_rule.is_met(&record) {
            debug![customer = record.index, "stopping rule met"];
            self.stopped = true;
        }
        Ok(StepOutcome::Customer(record))
    }

    /// This method supplies one manual value while the simulation is
    /// suspended, and re-invokes the step logic from the suspension
    /// point.  Arrival and service variates are each consumed at most
    /// once per customer, even across suspension boundaries.
    pub fn resume(&mut self, value: f64) -> Result<StepOutcome, SimulationError> {
        match self.pending_input {
            Some(PendingInput::AwaitingArrival { .. }) => self.arrival_source.supply(value)?,
            Some(PendingInput::AwaitingService { .. }) => self.service_source.supply(value)?,
            None => return Err(SimulationError::NotAwaitingInput),
        }
        self.step()
    }

    /// This method executes simulation steps until the stopping rule is
    /// met, for use with the generator strategies.  A manual stream
    /// running dry is an error here - interactive callers drive `step`
    /// and `resume` themselves.
    pub fn run_to_completion(&mut self) -> Result<&Vec<CustomerRecord>, SimulationError> {
        loop {
            match self.step()? {
                StepOutcome::Customer(_) => {}
                StepOutcome::AwaitingInput(_) => return Err(SimulationError::AwaitingManualValue),
                StepOutcome::Complete => return Ok(&self.customers),
            }
        }
    }

    fn suspend(&mut self, pending: PendingInput) -> StepOutcome {
        debug![?pending, "suspending for a manual variate"];
        self.pending_input = Some(pending);
        StepOutcome::AwaitingInput(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_rows(values: &[f64]) -> Vec<DistributionRow> {
        let probability = 1.0 / values.len() as f64;
        values
            .iter()
            .map(|value| DistributionRow {
                value: *value,
                probability,
            })
            .collect()
    }

    fn manual_config(arrival_values: Vec<f64>, service_values: Vec<f64>) -> SimulationConfig {
        SimulationConfig {
            arrival_rows: uniform_rows(&[1.0, 2.0, 3.0, 4.0]),
            service_rows_1: uniform_rows(&[2.0, 3.0, 4.0, 5.0]),
            service_rows_2: uniform_rows(&[1.0, 2.0, 3.0, 4.0]),
            scale: 100,
            stopping_rule: StoppingRule::ArrivalClock { limit: 100.0 },
            random_method: RandomMethod::Manual {
                arrival_values,
                service_values,
            },
        }
    }

    #[test]
    fn first_customer_consumes_no_arrival_variate() {
        let mut simulation =
            Simulation::post(manual_config(Vec::new(), vec![0.10])).unwrap();
        match simulation.step().unwrap() {
            StepOutcome::Customer(record) => {
                assert_eq![1, record.index];
                assert_eq![None, record.arrival_digit];
                assert_eq![None, record.inter_arrival];
                assert_eq![0.0, record.arrival_clock];
                assert_eq![ServerId::Server1, record.server];
            }
            outcome => panic!["unexpected outcome: {:?}", outcome],
        }
    }

    #[test]
    fn suspension_points_follow_the_variate_order() {
        let mut simulation = Simulation::post(manual_config(Vec::new(), Vec::new())).unwrap();
        assert_eq![
            StepOutcome::AwaitingInput(PendingInput::AwaitingService { customer: 1 }),
            simulation.step().unwrap()
        ];
        simulation.resume(0.10).unwrap();
        assert_eq![
            StepOutcome::AwaitingInput(PendingInput::AwaitingArrival { customer: 2 }),
            simulation.step().unwrap()
        ];
    }

    #[test]
    fn resume_consumes_each_variate_exactly_once() {
        let mut simulation = Simulation::post(manual_config(Vec::new(), vec![0.10])).unwrap();
        simulation.step().unwrap();
        assert_eq![
            StepOutcome::AwaitingInput(PendingInput::AwaitingArrival { customer: 2 }),
            simulation.step().unwrap()
        ];
        // The supplied arrival value must serve the arrival lookup only;
        // the step then suspends again for the service variate
        assert_eq![
            StepOutcome::AwaitingInput(PendingInput::AwaitingService { customer: 2 }),
            simulation.resume(0.26).unwrap()
        ];
        match simulation.resume(0.95).unwrap() {
            StepOutcome::Customer(record) => {
                assert_eq![2, record.index];
                assert_eq![Some(26), record.arrival_digit];
                assert_eq![Some(2.0), record.inter_arrival];
                assert_eq![2.0, record.arrival_clock];
                assert_eq![95, record.service_digit];
            }
            outcome => panic!["unexpected outcome: {:?}", outcome],
        }
        assert_eq![None, simulation.get_pending_input()];
    }

    #[test]
    fn resume_without_suspension_is_rejected() {
        let mut simulation = Simulation::post(manual_config(Vec::new(), vec![0.10])).unwrap();
        assert![matches![
            simulation.resume(0.5),
            Err(SimulationError::NotAwaitingInput)
        ]];
    }

    #[test]
    fn out_of_range_manual_values_are_rejected_on_resume() {
        let mut simulation = Simulation::post(manual_config(Vec::new(), Vec::new())).unwrap();
        simulation.step().unwrap();
        assert![matches![
            simulation.resume(1.5),
            Err(SimulationError::InvalidManualValue)
        ]];
        // The suspension is still pending and a valid value still lands
        assert_eq![
            Some(PendingInput::AwaitingService { customer: 1 }),
            simulation.get_pending_input()
        ];
        assert![matches![
            simulation.resume(0.5).unwrap(),
            StepOutcome::Customer(_)
        ]];
    }

    #[test]
    fn arrival_limit_boundary_is_inclusive() {
        let config = SimulationConfig {
            arrival_rows: vec![DistributionRow {
                value: 5.0,
                probability: 1.0,
            }],
            service_rows_1: vec![DistributionRow {
                value: 1.0,
                probability: 1.0,
            }],
            service_rows_2: vec![DistributionRow {
                value: 1.0,
                probability: 1.0,
            }],
            scale: 100,
            stopping_rule: StoppingRule::ArrivalClock { limit: 20.0 },
            random_method: RandomMethod::Lcg {
                multiplier: 21,
                increment: 13,
                modulus: 100,
                seed: 11,
            },
        };
        let mut simulation = Simulation::post(config).unwrap();
        let customers = simulation.run_to_completion().unwrap();
        // Arrival clocks 0, 5, 10, 15, 20 - the clock of exactly 20 stops
        // the simulation at that customer
        assert_eq![5, customers.len()];
        assert_eq![20.0, customers[4].arrival_clock];
        assert![simulation.is_complete()];
        assert_eq![StepOutcome::Complete, simulation.step().unwrap()];
    }

    #[test]
    fn completion_limit_boundary_is_inclusive() {
        let config = SimulationConfig {
            arrival_rows: vec![DistributionRow {
                value: 1.0,
                probability: 1.0,
            }],
            service_rows_1: vec![DistributionRow {
                value: 4.0,
                probability: 1.0,
            }],
            service_rows_2: vec![DistributionRow {
                value: 4.0,
                probability: 1.0,
            }],
            scale: 100,
            stopping_rule: StoppingRule::ServiceCompletion { limit: 8.0 },
            random_method: RandomMethod::MidSquare { seed: 5735 },
        };
        let mut simulation = Simulation::post(config).unwrap();
        let customers = simulation.run_to_completion().unwrap();
        // Arrivals 0, 1, 2; the third customer queues for server 1 and
        // completes at exactly the limit
        assert_eq![3, customers.len()];
        assert_eq![8.0, customers[2].service_end];
        assert_eq![2.0, customers[2].queue_wait];
    }

    #[test]
    fn run_to_completion_rejects_a_starved_manual_stream() {
        let mut simulation = Simulation::post(manual_config(Vec::new(), Vec::new())).unwrap();
        assert![matches![
            simulation.run_to_completion(),
            Err(SimulationError::AwaitingManualValue)
        ]];
    }

    #[test]
    fn non_positive_stopping_limits_are_rejected() {
        let mut config = manual_config(Vec::new(), Vec::new());
        config.stopping_rule = StoppingRule::ArrivalClock { limit: 0.0 };
        assert![matches![
            Simulation::post(config),
            Err(SimulationError::InvalidStoppingLimit)
        ]];
    }
}
