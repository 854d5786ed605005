//! The server pool models exactly two parallel servers, each with a
//! "next-available" clock.  An arriving customer is assigned to a server
//! under a deterministic policy, with server 1 winning every tie.  The
//! clocks are mutated only by `assign`, and only monotonically.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two servers of the pool.  Service-time distributions are
/// per-server, so scheduling decisions carry the chosen server's identity
/// through to the customer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServerId {
    Server1,
    Server2,
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServerId::Server1 => write!(f, "1"),
            ServerId::Server2 => write!(f, "2"),
        }
    }
}

/// The product of one scheduling decision: the assigned server, the
/// service window, and the customer's queue wait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub server: ServerId,
    pub begin: f64,
    pub end: f64,
    pub queue_wait: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerState {
    available_at: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPool {
    server_1: ServerState,
    server_2: ServerState,
}

impl ServerPool {
    /// This method schedules one arriving customer.  The policy, in
    /// order: server 1 if it is available at the arrival (covering the
    /// both-available tie), otherwise server 2 if available, otherwise
    /// whichever server frees up first (tie to server 1), with service
    /// beginning at that server's availability rather than at arrival.
    /// Both candidate service times must be supplied, because each server
    /// carries its own service-time distribution and the decision can
    /// pick either.
    pub fn assign(&mut self, arrival: f64, service_1: f64, service_2: f64) -> Assignment {
        let (server, begin, service_time) = if self.server_1.available_at <= arrival {
            (ServerId::Server1, arrival, service_1)
        } else if self.server_2.available_at <= arrival {
            (ServerId::Server2, arrival, service_2)
        } else if self.server_1.available_at <= self.server_2.available_at {
            (ServerId::Server1, self.server_1.available_at, service_1)
        } else {
            (ServerId::Server2, self.server_2.available_at, service_2)
        };
        let end = begin + service_time;
        match server {
            ServerId::Server1 => self.server_1.available_at = end,
            ServerId::Server2 => self.server_2.available_at = end,
        }
        Assignment {
            server,
            begin,
            end,
            queue_wait: begin - arrival,
        }
    }

    /// An accessor method for a server's next-available clock.
    pub fn available_at(&self, server: ServerId) -> f64 {
        match server {
            ServerId::Server1 => self.server_1.available_at,
            ServerId::Server2 => self.server_2.available_at,
        }
    }
}
