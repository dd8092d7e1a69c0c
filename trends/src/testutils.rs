//! Test helpers shared by this crate and the gateway.

use crate::client::TrendsClient;
use crate::error::UpstreamError;
use crate::series::RawSeries;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

enum Outcome {
    Series(RawSeries),
    Error(String),
}

/// In-memory [`TrendsClient`] returning pre-scripted per-geo outcomes.
///
/// Unscripted geos behave like an upstream failure. Calls are recorded so
/// tests can assert on fan-out order and on the timeframe that reached the
/// client.
#[derive(Default)]
pub struct ScriptedClient {
    outcomes: HashMap<String, Outcome>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, geo: &str, series: RawSeries) -> Self {
        self.outcomes.insert(geo.to_string(), Outcome::Series(series));
        self
    }

    pub fn with_error(mut self, geo: &str, message: &str) -> Self {
        self.outcomes
            .insert(geo.to_string(), Outcome::Error(message.to_string()));
        self
    }

    /// `(geo, timeframe)` pairs queried so far, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrendsClient for ScriptedClient {
    async fn interest_over_time(
        &self,
        _keywords: &[String],
        geo: &str,
        timeframe: &str,
    ) -> Result<RawSeries, UpstreamError> {
        self.calls
            .lock()
            .unwrap()
            .push((geo.to_string(), timeframe.to_string()));

        match self.outcomes.get(geo) {
            Some(Outcome::Series(series)) => Ok(series.clone()),
            Some(Outcome::Error(message)) => {
                Err(UpstreamError::MalformedResponse(message.clone()))
            }
            None => Err(UpstreamError::MalformedResponse(format!(
                "no scripted outcome for geo {geo:?}"
            ))),
        }
    }
}
