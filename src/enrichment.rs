//! Concurrent enrichment of a person record from a first name.
//!
//! One call fans out to three lookups (age, gender, nationality):
//! 1. Derive a single deadline for the whole call
//! 2. Spawn one task per lookup, each owning a single-value result slot
//! 3. Wait on every slot, bounded by the deadline
//! 4. Merge values, substituting the default for any failed or late lookup
//!
//! The call never fails. In-flight requests are not aborted at the deadline;
//! their results are dropped when they arrive.

use crate::clients::{
    AgifyClient, AgifyResponse, AttributeLookup, GenderizeClient, GenderizeResponse,
    NationalizeClient, NationalizeResponse,
};
use crate::config::Config;
use crate::errors::LookupError;
use crate::models::{EnrichedAttributes, Gender, LookupRequest};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// Stand-in deadline for a timeout too large to add to the current instant.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

pub type AgeLookup = Arc<dyn AttributeLookup<Output = AgifyResponse>>;
pub type GenderLookup = Arc<dyn AttributeLookup<Output = GenderizeResponse>>;
pub type NationalityLookup = Arc<dyn AttributeLookup<Output = NationalizeResponse>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Age,
    Gender,
    Nationality,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Age => "age",
            Attribute::Gender => "gender",
            Attribute::Nationality => "nationality",
        };
        f.write_str(name)
    }
}

/// Terminal state of one attribute lookup. Only `Succeeded` keeps the
/// looked-up value; the other two leave the attribute at its default.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Succeeded,
    Failed(LookupError),
    TimedOut,
}

impl LookupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LookupOutcome::Succeeded)
    }
}

/// Receives exactly one outcome per attribute per enrichment call.
/// Reporting has no effect on the returned attributes.
pub trait OutcomeReporter: Send + Sync {
    fn report(&self, request: &LookupRequest, attribute: Attribute, outcome: &LookupOutcome);
}

/// Default reporter: one log line per outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl OutcomeReporter for TracingReporter {
    fn report(&self, request: &LookupRequest, attribute: Attribute, outcome: &LookupOutcome) {
        match outcome {
            LookupOutcome::Succeeded => {
                tracing::info!("{} lookup succeeded for '{}'", attribute, request)
            }
            LookupOutcome::Failed(e @ LookupError::UnexpectedStatus { .. }) => {
                tracing::warn!("{} lookup failed for '{}': {}", attribute, request, e)
            }
            LookupOutcome::Failed(e) => {
                tracing::error!("{} lookup failed for '{}': {}", attribute, request, e)
            }
            LookupOutcome::TimedOut => {
                tracing::warn!("{} lookup timed out for '{}'", attribute, request)
            }
        }
    }
}

/// One reported outcome, as delivered by [`ChannelReporter`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeReport {
    pub name: String,
    pub attribute: Attribute,
    pub outcome: LookupOutcome,
}

/// Forwards outcomes to an unbounded channel. A closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<OutcomeReport>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutcomeReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl OutcomeReporter for ChannelReporter {
    fn report(&self, request: &LookupRequest, attribute: Attribute, outcome: &LookupOutcome) {
        let _ = self.tx.send(OutcomeReport {
            name: request.name().to_string(),
            attribute,
            outcome: outcome.clone(),
        });
    }
}

/// Why a lookup task produced no usable value.
#[derive(Debug)]
enum TaskFailure {
    Lookup(LookupError),
    /// The response arrived, but only after the deadline.
    Late,
}

/// Fan-out/fan-in orchestrator over the three lookup clients.
///
/// Stateless across calls: clients and the reporter are shared read-only,
/// every call owns its own result slots.
#[derive(Clone)]
pub struct Enricher {
    age: AgeLookup,
    gender: GenderLookup,
    nationality: NationalityLookup,
    timeout: Duration,
    reporter: Arc<dyn OutcomeReporter>,
}

impl fmt::Debug for Enricher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enricher")
            .field("age", &self.age.service())
            .field("gender", &self.gender.service())
            .field("nationality", &self.nationality.service())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Enricher {
    pub fn new(
        age: AgeLookup,
        gender: GenderLookup,
        nationality: NationalityLookup,
        timeout: Duration,
    ) -> Self {
        Self {
            age,
            gender,
            nationality,
            timeout,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Builds the HTTP-backed clients from the configured base URLs.
    pub fn from_config(config: &Config) -> Result<Self, LookupError> {
        let connect_timeout = config.lookup_connect_timeout;
        Ok(Self::new(
            Arc::new(AgifyClient::new(config.agify_url.clone(), connect_timeout)?),
            Arc::new(GenderizeClient::new(
                config.genderize_url.clone(),
                connect_timeout,
            )?),
            Arc::new(NationalizeClient::new(
                config.nationalize_url.clone(),
                connect_timeout,
            )?),
            config.enrichment_timeout,
        ))
    }

    /// Replaces the default tracing reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn OutcomeReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Enriches `name` within the fixed timeout.
    pub async fn enrich(&self, name: &str) -> EnrichedAttributes {
        self.enrich_until(name, None).await
    }

    /// Like [`Enricher::enrich`], but also honours a caller deadline when it
    /// is tighter than the fixed timeout.
    pub async fn enrich_until(
        &self,
        name: &str,
        caller_deadline: Option<Instant>,
    ) -> EnrichedAttributes {
        let request = LookupRequest::new(name);
        let deadline = effective_deadline(Instant::now(), self.timeout, caller_deadline);

        let (age, gender, nationality) = tokio::join!(
            self.resolve(Attribute::Age, &self.age, &request, deadline),
            self.resolve(Attribute::Gender, &self.gender, &request, deadline),
            self.resolve(Attribute::Nationality, &self.nationality, &request, deadline),
        );

        let attributes = EnrichedAttributes {
            age: age.and_then(|r| r.age).unwrap_or(0),
            gender: gender
                .map(|r| Gender::from_lookup(r.gender.as_deref()))
                .unwrap_or_default(),
            nationality: nationality
                .and_then(|r| r.top_country().map(str::to_owned))
                .unwrap_or_default(),
        };

        tracing::debug!("Enriched '{}': {:?}", request, attributes);
        attributes
    }

    /// Runs one lookup to a terminal state and reports it. `None` means the
    /// attribute keeps its default.
    async fn resolve<T: Send + 'static>(
        &self,
        attribute: Attribute,
        client: &Arc<dyn AttributeLookup<Output = T>>,
        request: &LookupRequest,
        deadline: Instant,
    ) -> Option<T> {
        let slot = spawn_lookup(attribute, Arc::clone(client), request.clone(), deadline);

        let (value, outcome) = match tokio::time::timeout_at(deadline, slot).await {
            Ok(Ok(Ok(value))) => (Some(value), LookupOutcome::Succeeded),
            Ok(Ok(Err(TaskFailure::Lookup(e)))) => (None, LookupOutcome::Failed(e)),
            Ok(Ok(Err(TaskFailure::Late))) | Err(_) => (None, LookupOutcome::TimedOut),
            // Sender dropped without a value: the lookup task panicked
            Ok(Err(_)) => (
                None,
                LookupOutcome::Failed(LookupError::Transport(format!(
                    "{} lookup task ended without a result",
                    client.service()
                ))),
            ),
        };

        self.reporter.report(request, attribute, &outcome);
        value
    }
}

/// The earlier of `now + timeout` and the caller's own deadline.
pub fn effective_deadline(
    now: Instant,
    timeout: Duration,
    caller_deadline: Option<Instant>,
) -> Instant {
    let own = now
        .checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now);
    match caller_deadline {
        Some(caller) if caller < own => caller,
        _ => own,
    }
}

/// Starts one lookup in its own task and returns its result slot.
///
/// The slot is written at most once and never blocks the task, so a lookup
/// that outlives the deadline finishes quietly and its value is discarded.
fn spawn_lookup<T: Send + 'static>(
    attribute: Attribute,
    client: Arc<dyn AttributeLookup<Output = T>>,
    request: LookupRequest,
    deadline: Instant,
) -> oneshot::Receiver<Result<T, TaskFailure>> {
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let result = match client.get(&request).await {
            Ok(_) if Instant::now() >= deadline => {
                tracing::debug!(
                    "{} result for '{}' arrived after the deadline, discarding",
                    attribute,
                    request
                );
                Err(TaskFailure::Late)
            }
            Ok(value) => Ok(value),
            Err(e) => Err(TaskFailure::Lookup(e)),
        };

        if tx.send(result).is_err() {
            tracing::debug!(
                "{} result for '{}' dropped: enrichment already returned",
                attribute,
                request
            );
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedAge;

    #[async_trait]
    impl AttributeLookup for FixedAge {
        type Output = AgifyResponse;

        fn service(&self) -> &'static str {
            "instant"
        }

        async fn get(&self, _request: &LookupRequest) -> Result<AgifyResponse, LookupError> {
            Ok(AgifyResponse {
                age: Some(42),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_value_after_deadline_is_discarded_by_task() {
        let deadline = Instant::now();
        let slot = spawn_lookup(
            Attribute::Age,
            Arc::new(FixedAge),
            LookupRequest::new("Alice"),
            deadline,
        );
        let result = slot.await.unwrap();
        assert!(matches!(result, Err(TaskFailure::Late)));
    }

    #[tokio::test]
    async fn test_value_before_deadline_is_committed() {
        let deadline = Instant::now() + Duration::from_secs(5);
        let slot = spawn_lookup(
            Attribute::Age,
            Arc::new(FixedAge),
            LookupRequest::new("Alice"),
            deadline,
        );
        let result = slot.await.unwrap();
        assert_eq!(result.unwrap().age, Some(42));
    }

    #[test]
    fn test_effective_deadline_prefers_tighter_caller() {
        let now = Instant::now();
        let timeout = Duration::from_secs(5);

        assert_eq!(effective_deadline(now, timeout, None), now + timeout);
        assert_eq!(
            effective_deadline(now, timeout, Some(now + Duration::from_secs(1))),
            now + Duration::from_secs(1)
        );
        assert_eq!(
            effective_deadline(now, timeout, Some(now + Duration::from_secs(60))),
            now + timeout
        );
    }

    #[test]
    fn test_effective_deadline_survives_huge_timeout() {
        let now = Instant::now();

        let deadline = effective_deadline(now, Duration::MAX, None);
        assert!(deadline > now);
        assert_eq!(
            effective_deadline(now, Duration::MAX, Some(now + Duration::from_secs(1))),
            now + Duration::from_secs(1)
        );
    }

    #[test]
    fn test_attribute_display() {
        assert_eq!(Attribute::Nationality.to_string(), "nationality");
    }
}
