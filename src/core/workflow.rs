//! Admission-to-result workflow.
//!
//! One [`AdmissionWorkflow`] backs one admission view: it owns the draft,
//! lets at most one prediction be pending, and aborts that prediction when
//! the view is torn down. A finished prediction travels to the result route
//! as [`NavigationState`]; nothing is persisted.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures::future::{AbortHandle, Abortable, Aborted, BoxFuture, FutureExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::client::Predictor;
use crate::core::form::AdmissionForm;
use crate::core::interpret::{interpret, PredictionOutcome};
use crate::error::{PredictionError, SubmitError};
use crate::models::{PatientInput, PredictionResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Admission,
    PredictionResult,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Admission => "/admission",
            Route::PredictionResult => "/prediction-result",
        }
    }
}

/// Transient state handed from the admission route to the result route.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    pub prediction: PredictionResponse,
    pub patient: PatientInput,
    pub received_at: DateTime<Utc>,
}

/// What the result route renders.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    Ready(PredictionOutcome),
    /// Reached without a prediction; offers the way back to the form.
    NoData { message: &'static str, back_label: &'static str, back_to: Route },
}

impl ResultView {
    pub fn render(state: Option<&NavigationState>) -> Self {
        match state {
            Some(state) => ResultView::Ready(interpret(&state.prediction, &state.patient)),
            None => ResultView::NoData {
                message: "No Prediction Data Available",
                back_label: "Back to Admission Form",
                back_to: Route::Admission,
            },
        }
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultView::NoData { message, back_label, back_to } => {
                writeln!(f, "{message}")?;
                write!(f, "[{back_label}] -> {}", back_to.path())
            }
            ResultView::Ready(outcome) => {
                let headline = outcome.headline();
                writeln!(f, "Emergency Prediction Results")?;
                writeln!(f, "[{}] {}", headline.severity.as_str(), headline.label)?;
                writeln!(f)?;
                writeln!(f, "Patient Information")?;
                let patient = &outcome.patient;
                writeln!(f, "  Age:               {}", patient.age)?;
                writeln!(f, "  Gender:            {}", patient.gender)?;
                writeln!(f, "  Blood Pressure:    {}", patient.blood_pressure)?;
                writeln!(f, "  Heart Rate:        {}", patient.heart_rate)?;
                writeln!(f, "  Temperature:       {}", patient.temperature)?;
                writeln!(f, "  Oxygen Saturation: {}", patient.oxygen_saturation)?;
                writeln!(f)?;
                writeln!(f, "Model Predictions")?;
                for (model, reading) in [
                    ("Random Forest", outcome.random_forest),
                    ("Logistic Regression", outcome.logistic_regression),
                ] {
                    writeln!(f, "  {model}: [{}] {}", reading.severity.as_str(), reading.label)?;
                }
                writeln!(f, "  {}", outcome.agreement_message())?;
                writeln!(f)?;
                writeln!(f, "Symptoms:        {}", patient.symptoms)?;
                write!(f, "Medical History: {}", patient.medical_history)
            }
        }
    }
}

/// In-flight flag and abort slot shared between a workflow and its pending
/// submission.
#[derive(Debug, Clone, Default)]
struct SingleFlight {
    pending: Arc<AtomicBool>,
    abort: Arc<Mutex<Option<AbortHandle>>>,
}

impl SingleFlight {
    fn try_acquire(&self) -> Option<FlightTicket> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightTicket(self.clone()))
    }

    fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    fn abort_slot(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.abort.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn arm(&self, handle: AbortHandle) {
        *self.abort_slot() = Some(handle);
    }

    fn cancel(&self) -> bool {
        match self.abort_slot().take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

/// Releases the flag and drops the abort handle when the request future
/// finishes or is dropped.
struct FlightTicket(SingleFlight);

impl Drop for FlightTicket {
    fn drop(&mut self) {
        self.0.abort_slot().take();
        self.0.pending.store(false, Ordering::Release);
    }
}

type PendingPrediction = Abortable<BoxFuture<'static, Result<PredictionResponse, PredictionError>>>;

/// A prediction request that has been sent.
///
/// Owns its snapshot and does not borrow the workflow, so the form stays
/// editable while it is awaited.
#[must_use = "a submission does nothing until awaited"]
pub struct Submission {
    id: Uuid,
    patient: PatientInput,
    request: PendingPrediction,
}

impl Submission {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn patient(&self) -> &PatientInput {
        &self.patient
    }

    /// Wait for the verdicts. Cancellation surfaces as [`SubmitError::Cancelled`].
    pub async fn wait(self) -> Result<NavigationState, SubmitError> {
        let id = self.id;
        match self.request.await {
            Ok(Ok(prediction)) => {
                info!(%id, "admission prediction ready");
                Ok(NavigationState {
                    prediction,
                    patient: self.patient,
                    received_at: Utc::now(),
                })
            }
            Ok(Err(err)) => {
                warn!(%id, error = %err, retryable = err.is_retryable(), "admission prediction failed");
                Err(SubmitError::Prediction(err))
            }
            Err(Aborted) => {
                info!(%id, "admission prediction cancelled");
                Err(SubmitError::Cancelled)
            }
        }
    }
}

impl fmt::Debug for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submission")
            .field("id", &self.id)
            .field("patient", &self.patient)
            .finish_non_exhaustive()
    }
}

pub struct AdmissionWorkflow {
    form: AdmissionForm,
    predictor: Arc<dyn Predictor>,
    flight: SingleFlight,
}

impl AdmissionWorkflow {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self::with_form(predictor, AdmissionForm::new())
    }

    pub fn with_form(predictor: Arc<dyn Predictor>, form: AdmissionForm) -> Self {
        Self {
            form,
            predictor,
            flight: SingleFlight::default(),
        }
    }

    pub fn form(&self) -> &AdmissionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AdmissionForm {
        &mut self.form
    }

    /// True while a submission is outstanding; the view shows its loading state.
    pub fn is_pending(&self) -> bool {
        self.flight.is_pending()
    }

    /// Validate the draft and send it.
    ///
    /// Nothing is sent when validation fails or another submission is still
    /// pending.
    pub fn submit(&mut self) -> Result<Submission, SubmitError> {
        let patient = self.form.snapshot()?;
        let ticket = match self.flight.try_acquire() {
            Some(ticket) => ticket,
            None => {
                warn!("admission submitted while a prediction is pending");
                return Err(SubmitError::InFlight);
            }
        };

        let id = Uuid::new_v4();
        info!(%id, "admission submitted");

        let predictor = Arc::clone(&self.predictor);
        let snapshot = patient.clone();
        let request = async move {
            let _ticket = ticket;
            predictor.predict(snapshot).await
        }
        .boxed();

        let (handle, registration) = AbortHandle::new_pair();
        self.flight.arm(handle);

        Ok(Submission {
            id,
            patient,
            request: Abortable::new(request, registration),
        })
    }

    /// Submit and wait in one step.
    pub async fn run(&mut self) -> Result<NavigationState, SubmitError> {
        self.submit()?.wait().await
    }

    /// Abort any pending submission, as when the view goes away.
    ///
    /// Returns whether there was one to abort.
    pub fn teardown(&mut self) -> bool {
        self.flight.cancel()
    }
}

impl Drop for AdmissionWorkflow {
    fn drop(&mut self) {
        self.flight.cancel();
    }
}

impl fmt::Debug for AdmissionWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionWorkflow")
            .field("form", &self.form)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::MockPredictor;
    use crate::models::{FormField, MultiField};

    fn filled_form() -> AdmissionForm {
        let mut form = AdmissionForm::new();
        form.set_field(FormField::Age, "45");
        form.set_field(FormField::Gender, "Male");
        form.set_field(FormField::SystolicBp, "140");
        form.set_field(FormField::DiastolicBp, "90");
        form.set_field(FormField::HeartRate, "110");
        form.set_field(FormField::Temperature, "38.5");
        form.set_field(FormField::OxygenSaturation, "92");
        form.set_multi_field(MultiField::Symptoms, vec!["Chest pain"]);
        form
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing() {
        let mut predictor = MockPredictor::new();
        predictor.expect_predict().times(0);

        let mut form = filled_form();
        form.set_field(FormField::OxygenSaturation, "");
        let mut workflow = AdmissionWorkflow::with_form(Arc::new(predictor), form);

        let err = workflow.submit().unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));
        assert!(!workflow.is_pending());
    }

    #[tokio::test]
    async fn successful_submission_carries_snapshot_and_verdicts() {
        let mut predictor = MockPredictor::new();
        predictor
            .expect_predict()
            .withf(|input| input.field(FormField::Age) == "45")
            .times(1)
            .returning(|_| Ok(PredictionResponse::new("emergency", "emergency")));

        let mut workflow = AdmissionWorkflow::with_form(Arc::new(predictor), filled_form());
        let state = workflow.run().await.unwrap();

        assert_eq!(state.patient, workflow.form().snapshot().unwrap());
        assert!(!workflow.is_pending());
        match ResultView::render(Some(&state)) {
            ResultView::Ready(outcome) => {
                assert!(outcome.is_emergency);
                assert!(outcome.models_agree);
            }
            other => panic!("expected outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_is_generic_and_form_can_resubmit() {
        let mut predictor = MockPredictor::new();
        let mut seq = mockall::Sequence::new();
        predictor
            .expect_predict()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(PredictionError::Timeout));
        predictor
            .expect_predict()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(PredictionResponse::new(0, -1)));

        let mut workflow = AdmissionWorkflow::with_form(Arc::new(predictor), filled_form());

        let err = workflow.run().await.unwrap_err();
        assert_eq!(err.user_message(), "Could not get prediction");
        assert!(!workflow.is_pending());

        workflow.form_mut().set_field(FormField::HeartRate, "95");
        let state = workflow.run().await.unwrap();
        assert_eq!(state.patient.field(FormField::HeartRate), "95");
    }

    #[tokio::test]
    async fn dropping_a_submission_releases_the_guard() {
        let predictor = MockPredictor::new();
        let mut workflow = AdmissionWorkflow::with_form(Arc::new(predictor), filled_form());

        let submission = workflow.submit().unwrap();
        assert!(workflow.is_pending());
        assert!(matches!(workflow.submit(), Err(SubmitError::InFlight)));

        drop(submission);
        assert!(!workflow.is_pending());
    }

    #[tokio::test]
    async fn finished_submission_leaves_nothing_to_cancel() {
        let mut predictor = MockPredictor::new();
        predictor
            .expect_predict()
            .times(1)
            .returning(|_| Ok(PredictionResponse::new("no_emergency", "no_emergency")));
        let mut workflow = AdmissionWorkflow::with_form(Arc::new(predictor), filled_form());

        workflow.run().await.unwrap();
        assert!(!workflow.teardown());

        drop(workflow.submit().unwrap());
        assert!(!workflow.teardown());

        let pending = workflow.submit().unwrap();
        assert!(workflow.teardown());
        assert!(matches!(pending.wait().await, Err(SubmitError::Cancelled)));
        assert!(!workflow.teardown());
    }

    #[test]
    fn result_route_without_state_falls_back() {
        let view = ResultView::render(None);
        assert_eq!(
            view,
            ResultView::NoData {
                message: "No Prediction Data Available",
                back_label: "Back to Admission Form",
                back_to: Route::Admission,
            }
        );
        assert!(view.to_string().ends_with("-> /admission"));
    }

    #[test]
    fn ready_view_renders_report() {
        let state = NavigationState {
            prediction: PredictionResponse::new(0, -1),
            patient: filled_form().snapshot().unwrap(),
            received_at: Utc::now(),
        };
        let text = ResultView::render(Some(&state)).to_string();
        assert!(text.contains("[success] No Emergency Admission Required"));
        assert!(text.contains("Random Forest: [warning] No Admission in Emergency"));
        assert!(text.contains("Logistic Regression: [success] No Admission at All"));
        assert!(text.contains("Models have different predictions"));
        assert!(text.contains("Medical History: None reported"));
    }
}
