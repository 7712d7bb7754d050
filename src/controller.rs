/// Interaction state machine for the form → plan lifecycle.
///
/// The controller owns the form and all displayed result state. It never
/// performs I/O itself: `submit` and `regenerate` hand back a `Dispatch`
/// that the caller runs against the plan service, and the outcome comes
/// back through `apply_response` tagged with the dispatch sequence
/// number. Sequence tracking is what makes rapid regenerates and "new
/// while a request is in flight" safe — a response is applied only when
/// it belongs to the most recent dispatch; anything else is discarded.
use crate::client::{GeneratedPlan, PlanRequest, RequestError};
use crate::form::FormInput;
use crate::notify::{NoticeKind, Notifier};
use crate::validate::{self, ValidationResult};

// ── Phases ────────────────────────────────────────────────────────────────────

/// Where the session is in the form-to-result lifecycle. `Submitting` is
/// transient — it only exists between a valid submit and its response —
/// but real: while in it, submit is ignored and regenerate/copy are not
/// yet available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingInput,
    Submitting,
    ShowingResult,
}

// ── Collaborator seams ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
}

/// Navigation collaborator, consumed on cancel. The binary's impl leaves
/// the view (quits the TUI); tests record the call.
pub trait Navigator {
    fn go_to(&mut self, route: Route);
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// A request the caller is expected to run. The seq ties the eventual
/// outcome back to this dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub seq: u64,
    pub request: PlanRequest,
}

/// What `apply_response` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseDisposition {
    Applied,
    /// The outcome belonged to a superseded or cancelled dispatch.
    Discarded,
}

// ── Controller ────────────────────────────────────────────────────────────────

pub struct Controller {
    form: FormInput,
    phase: Phase,
    plan_text: String,
    sustainability_score: Option<f64>,
    /// Retained for regeneration — regenerate reuses this verbatim, so
    /// later field edits never drift into a regenerated request.
    last_submitted: Option<FormInput>,
    next_seq: u64,
    /// The dispatch whose response we still care about. `None` means no
    /// interest: any arriving response is stale.
    pending_seq: Option<u64>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            form: FormInput::new(),
            phase: Phase::AwaitingInput,
            plan_text: String::new(),
            sustainability_score: None,
            last_submitted: None,
            next_seq: 1,
            pending_seq: None,
        }
    }

    pub fn form(&self) -> &FormInput {
        &self.form
    }

    /// Field edits go through the registry's named setters on this.
    pub fn form_mut(&mut self) -> &mut FormInput {
        &mut self.form
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn plan_text(&self) -> &str {
        &self.plan_text
    }

    pub fn sustainability_score(&self) -> Option<f64> {
        self.sustainability_score
    }

    pub fn request_in_flight(&self) -> bool {
        self.pending_seq.is_some()
    }

    /// Submit the current form. Invalid input reports the first missing
    /// field and stays in `AwaitingInput`; valid input moves to
    /// `Submitting` and returns the dispatch to run. Ignored outside
    /// `AwaitingInput` (re-entrancy guard while a submit is pending).
    pub fn submit(&mut self, notifier: &mut dyn Notifier) -> Option<Dispatch> {
        if self.phase != Phase::AwaitingInput {
            return None;
        }
        match validate::validate(&self.form) {
            ValidationResult::Invalid(field) => {
                notifier.notify(NoticeKind::Error, field.message().to_string());
                None
            }
            ValidationResult::Valid => {
                self.phase = Phase::Submitting;
                self.last_submitted = Some(self.form.clone());
                Some(self.dispatch(PlanRequest::from_form(&self.form)))
            }
        }
    }

    /// Re-issue the last-submitted form, unvalidated and unchanged.
    /// Only meaningful in `ShowingResult`; repeated calls are allowed and
    /// each supersedes the previous dispatch.
    pub fn regenerate(&mut self, notifier: &mut dyn Notifier) -> Option<Dispatch> {
        if self.phase != Phase::ShowingResult {
            return None;
        }
        match &self.last_submitted {
            Some(form) => {
                let request = PlanRequest::from_form(form);
                Some(self.dispatch(request))
            }
            None => {
                notifier.notify(NoticeKind::Error, "Nothing to regenerate yet".to_string());
                None
            }
        }
    }

    fn dispatch(&mut self, request: PlanRequest) -> Dispatch {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending_seq = Some(seq);
        Dispatch { seq, request }
    }

    /// Apply a request outcome. Regardless of success or failure the
    /// session ends up in `ShowingResult`; on failure the displayed plan
    /// text keeps its prior value and the failure is reported. Outcomes
    /// from superseded dispatches are dropped without touching anything.
    pub fn apply_response(
        &mut self,
        seq: u64,
        outcome: Result<GeneratedPlan, RequestError>,
        notifier: &mut dyn Notifier,
    ) -> ResponseDisposition {
        if self.pending_seq != Some(seq) {
            tracing::debug!(seq, "discarding superseded plan response");
            return ResponseDisposition::Discarded;
        }
        self.pending_seq = None;
        if self.phase == Phase::Submitting {
            self.phase = Phase::ShowingResult;
        }
        match outcome {
            Ok(plan) => {
                self.plan_text = plan.text;
                self.sustainability_score = plan.sustainability_score;
            }
            Err(err) => {
                tracing::warn!(error = %err, "plan request failed");
                notifier.notify(
                    NoticeKind::Error,
                    "Plan generation failed, please try again".to_string(),
                );
            }
        }
        ResponseDisposition::Applied
    }

    /// "New": back to a blank form. Clears the displayed plan and drops
    /// interest in any in-flight response. Valid from any phase.
    pub fn new_form(&mut self) {
        self.form.clear();
        self.plan_text.clear();
        self.sustainability_score = None;
        self.last_submitted = None;
        self.pending_seq = None;
        self.phase = Phase::AwaitingInput;
    }

    /// "Cancel": discard the form (valid or not) and leave the view via
    /// the navigation collaborator. Only accepted in `AwaitingInput`;
    /// returns whether the exit happened.
    pub fn cancel(&mut self, nav: &mut dyn Navigator) -> bool {
        if self.phase != Phase::AwaitingInput {
            return false;
        }
        self.form.clear();
        nav.go_to(Route::Landing);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::SustainabilityGoal;
    use crate::notify::Notice;

    #[derive(Default)]
    struct Recorder {
        notices: Vec<Notice>,
    }

    impl Notifier for Recorder {
        fn notify(&mut self, kind: NoticeKind, message: String) {
            self.notices.push(Notice { kind, message });
        }
    }

    #[derive(Default)]
    struct RecordingNav {
        routes: Vec<Route>,
    }

    impl Navigator for RecordingNav {
        fn go_to(&mut self, route: Route) {
            self.routes.push(route);
        }
    }

    fn fill_form(controller: &mut Controller) {
        let form = controller.form_mut();
        form.set_land_area("12");
        form.set_population("5000");
        form.set_zoning("residential");
        form.set_infrastructure("road, water plant");
        form.toggle_goal(SustainabilityGoal::PromoteGreenSpaces);
        form.set_budget("10");
    }

    fn plan(text: &str) -> GeneratedPlan {
        GeneratedPlan {
            text: text.to_string(),
            sustainability_score: None,
        }
    }

    #[test]
    fn test_invalid_submit_reports_and_stays_awaiting() {
        let mut controller = Controller::new();
        let mut notifier = Recorder::default();

        assert!(controller.submit(&mut notifier).is_none());
        assert_eq!(controller.phase(), Phase::AwaitingInput);
        assert_eq!(notifier.notices.len(), 1);
        assert_eq!(notifier.notices[0].kind, NoticeKind::Error);
        assert_eq!(notifier.notices[0].message, "Please fill in the land area");
    }

    #[test]
    fn test_missing_budget_reports_budget_and_dispatches_nothing() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        controller.form_mut().set_budget("");
        let mut notifier = Recorder::default();

        assert!(controller.submit(&mut notifier).is_none());
        assert_eq!(controller.phase(), Phase::AwaitingInput);
        assert_eq!(
            notifier.notices[0].message,
            "Please fill in the development budget"
        );
    }

    #[test]
    fn test_valid_submit_dispatches_normalized_request() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        let mut notifier = Recorder::default();

        let dispatch = controller.submit(&mut notifier).unwrap();
        assert_eq!(controller.phase(), Phase::Submitting);
        assert!(controller.request_in_flight());
        assert_eq!(
            dispatch.request.existing_infrastructure,
            vec!["road", "water plant"]
        );
        assert_eq!(
            dispatch.request.sustainability_goals,
            vec!["promote_green_spaces"]
        );
        assert!(notifier.notices.is_empty());
    }

    #[test]
    fn test_submit_ignored_while_submitting() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        let mut notifier = Recorder::default();

        controller.submit(&mut notifier).unwrap();
        assert!(controller.submit(&mut notifier).is_none());
        assert!(notifier.notices.is_empty());
    }

    #[test]
    fn test_successful_response_shows_result() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        let mut notifier = Recorder::default();

        let dispatch = controller.submit(&mut notifier).unwrap();
        let disposition = controller.apply_response(
            dispatch.seq,
            Ok(GeneratedPlan {
                text: "Zone the riverfront for mixed use.".to_string(),
                sustainability_score: Some(8.2),
            }),
            &mut notifier,
        );

        assert_eq!(disposition, ResponseDisposition::Applied);
        assert_eq!(controller.phase(), Phase::ShowingResult);
        assert_eq!(controller.plan_text(), "Zone the riverfront for mixed use.");
        assert_eq!(controller.sustainability_score(), Some(8.2));
        assert!(!controller.request_in_flight());
    }

    #[test]
    fn test_failed_response_still_shows_result_with_prior_text() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        let mut notifier = Recorder::default();

        let dispatch = controller.submit(&mut notifier).unwrap();
        controller.apply_response(
            dispatch.seq,
            Err(RequestError::Status {
                status: 500,
                detail: "model unavailable".to_string(),
            }),
            &mut notifier,
        );

        // The result view becomes visible even though the request failed;
        // the displayed text stays at its prior (initial, empty) value.
        assert_eq!(controller.phase(), Phase::ShowingResult);
        assert_eq!(controller.plan_text(), "");
        assert_eq!(notifier.notices.len(), 1);
        assert_eq!(notifier.notices[0].kind, NoticeKind::Error);
    }

    #[test]
    fn test_regenerate_reuses_last_submitted_despite_field_drift() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        let mut notifier = Recorder::default();

        let first = controller.submit(&mut notifier).unwrap();
        controller.apply_response(first.seq, Ok(plan("v1")), &mut notifier);

        // Field edits after submission must not leak into regeneration.
        controller.form_mut().set_budget("9999");
        controller.form_mut().set_zoning("");

        let redo = controller.regenerate(&mut notifier).unwrap();
        assert_eq!(redo.request, first.request);
        assert_eq!(controller.phase(), Phase::ShowingResult);
    }

    #[test]
    fn test_regenerate_failure_keeps_displayed_plan() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        let mut notifier = Recorder::default();

        let first = controller.submit(&mut notifier).unwrap();
        controller.apply_response(first.seq, Ok(plan("keep me")), &mut notifier);

        let redo = controller.regenerate(&mut notifier).unwrap();
        controller.apply_response(
            redo.seq,
            Err(RequestError::Transport("timed out".to_string())),
            &mut notifier,
        );

        assert_eq!(controller.plan_text(), "keep me");
        assert_eq!(controller.phase(), Phase::ShowingResult);
        assert_eq!(notifier.notices.len(), 1);
    }

    #[test]
    fn test_regenerate_without_retained_submission_reports_error() {
        let mut controller = Controller::new();
        controller.phase = Phase::ShowingResult;
        let mut notifier = Recorder::default();

        assert!(controller.regenerate(&mut notifier).is_none());
        assert_eq!(notifier.notices.len(), 1);
        assert_eq!(notifier.notices[0].kind, NoticeKind::Error);
        assert_eq!(notifier.notices[0].message, "Nothing to regenerate yet");
    }

    #[test]
    fn test_regenerate_outside_showing_result_is_ignored() {
        let mut controller = Controller::new();
        let mut notifier = Recorder::default();
        assert!(controller.regenerate(&mut notifier).is_none());
        assert!(notifier.notices.is_empty());
    }

    #[test]
    fn test_stale_response_never_overwrites_newer_one() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        let mut notifier = Recorder::default();

        let first = controller.submit(&mut notifier).unwrap();
        controller.apply_response(first.seq, Ok(plan("initial")), &mut notifier);

        // Two rapid regenerates; the second response (B) lands first.
        let a = controller.regenerate(&mut notifier).unwrap();
        let b = controller.regenerate(&mut notifier).unwrap();

        let applied = controller.apply_response(b.seq, Ok(plan("B")), &mut notifier);
        assert_eq!(applied, ResponseDisposition::Applied);

        let stale = controller.apply_response(a.seq, Ok(plan("A")), &mut notifier);
        assert_eq!(stale, ResponseDisposition::Discarded);
        assert_eq!(controller.plan_text(), "B");
    }

    #[test]
    fn test_older_response_arriving_first_is_also_discarded() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        let mut notifier = Recorder::default();

        let first = controller.submit(&mut notifier).unwrap();
        controller.apply_response(first.seq, Ok(plan("initial")), &mut notifier);

        let a = controller.regenerate(&mut notifier).unwrap();
        let b = controller.regenerate(&mut notifier).unwrap();

        assert_eq!(
            controller.apply_response(a.seq, Ok(plan("A")), &mut notifier),
            ResponseDisposition::Discarded
        );
        controller.apply_response(b.seq, Ok(plan("B")), &mut notifier);
        assert_eq!(controller.plan_text(), "B");
    }

    #[test]
    fn test_new_resets_form_result_and_in_flight_interest() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        let mut notifier = Recorder::default();

        let dispatch = controller.submit(&mut notifier).unwrap();
        // "New" while the request is still in flight.
        controller.new_form();

        assert_eq!(controller.phase(), Phase::AwaitingInput);
        assert_eq!(controller.form(), &FormInput::new());
        assert_eq!(controller.plan_text(), "");
        assert!(!controller.request_in_flight());

        // The in-flight response is stale now and must not resurface.
        let disposition =
            controller.apply_response(dispatch.seq, Ok(plan("late")), &mut notifier);
        assert_eq!(disposition, ResponseDisposition::Discarded);
        assert_eq!(controller.plan_text(), "");
        assert_eq!(controller.phase(), Phase::AwaitingInput);
    }

    #[test]
    fn test_new_from_showing_result_returns_to_blank_form() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        let mut notifier = Recorder::default();

        let dispatch = controller.submit(&mut notifier).unwrap();
        controller.apply_response(dispatch.seq, Ok(plan("done")), &mut notifier);
        controller.new_form();

        assert_eq!(controller.phase(), Phase::AwaitingInput);
        assert_eq!(controller.form(), &FormInput::new());
        assert_eq!(controller.plan_text(), "");

        // Regenerate has nothing to work from after a reset.
        fill_form(&mut controller);
        assert!(controller.regenerate(&mut notifier).is_none());
    }

    #[test]
    fn test_cancel_discards_invalid_form_and_navigates() {
        let mut controller = Controller::new();
        controller.form_mut().set_land_area("12"); // partial, invalid
        let mut nav = RecordingNav::default();

        assert!(controller.cancel(&mut nav));
        assert_eq!(nav.routes, vec![Route::Landing]);
        assert_eq!(controller.form(), &FormInput::new());
    }

    #[test]
    fn test_cancel_is_rejected_outside_awaiting_input() {
        let mut controller = Controller::new();
        fill_form(&mut controller);
        let mut notifier = Recorder::default();
        controller.submit(&mut notifier).unwrap();

        let mut nav = RecordingNav::default();
        assert!(!controller.cancel(&mut nav));
        assert!(nav.routes.is_empty());
    }
}
