//! Dashboard state and its reducer.
//!
//! ```text
//! idle ──Submit──▶ submitting ──Completed(ok)──▶ success ─┐
//!                      │                                    ├─Submit──▶ submitting
//!                      └──────Completed(err)──▶ error ──────┘
//! ```
//!
//! Every `Submit` issues a fresh [`RequestToken`]. A `Completed` action only
//! takes effect when it carries the latest token, so overlapping submissions
//! resolve to the most recent one whatever order their replies arrive in,
//! and `loading` is cleared exactly when that latest reply lands.

use serde::Serialize;

use super::client::SubmitError;
use super::form::{FormField, FormState};
use super::score::{ScoreResult, ScoreView};

/// Identifies one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Banner shown under the dashboard. Success and error cannot coexist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Success,
    Error(String),
}

/// Text of the success banner.
pub const SUCCESS_MESSAGE: &str = "Data submitted successfully and score calculated.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    pub form: FormState,
    /// Percentage of the maximum score.
    pub score: f64,
    pub raw_score: f64,
    pub loading: bool,
    pub status: Status,
    latest_request: Option<RequestToken>,
    issued: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            form: FormState::default(),
            score: 0.0,
            raw_score: 0.0,
            loading: false,
            status: Status::Idle,
            latest_request: None,
            issued: 0,
        }
    }
}

impl DashboardState {
    pub fn success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            Status::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Token of the submission whose reply is awaited, if any.
    pub fn latest_request(&self) -> Option<RequestToken> {
        self.latest_request
    }

    /// The result panel for the current scores.
    pub fn view(&self) -> ScoreView {
        ScoreView::new(self.raw_score, self.score)
    }
}

#[derive(Debug)]
pub enum Action {
    Edit(FormField),
    Submit,
    Completed {
        token: RequestToken,
        outcome: Result<ScoreResult, SubmitError>,
    },
}

/// Apply an action. Returns the new state and, for `Submit`, the token the
/// caller must attach to the matching `Completed`.
pub fn reduce(mut state: DashboardState, action: Action) -> (DashboardState, Option<RequestToken>) {
    match action {
        Action::Edit(field) => {
            state.form.apply(field);
            (state, None)
        }
        Action::Submit => {
            state.issued += 1;
            let token = RequestToken(state.issued);
            state.latest_request = Some(token);
            state.loading = true;
            state.status = Status::Idle;
            (state, Some(token))
        }
        Action::Completed { token, outcome } => {
            if state.latest_request != Some(token) {
                // Superseded by a later submission
                return (state, None);
            }
            state.latest_request = None;
            match outcome {
                Ok(result) => {
                    state.raw_score = result.agri_score;
                    state.score = result.percentage();
                    state.status = Status::Success;
                }
                Err(error) => {
                    state.raw_score = 0.0;
                    state.score = 0.0;
                    state.status = Status::Error(error.message());
                }
            }
            state.loading = false;
            (state, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::form::CropType;

    fn submit(state: DashboardState) -> (DashboardState, RequestToken) {
        let (state, token) = reduce(state, Action::Submit);
        (state, token.expect("submit issues a token"))
    }

    fn complete(
        state: DashboardState,
        token: RequestToken,
        outcome: Result<ScoreResult, SubmitError>,
    ) -> DashboardState {
        reduce(state, Action::Completed { token, outcome }).0
    }

    #[test]
    fn initial_state_is_idle() {
        let state = DashboardState::default();
        assert!(!state.loading);
        assert!(!state.success());
        assert_eq!(state.error(), None);
        assert_eq!(state.view().label, "No Data");
    }

    #[test]
    fn edit_updates_form_only() {
        let (state, token) = reduce(
            DashboardState::default(),
            Action::Edit(FormField::CropType(CropType::Barley)),
        );
        assert!(token.is_none());
        assert_eq!(state.form.crop_type, CropType::Barley);
        assert!(!state.loading);
    }

    #[test]
    fn submit_sets_loading_and_clears_banners() {
        let mut state = DashboardState::default();
        state.status = Status::Error("old".to_string());

        let (state, token) = submit(state);
        assert!(state.loading);
        assert_eq!(state.status, Status::Idle);
        assert_eq!(state.latest_request(), Some(token));
    }

    #[test]
    fn tokens_increase() {
        let (state, first) = submit(DashboardState::default());
        let (_, second) = submit(state);
        assert!(second > first);
        assert_eq!(second.get(), first.get() + 1);
    }

    #[test]
    fn success_sets_scores() {
        let (state, token) = submit(DashboardState::default());
        let state = complete(state, token, Ok(ScoreResult { agri_score: 425.0 }));
        assert!(!state.loading);
        assert!(state.success());
        assert_eq!(state.raw_score, 425.0);
        assert!((state.score - 50.0).abs() < 1e-9);
        assert_eq!(state.latest_request(), None);
    }

    #[test]
    fn failure_resets_scores() {
        let (state, token) = submit(DashboardState::default());
        let state = complete(state, token, Ok(ScoreResult { agri_score: 700.0 }));

        let (state, token) = submit(state);
        let state = complete(
            state,
            token,
            Err(SubmitError::Http {
                status: 500,
                status_text: "Internal Server Error".to_string(),
            }),
        );
        assert!(!state.loading);
        assert!(!state.success());
        assert_eq!(state.error(), Some("Server returned 500: Internal Server Error"));
        assert_eq!(state.raw_score, 0.0);
        assert_eq!(state.score, 0.0);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let (state, first) = submit(DashboardState::default());
        let (state, second) = submit(state);

        let state = complete(state, first, Ok(ScoreResult { agri_score: 100.0 }));
        assert!(state.loading, "latest submission still in flight");
        assert_eq!(state.raw_score, 0.0);

        let state = complete(state, second, Ok(ScoreResult { agri_score: 600.0 }));
        assert!(!state.loading);
        assert_eq!(state.raw_score, 600.0);
    }

    #[test]
    fn completion_without_submit_is_ignored() {
        let state = DashboardState::default();
        let (after, _) = reduce(
            state.clone(),
            Action::Completed {
                token: RequestToken(7),
                outcome: Ok(ScoreResult { agri_score: 800.0 }),
            },
        );
        assert_eq!(after, state);
    }
}
