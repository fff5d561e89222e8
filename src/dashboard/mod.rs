/// Dashboard View: form state, submission and score display.
///
/// The view is modelled as an explicit [`DashboardState`] driven by a pure
/// [`reduce`] function, so the same logic backs the terminal dashboard
/// (`agrifinance submit`) and is mirrored by the page script of the web
/// dashboard.
///
/// - [`form`]: form fields, regions, crops, defaults
/// - [`state`]: state, actions, reducer, request tokens
/// - [`client`]: `POST /api/agrifinance` against a running proxy
/// - [`score`]: percentage, bands, colors, the result view
/// - [`gauge`]: SVG and terminal gauge rendering
pub mod client;
pub mod form;
pub mod gauge;
pub mod score;
pub mod state;

pub use client::{ProxyClient, SubmitError};
pub use form::{CropType, FormField, FormState, Region};
pub use score::{Band, ScoreResult, ScoreView};
pub use state::{Action, DashboardState, RequestToken, Status, reduce};

/// Run one full submission: `Submit`, call the proxy, `Completed`.
pub fn submit_once(state: DashboardState, client: &ProxyClient) -> DashboardState {
    let (state, token) = reduce(state, Action::Submit);
    let Some(token) = token else {
        return state;
    };

    let outcome = client.submit(&state.form);
    reduce(state, Action::Completed { token, outcome }).0
}
