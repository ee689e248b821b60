// The probe run: log in, plant a tree, list trees, and print how the
// listed tree maps onto the browser client's field names. Stages run
// strictly in order; a failed login, plant or listing ends the run.

use std::io::Write;
use std::time::SystemTime;

use serde_json::Value;
use tracing::{info, info_span, warn};

use crate::api::{ApiClient, LoginRequest, TreeRecord};
use crate::config::ProbeConfig;
use crate::error::{ProbeError, Stage};
use crate::mapping::{
    backend_fields, display_field, display_opt, display_value, find_tree, FrontendTree, FrontendUser,
    HealthBand,
};
use crate::report::Reporter;
use crate::token;

/// What login handed back, kept for the rest of the run.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Value,
    pub username: Option<String>,
}

/// Everything a completed run observed. A run only completes when all
/// three requests got the status they needed; whether the planted tree
/// showed up in the listing is reported here rather than as an error.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub session: Session,
    pub planted: TreeRecord,
    pub trees: Vec<TreeRecord>,
}

impl ProbeOutcome {
    /// The listed tree whose id equals the planted one.
    pub fn found(&self) -> Option<&TreeRecord> {
        find_tree(&self.trees, &self.planted.id)
    }
}

/// Run all stages against `api`, printing to `out`. Failures are printed
/// before they are returned, so the caller only has to pick an exit code.
pub fn run<W: Write>(
    api: &mut ApiClient,
    config: &ProbeConfig,
    out: &mut Reporter<W>,
) -> Result<ProbeOutcome, ProbeError> {
    let span = info_span!("probe", base_url = %api.base_url());
    let _enter = span.enter();

    out.banner("FRONTEND SESSION & TREES DEBUG TEST")?;

    let session = authenticate(api, config, out).map_err(|e| report_failure(out, e))?;
    let planted = plant_tree(api, config, out).map_err(|e| report_failure(out, e))?;
    let trees = fetch_trees(api, &session, &planted, out).map_err(|e| report_failure(out, e))?;

    let outcome = ProbeOutcome { session, planted, trees };
    field_mapping(&outcome, out)?;
    summary(&outcome, config, out)?;
    Ok(outcome)
}

fn authenticate<W: Write>(
    api: &mut ApiClient,
    config: &ProbeConfig,
    out: &mut Reporter<W>,
) -> Result<Session, ProbeError> {
    out.stage(1, "Testing Login...")?;
    let req = LoginRequest {
        username: config.username.clone(),
        password: config.password.clone(),
    };
    let spinner = out.spinner("Logging in...");
    let result = api.login(&req);
    spinner.finish_and_clear();
    let login = result?;

    if login.access_token.is_empty() {
        return Err(ProbeError::InvalidResponse {
            stage: Stage::Login,
            reason: "empty access token".into(),
        });
    }
    api.set_token(&login.access_token);
    info!(user_id = %login.user_id, "logged in");

    out.pass("Login successful")?;
    out.detail("User ID", display_value(&login.user_id))?;
    out.detail("Username", display_opt(login.username.as_ref()))?;
    out.detail("Token", token::preview(&login.access_token, 50))?;
    match token::claims(&login.access_token) {
        Some(claims) => {
            out.detail("Token subject", display_field(claims.sub.as_ref()))?;
            let (label, value) = expiry_detail(claims.expires_in(SystemTime::now()));
            out.detail(label, value)?;
        }
        None => out.detail("Token claims", "opaque token (not a JWT)")?,
    }

    out.note("Frontend should save to localStorage:")?;
    out.detail("auth_token", token::preview(&login.access_token, 50))?;
    let user = FrontendUser::from_login(&login, &config.email);
    out.detail("user", serde_json::to_string(&user)?)?;

    Ok(Session {
        token: login.access_token,
        user_id: login.user_id,
        username: login.username,
    })
}

fn plant_tree<W: Write>(
    api: &ApiClient,
    config: &ProbeConfig,
    out: &mut Reporter<W>,
) -> Result<TreeRecord, ProbeError> {
    out.stage(2, "Planting a test tree...")?;
    let spinner = out.spinner("Planting...");
    let result = api.create_tree(&config.tree);
    spinner.finish_and_clear();
    let planted = result?;
    info!(tree_id = %planted.id, "tree planted");

    out.pass("Tree planted successfully")?;
    out.detail("Tree ID", display_value(&planted.id))?;
    out.detail("Species", display_field(planted.species.as_ref()))?;
    out.detail("Health Score", health_label(planted.health_score.as_ref()))?;
    Ok(planted)
}

fn fetch_trees<W: Write>(
    api: &ApiClient,
    session: &Session,
    planted: &TreeRecord,
    out: &mut Reporter<W>,
) -> Result<Vec<TreeRecord>, ProbeError> {
    out.stage(
        3,
        &format!("Fetching trees for user {}...", display_value(&session.user_id)),
    )?;
    let spinner = out.spinner("Fetching trees...");
    let result = api.list_trees();
    spinner.finish_and_clear();
    let trees = result?;

    out.pass("Trees fetched successfully")?;
    out.detail("Total trees", trees.len())?;

    match find_tree(&trees, &planted.id) {
        Some(tree) => {
            out.pass("Test tree found in list!")?;
            out.detail("Tree ID", display_value(&tree.id))?;
            out.detail("Species", display_field(tree.species.as_ref()))?;
            out.detail("Health Score", health_label(tree.health_score.as_ref()))?;
        }
        None => {
            warn!(tree_id = %planted.id, "planted tree missing from listing");
            out.fail("Test tree NOT found in list!")?;
            out.detail("Expected ID", display_value(&planted.id))?;
            out.line(format!("   Got {} trees:", trees.len()))?;
            for tree in &trees {
                out.line(format!(
                    "     - ID: {}, Species: {}, User: {}",
                    display_value(&tree.id),
                    display_field(tree.species.as_ref()),
                    display_field(tree.user_id.as_ref()),
                ))?;
            }
        }
    }
    Ok(trees)
}

fn field_mapping<W: Write>(outcome: &ProbeOutcome, out: &mut Reporter<W>) -> Result<(), ProbeError> {
    out.stage(4, "Frontend Tree Format Conversion")?;
    out.line("   Backend response fields:")?;
    let Some(tree) = outcome.found() else {
        out.line("     (test tree not in listing, nothing to convert)")?;
        return Ok(());
    };
    for (name, value) in backend_fields(tree) {
        out.item(1, name, value)?;
    }

    out.blank()?;
    out.line("   Frontend should convert to:")?;
    for (name, value) in FrontendTree::from(tree).fields() {
        out.item(1, name, value)?;
    }
    Ok(())
}

fn summary<W: Write>(
    outcome: &ProbeOutcome,
    config: &ProbeConfig,
    out: &mut Reporter<W>,
) -> Result<(), ProbeError> {
    out.blank()?;
    out.banner("SUMMARY")?;
    if outcome.found().is_some() {
        out.pass("All API endpoints working correctly")?;
        out.pass("Trees are being stored in database")?;
    } else {
        out.pass("Login and planting endpoints responded")?;
        out.fail("Planted tree is missing from the listing")?;
    }
    out.pass(format!(
        "Frontend has access token: {}",
        token::preview(&outcome.session.token, 30)
    ))?;

    out.line("\nNow test in browser:")?;
    out.line("1. Open browser DevTools (F12)")?;
    out.line(format!("2. Go to Application → Local Storage → {}", config.frontend_url))?;
    out.line("3. Verify:")?;
    out.line("   - auth_token is saved")?;
    out.line("   - user object is saved with id, displayName, email")?;
    out.line("4. Go to Console and check for errors")?;
    out.line("5. Refresh page - should stay logged in")?;
    out.line("6. Navigate to /trees - should see your trees")?;
    Ok(())
}

fn expiry_detail(expires_in: Option<i64>) -> (&'static str, String) {
    match expires_in {
        Some(secs) if secs > 0 => ("Token expires in", format!("{}s", secs)),
        Some(secs) => ("Token expired", format!("{}s ago", secs.saturating_neg())),
        None => ("Token expires", "never (no exp claim)".into()),
    }
}

/// The raw score, with its band when the score is numeric.
fn health_label(score: Option<&Value>) -> String {
    match score.and_then(Value::as_f64) {
        Some(n) => format!("{} ({})", display_field(score), HealthBand::from_score(n)),
        None => display_field(score),
    }
}

/// Print a stage failure and hand the error back.
fn report_failure<W: Write>(out: &mut Reporter<W>, err: ProbeError) -> ProbeError {
    let printed = out.fail(&err).and_then(|_| match &err {
        ProbeError::UnexpectedStatus { body, .. } => {
            out.line(format!("Response: {}", body))?;
            if err.is_unauthorized() {
                out.line("Hint: the bearer token was rejected; the session may have expired")?;
            }
            Ok(())
        }
        _ => Ok(()),
    });
    if let Err(io) = printed {
        warn!(error = %io, "could not print failure report");
    }
    err
}
