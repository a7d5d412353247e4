//! End-to-end workflow scenarios against the scripted mock driver
//!
//! Each test scripts the page graph a real tracker would present and runs the
//! declarative workflow through the engine, asserting the overall status and
//! the per-step details that matter for diagnosis.

mod common;

use common::{ElementSpec, MockDriver, PageSpec};
use pretty_assertions::assert_eq;
use trackpilot::config::RunConfig;
use trackpilot::engine::RunStatus;
use trackpilot::locator::Strategy;
use trackpilot::session::Session;
use trackpilot::step::StepStatus;
use trackpilot::workflows::{run_workflow, Credentials, Parameters, WorkflowKind};

const BASE: &str = "http://localhost/mantis";

fn url(path: &str) -> String {
    format!("{BASE}/{path}")
}

fn credentials() -> Credentials {
    Credentials::new("administrator", "root")
}

/// Login page -> password page -> landing page, wired through submit clicks
fn login_pages(landing: PageSpec) -> Vec<PageSpec> {
    let login = PageSpec::new(&url("login_page.php"))
        .title("Login")
        .element(Strategy::Name, "username", ElementSpec::new("").attr("name", "username"))
        .element(
            Strategy::Css,
            "input[type='submit']",
            ElementSpec::new("Login").goto(&url("login_password_page.php")),
        );

    let password = PageSpec::new(&url("login_password_page.php"))
        .title("Password")
        .element(Strategy::Name, "password", ElementSpec::new("").attr("name", "password"))
        .element(
            Strategy::Css,
            "input[type='submit']",
            ElementSpec::new("Login").goto(&landing.url),
        );

    vec![login, password, landing]
}

// Scenario A: valid credentials land on a page whose text contains "My View".
#[tokio::test(start_paused = true)]
async fn login_with_valid_credentials_succeeds() {
    let landing = PageSpec::new(&url("my_view_page.php"))
        .title("My View")
        .text("My View  Assigned to Me  Unassigned")
        .markup("<a href='/mantis/account_page.php'>administrator</a>");

    let driver = MockDriver::new(login_pages(landing), &url("login_page.php"));
    let typed_probe = driver.probe();
    let session = Session::new(Box::new(driver));
    let config = RunConfig::default();

    let result = run_workflow(
        &session,
        WorkflowKind::Login,
        &credentials(),
        &Parameters::new(),
        &config,
    )
    .await;

    assert_eq!(result.status, RunStatus::Success);
    assert!(!result.review_flagged);
    assert!(result.steps.iter().all(|s| s.status == StepStatus::Succeeded));
    // Both credential fields received their values.
    let typed = typed_probe.typed();
    assert_eq!(
        typed,
        vec![
            ("username".to_string(), "administrator".to_string()),
            ("password".to_string(), "root".to_string()),
        ]
    );
}

// Scenario B: invalid credentials bounce back to a page containing "invalid".
#[tokio::test(start_paused = true)]
async fn login_with_invalid_credentials_fails_with_keyword() {
    let bounced = PageSpec::new(&url("login_page.php?error=1"))
        .title("Login")
        .text("Your account may be disabled or blocked or the username/password you entered is invalid.");

    let driver = MockDriver::new(login_pages(bounced), &url("login_page.php"));
    let session = Session::new(Box::new(driver));
    let config = RunConfig::default();

    let result = run_workflow(
        &session,
        WorkflowKind::Login,
        &credentials(),
        &Parameters::new(),
        &config,
    )
    .await;

    assert_eq!(result.status, RunStatus::Failure);
    let verify = result.steps.last().unwrap();
    assert_eq!(verify.status, StepStatus::Failed);
    assert_eq!(verify.matched_keywords, vec!["invalid".to_string()]);
}

// Scenario C: the inherit-categories checkbox matches nothing; the step is
// Uncertain, the run continues, and a successful submission still wins.
#[tokio::test(start_paused = true)]
async fn create_project_survives_a_missing_optional_checkbox() {
    let start = PageSpec::new(&url("my_view_page.php"))
        .element(
            Strategy::LinkText,
            "Manage",
            ElementSpec::new("Manage").goto(&url("manage_overview_page.php")),
        );

    let manage = PageSpec::new(&url("manage_overview_page.php"))
        .element(
            Strategy::LinkText,
            "Projects",
            ElementSpec::new("Projects").goto(&url("manage_proj_page.php")),
        );

    let projects = PageSpec::new(&url("manage_proj_page.php"))
        .element(
            Strategy::LinkText,
            "Create New Project",
            ElementSpec::new("Create New Project").goto(&url("manage_proj_create_page.php")),
        );

    // No inherit checkbox anywhere on the form.
    let form = PageSpec::new(&url("manage_proj_create_page.php"))
        .element(Strategy::Name, "name", ElementSpec::new("").attr("name", "name"))
        .element(Strategy::Name, "status", ElementSpec::new("").attr("name", "status"))
        .element(Strategy::Name, "view_state", ElementSpec::new("").attr("name", "view_state"))
        .element(
            Strategy::Name,
            "description",
            ElementSpec::new("").attr("name", "description"),
        )
        .element(
            Strategy::Css,
            "input[value='Add Project']",
            ElementSpec::new("Add Project").goto(&url("manage_proj_page.php?created=1")),
        );

    let done = PageSpec::new(&url("manage_proj_page.php?created=1"))
        .text("Operation successful.  Test Project");

    let driver = MockDriver::new(
        vec![start, manage, projects, form, done],
        &url("my_view_page.php"),
    );
    let session = Session::new(Box::new(driver));
    let config = RunConfig::default();

    let result = run_workflow(
        &session,
        WorkflowKind::CreateProject,
        &credentials(),
        &Parameters::new(),
        &config,
    )
    .await;

    assert_eq!(result.status, RunStatus::Success);
    let checkbox_step = result
        .steps
        .iter()
        .find(|s| s.name == "toggle inherit categories")
        .unwrap();
    assert_eq!(checkbox_step.status, StepStatus::Uncertain);
    // Every candidate in the inventory matched zero elements.
    assert!(checkbox_step.attempted_locators.iter().all(|a| a.matches == 0));
    assert!(result.review_flagged);
    let verify = result.steps.last().unwrap();
    assert_eq!(verify.status, StepStatus::Succeeded);
}

// Scenario D: submission redirects to view.php?id=42 and the id is extracted.
#[tokio::test(start_paused = true)]
async fn report_issue_extracts_the_new_issue_id() {
    let start = PageSpec::new(&url("my_view_page.php")).element(
        Strategy::LinkText,
        "Report Issue",
        ElementSpec::new("Report Issue").goto(&url("bug_report_page.php")),
    );

    let form = PageSpec::new(&url("bug_report_page.php"))
        .element(
            Strategy::Name,
            "project_id",
            ElementSpec::new("").attr("name", "project_id"),
        )
        .element(
            Strategy::Name,
            "category_id",
            ElementSpec::new("").attr("name", "category_id"),
        )
        .element(
            Strategy::Name,
            "reproducibility",
            ElementSpec::new("").attr("name", "reproducibility"),
        )
        .element(
            Strategy::Name,
            "severity",
            ElementSpec::new("").attr("name", "severity"),
        )
        .element(
            Strategy::Name,
            "priority",
            ElementSpec::new("").attr("name", "priority"),
        )
        .element(Strategy::Name, "summary", ElementSpec::new("").attr("name", "summary"))
        .element(
            Strategy::Name,
            "description",
            ElementSpec::new("").attr("name", "description"),
        )
        .element(
            Strategy::Css,
            "input[value='Submit Issue']",
            ElementSpec::new("Submit Issue").goto(&url("view.php?id=42")),
        );

    let created = PageSpec::new(&url("view.php?id=42"))
        .title("0000042")
        .text("Operation successful.  Viewing Issue 0000042");

    let driver = MockDriver::new(vec![start, form, created], &url("my_view_page.php"));
    let session = Session::new(Box::new(driver));
    let config = RunConfig::default();

    let result = run_workflow(
        &session,
        WorkflowKind::ReportIssue,
        &credentials(),
        &Parameters::new(),
        &config,
    )
    .await;

    assert_eq!(result.status, RunStatus::Success);
    let verify = result.steps.last().unwrap();
    assert_eq!(verify.extracted_id.as_deref(), Some("42"));
    assert!(result.summary.contains("issue id 42"));
}

// Scenario E: the assignee dropdown only offers "[none]"; resolution is
// NotFound, the step fails with the zero-match inventory, and the run aborts.
#[tokio::test(start_paused = true)]
async fn assign_issue_fails_when_no_assignee_is_available() {
    let start = PageSpec::new(&url("my_view_page.php")).element(
        Strategy::LinkText,
        "View Issues",
        ElementSpec::new("View Issues").goto(&url("view_all_bug_page.php")),
    );

    let list = PageSpec::new(&url("view_all_bug_page.php"))
        .element(Strategy::Css, "table.buglist", ElementSpec::new("issues"))
        .element(
            Strategy::Css,
            "a[href*='view.php?id=']",
            ElementSpec::new("0000001").goto(&url("view.php?id=1")),
        );

    let issue = PageSpec::new(&url("view.php?id=1")).element(
        Strategy::Css,
        "select[name='handler_id'] option",
        ElementSpec::new("[none]"),
    );

    let driver = MockDriver::new(vec![start, list, issue], &url("my_view_page.php"));
    let session = Session::new(Box::new(driver));
    let config = RunConfig::default();

    let mut params = Parameters::new();
    params.set("assignee", "john");

    let result = run_workflow(
        &session,
        WorkflowKind::AssignIssue,
        &credentials(),
        &params,
        &config,
    )
    .await;

    assert_eq!(result.status, RunStatus::Failure);
    let pick = result
        .steps
        .iter()
        .find(|s| s.name == "pick assignee")
        .unwrap();
    assert_eq!(pick.status, StepStatus::Failed);
    // The "[none]" option was seen and rejected; the other candidates matched
    // nothing at all.
    assert_eq!(pick.attempted_locators.len(), 3);
    assert_eq!(pick.attempted_locators[0].matches, 1);
    assert_eq!(pick.attempted_locators[0].rejected, 1);
    assert!(pick.attempted_locators[1..].iter().all(|a| a.matches == 0));
    // Steps after the failure never ran.
    let after: Vec<_> = result
        .steps
        .iter()
        .skip_while(|s| s.name != "submit assignment")
        .collect();
    assert!(after.iter().all(|s| s.status == StepStatus::Pending));
}

// Scenario F: the status dropdown never appears after Edit; the 30s wait
// times out, the step escalates to Failure, and the rest stays Pending.
#[tokio::test(start_paused = true)]
async fn change_status_aborts_when_the_dropdown_never_appears() {
    let start = PageSpec::new(&url("my_view_page.php")).element(
        Strategy::LinkText,
        "View Issues",
        ElementSpec::new("View Issues").goto(&url("view_all_bug_page.php")),
    );

    let list = PageSpec::new(&url("view_all_bug_page.php")).element(
        Strategy::Css,
        "a[href*='view.php?id=']",
        ElementSpec::new("0000001").goto(&url("view.php?id=1")),
    );

    // The edit page renders, but without any status dropdown.
    let issue = PageSpec::new(&url("view.php?id=1")).element(
        Strategy::Css,
        "input[value='Edit']",
        ElementSpec::new("Edit").goto(&url("bug_update_page.php?bug_id=1")),
    );
    let editor = PageSpec::new(&url("bug_update_page.php?bug_id=1")).text("loading form...");

    let driver = MockDriver::new(vec![start, list, issue, editor], &url("my_view_page.php"));
    let session = Session::new(Box::new(driver));
    let config = RunConfig::default();

    let result = run_workflow(
        &session,
        WorkflowKind::ChangeStatus,
        &credentials(),
        &Parameters::new(),
        &config,
    )
    .await;

    assert_eq!(result.status, RunStatus::Failure);
    let wait_step = result
        .steps
        .iter()
        .find(|s| s.name == "wait for status dropdown")
        .unwrap();
    assert_eq!(wait_step.status, StepStatus::Failed);
    assert!(wait_step
        .message
        .as_deref()
        .unwrap()
        .contains("30000ms"));
    for name in ["select new status", "submit status change", "verify status change"] {
        let step = result.steps.iter().find(|s| s.name == name).unwrap();
        assert_eq!(step.status, StepStatus::Pending, "{name} should stay pending");
    }
}
