//! Login workflow
//!
//! MantisBT-style two-phase login: the username form submits to a separate
//! password page. Success signals are ordered strongest-first; which marker
//! is authoritative varies between tracker skins, so the list stays
//! configurable per workflow rather than hard-coded.

use crate::classifier::{SignalSet, SuccessSignal};
use crate::config::RunConfig;
use crate::locator::{Candidate, LocatorSpec, Strategy};
use crate::step::{Step, StepAction, Workflow};
use crate::waiter::WaitCondition;
use crate::workflows::Credentials;

fn username_field() -> LocatorSpec {
    LocatorSpec::new(
        "username field",
        vec![
            Candidate::new(Strategy::Name, "username"),
            Candidate::new(Strategy::Id, "username"),
            Candidate::new(Strategy::Css, "input[type='text']"),
        ],
    )
}

fn password_field() -> LocatorSpec {
    LocatorSpec::new(
        "password field",
        vec![
            Candidate::new(Strategy::Name, "password"),
            Candidate::new(Strategy::Id, "password"),
            Candidate::new(Strategy::Css, "input[type='password']"),
        ],
    )
}

fn submit_button() -> LocatorSpec {
    LocatorSpec::new(
        "login submit button",
        vec![
            Candidate::new(Strategy::Css, "input[type='submit']"),
            Candidate::new(Strategy::Css, "button[type='submit']"),
        ],
    )
}

/// Build the login workflow
pub fn login_workflow(config: &RunConfig, credentials: &Credentials) -> Workflow {
    let timeout = config.default_timeout;

    Workflow::new(
        "login",
        vec![
            Step::new(
                "open login page",
                StepAction::Navigate {
                    url: config.url_for("login_page.php"),
                },
            ),
            Step::new(
                "enter username",
                StepAction::TypeText {
                    target: username_field(),
                    text: credentials.username.clone(),
                    clear_first: true,
                },
            )
            .after(WaitCondition::visible(username_field(), timeout)),
            Step::new(
                "submit username",
                StepAction::Click {
                    target: submit_button(),
                },
            ),
            Step::new(
                "enter password",
                StepAction::TypeText {
                    target: password_field(),
                    text: credentials.password.clone(),
                    clear_first: true,
                },
            )
            .after(WaitCondition::visible(password_field(), timeout)),
            Step::new(
                "submit credentials",
                StepAction::Click {
                    target: submit_button(),
                },
            ),
            Step::new(
                "verify login",
                StepAction::AssertOutcome {
                    signals: SignalSet::new(
                        vec![
                            SuccessSignal::ElementPresent(
                                "a[href*='account_page.php']".to_string(),
                            ),
                            SuccessSignal::TextContains("My View".to_string()),
                            SuccessSignal::TextContains("View Issues".to_string()),
                        ],
                        vec!["invalid", "account has been locked", "error"],
                    ),
                },
            )
            .after(WaitCondition::page_ready(timeout)),
        ],
    )
}
