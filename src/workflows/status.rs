//! Status change workflow
//!
//! Opens an issue, switches it into edit mode, and moves it to a new status.
//! The status dropdown only renders once the edit form has loaded, which can
//! take a while on slow installs; that wait is the critical one here and
//! aborts the run when it times out.

use crate::classifier::{SignalSet, SuccessSignal};
use crate::config::RunConfig;
use crate::locator::{Candidate, LocatorSpec, Strategy};
use crate::step::{Step, StepAction, Workflow};
use crate::waiter::WaitCondition;
use crate::workflows::issue::{first_issue_link, view_issues_link};
use crate::workflows::Parameters;

fn edit_button() -> LocatorSpec {
    LocatorSpec::new(
        "edit button",
        vec![
            Candidate::new(Strategy::Css, "input[value='Edit']"),
            Candidate::new(Strategy::Css, "input[type='submit'][value*='Edit']"),
            Candidate::new(Strategy::LinkText, "Edit"),
        ],
    )
}

fn status_dropdown() -> LocatorSpec {
    LocatorSpec::new(
        "status dropdown",
        vec![
            Candidate::new(Strategy::Name, "status"),
            Candidate::new(Strategy::Css, "select[name='status']"),
        ],
    )
}

fn update_button() -> LocatorSpec {
    LocatorSpec::new(
        "update information button",
        vec![
            Candidate::new(Strategy::Css, "input[value='Update Information']"),
            Candidate::new(Strategy::Css, "input[type='submit'][value*='Update']"),
            Candidate::new(Strategy::Css, "input[type='submit']"),
        ],
    )
}

/// Build the status change workflow
pub fn change_status_workflow(config: &RunConfig, params: &Parameters) -> Workflow {
    let timeout = config.default_timeout;
    let status = params.get_or("status", "resolved");

    Workflow::new(
        "change-status",
        vec![
            Step::new(
                "open view issues",
                StepAction::Click {
                    target: view_issues_link(),
                },
            )
            .after(WaitCondition::clickable(view_issues_link(), timeout)),
            Step::new(
                "open first issue",
                StepAction::Click {
                    target: first_issue_link(),
                },
            ),
            Step::new(
                "open issue editor",
                StepAction::Click {
                    target: edit_button(),
                },
            )
            .after(WaitCondition::clickable(edit_button(), timeout)),
            Step::new(
                "wait for status dropdown",
                StepAction::WaitUntil {
                    condition: WaitCondition::clickable(status_dropdown(), timeout),
                },
            ),
            Step::new(
                "select new status",
                StepAction::SelectOption {
                    target: status_dropdown(),
                    option: status.to_string(),
                },
            ),
            Step::new(
                "submit status change",
                StepAction::Click {
                    target: update_button(),
                },
            ),
            Step::new(
                "verify status change",
                StepAction::AssertOutcome {
                    signals: SignalSet::new(
                        vec![
                            SuccessSignal::TextContains("Operation successful".to_string()),
                            SuccessSignal::ElementPresent(".success".to_string()),
                            SuccessSignal::TextContains(status.to_string()),
                        ],
                        vec!["access denied", "invalid", "error"],
                    ),
                },
            )
            .after(WaitCondition::page_ready(timeout)),
        ],
    )
}
