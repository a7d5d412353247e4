//! Issue workflows: report and assign
//!
//! Reporting files a fresh issue through the report form; assignment opens
//! the first issue in the list and picks a handler. Issue links and the
//! assignee dropdown are the drift-prone parts, so both carry several
//! candidates and discriminators distilled from how these pages actually
//! render: id links show zero-padded numeric text, and an unassignable
//! dropdown holds only a "[none]" option.

use std::time::Duration;

use crate::classifier::{SignalSet, SuccessSignal};
use crate::config::RunConfig;
use crate::locator::{Candidate, Discriminator, LocatorSpec, Strategy};
use crate::step::{Step, StepAction, Workflow};
use crate::waiter::WaitCondition;
use crate::workflows::Parameters;

fn report_issue_link() -> LocatorSpec {
    LocatorSpec::new(
        "report issue link",
        vec![
            Candidate::new(Strategy::LinkText, "Report Issue"),
            Candidate::new(Strategy::Css, "a[href*='bug_report_page.php']"),
        ],
    )
}

fn project_dropdown() -> LocatorSpec {
    LocatorSpec::new(
        "project chooser",
        vec![
            Candidate::new(Strategy::Name, "project_id"),
            Candidate::new(Strategy::Css, "select[name='project_id']"),
        ],
    )
}

fn category_dropdown() -> LocatorSpec {
    LocatorSpec::new(
        "category dropdown",
        vec![
            Candidate::new(Strategy::Name, "category_id"),
            Candidate::new(Strategy::Css, "select[name='category_id']"),
        ],
    )
}

fn simple_dropdown(label: &str, name: &str) -> LocatorSpec {
    LocatorSpec::new(
        label,
        vec![
            Candidate::new(Strategy::Name, name),
            Candidate::new(Strategy::Css, format!("select[name='{name}']")),
        ],
    )
}

fn summary_field() -> LocatorSpec {
    LocatorSpec::new(
        "summary field",
        vec![
            Candidate::new(Strategy::Name, "summary"),
            Candidate::new(Strategy::Id, "summary"),
        ],
    )
}

fn description_field() -> LocatorSpec {
    LocatorSpec::new(
        "issue description field",
        vec![
            Candidate::new(Strategy::Name, "description"),
            Candidate::new(Strategy::Css, "textarea[name='description']"),
        ],
    )
}

fn submit_issue_button() -> LocatorSpec {
    LocatorSpec::new(
        "submit issue button",
        vec![
            Candidate::new(Strategy::Css, "input[value='Submit Issue']"),
            Candidate::new(Strategy::Css, "input[type='submit']"),
            Candidate::new(Strategy::Css, "button[type='submit']"),
        ],
    )
}

/// Build the issue reporting workflow
pub fn report_issue_workflow(config: &RunConfig, params: &Parameters) -> Workflow {
    let timeout = config.default_timeout;
    let project = params.get_or("project", "MantisBT project");
    let category = params.get_or("category", "General");
    let reproducibility = params.get_or("reproducibility", "have not tried");
    let severity = params.get_or("severity", "minor");
    let priority = params.get_or("priority", "normal");
    let summary = params.get_or("summary", "Issue reported by automated workflow run");
    let description = params.get_or(
        "description",
        "Filed automatically while exercising the issue-report workflow.",
    );

    Workflow::new(
        "report-issue",
        vec![
            Step::new(
                "open report issue form",
                StepAction::Click {
                    target: report_issue_link(),
                },
            )
            .after(WaitCondition::clickable(report_issue_link(), timeout)),
            // Single-project installs skip the chooser entirely.
            Step::new(
                "choose project",
                StepAction::SelectOption {
                    target: project_dropdown(),
                    option: project.to_string(),
                },
            )
            .optional(),
            Step::new(
                "select category",
                StepAction::SelectOption {
                    target: category_dropdown(),
                    option: category.to_string(),
                },
            )
            .after(WaitCondition::visible(category_dropdown(), timeout)),
            Step::new(
                "select reproducibility",
                StepAction::SelectOption {
                    target: simple_dropdown("reproducibility dropdown", "reproducibility"),
                    option: reproducibility.to_string(),
                },
            ),
            Step::new(
                "select severity",
                StepAction::SelectOption {
                    target: simple_dropdown("severity dropdown", "severity"),
                    option: severity.to_string(),
                },
            ),
            Step::new(
                "select priority",
                StepAction::SelectOption {
                    target: simple_dropdown("priority dropdown", "priority"),
                    option: priority.to_string(),
                },
            ),
            Step::new(
                "enter summary",
                StepAction::TypeText {
                    target: summary_field(),
                    text: summary.to_string(),
                    clear_first: true,
                },
            ),
            Step::new(
                "enter description",
                StepAction::TypeText {
                    target: description_field(),
                    text: description.to_string(),
                    clear_first: true,
                },
            ),
            Step::new(
                "submit issue",
                StepAction::Click {
                    target: submit_issue_button(),
                },
            ),
            Step::new(
                "verify issue reported",
                StepAction::AssertOutcome {
                    signals: SignalSet::new(
                        vec![
                            SuccessSignal::UrlContains("view.php?id=".to_string()),
                            SuccessSignal::TextContains("Operation successful".to_string()),
                            SuccessSignal::ElementPresent("h2".to_string()),
                        ],
                        vec!["required", "invalid", "error"],
                    ),
                },
            )
            .after(WaitCondition::page_ready(timeout)),
        ],
    )
}

pub(super) fn view_issues_link() -> LocatorSpec {
    LocatorSpec::new(
        "view issues link",
        vec![
            Candidate::new(Strategy::LinkText, "View Issues"),
            Candidate::new(Strategy::Css, "a[href*='view_all_bug_page.php']"),
            Candidate::new(Strategy::PartialLinkText, "View"),
        ],
    )
}

fn issue_list() -> LocatorSpec {
    LocatorSpec::new(
        "issue list table",
        vec![
            Candidate::new(Strategy::Css, "table.buglist"),
            Candidate::new(Strategy::Css, "#buglist"),
            Candidate::new(Strategy::Css, "table.table"),
        ],
    )
}

pub(super) fn first_issue_link() -> LocatorSpec {
    // Issue id links render zero-padded numeric text ("0000001"); the bare
    // anchor fallback relies on the discriminator alone.
    LocatorSpec::new(
        "issue link",
        vec![
            Candidate::new(Strategy::Css, "a[href*='view.php?id=']"),
            Candidate::new(Strategy::Css, "a[href*='bug_view_page.php']"),
            Candidate::new(Strategy::TagName, "a"),
        ],
    )
    .with_discriminator(Discriminator::TextMatches(r"^\d{6,}$".to_string()))
}

fn assignee_option(assignee: &str) -> LocatorSpec {
    LocatorSpec::new(
        "assignee option",
        vec![
            Candidate::new(Strategy::Css, "select[name='handler_id'] option"),
            Candidate::new(Strategy::Css, "select#handler_id option"),
            Candidate::new(Strategy::XPath, "//select[contains(@name,'handler')]//option"),
        ],
    )
    .with_discriminator(Discriminator::TextContains(assignee.to_string()))
}

fn update_issue_button() -> LocatorSpec {
    LocatorSpec::new(
        "assign/update button",
        vec![
            Candidate::new(Strategy::Css, "input[type='submit'][value*='Assign']"),
            Candidate::new(Strategy::Css, "input[type='submit'][value*='Update']"),
            Candidate::new(Strategy::Css, "input[type='submit']"),
        ],
    )
}

/// Build the issue assignment workflow
pub fn assign_issue_workflow(config: &RunConfig, params: &Parameters) -> Workflow {
    let timeout = config.default_timeout;
    let assignee = params.get_or("assignee", "john");

    Workflow::new(
        "assign-issue",
        vec![
            Step::new(
                "open view issues",
                StepAction::Click {
                    target: view_issues_link(),
                },
            )
            .after(WaitCondition::clickable(view_issues_link(), timeout)),
            Step::new(
                "wait for issue list",
                StepAction::WaitUntil {
                    condition: WaitCondition::present(issue_list(), timeout),
                },
            )
            .optional(),
            Step::new(
                "open first issue",
                StepAction::Click {
                    target: first_issue_link(),
                },
            ),
            // The list page re-renders its filters after load; there is no
            // readiness signal for that, so keep one short fixed delay.
            Step::new(
                "let issue page settle",
                StepAction::WaitUntil {
                    condition: WaitCondition::delay(Duration::from_millis(500)),
                },
            )
            .optional(),
            Step::new(
                "pick assignee",
                StepAction::Click {
                    target: assignee_option(assignee),
                },
            ),
            Step::new(
                "submit assignment",
                StepAction::Click {
                    target: update_issue_button(),
                },
            ),
            Step::new(
                "verify assignment",
                StepAction::AssertOutcome {
                    signals: SignalSet::new(
                        vec![
                            SuccessSignal::TextContains("Operation successful".to_string()),
                            SuccessSignal::TextContains("assigned to".to_string()),
                        ],
                        vec!["access denied", "invalid", "error"],
                    ),
                },
            )
            .after(WaitCondition::page_ready(timeout)),
        ],
    )
}
