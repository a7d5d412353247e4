//! Project creation workflow
//!
//! Walks Manage → Projects → Create New Project and fills the form. The
//! "inherit global categories" checkbox is optional: older tracker versions
//! name it differently and some hide it entirely, so that step continues as
//! Uncertain instead of failing the run.

use crate::classifier::{SignalSet, SuccessSignal};
use crate::config::RunConfig;
use crate::locator::{Candidate, LocatorSpec, Strategy};
use crate::step::{Step, StepAction, Workflow};
use crate::waiter::WaitCondition;
use crate::workflows::Parameters;

fn manage_link() -> LocatorSpec {
    LocatorSpec::new(
        "manage link",
        vec![
            Candidate::new(Strategy::LinkText, "Manage"),
            Candidate::new(Strategy::Css, "a[href*='manage_overview_page.php']"),
            Candidate::new(Strategy::PartialLinkText, "Manage"),
        ],
    )
}

fn projects_link() -> LocatorSpec {
    LocatorSpec::new(
        "projects tab",
        vec![
            Candidate::new(Strategy::LinkText, "Projects"),
            Candidate::new(Strategy::Css, "a[href*='manage_proj_page.php']"),
        ],
    )
}

fn create_project_link() -> LocatorSpec {
    LocatorSpec::new(
        "create new project button",
        vec![
            Candidate::new(Strategy::LinkText, "Create New Project"),
            Candidate::new(Strategy::Css, "input[value='Create New Project']"),
            Candidate::new(Strategy::PartialLinkText, "Create New"),
        ],
    )
}

fn name_field() -> LocatorSpec {
    LocatorSpec::new(
        "project name field",
        vec![
            Candidate::new(Strategy::Name, "name"),
            Candidate::new(Strategy::Id, "project-name"),
            Candidate::new(Strategy::Css, "input[name='name']"),
        ],
    )
}

fn status_dropdown() -> LocatorSpec {
    LocatorSpec::new(
        "project status dropdown",
        vec![
            Candidate::new(Strategy::Name, "status"),
            Candidate::new(Strategy::Css, "select[name='status']"),
        ],
    )
}

fn inherit_checkbox() -> LocatorSpec {
    LocatorSpec::new(
        "inherit global categories checkbox",
        vec![
            Candidate::new(Strategy::Name, "inherit_global"),
            Candidate::new(Strategy::Name, "inherit_global_categories"),
            Candidate::new(Strategy::Css, "input[name*='inherit']"),
        ],
    )
}

fn view_state_dropdown() -> LocatorSpec {
    LocatorSpec::new(
        "view state dropdown",
        vec![
            Candidate::new(Strategy::Name, "view_state"),
            Candidate::new(Strategy::Css, "select[name='view_state']"),
        ],
    )
}

fn description_field() -> LocatorSpec {
    LocatorSpec::new(
        "project description field",
        vec![
            Candidate::new(Strategy::Name, "description"),
            Candidate::new(Strategy::Css, "textarea[name='description']"),
        ],
    )
}

fn add_project_button() -> LocatorSpec {
    LocatorSpec::new(
        "add project button",
        vec![
            Candidate::new(Strategy::Css, "input[value='Add Project']"),
            Candidate::new(Strategy::Css, "input[type='submit']"),
            Candidate::new(Strategy::Css, "button[type='submit']"),
        ],
    )
}

/// Build the project creation workflow
pub fn create_project_workflow(config: &RunConfig, params: &Parameters) -> Workflow {
    let timeout = config.default_timeout;
    let name = params.get_or("name", "Test Project");
    let status = params.get_or("status", "development");
    let view_state = params.get_or("view_state", "public");
    let description = params.get_or(
        "description",
        "Project created by automated workflow run.",
    );

    Workflow::new(
        "create-project",
        vec![
            Step::new(
                "open manage section",
                StepAction::Click {
                    target: manage_link(),
                },
            )
            .after(WaitCondition::clickable(manage_link(), timeout)),
            Step::new(
                "open projects tab",
                StepAction::Click {
                    target: projects_link(),
                },
            )
            .after(WaitCondition::clickable(projects_link(), timeout)),
            Step::new(
                "open create project form",
                StepAction::Click {
                    target: create_project_link(),
                },
            )
            .after(WaitCondition::clickable(create_project_link(), timeout)),
            Step::new(
                "enter project name",
                StepAction::TypeText {
                    target: name_field(),
                    text: name.to_string(),
                    clear_first: true,
                },
            )
            .after(WaitCondition::visible(name_field(), timeout)),
            Step::new(
                "select project status",
                StepAction::SelectOption {
                    target: status_dropdown(),
                    option: status.to_string(),
                },
            ),
            Step::new(
                "toggle inherit categories",
                StepAction::Click {
                    target: inherit_checkbox(),
                },
            )
            .optional(),
            Step::new(
                "select view state",
                StepAction::SelectOption {
                    target: view_state_dropdown(),
                    option: view_state.to_string(),
                },
            ),
            Step::new(
                "enter project description",
                StepAction::TypeText {
                    target: description_field(),
                    text: description.to_string(),
                    clear_first: true,
                },
            ),
            Step::new(
                "submit project form",
                StepAction::Click {
                    target: add_project_button(),
                },
            ),
            Step::new(
                "verify project created",
                StepAction::AssertOutcome {
                    signals: SignalSet::new(
                        vec![
                            SuccessSignal::TextContains("Operation successful".to_string()),
                            SuccessSignal::UrlContains("manage_proj_page.php".to_string()),
                            SuccessSignal::TextContains(name.to_string()),
                        ],
                        vec!["already exists", "invalid", "error"],
                    ),
                },
            )
            .after(WaitCondition::page_ready(timeout)),
        ],
    )
}
