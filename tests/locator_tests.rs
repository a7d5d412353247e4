//! Locator resolver tests
//!
//! Resolution order, filtering, discriminators, and the total NotFound
//! result, all against the scripted mock driver.

mod common;

use common::{ElementSpec, MockDriver, PageSpec};
use pretty_assertions::assert_eq;
use trackpilot::locator::{
    resolve, resolve_with, Candidate, Discriminator, LocatorSpec, MatchMode, Resolution, Strategy,
};

const URL: &str = "http://localhost/mantis/page.php";

fn driver_with(page: PageSpec) -> MockDriver {
    MockDriver::new(vec![page], URL)
}

#[tokio::test]
async fn later_candidates_never_evaluated_after_a_match() {
    let page = PageSpec::new(URL)
        .element(Strategy::Id, "username", ElementSpec::new("field"))
        .element(Strategy::Css, "input[type='text']", ElementSpec::new("other"));
    let driver = driver_with(page);

    let spec = LocatorSpec::new(
        "username field",
        vec![
            Candidate::new(Strategy::Name, "username"),
            Candidate::new(Strategy::Id, "username"),
            Candidate::new(Strategy::Css, "input[type='text']"),
        ],
    );

    let resolution = resolve(&driver, &spec).await.unwrap();
    match resolution {
        Resolution::Found { candidate, .. } => assert_eq!(candidate, 1),
        Resolution::NotFound { .. } => panic!("expected a match"),
    }

    // Candidate 3 must never hit the driver.
    assert_eq!(
        driver.find_log(),
        vec![
            (Strategy::Name, "username".to_string()),
            (Strategy::Id, "username".to_string()),
        ]
    );
}

#[tokio::test]
async fn first_visible_and_enabled_match_wins() {
    let page = PageSpec::new(URL).elements_for(
        Strategy::Css,
        "input[type='submit']",
        vec![
            ElementSpec::new("hidden one").hidden(),
            ElementSpec::new("disabled one").disabled(),
            ElementSpec::new("live one"),
            ElementSpec::new("later one"),
        ],
    );
    let driver = driver_with(page);

    let spec = LocatorSpec::new(
        "submit button",
        vec![Candidate::new(Strategy::Css, "input[type='submit']")],
    );

    match resolve(&driver, &spec).await.unwrap() {
        Resolution::Found { element, .. } => {
            assert_eq!(element.text().await.unwrap(), "live one");
        }
        Resolution::NotFound { .. } => panic!("expected a match"),
    }
}

#[tokio::test]
async fn present_mode_accepts_hidden_elements() {
    let page = PageSpec::new(URL).element(
        Strategy::Name,
        "status",
        ElementSpec::new("dropdown").hidden(),
    );
    let driver = driver_with(page);

    let spec = LocatorSpec::new("status", vec![Candidate::new(Strategy::Name, "status")]);

    assert!(resolve_with(&driver, &spec, MatchMode::Present)
        .await
        .unwrap()
        .is_found());
    assert!(!resolve_with(&driver, &spec, MatchMode::Visible)
        .await
        .unwrap()
        .is_found());
}

#[tokio::test]
async fn discriminator_rejects_non_matching_text() {
    let page = PageSpec::new(URL).elements_for(
        Strategy::Css,
        "select[name='handler_id'] option",
        vec![ElementSpec::new("[none]"), ElementSpec::new("John Smith")],
    );
    let driver = driver_with(page);

    let spec = LocatorSpec::new(
        "assignee option",
        vec![Candidate::new(
            Strategy::Css,
            "select[name='handler_id'] option",
        )],
    )
    .with_discriminator(Discriminator::TextContains("john".to_string()));

    match resolve(&driver, &spec).await.unwrap() {
        Resolution::Found { element, .. } => {
            assert_eq!(element.text().await.unwrap(), "John Smith");
        }
        Resolution::NotFound { .. } => panic!("expected the discriminated match"),
    }
}

#[tokio::test]
async fn exhaustion_is_a_value_with_full_inventory() {
    let page = PageSpec::new(URL).elements_for(
        Strategy::Css,
        "select[name='handler_id'] option",
        vec![ElementSpec::new("[none]")],
    );
    let driver = driver_with(page);

    let spec = LocatorSpec::new(
        "assignee option",
        vec![
            Candidate::new(Strategy::Css, "select[name='handler_id'] option"),
            Candidate::new(Strategy::Css, "select#handler_id option"),
        ],
    )
    .with_discriminator(Discriminator::TextNotIn(vec!["[none]".to_string()]));

    match resolve(&driver, &spec).await.unwrap() {
        Resolution::Found { .. } => panic!("nothing should match"),
        Resolution::NotFound { attempted } => {
            assert_eq!(attempted.len(), 2);
            assert_eq!(attempted[0].matches, 1);
            assert_eq!(attempted[0].rejected, 1);
            assert_eq!(attempted[1].matches, 0);
            assert_eq!(attempted[1].rejected, 0);
        }
    }
}

#[tokio::test]
async fn attribute_discriminator_matches_value() {
    let page = PageSpec::new(URL).elements_for(
        Strategy::Css,
        "input[type='submit']",
        vec![
            ElementSpec::new("").attr("value", "Cancel"),
            ElementSpec::new("").attr("value", "Update Information"),
        ],
    );
    let driver = driver_with(page);

    let spec = LocatorSpec::new(
        "update button",
        vec![Candidate::new(Strategy::Css, "input[type='submit']")],
    )
    .with_discriminator(Discriminator::AttributeContains {
        name: "value".to_string(),
        value: "update".to_string(),
    });

    match resolve(&driver, &spec).await.unwrap() {
        Resolution::Found { element, .. } => {
            assert_eq!(
                element.attribute("value").await.unwrap().as_deref(),
                Some("Update Information")
            );
        }
        Resolution::NotFound { .. } => panic!("expected the update button"),
    }
}
