//! Campaign registration specs
//!
//! Verify which campaign shapes load at startup and which are rejected.

use crate::prelude::*;

#[test]
fn steps_get_sequential_ordinals_in_file_order() {
    let (_, campaigns) = try_load(
        r#"
[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "welcome"
delay = "0s"

[[campaign.onboarding.step]]
action = "tips"
delay = "2days"

[[campaign.onboarding.step]]
action = "survey"
delay = "1week"
"#,
        None,
    )
    .unwrap();

    let onboarding = campaigns.get(&CampaignId::new("onboarding")).unwrap();
    let steps: Vec<_> = onboarding
        .values()
        .map(|s| (s.ordinal(), s.action_id().to_string()))
        .collect();
    similar_asserts::assert_eq!(
        steps,
        vec![
            (1, "welcome".to_string()),
            (2, "tips".to_string()),
            (3, "survey".to_string()),
        ]
    );
}

#[test]
fn duplicate_action_is_rejected() {
    let err = try_load(
        r#"
[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "welcome"
delay = "0s"

[[campaign.onboarding.step]]
action = "welcome"
delay = "1day"
"#,
        None,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        LoadError::Configuration(ConfigurationError::DuplicateAction { .. })
    ));
}

#[test]
fn step_without_delay_or_every_is_rejected() {
    let err = try_load(
        r#"
[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "welcome"
"#,
        None,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        LoadError::Configuration(ConfigurationError::MissingTiming { .. })
    ));
}

#[test]
fn handler_missing_from_table_is_rejected() {
    let table = HandlerTable::new().with("OnboardingMailer", NoOpDispatcher);

    let err = try_load(
        r#"
[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "welcome"
delay = "0s"

[[campaign.onboarding.step]]
action = "nudge"
delay = "3days"
handler = "SmsSender"
"#,
        Some(table.catalog()),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        LoadError::Configuration(ConfigurationError::UnknownHandler { .. })
    ));
    assert!(err.to_string().contains("SmsSender"));
}

#[test]
fn mailer_alias_and_campaign_default_both_resolve() {
    let (_, campaigns) = try_load(
        r#"
[campaign.onboarding]
mailer = "OnboardingMailer"
using = "parameters"

[[campaign.onboarding.step]]
action = "welcome"
delay = "0s"

[[campaign.onboarding.step]]
action = "receipt"
delay = "1h"
mailer = "ReceiptMailer"
"#,
        None,
    )
    .unwrap();

    let onboarding = campaigns.get(&CampaignId::new("onboarding")).unwrap();
    let handlers: Vec<_> = onboarding
        .values()
        .map(|s| s.handler().to_string())
        .collect();
    assert_eq!(handlers, vec!["OnboardingMailer", "ReceiptMailer"]);
    assert!(onboarding
        .values()
        .all(|s| s.parameter_mode() == drip_core::ParameterMode::Parameters));
}

#[test]
fn recurring_step_may_precede_a_follow_up() {
    let (_, campaigns) = try_load(
        r#"
[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "digest"
every = "1week"

[[campaign.onboarding.step]]
action = "goodbye"
delay = "30days"
"#,
        None,
    )
    .unwrap();

    let onboarding = campaigns.get(&CampaignId::new("onboarding")).unwrap();
    assert_eq!(onboarding.len(), 2);
}

#[test]
fn ordinal_gaps_are_accepted() {
    let (_, campaigns) = try_load(
        r#"
[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "welcome"
delay = "0s"
ordinal = 1

[[campaign.onboarding.step]]
action = "survey"
delay = "7days"
ordinal = 3
"#,
        None,
    )
    .unwrap();

    let onboarding = campaigns.get(&CampaignId::new("onboarding")).unwrap();
    let ordinals: Vec<_> = onboarding.values().map(|s| s.ordinal()).collect();
    assert_eq!(ordinals, vec![1, 3]);
}
