//! Drip file specs
//!
//! Verify delivery settings and malformed files surface as load errors.

use crate::prelude::*;
use std::time::Duration;

#[test]
fn delivery_table_is_loaded_with_defaults_filled_in() {
    let (config, _) = try_load(
        r#"
[delivery]
async_delivery = true
dispatch_queue = "mailers"
dispatch_timeout = "30s"

[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "welcome"
delay = "0s"
"#,
        None,
    )
    .unwrap();

    assert!(config.async_delivery);
    assert_eq!(config.dispatch_queue.as_deref(), Some("mailers"));
    assert_eq!(config.batch_size, 1000);
    assert_eq!(config.dispatch_timeout, Some(Duration::from_secs(30)));
}

#[test]
fn missing_delivery_table_means_synchronous() {
    let (config, _) = try_load(
        r#"
[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "welcome"
delay = "0s"
"#,
        None,
    )
    .unwrap();

    assert_eq!(config, DeliveryConfig::default());
}

#[test]
fn unknown_step_option_is_a_parse_error() {
    let err = try_load(
        r#"
[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "welcome"
delay = "0s"
wait = "1day"
"#,
        None,
    )
    .unwrap_err();

    assert!(matches!(err, LoadError::Parse { .. }));
    assert!(err.to_string().contains("campaigns.toml"));
}

#[test]
fn zero_batch_size_is_rejected() {
    let err = try_load(
        r#"
[delivery]
batch_size = 0
"#,
        None,
    )
    .unwrap_err();

    assert!(matches!(err, LoadError::Parse { .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_campaigns(&dir.path().join("absent.toml"), None).unwrap_err();

    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn campaigns_are_listed_in_file_order() {
    let (_, campaigns) = try_load(
        r#"
[campaign.winback]
handler = "WinbackMailer"

[[campaign.winback.step]]
action = "miss_you"
delay = "30days"

[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "welcome"
delay = "0s"
"#,
        None,
    )
    .unwrap();

    let ids: Vec<_> = campaigns.iter().map(|c| c.id().to_string()).collect();
    assert_eq!(ids, vec!["winback", "onboarding"]);
}
