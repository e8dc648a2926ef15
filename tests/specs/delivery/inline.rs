//! Inline delivery specs
//!
//! Verify batches dispatch exactly the step that is due, one per subject,
//! and that failures are retried on the next run.

use crate::prelude::*;

const ONE_DAY: &str = r#"
[campaign.reminder]
handler = "ReminderMailer"

[[campaign.reminder.step]]
action = "nudge"
delay = "1day"
"#;

const ONBOARDING: &str = r#"
[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "welcome"
delay = "0s"

[[campaign.onboarding.step]]
action = "tips"
delay = "2days"
"#;

const NEWSLETTER: &str = r#"
[campaign.newsletter]
handler = "NewsletterMailer"

[[campaign.newsletter.step]]
action = "welcome"
delay = "0s"

[[campaign.newsletter.step]]
action = "digest"
every = "1week"
"#;

#[tokio::test]
async fn delayed_step_waits_for_its_delay() {
    let drip = Drip::load(ONE_DAY);
    drip.enroll("user-1", "reminder");

    let early = drip.at(TimeDelta::hours(23)).run("reminder").await;
    assert_eq!(early.skipped_not_due, 1);
    assert!(drip.delivered_to("user-1").is_empty());

    let due = drip.at(TimeDelta::hours(25)).run("reminder").await;
    assert_eq!(due.dispatched, 1);
    assert_eq!(drip.delivered_to("user-1"), vec!["nudge"]);
    assert_eq!(drip.cursor("user-1", "reminder"), Some(1));
}

#[tokio::test]
async fn later_step_waits_for_its_own_delay_after_earlier_completes() {
    let drip = Drip::load(ONBOARDING);
    drip.enroll("user-1", "onboarding");

    drip.run("onboarding").await;
    assert_eq!(drip.delivered_to("user-1"), vec!["welcome"]);

    let next_day = drip.at(TimeDelta::days(1)).run("onboarding").await;
    assert_eq!(next_day.skipped_not_due, 1);

    let later = drip
        .at(TimeDelta::days(2) + TimeDelta::hours(1))
        .run("onboarding")
        .await;
    assert_eq!(later.dispatched, 1);
    assert_eq!(drip.delivered_to("user-1"), vec!["welcome", "tips"]);

    let done = drip.at(TimeDelta::days(30)).run("onboarding").await;
    assert_eq!(done.complete, 1);
}

#[tokio::test]
async fn overdue_steps_are_never_skipped() {
    let drip = Drip::load(ONBOARDING);
    drip.enroll("user-1", "onboarding");

    let result = drip.at(TimeDelta::days(10)).run("onboarding").await;

    assert_eq!(result.dispatched, 1);
    assert_eq!(drip.delivered_to("user-1"), vec!["welcome"]);
    assert_eq!(drip.cursor("user-1", "onboarding"), Some(1));
}

#[tokio::test]
async fn failed_dispatch_is_offered_again_next_batch() {
    let drip = Drip::load(ONBOARDING);
    drip.enroll("user-1", "onboarding").enroll("user-2", "onboarding");
    drip.dispatcher.fail_for("user-1", "mailbox unavailable");

    let first = drip.run("onboarding").await;
    assert_eq!(first.dispatched, 1);
    assert_eq!(first.failed.len(), 1);
    assert_eq!(first.failed[0].subject_id, SubjectId::new("user-1"));
    assert_eq!(drip.cursor("user-1", "onboarding"), None);

    drip.dispatcher.clear_failures();
    let second = drip.at(TimeDelta::minutes(5)).run("onboarding").await;
    assert_eq!(second.dispatched, 1);
    assert!(second.failed.is_empty());
    assert_eq!(drip.cursor("user-1", "onboarding"), Some(1));
    assert_eq!(drip.delivered_to("user-1"), vec!["welcome", "welcome"]);
}

#[tokio::test]
async fn recurring_step_repeats_from_last_delivery() {
    let drip = Drip::load(NEWSLETTER);
    drip.enroll("user-1", "newsletter");

    drip.run("newsletter").await;
    assert_eq!(drip.at(TimeDelta::days(6)).run("newsletter").await.dispatched, 0);

    let first_digest = TimeDelta::days(7) + TimeDelta::hours(1);
    assert_eq!(drip.at(first_digest).run("newsletter").await.dispatched, 1);
    assert_eq!(drip.at(TimeDelta::days(14)).run("newsletter").await.dispatched, 0);
    assert_eq!(
        drip.at(first_digest + TimeDelta::days(7))
            .run("newsletter")
            .await
            .dispatched,
        1
    );

    assert_eq!(
        drip.delivered_to("user-1"),
        vec!["welcome", "digest", "digest"]
    );
    assert_eq!(drip.cursor("user-1", "newsletter"), Some(2));
}

const DIGEST_THEN_GOODBYE: &str = r#"
[campaign.trial]
handler = "TrialMailer"

[[campaign.trial.step]]
action = "digest"
every = "1week"

[[campaign.trial.step]]
action = "goodbye"
delay = "30days"
"#;

#[tokio::test]
async fn recurring_step_hands_over_to_the_next_step() {
    let drip = Drip::load(DIGEST_THEN_GOODBYE);
    drip.enroll("user-1", "trial");

    for week in 1..=4 {
        let result = drip.at(TimeDelta::weeks(week)).run("trial").await;
        assert_eq!(result.dispatched, 1);
    }
    assert_eq!(drip.cursor("user-1", "trial"), Some(1));

    let handover = drip.at(TimeDelta::days(30)).run("trial").await;
    assert_eq!(handover.dispatched, 1);
    assert_eq!(drip.cursor("user-1", "trial"), Some(2));

    let after = drip.at(TimeDelta::days(60)).run("trial").await;
    assert_eq!(after.complete, 1);
    assert_eq!(
        drip.delivered_to("user-1"),
        vec!["digest", "digest", "digest", "digest", "goodbye"]
    );
}
