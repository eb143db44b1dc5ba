use super::{FailureKind, Verdict, VerificationOptions, Verifier, VerifierConfig};
use crate::mx::MxRecord;
use crate::mx::tests::StubResolver;
use crate::reputation::ReputationLists;
use crate::smtp::FixedLocalPart;
use crate::smtp::tests::{Behaviour, ScriptedDialer};

fn config() -> VerifierConfig {
    VerifierConfig {
        helo_domain: "verifier.test".to_string(),
        mail_from: None,
        port: 25,
        lists: ReputationLists::new(
            ["mailinator.com"],
            ["admin", "info", "support", "sales", "help", "contact"],
        ),
    }
}

fn verifier(
    resolver: StubResolver,
    dialer: ScriptedDialer,
) -> Verifier<StubResolver, ScriptedDialer> {
    Verifier::with_parts(config(), resolver, dialer)
        .with_local_part_generator(FixedLocalPart("zz-synthetic".to_string()))
}

fn options() -> VerificationOptions {
    VerificationOptions {
        per_host_timeout_ms: 200,
        ..VerificationOptions::default()
    }
}

fn unreachable_resolver() -> StubResolver {
    StubResolver::new(|domain| panic!("DNS must not be queried, got {domain}"))
}

fn two_hosts() -> StubResolver {
    StubResolver::records(vec![
        MxRecord::new(20, "mx2.example.com"),
        MxRecord::new(10, "mx1.example.com"),
    ])
}

fn accepting(catch_all: bool) -> Behaviour {
    let synthetic = if catch_all {
        "250 2.1.5 Ok\r\n"
    } else {
        "550 5.1.1 No such user\r\n"
    };
    Behaviour::script(vec![
        ("EHLO verifier.test", "250 mock\r\n"),
        ("MAIL FROM:<verify@verifier.test>", "250 2.1.0 Ok\r\n"),
        ("RCPT TO:<zz-synthetic@example.com>", synthetic),
        ("RCPT TO:<user@example.com>", "250 2.1.5 Ok\r\n"),
    ])
}

fn rejecting() -> Behaviour {
    Behaviour::script(vec![
        ("EHLO", "250 mock\r\n"),
        ("MAIL FROM:", "250 Ok\r\n"),
        ("RCPT TO:<zz-synthetic@example.com>", "550 5.1.1 No such user\r\n"),
        ("RCPT TO:<user@example.com>", "550 5.1.1 No such user\r\n"),
    ])
}

#[tokio::test]
async fn malformed_address_is_invalid_without_io() {
    let v = verifier(unreachable_resolver(), ScriptedDialer::new());
    let result = v.verify("not-an-email", &options()).await;
    assert_eq!(result.status, Verdict::Invalid);
    assert_eq!(result.reason.as_deref(), Some("Invalid email syntax"));
    assert!(!result.catch_all);
    assert!(v.dialer.dialed().is_empty());
}

#[tokio::test]
async fn disposable_domain_short_circuits_before_mx() {
    let v = verifier(unreachable_resolver(), ScriptedDialer::new());
    let result = v.verify("user@MAILINATOR.com", &options()).await;
    assert_eq!(result.status, Verdict::Invalid);
    assert_eq!(result.reason.as_deref(), Some("Disposable email domain"));
}

#[tokio::test]
async fn disposable_reported_before_role() {
    let v = verifier(unreachable_resolver(), ScriptedDialer::new());
    let result = v.verify("admin@mailinator.com", &options()).await;
    assert_eq!(result.reason.as_deref(), Some("Disposable email domain"));
}

#[tokio::test]
async fn role_based_address_is_risky() {
    let v = verifier(unreachable_resolver(), ScriptedDialer::new());
    let result = v.verify("Admin@example.com", &options()).await;
    assert_eq!(result.status, Verdict::Risky);
    assert_eq!(result.reason.as_deref(), Some("Role-based email address"));
    assert!(v.dialer.dialed().is_empty());
}

#[tokio::test]
async fn failed_mx_lookup_is_invalid() {
    let v = verifier(StubResolver::failing("nxdomain"), ScriptedDialer::new());
    let result = v.verify("user@no-such-domain.invalid", &options()).await;
    assert_eq!(result.status, Verdict::Invalid);
    assert_eq!(result.reason.as_deref(), Some("No valid MX records"));
}

#[tokio::test]
async fn empty_mx_set_is_invalid() {
    let v = verifier(StubResolver::records(Vec::new()), ScriptedDialer::new());
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::Invalid);
    assert_eq!(result.reason.as_deref(), Some("No valid MX records"));
}

#[tokio::test]
async fn accept_all_domain_is_catch_all() {
    let dialer = ScriptedDialer::new().host("mx1.example.com", accepting(true));
    let v = verifier(
        StubResolver::records(vec![MxRecord::new(10, "mx1.example.com")]),
        dialer,
    );
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::CatchAll);
    assert!(result.catch_all);

    let evidence = result.smtp_evidence.expect("evidence");
    assert_eq!(evidence.exchange, "mx1.example.com");
    assert_eq!(evidence.reply.map(|r| r.code), Some(250));
    let probe = evidence.catch_all_probe.expect("catch-all probe");
    assert_eq!(probe.address, "zz-synthetic@example.com");
}

#[tokio::test]
async fn selective_domain_accepting_recipient_is_valid() {
    let dialer = ScriptedDialer::new().host("mx1.example.com", accepting(false));
    let v = verifier(
        StubResolver::records(vec![MxRecord::new(10, "mx1.example.com")]),
        dialer,
    );
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::Valid);
    assert!(result.reason.is_none());
    assert!(!result.catch_all);
}

#[tokio::test]
async fn rejection_stops_iteration() {
    let dialer = ScriptedDialer::new()
        .host("mx1.example.com", rejecting())
        .host("mx2.example.com", accepting(false));
    let v = verifier(two_hosts(), dialer);
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::Invalid);
    assert_eq!(result.reason.as_deref(), Some("User not found (550)"));
    assert_eq!(v.dialer.dialed(), ["mx1.example.com"]);
    assert_eq!(
        result.smtp_evidence.and_then(|e| e.reply).map(|r| r.code),
        Some(550)
    );
}

#[tokio::test]
async fn policy_rejection_falls_back_to_next_host() {
    let dialer = ScriptedDialer::new()
        .host(
            "mx1.example.com",
            Behaviour::script(vec![
                ("EHLO", "250 mock\r\n"),
                ("MAIL FROM:", "250 Ok\r\n"),
                ("RCPT TO:<zz-synthetic@example.com>", "553 5.7.1 Sender address rejected: policy\r\n"),
                ("RCPT TO:<user@example.com>", "553 5.7.1 Sender address rejected: policy\r\n"),
            ]),
        )
        .host("mx2.example.com", accepting(false));
    let v = verifier(two_hosts(), dialer);
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::Valid);
    assert_eq!(v.dialer.dialed(), ["mx1.example.com", "mx2.example.com"]);
    assert_eq!(
        result.attempts[0].failure,
        Some(FailureKind::OtherProtocolFailure)
    );
}

#[tokio::test]
async fn policy_rejection_on_last_host_is_unknown() {
    let dialer = ScriptedDialer::new().host(
        "mx1.example.com",
        Behaviour::script(vec![
            ("EHLO", "250 mock\r\n"),
            ("MAIL FROM:", "250 Ok\r\n"),
            ("RCPT TO:<zz-synthetic@example.com>", "553 5.7.1 Rejected\r\n"),
            ("RCPT TO:<user@example.com>", "553 5.7.1 Rejected\r\n"),
        ]),
    );
    let v = verifier(
        StubResolver::records(vec![MxRecord::new(10, "mx1.example.com")]),
        dialer,
    );
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::Unknown);
    assert_ne!(result.reason.as_deref(), Some("User not found (550)"));
}

#[tokio::test]
async fn hosts_tried_in_preference_order_until_one_answers() {
    let dialer = ScriptedDialer::new()
        .host("mx1.example.com", Behaviour::Refuse)
        .host("mx2.example.com", accepting(false));
    let v = verifier(two_hosts(), dialer);
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::Valid);
    assert_eq!(v.dialer.dialed(), ["mx1.example.com", "mx2.example.com"]);
    assert_eq!(result.attempts.len(), 2);
    assert_eq!(
        result.attempts[0].failure,
        Some(FailureKind::ConnectionRefused)
    );
    assert_eq!(result.attempts[1].failure, None);
}

#[tokio::test]
async fn timeout_on_last_host_is_greylisted() {
    let dialer = ScriptedDialer::new()
        .host("mx1.example.com", Behaviour::Refuse)
        .host("mx2.example.com", Behaviour::Hang);
    let v = verifier(two_hosts(), dialer);
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::Greylisted);
    assert!(result.reason.is_some());
}

#[tokio::test]
async fn refusal_on_last_host_is_smtp_blocked() {
    let dialer = ScriptedDialer::new()
        .host("mx1.example.com", Behaviour::Hang)
        .host("mx2.example.com", Behaviour::Refuse);
    let v = verifier(two_hosts(), dialer);
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::SmtpBlocked);
    assert_eq!(v.dialer.dialed(), ["mx1.example.com", "mx2.example.com"]);
}

#[tokio::test]
async fn other_failure_on_last_host_is_unknown() {
    let dialer = ScriptedDialer::new().host(
        "mx1.example.com",
        Behaviour::script(vec![
            ("EHLO", "250 mock\r\n"),
            ("MAIL FROM:", "250 Ok\r\n"),
            ("RCPT TO:<zz-synthetic@example.com>", "451 4.7.1 Try later\r\n"),
            ("RCPT TO:<user@example.com>", "451 4.7.1 Try later\r\n"),
        ]),
    );
    let v = verifier(
        StubResolver::records(vec![MxRecord::new(10, "mx1.example.com")]),
        dialer,
    );
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::Unknown);
    assert_eq!(
        result.reason.as_deref(),
        Some("SMTP check failed for unknown reasons")
    );
    assert_eq!(
        result.smtp_evidence.and_then(|e| e.reply).map(|r| r.code),
        Some(451)
    );
}

#[tokio::test]
async fn max_hosts_tried_truncates_the_list() {
    let dialer = ScriptedDialer::new()
        .host("mx1.example.com", Behaviour::Refuse)
        .host("mx2.example.com", accepting(false));
    let v = verifier(two_hosts(), dialer);
    let opts = VerificationOptions {
        max_hosts_tried: Some(1),
        ..options()
    };
    let result = v.verify("user@example.com", &opts).await;
    assert_eq!(result.status, Verdict::SmtpBlocked);
    assert_eq!(v.dialer.dialed(), ["mx1.example.com"]);
}

#[tokio::test]
async fn disabled_catch_all_check_sends_single_rcpt() {
    let dialer = ScriptedDialer::new().host(
        "mx1.example.com",
        Behaviour::script(vec![
            ("EHLO", "250 mock\r\n"),
            ("MAIL FROM:", "250 Ok\r\n"),
            ("RCPT TO:<user@example.com>", "250 Ok\r\n"),
        ]),
    );
    let v = verifier(
        StubResolver::records(vec![MxRecord::new(10, "mx1.example.com")]),
        dialer,
    );
    let opts = VerificationOptions {
        check_catch_all: false,
        ..options()
    };
    let result = v.verify("user@example.com", &opts).await;
    assert_eq!(result.status, Verdict::Valid);
    assert!(!result.catch_all);
    let rcpts: Vec<_> = v
        .dialer
        .received("mx1.example.com")
        .into_iter()
        .filter(|line| line.starts_with("RCPT"))
        .collect();
    assert_eq!(rcpts, ["RCPT TO:<user@example.com>"]);
}

#[tokio::test]
async fn catch_all_domain_rejecting_recipient_is_invalid() {
    let dialer = ScriptedDialer::new().host(
        "mx1.example.com",
        Behaviour::script(vec![
            ("EHLO", "250 mock\r\n"),
            ("MAIL FROM:", "250 Ok\r\n"),
            ("RCPT TO:<zz-synthetic@example.com>", "250 Ok\r\n"),
            ("RCPT TO:<user@example.com>", "550 5.1.1 No such user\r\n"),
        ]),
    );
    let v = verifier(
        StubResolver::records(vec![MxRecord::new(10, "mx1.example.com")]),
        dialer,
    );
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::Invalid);
    assert!(!result.catch_all);
}

#[tokio::test]
async fn quit_sent_to_every_contacted_host() {
    let dialer = ScriptedDialer::new()
        .host(
            "mx1.example.com",
            Behaviour::script(vec![("EHLO", "250 mock\r\n"), ("MAIL FROM:", "451 later\r\n")]),
        )
        .host("mx2.example.com", accepting(false));
    let v = verifier(two_hosts(), dialer);
    let result = v.verify("user@example.com", &options()).await;
    assert_eq!(result.status, Verdict::Valid);
    for host in ["mx1.example.com", "mx2.example.com"] {
        let received = v.dialer.received(host);
        assert_eq!(received.last().map(String::as_str), Some("QUIT"), "{host}");
    }
}

#[tokio::test]
async fn concurrent_verifications_share_one_verifier() {
    let dialer = ScriptedDialer::new().host("mx1.example.com", accepting(false));
    let v = verifier(
        StubResolver::records(vec![MxRecord::new(10, "mx1.example.com")]),
        dialer,
    );
    let opts = options();
    let (a, b) = tokio::join!(
        v.verify("user@example.com", &opts),
        v.verify("support@example.com", &opts)
    );
    assert_eq!(a.status, Verdict::Valid);
    assert_eq!(b.status, Verdict::Risky);
}

mod malformed_input {
    use proptest::prelude::*;

    use super::*;

    fn check_no_io(raw: &str) -> Result<(), TestCaseError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let v = verifier(unreachable_resolver(), ScriptedDialer::new());
        let result = runtime.block_on(v.verify(raw, &options()));
        prop_assert_eq!(result.status, Verdict::Invalid);
        prop_assert_eq!(result.reason.as_deref(), Some("Invalid email syntax"));
        prop_assert!(v.dialer.dialed().is_empty());
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn without_at_sign(raw in "[^@]{0,60}") {
            check_no_io(&raw)?;
        }

        #[test]
        fn with_two_at_signs(a in "[a-z]{0,8}", b in "[a-z]{0,8}", c in "[a-z.]{0,12}") {
            check_no_io(&format!("{a}@{b}@{c}"))?;
        }

        #[test]
        fn with_bad_local_part(local in "[a-z]{1,8}( |\\.\\.|\")[a-z]{1,8}") {
            check_no_io(&format!("{local}@example.com"))?;
        }

        #[test]
        fn with_dotless_domain(local in "[a-z]{1,8}", label in "[a-z]{1,12}") {
            check_no_io(&format!("{local}@{label}"))?;
        }
    }
}
