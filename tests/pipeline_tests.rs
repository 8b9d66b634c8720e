// Retrieve-and-render pipeline end to end against the fake API

mod common;

use common::{Account, FakeTidepool, feed};
use glucose_report::error::ReportError;
use glucose_report::models::{Credentials, DateRange, ReportRequest, Subtype};
use glucose_report::render::ReportLayout;
use glucose_report::report::build_report;
use std::time::Duration;

fn request(email: &str, password: &str) -> ReportRequest {
    ReportRequest {
        credentials: Credentials::new(email, password),
        range: DateRange::default(),
        subtype: Subtype::Smbg,
    }
}

fn pdf_text(pdf: &[u8]) -> String {
    String::from_utf8_lossy(pdf).into_owned()
}

#[tokio::test]
async fn mixed_feed_renders_only_smbg_rows() {
    let body = feed(&[
        ("smbg", "2021-03-17T08:33:00", 5.5),
        ("cbg", "2021-03-17T08:35:00", 7.0),
        ("smbg", "2021-03-17T12:01:30", 6.1),
        ("basal", "2021-03-17T13:00:00", 0.8),
        ("smbg", "2021-03-17T19:45:00", -0.1),
    ]);
    let fake = FakeTidepool::spawn(vec![Account::new("a@x.org", "pw", "u1", "t1", body)]).await;
    let report = build_report(&fake.client(), &request("a@x.org", "pw"), &ReportLayout::default())
        .await
        .unwrap();

    assert_eq!(report.readings, 3);
    let s = pdf_text(&report.pdf);
    assert!(s.starts_with("%PDF-1.4"));
    assert!(s.contains("(Page 1 / 1) Tj"));
    assert_eq!(s.matches(" re S").count(), 12);
    assert!(s.contains("(2021-03-17) Tj"));
    assert!(s.contains("(08:33:00) Tj"));
    assert!(s.contains("(99) Tj"));
    assert!(s.contains("(109) Tj"));
    assert!(s.contains("(-1) Tj"));
    assert!(!s.contains("(08:35:00) Tj"));
    assert!(!s.contains("(126) Tj"));
}

#[tokio::test]
async fn empty_feed_is_a_report_not_an_error() {
    let fake = FakeTidepool::spawn(vec![Account::new("a@x.org", "pw", "u1", "t1", "[]")]).await;
    let report = build_report(&fake.client(), &request("a@x.org", "pw"), &ReportLayout::default())
        .await
        .unwrap();
    assert_eq!(report.readings, 0);
    let s = pdf_text(&report.pdf);
    assert!(s.contains("(Page 1 / 1) Tj"));
    assert_eq!(s.matches(" re S").count(), 3);
}

#[tokio::test]
async fn error_object_becomes_service_reported() {
    let body = r#"{"status":403,"id":"x","code":"invalid","message":"bad creds"}"#;
    let fake = FakeTidepool::spawn(vec![Account::new("a@x.org", "pw", "u1", "t1", body)]).await;
    let err = build_report(&fake.client(), &request("a@x.org", "pw"), &ReportLayout::default())
        .await
        .unwrap_err();
    match err {
        ReportError::ServiceReported(se) => {
            assert_eq!(se.status, 403);
            assert_eq!(se.id, "x");
            assert_eq!(se.code, "invalid");
            assert_eq!(se.message, "bad creds");
        }
        other => panic!("expected ServiceReported, got {:?}", other),
    }
}

#[tokio::test]
async fn garbage_body_is_malformed_payload() {
    let fake =
        FakeTidepool::spawn(vec![Account::new("a@x.org", "pw", "u1", "t1", "not json")]).await;
    let err = build_report(&fake.client(), &request("a@x.org", "pw"), &ReportLayout::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::MalformedPayload(_)));
}

#[tokio::test]
async fn bad_credentials_stop_before_fetch() {
    let fake = FakeTidepool::spawn(vec![Account::new("a@x.org", "pw", "u1", "t1", "[]")]).await;
    let err = build_report(&fake.client(), &request("a@x.org", "nope"), &ReportLayout::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::Auth { status: 401, .. }));
    assert!(fake.recorded().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reports_do_not_mix_readings() {
    // Alice's fetch is slowed so both requests are in flight together.
    let mut alice = Account::new(
        "alice@x.org",
        "pw-a",
        "alice-id",
        "tok-a",
        feed(&[
            ("smbg", "2021-01-01T07:00:00", 5.0),
            ("smbg", "2021-01-01T12:00:00", 6.0),
        ]),
    );
    alice.data_delay = Duration::from_millis(200);
    let bob = Account::new(
        "bob@x.org",
        "pw-b",
        "bob-id",
        "tok-b",
        feed(&[
            ("smbg", "2022-06-30T22:15:00", 10.0),
            ("smbg", "2022-07-01T06:30:00", 3.0),
            ("smbg", "2022-07-01T09:00:00", 8.0),
        ]),
    );
    let fake = FakeTidepool::spawn(vec![alice, bob]).await;
    let client = fake.client();
    let layout = ReportLayout::default();
    let alice_req = request("alice@x.org", "pw-a");
    let bob_req = request("bob@x.org", "pw-b");

    let (a, b) = tokio::join!(
        build_report(&client, &alice_req, &layout),
        build_report(&client, &bob_req, &layout),
    );
    let (a, b) = (pdf_text(&a.unwrap().pdf), pdf_text(&b.unwrap().pdf));

    assert!(a.contains("(2021-01-01) Tj"));
    assert!(a.contains("(90) Tj") && a.contains("(108) Tj"));
    assert!(!a.contains("(2022-07-01) Tj"));
    assert!(!a.contains("(180) Tj"));
    assert_eq!(a.matches(" re S").count(), (2 + 1) * 3);

    assert!(b.contains("(2022-07-01) Tj"));
    assert!(b.contains("(180) Tj") && b.contains("(54) Tj") && b.contains("(144) Tj"));
    assert!(!b.contains("(2021-01-01) Tj"));
    assert!(!b.contains("(90) Tj"));
    assert_eq!(b.matches(" re S").count(), (3 + 1) * 3);
}
