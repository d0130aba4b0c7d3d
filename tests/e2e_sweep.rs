//! End-to-end sweeps with the real HTTP clients against mock servers

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use wordpress_version_checker::config::DEFAULT_BOT_LOGIN;
use wordpress_version_checker::github::{GitHubClient, RepositoryRef};
use wordpress_version_checker::sweep::{ISSUE_TITLE, Sweeper};
use wordpress_version_checker::version::WordPressVersionSource;

/// Counts warn and error events emitted by this crate
struct ProblemCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for ProblemCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() <= Level::WARN
            && metadata.target().starts_with("wordpress_version_checker")
        {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn contents_body(readme: &str) -> String {
    json!({
        "type": "file",
        "encoding": "base64",
        "content": STANDARD.encode(readme),
    })
    .to_string()
}

fn sweeper(wordpress: &ServerGuard, github: &ServerGuard) -> Sweeper {
    let timeout = Duration::from_secs(5);
    let source = WordPressVersionSource::new(&wordpress.url(), timeout).unwrap();
    let tracker = GitHubClient::new(&github.url(), Some("token".to_string()), timeout).unwrap();

    Sweeper::new(
        Arc::new(source),
        Arc::new(tracker),
        vec![RepositoryRef::new("example", "plugin", "readme.txt")],
    )
    .with_stagger_delay(Duration::ZERO)
}

#[tokio::test(flavor = "multi_thread")]
async fn sweep_files_issue_for_stale_plugin() {
    let mut wordpress = Server::new_async().await;
    let mut github = Server::new_async().await;

    let latest_mock = wordpress
        .mock("GET", "/core/stable-check/1.0/")
        .with_status(200)
        .with_body(r#"{"6.3.2": "outdated", "6.4.1": "insecure", "6.4.2": "latest"}"#)
        .expect(1)
        .create_async()
        .await;

    let contents_mock = github
        .mock("GET", "/repos/example/plugin/contents/readme.txt")
        .match_header("authorization", "Bearer token")
        .with_status(200)
        .with_body(contents_body(
            "=== Example ===\nRequires at least: 5.0\nTested up to: 6.3\nStable tag: 1.0\n",
        ))
        .expect(1)
        .create_async()
        .await;

    let list_mock = github
        .mock("GET", "/repos/example/plugin/issues")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("creator".into(), DEFAULT_BOT_LOGIN.into()),
            Matcher::UrlEncoded("state".into(), "all".into()),
        ]))
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let create_mock = github
        .mock("POST", "/repos/example/plugin/issues")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({ "title": ISSUE_TITLE })),
            Matcher::Regex(r"6\.3.*6\.4\.2".to_string()),
        ]))
        .with_status(201)
        .with_body(r#"{"number": 1, "title": "t", "state": "open"}"#)
        .expect(1)
        .create_async()
        .await;

    let report = sweeper(&wordpress, &github).run().await.unwrap();

    latest_mock.assert_async().await;
    contents_mock.assert_async().await;
    list_mock.assert_async().await;
    create_mock.assert_async().await;
    assert_eq!(report.notified_count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn sweep_skips_creation_when_bot_issue_exists() {
    let mut wordpress = Server::new_async().await;
    let mut github = Server::new_async().await;

    wordpress
        .mock("GET", "/core/stable-check/1.0/")
        .with_status(200)
        .with_body(r#"{"6.4.2": "latest"}"#)
        .create_async()
        .await;

    github
        .mock("GET", "/repos/example/plugin/contents/readme.txt")
        .with_status(200)
        .with_body(contents_body("Tested up to: 6.3\n"))
        .create_async()
        .await;

    github
        .mock("GET", "/repos/example/plugin/issues")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([{
                "number": 3,
                "title": ISSUE_TITLE,
                "state": "closed",
                "user": { "login": DEFAULT_BOT_LOGIN }
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let create_mock = github
        .mock("POST", "/repos/example/plugin/issues")
        .expect(0)
        .create_async()
        .await;

    let report = sweeper(&wordpress, &github).run().await.unwrap();

    create_mock.assert_async().await;
    assert_eq!(report.already_notified_count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn sweep_aborts_when_wordpress_api_fails() {
    let mut wordpress = Server::new_async().await;
    let mut github = Server::new_async().await;

    wordpress
        .mock("GET", "/core/stable-check/1.0/")
        .with_status(500)
        .create_async()
        .await;

    let any_github_call = github
        .mock("GET", Matcher::Any)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let result = sweeper(&wordpress, &github).run().await;

    any_github_call.assert_async().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn failed_latest_fetch_is_logged_once() {
    let mut wordpress = Server::new_async().await;
    let github = Server::new_async().await;

    wordpress
        .mock("GET", "/core/stable-check/1.0/")
        .with_status(500)
        .create_async()
        .await;

    let problems = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ProblemCounter(problems.clone()));
    let _default = tracing::subscriber::set_default(subscriber);

    let result = sweeper(&wordpress, &github).run().await;

    assert!(result.is_err());
    assert_eq!(problems.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unparsable_latest_response_is_logged_once() {
    let mut wordpress = Server::new_async().await;
    let github = Server::new_async().await;

    wordpress
        .mock("GET", "/core/stable-check/1.0/")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let problems = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ProblemCounter(problems.clone()));
    let _default = tracing::subscriber::set_default(subscriber);

    let result = sweeper(&wordpress, &github).run().await;

    assert!(result.is_err());
    assert_eq!(problems.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_readme_read_is_logged_once() {
    let mut wordpress = Server::new_async().await;
    let mut github = Server::new_async().await;

    wordpress
        .mock("GET", "/core/stable-check/1.0/")
        .with_status(200)
        .with_body(r#"{"6.4.2": "latest"}"#)
        .create_async()
        .await;

    github
        .mock("GET", "/repos/example/plugin/contents/readme.txt")
        .with_status(502)
        .create_async()
        .await;

    let problems = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ProblemCounter(problems.clone()));
    let _default = tracing::subscriber::set_default(subscriber);

    let report = sweeper(&wordpress, &github).run().await.unwrap();

    assert_eq!(report.failed_count(), 1);
    assert_eq!(problems.load(Ordering::SeqCst), 1);
}
