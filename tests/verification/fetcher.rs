use crate::support::{
    OWNER, REPO, REPO_URL, github_config, mount_raw, mount_small_repo, mount_tree,
    paths_requested,
};
use skillproof::config::SamplingConfig;
use skillproof::github::RepositorySnapshotFetcher;
use skillproof::VerifyError;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer) -> RepositorySnapshotFetcher {
    RepositorySnapshotFetcher::new(&github_config(server), SamplingConfig::default()).unwrap()
}

#[tokio::test]
async fn keeps_eligible_blobs_in_tree_order() {
    let server = MockServer::start().await;
    mount_tree(
        &server,
        "main",
        &[
            ("web/app.tsx", "blob"),
            ("node_modules/left-pad/index.js", "blob"),
            ("dist/bundle.js", "blob"),
            ("static/jquery.min.js", "blob"),
            ("docs/guide.md", "blob"),
            ("src", "tree"),
            ("src/lib.rs", "blob"),
        ],
    )
    .await;
    mount_raw(&server, "main", "web/app.tsx", "export const App = () => null;").await;
    mount_raw(&server, "main", "src/lib.rs", "pub fn it() {}").await;

    let samples = fetcher(&server).fetch(REPO_URL).await.unwrap();

    let paths: Vec<_> = samples.paths().collect();
    assert_eq!(paths, vec!["web/app.tsx", "src/lib.rs"]);
    assert!(samples.iter().all(|s| s.branch == "main"));
}

#[tokio::test]
async fn tree_falls_back_to_master() {
    let server = MockServer::start().await;
    mount_tree(&server, "master", &[("main.go", "blob")]).await;
    mount_raw(&server, "master", "main.go", "package main").await;

    let samples = fetcher(&server).fetch(REPO_URL).await.unwrap();

    assert_eq!(samples.len(), 1);
    let sample = samples.iter().next().unwrap();
    assert_eq!(sample.branch, "master");
    assert_eq!(sample.content, "package main");
}

#[tokio::test]
async fn tree_failure_on_both_branches_reports_status() {
    let server = MockServer::start().await;

    let err = fetcher(&server).fetch(REPO_URL).await.unwrap_err();

    assert!(matches!(
        err,
        VerifyError::Fetch {
            status: Some(404),
            ..
        }
    ));
    let requested = paths_requested(&server.received_requests().await.unwrap());
    assert!(requested.contains(&format!("/repos/{OWNER}/{REPO}/git/trees/main")));
    assert!(requested.contains(&format!("/repos/{OWNER}/{REPO}/git/trees/master")));
}

#[tokio::test]
async fn other_default_branches_are_not_discovered() {
    let server = MockServer::start().await;
    mount_tree(&server, "trunk", &[("src/lib.rs", "blob")]).await;

    let err = fetcher(&server).fetch(REPO_URL).await.unwrap_err();

    assert!(matches!(err, VerifyError::Fetch { .. }));
}

#[tokio::test]
async fn content_falls_back_per_file_and_skips_missing() {
    let server = MockServer::start().await;
    mount_tree(
        &server,
        "main",
        &[("a.py", "blob"), ("b.py", "blob"), ("c.py", "blob")],
    )
    .await;
    mount_raw(&server, "main", "a.py", "a = 1").await;
    mount_raw(&server, "master", "b.py", "b = 2").await;

    let samples = fetcher(&server).fetch(REPO_URL).await.unwrap();

    let got: Vec<_> = samples
        .iter()
        .map(|s| (s.path.as_str(), s.branch.as_str()))
        .collect();
    assert_eq!(got, vec![("a.py", "main"), ("b.py", "master")]);
}

#[tokio::test]
async fn reserved_characters_in_paths_are_encoded() {
    let server = MockServer::start().await;
    mount_tree(
        &server,
        "main",
        &[("src/c#.py", "blob"), ("src/c", "blob"), ("src/q?.py", "blob")],
    )
    .await;
    mount_raw(&server, "main", "src/c%23.py", "print('hash')").await;
    mount_raw(&server, "main", "src/q%3F.py", "print('query')").await;
    mount_raw(&server, "main", "src/c", "unrelated").await;

    let samples = fetcher(&server).fetch(REPO_URL).await.unwrap();

    let got: Vec<_> = samples
        .iter()
        .map(|s| (s.path.as_str(), s.content.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![("src/c#.py", "print('hash')"), ("src/q?.py", "print('query')")]
    );
    let requested = paths_requested(&server.received_requests().await.unwrap());
    assert!(!requested.contains(&format!("/raw/{OWNER}/{REPO}/main/src/c")));
}

#[tokio::test]
async fn caps_file_count_and_length() {
    let server = MockServer::start().await;
    let names: Vec<String> = (0..15).map(|i| format!("src/f{i:02}.rs")).collect();
    let entries: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "blob")).collect();
    mount_tree(&server, "main", &entries).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/raw/octo/widgets/main/src/f\d+\.rs$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("é".repeat(5000)))
        .mount(&server)
        .await;

    let samples = fetcher(&server).fetch(REPO_URL).await.unwrap();

    assert_eq!(samples.len(), 10);
    assert_eq!(samples.paths().last(), Some("src/f09.rs"));
    assert!(samples.iter().all(|s| s.content.chars().count() == 3000));
}

#[tokio::test]
async fn small_repo_fingerprint_is_stable() {
    let server = MockServer::start().await;
    mount_small_repo(&server).await;

    let first = fetcher(&server).fetch(REPO_URL).await.unwrap();
    let second = fetcher(&server).fetch("octo/widgets").await.unwrap();

    assert_eq!(first, second);
    assert!(first.fingerprint().starts_with("sha256:"));
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[tokio::test]
async fn malformed_url_is_rejected_before_any_request() {
    let server = MockServer::start().await;

    let err = fetcher(&server)
        .fetch("https://github.com/just-an-owner")
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::InvalidReference(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
