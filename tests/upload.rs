use std::io::Write as _;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use gh_upload::{GithubConfig, ProgressState, UploadError, UploadOutcome, UploadRequest, Uploader};
use mockito::Matcher;
use serde_json::json;

fn config(server_url: &str) -> GithubConfig {
	GithubConfig::new("test_token_123".to_owned(), "main".to_owned(), "octo/repo".to_owned()).api_base(server_url)
}

fn file_with(bytes: &[u8]) -> tempfile::NamedTempFile {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	file.write_all(bytes).unwrap();
	file.flush().unwrap();
	file
}

fn sample(len: usize) -> Vec<u8> {
	(0..len).map(|i| (i * 7 % 256) as u8).collect()
}

#[tokio::test]
async fn created_is_success() {
	let mut server = mockito::Server::new_async().await;
	let data = sample(10_000);
	let file = file_with(&data);

	let mock = server
		.mock("PUT", "/repos/octo/repo/contents/docs/data.bin")
		.match_header("authorization", "token test_token_123")
		.match_header("accept", "application/vnd.github.v3+json")
		.match_body(Matcher::Json(json!({
			"message": "add data",
			"content": STANDARD.encode(&data),
			"branch": "main",
		})))
		.with_status(201)
		.with_body(
			json!({
				"content": {"path": "docs/data.bin", "sha": "blob"},
				"commit": {"sha": "c0ffee", "html_url": "https://github.com/octo/repo/commit/c0ffee"}
			})
			.to_string(),
		)
		.create_async()
		.await;

	let config = config(&server.url());
	let request = config.request(file.path(), "docs/data.bin", "add data").unwrap();
	let outcome = gh_upload::upload(&config, &request, |_| {}).await.unwrap();

	match outcome {
		UploadOutcome::Success { status, commit } => {
			assert_eq!(status, 201);
			assert_eq!(commit.unwrap().sha, "c0ffee");
		}
		other => panic!("expected success, got {other:?}"),
	}
	mock.assert_async().await;
}

#[tokio::test]
async fn bad_credentials_is_failure() {
	let mut server = mockito::Server::new_async().await;
	let file = file_with(b"hello");

	let mock = server
		.mock("PUT", "/repos/octo/repo/contents/hello.txt")
		.with_status(403)
		.with_body("Bad credentials")
		.create_async()
		.await;

	let config = config(&server.url());
	let request = config.request(file.path(), "hello.txt", "hi").unwrap();
	let outcome = gh_upload::upload(&config, &request, |_| {}).await.unwrap();

	assert_eq!(outcome, UploadOutcome::Failure {
		status: 403,
		message: "Bad credentials".to_owned()
	});
	mock.assert_async().await;
}

#[tokio::test]
async fn malformed_repo_never_hits_network() {
	let mut server = mockito::Server::new_async().await;
	let file = file_with(b"hello");
	let mock = server.mock("PUT", Matcher::Any).expect(0).create_async().await;

	let config = GithubConfig::new("t".to_owned(), "main".to_owned(), "no-slash-here".to_owned()).api_base(server.url());
	let err = config.request(file.path(), "hello.txt", "hi").unwrap_err();
	assert!(matches!(err, UploadError::Config(_)));

	mock.assert_async().await;
}

#[tokio::test]
async fn missing_file_never_hits_network() {
	let mut server = mockito::Server::new_async().await;
	let mock = server.mock("PUT", Matcher::Any).expect(0).create_async().await;
	let dir = tempfile::tempdir().unwrap();

	let config = config(&server.url());
	let request = config.request(dir.path().join("gone.bin"), "gone.bin", "hi").unwrap();
	let err = gh_upload::upload(&config, &request, |_| {}).await.unwrap_err();
	assert!(matches!(err, UploadError::Io(_)));

	mock.assert_async().await;
}

#[tokio::test]
async fn empty_file_sends_one_put() {
	let mut server = mockito::Server::new_async().await;
	let file = file_with(b"");

	let mock = server
		.mock("PUT", "/repos/octo/repo/contents/empty.txt")
		.match_body(Matcher::PartialJson(json!({"content": ""})))
		.with_status(201)
		.with_body("{}")
		.expect(1)
		.create_async()
		.await;

	let config = config(&server.url());
	let request = config.request(file.path(), "empty.txt", "empty").unwrap();
	let mut calls = 0;
	let outcome = gh_upload::upload(&config, &request, |_| calls += 1).await.unwrap();

	assert_eq!(outcome, UploadOutcome::Success { status: 201, commit: None });
	assert_eq!(calls, 0);
	mock.assert_async().await;
}

#[tokio::test]
async fn odd_chunk_size_round_trips() {
	let mut server = mockito::Server::new_async().await;
	let data = sample(1_000_001);
	let file = file_with(&data);

	let mock = server
		.mock("PUT", "/repos/octo/repo/contents/big.bin")
		.match_body(Matcher::PartialJson(json!({"content": STANDARD.encode(&data)})))
		.with_status(200)
		.create_async()
		.await;

	let config = config(&server.url());
	let request = config.request(file.path(), "big.bin", "big").unwrap();
	let mut observed: Vec<ProgressState> = Vec::new();
	let outcome = Uploader::new(&config).chunk_size(4096).upload(&request, |p| observed.push(p)).await.unwrap();

	assert!(outcome.is_success());
	assert_eq!(observed.len(), data.len().div_ceil(4096));
	assert_eq!(observed.last().unwrap().bytes_read, data.len() as u64);
	assert!(observed.windows(2).all(|w| w[0].bytes_read < w[1].bytes_read));
	mock.assert_async().await;
}

#[tokio::test]
async fn reserved_characters_stay_in_file_name() {
	let mut server = mockito::Server::new_async().await;
	let file = file_with(b"see #12");

	let truncated = server.mock("PUT", "/repos/octo/repo/contents/notes/issue").expect(0).create_async().await;
	let mock = server
		.mock("PUT", "/repos/octo/repo/contents/notes/issue%20%2312%3F.md")
		.with_status(201)
		.with_body("{}")
		.expect(1)
		.create_async()
		.await;

	let config = config(&server.url());
	let request = config.request(file.path(), "notes/issue #12?.md", "issue notes").unwrap();
	let outcome = gh_upload::upload(&config, &request, |_| {}).await.unwrap();

	assert!(outcome.is_success());
	mock.assert_async().await;
	truncated.assert_async().await;
}

#[tokio::test]
async fn sha_is_sent_when_replacing() {
	let mut server = mockito::Server::new_async().await;
	let file = file_with(b"v2");

	let mock = server
		.mock("PUT", "/repos/octo/repo/contents/notes.md")
		.match_body(Matcher::PartialJson(json!({"sha": "oldblob", "branch": "main"})))
		.with_status(200)
		.create_async()
		.await;

	let config = config(&server.url());
	let request = UploadRequest::new(file.path(), "notes.md", "update", "main", "octo/repo").unwrap().sha("oldblob");
	let outcome = Uploader::new(&config).upload(&request, |_| {}).await.unwrap();

	assert!(outcome.is_success());
	mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
	let file = file_with(b"hello");
	// nothing listens on the discard port
	let config = config("http://127.0.0.1:9");
	let request = config.request(file.path(), "hello.txt", "hi").unwrap();
	let err = gh_upload::upload(&config, &request, |_| {}).await.unwrap_err();
	assert!(matches!(err, UploadError::Network(_)));
}

#[test]
fn blocking_upload() {
	let mut server = mockito::Server::new();
	let file = file_with(b"sync");

	let mock = server.mock("PUT", "/repos/octo/repo/contents/sync.txt").with_status(201).with_body("{}").create();

	let config = config(&server.url());
	let request = config.request(file.path(), "sync.txt", "sync").unwrap();
	let mut total = 0;
	let outcome = gh_upload::blocking::upload(&config, &request, |p| total = p.bytes_read).unwrap();

	assert!(outcome.is_success());
	assert_eq!(total, 4);
	mock.assert();
}
