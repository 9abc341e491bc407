use reqwest::{
	Url,
	header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Deserialize, Serialize};

use crate::{EncodedContent, Result, UploadError, UploadOutcome, UploadRequest};

const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct PutContentsBody<'a> {
	message: &'a str,
	content: &'a str,
	branch: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	sha: Option<&'a str>,
}

/// What we keep from a successful contents response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommitSummary {
	pub sha: String,
	pub html_url: String,
	pub content_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
	content: Option<ContentInfo>,
	commit: CommitInfo,
}
#[derive(Debug, Deserialize)]
struct ContentInfo {
	path: String,
}
#[derive(Debug, Deserialize)]
struct CommitInfo {
	sha: String,
	html_url: String,
}
impl From<PutContentsResponse> for CommitSummary {
	fn from(response: PutContentsResponse) -> Self {
		Self {
			sha: response.commit.sha,
			html_url: response.commit.html_url,
			content_path: response.content.map(|c| c.path),
		}
	}
}

/// Every path segment is percent-encoded, so `#`, `?` and spaces stay part of the file name.
pub(crate) fn contents_url(api_base: &str, request: &UploadRequest) -> Result<Url> {
	let bad_base = || UploadError::Config(format!("invalid API base URL {api_base:?}"));
	let mut url = Url::parse(api_base).map_err(|_| bad_base())?;
	let repo = request.repo();
	url.path_segments_mut()
		.map_err(|_| bad_base())?
		.pop_if_empty()
		.extend(["repos", repo.owner.as_str(), repo.repo.as_str(), "contents"])
		.extend(request.remote_path().split('/'));
	Ok(url)
}

fn headers(token: &str) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();
	let auth = HeaderValue::from_str(&format!("token {token}")).map_err(|_| UploadError::Config("token contains characters not allowed in a header".to_owned()))?;
	headers.insert(AUTHORIZATION, auth);
	headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));
	headers.insert(USER_AGENT, HeaderValue::from_static(AGENT));
	Ok(headers)
}

///docs: https://docs.github.com/en/rest/repos/contents#create-or-update-file-contents
pub(crate) async fn put_contents(client: &reqwest::Client, api_base: &str, token: &str, request: &UploadRequest, content: &EncodedContent) -> Result<UploadOutcome> {
	let url = contents_url(api_base, request)?;
	let body = PutContentsBody {
		message: request.commit_message(),
		content: &content.content,
		branch: request.branch(),
		sha: request.sha.as_deref(),
	};

	tracing::info!(repo = %request.repo(), path = request.remote_path(), branch = request.branch(), "putting contents");
	tracing::debug!(%url, content_len = content.len());
	let response = client.put(url).headers(headers(token)?).json(&body).send().await?;

	let status = response.status().as_u16();
	let text = response.text().await?;
	Ok(classify(status, text))
}

fn classify(status: u16, body: String) -> UploadOutcome {
	match status {
		200 | 201 => {
			let commit = serde_json::from_str::<PutContentsResponse>(&body).ok().map(CommitSummary::from);
			tracing::info!(status, commit = ?commit.as_ref().map(|c| &c.sha), "upload accepted");
			UploadOutcome::Success { status, commit }
		}
		_ => {
			tracing::warn!(status, "upload rejected");
			UploadOutcome::Failure { status, message: body }
		}
	}
}
