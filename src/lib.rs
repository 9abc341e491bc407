use std::path::{Path, PathBuf};

pub mod blocking;
pub mod config;
mod encode;
mod github;
pub mod progress;

pub use config::GithubConfig;
pub use encode::{EncodedContent, ProgressState, encode_file, encode_reader};
pub use github::CommitSummary;

/// Raw bytes read per chunk. Only affects progress granularity, the payload is identical for any size.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
	#[error("configuration error: {0}")]
	Config(String),
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	#[error("network error: {0}")]
	Network(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, UploadError>;

/// Commit `request` using `config`, reporting progress after every chunk.
pub async fn upload<F: FnMut(ProgressState)>(config: &GithubConfig, request: &UploadRequest, on_progress: F) -> Result<UploadOutcome> {
	Uploader::new(config).upload(request, on_progress).await
}

/// `owner/repo`
#[derive(Clone, Debug, Eq, PartialEq, derive_more::Display)]
#[display("{owner}/{repo}")]
pub struct RepoSlug {
	pub owner: String,
	pub repo: String,
}
impl std::str::FromStr for RepoSlug {
	type Err = UploadError;

	fn from_str(s: &str) -> Result<Self> {
		let bad = || UploadError::Config(format!("repository must be in 'owner/repo' format, got {s:?}"));
		let (owner, repo) = s.trim().split_once('/').ok_or_else(bad)?;
		let (owner, repo) = (owner.trim(), repo.trim());
		if owner.is_empty() || repo.is_empty() || repo.contains('/') {
			return Err(bad());
		}
		Ok(Self {
			owner: owner.to_owned(),
			repo: repo.to_owned(),
		})
	}
}

#[derive(Clone, Debug)]
pub struct UploadRequest {
	local_path: PathBuf,
	remote_path: String,
	commit_message: String,
	branch: String,
	repo: RepoSlug,
	sha: Option<String>,
}
impl UploadRequest {
	/// Fails with [UploadError::Config] on a malformed `repo` or an empty `remote_path`, without touching the filesystem.
	pub fn new(local_path: impl Into<PathBuf>, remote_path: impl AsRef<str>, commit_message: impl Into<String>, branch: impl Into<String>, repo: &str) -> Result<Self> {
		let repo = repo.parse::<RepoSlug>()?;
		let remote_path = remote_path.as_ref().trim().trim_start_matches('/');
		if remote_path.is_empty() {
			return Err(UploadError::Config("destination path must not be empty".to_owned()));
		}
		Ok(Self {
			local_path: local_path.into(),
			remote_path: remote_path.to_owned(),
			commit_message: commit_message.into(),
			branch: branch.into(),
			repo,
			sha: None,
		})
	}

	/// Blob sha of the file being replaced. GitHub refuses to overwrite an existing path without it.
	pub fn sha(mut self, sha: impl Into<String>) -> Self {
		self.sha = Some(sha.into());
		self
	}

	pub fn local_path(&self) -> &Path {
		&self.local_path
	}

	pub fn remote_path(&self) -> &str {
		&self.remote_path
	}

	pub fn commit_message(&self) -> &str {
		&self.commit_message
	}

	pub fn branch(&self) -> &str {
		&self.branch
	}

	pub fn repo(&self) -> &RepoSlug {
		&self.repo
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UploadOutcome {
	Success { status: u16, commit: Option<CommitSummary> },
	Failure { status: u16, message: String },
}
impl UploadOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success { .. })
	}
}
impl std::fmt::Display for UploadOutcome {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Success { commit: Some(commit), .. } => write!(f, "Upload successful! {}", commit.html_url),
			Self::Success { commit: None, .. } => write!(f, "Upload successful!"),
			Self::Failure { status, message } => write!(f, "Upload failed: {status} - {message}"),
		}
	}
}

/// Holds the client and credentials; one instance can serve any number of requests.
#[derive(Clone, Debug)]
pub struct Uploader {
	client: reqwest::Client,
	token: String,
	api_base: String,
	chunk_size: usize,
}
impl Uploader {
	pub fn new(config: &GithubConfig) -> Self {
		Self {
			client: reqwest::Client::new(),
			token: config.token.clone(),
			api_base: config.api_base.trim_end_matches('/').to_owned(),
			chunk_size: DEFAULT_CHUNK_SIZE,
		}
	}

	pub fn chunk_size(mut self, chunk_size: usize) -> Self {
		self.chunk_size = chunk_size;
		self
	}

	/// Read and encode the request's file, without any network interaction.
	pub fn encode<F: FnMut(ProgressState)>(&self, request: &UploadRequest, on_progress: F) -> Result<EncodedContent> {
		if self.chunk_size == 0 {
			return Err(UploadError::Config("chunk size must be positive".to_owned()));
		}
		tracing::info!(path = %request.local_path.display(), "encoding");
		let encoded = encode_file(&request.local_path, self.chunk_size, on_progress)?;
		tracing::debug!(raw_len = encoded.raw_len, encoded_len = encoded.len());
		Ok(encoded)
	}

	/// Send already encoded content. Non-2xx responses come back as [UploadOutcome::Failure].
	pub async fn put(&self, request: &UploadRequest, content: &EncodedContent) -> Result<UploadOutcome> {
		github::put_contents(&self.client, &self.api_base, &self.token, request, content).await
	}

	pub async fn upload<F: FnMut(ProgressState)>(&self, request: &UploadRequest, on_progress: F) -> Result<UploadOutcome> {
		let encoded = self.encode(request, on_progress)?;
		self.put(request, &encoded).await
	}
}
