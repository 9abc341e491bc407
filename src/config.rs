use v_utils::macros::{MyConfigPrimitives, Settings};

use crate::UploadError;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Clone, Debug, Default, MyConfigPrimitives, Settings)]
pub struct AppConfig {
	pub github_token: Option<String>,
	pub github_branch_name: Option<String>,
	pub github_repo_name: Option<String>,
	pub github_api_base: Option<String>,
}

/// Everything the uploader needs to talk to GitHub. Built once, then passed around explicitly.
#[derive(Clone, derive_new::new)]
pub struct GithubConfig {
	pub token: String,
	pub branch: String,
	/// `owner/repo`, validated when a request is built from it.
	pub repo: String,
	#[new(value = "DEFAULT_API_BASE.to_owned()")]
	pub api_base: String,
}
impl GithubConfig {
	pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
		self.api_base = api_base.into();
		self
	}

	/// Values from the settings layer win; missing ones are looked up in the environment (`GITHUB_TOKEN`, `GITHUB_BRANCH_NAME`, `GITHUB_REPO_NAME`, `GITHUB_API_BASE`).
	pub fn from_app_config(app: AppConfig) -> crate::Result<Self> {
		Self::resolve(app, |key| std::env::var(key).ok())
	}

	fn resolve(app: AppConfig, env: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
		let pick = |value: Option<String>, key: &str| value.or_else(|| env(key)).filter(|v| !v.trim().is_empty());
		let require = |value: Option<String>, key: &str| pick(value, key).ok_or_else(|| UploadError::Config(format!("{key} is not set")));

		let config = Self::new(
			require(app.github_token, "GITHUB_TOKEN")?,
			require(app.github_branch_name, "GITHUB_BRANCH_NAME")?,
			require(app.github_repo_name, "GITHUB_REPO_NAME")?,
		);
		Ok(match pick(app.github_api_base, "GITHUB_API_BASE") {
			Some(api_base) => config.api_base(api_base),
			None => config,
		})
	}

	/// Build a request against the configured repo and branch.
	pub fn request(&self, local_path: impl Into<std::path::PathBuf>, remote_path: impl AsRef<str>, commit_message: impl Into<String>) -> crate::Result<crate::UploadRequest> {
		crate::UploadRequest::new(local_path, remote_path, commit_message, self.branch.clone(), &self.repo)
	}
}
impl std::fmt::Debug for GithubConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GithubConfig")
			.field("token", &"<redacted>")
			.field("branch", &self.branch)
			.field("repo", &self.repo)
			.field("api_base", &self.api_base)
			.finish()
	}
}

/// Load settings (config file and flags), falling back to defaults when there is nothing to load, then resolve against the environment.
pub fn load(flags: SettingsFlags) -> eyre::Result<GithubConfig> {
	let app = AppConfig::try_build(flags).unwrap_or_else(|e| {
		tracing::debug!(error = %e, "no settings loaded, relying on the environment");
		AppConfig::default()
	});
	Ok(GithubConfig::from_app_config(app)?)
}
