use crate::{GithubConfig, ProgressState, Result, UploadOutcome, UploadRequest};

/// Same as [crate::upload], for callers without a tokio runtime. Must not be called from inside one.
pub fn upload<F: FnMut(ProgressState)>(config: &GithubConfig, request: &UploadRequest, on_progress: F) -> Result<UploadOutcome> {
	let runtime = tokio::runtime::Runtime::new()?;
	runtime.block_on(crate::upload(config, request, on_progress))
}
