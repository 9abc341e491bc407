use indicatif::{ProgressBar, ProgressStyle, style::TemplateError};

use crate::ProgressState;

const TEMPLATE: &str = "{msg} {spinner:.green} [{elapsed_precise}] [{bar:40}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Byte-counting bar for the encode phase.
pub fn upload_bar(total_bytes: u64) -> Result<ProgressBar, TemplateError> {
	let bar = ProgressBar::new(total_bytes);
	bar.set_style(ProgressStyle::default_bar().template(TEMPLATE)?.progress_chars("=> "));
	bar.set_message("Uploading to GitHub");
	Ok(bar)
}

/// Callback moving `bar` along with the observed progress.
pub fn track(bar: &ProgressBar) -> impl FnMut(ProgressState) + '_ {
	move |progress| {
		bar.set_length(progress.total_bytes);
		bar.set_position(progress.bytes_read);
	}
}

/// Finish `bar` on success; on failure leave it where it stopped so the error reads below it.
pub fn settle<T, E>(bar: &ProgressBar, result: Result<T, E>) -> Result<T, E> {
	match &result {
		Ok(_) => bar.finish(),
		Err(_) => bar.abandon(),
	}
	result
}
