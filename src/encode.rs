use std::{
	fs::File,
	io::{self, Read},
	path::Path,
};

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Observed after every chunk. `bytes_read <= total_bytes` always holds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, derive_new::new)]
pub struct ProgressState {
	pub bytes_read: u64,
	pub total_bytes: u64,
}

/// Base64 text of a whole file.
#[derive(Clone, Debug, Eq, PartialEq, derive_more::Deref, derive_new::new)]
pub struct EncodedContent {
	#[deref]
	pub content: String,
	/// Length of the raw input the content decodes back to.
	pub raw_len: u64,
}

pub fn encode_file<F: FnMut(ProgressState)>(path: &Path, chunk_size: usize, on_progress: F) -> io::Result<EncodedContent> {
	let metadata = std::fs::metadata(path)?;
	if metadata.is_dir() {
		return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("{} is a directory", path.display())));
	}
	let file = File::open(path)?;
	encode_reader(file, metadata.len(), chunk_size, on_progress)
}

/// Encode everything `reader` yields, `chunk_size` raw bytes at a time.
///
/// Base64 maps 3 raw bytes to 4 characters, so encoding chunks independently and concatenating is only exact for 3-aligned chunks.
/// Each round encodes the 3-aligned prefix of what is pending and carries the 0-2 leftover bytes into the next round; the padded tail is emitted once at EOF.
///
/// `total_bytes` is the expected size, used only for progress reporting.
pub fn encode_reader<R: Read, F: FnMut(ProgressState)>(mut reader: R, total_bytes: u64, chunk_size: usize, mut on_progress: F) -> io::Result<EncodedContent> {
	if chunk_size == 0 {
		return Err(io::Error::new(io::ErrorKind::InvalidInput, "chunk_size must be positive"));
	}

	let capacity = usize::try_from(total_bytes).ok().and_then(|n| base64::encoded_len(n, true)).unwrap_or_default();
	let mut encoded = String::with_capacity(capacity);
	let mut buf = vec![0u8; chunk_size];
	let mut pending: Vec<u8> = Vec::with_capacity(chunk_size + 2);
	let mut progress = ProgressState::new(0, total_bytes);
	let mut chunks = 0usize;

	loop {
		let n = match reader.read(&mut buf) {
			Ok(0) => break,
			Ok(n) => n,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e),
		};
		chunks += 1;

		pending.extend_from_slice(&buf[..n]);
		let aligned = pending.len() - pending.len() % 3;
		STANDARD.encode_string(&pending[..aligned], &mut encoded);
		pending.drain(..aligned);

		progress.bytes_read += n as u64;
		// the file grew under us
		progress.total_bytes = progress.total_bytes.max(progress.bytes_read);
		on_progress(progress);
	}
	STANDARD.encode_string(&pending, &mut encoded);

	tracing::debug!(chunks, bytes_read = progress.bytes_read, "finished reading");
	Ok(EncodedContent::new(encoded, progress.bytes_read))
}
