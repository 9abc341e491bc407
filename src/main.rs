use std::{
	io::{self, BufRead as _, Write as _},
	path::PathBuf,
};

use clap::Parser;
use gh_upload::{DEFAULT_CHUNK_SIZE, Uploader, config, progress};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
	/// Local file to upload. Asked for interactively if omitted.
	local_path: Option<PathBuf>,
	/// Destination path in the repository, e.g. folder/filename.ext
	#[clap(short, long)]
	dest: Option<String>,
	/// Commit message
	#[clap(short, long)]
	message: Option<String>,
	/// Blob sha of the file being replaced, required by GitHub to overwrite an existing path
	#[clap(long)]
	sha: Option<String>,
	#[clap(long, default_value_t = DEFAULT_CHUNK_SIZE)]
	chunk_size: usize,
	#[command(flatten)]
	settings: config::SettingsFlags,
}

fn prompt(question: &str) -> io::Result<String> {
	print!("{question}");
	io::stdout().flush()?;
	let mut answer = String::new();
	io::stdin().lock().read_line(&mut answer)?;
	Ok(answer.trim().to_owned())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
	v_utils::clientside!();
	let cli = Cli::parse();

	let config = config::load(cli.settings)?;

	let local_path = match cli.local_path {
		Some(p) => p,
		None => prompt("Enter the local file path to upload: ")?.into(),
	};
	let dest = match cli.dest {
		Some(d) => d,
		None => prompt("Enter the destination path on GitHub (e.g., folder/filename.ext): ")?,
	};
	let message = match cli.message {
		Some(m) => m,
		None => prompt("Enter the commit message: ")?,
	};

	let mut request = config.request(local_path, dest, message)?;
	if let Some(sha) = cli.sha {
		request = request.sha(sha);
	}
	let uploader = Uploader::new(&config).chunk_size(cli.chunk_size);

	let bar = progress::upload_bar(std::fs::metadata(request.local_path())?.len())?;
	let encoded = progress::settle(&bar, uploader.encode(&request, progress::track(&bar)))?;

	println!("\nFinalizing upload to GitHub (this may take a moment)...");
	let outcome = uploader.put(&request, &encoded).await?;
	match outcome.is_success() {
		true => println!("{outcome}"),
		false => eprintln!("{outcome}"),
	}

	Ok(())
}
