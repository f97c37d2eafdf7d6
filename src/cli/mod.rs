use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hal-fun-downloader")]
#[command(version, about = "Download model weights from the Hugging Face hub into a local models tree", long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Start the host server with the downloader routes and nodes attached
	Serve {
		/// Port to listen on
		#[arg(long, env = "HAL_FUN_PORT", default_value = "8188")]
		port: u16,

		/// Host to bind to
		#[arg(long, env = "HAL_FUN_HOST", default_value = "127.0.0.1")]
		host: String,
	},

	/// List catalog entries and whether they are on disk
	List,

	/// Report download state for every entry whose local path contains the name
	Check {
		/// Substring of the model's local path (e.g. "model1")
		model_name: String,
	},

	/// Download the first entry whose local path contains the name
	Download {
		/// Substring of the model's local path (e.g. "model1")
		model_name: String,
	},

	/// Download every model enabled in the active selection
	DownloadEnabled,
}
