//! CLI arguments and server configuration defaults.

use clap::Parser;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";
pub const DEFAULT_TEMPLATES_DIR: &str = "./templates";
pub const DEFAULT_MAX_FILE_SIZE: &str = "0";

/// CLI arguments and environment configuration for the server.
#[derive(Parser, Debug)]
#[command(name = "filedrop", version, about = "HTTP file upload server")]
pub struct Args {
    #[arg(
        short = 'b',
        long,
        env = "BIND",
        default_value = "0.0.0.0",
        help = "Bind address"
    )]
    pub host: String,
    #[arg(
        short = 'p',
        long,
        env = "PORT",
        default_value_t = DEFAULT_PORT,
        help = "HTTP port"
    )]
    pub port: u16,
    #[arg(
        short = 'u',
        long,
        env = "UPLOAD_DIR",
        default_value = DEFAULT_UPLOAD_DIR,
        help = "Directory holding uploaded files"
    )]
    pub upload_dir: String,
    #[arg(
        short = 't',
        long,
        env = "TEMPLATES_DIR",
        default_value = DEFAULT_TEMPLATES_DIR,
        help = "Directory holding index.html and static assets"
    )]
    pub templates_dir: String,
    #[arg(
        long,
        env = "MAX_FILE_SIZE",
        default_value = DEFAULT_MAX_FILE_SIZE,
        help = "Max upload size in bytes (0 for unlimited)"
    )]
    pub max_file_size: String,
}

/// Resolved upload limits, built once at startup and handed to
/// handlers through an `Extension`.
#[derive(Debug)]
pub struct Limits {
    /// Upload size ceiling in bytes; 0 disables the check.
    pub max_file_size: u64,
}

/// Parses `MAX_FILE_SIZE` leniently: an unparsable value warns and
/// degrades to unlimited instead of failing startup.
pub fn parse_max_file_size(value: &str) -> u64 {
    match value.trim().parse::<u64>() {
        Ok(bytes) => bytes,
        Err(_) => {
            warn!(value, "invalid MAX_FILE_SIZE value, using unlimited");
            0
        }
    }
}
