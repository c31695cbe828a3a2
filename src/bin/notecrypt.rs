//! Notecrypt CLI - password-based encryption of note secrets
//!
//! Command-line interface for encrypting secret text into portable ENC0
//! tokens (AES-128-CBC + HMAC-SHA-256 with PBKDF2 key derivation) and
//! decrypting them back.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use notecrypt::file_ops;
use notecrypt::password::{PasswordReader, ReaderPasswordReader, TerminalPasswordReader};

#[derive(Parser)]
#[command(name = "notecrypt")]
#[command(version)]
#[command(about = "Password-based encryption of note secrets.", long_about = None)]
struct Cli {
    /// Read password from stdin instead of from terminal
    #[arg(long, global = true)]
    password_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file's text into a token
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the token to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Wrap the token in the document marker form so it can be
        /// pasted into a note as-is
        #[arg(long)]
        marked: bool,
    },

    /// Decrypt a token file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file holding the token (marked or bare)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the decrypted text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Update a token file with new content, while validating
    /// that the password is not accidentally changed.
    #[command(alias = "u")]
    Update {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the existing token file to replace with encrypted text
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encrypt {
            input,
            output,
            marked,
        } => {
            let mut reader = get_password_reader(cli.password_stdin);
            file_ops::encrypt_file(&input, &output, &mut *reader, marked)
        }
        Commands::Decrypt { input, output } => {
            let mut reader = get_password_reader(cli.password_stdin);
            file_ops::decrypt_file(&input, &output, &mut *reader)
        }
        Commands::Update { input, output } => {
            let mut reader = get_password_reader(cli.password_stdin);
            file_ops::update_file(&input, &output, &mut *reader)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn get_password_reader(use_stdin: bool) -> Box<dyn PasswordReader> {
    if use_stdin {
        Box::new(ReaderPasswordReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalPasswordReader)
    }
}
