// CurveMsg, Curve25519 and Ed25519 operations over structured messages
// Copyright (C) 2025 A. Russon
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::io::Write;
use std::sync::{
    Arc,
    Mutex,
    mpsc
};
use std::thread;

use curvemsg_core::{
    CallId,
    Config,
    MAX_WORKERS,
    Message,
    Request,
    client::{
        Client,
        Reply
    },
    codec::{
        handle_line,
        read_line
    },
    errors::Error as CoreError,
    get_configuration_file,
    handle,
    request::{
        FIELD_CALL_ID,
        FIELD_COMMAND,
        FIELD_MSG,
        FIELD_PRIV,
        FIELD_PUB,
        FIELD_SIG
    }
};

use curvemsg_crypto::{
    curve25519::KEY_LEN,
    traits::arrayt::AsSlice
};

use zeroize::Zeroize;

use clap::{
    Arg,
    ArgAction,
    ArgMatches,
    Command,
    value_parser,
};

const CURVEMSG_VERSION: &str = env!("CARGO_PKG_VERSION");

enum CurveMsgError {
    Io(std::io::Error),
    CoreError(CoreError),
    CliError(&'static str),
    InvalidHex(&'static str),
    Dropped(Option<CoreError>)
}

impl From<std::io::Error> for CurveMsgError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CoreError> for CurveMsgError {
    fn from(value: CoreError) -> Self {
        Self::CoreError(value)
    }
}

impl std::fmt::Display for CurveMsgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::CliError(s) => write!(f, "{s}"),
            Self::CoreError(e) => write!(f, "{e}"),
            Self::InvalidHex(field) => write!(f, "Value of \"{field}\" is not valid hexadecimal."),
            Self::Dropped(None) => write!(f, "request dropped"),
            Self::Dropped(Some(e)) => write!(f, "request dropped ({e})")
        }
    }
}

type Result<T> = core::result::Result<T, CurveMsgError>;

fn serve_args() -> [Arg; 3] {
    [
        Arg::new("workers")
            .help(format!("Number of handler threads (1-{MAX_WORKERS}) (default: 1)"))
            .long("workers")
            .short('w')
            .value_parser(value_parser!(usize)),
        Arg::new("verbose")
            .help("Report dropped requests on stderr")
            .long("verbose")
            .short('v')
            .action(ArgAction::SetTrue),
        Arg::new("max line length")
            .help("Longest accepted request line in bytes")
            .long("max-line-length")
            .value_parser(value_parser!(usize))
    ]
}

fn hex_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .long(name)
        .value_name("HEX")
}

fn main() {
    let mut cmd = Command::new("curvemsg")
        .version(CURVEMSG_VERSION)
        .about(format!(
            "CurveMsg: Curve25519 and Ed25519 operations over JSON lines (version {CURVEMSG_VERSION})\n\
            Copyright (C) 2025 A. Russon"))
        .subcommand(
            Command::new("serve")
                .about("Answer requests read from stdin, one JSON object per line")
                .args(serve_args())
        )
        .subcommand(
            Command::new("call")
                .about("Run a single command and print its result")
                .arg(
                    Arg::new("command")
                        .help("bytesToPriv, privToPub, ECDHE, Ed25519Sign or Ed25519Verify")
                        .required(true)
                )
                .arg(hex_arg(FIELD_PRIV, "Private key"))
                .arg(hex_arg(FIELD_PUB, "Public key"))
                .arg(hex_arg(FIELD_MSG, "Message"))
                .arg(hex_arg(FIELD_SIG, "Signature"))
                .arg(
                    Arg::new("verbose")
                        .help("Explain why a request was dropped")
                        .long("verbose")
                        .short('v')
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("keypair")
                .about("Derive a key pair from 32 bytes")
                .arg(
                    Arg::new("bytes")
                        .help("32 bytes in hexadecimal")
                        .value_name("HEX")
                        .required(true)
                )
                .arg(
                    Arg::new("ephemeral")
                        .help("Mark the private key as a non-identity key")
                        .long("ephemeral")
                        .short('e')
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("config")
                .about("Show the configuration, or save the given values")
                .args(serve_args())
                .arg(
                    Arg::new("save")
                        .help("Write the configuration file")
                        .long("save")
                        .action(ArgAction::SetTrue)
                )
        );

    let help = cmd.render_long_help();
    let mut matches = cmd.get_matches();

    // read configuration file
    let mut config = match Config::load_config_file() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("[!] {err} (using default configuration)");
            Config::new()
        }
    };

    if let Some((cmd_name, mut matches)) = matches.remove_subcommand() {
        let res = if cmd_name.eq("serve") {
            serve(&matches, &mut config)
        }
        else if cmd_name.eq("call") {
            call(&mut matches)
        }
        else if cmd_name.eq("keypair") {
            keypair(&matches)
        }
        else {
            // only "config" remains
            configure(&matches, &mut config)
        };

        if let Err(err) = res {
            eprintln!("[!] {err}");
        }
    }
    else {
        eprintln!("{}", &help.ansi());
    }
}

fn apply_overrides(matches: &ArgMatches, config: &mut Config) -> Result<()> {
    if let Some(workers) = matches.get_one::<usize>("workers") {
        config.set_workers(*workers)?;
    }
    if matches.get_flag("verbose") {
        config.set_verbose(true);
    }
    if let Some(length) = matches.get_one::<usize>("max line length") {
        config.set_max_line_length(*length)?;
    }
    Ok(())
}

// lines waiting per handler thread
const QUEUE_DEPTH: usize = 4;

fn serve(matches: &ArgMatches, config: &mut Config) -> Result<()> {
    apply_overrides(matches, config)?;
    let max_line_length = config.max_line_length();
    let verbose = config.verbose();

    // bounded, reading stops while every handler is busy
    let (sender, receiver) = mpsc::sync_channel::<Vec<u8>>(config.workers() * QUEUE_DEPTH);
    let receiver = Arc::new(Mutex::new(receiver));

    let mut workers = Vec::with_capacity(config.workers());
    for _ in 0..config.workers() {
        let receiver = Arc::clone(&receiver);
        workers.push(thread::spawn(move || worker(&receiver, max_line_length, verbose)));
    }

    let mut stdin = std::io::stdin().lock();
    let mut line = Vec::<u8>::new();
    loop {
        match read_line(&mut stdin, &mut line, max_line_length) {
            Ok(true) => (),
            Ok(false) => break,
            Err(CoreError::Io(err)) => return Err(err.into()),
            Err(err) => {
                if verbose {
                    eprintln!("[!] dropped request: {err}");
                }
                continue;
            }
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        if sender.send(std::mem::take(&mut line)).is_err() {
            // every worker is gone
            break;
        }
    }
    drop(sender);

    for worker in workers {
        match worker.join() {
            Ok(res) => res?,
            Err(_) => return Err(CurveMsgError::CliError("a handler thread panicked"))
        }
    }
    Ok(())
}

fn worker(
    receiver: &Mutex<mpsc::Receiver<Vec<u8>>>,
    max_line_length: usize,
    verbose: bool
) -> std::io::Result<()> {
    loop {
        let line = match receiver.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => return Ok(())
        };
        let Ok(line) = line else {
            // channel closed, stdin is exhausted
            return Ok(());
        };

        let res = match String::from_utf8(line) {
            Ok(mut line) => {
                let res = handle_line(&line, max_line_length);
                line.zeroize();
                res
            },
            Err(err) => {
                err.into_bytes().zeroize();
                if verbose {
                    eprintln!("[!] dropped request: not valid UTF-8");
                }
                continue;
            }
        };

        match res {
            Ok(mut response) => {
                let mut stdout = std::io::stdout().lock();
                let written = writeln!(stdout, "{response}").and_then(|_| stdout.flush());
                response.zeroize();
                written?;
            },
            Err(err) => {
                if verbose {
                    eprintln!("[!] dropped request: {err}");
                }
            }
        }
    }
}

fn hex_field(matches: &ArgMatches, field: &'static str) -> Result<Option<Vec<u8>>> {
    match matches.get_one::<String>(field) {
        Some(value) => match hex::decode(value) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(_) => Err(CurveMsgError::InvalidHex(field))
        },
        None => Ok(None)
    }
}

fn call(matches: &mut ArgMatches) -> Result<()> {
    // get command (required argument)
    let command = matches
        .remove_one::<String>("command")
        .ok_or(CurveMsgError::CliError("no command provided"))?;

    let mut message = Message::new();
    message
        .insert(FIELD_COMMAND, command.as_str())
        .insert(FIELD_CALL_ID, CallId::Int(0));
    for field in [FIELD_PRIV, FIELD_PUB, FIELD_MSG, FIELD_SIG] {
        if let Some(bytes) = hex_field(matches, field)? {
            message.insert(field, bytes);
        }
    }

    // same checks as the handler, the client then numbers the request
    let request = match Request::validate(&message) {
        Ok((_, request)) => request,
        Err(err) => {
            return Err(CurveMsgError::Dropped(matches.get_flag("verbose").then_some(err)));
        }
    };

    let mut client = Client::new();
    let reply = match client.call(&request, handle) {
        Ok((_, reply)) => reply,
        Err(CoreError::NoResponse(_)) => return Err(CurveMsgError::Dropped(None)),
        Err(err) => return Err(err.into())
    };

    match reply {
        Reply::PrivateKey(key) | Reply::SharedSecret(key) => println!("{}", hex::encode(key.as_slice())),
        Reply::PublicKey(key) => println!("{}", hex::encode(key.as_slice())),
        Reply::Signature(sig) => println!("{}", hex::encode(sig.as_slice())),
        Reply::Verified(ok) => println!("{ok}")
    }
    Ok(())
}

fn keypair(matches: &ArgMatches) -> Result<()> {
    let bytes = hex_field(matches, "bytes")?
        .ok_or(CurveMsgError::CliError("no bytes provided"))?;
    let bytes = <[u8; KEY_LEN]>::try_from(bytes.as_slice())
        .map_err(|_| CurveMsgError::CliError("exactly 32 bytes expected"))?;

    let mut client = Client::new();
    let key_pair = client.key_pair(&bytes, !matches.get_flag("ephemeral"), handle)?;

    println!("private: {}", hex::encode(key_pair.private_key.as_slice()));
    println!("public:  {}", hex::encode(key_pair.public_key));
    Ok(())
}

fn configure(matches: &ArgMatches, config: &mut Config) -> Result<()> {
    apply_overrides(matches, config)?;
    if matches.get_flag("save") {
        let path = get_configuration_file()?;
        config.write_to(&path)?;
        eprintln!("Configuration saved to: {}", path.display());
    }
    println!("{config}");
    Ok(())
}
