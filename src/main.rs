// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser};
use tracing::{debug, error};

use wirefuzz::config::{Config, SectionToggles};
use wirefuzz::fuzzing::payloads;
use wirefuzz::fuzzing::sink::OutputSink;
use wirefuzz::fuzzing::{Fuzzer, SkipToken};
use wirefuzz::http::request::Request;
use wirefuzz::transport::NetworkSender;

/// Fuzz the fuzzable parts of raw HTTP requests, one field at a time.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// File containing a single HTTP request in raw HTTP format.
    #[arg(long)]
    filename: Option<PathBuf>,

    /// File containing one or more HTTP requests in proxy message export
    /// format (messages separated by `==== <n> ==========` lines).
    #[arg(long)]
    export: Option<PathBuf>,

    /// File containing a single request in "Copy as fetch (Node.js)"
    /// format from Chrome DevTools.
    #[arg(long)]
    fetch: Option<PathBuf>,

    /// Wordlist used for fuzzing; the built-in list is used when absent.
    /// Use <original> to refer to the value in the original request.
    #[arg(long)]
    wordlist: Option<PathBuf>,

    /// Port used for the connection.
    #[arg(long, default_value_t = 443)]
    port: u16,

    /// Use plain HTTP instead of HTTPS.
    #[arg(long)]
    disable_https: bool,

    /// Only keep requests whose authority ends with this suffix.
    #[arg(long)]
    filter_hostname_endswith: Option<String>,

    /// Seconds of delay between requests.
    #[arg(long, default_value_t = 0.0)]
    delay_seconds: f64,

    /// Fuzz directories in the URL.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    directories: bool,

    /// Fuzz values of parameters in the URL.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    parameters: bool,

    /// Fuzz the values of cookies.
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    cookies: bool,

    /// Fuzz the values of form fields.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    form_fields: bool,

    /// Fuzz the values of JSON data.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    json_body: bool,

    /// Add an extra header line to every request.
    #[arg(long)]
    add_header: Option<String>,

    /// Directory where the fuzzed requests and responses are stored.
    #[arg(long, default_value = "wirefuzz_output")]
    output_directory: PathBuf,

    /// Abandon a connection attempt after this many seconds.
    #[arg(long, default_value_t = 10.0)]
    connect_timeout_seconds: f64,

    /// Treat a peer silent for this many seconds as done sending.
    #[arg(long, default_value_t = 10.0)]
    read_timeout_seconds: f64,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = Config {
        port: cli.port,
        disable_https: cli.disable_https,
        delay: Duration::from_secs_f64(cli.delay_seconds),
        connect_timeout: Duration::from_secs_f64(cli.connect_timeout_seconds),
        read_timeout: Duration::from_secs_f64(cli.read_timeout_seconds),
        output_directory: cli.output_directory.clone(),
        sections: SectionToggles {
            directories: cli.directories,
            parameters: cli.parameters,
            cookies: cli.cookies,
            form_fields: cli.form_fields,
            json_body: cli.json_body,
        },
        deviation_for_highlighting: 0.1,
    };

    let add_header = cli.add_header.as_deref();
    let mut requests = if let Some(filename) = &cli.filename {
        debug!("loading request from raw file");
        vec![Request::from_file(filename, config.port, config.disable_https, add_header)?]
    } else if let Some(export) = &cli.export {
        debug!("loading requests from message export");
        Request::from_export(export, config.port, config.disable_https, add_header)?
    } else if let Some(fetch) = &cli.fetch {
        debug!("loading request from fetch file");
        vec![Request::from_fetch(fetch, config.port, config.disable_https, add_header)?]
    } else {
        bail!("either --filename, --export or --fetch must be given");
    };

    if let Some(suffix) = &cli.filter_hostname_endswith {
        let before = requests.len();
        requests.retain(|request| {
            request
                .url
                .authority
                .as_deref()
                .is_some_and(|authority| authority.ends_with(suffix.as_bytes()))
        });
        debug!(kept = requests.len(), before, "filtered requests by hostname");
    }
    requests.sort_by(|a, b| a.url.raw.cmp(&b.url.raw));
    if requests.is_empty() {
        bail!("no requests to fuzz");
    }

    let payloads = match &cli.wordlist {
        Some(path) => payloads::load_wordlist(path)
            .with_context(|| format!("cannot load wordlist {}", path.display()))?,
        None => payloads::default_wordlist(),
    };

    let session = chrono::Utc::now().format("%Y-%m-%dT%H%M%S%.6fZ").to_string();
    let base_directory = config.output_directory.join(session);

    let skip = SkipToken::new();
    spawn_skip_listener(skip.clone());
    println!();
    println!("Press [Enter] to skip the rest of the current section. Press [control]+[c] to stop.");
    println!();

    let mut sender = NetworkSender::new(config.connect_timeout, config.read_timeout);
    for request in requests {
        let mut fuzzer = Fuzzer::new(
            request,
            payloads.clone(),
            OutputSink::new(base_directory.clone()),
            skip.clone(),
            config.delay,
            config.sections,
            config.deviation_for_highlighting,
        );
        if let Err(e) = fuzzer.run(&mut sender) {
            error!(error = %e, "fuzzing failed for request");
        }
    }
    Ok(())
}

/// Trip the skip token whenever the user presses Enter.
fn spawn_skip_listener(skip: SkipToken) {
    std::thread::spawn(move || {
        let mut line = String::new();
        loop {
            line.clear();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => return,
                Ok(_) => skip.trigger(),
            }
        }
    });
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
