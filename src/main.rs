// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! apiclient CLI
//!
//! Issue one request through the api-client stack and print the response.

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use api_client::{
    create_api_client, ApiClient, ApiClientConfig, ClientSettings, HttpResponse, Params,
    RequestBody, RequestConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("api_client=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let command = args[1].as_str();
    match command {
        "get" | "post" | "put" | "patch" | "delete" | "uri" => {
            if args.len() < 3 {
                eprintln!("Usage: apiclient {} <path> [OPTIONS]", command);
                return ExitCode::from(1);
            }
            let options = match CliOptions::parse(&args[3..]) {
                Ok(o) => o,
                Err(e) => {
                    eprintln!("{}", e);
                    return ExitCode::from(1);
                }
            };
            match run(command, &args[2], &options).await {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    ExitCode::from(1)
                }
            }
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("apiclient {}", api_client::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"apiclient - Send requests through the api-client stack

USAGE:
    apiclient <COMMAND> <path> [OPTIONS]

COMMANDS:
    get <path>      Send a GET request
    post <path>     Send a POST request, body from --data
    put <path>      Send a PUT request, body from --data
    patch <path>    Send a PATCH request, body from --data
    delete <path>   Send a DELETE request
    uri <path>      Print the resolved URL without sending
    help            Show this help message
    version         Show version information

OPTIONS:
    --base <url>          Base URL (or API_CLIENT_BASE_URL)
    --config <file>       Load client settings from a JSON file
    --timeout <ms>        Request timeout in milliseconds, 0 disables it
    --header <k:v>        Extra request header, repeatable
    --param <k=v>         Query parameter, repeatable
    --data <json>         Request body; sent as text when not valid JSON
    --isr <seconds>       GET only: revalidate after the given window
    --debug               Log requests and failing responses

EXAMPLES:
    apiclient get /users --base https://api.example.com
    apiclient post /users --base https://api.example.com --data '{{"name":"Ada"}}'
    apiclient uri /search --base https://api.example.com --param q=rust
"#
    );
}

#[derive(Debug, Default)]
struct CliOptions {
    base_url: Option<String>,
    config_file: Option<String>,
    timeout_ms: Option<u64>,
    headers: Vec<(String, String)>,
    params: Vec<(String, String)>,
    data: Option<String>,
    isr: Option<f64>,
    debug: bool,
}

impl CliOptions {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut options = CliOptions::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| anyhow!("Missing value for {}", flag))
            };
            match arg.as_str() {
                "--base" => options.base_url = Some(value("--base")?),
                "--config" => options.config_file = Some(value("--config")?),
                "--timeout" => {
                    let raw = value("--timeout")?;
                    options.timeout_ms =
                        Some(raw.parse().with_context(|| format!("Invalid timeout: {}", raw))?);
                }
                "--header" => {
                    let raw = value("--header")?;
                    let (name, val) = raw
                        .split_once(':')
                        .ok_or_else(|| anyhow!("Header must be name:value, got {}", raw))?;
                    options.headers.push((name.trim().to_string(), val.trim().to_string()));
                }
                "--param" => {
                    let raw = value("--param")?;
                    let (name, val) = raw
                        .split_once('=')
                        .ok_or_else(|| anyhow!("Param must be name=value, got {}", raw))?;
                    options.params.push((name.to_string(), val.to_string()));
                }
                "--data" => options.data = Some(value("--data")?),
                "--isr" => {
                    let raw = value("--isr")?;
                    options.isr =
                        Some(raw.parse().with_context(|| format!("Invalid ISR window: {}", raw))?);
                }
                "--debug" => options.debug = true,
                other => bail!("Unknown option: {}", other),
            }
        }

        Ok(options)
    }

    fn client_config(&self) -> anyhow::Result<ApiClientConfig> {
        let mut config = match &self.config_file {
            Some(path) => ApiClientConfig::from(ClientSettings::from_json_file(path)?),
            None => {
                let base_url = self
                    .base_url
                    .clone()
                    .or_else(|| env::var("API_CLIENT_BASE_URL").ok())
                    .ok_or_else(|| anyhow!("No base URL: pass --base or --config"))?;
                ApiClientConfig::new(base_url)
            }
        };

        if let (Some(base_url), Some(_)) = (&self.base_url, &self.config_file) {
            config.base_url = base_url.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config = config.timeout(Duration::from_millis(ms));
        }
        if self.debug {
            config = config.debug(true);
        }
        Ok(config)
    }

    fn request_config(&self) -> RequestConfig {
        let mut config = RequestConfig::default();
        for (name, value) in &self.headers {
            config = config.header(name.as_str(), value.as_str());
        }
        if !self.params.is_empty() {
            config = config.params(Params::Pairs(self.params.clone()));
        }
        config
    }

    fn body(&self) -> Option<RequestBody> {
        let raw = self.data.as_deref()?;
        Some(match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(json) => RequestBody::from(json),
            Err(_) => RequestBody::from(raw),
        })
    }
}

async fn run(command: &str, path: &str, options: &CliOptions) -> anyhow::Result<ExitCode> {
    let api = create_api_client(options.client_config()?)?;
    let config = options.request_config();

    if command == "uri" {
        println!("{}", api.http_instance().get_uri(&config.url(path)));
        return Ok(ExitCode::SUCCESS);
    }

    let result = send(&api, command, path, config, options).await?;
    match result {
        Ok(response) => {
            print_response(&response);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("Request failed: {}", err);
            if let Some(code) = err.code() {
                eprintln!("Code: {}", code);
            }
            match err.as_http().and_then(|e| e.response.as_ref()) {
                Some(response) => {
                    print_response(response);
                    Ok(ExitCode::from(2))
                }
                None => Ok(ExitCode::from(1)),
            }
        }
    }
}

async fn send(
    api: &ApiClient,
    command: &str,
    path: &str,
    config: RequestConfig,
    options: &CliOptions,
) -> anyhow::Result<api_client::Result<HttpResponse>> {
    let result = match command {
        "get" => {
            let request = api.get(path, config);
            match options.isr {
                Some(seconds) => request.with_isr(seconds)?.await,
                None => request.await,
            }
        }
        "post" => api.post(path, options.body(), config).await,
        "put" => api.put(path, options.body(), config).await,
        "patch" => api.patch(path, options.body(), config).await,
        "delete" => api.delete(path, config).await,
        other => bail!("Unsupported command: {}", other),
    };
    Ok(result)
}

fn print_response(response: &HttpResponse) {
    println!("\n=== Response ===");
    println!("Status: {} {}", response.status, response.status_text);
    println!("URL: {}", response.request.url);

    if !response.headers.is_empty() {
        println!("\n=== Headers ({}) ===", response.headers.len());
        for (name, value) in response.headers.iter() {
            println!("  {}: {}", name, value);
        }
    }

    println!("\n=== Body ===");
    match response.data.as_json() {
        Some(json) => match serde_json::to_string_pretty(json) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", json),
        },
        None => println!("{}", response.text_lossy()),
    }
}
