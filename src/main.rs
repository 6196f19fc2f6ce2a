// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! cspgen CLI - Content-Security-Policy generator
//!
//! Generate a policy for one URL, or run the HTTP API server.

use std::env;
use std::process::ExitCode;

use cspgen::{server, CspGenerator};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cspgen=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "generate" => {
            if args.len() < 3 {
                eprintln!("Usage: cspgen generate <url> [--no-wildcards]");
                return ExitCode::from(1);
            }
            let use_wildcards = !args.iter().any(|a| a == "--no-wildcards");
            generate(&args[2], use_wildcards).await
        }
        "serve" => {
            let port = args
                .get(2)
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(3000);
            serve(port).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("cspgen {}", env!("CARGO_PKG_VERSION"));
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
        r#"cspgen - Content-Security-Policy Generator

USAGE:
    cspgen <COMMAND> [OPTIONS]

COMMANDS:
    generate <url> [--no-wildcards]   Crawl a page and print its CSP header
    serve [port]                      Run the HTTP API (default port 3000)
    help                              Show this help message
    version                           Show version information

EXAMPLES:
    cspgen generate example.com
    cspgen generate https://example.com --no-wildcards
    cspgen serve 8080

The API accepts POST /api/generate-csp with
    {{"url": "example.com", "use_wildcards": true}}
and returns {{"csp": "..."}}.
"#
    );
}

async fn generate(url: &str, use_wildcards: bool) -> ExitCode {
    let generator = CspGenerator::default();

    match generator.generate(url, use_wildcards).await {
        Ok(policy) => {
            println!("{}", policy);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", e.label(), e.detail());
            ExitCode::from(1)
        }
    }
}

async fn serve(port: u16) -> ExitCode {
    match server::serve(CspGenerator::default(), port).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server failed: {}", e);
            ExitCode::from(1)
        }
    }
}
