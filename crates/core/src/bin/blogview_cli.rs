//! Command-line client for a model inference backend.
//!
//! Examples:
//!   blogview-cli --url http://localhost:8000/ submit burglary.blog
//!   blogview-cli --url http://localhost:8000/ submit hmm.dblog --eng ParticleFilter
//!   blogview-cli --url http://localhost:8000/ snippet burglary.blog
//!   blogview-cli inspect saved-response.txt
//!   blogview-cli tokens burglary.blog
//!   blogview-cli paths
//!
//! Settings come from `--config PATH` or `<config dir>/blogview/config.json`;
//! `--url` overrides both endpoints.

use std::path::PathBuf;
use std::process;

use blogview::chart::{cell_label, ChartSpec};
use blogview::prelude::*;
use blogview::snippet::SnippetRequest;
use blogview::syntax::{coalesce, tokenize};
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!("blogview-cli (posts models to an inference backend)");
    eprintln!("Usage: blogview-cli [--url URL] [--config PATH] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  submit <model-file> [--base N] [--eng E] [--alg A]");
    eprintln!("                              Run a model and print every query");
    eprintln!("  snippet <name>              Fetch an example model");
    eprintln!("  inspect <response-file>     Unpack a saved response offline");
    eprintln!("  tokens <model-file>         Show highlighting classes per line");
    eprintln!("  paths                       Show the config file location");
    process::exit(1);
}

struct Globals {
    url: Option<String>,
    config: Option<PathBuf>,
}

fn parse_args() -> (Globals, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut globals = Globals {
        url: None,
        config: None,
    };

    while args.len() >= 2 && args[0].starts_with("--") {
        match args[0].as_str() {
            "--url" => globals.url = Some(args[1].clone()),
            "--config" => globals.config = Some(PathBuf::from(&args[1])),
            _ => usage(),
        }
        args.drain(0..2);
    }

    if args.is_empty() || args[0].starts_with("--") {
        usage();
    }

    (globals, args)
}

/// `--flag value` pairs after the positional arguments.
fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn load_config(globals: &Globals) -> Result<ViewerConfig, String> {
    let cfg = match &globals.config {
        Some(path) => ViewerConfig::load(path).map_err(|e| e.to_string())?,
        None => match ViewerConfig::default_path() {
            Some(path) => ViewerConfig::load_or_default(&path).map_err(|e| e.to_string())?,
            None => ViewerConfig::default(),
        },
    };
    Ok(match &globals.url {
        Some(url) => cfg.with_base_url(url.clone()),
        None => cfg,
    })
}

fn require_url<'a>(url: &'a str, what: &str) -> Result<&'a str, String> {
    if url.is_empty() {
        Err(format!("no {what} URL: pass --url or set it in the config file"))
    } else {
        Ok(url)
    }
}

async fn post_form(url: &str, fields: &[(&str, &str)]) -> Result<String, String> {
    let client = reqwest::Client::new();
    let resp = client
        .post(url)
        .form(fields)
        .send()
        .await
        .map_err(|e| format!("POST {url}: {e}"))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(format!("POST {url}: HTTP {status}"));
    }
    resp.text().await.map_err(|e| format!("read body: {e}"))
}

async fn read_file(path: &str) -> Result<String, String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("read {path}: {e}"))
}

fn print_results(results: &ResultSet, log_text: &str, chart: &ChartConfig) {
    if results.is_empty() {
        println!("(no queries)");
    }
    for (i, entry) in results.entries().iter().enumerate() {
        let spec = ChartSpec::for_entry(entry, chart);
        println!(
            "[{i}] {}  ({} chart, run {}, {} rows)",
            spec.title,
            spec.kind.label(),
            entry.group,
            entry.distribution.data_rows().len()
        );
        for row in entry.distribution.data_rows() {
            let cells: Vec<String> = row.iter().map(cell_label).collect();
            println!("      {}", cells.join("\t"));
        }
    }
    if !log_text.is_empty() {
        println!("--- log ---");
        println!("{log_text}");
    }
}

async fn submit(cfg: &ViewerConfig, args: &[String]) -> Result<(), String> {
    let Some(path) = args.first() else { usage() };
    let text = read_file(path).await?;
    let form = SubmissionForm::new(
        text,
        flag(args, "--base").unwrap_or(cfg.default_base.as_str()),
        flag(args, "--eng").unwrap_or(cfg.default_engine.as_str()),
        flag(args, "--alg").unwrap_or(cfg.default_algorithm.as_str()),
    );

    let mut session = Session::new();
    let pending = session.begin(form).map_err(|e| e.to_string())?;
    let url = require_url(&cfg.submit_url, "submission")?;
    tracing::info!(url, engine = %pending.form().engine, "submitting model");

    let body = match post_form(url, &pending.fields()).await {
        Ok(body) => body,
        Err(e) => {
            session.fail(pending.ticket());
            return Err(e);
        }
    };
    match session.complete(pending.ticket(), &body) {
        Ok(Completion::Applied(applied)) => {
            print_results(session.results(), &applied.log_text, &cfg.chart);
            Ok(())
        }
        Ok(Completion::Stale(_)) => Err("response arrived for a superseded submission".into()),
        Err(e) => Err(e.to_string()),
    }
}

async fn snippet(cfg: &ViewerConfig, args: &[String]) -> Result<(), String> {
    let Some(name) = args.first() else { usage() };
    let url = require_url(&cfg.snippet_url, "snippet")?;
    let req = SnippetRequest::new(name.clone());
    let body = post_form(url, &req.fields()).await?;
    print!("{}", SnippetRequest::editor_text(body));
    Ok(())
}

async fn inspect(cfg: &ViewerConfig, args: &[String]) -> Result<(), String> {
    let Some(path) = args.first() else { usage() };
    let body = read_file(path).await?;
    let parsed = blogview::response::parse_response(&body).map_err(|e| e.to_string())?;
    print_results(&parsed.results, &parsed.log_text, &cfg.chart);
    Ok(())
}

async fn tokens(args: &[String]) -> Result<(), String> {
    let Some(path) = args.first() else { usage() };
    let text = read_file(path).await?;
    let lines: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    for (n, (line, spans)) in lines.iter().zip(tokenize(&text)).enumerate() {
        let styled: Vec<String> = coalesce(&spans)
            .iter()
            .filter_map(|s| s.class.map(|c| format!("{}:{}", c.style(), s.text(line))))
            .collect();
        if !styled.is_empty() {
            println!("{:>4}  {}", n + 1, styled.join(" "));
        }
    }
    Ok(())
}

fn paths(globals: &Globals) {
    match (&globals.config, ViewerConfig::default_path()) {
        (Some(p), _) => println!("config: {} (from --config)", p.display()),
        (None, Some(p)) => {
            let state = if p.exists() { "present" } else { "absent, using defaults" };
            println!("config: {} ({state})", p.display());
        }
        (None, None) => println!("config: no config directory on this platform"),
    }
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let (globals, args) = parse_args();
    let cmd = args[0].as_str();
    let rest = &args[1..];

    let result = match cmd {
        "paths" => {
            paths(&globals);
            Ok(())
        }
        "tokens" => tokens(rest).await,
        "submit" | "snippet" | "inspect" => match load_config(&globals) {
            Ok(cfg) => match cmd {
                "submit" => submit(&cfg, rest).await,
                "snippet" => snippet(&cfg, rest).await,
                _ => inspect(&cfg, rest).await,
            },
            Err(e) => Err(e),
        },
        _ => usage(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
