//! ExoNeural CLI Module
//!
//! Command-line interface for serving the API, scoring files offline,
//! checking artifacts and issuing tokens.

use clap::{Parser, Subcommand};
use colored::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::inference::{ArtifactPaths, ModelArtifacts, Predictor};
use crate::security::{JwtVerifier, SecurityConfig};
use crate::server::{run_server, ServerConfig, MODEL_VERSION};
use crate::validation::{validate_batch, validate_observation};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn bad(s: &str) -> ColoredString    { s.truecolor(235, 100, 100) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_fail(msg: &str) {
    println!("  {} {}", bad("✗"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "exoneural")]
#[command(author = "ExoNeural Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Exoplanet disposition prediction service")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Server port (defaults to API_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host (defaults to API_HOST)
        #[arg(long)]
        host: Option<String>,
    },

    /// Score a JSON file offline
    Predict {
        /// Input file: one observation, or {"data": [...]}
        #[arg(short, long)]
        input: PathBuf,

        /// Write the JSON results here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory holding all three artifacts, overriding the env paths
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },

    /// Load the artifacts and verify their column contracts
    Check {
        /// Directory holding all three artifacts, overriding the env paths
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },

    /// Issue a JWT signed with JWT_SECRET_KEY
    Token {
        /// Token subject
        #[arg(short, long)]
        subject: String,
    },
}

fn artifact_paths(dir: Option<&Path>) -> ArtifactPaths {
    match dir {
        Some(dir) => ArtifactPaths::in_dir(dir),
        None => ArtifactPaths::default(),
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub async fn cmd_serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: host.unwrap_or(defaults.host.clone()),
        port: port.unwrap_or(defaults.port),
        ..defaults
    };

    println!();
    println!("  {}", "ExoNeural API".white().bold());
    println!("  {} {}", muted("listening on"), accent(&format!("http://{}:{}", config.host, config.port)));
    println!("  {} {}", muted("environment "), config.environment.to_string().white());
    println!();

    run_server(config).await
}

/// Outcomes for an input document, in the API's response shape
fn score_document(predictor: &Predictor, payload: &Value) -> anyhow::Result<Value> {
    let is_batch = payload.as_object().map_or(false, |o| o.contains_key("data"));

    if is_batch {
        let rows = validate_batch(payload)
            .map_err(|e| anyhow::anyhow!("Validation error: {}", e))?;
        let outcomes = predictor.predict_batch(&rows);
        let results = outcomes
            .iter()
            .enumerate()
            .map(|(row_index, outcome)| {
                let mut value = serde_json::to_value(outcome)?;
                if let Value::Object(ref mut map) = value {
                    map.insert("row_index".to_string(), json!(row_index));
                }
                Ok(value)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(json!({
            "status": "success",
            "results": results,
            "total_processed": results.len(),
        }))
    } else {
        let observation = validate_observation(payload)
            .map_err(|e| anyhow::anyhow!("Validation error: {}", e))?;
        let mut value = serde_json::to_value(predictor.predict(&observation))?;
        if let Value::Object(ref mut map) = value {
            map.insert("status".to_string(), json!("success"));
            map.insert("model_version".to_string(), json!(MODEL_VERSION));
        }
        Ok(value)
    }
}

fn print_outcome(label: &str, outcome: &Value) {
    let prediction = outcome.get("prediction").and_then(Value::as_str).unwrap_or("?");
    let confidence = outcome.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
    match outcome.get("error").and_then(Value::as_str) {
        Some(err) => println!("  {:<8} {} {}", muted(label), bad(prediction), dim(err)),
        None => println!(
            "  {:<8} {:<22} {}",
            muted(label),
            prediction.white().bold(),
            accent(&format!("{:.4}", confidence))
        ),
    }
}

pub fn cmd_predict(
    input: &Path,
    output: Option<&Path>,
    artifacts: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading artifacts");
    let start = Instant::now();
    let predictor = Predictor::from_paths(&artifact_paths(artifacts));
    if let Some(reason) = predictor.load_error() {
        println!("{}", bad("failed"));
        anyhow::bail!("{}", reason);
    }
    step_done(&format!("{:?}", start.elapsed()));

    step_run(&format!("Reading {}", input.display()));
    let payload: Value = serde_json::from_str(&std::fs::read_to_string(input)?)?;
    step_done("");

    let start = Instant::now();
    let response = score_document(&predictor, &payload)?;
    let elapsed = start.elapsed();

    println!();
    match response.get("results").and_then(Value::as_array) {
        Some(results) => {
            for result in results {
                let idx = result.get("row_index").and_then(Value::as_u64).unwrap_or(0);
                print_outcome(&format!("#{}", idx), result);
            }
        }
        None => print_outcome("result", &response),
    }
    println!();
    println!("  {:<16} {}", muted("Time"), format!("{:?}", elapsed).white());

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&response)?)?;
        step_ok(&format!("Saved → {}", path.display()));
    }
    println!();
    Ok(())
}

pub fn cmd_check(artifacts: Option<&Path>) -> anyhow::Result<()> {
    section("Artifacts");

    let paths = artifact_paths(artifacts);
    println!("  {:<10} {}", muted("model"), paths.model.display());
    println!("  {:<10} {}", muted("imputer"), paths.imputer.display());
    println!("  {:<10} {}", muted("scaler"), paths.scaler.display());
    println!();

    match ModelArtifacts::load(&paths) {
        Ok(Some(loaded)) => {
            step_ok(&format!(
                "classifier: {} classes, {} features",
                loaded.classifier().n_classes(),
                loaded.classifier().feature_names().len()
            ));
            let optional = |present: bool, name: &str| {
                if present {
                    step_ok(&format!("{} loaded", name));
                } else {
                    println!("  {} {} {}", dim("-"), name, dim("not present, skipped"));
                }
            };
            optional(loaded.has_imputer(), "imputer");
            optional(loaded.has_scaler(), "scaler");
            println!();
            Ok(())
        }
        Ok(None) => {
            step_fail("model artifact not found");
            println!();
            anyhow::bail!("model artifact missing: {}", paths.model.display())
        }
        Err(e) => {
            step_fail(&e.to_string());
            println!();
            Err(e.into())
        }
    }
}

pub fn cmd_token(subject: &str) -> anyhow::Result<()> {
    let config = SecurityConfig::default();
    if config.uses_dev_secrets() {
        eprintln!("  {}", "warning: signing with the development JWT secret".yellow());
    }
    let verifier = JwtVerifier::from_config(&config);
    let token = verifier
        .create_token(subject, HashMap::new())
        .map_err(|e| anyhow::anyhow!(e))?;
    println!("{}", token);
    Ok(())
}
