//! CLI entrypoint for graphstega.

mod progress;
mod runlog;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use graphstega_carrier::AnyCarrier;
use graphstega_core::{CancelToken, Engine, Parameters, Preset};
use graphstega_crypto::{PayloadCipher, PlainPayload, XChaChaPayloadCipher};

use progress::TerminalReporter;
use runlog::RunLog;

/// Graph-theoretic steganography for images and WAV files.
#[derive(Debug, Parser)]
#[command(name = "graphstega")]
#[command(about = "Hide and recover payloads in images and WAV files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Engine tuning shared by all subcommands.
#[derive(Debug, Args)]
struct TuningArgs {
    /// Parameter preset: default, imperceptibility or performance.
    #[arg(long, default_value = "default")]
    preset: String,
    /// Permutation seed; acts as the placement key.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum per-channel colour distance for a trade (2..=128).
    #[arg(long)]
    distance_max: Option<u8>,
    /// Colour quantisation step: 1, 2, 4, 8, 16 or 32.
    #[arg(long)]
    quantum: Option<u8>,
    /// Samples aggregated per vertex (1..=4).
    #[arg(long)]
    samples_per_vertex: Option<u8>,
    /// Payload bits per vertex: 1, 2 or 4.
    #[arg(long)]
    bits_per_vertex: Option<u8>,
    /// Reserve matching passes (0..=8).
    #[arg(long)]
    reserve_matching: Option<u8>,
}

impl TuningArgs {
    fn parameters(&self) -> anyhow::Result<Parameters> {
        let Some(preset) = Preset::from_str_loose(&self.preset) else {
            bail!("unknown preset '{}'", self.preset);
        };
        let mut builder = preset.builder();
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if let Some(d) = self.distance_max {
            builder = builder.distance_max(d);
        }
        if let Some(q) = self.quantum {
            builder = builder.quantum(q);
        }
        if let Some(s) = self.samples_per_vertex {
            builder = builder.samples_per_vertex(s);
        }
        if let Some(b) = self.bits_per_vertex {
            builder = builder.message_bits_per_vertex(b);
        }
        if let Some(r) = self.reserve_matching {
            builder = builder.reserve_matching(r);
        }
        Ok(builder.build())
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Embed a payload file into a carrier.
    Embed {
        /// Input carrier (image or .wav).
        #[arg(long)]
        carrier: PathBuf,
        /// Where to write the stego carrier.
        #[arg(long)]
        output: PathBuf,
        /// Payload file; "-" reads stdin.
        #[arg(long)]
        payload: PathBuf,
        /// Passphrase; omit to embed unencrypted.
        #[arg(long)]
        key: Option<String>,
        /// Append structured JSONL events to this file.
        #[arg(long)]
        log: Option<PathBuf>,
        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// Recover a payload from a carrier.
    Extract {
        #[arg(long)]
        carrier: PathBuf,
        /// Payload destination; omit or "-" for stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Passphrase used at embed time, if any.
        #[arg(long)]
        key: Option<String>,
        /// Append structured JSONL events to this file.
        #[arg(long)]
        log: Option<PathBuf>,
        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// Report how many payload bytes a carrier can hold.
    Capacity {
        #[arg(long)]
        carrier: PathBuf,
        #[command(flatten)]
        tuning: TuningArgs,
    },
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Embed {
            carrier,
            output,
            payload,
            key,
            log,
            tuning,
        } => embed(&carrier, &output, &payload, key.as_deref(), log.as_deref(), &tuning),
        Command::Extract {
            carrier,
            output,
            key,
            log,
            tuning,
        } => extract(&carrier, output.as_deref(), key.as_deref(), log.as_deref(), &tuning),
        Command::Capacity { carrier, tuning } => capacity(&carrier, &tuning),
    }
}

fn cipher_for(key: Option<&str>) -> Box<dyn PayloadCipher> {
    match key {
        Some(pass) => Box::new(XChaChaPayloadCipher::new(pass)),
        None => Box::new(PlainPayload),
    }
}

fn open_log(path: Option<&Path>, params: &Parameters) -> anyhow::Result<Option<RunLog>> {
    let Some(path) = path else { return Ok(None) };
    let log = RunLog::open(path)?;
    log.event(
        "run_started",
        Some(serde_json::json!({ "parameters": params })),
    )?;
    Ok(Some(log))
}

fn read_payload(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("reading payload from stdin")?;
        Ok(buf)
    } else {
        std::fs::read(path).with_context(|| format!("reading payload {}", path.display()))
    }
}

fn embed(
    carrier_path: &Path,
    output: &Path,
    payload_path: &Path,
    key: Option<&str>,
    log_path: Option<&Path>,
    tuning: &TuningArgs,
) -> anyhow::Result<()> {
    let params = tuning.parameters()?;
    let log = open_log(log_path, &params)?;

    let payload = read_payload(payload_path)?;
    let sealed = cipher_for(key)
        .seal(&payload)
        .context("sealing payload")?;

    let mut carrier = AnyCarrier::load(carrier_path)
        .with_context(|| format!("loading carrier {}", carrier_path.display()))?;
    let engine = Engine::new(params);
    let available = engine.capacity(&carrier)?;
    if sealed.len() > available {
        bail!(
            "payload is {} bytes sealed but the carrier holds at most {available}",
            sealed.len()
        );
    }

    let reporter = TerminalReporter::new();
    let report = engine.embed_with(&mut carrier, &sealed, &reporter, &CancelToken::new())?;
    reporter.finish();

    carrier
        .save(output)
        .with_context(|| format!("saving carrier {}", output.display()))?;

    if let Some(log) = &log {
        log.event("embed_finished", Some(serde_json::json!({ "report": report })))?;
        log.artifact("carrier_saved", output)?;
    }
    eprintln!(
        "embedded {} payload bytes ({} matched, {} via reserves, {} adjusted) into {}",
        report.payload_bytes,
        report.matched_direct,
        report.matched_reserve,
        report.adjusted,
        output.display()
    );
    Ok(())
}

fn extract(
    carrier_path: &Path,
    output: Option<&Path>,
    key: Option<&str>,
    log_path: Option<&Path>,
    tuning: &TuningArgs,
) -> anyhow::Result<()> {
    let params = tuning.parameters()?;
    let log = open_log(log_path, &params)?;

    let carrier = AnyCarrier::load(carrier_path)
        .with_context(|| format!("loading carrier {}", carrier_path.display()))?;
    let sealed = Engine::new(params).extract(&carrier)?;
    let payload = cipher_for(key).open(&sealed).context("opening payload")?;

    match output {
        Some(path) if path.as_os_str() != "-" => {
            std::fs::write(path, &payload)
                .with_context(|| format!("writing payload {}", path.display()))?;
            if let Some(log) = &log {
                log.event(
                    "extract_finished",
                    Some(serde_json::json!({ "payload_bytes": payload.len() })),
                )?;
                log.artifact("payload_saved", path)?;
            }
            eprintln!("extracted {} bytes to {}", payload.len(), path.display());
        }
        _ => {
            std::io::stdout()
                .write_all(&payload)
                .context("writing payload to stdout")?;
            if let Some(log) = &log {
                log.event(
                    "extract_finished",
                    Some(serde_json::json!({ "payload_bytes": payload.len() })),
                )?;
            }
        }
    }
    Ok(())
}

fn capacity(carrier_path: &Path, tuning: &TuningArgs) -> anyhow::Result<()> {
    let params = tuning.parameters()?;
    let carrier = AnyCarrier::load(carrier_path)
        .with_context(|| format!("loading carrier {}", carrier_path.display()))?;
    let plain = Engine::new(params).capacity(&carrier)?;
    let cipher = XChaChaPayloadCipher::new("");
    let sealed_overhead = cipher.sealed_len(0);
    println!("{plain} bytes unencrypted");
    println!(
        "{} bytes with a key (sealing adds {sealed_overhead})",
        plain.saturating_sub(sealed_overhead)
    );
    Ok(())
}
