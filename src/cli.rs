// Command-line front end
// Argument parsing and the load -> process -> export run used by the binary

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::audio::{load_audio_file, save_wav, AudioError, ExportError, DEFAULT_BIT_DEPTH};
use crate::config::{ConfigError, CutterParams};
use crate::pipeline::{process, ProcessError, TraceBuilder, TraceEntry, TraceWriter};

/// Errors surfaced to the command line
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing input file")]
    MissingInput,

    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("Failed to load parameters: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read input: {0}")]
    Audio(#[from] AudioError),

    #[error("{0}")]
    Process(#[from] ProcessError),

    #[error("Failed to write output: {0}")]
    Export(#[from] ExportError),
}

/// What the binary was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Run(CliArgs),
}

/// Fully resolved arguments for one run
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub params: CutterParams,
    pub bit_depth: u16,
    pub trace: Option<PathBuf>,
    pub verbose: bool,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub events: usize,
    /// Samples per channel in the exported file
    pub new_samples: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exported | events: {} | new samples: {}",
            self.events, self.new_samples
        )
    }
}

pub fn usage() -> &'static str {
    "Usage: consonant-cutter <input.wav> [output.wav] [options]

Shortens plosive and sibilant transients by removing the center of each
detected event and crossfading the seam.

Options:
  --threshold <dB>       Detection threshold [-60, -10] (default -32)
  --hpf <Hz>             Detector high-pass cutoff [2000, 12000] (default 6000)
  --max-event <ms>       Event length [20, 200] (default 90)
  --max-cut <ms>         Longest removed window [0, 80] (default 28)
  --cut-amount <0..1>    Fraction of --max-cut removed (default 0.55)
  --xfade <ms>           Seam crossfade [0.5, 15] (default 4)
  --event-gain <dB>      Gain on retained event audio [-24, 0] (default -6)
  --params <file.json>   Load a parameter preset (flags override it)
  --reset-detector       Reset the detector after each event
  --bit-depth <16|24|32> Output format, 32 = float (default 24)
  --trace <file.jsonl>   Append a JSONL run trace
  -v, --verbose          Debug logging
  -h, --help             Show this help

Output defaults to <input>_CC.wav next to the input."
}

/// `<dir>/<stem>_CC.wav` for an input path
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_CC.wav", stem))
}

fn next_value(args: &[String], i: usize, flag: &str) -> Result<String, CliError> {
    args.get(i)
        .cloned()
        .ok_or_else(|| CliError::MissingValue(flag.to_string()))
}

fn parse_f32(args: &[String], i: usize, flag: &str) -> Result<f32, CliError> {
    let value = next_value(args, i, flag)?;
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CliError::InvalidValue {
            flag: flag.to_string(),
            value,
        })
}

fn parse_bit_depth(args: &[String], i: usize, flag: &str) -> Result<u16, CliError> {
    let value = next_value(args, i, flag)?;
    match value.parse::<u16>() {
        Ok(bits @ (16 | 24 | 32)) => Ok(bits),
        _ => Err(CliError::InvalidValue {
            flag: flag.to_string(),
            value,
        }),
    }
}

/// Parse arguments (without the program name)
///
/// A `--params` preset is applied first regardless of its position; individual
/// flags then override its fields.
pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();

    let mut positional: Vec<PathBuf> = Vec::new();
    let mut preset: Option<PathBuf> = None;
    let mut threshold_db = None;
    let mut hpf_hz = None;
    let mut max_event_ms = None;
    let mut max_cut_ms = None;
    let mut cut_amount = None;
    let mut xfade_ms = None;
    let mut event_gain_db = None;
    let mut reset_detector = false;
    let mut bit_depth = DEFAULT_BIT_DEPTH;
    let mut trace = None;
    let mut verbose = false;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => return Ok(Command::Help),
            "--threshold" => {
                i += 1;
                threshold_db = Some(parse_f32(&args, i, flag)?);
            }
            "--hpf" => {
                i += 1;
                hpf_hz = Some(parse_f32(&args, i, flag)?);
            }
            "--max-event" => {
                i += 1;
                max_event_ms = Some(parse_f32(&args, i, flag)?);
            }
            "--max-cut" => {
                i += 1;
                max_cut_ms = Some(parse_f32(&args, i, flag)?);
            }
            "--cut-amount" => {
                i += 1;
                cut_amount = Some(parse_f32(&args, i, flag)?);
            }
            "--xfade" => {
                i += 1;
                xfade_ms = Some(parse_f32(&args, i, flag)?);
            }
            "--event-gain" => {
                i += 1;
                event_gain_db = Some(parse_f32(&args, i, flag)?);
            }
            "--params" => {
                i += 1;
                preset = Some(PathBuf::from(next_value(&args, i, flag)?));
            }
            "--reset-detector" => reset_detector = true,
            "--bit-depth" => {
                i += 1;
                bit_depth = parse_bit_depth(&args, i, flag)?;
            }
            "--trace" => {
                i += 1;
                trace = Some(PathBuf::from(next_value(&args, i, flag)?));
            }
            "--verbose" | "-v" => verbose = true,
            other if other.starts_with('-') && other.len() > 1 => {
                return Err(CliError::UnknownOption(other.to_string()));
            }
            other => {
                if positional.len() == 2 {
                    return Err(CliError::UnexpectedArgument(other.to_string()));
                }
                positional.push(PathBuf::from(other));
            }
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let input = positional.next().ok_or(CliError::MissingInput)?;
    let output = positional
        .next()
        .unwrap_or_else(|| default_output_path(&input));

    let mut params = match &preset {
        Some(path) => CutterParams::load(path)?,
        None => CutterParams::default(),
    };
    if let Some(v) = threshold_db {
        params = params.with_threshold_db(v);
    }
    if let Some(v) = hpf_hz {
        params = params.with_hpf_hz(v);
    }
    if let Some(v) = max_event_ms {
        params = params.with_max_event_ms(v);
    }
    if let Some(v) = max_cut_ms {
        params = params.with_max_cut_ms(v);
    }
    if let Some(v) = cut_amount {
        params = params.with_cut_amount(v);
    }
    if let Some(v) = xfade_ms {
        params = params.with_xfade_ms(v);
    }
    if let Some(v) = event_gain_db {
        params = params.with_event_gain_db(v);
    }
    if reset_detector {
        params = params.with_reset_detector_on_skip(true);
    }

    Ok(Command::Run(CliArgs {
        input,
        output,
        params,
        bit_depth,
        trace,
        verbose,
    }))
}

/// Trace failures never abort a run
fn record(writer: Option<&TraceWriter>, entry: TraceEntry) {
    if let Some(writer) = writer {
        if let Err(e) = writer.write(&entry) {
            log::warn!("Failed to write trace to {}: {}", writer.path().display(), e);
        }
    }
}

/// Load the input, process it and export the result
///
/// Nothing is written to `args.output` unless processing succeeds.
pub fn run(args: &CliArgs) -> Result<RunSummary, CliError> {
    let tracer = args.trace.as_ref().map(TraceWriter::new);
    let tracer = tracer.as_ref();

    record(
        tracer,
        TraceBuilder::stage("load").start(format!("Reading {}", args.input.display())),
    );
    let audio = load_audio_file(&args.input)?;
    let sample_rate = audio.sample_rate as f64;
    record(
        tracer,
        TraceBuilder::stage("load").complete(format!(
            "{} frames, {} channels, {} Hz",
            audio.frame_count(),
            audio.buffer.num_channels(),
            audio.sample_rate
        )),
    );

    record(tracer, TraceBuilder::stage("detect").start("Scanning for events"));
    let output = process(&audio.buffer, sample_rate, &args.params)?;
    record(
        tracer,
        TraceBuilder::stage("detect").events(&output.events, sample_rate),
    );
    record(
        tracer,
        TraceBuilder::stage("render").complete(format!(
            "{} -> {} samples",
            audio.buffer.num_samples(),
            output.buffer.num_samples()
        )),
    );

    record(
        tracer,
        TraceBuilder::stage("export").start(format!("Writing {}", args.output.display())),
    );
    save_wav(&args.output, &output.buffer, audio.sample_rate, args.bit_depth)?;
    record(tracer, TraceBuilder::stage("export").complete("Exported"));

    Ok(RunSummary {
        output: args.output.clone(),
        events: output.events.len(),
        new_samples: output.buffer.num_samples(),
    })
}
