//! Command-line options shared by every command.

use std::path::PathBuf;

use vmf_analysis::AnalysisConfig;
use vmf_diagnostic::emitter::ColorMode;

/// How diagnostics are written.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl OutputFormat {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "terminal" | "human" => Some(OutputFormat::Terminal),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// A constructor picked by hand to settle an ambiguity (`--prefer=TYPE@OFFSET`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preference {
    pub ty: String,
    /// Span start of the chosen constructor.
    pub offset: u32,
}

impl Preference {
    pub fn parse(text: &str) -> Option<Self> {
        let (ty, offset) = text.rsplit_once('@')?;
        if ty.is_empty() {
            return None;
        }
        Some(Preference {
            ty: ty.to_owned(),
            offset: offset.parse().ok()?,
        })
    }
}

/// Options parsed from command line arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliOptions {
    /// Collection worker threads (--threads=N); `0` lets rayon decide.
    pub threads: usize,
    /// Keep view and companion registrations adjacent when fixing
    /// (cleared by --no-keep-adjacent).
    pub keep_adjacent: bool,
    /// Diagnostic format (--format=terminal|json)
    pub format: OutputFormat,
    /// Output file (-o <path>, --output=<path>)
    pub output: Option<PathBuf>,
    /// Terminal colors (--color=auto|always|never)
    pub color: ColorMode,
    /// Constructor choices for ambiguous companions (--prefer=TYPE@OFFSET)
    pub prefer: Vec<Preference>,
}

impl Default for CliOptions {
    fn default() -> Self {
        CliOptions {
            threads: 0,
            keep_adjacent: true,
            format: OutputFormat::Terminal,
            output: None,
            color: ColorMode::Auto,
            prefer: Vec::new(),
        }
    }
}

impl CliOptions {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::default()
            .with_threads(self.threads)
            .with_keep_pairs_adjacent(self.keep_adjacent)
    }
}

/// Parse options, warning about (and ignoring) anything unrecognized.
///
/// Returns the options and the positional arguments in order.
pub fn parse_cli_options(args: &[String]) -> (CliOptions, Vec<String>) {
    let mut options = CliOptions::default();
    let mut positional = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if arg == "-o" && i + 1 < args.len() {
            options.output = Some(PathBuf::from(&args[i + 1]));
            i += 2;
            continue;
        }
        if let Some(output) = arg.strip_prefix("--output=") {
            options.output = Some(PathBuf::from(output));
        } else if let Some(threads) = arg.strip_prefix("--threads=") {
            if let Ok(n) = threads.parse() {
                options.threads = n;
            } else {
                eprintln!("warning: invalid thread count '{threads}', using default");
            }
        } else if arg == "--no-keep-adjacent" {
            options.keep_adjacent = false;
        } else if let Some(format) = arg.strip_prefix("--format=") {
            if let Some(f) = OutputFormat::parse(format) {
                options.format = f;
            } else {
                eprintln!("warning: unknown format '{format}', options: terminal, json");
            }
        } else if let Some(color) = arg.strip_prefix("--color=") {
            if let Some(mode) = ColorMode::parse(color) {
                options.color = mode;
            } else {
                eprintln!("warning: unknown color mode '{color}', options: auto, always, never");
            }
        } else if let Some(prefer) = arg.strip_prefix("--prefer=") {
            if let Some(p) = Preference::parse(prefer) {
                options.prefer.push(p);
            } else {
                eprintln!("warning: expected --prefer=TYPE@OFFSET, got '{prefer}'");
            }
        } else if arg.starts_with('-') {
            eprintln!("warning: unknown option '{arg}'");
        } else {
            positional.push(arg.clone());
        }
        i += 1;
    }

    (options, positional)
}
