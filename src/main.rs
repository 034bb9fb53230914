use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use video_fft::analyzer::FrameSelection;
use video_fft::progress::frame_progress_bar;
use video_fft::render::PngRenderer;
use video_fft::report::{self, OutputFormat, ProfileTable, Report, ReportEncoder};
use video_fft::{source, AnalysisConfig, Analyzer, RingPolicy, SequenceResult, VisualizationPolicy};

#[derive(Parser, Debug)]
#[command(name = "video-fft")]
#[command(author, version, about = "Measure the spectral resolution of video frames")]
struct Args {
    /// Video file, image file, or directory of images
    input: PathBuf,

    /// Directory for rendered images (default: next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of frames to analyze
    #[arg(short = 'n', long)]
    num_frames: Option<usize>,

    /// Report format written to stdout
    #[arg(short = 'f', long, default_value = "json")]
    output_format: OutputFormat,

    /// Render the spectrum of the first frame
    #[arg(short = 'r', long)]
    first_frame: bool,

    /// Render the spectrum of every frame
    #[arg(short, long)]
    all_frames: bool,

    /// Render the mean spectrum of the sequence
    #[arg(short, long)]
    mean: bool,

    /// Scaling factor for rendered images
    #[arg(short, long, default_value = "1.0")]
    scale: f64,

    /// No progress bar
    #[arg(short, long)]
    quiet: bool,

    /// Which rings make up the radial profile: inscribed or full
    #[arg(long, default_value = "inscribed")]
    ring_policy: RingPolicy,

    /// Also write radial profiles (.json or .csv)
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Number of worker threads for frame analysis (default: 1)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn visualization(&self) -> VisualizationPolicy {
        let frames = if self.all_frames {
            FrameSelection::All
        } else if self.first_frame {
            FrameSelection::First
        } else {
            FrameSelection::None
        };
        VisualizationPolicy {
            frames,
            mean: self.mean,
        }
    }
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> video_fft::Result<()> {
    // Set up thread pool
    let jobs = args.jobs.unwrap_or(1).max(1);
    if jobs > 1 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let frames = source::open(&args.input)?;
    let total = frames.total_frames();

    let config = AnalysisConfig {
        num_frames_limit: args.num_frames,
        visualization: args.visualization(),
        progress_enabled: !args.quiet,
        ring_policy: args.ring_policy,
        jobs,
    };

    let mut renderer = if config.visualization.is_enabled() {
        let dir = args.output.clone().unwrap_or_else(|| default_output_dir(&args.input));
        Some(PngRenderer::new(dir, output_prefix(&args.input), args.scale)?)
    } else {
        None
    };

    let result = {
        let pb = (!args.quiet).then(|| frame_progress_bar(bounded(total, args.num_frames)));
        let mut analyzer = Analyzer::with_config(config);
        if let Some(ref pb) = pb {
            analyzer = analyzer.with_observer(pb);
        }
        if let Some(ref mut renderer) = renderer {
            analyzer = analyzer.with_renderer(renderer);
        }

        let result = analyzer.run_with_total(frames, total);
        if let Some(ref pb) = pb {
            pb.finish_and_clear();
        }
        result?
    };

    write_report(args, &result)?;

    if let Some(ref path) = args.profiles {
        report::save_profiles(path, &ProfileTable::from_result(&result))?;
        if !args.quiet {
            eprintln!("Profiles saved: {}", path.display());
        }
    }

    if let Some(renderer) = renderer {
        if !args.quiet {
            for path in renderer.written() {
                eprintln!("Image saved: {}", path.display());
            }
        }
    }

    Ok(())
}

fn write_report(args: &Args, result: &SequenceResult) -> video_fft::Result<()> {
    let input = absolute_input(&args.input);
    let report = Report::from_result(result, Some(input.as_str()));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    args.output_format.write_report(&mut out, &report)?;
    out.flush()?;
    Ok(())
}

/// Absolute form of the input path, or the path as given if it can't be resolved.
fn absolute_input(input: &Path) -> String {
    std::fs::canonicalize(input)
        .unwrap_or_else(|_| input.to_path_buf())
        .display()
        .to_string()
}

fn bounded(total: Option<usize>, limit: Option<usize>) -> Option<usize> {
    match (total, limit) {
        (Some(t), Some(l)) => Some(t.min(l)),
        (t, _) => t,
    }
}

/// Images land next to a file input, or inside a directory input.
fn default_output_dir(input: &Path) -> PathBuf {
    if input.is_dir() {
        return input.to_path_buf();
    }
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn output_prefix(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("frames")
        .to_string()
}
