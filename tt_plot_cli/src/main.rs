//! Command line front end for charting HeFTy inversion exports.
//!
//! `tt-plot plot` renders the classic time-temperature envelope figure:
//! every tried path as a thin line colored by combined goodness of fit,
//! constraint boxes on top, a colorbar on the right. `tt-plot inspect`
//! prints a summary of an export without touching the plotting backend.

use std::fs;
use std::io::{self, Write};
use std::panic;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tt_plot::score::{self, CombineMethod};
use tt_plot::{parse_inversion, Inversion, PathCategory};

/// matplotlib tab:orange, the conventional good-fit color.
const GOOD_ORANGE: RGBColor = RGBColor(255, 127, 14);
/// matplotlib grayscale 0.35, used for the emphasized subset.
const EMPH_GRAY: RGBColor = RGBColor(89, 89, 89);
const COLORBAR_WIDTH: i32 = 100;

#[derive(Parser)]
#[command(
    name = "tt-plot",
    version,
    about = "Chart HeFTy time-temperature inversion exports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the time-temperature envelope chart
    Plot(PlotArgs),
    /// Summarize an export without rendering anything
    Inspect(InspectArgs),
}

#[derive(Args)]
struct PlotArgs {
    /// HeFTy inversion export (tab-delimited text)
    input: PathBuf,

    /// Output PNG path; defaults to the input with a .png extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write an SVG copy to this path
    #[arg(long, value_name = "SVG")]
    svg: Option<PathBuf>,

    /// Parse and score only, skip rendering
    #[arg(long = "no-plot", action = ArgAction::SetTrue)]
    no_plot: bool,

    /// How per-measurement GOF values combine into one score
    #[arg(long, value_enum, default_value = "fisher")]
    method: MethodOpt,

    /// Bottom of the colormap range
    #[arg(long = "gof-min", default_value_t = 0.05, value_name = "GOF")]
    gof_min: f64,

    /// Top of the colormap range, and the good-fit cutoff
    #[arg(long = "gof-max", default_value_t = 0.5, value_name = "GOF")]
    gof_max: f64,

    /// Color good fits orange instead of extending the colormap (default)
    #[arg(long = "highlight-good", action = ArgAction::SetTrue)]
    highlight_good: bool,

    /// Color every path from the colormap alone
    #[arg(
        long = "no-highlight-good",
        action = ArgAction::SetTrue,
        conflicts_with = "highlight_good"
    )]
    no_highlight_good: bool,

    /// How many good fits to emphasize in gray
    #[arg(long, default_value_t = 40, value_name = "N")]
    emphasize: usize,

    /// Seed for the emphasized-path sample
    #[arg(long)]
    seed: Option<u64>,

    /// Left edge of the age axis in Ma; defaults to 5% past the data
    #[arg(long = "x-max", value_name = "MA")]
    x_max: Option<f64>,

    /// Top edge of the temperature axis in C; defaults to 5% past the data
    #[arg(long = "y-max", value_name = "C")]
    y_max: Option<f64>,

    /// Image width in pixels
    #[arg(long, default_value_t = 1200)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 900)]
    height: u32,

    /// Chart caption
    #[arg(long)]
    title: Option<String>,

    /// Write per-path scores as CSV
    #[arg(long, value_name = "CSV")]
    scores: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Args)]
struct InspectArgs {
    /// HeFTy inversion export (tab-delimited text)
    input: PathBuf,

    /// Output path, '-' for stdout
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// Emit JSON instead of the text report
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Log debug detail to stderr
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MethodOpt {
    /// Fisher's combined probability
    Fisher,
    /// Mean weighted by 1 - GOF
    WeightedMean,
}

impl From<MethodOpt> for CombineMethod {
    fn from(value: MethodOpt) -> Self {
        match value {
            MethodOpt::Fisher => CombineMethod::Fisher,
            MethodOpt::WeightedMean => CombineMethod::WeightedMean,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Plot(args) => {
            init_tracing(args.verbose);
            handle_plot(args)
        }
        Commands::Inspect(args) => {
            init_tracing(args.verbose);
            handle_inspect(args)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn handle_plot(args: PlotArgs) -> Result<()> {
    if !(args.gof_max > args.gof_min) {
        bail!(
            "--gof-max must be above --gof-min (got {} and {})",
            args.gof_max,
            args.gof_min
        );
    }
    if args.width < 300 || args.height < 300 {
        bail!("image must be at least 300x300 pixels");
    }

    let started = Instant::now();
    let raw = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let text = String::from_utf8_lossy(&raw);
    let inversion = parse_inversion(&text)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;
    debug!("parsed {} in {:?}", args.input.display(), started.elapsed());
    info!(
        "parsed {}: {} paths, {} constraints, {} measurements",
        args.input.display(),
        inversion.paths.len(),
        inversion.constraints.len(),
        inversion.measurements.len()
    );

    let method = CombineMethod::from(args.method);
    let scores: Vec<f64> = inversion
        .paths
        .iter()
        .map(|p| score::combine_gofs(method, &p.gofs))
        .collect();
    let undrawable = inversion
        .paths
        .iter()
        .zip(scores.iter())
        .filter(|(p, s)| !s.is_finite() || p.points.len() < 2)
        .count();
    if undrawable > 0 {
        warn!(
            "{undrawable} of {} paths have no finite score or fewer than two points and will not be drawn",
            scores.len()
        );
    }
    let ranked = score::draw_order(&scores);

    if let Some(csv_path) = &args.scores {
        write_scores_csv(csv_path, &inversion, &scores, &ranked)
            .with_context(|| format!("failed to write {}", csv_path.display()))?;
        info!("wrote scores to {}", csv_path.display());
    }
    if args.no_plot {
        return Ok(());
    }

    let highlight = args.highlight_good || !args.no_highlight_good;
    // the black best-fit treatment only applies when it clears the cutoff;
    // otherwise the whole envelope rides the colormap
    let best = if highlight {
        score::best_index(&scores).filter(|&b| scores[b] > args.gof_max)
    } else {
        None
    };
    let emphasized: Vec<usize> = if let Some(best_idx) = best {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let candidates: Vec<usize> = (0..scores.len())
            .filter(|&i| i != best_idx && scores[i].is_finite() && scores[i] > args.gof_max)
            .collect();
        let take = args.emphasize.min(candidates.len());
        debug!("emphasizing {take} of {} good paths", candidates.len());
        candidates
            .choose_multiple(&mut rng, take)
            .copied()
            .collect()
    } else {
        Vec::new()
    };

    let x_max = args.x_max.unwrap_or_else(|| pad_extent(inversion.time_max()));
    let y_max = args.y_max.unwrap_or_else(|| pad_extent(inversion.temp_max()));
    if !(x_max > 0.0) || !(y_max > 0.0) {
        bail!("cannot size axes from the data; pass --x-max and --y-max");
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("png"));
    let inputs = ChartInputs {
        inversion: &inversion,
        scores: &scores,
        ranked: &ranked,
        emphasized: &emphasized,
        best,
        method,
        gof_min: args.gof_min,
        gof_max: args.gof_max,
        highlight,
        x_max,
        y_max,
        title: args.title.as_deref(),
    };

    render_guarded(&output, false, args.width, args.height, &inputs);
    if let Some(svg_path) = &args.svg {
        render_guarded(svg_path, true, args.width, args.height, &inputs);
    }
    Ok(())
}

/// Runs one backend under a panic guard. Plotting backends can panic in
/// stripped-down environments with no usable fonts; a missing chart must
/// not fail the scoring run.
fn render_guarded(target: &Path, svg: bool, width: u32, height: u32, inputs: &ChartInputs) {
    let started = Instant::now();
    let rendered = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        if svg {
            render_svg(target, width, height, inputs)
        } else {
            render_png(target, width, height, inputs)
        }
    }));
    match rendered {
        Ok(Ok(())) => {
            info!("wrote chart to {}", target.display());
            debug!("rendered {} in {:?}", target.display(), started.elapsed());
        }
        Ok(Err(err)) => warn!("chart rendering failed for {}: {err:#}", target.display()),
        Err(_) => warn!(
            "chart rendering panicked for {} (likely font loading); skipping",
            target.display()
        ),
    }
}

fn handle_inspect(args: InspectArgs) -> Result<()> {
    let raw = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let text = String::from_utf8_lossy(&raw);
    let inversion = parse_inversion(&text)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;

    let summary = summarize(&args.input, &inversion);
    let rendered = if args.json {
        let mut body = serde_json::to_string_pretty(&summary)?;
        body.push('\n');
        body
    } else {
        format_summary(&summary)
    };

    if args.output.as_os_str() == "-" {
        io::stdout().lock().write_all(rendered.as_bytes())?;
    } else {
        fs::write(&args.output, &rendered)
            .with_context(|| format!("failed to write {}", args.output.display()))?;
        info!("wrote report to {}", args.output.display());
    }
    Ok(())
}

fn write_scores_csv(
    path: &Path,
    inversion: &Inversion,
    scores: &[f64],
    ranked: &[usize],
) -> Result<()> {
    // rank 1 is the best-scoring path; unscored paths get an empty rank
    let mut rank_of: Vec<Option<usize>> = vec![None; scores.len()];
    for (pos, &idx) in ranked.iter().enumerate() {
        rank_of[idx] = Some(ranked.len() - pos);
    }

    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec![
        "path".to_string(),
        "category".to_string(),
        "rank".to_string(),
        "score".to_string(),
    ];
    header.extend(inversion.measurements.iter().map(|m| format!("gof:{m}")));
    header.extend(inversion.measurements.iter().map(|m| format!("date:{m}")));
    wtr.write_record(&header)?;

    for (idx, member) in inversion.paths.iter().enumerate() {
        let mut record = vec![
            member.label.clone(),
            member.category.to_string(),
            rank_of[idx].map(|r| r.to_string()).unwrap_or_default(),
            csv_cell(scores[idx]),
        ];
        record.extend(member.gofs.iter().map(|&g| csv_cell(g)));
        record.extend(member.dates.iter().map(|&d| csv_cell(d)));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct InspectSummary {
    file: String,
    measurements: Vec<String>,
    constraints: Vec<tt_plot::Constraint>,
    path_count: usize,
    good: usize,
    acceptable: usize,
    other: usize,
    best_fit_label: String,
    time_max_ma: f64,
    temp_max_c: f64,
    fisher: ScoreStats,
    weighted_mean: ScoreStats,
    dates: Vec<DateStats>,
}

#[derive(Serialize)]
struct ScoreStats {
    min: f64,
    median: f64,
    max: f64,
}

#[derive(Serialize)]
struct DateStats {
    measurement: String,
    mean: f64,
    min: f64,
    max: f64,
}

fn summarize(input: &Path, inversion: &Inversion) -> InspectSummary {
    let fisher: Vec<f64> = inversion
        .paths
        .iter()
        .map(|p| score::combine_gofs(CombineMethod::Fisher, &p.gofs))
        .collect();
    let weighted: Vec<f64> = inversion
        .paths
        .iter()
        .map(|p| score::combine_gofs(CombineMethod::WeightedMean, &p.gofs))
        .collect();

    let mut good = 0;
    let mut acceptable = 0;
    let mut other = 0;
    for member in &inversion.paths {
        match member.category {
            PathCategory::Good => good += 1,
            PathCategory::Acceptable => acceptable += 1,
            _ => other += 1,
        }
    }

    let dates = inversion
        .measurements
        .iter()
        .enumerate()
        .map(|(i, measurement)| {
            let values: Vec<f64> = inversion
                .paths
                .iter()
                .filter_map(|p| p.dates.get(i).copied())
                .filter(|d| d.is_finite())
                .collect();
            DateStats {
                measurement: measurement.clone(),
                mean: mean(&values),
                min: vmin(&values),
                max: vmax(&values),
            }
        })
        .collect();

    InspectSummary {
        file: input.display().to_string(),
        measurements: inversion.measurements.clone(),
        constraints: inversion.constraints.clone(),
        path_count: inversion.paths.len(),
        good,
        acceptable,
        other,
        best_fit_label: inversion.best_fit.label.clone(),
        time_max_ma: inversion.time_max(),
        temp_max_c: inversion.temp_max(),
        fisher: score_stats(&fisher),
        weighted_mean: score_stats(&weighted),
        dates,
    }
}

fn score_stats(scores: &[f64]) -> ScoreStats {
    let finite: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
    ScoreStats {
        min: vmin(&finite),
        median: median(&finite),
        max: vmax(&finite),
    }
}

fn format_summary(summary: &InspectSummary) -> String {
    let mut report = String::new();
    report.push_str(&format!("FILE: {}\n", summary.file));
    report.push_str(&format!(
        "  measurements: {} ({})\n",
        summary.measurements.len(),
        summary.measurements.join(", ")
    ));
    report.push_str(&format!("  constraints: {}\n", summary.constraints.len()));
    for c in &summary.constraints {
        report.push_str(&format!(
            "    - {} to {} Ma, {} to {} C\n",
            fmt_stat(c.t_max),
            fmt_stat(c.t_min),
            fmt_stat(c.temp_max),
            fmt_stat(c.temp_min)
        ));
    }
    report.push_str(&format!(
        "  paths: {} (good {}, acceptable {}, other {})\n",
        summary.path_count, summary.good, summary.acceptable, summary.other
    ));
    report.push_str(&format!("  best fit: {}\n", summary.best_fit_label));
    report.push_str(&format!(
        "  oldest time: {} Ma\n",
        fmt_stat(summary.time_max_ma)
    ));
    report.push_str(&format!(
        "  hottest temperature: {} C\n",
        fmt_stat(summary.temp_max_c)
    ));
    report.push_str(&format!(
        "  fisher score: min {} median {} max {}\n",
        fmt_stat(summary.fisher.min),
        fmt_stat(summary.fisher.median),
        fmt_stat(summary.fisher.max)
    ));
    report.push_str(&format!(
        "  weighted mean score: min {} median {} max {}\n",
        fmt_stat(summary.weighted_mean.min),
        fmt_stat(summary.weighted_mean.median),
        fmt_stat(summary.weighted_mean.max)
    ));
    for date in &summary.dates {
        report.push_str(&format!(
            "  date {}: mean {} Ma (range {} to {})\n",
            date.measurement,
            fmt_stat(date.mean),
            fmt_stat(date.min),
            fmt_stat(date.max)
        ));
    }
    report
}

struct ChartInputs<'a> {
    inversion: &'a Inversion,
    scores: &'a [f64],
    ranked: &'a [usize],
    emphasized: &'a [usize],
    best: Option<usize>,
    method: CombineMethod,
    gof_min: f64,
    gof_max: f64,
    highlight: bool,
    x_max: f64,
    y_max: f64,
    title: Option<&'a str>,
}

fn render_png(path: &Path, width: u32, height: u32, inputs: &ChartInputs) -> Result<()> {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    draw_chart(&root, inputs)?;
    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn render_svg(path: &Path, width: u32, height: u32, inputs: &ChartInputs) -> Result<()> {
    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    draw_chart(&root, inputs)?;
    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn draw_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, inputs: &ChartInputs) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (width, _) = root.dim_in_pixel();
    let (main, strip) = root.split_horizontally(width as i32 - COLORBAR_WIDTH);

    let mut builder = ChartBuilder::on(&main);
    builder
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 55);
    if let Some(title) = inputs.title {
        builder.caption(title, FontDesc::new(FontFamily::SansSerif, 22.0, FontStyle::Normal));
    }
    // both axes run high to low so the present sits at the origin corner
    let mut chart = builder.build_cartesian_2d(inputs.x_max..0.0, inputs.y_max..0.0)?;
    chart
        .configure_mesh()
        .x_desc("Age (Ma)")
        .y_desc("Temperature (°C)")
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(TRANSPARENT)
        .label_style(FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Normal))
        .axis_desc_style(FontDesc::new(FontFamily::SansSerif, 18.0, FontStyle::Normal))
        .draw()?;

    let paths = &inputs.inversion.paths;
    let mut labeled_good = false;

    // ascending score order puts better paths on top of worse ones
    for &idx in inputs.ranked {
        if inputs.best == Some(idx) || inputs.emphasized.contains(&idx) {
            continue;
        }
        let member = &paths[idx];
        if member.points.len() < 2 {
            continue;
        }
        let combined = inputs.scores[idx];
        if inputs.highlight && combined > inputs.gof_max {
            let anno = chart.draw_series(LineSeries::new(
                member.points.iter().copied(),
                GOOD_ORANGE.stroke_width(1),
            ))?;
            if !labeled_good {
                anno.label(format!("Good fits (GOF > {:.2})", inputs.gof_max))
                    .legend(|(x, y)| {
                        PathElement::new(vec![(x, y), (x + 24, y)], GOOD_ORANGE.stroke_width(2))
                    });
                labeled_good = true;
            }
        } else {
            let shade = score::normalize_gof(combined, inputs.gof_min, inputs.gof_max);
            let color = ViridisRGB.get_color(shade);
            chart.draw_series(LineSeries::new(
                member.points.iter().copied(),
                color.stroke_width(1),
            ))?;
        }
    }

    let mut labeled_emphasized = false;
    for &idx in inputs.ranked {
        if inputs.best == Some(idx) || !inputs.emphasized.contains(&idx) {
            continue;
        }
        let member = &paths[idx];
        if member.points.len() < 2 {
            continue;
        }
        let anno = chart.draw_series(LineSeries::new(
            member.points.iter().copied(),
            EMPH_GRAY.stroke_width(1),
        ))?;
        if !labeled_emphasized {
            anno.label("Randomly-chosen good fits").legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], EMPH_GRAY.stroke_width(2))
            });
            labeled_emphasized = true;
        }
    }

    if let Some(best_idx) = inputs.best {
        let member = &paths[best_idx];
        if member.points.len() >= 2 {
            let anno = chart.draw_series(LineSeries::new(
                member.points.iter().copied(),
                BLACK.stroke_width(3),
            ))?;
            anno.label("Best-fit path").legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], BLACK.stroke_width(3))
            });
        }
    }

    chart.draw_series(inputs.inversion.constraints.iter().map(|c| {
        Rectangle::new(
            [(c.t_max, c.temp_max), (c.t_min, c.temp_min)],
            BLACK.stroke_width(2),
        )
    }))?;

    if labeled_good || labeled_emphasized || inputs.best.is_some() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.4))
            .label_font(FontDesc::new(FontFamily::SansSerif, 15.0, FontStyle::Normal))
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    draw_colorbar(
        &strip,
        inputs.method,
        inputs.gof_min,
        inputs.gof_max,
        inputs.highlight,
    )?;
    Ok(())
}

/// Vertical colormap key on the right edge, drawn in pixel coordinates.
fn draw_colorbar<DB: DrawingBackend>(
    strip: &DrawingArea<DB, Shift>,
    method: CombineMethod,
    gof_min: f64,
    gof_max: f64,
    highlight: bool,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (width, height) = strip.dim_in_pixel();
    let top = 40;
    let bottom = height as i32 - 60;
    let left = 10;
    let right = 34;
    let span = (bottom - top) as f64;

    let steps = 100;
    for i in 0..steps {
        let f0 = i as f64 / steps as f64;
        let f1 = (i + 1) as f64 / steps as f64;
        let y0 = top + (span * (1.0 - f1)).round() as i32;
        let y1 = top + (span * (1.0 - f0)).round() as i32;
        let color = ViridisRGB.get_color((f0 + f1) / 2.0);
        strip.draw(&Rectangle::new([(left, y0), (right, y1)], color.filled()))?;
    }
    strip.draw(&Rectangle::new(
        [(left, top), (right, bottom)],
        BLACK.stroke_width(1),
    ))?;

    let tick_font = FontDesc::new(FontFamily::SansSerif, 14.0, FontStyle::Normal);
    for k in 0..6 {
        let frac = k as f64 / 5.0;
        let value = gof_min + (gof_max - gof_min) * frac;
        let y = top + (span * (1.0 - frac)).round() as i32;
        // the top tick stands for "this and everything above" unless good
        // fits get their own color
        let text = if k == 5 && !highlight {
            format!("≥{value:.2}")
        } else {
            format!("{value:.2}")
        };
        strip.draw(&Text::new(text, (right + 4, y - 7), tick_font.clone()))?;
    }

    let label = match method {
        CombineMethod::Fisher => "Goodness of fit (Fisher)",
        CombineMethod::WeightedMean => "Goodness of fit (weighted mean)",
    };
    let label_font = FontDesc::new(FontFamily::SansSerif, 15.0, FontStyle::Normal)
        .transform(FontTransform::Rotate270);
    strip.draw(&Text::new(label, (width as i32 - 16, bottom), label_font))?;
    Ok(())
}

fn pad_extent(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value * 1.05
    } else {
        f64::NAN
    }
}

fn csv_cell(value: f64) -> String {
    if value.is_finite() {
        format!("{value}")
    } else {
        String::new()
    }
}

fn fmt_stat(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.3}")
    } else {
        "n/a".to_string()
    }
}

fn vmin(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::min)
}

fn vmax(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::max)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Median of finite values. Callers filter NaN first.
fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
