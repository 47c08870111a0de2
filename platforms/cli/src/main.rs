use clap::{Parser, ValueEnum};
use lsys::{
    analyze, decode, encode, encode_system, search, to_path_data, to_svg, Animation, Config,
    Frame, Growth, PresetManager, RuleSet, System, SystemLoader, Tick,
};
use rand::{rngs::StdRng, SeedableRng};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// A standalone SVG document
    Svg,
    /// SVG path data only
    Path,
    /// The symbol string at the final depth
    Program,
    /// The rule set in rule notation
    Rules,
    /// A system document (.lsys) with the name, seed and rules
    Lsys,
    /// The final frame as JSON
    Json,
}

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  lsys-cli --preset hextooth --depth 5 > hextooth.svg
  lsys-cli --rng-seed 42 --format rules
  printf 'f → gfg\\ng → +f' | lsys-cli --format path")]
struct Cli {
    /// A system document (.lsys) to draw
    #[clap(short, long, conflicts_with = "preset")]
    rules: Option<PathBuf>,

    /// The name of a built-in preset, or a unique part of one
    #[clap(short, long)]
    preset: Option<String>,

    /// List the built-in presets and exit
    #[clap(long)]
    list_presets: bool,

    /// Seed the random search for reproducible rules
    #[clap(long)]
    rng_seed: Option<u64>,

    /// Starting symbols, overriding the configured seed and any document seed
    #[clap(short, long)]
    seed: Option<String>,

    /// Number of rewrite steps to apply
    #[clap(short, long, default_value_t = 6)]
    depth: usize,

    #[clap(short, long, value_enum, default_value_t = Format::Svg)]
    format: Format,

    /// JSON file overriding the default configuration
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Print statistics for each depth to stderr
    #[clap(long)]
    debug: bool,
}

/// Where the rules came from, with the seed they are drawn from.
struct Source {
    name: String,
    seed: String,
    rules: RuleSet,
}

impl Source {
    fn to_system(&self) -> System {
        System {
            name: self.name.clone(),
            seed: Some(self.seed.clone()),
            rules: self.rules.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.debug);

    if cli.list_presets {
        println!("{}", PresetManager::list_names().join("\n"));
        return;
    }

    let config = load_config(&cli).unwrap_or_else(|e| fail(&e));

    let mut source = load_source(&cli, &config).unwrap_or_else(|e| fail(&e));
    if cli.seed.is_some() {
        source.seed = config.seed.clone();
    }

    if cli.debug {
        print_analysis(&source, &config, cli.depth);
    }

    let output = match cli.format {
        Format::Rules => encode(&source.rules),
        Format::Lsys => encode_system(&source.to_system()),
        format => {
            let frame = run(&source, &config, cli.depth, cli.debug).unwrap_or_else(|e| fail(&e));
            render(format, &frame, &source, &config).unwrap_or_else(|e| fail(&e))
        }
    };

    println!("{}", output);
}

fn render(
    format: Format,
    frame: &Frame,
    source: &Source,
    config: &Config,
) -> Result<String, String> {
    match format {
        Format::Svg => Ok(to_svg(
            &frame.segments,
            config.margin,
            &source.rules,
            &source.seed,
        )),
        Format::Path => Ok(to_path_data(&frame.segments)),
        Format::Program => Ok(frame.program.clone()),
        Format::Rules => Ok(encode(&source.rules)),
        Format::Lsys => Ok(encode_system(&source.to_system())),
        Format::Json => serde_json::to_string_pretty(frame)
            .map_err(|e| format!("Failed to serialize frame: {}", e)),
    }
}

fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };

    if let Some(seed) = &cli.seed {
        config.seed = seed.clone();
        config.validate().map_err(|e| e.to_string())?;
    }

    Ok(config)
}

fn init_logging(debug: bool) {
    let default = if debug { "lsys=debug" } else { "lsys=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Picks the rules from a file, a preset, piped stdin or a random search, in that order.
fn load_source(cli: &Cli, config: &Config) -> Result<Source, String> {
    if let Some(path) = &cli.rules {
        let system = SystemLoader::load_system(path).map_err(|e| e.to_string())?;
        return Ok(Source {
            seed: system.seed_or(&config.seed).to_string(),
            name: system.name,
            rules: system.rules,
        });
    }

    if let Some(name) = &cli.preset {
        let system = find_preset(name)?;
        info!(preset = %system.name, "Loaded preset");
        return Ok(Source {
            seed: system.seed_or(&config.seed).to_string(),
            name: system.name,
            rules: system.rules,
        });
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        return source_from_text(&buffer, config);
    }

    let mut rng = match cli.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let discovery = search(
        &config.seed,
        &mut rng,
        config.search_attempts,
        config.growth_limit,
    )
    .map_err(|e| {
        warn!(error = %e, "Random search failed");
        e.to_string()
    })?;

    Ok(Source {
        name: format!("Random ({} attempts)", discovery.attempts),
        seed: config.seed.clone(),
        rules: discovery.rules,
    })
}

/// Looks a preset up by its full name, then by a part of the name that only one preset has.
fn find_preset(name: &str) -> Result<System, String> {
    if let Ok(system) = PresetManager::get_by_name(name) {
        return Ok(system);
    }

    match PresetManager::search(name).as_slice() {
        [index] => PresetManager::get_by_index(*index).map_err(|e| e.to_string()),
        [] => Err(format!(
            "Preset '{}' not found (available: {})",
            name,
            PresetManager::list_names().join(", ")
        )),
        matches => Err(format!(
            "Preset '{}' is ambiguous ({} presets match)",
            name,
            matches.len()
        )),
    }
}

/// Reads a system document, or plain rule notation when the text is not one.
fn source_from_text(text: &str, config: &Config) -> Result<Source, String> {
    match SystemLoader::load_system_from_string(text) {
        Ok(system) => Ok(Source {
            seed: system.seed_or(&config.seed).to_string(),
            name: system.name,
            rules: system.rules,
        }),
        Err(e) => {
            let rules = decode(text);
            if rules.is_empty() {
                return Err(format!("No rules found in input: {}", e));
            }
            Ok(Source {
                name: "Custom".to_string(),
                seed: config.seed.clone(),
                rules,
            })
        }
    }
}

/// Ticks the animation up to `depth` and returns the last frame.
fn run(source: &Source, config: &Config, depth: usize, debug: bool) -> Result<Frame, String> {
    let mut animation =
        Animation::with_seed(config.clone(), source.rules.clone(), source.seed.clone());
    let mut last = None;

    for _ in 0..depth {
        match animation.tick() {
            Tick::Frame(frame) => {
                if debug {
                    eprintln!(
                        "Depth: {}, Symbols: {}, Segments: {}",
                        frame.depth,
                        frame.program.len(),
                        frame.segments.len()
                    );
                }
                last = Some(frame);
            }
            Tick::Halt(halt) => {
                warn!(
                    depth = animation.depth(),
                    reason = %halt,
                    "Stopped before the requested depth"
                );
                return Err(format!(
                    "'{}' halted at depth {}: {}",
                    source.name,
                    animation.depth(),
                    halt
                ))
            }
        }
    }

    // Depth 0 draws the seed itself.
    Ok(last.unwrap_or_else(|| {
        let segments = config.turtle().interpret(&source.seed);
        Frame {
            depth: 0,
            program: source.seed.clone(),
            bounds: lsys::bounds(&segments, config.margin),
            segments,
        }
    }))
}

fn print_analysis(source: &Source, config: &Config, depth: usize) {
    let analysis = analyze(&source.seed, &source.rules, depth, config.growth_limit);

    eprintln!("System: {} (seed '{}')", source.name, source.seed);
    eprintln!("Live: {}", analysis.live);
    for report in &analysis.rules {
        let step_matches = report
            .step_matches
            .map_or_else(|| "limit exceeded".to_string(), |n| n.to_string());
        eprintln!(
            "  {}  [seed: {}, after one step: {}]",
            report.rule, report.seed_matches, step_matches
        );
    }
    match analysis.growth {
        Growth::Growing => eprintln!("Growth: still growing at depth {}", depth),
        Growth::FixedPoint { depth } => eprintln!("Growth: fixed point at depth {}", depth),
        Growth::LimitExceeded { depth } => {
            eprintln!("Growth: limit exceeded at depth {}", depth)
        }
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str) -> Source {
        source_from_text(text, &Config::default()).unwrap()
    }

    #[test]
    fn test_source_from_document_uses_its_seed() {
        let source = source("name: Spiral\nseed: fx\nrules:\n  x → +fx");
        assert_eq!(source.name, "Spiral");
        assert_eq!(source.seed, "fx");
    }

    #[test]
    fn test_source_from_notation_uses_config_seed() {
        let source = source("f → f+f\nnot a rule");
        assert_eq!(source.name, "Custom");
        assert_eq!(source.seed, "f");
        assert_eq!(source.rules.len(), 1);
    }

    #[test]
    fn test_source_without_rules_fails() {
        assert!(source_from_text("nothing", &Config::default()).is_err());
    }

    #[test]
    fn test_run_to_depth() {
        let frame = run(&source("f → f+f"), &Config::default(), 3, false).unwrap();
        assert_eq!(frame.depth, 3);
        assert_eq!(frame.segments.len(), 8);
    }

    #[test]
    fn test_run_depth_zero_draws_seed() {
        let frame = run(&source("f → f+f"), &Config::default(), 0, false).unwrap();
        assert_eq!(frame.program, "f");
        assert_eq!(frame.segments.len(), 1);
    }

    #[test]
    fn test_run_reports_halt() {
        let config = Config {
            segment_cap: 4,
            ..Config::default()
        };
        let error = run(&source("f → ff"), &config, 6, false).unwrap_err();
        assert!(error.contains("halted at depth 3"));
        assert!(error.contains("too many segments (8 > 4)"));
    }

    #[test]
    fn test_render_json_frame() {
        let source = source("f → f+f");
        let config = Config::default();
        let frame = run(&source, &config, 1, false).unwrap();

        let json = render(Format::Json, &frame, &source, &config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["depth"], 1);
        assert_eq!(value["program"], "f+f");
    }

    #[test]
    fn test_find_preset_by_name_or_unique_part() {
        assert_eq!(find_preset("hextooth").unwrap().name, "Hextooth");
        assert_eq!(find_preset("war bird").unwrap().name, "Romulan war bird");
    }

    #[test]
    fn test_find_preset_failures() {
        assert!(find_preset("nonexistent").unwrap_err().contains("not found"));
        assert!(find_preset("o").unwrap_err().contains("ambiguous"));
    }

    #[test]
    fn test_render_lsys_document_loads_back() {
        let source = source("f → gfg\ng → +f");
        let config = Config::default();
        let frame = run(&source, &config, 1, false).unwrap();

        let document = render(Format::Lsys, &frame, &source, &config).unwrap();
        let system = SystemLoader::load_system_from_string(&document).unwrap();
        assert_eq!(system.name, "Custom");
        assert_eq!(system.seed.as_deref(), Some("f"));
        assert_eq!(system.rules, source.rules);
    }
}
