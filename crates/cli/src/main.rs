use anyhow::{anyhow, bail, Context};
use config::{Config, File};
use globe::{
    timed, Planet, PlanetConfig, PlanetRenderer, RenderConfig, Seed, TileLens,
};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process,
};
use structopt::StructOpt;
use strum::{Display, EnumString};

/// CLI for generating geodesic planets.
#[derive(Debug, StructOpt)]
#[structopt(name = "globe")]
struct Opt {
    /// Path to a config file that defines the planet to be generated.
    /// Supported formats: JSON, TOML. If neither this nor `--bin` is given,
    /// the default config is used.
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Path to an existing .bin planet file to load
    #[structopt(short, long)]
    bin: Option<PathBuf>,

    /// Override the seed from the config with a text seed. Text is always
    /// hashed into a number, even if it looks like one.
    #[structopt(short, long)]
    seed: Option<String>,

    /// Override the seed from the config with an exact integer seed
    #[structopt(long, conflicts_with = "seed")]
    int_seed: Option<u64>,

    /// Override the number of icosahedron subdivisions from the config
    #[structopt(long)]
    subdivisions: Option<u32>,

    /// If given, the generated planet will be saved to this directory. The
    /// exact files that appear in the directory are defined by the output
    /// formats. See `--output-formats` for more info
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// The format(s) to output the planet in. Supported formats:
    ///
    /// bin - Binary representation that can be reloaded by this CLI and
    ///   other tools later. Use this for persisting & sharing planets
    ///
    /// cfg - The full config object used for the planet, in TOML format
    ///
    /// json - JSON representation. Similar to the binary format, but slower
    ///   and much less compact
    ///
    /// stl - 3D rendering of the planet
    #[structopt(short = "f", long)]
    output_formats: Vec<OutputFormat>,

    /// The lens used to determine the color of each tile. Only relevant for
    /// consumers of rendered colors.
    #[structopt(long, default_value = "biome")]
    lens: TileLens,

    /// How far the highest tiles are lifted off the sphere in 3D output, as a
    /// fraction of the planet radius
    #[structopt(long, default_value = "0.05")]
    relief_scale: f64,

    /// The logging level to use during planet generation. See
    /// https://docs.rs/log/0.4.11/log/enum.LevelFilter.html for options
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

/// Different output formats.
#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    // If you change this, make sure to update the help text for
    // `--output-formats`!
    /// Export the planet in a serialized binary format, which can be
    /// deserialized later to recover the planet
    Bin,
    /// Export the planet's full config in a human-readable file
    Cfg,
    /// Export the planet in a serialized JSON format, which can be
    /// deserialized later to recover the planet. This is similar to the bin
    /// format, but is human readable at the cost of being slower and much
    /// less compact
    Json,
    /// Render the planet as a 3D STL
    Stl,
    /* If you change this, make sure to update the help text for
     * `--output-formats`! */
}

impl OutputFormat {
    fn file_ext(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::Cfg => "toml",
            Self::Json => "json",
            Self::Stl => "stl",
        }
    }
}

fn load_config(config_path: &Path) -> anyhow::Result<PlanetConfig> {
    // Load config
    let mut settings = Config::new();
    let config_path = config_path.to_str().ok_or_else(|| {
        anyhow!("invalid character in path {:?}", config_path)
    })?;
    settings
        .merge(File::with_name(config_path))
        .context("error reading config file")?;
    settings.try_into().context("error reading config")
}

/// Generate an output form of the planet in the given format.
fn gen_output(
    output_dir: &Path,
    output_format: OutputFormat,
    planet: &Planet,
    renderer: &PlanetRenderer,
) -> anyhow::Result<()> {
    fn generate_bytes(
        output_format: OutputFormat,
        planet: &Planet,
        renderer: &PlanetRenderer,
    ) -> anyhow::Result<Vec<u8>> {
        match output_format {
            // Serialize the entire planet via CBOR
            OutputFormat::Bin => planet.to_bin(),
            // Serialize just the planet config via toml
            OutputFormat::Cfg => Ok(toml::to_string_pretty(planet.config())
                .context("error serializing config")?
                .into_bytes()),
            // Serialize the entire planet via JSON
            OutputFormat::Json => Ok(planet.to_json()?.into_bytes()),
            // Render the planet in 3D
            OutputFormat::Stl => renderer.render_as_stl(planet),
        }
    }

    let output_file_path = output_dir
        .join("planet")
        .with_extension(output_format.file_ext());

    timed!(
        format!(
            "Generating {} output and writing to {:?}",
            output_format, &output_file_path
        ),
        log::Level::Info,
        {
            let bytes = generate_bytes(output_format, planet, renderer)?;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&output_file_path)
                .with_context(|| {
                    format!("error opening output file {:?}", &output_file_path)
                })?;
            file.write_all(&bytes).with_context(|| {
                format!("error writing to file {:?}", &output_file_path)
            })?;
        }
    );

    Ok(())
}

/// Run the CLI with some options
fn run(opt: Opt) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(opt.log_level).init()?;

    // Check this before doing any expensive generation
    if opt.output.is_some() && opt.output_formats.is_empty() {
        bail!("output dir was specified, but no output formats were given")
    }

    let planet = match &opt {
        Opt {
            bin: Some(input_path),
            config: None,
            seed: None,
            int_seed: None,
            subdivisions: None,
            ..
        } => {
            // Load existing planet from a file
            let file = OpenOptions::new()
                .read(true)
                .open(input_path)
                .with_context(|| {
                    format!("error opening planet file {:?}", input_path)
                })?;
            let planet = Planet::from_bin(file)?;
            info!("Loaded planet from {:?}", input_path);
            planet
        }
        Opt {
            bin: None,
            config: config_path,
            seed,
            int_seed,
            subdivisions,
            ..
        } => {
            // Load planet config and use it to generate a new planet
            let mut config = match config_path {
                Some(config_path) => load_config(config_path)?,
                None => PlanetConfig::default(),
            };
            if let Some(seed) = seed {
                config.seed = Seed::from(seed.as_str());
            }
            if let Some(seed) = int_seed {
                config.seed = Seed::Int(*seed);
            }
            if let Some(subdivisions) = subdivisions {
                config.subdivisions = *subdivisions;
            }
            Planet::generate(config)?
        }
        _ => bail!(
            "--bin (to load an existing planet) can't be combined with \
            --config, --seed, --int-seed or --subdivisions (to generate a new \
            planet)"
        ),
    };

    for (biome, count) in planet.biome_counts() {
        info!("{:>12}: {} tiles", biome, count);
    }

    // If an output dir was specified, write out output format(s) there
    if let Some(output_dir) = &opt.output {
        fs::create_dir_all(output_dir)?;

        let renderer = PlanetRenderer::new(RenderConfig {
            tile_lens: opt.lens,
            relief_scale: opt.relief_scale,
        })
        .context("invalid render config")?;
        for &output_format in &opt.output_formats {
            gen_output(output_dir, output_format, &planet, &renderer)?;
        }
    }

    Ok(())
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
