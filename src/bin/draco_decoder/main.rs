//! draco-decoder - decode a Draco stream and save it as PLY or OBJ.
//!
//! In split mode the input file holds the structural data and the attribute
//! payloads come from sibling files: `<stem>_position<ext>` and
//! `<stem>_<name><ext>`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

use draco::compression::{Decoder, EncodedGeometryType};
use draco::core::{DecoderBuffer, DecoderOptions, FORMAT_OUTPUT_KEY, SPLIT_ATTR_KEY, TO_GENERIC_KEY};
use draco::geometry::{Mesh, PointCloud};
use draco::io::{obj, ply, InputFile};

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "DRACO_LOG";

/// Option under which the output path is passed to exporters.
const OUTPUT_KEY: &str = "output";

#[derive(Parser, Debug)]
#[command(
    name = "draco-decoder",
    version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("DRACO_BUILD_DATE"), " ", env!("DRACO_BUILD_TIME"), ")"),
    about = "Decode a Draco file into PLY or OBJ"
)]
struct Args {
    /// Input file
    #[arg(short, long)]
    input: PathBuf,
    /// Output file, .ply or .obj (defaults to <input>.ply)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Load the position and the named attribute from separate files
    #[arg(long = "split-attr", alias = "split_attr", value_name = "NAME")]
    split_attr: Option<String>,
    /// Print the result as JSON
    #[arg(long = "format-output", alias = "format_output")]
    format_output: bool,
    /// Write the first generic attribute as property `generic`
    #[arg(long = "to-generic", alias = "to_generic")]
    to_generic: bool,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Ply,
    Obj,
}

impl OutputFormat {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        match path.extension().map(|ext| ext.to_ascii_lowercase()) {
            Some(ext) if ext == "ply" => Ok(Self::Ply),
            Some(ext) if ext == "obj" => Ok(Self::Obj),
            _ => bail!("Invalid extension of the output file {}. Use either .ply or .obj", path.display()),
        }
    }
}

/// Decoded geometry.
enum Geometry {
    Mesh(Mesh),
    PointCloud(PointCloud),
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let output = args.output.clone().unwrap_or_else(|| {
        let mut name = args.input.clone().into_os_string();
        name.push(".ply");
        PathBuf::from(name)
    });

    let result = run(&args, &output);
    if args.format_output {
        let mut report = serde_json::json!({ "file": output.display().to_string() });
        if result.is_err() {
            report["err"] = serde_json::Value::from("decode");
        }
        println!("{report}");
    }
    match result {
        Ok(ms) => {
            if !args.format_output {
                println!("Decoded geometry saved to {} ({ms} ms to decode)", output.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to decode the input file: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);
    let subscriber = tracing_subscriber::registry().with(fmt_layer);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
}

/// Decode and export; returns the decode time in milliseconds.
#[tracing::instrument(skip_all, fields(input = %args.input.display()))]
fn run(args: &Args, output: &Path) -> anyhow::Result<u128> {
    let format = OutputFormat::from_path(output)?;

    let input = InputFile::open(&args.input).with_context(|| format!("Failed opening {}", args.input.display()))?;
    if input.is_empty() {
        bail!("Empty input file.");
    }

    let mut decoder = Decoder::new();
    let options = decoder.options_mut();
    options.set_global_bool(SPLIT_ATTR_KEY, args.split_attr.is_some());
    options.set_global_string(OUTPUT_KEY, output.display().to_string());
    options.set_global_bool(FORMAT_OUTPUT_KEY, args.format_output);
    options.set_global_bool(TO_GENERIC_KEY, args.to_generic);

    let start = Instant::now();
    let geometry = decode(&mut decoder, args, &input)?;
    let elapsed = start.elapsed().as_millis();

    let pc: &PointCloud = match &geometry {
        Geometry::Mesh(mesh) => mesh.as_ref(),
        Geometry::PointCloud(pc) => pc,
    };
    if let Some((min, max)) = pc.compute_bounds() {
        tracing::debug!(points = pc.num_points(), ?min, ?max, "decoded");
    }

    export(&geometry, format, output, decoder.options())?;
    Ok(elapsed)
}

fn decode(decoder: &mut Decoder, args: &Args, input: &[u8]) -> anyhow::Result<Geometry> {
    let mut buffer = DecoderBuffer::new(input);
    let geometry_type = Decoder::encoded_geometry_type(&buffer)?;
    tracing::info!(%geometry_type, "decoding");

    match (geometry_type, &args.split_attr) {
        (EncodedGeometryType::TriangularMesh, Some(name)) => {
            let position = InputFile::open(sibling_path(&args.input, "position"))
                .context("Load position buffer failed")?;
            let attribute = InputFile::open(sibling_path(&args.input, name))
                .context("Load attr buffer failed")?;

            let mut mesh = decoder.decode_mesh_from_buffer_attr(&mut buffer, "base")?;
            decoder.decode_buffer_attr_to_geometry(&mut DecoderBuffer::new(&position), "position", &mut mesh)?;
            decoder.decode_buffer_attr_to_geometry(&mut DecoderBuffer::new(&attribute), name, &mut mesh)?;
            Ok(Geometry::Mesh(mesh))
        }
        (EncodedGeometryType::TriangularMesh, None) => {
            Ok(Geometry::Mesh(decoder.decode_mesh_from_buffer(&mut buffer)?))
        }
        (EncodedGeometryType::PointCloud, _) => {
            Ok(Geometry::PointCloud(decoder.decode_point_cloud_from_buffer(&mut buffer)?))
        }
        (other, _) => bail!("Unsupported geometry type {other}"),
    }
}

fn export(geometry: &Geometry, format: OutputFormat, output: &Path, options: &DecoderOptions) -> anyhow::Result<()> {
    match (geometry, format) {
        (Geometry::Mesh(mesh), OutputFormat::Ply) => {
            ply::write_mesh_file(mesh, output, options).context("Failed to store the decoded mesh as PLY")
        }
        (Geometry::PointCloud(pc), OutputFormat::Ply) => ply::write_point_cloud_file(pc, output, options)
            .context("Failed to store the decoded point cloud as PLY"),
        (Geometry::Mesh(mesh), OutputFormat::Obj) => {
            obj::write_mesh_file(mesh, output).context("Failed to store the decoded mesh as OBJ")
        }
        (Geometry::PointCloud(pc), OutputFormat::Obj) => {
            obj::write_point_cloud_file(pc, output).context("Failed to store the decoded point cloud as OBJ")
        }
    }
}

/// `dir/model.drc` + `color` -> `dir/model_color.drc`.
fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_path() {
        assert_eq!(sibling_path(Path::new("dir/model.drc"), "position"), PathBuf::from("dir/model_position.drc"));
        assert_eq!(sibling_path(Path::new("model"), "color"), PathBuf::from("model_color"));
    }

    #[test]
    fn test_version_carries_build_stamp() {
        use clap::CommandFactory;
        let version = Args::command().get_version().unwrap_or_default().to_string();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version.contains(" (built "));
        assert!(!env!("DRACO_BUILD_DATE").is_empty());
        assert!(!env!("DRACO_BUILD_TIME").is_empty());
    }

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::from_path(Path::new("a.PLY")).unwrap(), OutputFormat::Ply);
        assert_eq!(OutputFormat::from_path(Path::new("dir/a.obj")).unwrap(), OutputFormat::Obj);
        assert!(OutputFormat::from_path(Path::new("a.stl")).is_err());
        assert!(OutputFormat::from_path(Path::new("ply")).is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from(["draco-decoder", "-i", "a.drc", "--split-attr", "color", "-vv"]).unwrap();
        assert_eq!(args.split_attr.as_deref(), Some("color"));
        assert_eq!(args.verbose, 2);
        assert!(args.output.is_none());
        assert!(Args::try_parse_from(["draco-decoder"]).is_err());
    }
}
