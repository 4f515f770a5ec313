use crate::config::load_config;
use crate::engine::Fishbone;
use crate::ir::Diagram;
use crate::layout::FontMeasurer;
use crate::layout_dump::write_layout_dump;
use crate::render::render_svg;
use crate::render::write_output_svg;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fbr", version, about = "Fishbone diagram renderer in Rust")]
pub struct Args {
    /// Input diagram JSON file, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON5 file (theme/layout/viewport overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Render the seeded 6M demo diagram instead of reading input
    #[arg(long = "demo")]
    pub demo: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    /// Layout geometry dump
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let diagram = if args.demo {
        Diagram::demo(&config.theme.category_colors)
    } else {
        let input = read_input(args.input.as_deref())?;
        Diagram::from_json(&input)?
    };

    let measurer = Box::new(FontMeasurer::new(
        &config.theme.font_family,
        config.theme.font_size,
        &config.layout,
    ));
    let mut engine = Fishbone::with_measurer(diagram, config.layout.clone(), &config.theme, measurer);
    let Some(layout) = engine.layout_pass().cloned() else {
        return Err(anyhow::anyhow!("layout pass produced no geometry"));
    };

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, engine.diagram(), &config.theme, &config.layout, None);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&layout, engine.diagram(), &config.theme, &config.layout, None);
            write_png(&svg, &output, &config)?;
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &layout, engine.diagram())?,
            None => {
                let dump =
                    crate::layout_dump::LayoutDump::from_layout(&layout, engine.diagram());
                println!("{}", serde_json::to_string_pretty(&dump)?);
            }
        },
    }

    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &crate::config::Config) -> Result<()> {
    crate::render::write_output_png(svg, output, (config.render.width, config.render.height))
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &crate::config::Config) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the 'png' feature"
    ))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
