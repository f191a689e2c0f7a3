use clap::{Parser, Subcommand};
use std::path::PathBuf;
use xtickr::config::{self, StickerConfig};
use xtickr::imaging::{CommandSegmenter, TextStyle, WebpEncoder};
use xtickr::output;
use xtickr::pipeline::{FontSource, Pipeline, RunParams};
use xtickr::types::{Anchor, AspectRatio, CropSelection, Stage};

/// Exit code for runs that stop at an input prompt.
const AWAITING_INPUT_EXIT: i32 = 2;

#[derive(Parser)]
#[command(name = "xtickr")]
#[command(about = "Turn a photo into a WhatsApp sticker")]
#[command(long_about = "\
Turn a photo into a WhatsApp sticker

Each run goes through five stages:

  1. Source       decode the photo (PNG or JPEG)
  2. Crop         --crop auto | x,y,w,h, locked to --aspect
  3. Background   external matting tool (rembg by default), or --keep-background
  4. Text         optional caption: size, color, opacity, position
  5. Export       512x512 WebP, re-encoded at falling quality until <= 100 KiB

Output: <out-dir>/xtickr_sticker_<8 hex chars>.webp

Defaults come from xtickr.toml in the working directory (or --config).
Run 'xtickr gen-config' to print a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./xtickr.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline on a photo and export a sticker
    Make(MakeArgs),
    /// Validate the effective config without running anything
    Check,
    /// Print a stock xtickr.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct MakeArgs {
    /// Photo to turn into a sticker
    input: Option<PathBuf>,

    /// Crop selection: 'auto' or x,y,width,height in source pixels
    #[arg(long)]
    crop: Option<CropSelection>,

    /// Aspect lock: 1:1, 16:9, 4:3, 2:3 or free
    #[arg(long)]
    aspect: Option<AspectRatio>,

    /// Skip background removal (adds an opaque alpha channel)
    #[arg(long, conflicts_with = "remove_background")]
    keep_background: bool,

    /// Remove the background even if the config disables it
    #[arg(long)]
    remove_background: bool,

    /// Caption to draw; blank means no text
    #[arg(long, default_value = "")]
    text: String,

    /// Caption size in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(10..=100))]
    text_size: Option<u32>,

    /// Caption color as #RRGGBB
    #[arg(long)]
    text_color: Option<String>,

    /// Caption opacity in percent
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    text_opacity: Option<u8>,

    /// Caption anchor
    #[arg(long, value_enum)]
    text_position: Option<Anchor>,

    /// Directory the sticker is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Write the final bitmap (before resizing) as PNG
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Write the bitmap after crop and background removal as PNG
    #[arg(long)]
    matte_preview: Option<PathBuf>,

    /// Render previews only; do not create the sticker
    #[arg(long)]
    no_export: bool,

    /// Print the exported sticker as JSON instead of the report
    #[arg(long)]
    json: bool,
}

impl MakeArgs {
    /// Combine flags with config defaults into one immutable run.
    fn to_run_params(&self, config: &StickerConfig) -> Result<RunParams, Box<dyn std::error::Error>> {
        let text = TextStyle::new(
            self.text.clone(),
            self.text_size.unwrap_or(config.text.size),
            self.text_color.as_deref().unwrap_or(&config.text.color),
            self.text_opacity.unwrap_or(config.text.opacity),
            self.text_position.unwrap_or(config.text.position),
        )?;

        let remove_background = if self.keep_background {
            false
        } else {
            self.remove_background || config.background.enabled
        };

        Ok(RunParams {
            input: self.input.clone(),
            crop: self.crop,
            aspect: self.aspect.unwrap_or(config.crop.aspect),
            remove_background,
            text,
            text_margin: config.text.margin,
            export_dir: (!self.no_export).then(|| self.out_dir.clone()),
            export: config.export.to_params(),
            matte_preview: self.matte_preview.clone(),
            preview: self.preview.clone(),
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Make(args) => {
            let cwd = std::env::current_dir()?;
            let config = config::load_config(cli.config.as_deref(), &cwd)?;
            let params = args.to_run_params(&config)?;

            let segmenter = CommandSegmenter::new(config.background.command.clone());
            let encoder = WebpEncoder::new(config.export.method);
            let font = FontSource::Chain {
                names: config.text.fonts.clone(),
                dirs: config.text.font_dirs.clone(),
            };
            let pipeline = Pipeline::new(&segmenter, &encoder, font);

            match pipeline.run(&params)? {
                Stage::AwaitingInput(prompt) => {
                    output::print_prompt(prompt);
                    std::process::exit(AWAITING_INPUT_EXIT);
                }
                Stage::Ready(run) if args.json => {
                    println!("{}", serde_json::to_string_pretty(&run.artifact)?);
                }
                Stage::Ready(run) => output::print_run(&run.events),
            }
        }
        Command::Check => {
            let cwd = std::env::current_dir()?;
            config::load_config(cli.config.as_deref(), &cwd)?;
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
