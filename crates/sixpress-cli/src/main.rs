//! sixpress - Encode images as SIXEL graphics
//!
//! A command-line tool for converting images to SIXEL escape sequences.

use clap::{Args, Parser, Subcommand};
use image::imageops::FilterType;
use sixpress::{fit_within, sixel_encode, EncodeOptions};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sixpress")]
#[command(version)]
#[command(about = "Encode images as SIXEL graphics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an image to SIXEL format
    Encode {
        /// Input image file (PNG, JPEG, GIF, WebP)
        input: PathBuf,

        /// Output SIXEL file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Display an image as SIXEL in the terminal
    Show {
        /// Input image file (PNG, JPEG, GIF, WebP)
        input: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Maximum number of colors (2-256)
    #[arg(short, long, default_value = "256")]
    colors: u16,

    /// Bound the output width in pixels, preserving aspect ratio
    #[arg(long, default_value = "800")]
    max_width: u32,

    /// Bound the output height in pixels, preserving aspect ratio
    #[arg(long, default_value = "500")]
    max_height: u32,

    /// Run-length encode the output (smaller, renders identically)
    #[arg(long)]
    rle: bool,
}

fn render(input: &Path, args: &RenderArgs) -> Result<String, Box<dyn std::error::Error>> {
    let img = image::open(input)
        .map_err(|e| format!("Failed to open '{}': {}", input.display(), e))?;

    let (width, height) = (img.width(), img.height());
    let (fit_w, fit_h) = fit_within(width, height, args.max_width.max(1), args.max_height.max(1));
    let img = if (fit_w, fit_h) != (width, height) {
        img.resize_exact(fit_w, fit_h, FilterType::Lanczos3)
    } else {
        img
    };

    let rgba_img = img.to_rgba8();
    let (width, height) = rgba_img.dimensions();
    let pixels = rgba_img.into_raw();

    let opts = EncodeOptions {
        color_count: args.colors.clamp(2, 256),
        run_length_encoding: args.rle,
    };

    Ok(sixel_encode(&pixels, width as usize, height as usize, &opts)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            render: args,
        } => {
            let sixel = render(&input, &args)?;
            match output {
                Some(path) => {
                    fs::write(&path, &sixel)?;
                    eprintln!("Written {} bytes to '{}'", sixel.len(), path.display());
                }
                None => {
                    io::stdout().write_all(sixel.as_bytes())?;
                }
            }
        }

        Commands::Show {
            input,
            render: args,
        } => {
            let sixel = render(&input, &args)?;
            print!("{}", sixel);
        }
    }

    Ok(())
}
