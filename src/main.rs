use std::{
    fs::{self, File},
    io::BufWriter,
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use log::{info, warn};
use xgcode::{
    preview::{capture, ImageSource},
    BoxError, Encoder, Error, Layout, PreviewSource, PreviewSpec, PrintParams,
    PREVIEW, THUMBNAIL,
};

//
// cargo run -- part.gcode -o part.gx --image part.png --print-time 3600 \
//     --filament 4.2 --shells 2 --speed 60 --bed-temp 60 --extruder-temp 210
//

#[derive(Parser, Debug)]
#[command(name = "xgcode")]
#[command(version, about = "Pack G-code and preview images into an xgcode container")]
struct Cli {
    /// G-code file to embed
    gcode: PathBuf,

    /// Container file to write
    #[arg(short, long, env = "XGCODE_OUTPUT")]
    output: PathBuf,

    /// Picture scaled into both previews
    #[arg(long, env = "XGCODE_IMAGE", conflicts_with_all = ["thumbnail", "preview"])]
    image: Option<PathBuf>,

    /// Ready made 80x60 BMP thumbnail
    #[arg(long, env = "XGCODE_THUMBNAIL")]
    thumbnail: Option<PathBuf>,

    /// Ready made 320x320 PNG preview
    #[arg(long, env = "XGCODE_PREVIEW")]
    preview: Option<PathBuf>,

    /// Estimated print time in seconds
    #[arg(long, env = "XGCODE_PRINT_TIME")]
    print_time: u64,

    /// Filament use in metres, once per extruder
    #[arg(long, env = "XGCODE_FILAMENT", required = true, value_delimiter = ',')]
    filament: Vec<f64>,

    #[arg(long, env = "XGCODE_SHELLS", default_value_t = 0)]
    shells: u32,

    /// Print speed in mm/s
    #[arg(long, env = "XGCODE_SPEED", default_value_t = 0)]
    speed: u32,

    #[arg(long, env = "XGCODE_BED_TEMP", default_value_t = 0, allow_negative_numbers = true)]
    bed_temp: i32,

    #[arg(long, env = "XGCODE_EXTRUDER_TEMP", allow_negative_numbers = true)]
    extruder_temp: i32,

    /// Defaults to the first extruder's temperature
    #[arg(long, env = "XGCODE_EXTRUDER2_TEMP", allow_negative_numbers = true)]
    extruder2_temp: Option<i32>,

    /// Write the 58 byte header with the extra reserved fields
    #[arg(long, env = "XGCODE_PADDED")]
    padded: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("xgcode: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), BoxError> {
    let mut params = PrintParams::new(cli.print_time, 0.0)
        .filament_lengths(&cli.filament)
        .shell_count(cli.shells)
        .print_speed(cli.speed)
        .bed_temperature(cli.bed_temp)
        .extruder_temperature(cli.extruder_temp);
    if let Some(temperature) = cli.extruder2_temp {
        params = params.extruder2_temperature(temperature);
    }

    let layout = if cli.padded {
        Layout::Padded
    } else {
        Layout::Compact
    };
    let encoder = Encoder::new().layout(layout);

    // All inputs are read before the output is created; the output path
    // may name one of them.
    let gcode = fs::read(&cli.gcode).map_err(|err| Error::PayloadGeneration(err.into()))?;
    let mut previews = previews(cli);
    let thumbnail = capture(previews.as_mut(), THUMBNAIL);
    let preview = capture(previews.as_mut(), PREVIEW);

    let mut sink = BufWriter::new(File::create(&cli.output)?);
    if let Err(err) = encoder.encode(
        &mut sink,
        &gcode,
        thumbnail.as_bytes(),
        preview.as_bytes(),
        &params,
    ) {
        drop(sink);
        if let Err(err) = fs::remove_file(&cli.output) {
            warn!("could not remove {}: {}", cli.output.display(), err);
        }
        return Err(err.into());
    }

    info!("{} written", cli.output.display());
    Ok(())
}

fn previews(cli: &Cli) -> Box<dyn PreviewSource> {
    if let Some(path) = &cli.image {
        match ImageSource::open(path) {
            Ok(source) => return Box::new(source),
            Err(err) => {
                warn!("cannot open {}: {}", path.display(), err);
                return Box::new(|_: PreviewSpec| -> Result<Vec<u8>, BoxError> { Ok(Vec::new()) });
            }
        }
    }

    let thumbnail = cli.thumbnail.clone();
    let preview = cli.preview.clone();
    Box::new(move |spec: PreviewSpec| -> Result<Vec<u8>, BoxError> {
        let path = if spec == THUMBNAIL {
            &thumbnail
        } else {
            &preview
        };
        match path {
            Some(path) => Ok(fs::read(path)?),
            None => Ok(Vec::new()),
        }
    })
}
