use image::{DynamicImage, ImageBuffer, Rgb};
use std::{env, fs::File, io::BufWriter, path::PathBuf};
use xgcode::{preview::ImageSource, BoxError, Encoder, Layout, PrintParams};

//
// cargo run --example write_sample [OUTPUT] [--padded]
//

const GCODE: &str = "\
G28
G1 Z0.2 F1200
G1 X60 Y60 E4.0 F1800
G1 X100 Y60 E6.0
G1 X100 Y100 E8.0
G1 X60 Y100 E10.0
G1 X60 Y60 E12.0
M104 S0
M140 S0
M84
";

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let padded = args.iter().any(|a| a == "--padded");
    let output = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("sample.gx"));

    // Square outline on a dark bed, roughly what a slicer snapshot looks like
    let picture = DynamicImage::ImageRgb8(ImageBuffer::from_fn(400, 400, |x, y| {
        let edge = (60..=340).contains(&x) && (60..=340).contains(&y);
        let inner = (80..=320).contains(&x) && (80..=320).contains(&y);
        if edge && !inner {
            Rgb([255, 140, 0])
        } else {
            Rgb([40, 40, 48])
        }
    }));

    let params = PrintParams::new(754, 0.0)
        .filament_lengths(&[0.412])
        .shell_count(2)
        .print_speed(60)
        .bed_temperature(60)
        .extruder_temperature(210);

    let layout = if padded {
        Layout::Padded
    } else {
        Layout::Compact
    };

    let mut payload = || -> Result<Vec<u8>, BoxError> { Ok(GCODE.as_bytes().to_vec()) };
    let mut previews = ImageSource::new(picture);

    let file = match File::create(&output) {
        Ok(file) => file,
        Err(err) => panic!("cannot create {}: {}", output.display(), err),
    };
    let mut sink = BufWriter::new(file);

    match Encoder::new()
        .layout(layout)
        .encode_with(&mut sink, &mut payload, &mut previews, &params)
    {
        Ok(()) => println!("wrote {}", output.display()),
        Err(err) => panic!("encode failed {:?}", err),
    }
}
