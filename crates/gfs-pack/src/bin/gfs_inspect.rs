//! Decodes a GFS file, prints its containers, re-encodes it and reports
//! whether the round trip is byte-identical.
//!
//! ```sh
//! gfs-inspect model.GFS [--little-endian] [--strict] [--config codec.toml] [--json]
//! RUST_LOG=gfs_pack=debug gfs-inspect model.GFS
//! ```

use std::process::ExitCode;

use gfs_pack::{CodecOptions, Endianness, GfsCodec, GfsFile, LengthPolicy, Payload};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str =
    "usage: gfs-inspect <file> [--little-endian] [--strict] [--config <toml>] [--json]";

struct Args {
    path: String,
    config: Option<String>,
    little_endian: bool,
    strict: bool,
    json: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut path = None;
    let mut config = None;
    let mut little_endian = false;
    let mut strict = false;
    let mut json = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--little-endian" => little_endian = true,
            "--strict" => strict = true,
            "--json" => json = true,
            "--config" => {
                config = Some(args.next().ok_or("--config needs a path")?);
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            _ if path.is_some() => return Err("more than one input file".to_string()),
            _ => path = Some(arg),
        }
    }
    Ok(Args {
        path: path.ok_or("missing input file")?,
        config,
        little_endian,
        strict,
        json,
    })
}

fn load_options(args: &Args) -> Result<CodecOptions, String> {
    let mut options = match &args.config {
        Some(path) => {
            let source = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
            CodecOptions::from_toml_str(&source).map_err(|e| format!("{path}: {e}"))?
        }
        None => CodecOptions::default(),
    };
    if args.little_endian {
        options.endianness = Endianness::Little;
    }
    if args.strict {
        options.length_policy = LengthPolicy::Strict;
    }
    Ok(options)
}

fn summary(payload: &Payload) -> String {
    match payload {
        Payload::Model(model) => format!("{} nodes", model.node_count()),
        Payload::Blob(bytes) => format!("{} opaque bytes", bytes.len()),
        Payload::Physics(physics) => format!(
            "{} bones, {} colliders, {} links",
            physics.bones.len(),
            physics.colliders.len(),
            physics.links.len()
        ),
        Payload::Materials(materials) => format!("{} materials", materials.materials.len()),
        Payload::Textures(textures) => format!("{} textures", textures.textures.len()),
        Payload::Animations(animations) => format!(
            "{} animations, {} blend animations",
            animations.animations.len(),
            animations.blend_animations.len()
        ),
        Payload::Empty | Payload::Terminal => String::new(),
    }
}

fn print_file(file: &GfsFile) {
    for (i, container) in file.containers.iter().enumerate() {
        println!(
            "#{i:<3} {:#010x} {:<10} v{} size {:#x} {}",
            container.payload.tag(),
            container.payload.kind(),
            container.version(),
            container.size,
            summary(&container.payload)
        );
        if let Some(tail) = &container.trailing {
            println!("     {} trailing bytes", tail.len());
        }
    }
    if let Some(tail) = &file.trailing {
        println!("{} bytes after the closing container", tail.len());
    }
}

fn run(args: &Args) -> Result<bool, String> {
    let options = load_options(args)?;
    let bytes = std::fs::read(&args.path).map_err(|e| format!("{}: {e}", args.path))?;
    let mut codec = GfsCodec::new(options);

    let mut file = codec
        .decode_file(&bytes)
        .map_err(|e| format!("decode failed: {e}"))?;
    if args.json {
        let json = serde_json::to_string_pretty(&file).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        print_file(&file);
    }

    let encoded = codec
        .encode_file(&mut file)
        .map_err(|e| format!("encode failed: {e}"))?;
    let identical = encoded == bytes;
    if identical {
        println!("round trip: identical ({} bytes)", bytes.len());
    } else {
        let first = encoded
            .iter()
            .zip(&bytes)
            .position(|(a, b)| a != b)
            .unwrap_or(encoded.len().min(bytes.len()));
        println!(
            "round trip: differs at offset {first:#x} ({} bytes in, {} bytes out)",
            bytes.len(),
            encoded.len()
        );
    }

    for diagnostic in codec.log.entries() {
        eprintln!("{}: {}", diagnostic.severity, diagnostic.message);
    }
    Ok(identical)
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
