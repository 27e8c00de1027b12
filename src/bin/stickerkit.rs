use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "stickerkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten a scene document and write it as PNG or JPEG.
    Export(ExportArgs),
    /// Print the canvas and layer list of a scene document.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input scene document (JSON).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = FormatChoice::Png)]
    format: FormatChoice,

    /// JPEG quality; defaults to the configured value.
    #[arg(long)]
    quality: Option<u8>,

    /// Editor configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output width; scales the canvas. Requires `--height`.
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Output height; scales the canvas. Requires `--width`.
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Directory of extra `.ttf`/`.otf`/`.ttc` fonts.
    #[arg(long)]
    fonts: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input scene document (JSON).
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn read_document(path: &Path) -> anyhow::Result<stickerkit::Snapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open scene document '{}'", path.display()))?;
    let doc = stickerkit::Snapshot::from_json(&text)
        .with_context(|| format!("parse scene document '{}'", path.display()))?;
    Ok(doc)
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    let config = match &args.config {
        Some(p) => stickerkit::EditorConfig::from_path(p)?,
        None => stickerkit::EditorConfig::default(),
    }
    .with_env_overrides();

    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let loader = stickerkit::ThreadedLoader::new(stickerkit::SourceResolver::with_root(assets_root));
    let jpeg_quality = config.jpeg_quality;
    let mut session = stickerkit::EditorSession::create(config, Box::new(loader))?;
    if let Some(dir) = &args.fonts {
        session.load_fonts_from_dir(dir);
    }
    session.load_document(&doc)?;
    session.settle();

    let format = match args.format {
        FormatChoice::Png => stickerkit::ExportFormat::Png,
        FormatChoice::Jpeg => stickerkit::ExportFormat::Jpeg {
            quality: args.quality.unwrap_or(jpeg_quality),
        },
    };
    let bytes = match (args.width, args.height) {
        (Some(w), Some(h)) => session.render_scaled(w, h, false)?.encode(format)?,
        _ => session.export(format)?.bytes,
    };
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} bytes)", args.out.display(), bytes.len());
    if let Some(status) = session.status() {
        eprintln!("status: {}", status.message);
    }
    session.dispose();
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    let canvas = doc.canvas();
    println!("canvas {}x{}", canvas.width, canvas.height);
    println!("background {}", doc.background_color());
    if let Some(src) = doc.background_image() {
        println!("background image {}", describe_source(src));
    }
    println!("layers {}", doc.layers().len());
    for layer in doc.layers() {
        let p = &layer.placement;
        let extra = match &layer.content {
            stickerkit::LayerContent::Image(img) | stickerkit::LayerContent::Drawing(img) => {
                describe_source(&img.source)
            }
            stickerkit::LayerContent::Text(t) => format!("{:?} {}px", t.text, t.font_size),
            stickerkit::LayerContent::Rect { fill }
            | stickerkit::LayerContent::Circle { fill }
            | stickerkit::LayerContent::Star { fill } => fill.to_string(),
        };
        println!(
            "  {} {} at ({:.1}, {:.1}) {:.1}x{:.1} rot={:.3} opacity={:.2} {}",
            layer.id,
            layer.kind_name(),
            p.x,
            p.y,
            p.width,
            p.height,
            p.rotation,
            layer.opacity,
            extra
        );
    }
    if doc.has_paint() {
        println!("paint strokes present");
    }
    Ok(())
}

fn describe_source(src: &stickerkit::ImageSource) -> String {
    match src {
        stickerkit::ImageSource::Embedded { bytes } => format!("embedded {} bytes", bytes.len()),
        stickerkit::ImageSource::Linked { uri } => format!("linked {uri}"),
    }
}
