use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "memefit", version)]
struct Cli {
    /// Log fitting and fallback decisions to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a caption onto a background and save it as PNG.
    Render(RenderArgs),
    /// List fonts or backgrounds available in the configured folders.
    List(ListArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Generator config JSON (canvas, text region, folders).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render settings JSON; flags below override its fields.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Caption text; `\n` sequences become line breaks.
    #[arg(long)]
    text: Option<String>,

    /// Background image (raster or SVG).
    #[arg(long)]
    bg: Option<PathBuf>,

    /// Font file, relative to the config's font folder unless absolute.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Text color as `#RRGGBB`.
    #[arg(long)]
    color: Option<String>,

    /// Maximum font size in pixels.
    #[arg(long)]
    size: Option<u32>,

    /// Outline radius in pixels.
    #[arg(long)]
    outline_width: Option<u32>,

    /// Disable the black outline.
    #[arg(long)]
    no_outline: bool,

    /// Background fitting policy.
    #[arg(long, value_enum)]
    resize: Option<ResizeChoice>,

    /// Output PNG path (default: `<output_folder>/<unix seconds>.png`).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also write the clipboard DIB payload here.
    #[arg(long)]
    dib: Option<PathBuf>,

    /// Print the render report as JSON on stdout.
    #[arg(long)]
    report: bool,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Generator config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// What to list.
    #[arg(value_enum, default_value_t = ListKind::Fonts)]
    kind: ListKind,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ResizeChoice {
    Stretch,
    Contain,
    Cover,
}

impl From<ResizeChoice> for memefit::ResizeMode {
    fn from(c: ResizeChoice) -> Self {
        match c {
            ResizeChoice::Stretch => Self::Stretch,
            ResizeChoice::Contain => Self::Contain,
            ResizeChoice::Cover => Self::Cover,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ListKind {
    Fonts,
    Backgrounds,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::List(args) => cmd_list(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<memefit::GeneratorConfig> {
    match path {
        Some(p) => Ok(memefit::GeneratorConfig::from_path(p)?),
        None => Ok(memefit::GeneratorConfig::default()),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;

    let mut settings = match &args.settings {
        Some(p) => memefit::RenderSettings::from_path(p)?,
        None => memefit::RenderSettings::default(),
    };
    if let Some(text) = args.text {
        settings.text = text.replace("\\n", "\n");
    }
    if let Some(bg) = args.bg {
        settings.bg_path = Some(bg);
    }
    if let Some(font) = args.font {
        settings.font_file = Some(font);
    }
    if let Some(color) = &args.color {
        settings.text_color =
            memefit::Rgb8::from_hex(color).with_context(|| format!("parse --color '{color}'"))?;
    }
    if let Some(size) = args.size {
        settings.font_size = size;
    }
    if let Some(w) = args.outline_width {
        settings.outline_width = w;
    }
    if args.no_outline {
        settings.use_outline = false;
    }
    if let Some(mode) = args.resize {
        settings.resize_mode = mode.into();
    }

    let output_folder = config.output_folder.clone();
    let compositor = memefit::Compositor::new(config);
    let rendered = compositor.render(&settings);

    let out = match args.out {
        Some(p) => p,
        None => memefit::export::output_path(memefit::resources::ensure_dir(&output_folder)?),
    };
    memefit::export::save_png(&rendered.image, &out)?;

    if let Some(dib_path) = &args.dib {
        let dib = memefit::export::encode_dib(&rendered.image)?;
        std::fs::write(dib_path, dib)
            .with_context(|| format!("write dib '{}'", dib_path.display()))?;
    }

    if args.report {
        println!("{}", serde_json::to_string(&rendered.report)?);
    } else {
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let names = match args.kind {
        ListKind::Fonts => {
            memefit::resources::list_files(&config.font_folder, memefit::resources::FONT_EXTENSIONS)
        }
        ListKind::Backgrounds => {
            memefit::resources::list_files(&config.bg_folder, memefit::resources::IMAGE_EXTENSIONS)
        }
    };
    for name in names {
        println!("{name}");
    }
    Ok(())
}
