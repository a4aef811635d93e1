use mockup_canvas_core::{
    config::Config,
    editor::{CanvasEditor, ImageRole},
    image_processing::{ExportFormat, ImageProcessor, ImageSource},
    init,
    mapping::compute_fit_bounds,
    transform::Placement,
    ui,
};
use anyhow::{bail, Context, Result};
use arboard::{Clipboard, ImageData};
use clap::{Parser, Subcommand};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Override the canvas width defined in .env
    #[arg(long, global = true)]
    width: Option<u32>,

    /// Override the canvas height defined in .env
    #[arg(long, global = true)]
    height: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a logo onto a product photo without opening a window
    Compose {
        background: PathBuf,
        overlay: PathBuf,

        /// Placement JSON to apply (defaults to a centered logo)
        #[arg(short, long)]
        placement: Option<PathBuf>,

        /// Output image; the extension picks PNG or JPEG
        #[arg(short, long, default_value = "mockup.png")]
        output: PathBuf,

        /// Copy the result to clipboard
        #[arg(short, long, default_value_t = false)]
        copy: bool,

        /// Print the result as a base64 data URL instead of writing a file
        #[arg(long, default_value_t = false)]
        data_url: bool,
    },

    /// Print how a background is letterboxed into the canvas
    Fit { background: PathBuf },

    /// Open the editor window and save the placement
    Edit {
        background: PathBuf,
        overlay: PathBuf,

        /// Placement JSON to start from
        #[arg(short, long)]
        placement: Option<PathBuf>,

        /// Where to write the placement JSON (defaults to the last used path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save the flattened image
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Setup
    init();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = load_config(&args)?;

    match args.command {
        Command::Compose {
            background,
            overlay,
            placement,
            output,
            copy,
            data_url,
        } => compose(config, &background, &overlay, placement.as_deref(), &output, copy, data_url),
        Command::Fit { background } => fit(&config, &background),
        Command::Edit {
            background,
            overlay,
            placement,
            output,
            image,
        } => edit(config, background, overlay, placement.as_deref(), output, image),
    }
}

/// Loads config and applies the CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let config = Config::load().context("Failed to load configuration")?;
    if args.width.is_none() && args.height.is_none() {
        return Ok(config);
    }

    Config::builder()
        .with_canvas_size(
            args.width.unwrap_or(config.canvas_width),
            args.height.unwrap_or(config.canvas_height),
        )
        .with_max_upload_bytes(config.max_upload_bytes)
        .with_placeholder_font(config.placeholder_font.clone())
        .build()
        .context("Invalid canvas size")
}

fn read_placement(path: &Path) -> Result<Placement> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read placement {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid placement in {}", path.display()))
}

fn write_placement(path: &Path, placement: &Placement) -> Result<()> {
    let json = serde_json::to_string_pretty(placement)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Loads both images synchronously.
fn open_editor(config: Config, background: &Path, overlay: &Path) -> Result<CanvasEditor> {
    let mut editor = CanvasEditor::new(config).context("Failed to create canvas")?;
    editor.load_image(ImageRole::Background, ImageSource::Path(background.to_path_buf()));
    editor.load_image(ImageRole::Overlay, ImageSource::Path(overlay.to_path_buf()));
    editor
        .wait_for(ImageRole::Background)
        .with_context(|| format!("Failed to load background {}", background.display()))?;
    editor
        .wait_for(ImageRole::Overlay)
        .with_context(|| format!("Failed to load overlay {}", overlay.display()))?;
    Ok(editor)
}

fn compose(
    config: Config,
    background: &Path,
    overlay: &Path,
    placement: Option<&Path>,
    output: &Path,
    copy: bool,
    data_url: bool,
) -> Result<()> {
    let mut editor = open_editor(config, background, overlay)?;
    if let Some(path) = placement {
        editor.set_initial_transform(read_placement(path)?.to_relative_pose());
    }

    let format = ExportFormat::from_path(output);
    if data_url {
        println!("{}", editor.export_data_url(format)?);
    } else {
        let bytes = editor.export_still_image(format)?;
        fs::write(output, bytes).with_context(|| format!("Failed to write {}", output.display()))?;
        println!("Saved {}", output.display());
    }

    if let Some(placement) = editor.placement() {
        eprintln!("{}", serde_json::to_string_pretty(&placement)?);
    }

    // Copy to clipboard if requested
    if copy {
        let image = editor.export_rgba();
        let (width, height) = image.dimensions();
        let data = ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Owned(image.into_raw()),
        };
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_image(data) {
                    eprintln!("Warning: Failed to copy to clipboard: {}", e);
                } else {
                    println!("(Copied to clipboard)");
                }
            }
            Err(e) => eprintln!("Warning: Could not access clipboard: {}", e),
        }
    }

    Ok(())
}

fn fit(config: &Config, background: &Path) -> Result<()> {
    let source = ImageSource::Path(background.to_path_buf());
    let image = ImageProcessor::load(&source, config.max_upload_bytes)
        .with_context(|| format!("Failed to load {}", background.display()))?;
    let (canvas_width, canvas_height) = config.canvas_size();

    let Some(bounds) = compute_fit_bounds(
        image.width() as f64,
        image.height() as f64,
        canvas_width,
        canvas_height,
    ) else {
        bail!("Cannot fit a {}x{} image", image.width(), image.height());
    };

    println!("{}", serde_json::to_string_pretty(&bounds)?);
    Ok(())
}

fn edit(
    config: Config,
    background: PathBuf,
    overlay: PathBuf,
    placement: Option<&Path>,
    output: Option<PathBuf>,
    image: Option<PathBuf>,
) -> Result<()> {
    let mut editor = CanvasEditor::new(config).context("Failed to create canvas")?;
    if let Some(path) = placement {
        editor.set_initial_transform(read_placement(path)?.to_relative_pose());
    }
    editor.load_image(ImageRole::Background, ImageSource::Path(background));
    editor.load_image(ImageRole::Overlay, ImageSource::Path(overlay));

    let outcome = ui::run_editor_window(editor, ui::Settings::load())?;
    if !outcome.is_confirmed() {
        println!("Editing cancelled");
        return Ok(());
    }

    // Reload: the window may have changed preferences
    let mut settings = ui::Settings::load();

    match outcome.placement {
        Some(placement) => {
            let path = output
                .or_else(|| settings.last_placement_path.clone())
                .unwrap_or_else(|| PathBuf::from("placement.json"));
            write_placement(&path, &placement)?;
            println!("Saved placement to {}", path.display());

            settings.last_placement_path = Some(path);
            if let Err(e) = settings.save() {
                log::warn!("Failed to save settings: {}", e);
            }
        }
        None => eprintln!("Warning: No background loaded, placement not saved"),
    }

    if let (Some(path), Some(bytes)) = (image, outcome.image) {
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved {} ({})", path.display(), outcome.format.mime_type());
    }

    Ok(())
}
