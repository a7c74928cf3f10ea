//! Reading inputs from disk and writing generated code back out.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use sketch2code_canvas::{CanvasSnapshot, Color, DrawingSurface, Raster, Rasterizer, SurfaceProfile};
use sketch2code_codegen::document::{REACT_CSS_MODULE, full_html_document};
use sketch2code_core::config::Config;
use sketch2code_core::types::{DataUri, GenerationResult};

pub const REACT_COMPONENT_FILE: &str = "GeneratedComponent.jsx";

/// Accept either an inline `data:` URI or a path to an image file.
pub fn load_image(arg: &str) -> anyhow::Result<DataUri> {
    if arg.starts_with("data:") {
        return DataUri::parse(arg).context("invalid data URI");
    }
    let path = Path::new(arg);
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        anyhow::bail!("{} is not an image ({})", path.display(), mime.essence_str());
    }
    debug!(path = %path.display(), mime = %mime.essence_str(), bytes = bytes.len(), "Loaded image");
    Ok(DataUri::from_bytes(mime.essence_str(), &bytes))
}

/// Surface profile from the `canvas` config section.
pub fn surface_profile(config: &Config) -> anyhow::Result<SurfaceProfile> {
    let canvas = config.canvas();
    let background: Color = canvas
        .background
        .parse()
        .with_context(|| format!("canvas.background = {}", canvas.background))?;
    Ok(SurfaceProfile::standard()
        .with_size(canvas.width, canvas.height)
        .with_background(background))
}

pub fn rasterizer(config: &Config) -> anyhow::Result<Rasterizer> {
    match config.font_path() {
        Some(path) => Rasterizer::from_font_file(&path).context("loading canvas font"),
        None => Ok(Rasterizer::new()),
    }
}

/// Load a saved sketch and render it the way the canvas exports it.
pub fn render_sketch(config: &Config, path: &Path) -> anyhow::Result<Raster> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot = CanvasSnapshot::from_json(&json)?;
    let surface = DrawingSurface::from_snapshot(surface_profile(config)?, snapshot)
        .with_rasterizer(rasterizer(config)?);
    debug!(objects = surface.objects().len(), "Rendering sketch");
    Ok(surface.export_raster()?)
}

/// `sketch2code_<timestamp>_<id>` under the current directory.
pub fn default_output_dir() -> PathBuf {
    let ts = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let id = uuid::Uuid::new_v4().simple().to_string();
    PathBuf::from(format!("sketch2code_{ts}_{}", &id[..8]))
}

/// Write the page, its parts, and the React pair when present. Returns the
/// files written.
pub fn write_result(dir: &Path, result: &GenerationResult) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut files = vec![
        ("index.html", full_html_document(&result.html, &result.css)),
        ("fragment.html", result.html.clone()),
        ("styles.css", result.css.clone()),
    ];
    if !result.react_component.is_empty() {
        files.push((REACT_COMPONENT_FILE, result.react_component.clone()));
    }
    if !result.react_css.is_empty() {
        files.push((REACT_CSS_MODULE, result.react_css.clone()));
    }

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = dir.join(name);
        std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
