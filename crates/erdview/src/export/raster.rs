//! PNG rasterization through `usvg`, `resvg` and `tiny-skia`.

use log::debug;

use erdview_core::{color::Color, scene::Scene};

use super::{ExportError, vector::scene_markup};
use crate::config::{AppConfig, ExportConfig};

/// Raster export settings.
#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Device pixels per scene unit.
    pub scale: f32,
    /// Painted under the diagram; diagrams have no background of their own.
    pub background: Color,
    pub font_family: String,
    pub load_system_fonts: bool,
}

impl RasterOptions {
    /// Options from the export section with the configured background.
    ///
    /// # Errors
    ///
    /// Returns a message if the background color cannot be parsed.
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        let export: &ExportConfig = config.export();
        Ok(Self {
            scale: export.raster_scale(),
            background: config.style().background_color()?,
            font_family: export.font_family().to_string(),
            load_system_fonts: export.load_system_fonts(),
        })
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: Color::new("white").expect("white is a valid color"),
            font_family: "Arial".to_string(),
            load_system_fonts: true,
        }
    }
}

/// Pixel size of `scene` at `scale`, rounded up.
fn pixel_size(scene: &Scene, scale: f32) -> (u32, u32) {
    let width = (scene.width() * scale).ceil().max(1.0) as u32;
    let height = (scene.height() * scale).ceil().max(1.0) as u32;
    (width, height)
}

/// Renders `scene` to PNG bytes.
///
/// The bitmap is `ceil(width * scale)` by `ceil(height * scale)` pixels and
/// is filled with the background color before the diagram is drawn.
///
/// # Errors
///
/// Returns [`ExportError::SvgParse`] if the markup is not valid SVG,
/// [`ExportError::PixmapAlloc`] if the bitmap size is unusable, and
/// [`ExportError::PngEncode`] if encoding fails.
pub fn render_raster(scene: &Scene, options: &RasterOptions) -> Result<Vec<u8>, ExportError> {
    let markup = scene_markup(scene);

    let mut opt = usvg::Options::default();
    if options.load_system_fonts {
        opt.fontdb_mut().load_system_fonts();
    }
    opt.font_family = options.font_family.clone();

    let tree = usvg::Tree::from_str(&markup, &opt).map_err(|_| ExportError::SvgParse)?;

    let (width, height) = pixel_size(scene, options.scale);
    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(ExportError::PixmapAlloc)?;

    let [r, g, b, a] = options.background.to_rgba8();
    pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));

    // Fit the document onto the scene extent, whatever size it declares.
    let tree_size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        scene.width() * options.scale / tree_size.width(),
        scene.height() * options.scale / tree_size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    debug!(width, height, scale = options.scale; "Scene rasterized");
    pixmap.encode_png().map_err(|_| ExportError::PngEncode)
}

#[cfg(test)]
mod tests {
    use erdview_core::geometry::{Bounds, Size};

    use super::*;

    fn no_fonts() -> RasterOptions {
        RasterOptions {
            load_system_fonts: false,
            ..RasterOptions::default()
        }
    }

    #[test]
    fn test_pixel_size_rounds_up() {
        let scene = Scene::new(Size::new(100.5, 10.2), vec![], vec![]);
        assert_eq!(pixel_size(&scene, 1.0), (101, 11));
        assert_eq!(pixel_size(&scene, 2.0), (201, 21));
    }

    #[test]
    fn test_png_signature_and_background() {
        let scene = Scene::new(Size::new(40.0, 30.0), vec![], vec![]);
        let bytes = render_raster(&scene, &no_fonts()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));

        let pixmap = tiny_skia::Pixmap::decode_png(&bytes).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (80, 60));
        let corner = pixmap.pixel(0, 0).unwrap();
        assert_eq!(
            (corner.red(), corner.green(), corner.blue(), corner.alpha()),
            (255, 255, 255, 255)
        );
    }

    #[test]
    fn test_custom_background() {
        let scene = Scene::new(Size::new(10.0, 10.0), vec![], vec![]);
        let options = RasterOptions {
            background: Color::new("#ff0000").unwrap(),
            ..no_fonts()
        }
        .with_scale(1.0);
        let bytes = render_raster(&scene, &options).unwrap();

        let pixmap = tiny_skia::Pixmap::decode_png(&bytes).unwrap();
        let corner = pixmap.pixel(5, 5).unwrap();
        assert_eq!((corner.red(), corner.green(), corner.blue()), (255, 0, 0));
    }

    #[test]
    fn test_invalid_markup() {
        let scene = Scene::new(Size::new(10.0, 10.0), vec![], vec![]).with_document("not svg");
        let err = render_raster(&scene, &no_fonts()).unwrap_err();
        assert!(matches!(err, ExportError::SvgParse));
    }

    #[test]
    fn test_entity_is_drawn() {
        let scene = Scene::new(
            Size::new(50.0, 50.0),
            vec![erdview_core::scene::Entity::new(
                "a",
                "",
                Bounds::new(10.0, 10.0, 30.0, 30.0),
            )],
            vec![],
        );
        let bytes = render_raster(&scene, &no_fonts().with_scale(1.0)).unwrap();
        let pixmap = tiny_skia::Pixmap::decode_png(&bytes).unwrap();

        // stroke at the left edge of the box
        let edge = pixmap.pixel(10, 25).unwrap();
        assert_ne!((edge.red(), edge.green(), edge.blue()), (255, 255, 255));
    }
}
