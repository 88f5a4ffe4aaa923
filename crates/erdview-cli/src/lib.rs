//! CLI logic for the erdview tool.
//!
//! Renders an `erDiagram` description file to SVG or PNG, optionally logging
//! a selection or filter preview along the way.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;

use erdview::{
    DiagramBuilder, ErdViewError,
    export::{DirectorySink, ExportFormat, ExportPipeline, RasterOptions, default_filename},
    scene::{EntityId, Scene, ShapeId},
    selection::ClickTarget,
    view::ViewEvent,
};

/// Run the erdview CLI application
///
/// Reads the input description, renders it, and writes the export. Returns
/// the path of the written file.
///
/// # Errors
///
/// Returns `ErdViewError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parse errors in the description
/// - Export errors
pub fn run(args: &Args) -> Result<PathBuf, ErdViewError> {
    info!(input_path = args.input.as_str(); "Processing diagram");

    let app_config = config::load_config(args.config.as_ref())?;
    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let scene = builder.render(&source)?;

    if args.select.is_some() || args.query.is_some() {
        preview(&builder, &scene, args)?;
    }

    let (directory, stem, format) = output_target(args);

    let mut raster = RasterOptions::from_config(builder.config()).map_err(ErdViewError::Config)?;
    if let Some(scale) = args.scale {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ErdViewError::Config(format!(
                "scale must be a positive number, got {scale}"
            )));
        }
        raster = raster.with_scale(scale);
    }

    let path = ExportPipeline::new(raster).export(
        &scene,
        &stem,
        format,
        &DirectorySink::new(directory),
    )?;

    info!(output_file = path.display().to_string(), format = format.extension(); "Diagram exported successfully");

    Ok(path)
}

/// Resolves the output directory, file stem and format from the arguments.
fn output_target(args: &Args) -> (PathBuf, String, ExportFormat) {
    let output = args.output.as_deref().map(Path::new);

    let format = args
        .format
        .or_else(|| {
            output
                .and_then(Path::extension)
                .and_then(|ext| ext.to_str())
                .and_then(|ext| ext.parse().ok())
        })
        .unwrap_or_default();

    match output {
        Some(path) => {
            let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let stem = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| default_name(args));
            (directory, stem, format)
        }
        None => (PathBuf::new(), default_name(args), format),
    }
}

fn default_name(args: &Args) -> String {
    let name = args.name.clone().unwrap_or_else(|| {
        Path::new(&args.input)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    default_filename(&name, &args.diagram_version)
}

/// Logs what the viewer would show for `--select` and `--query`.
fn preview(builder: &DiagramBuilder, scene: &Scene, args: &Args) -> Result<(), ErdViewError> {
    let mut view = builder.view(scene.clone())?;

    if let Some(id) = &args.select {
        let shape = if scene.entity(&EntityId::new(id.as_str())).is_some() {
            ShapeId::entity(id.as_str())
        } else {
            ShapeId::relation(id.as_str())
        };
        if view.handle(ViewEvent::Click(ClickTarget::Shape(shape))) {
            let styles = view.styles();
            let highlighted: Vec<String> = styles.highlighted().map(ToString::to_string).collect();
            info!(selected = id.as_str(), highlighted:? = highlighted; "Selection preview");
        } else {
            info!(selected = id.as_str(); "Nothing to select with this id");
        }
    }

    if let Some(query) = &args.query {
        view.handle(ViewEvent::SetQuery(query.clone()));
        let visible = view.visibility();
        info!(
            query = query.as_str(),
            entities = visible.visible_entity_count(),
            relations = visible.visible_relation_count();
            "Filter preview"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str) -> Args {
        Args {
            input: input.to_string(),
            output: None,
            format: None,
            scale: None,
            name: None,
            diagram_version: "1".to_string(),
            select: None,
            query: None,
            config: None,
            log_level: "off".to_string(),
        }
    }

    #[test]
    fn test_output_target_defaults() {
        let (directory, stem, format) = output_target(&args("schemas/shop.erd"));
        assert_eq!(directory, PathBuf::new());
        assert_eq!(stem, "shop-v1");
        assert_eq!(format, ExportFormat::Svg);
    }

    #[test]
    fn test_output_target_from_output_path() {
        let mut args = args("shop.erd");
        args.output = Some("out/diagram.png".to_string());
        let (directory, stem, format) = output_target(&args);
        assert_eq!(directory, PathBuf::from("out"));
        assert_eq!(stem, "diagram");
        assert_eq!(format, ExportFormat::Png);

        args.format = Some(ExportFormat::Svg);
        assert_eq!(output_target(&args).2, ExportFormat::Svg);
    }

    #[test]
    fn test_output_target_named() {
        let mut args = args("shop.erd");
        args.name = Some("Counseling Center".to_string());
        args.diagram_version = "7".to_string();
        assert_eq!(output_target(&args).1, "Counseling-Center-v7");
    }
}
