//! SVG serialization.

use svg::{node::Text as SvgText, node::element as svg_element};

use erdview_core::{geometry::Bounds, scene::Scene};

/// Declaration put in front of exported SVG documents.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const FILL: &str = "#ffffff";
const STROKE: &str = "#4a5568";
const TEXT: &str = "#1a202c";

/// Returns `markup` with an XML declaration in front.
///
/// A byte order mark is always dropped. Markup that already carries a
/// declaration after leading whitespace keeps it, with the whitespace
/// removed so the result starts with `<?xml`.
///
/// # Examples
///
/// ```
/// # use erdview::export::with_xml_declaration;
/// let doc = with_xml_declaration("<svg/>");
/// assert!(doc.starts_with("<?xml"));
/// assert_eq!(with_xml_declaration(&doc), doc);
/// ```
pub fn with_xml_declaration(markup: &str) -> String {
    let body = markup.strip_prefix('\u{feff}').unwrap_or(markup);
    let trimmed = body.trim_start();
    if trimmed.starts_with("<?xml") {
        trimmed.to_string()
    } else {
        format!("{XML_DECLARATION}\n{body}")
    }
}

/// Serializes `scene` as a standalone SVG document.
///
/// Uses the markup the adapter produced, or draws the scene geometry when
/// there is none. The output is the same for the same scene.
pub fn render_vector(scene: &Scene) -> String {
    match scene.document() {
        Some(document) => with_xml_declaration(document),
        None => with_xml_declaration(&synthesize(scene)),
    }
}

/// Markup for the scene, taken from the adapter when available.
pub(super) fn scene_markup(scene: &Scene) -> String {
    match scene.document() {
        Some(document) => document.to_string(),
        None => synthesize(scene),
    }
}

fn rectangle(bounds: Bounds) -> svg_element::Rectangle {
    svg_element::Rectangle::new()
        .set("x", bounds.min_x())
        .set("y", bounds.min_y())
        .set("width", bounds.width())
        .set("height", bounds.height())
}

/// Plain drawing of entity boxes and relation paths.
fn synthesize(scene: &Scene) -> String {
    let mut relations = svg_element::Group::new().set("class", "erd-relations");
    for relation in scene.relations() {
        let group = svg_element::Group::new()
            .set("class", "erd-relation")
            .set("data-id", relation.id().as_str());
        let group = if relation.path().len() >= 2 {
            let points = relation
                .path()
                .iter()
                .map(|point| format!("{},{}", point.x(), point.y()))
                .collect::<Vec<_>>()
                .join(" ");
            group.add(
                svg_element::Polyline::new()
                    .set("points", points)
                    .set("fill", "none")
                    .set("stroke", STROKE),
            )
        } else {
            group.add(
                rectangle(relation.bounds())
                    .set("fill", "none")
                    .set("stroke", STROKE),
            )
        };
        relations = relations.add(group);
    }

    let mut entities = svg_element::Group::new().set("class", "erd-entities");
    for entity in scene.entities() {
        let bounds = entity.bounds();
        let label = svg_element::Text::new("")
            .set("x", bounds.center().x())
            .set("y", bounds.center().y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-size", 14)
            .set("fill", TEXT)
            .add(SvgText::new(entity.display_name()));
        entities = entities.add(
            svg_element::Group::new()
                .set("class", "erd-entity")
                .set("data-id", entity.id().as_str())
                .add(rectangle(bounds).set("fill", FILL).set("stroke", STROKE))
                .add(label),
        );
    }

    svg::Document::new()
        .set("xmlns", "http://www.w3.org/2000/svg")
        .set("viewBox", format!("0 0 {} {}", scene.width(), scene.height()))
        .set("width", scene.width())
        .set("height", scene.height())
        .add(relations)
        .add(entities)
        .to_string()
}
