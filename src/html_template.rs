use rust_embed::RustEmbed;

use crate::error::{QuakeMapError, Result};
use crate::map::MapDocument;

#[derive(RustEmbed)]
#[folder = "frontend/"]
struct Asset;

const STYLE_PLACEHOLDER: &str = "/* STYLE_PLACEHOLDER */";
const SCRIPT_PLACEHOLDER: &str = "/* SCRIPT_PLACEHOLDER */";
const DATA_PLACEHOLDER: &str = "/* MAP_DATA_PLACEHOLDER */";

fn asset_text(name: &str) -> Result<String> {
    let file = Asset::get(name)
        .ok_or_else(|| QuakeMapError::Template(format!("missing embedded asset {}", name)))?;
    String::from_utf8(file.data.into_owned())
        .map_err(|e| QuakeMapError::Template(format!("{} is not UTF-8: {}", name, e)))
}

/// Builds a self-contained page: stylesheet, script and map data are all
/// inlined so the file can be opened straight from disk.
pub fn get_map_html(document: &MapDocument) -> Result<String> {
    let page = asset_text("index.html")?;
    let style = asset_text("style.css")?;
    let script = asset_text("map.js")?;

    let data = serde_json::to_string(document)
        .map_err(|e| QuakeMapError::Template(format!("serializing map document: {}", e)))?
        // keep popup markup from closing the surrounding <script> tag
        .replace("</", "<\\/");

    Ok(page
        .replace(STYLE_PLACEHOLDER, &style)
        .replace(SCRIPT_PLACEHOLDER, &script)
        .replace(DATA_PLACEHOLDER, &data))
}
