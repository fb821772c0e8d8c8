//! Loading card manifests and saving layouts

use crate::card::{Component, Face, Side, Sheet};
use crate::constants::mm_to_pt;
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;

/// Load components from a CSV manifest.
///
/// Expected header columns: `source`, `name`, `width_mm`, `height_mm`, and
/// optionally `class`, `double_sided`, `bleed_mm`, `copies`. Rows with the
/// same `source` become successive sheets of one component.
pub async fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<Component>> {
    let contents = tokio::fs::read_to_string(path.as_ref()).await?;

    // CSV parsing is CPU-bound, spawn blocking
    tokio::task::spawn_blocking(move || parse_manifest(&contents)).await?
}

/// Parse manifest CSV text
pub fn parse_manifest(contents: &str) -> Result<Vec<Component>> {
    let mut reader = csv::Reader::from_reader(contents.as_bytes());
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut components: Vec<Component> = Vec::new();
    let mut by_source: HashMap<String, usize> = HashMap::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = row + 2;

        let source = columns.required(&record, columns.source, line, "source")?;
        let name = columns.required(&record, columns.name, line, "name")?;
        let width = mm_to_pt(columns.number(&record, Some(columns.width), line, "width_mm", 0.0)?);
        let height =
            mm_to_pt(columns.number(&record, Some(columns.height), line, "height_mm", 0.0)?);
        let bleed = mm_to_pt(columns.number(&record, columns.bleed, line, "bleed_mm", 0.0)?);
        let double_sided = columns.flag(&record, columns.double_sided, line)?;
        let copies = columns.number(&record, columns.copies, line, "copies", 1.0)?;
        if copies < 0.0 || copies.fract() != 0.0 {
            return Err(LayoutError::Manifest(format!(
                "line {}: copies must be a whole number, got {}",
                line, copies
            )));
        }

        if !(width > 0.0 && height > 0.0) {
            return Err(LayoutError::Manifest(format!(
                "line {}: card size must be positive",
                line
            )));
        }

        let front = Face::new(Side::Front, width, height).with_bleed(bleed);
        let sheet = Sheet {
            front,
            back: double_sided.then(|| Face { side: Side::Back, ..front }),
        };

        let class = columns
            .class
            .and_then(|i| record.get(i))
            .unwrap_or_default()
            .trim();
        let copies = copies as usize;

        match by_source.get(source) {
            Some(&index) => {
                let component = &mut components[index];
                if component.class != class || component.copies != copies {
                    return Err(LayoutError::Manifest(format!(
                        "line {}: class and copies must match the first row of '{}'",
                        line, source
                    )));
                }
                component.sheets.push(sheet);
            }
            None => {
                by_source.insert(source.to_string(), components.len());
                components.push(Component {
                    source_id: source.to_string(),
                    class: class.to_string(),
                    name: name.to_string(),
                    sheets: vec![sheet],
                    copies,
                });
            }
        }
    }

    Ok(components)
}

/// Header positions of the manifest columns
struct Columns {
    source: usize,
    name: usize,
    width: usize,
    height: usize,
    class: Option<usize>,
    double_sided: Option<usize>,
    bleed: Option<usize>,
    copies: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                LayoutError::Manifest(format!("missing required column '{}'", name))
            })
        };

        Ok(Self {
            source: require("source")?,
            name: require("name")?,
            width: require("width_mm")?,
            height: require("height_mm")?,
            class: find("class"),
            double_sided: find("double_sided"),
            bleed: find("bleed_mm"),
            copies: find("copies"),
        })
    }

    fn required<'r>(
        &self,
        record: &'r csv::StringRecord,
        index: usize,
        line: usize,
        column: &str,
    ) -> Result<&'r str> {
        match record.get(index).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(LayoutError::Manifest(format!(
                "line {}: '{}' is empty",
                line, column
            ))),
        }
    }

    fn number(
        &self,
        record: &csv::StringRecord,
        index: Option<usize>,
        line: usize,
        column: &str,
        default: f32,
    ) -> Result<f32> {
        let Some(value) = index.and_then(|i| record.get(i)).map(str::trim) else {
            return Ok(default);
        };
        if value.is_empty() {
            return Ok(default);
        }
        value.parse::<f32>().map_err(|_| {
            LayoutError::Manifest(format!(
                "line {}: '{}' is not a number in column '{}'",
                line, value, column
            ))
        })
    }

    fn flag(&self, record: &csv::StringRecord, index: Option<usize>, line: usize) -> Result<bool> {
        let value = index
            .and_then(|i| record.get(i))
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_default();
        match value.as_str() {
            "" | "false" | "no" | "0" => Ok(false),
            "true" | "yes" | "1" => Ok(true),
            other => Err(LayoutError::Manifest(format!(
                "line {}: '{}' is not a valid double_sided value",
                line, other
            ))),
        }
    }
}

/// Save a layout as pretty JSON
#[cfg(feature = "serde")]
pub async fn save_layout(deck: &crate::deck::Deck, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(deck)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Load a layout saved by [`save_layout`]
#[cfg(feature = "serde")]
pub async fn load_layout(path: impl AsRef<Path>) -> Result<crate::deck::Deck> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
