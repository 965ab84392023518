use std::collections::BTreeMap;

use anyhow::{Result, anyhow, ensure};

pub type Rgb = [u8; 3];

/// Built-in palettes for color-fill tiles. Repeated entries weight the draw.
pub static BUILTIN_PALETTES: &[(&str, &[Rgb])] = &[
    (
        "Mondrian",
        &[
            [243, 243, 242],
            [243, 243, 242],
            [175, 54, 60],
            [56, 61, 150],
            [231, 199, 31],
        ],
    ),
    (
        "70s",
        &[
            [63, 138, 140],
            [12, 86, 121],
            [11, 8, 53],
            [229, 52, 11],
            [242, 138, 15],
            [255, 231, 189],
        ],
    ),
];

/// Finds `name` among the user palettes first, then the built-in ones.
pub fn lookup(name: &str, extra: &BTreeMap<String, Vec<Rgb>>) -> Result<Vec<Rgb>> {
    let colors = extra
        .get(name)
        .cloned()
        .or_else(|| {
            BUILTIN_PALETTES
                .iter()
                .find(|(builtin, _)| *builtin == name)
                .map(|(_, colors)| colors.to_vec())
        })
        .ok_or_else(|| anyhow!("unknown palette '{name}' (available: {})", names(extra).join(", ")))?;
    ensure!(!colors.is_empty(), "palette '{name}' has no colors");
    Ok(colors)
}

pub fn names(extra: &BTreeMap<String, Vec<Rgb>>) -> Vec<String> {
    BUILTIN_PALETTES
        .iter()
        .map(|(name, _)| name.to_string())
        .chain(extra.keys().cloned())
        .collect()
}
