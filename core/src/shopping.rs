use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::ShoppingItem;

/// Collapse a list of ingredient uses into one item per distinct ingredient.
///
/// Matching is exact and case-sensitive. Items come out in the order each
/// ingredient was first seen.
#[must_use]
pub fn aggregate(raw: &[String]) -> Vec<ShoppingItem> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut items: Vec<ShoppingItem> = Vec::new();

    for ingredient in raw {
        if let Some(&i) = index.get(ingredient.as_str()) {
            items[i].count += 1;
        } else {
            index.insert(ingredient, items.len());
            items.push(ShoppingItem {
                name: ingredient.clone(),
                count: 1,
            });
        }
    }

    items
}

/// Write one item per line, creating or truncating `path`.
pub fn write_shopping_list(path: &Path, items: &[ShoppingItem]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for item in items {
        writeln!(writer, "{item}")?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}
