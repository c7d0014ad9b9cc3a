use std::collections::HashSet;

use crate::model::PluginItem;

/// Union of two catalogs keyed by identity. On collision the `primary` copy wins;
/// `secondary`-only items are appended in their original order.
pub fn merge_plugins(primary: &[PluginItem], secondary: &[PluginItem]) -> Vec<PluginItem> {
    let mut seen: HashSet<String> = HashSet::with_capacity(primary.len() + secondary.len());
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());

    for item in primary.iter().chain(secondary.iter()) {
        if seen.insert(item.identity_key()) {
            merged.push(item.clone());
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::merge_plugins;
    use crate::model::{PluginItem, PluginType};

    #[test]
    fn collapses_duplicates_inside_primary() {
        let a = PluginItem::new("a", PluginType::Installed);
        let merged = merge_plugins(&[a.clone(), a.clone()], &[]);
        assert_eq!(merged, vec![a]);
    }
}
