//! Category entity and hierarchy helpers

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Listing category, optionally nested under a parent
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Snowflake,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<Snowflake>,
    pub is_active: bool,
    pub display_order: i32,
    /// locale -> localized name
    pub translations: BTreeMap<String, String>,
    pub attributes: serde_json::Value,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(id: Snowflake, name: String, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            slug,
            parent_id: None,
            is_active: true,
            display_order: 0,
            translations: BTreeMap::new(),
            attributes: serde_json::Value::Object(serde_json::Map::new()),
            image: None,
            icon: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Localized name, falling back to the canonical one
    pub fn name_for(&self, locale: &str) -> &str {
        self.translations
            .get(locale)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }
}

/// A category with its nested children
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

/// Whether making `proposed_parent` the parent of `id` would close a loop.
///
/// Walks the whole ancestor chain of `proposed_parent`. A chain that already
/// loops back on itself is reported as a cycle too.
pub fn would_create_cycle(categories: &[Category], id: Snowflake, proposed_parent: Snowflake) -> bool {
    let parents: HashMap<Snowflake, Option<Snowflake>> =
        categories.iter().map(|c| (c.id, c.parent_id)).collect();

    let mut seen = HashSet::new();
    let mut cursor = Some(proposed_parent);
    while let Some(current) = cursor {
        if current == id || !seen.insert(current) {
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    false
}

/// Arrange a flat category list into a forest ordered by display order, then name.
///
/// Categories whose parent is missing from the input become roots.
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let known: HashSet<Snowflake> = categories.iter().map(|c| c.id).collect();
    let mut by_parent: HashMap<Option<Snowflake>, Vec<Category>> = HashMap::new();

    for category in categories {
        let parent = category.parent_id.filter(|p| known.contains(p));
        by_parent.entry(parent).or_default().push(category);
    }

    attach(None, &mut by_parent)
}

fn attach(
    parent: Option<Snowflake>,
    by_parent: &mut HashMap<Option<Snowflake>, Vec<Category>>,
) -> Vec<CategoryNode> {
    let mut level = by_parent.remove(&parent).unwrap_or_default();
    level.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.name.cmp(&b.name))
    });

    level
        .into_iter()
        .map(|category| {
            let children = attach(Some(category.id), by_parent);
            CategoryNode { category, children }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: i64, parent: Option<i64>) -> Category {
        let mut c = Category::new(Snowflake::new(id), format!("Cat {id}"), format!("cat-{id}"));
        c.parent_id = parent.map(Snowflake::new);
        c
    }

    #[test]
    fn deep_cycle_is_detected() {
        // 1 <- 2 <- 3 <- 4
        let all = vec![cat(1, None), cat(2, Some(1)), cat(3, Some(2)), cat(4, Some(3))];
        assert!(would_create_cycle(&all, Snowflake::new(1), Snowflake::new(4)));
        assert!(would_create_cycle(&all, Snowflake::new(2), Snowflake::new(2)));
        assert!(!would_create_cycle(&all, Snowflake::new(4), Snowflake::new(1)));
    }

    #[test]
    fn sibling_reparent_is_fine() {
        let all = vec![cat(1, None), cat(2, Some(1)), cat(3, Some(1))];
        assert!(!would_create_cycle(&all, Snowflake::new(3), Snowflake::new(2)));
    }

    #[test]
    fn tree_nests_and_orders() {
        let mut b = cat(2, None);
        b.display_order = 1;
        let a = cat(1, None);
        let child = cat(3, Some(1));
        let orphan = cat(4, Some(99));

        let tree = build_tree(vec![b, child, a, orphan]);
        let roots: Vec<i64> = tree.iter().map(|n| n.category.id.into_inner()).collect();
        assert_eq!(roots, vec![1, 4, 2]);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].category.id, Snowflake::new(3));
    }

    #[test]
    fn localized_name_falls_back() {
        let mut c = cat(1, None);
        c.translations.insert("az".into(), "Nəqliyyat".into());
        assert_eq!(c.name_for("az"), "Nəqliyyat");
        assert_eq!(c.name_for("ru"), "Cat 1");
    }
}
