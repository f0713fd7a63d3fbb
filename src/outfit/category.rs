use crate::foundation::core::{Transform, Vec2};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// One of the four fixed garment slots of an outfit.
///
/// Declaration order is paint order (bottom to top) and doubles as the tie breaker
/// when two entries share a z-order.
pub enum Category {
    /// Footwear; painted first.
    Shoes,
    /// Trousers, skirts, shorts.
    Bottom,
    /// Shirts, jackets, dresses.
    Top,
    /// Hats, bags, jewelry; painted last.
    Accessories,
}

impl Category {
    /// All categories in paint order.
    pub const ALL: [Category; 4] = [
        Category::Shoes,
        Category::Bottom,
        Category::Top,
        Category::Accessories,
    ];

    /// Stable lowercase label used in logs and CLI output.
    pub fn label(self) -> &'static str {
        match self {
            Category::Shoes => "shoes",
            Category::Bottom => "bottom",
            Category::Top => "top",
            Category::Accessories => "accessories",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Placement applied to a freshly created entry.
pub struct CategoryDefaults {
    /// Initial paint order.
    pub z_order: i32,
    /// Initial offset from the canvas center.
    pub translate: Vec2,
}

impl CategoryDefaults {
    /// Full default transform: the category offset at scale 1, rotation 0.
    pub fn transform(self) -> Transform {
        Transform::at(self.translate)
    }
}

/// Stacking order and first-placement offset for `category`.
///
/// Mirrors dressing order so default overlaps look right, and spreads the slots
/// vertically so every new layer is tappable before anything has been moved.
pub fn defaults_for(category: Category) -> CategoryDefaults {
    let (z_order, y) = match category {
        Category::Shoes => (0, 240.0),
        Category::Bottom => (1, 90.0),
        Category::Top => (2, -90.0),
        Category::Accessories => (3, -240.0),
    };
    CategoryDefaults {
        z_order,
        translate: Vec2::new(0.0, y),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/outfit/category.rs"]
mod tests;
