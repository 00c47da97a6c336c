use std::collections::HashMap;
use std::sync::LazyLock;

pub const FALLBACK_COLOR: &str = "#adb5bd";
pub const FALLBACK_GLYPH: &str = "🔍";

/// How an entity type is shown in a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor<'a> {
    pub color: &'static str,
    pub glyph: &'static str,
    pub name: &'a str,
}

const fn descriptor(color: &'static str, glyph: &'static str, name: &'static str) -> EntityDescriptor<'static> {
    EntityDescriptor { color, glyph, name }
}

static ENTITY_TYPES: LazyLock<HashMap<&'static str, EntityDescriptor<'static>>> = LazyLock::new(|| {
    HashMap::from([
        ("PER", descriptor("#FF5252", "👤", "Person")),
        ("LOC", descriptor("#2196F3", "📍", "Location")),
        ("ORG", descriptor("#4CAF50", "🏢", "Organization")),
        ("URL", descriptor("#FF9800", "🔗", "URL")),
        ("EMAIL", descriptor("#9C27B0", "📧", "Email")),
        ("PHONE", descriptor("#FFC107", "📱", "Phone")),
        ("CIVIL-ID", descriptor("#009688", "🪪", "Civil ID")),
        ("PASSPORT-ID", descriptor("#E91E63", "🛂", "Passport")),
        ("CREDIT-CARD", descriptor("#673AB7", "💳", "Credit Card")),
    ])
});

/// Descriptor for `code`. Unknown codes get the neutral fallback named after the code itself.
pub fn describe(code: &str) -> EntityDescriptor<'_> {
    ENTITY_TYPES.get(code).copied().unwrap_or(EntityDescriptor {
        color: FALLBACK_COLOR,
        glyph: FALLBACK_GLYPH,
        name: code,
    })
}
