//! Default template catalogue.
//!
//! Bump [`CATALOG_VERSION`] whenever an entry changes; rows seeded from an
//! older version stay in place and new entries are seeded alongside them.

use crate::models::TEMPLATE_CATEGORY;

pub const CATALOG_VERSION: u32 = 1;

/// `(title, category)` pairs seeded by `generate_default_tasks`
pub const DEFAULT_TEMPLATES: [(&str, &str); 3] = [
    ("Study Java every day", TEMPLATE_CATEGORY),
    ("Morning workout", TEMPLATE_CATEGORY),
    ("Read a technical article", TEMPLATE_CATEGORY),
];
