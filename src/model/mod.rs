pub mod catalog;
pub mod category;
pub mod snippet;

pub use catalog::Catalog;
pub use category::{
    main_category_names, subcategories_of, CategoryGroup, CATEGORY_SCHEME, NEEDS_REVIEW,
    UNCATEGORIZED,
};
pub use snippet::{
    truncate_chars, Snippet, CATEGORY_COLUMNS, COL_APPLICATION, COL_CONTENT, COL_DESCRIPTION,
    COL_LANGUAGE, COL_MAIN_CATEGORY, COL_NAME, COL_SUBCATEGORY, COL_TAGS, CORE_COLUMNS,
};
