//! Module categories
//!
//! Every extension name starts with a short category code (`r.buffer`,
//! `v.generalize`, `db.csv`). The code selects the subsystem directory the
//! extension lives under in the add-ons repository.

use std::fmt;

/// A module category, keyed by its short code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Display,
    Database,
    General,
    Imagery,
    Misc,
    Postscript,
    Paint,
    Raster,
    Raster3d,
    Sites,
    Vector,
    Gui,
    /// Unknown code; maps to a directory of the same name
    Other(String),
}

/// Categories scanned by directory-listing discovery, in scan order
pub const LISTED_CATEGORIES: [Category; 11] = [
    Category::Display,
    Category::Database,
    Category::General,
    Category::Imagery,
    Category::Misc,
    Category::Postscript,
    Category::Paint,
    Category::Raster,
    Category::Raster3d,
    Category::Sites,
    Category::Vector,
];

impl Category {
    /// Look up a category by its code
    pub fn from_code(code: &str) -> Self {
        match code {
            "d" => Self::Display,
            "db" => Self::Database,
            "g" => Self::General,
            "i" => Self::Imagery,
            "m" => Self::Misc,
            "ps" => Self::Postscript,
            "p" => Self::Paint,
            "r" => Self::Raster,
            "r3" => Self::Raster3d,
            "s" => Self::Sites,
            "v" => Self::Vector,
            "gui" => Self::Gui,
            other => Self::Other(other.to_string()),
        }
    }

    /// Category of an extension, taken from the part of its name before the first dot
    pub fn of_module(name: &str) -> Self {
        Self::from_code(module_code(name))
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Display => "d",
            Self::Database => "db",
            Self::General => "g",
            Self::Imagery => "i",
            Self::Misc => "m",
            Self::Postscript => "ps",
            Self::Paint => "p",
            Self::Raster => "r",
            Self::Raster3d => "r3",
            Self::Sites => "s",
            Self::Vector => "v",
            Self::Gui => "gui",
            Self::Other(code) => code,
        }
    }

    /// Path segment of the category in the add-ons repository
    pub fn path(&self) -> &str {
        match self {
            Self::Display => "display",
            Self::Database => "database",
            Self::General => "general",
            Self::Imagery => "imagery",
            Self::Misc => "misc",
            Self::Postscript => "postscript",
            Self::Paint => "paint",
            Self::Raster => "raster",
            Self::Raster3d => "raster3d",
            Self::Sites => "sites",
            Self::Vector => "vector",
            Self::Gui => "gui/wxpython",
            Self::Other(code) => code,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// The part of a module name before its first dot
pub fn module_code(name: &str) -> &str {
    name.split_once('.').map_or(name, |(code, _)| code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip() {
        for category in LISTED_CATEGORIES.iter() {
            assert_eq!(&Category::from_code(category.code()), category);
            assert!(category.is_known());
        }
    }

    #[test]
    fn test_module_category() {
        assert_eq!(Category::of_module("r.foo").path(), "raster");
        assert_eq!(Category::of_module("r3.flow").path(), "raster3d");
        assert_eq!(Category::of_module("db.csv.import").path(), "database");
        assert_eq!(Category::from_code("gui").path(), "gui/wxpython");
    }

    #[test]
    fn test_unknown_code_falls_back_to_itself() {
        let category = Category::of_module("t.rast.what");
        assert_eq!(category, Category::Other("t".to_string()));
        assert_eq!(category.path(), "t");
        assert!(!category.is_known());
    }

    #[test]
    fn test_module_code_without_dot() {
        assert_eq!(module_code("wxGUI"), "wxGUI");
        assert_eq!(module_code("v.generalize"), "v");
    }
}
