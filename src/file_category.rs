//! Extension-based file categorization.
//!
//! A [`CategoryMapper`] holds an ordered list of categories, each owning a set
//! of lowercase, dot-prefixed extensions. Exactly one category acts as the
//! catch-all and receives every extension no other category claims.
//!
//! # Examples
//!
//! ```
//! use homesort::file_category::CategoryMapper;
//!
//! let mapper = CategoryMapper::default();
//! assert_eq!(mapper.resolve(".png"), "Pictures");
//! assert_eq!(mapper.resolve(".PDF"), "Documents");
//! assert_eq!(mapper.resolve(".xyz"), "Others");
//! ```

use std::collections::HashSet;
use std::path::Path;

/// Name of the catch-all category used when a mapping does not declare one.
pub const CATCH_ALL: &str = "Others";

/// A named bucket of file extensions, backed by `home/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub extensions: HashSet<String>,
}

impl Category {
    /// Creates a category, normalizing every extension.
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Whether this category can act as the catch-all.
    pub fn is_catch_all(&self) -> bool {
        self.extensions.is_empty()
    }
}

/// Lowercases an extension and makes sure it starts with a dot.
///
/// ```
/// use homesort::file_category::normalize_extension;
///
/// assert_eq!(normalize_extension("JPG"), ".jpg");
/// assert_eq!(normalize_extension(".Tar"), ".tar");
/// assert_eq!(normalize_extension(""), "");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Returns the lowercase dot-prefixed extension of a path, or `""`.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Maps file extensions to category names.
///
/// Lookup walks the categories in their configured order and returns the first
/// one claiming the extension, so an extension listed twice belongs to the
/// earlier category.
#[derive(Debug, Clone)]
pub struct CategoryMapper {
    categories: Vec<Category>,
    catch_all: usize,
}

impl CategoryMapper {
    /// Builds a mapper from an ordered list of categories.
    ///
    /// The first category with an empty extension set becomes the catch-all.
    /// If there is none, an empty [`CATCH_ALL`] category is appended.
    pub fn new(mut categories: Vec<Category>) -> Self {
        let catch_all = match categories.iter().position(Category::is_catch_all) {
            Some(index) => index,
            None => {
                categories.push(Category::new(CATCH_ALL, Vec::<String>::new()));
                categories.len() - 1
            }
        };

        Self {
            categories,
            catch_all,
        }
    }

    /// Returns the category name for an extension.
    pub fn resolve(&self, extension: &str) -> &str {
        let extension = normalize_extension(extension);
        self.categories
            .iter()
            .find(|category| category.extensions.contains(&extension))
            .map(|category| category.name.as_str())
            .unwrap_or_else(|| self.catch_all_name())
    }

    /// Returns the category name for a file path, based on its extension.
    pub fn resolve_path(&self, path: &Path) -> &str {
        self.resolve(&extension_of(path))
    }

    /// Name of the catch-all category.
    pub fn catch_all_name(&self) -> &str {
        &self.categories[self.catch_all].name
    }

    /// Category names in configured order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.name.as_str())
    }

    /// All categories in configured order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}

impl Default for CategoryMapper {
    fn default() -> Self {
        Self::new(default_categories())
    }
}

/// The built-in category table.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("Pictures", [".jpg", ".jpeg", ".png", ".gif"]),
        Category::new(
            "Documents",
            [".pdf", ".docx", ".txt", ".xlsx", ".pptx", ".pub"],
        ),
        Category::new("Music", [".mp3", ".wav", ".rg", ".md", ".m4a"]),
        Category::new("Videos", [".mp4", ".mov", ".avi"]),
        Category::new(
            "Archives",
            [".zip", ".tar", ".gz", ".rar", ".xz", ".deb"],
        ),
        Category::new("Scripts", [".py", ".sh", ".bat"]),
        Category::new(CATCH_ALL, Vec::<String>::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names_in_order() {
        let mapper = CategoryMapper::default();
        let names: Vec<_> = mapper.names().collect();
        assert_eq!(
            names,
            vec![
                "Pictures",
                "Documents",
                "Music",
                "Videos",
                "Archives",
                "Scripts",
                "Others"
            ]
        );
    }

    #[test]
    fn test_resolve_known_extensions() {
        let mapper = CategoryMapper::default();
        assert_eq!(mapper.resolve(".jpg"), "Pictures");
        assert_eq!(mapper.resolve(".txt"), "Documents");
        assert_eq!(mapper.resolve(".mp3"), "Music");
        assert_eq!(mapper.resolve(".mov"), "Videos");
        assert_eq!(mapper.resolve(".deb"), "Archives");
        assert_eq!(mapper.resolve(".sh"), "Scripts");
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let mapper = CategoryMapper::default();
        assert_eq!(mapper.resolve(".PNG"), "Pictures");
        assert_eq!(mapper.resolve(".Pdf"), "Documents");
        assert_eq!(mapper.resolve("zip"), "Archives");
    }

    #[test]
    fn test_unknown_extension_goes_to_catch_all() {
        let mapper = CategoryMapper::default();
        assert_eq!(mapper.resolve(".xyz"), "Others");
        assert_eq!(mapper.resolve(""), "Others");
    }

    #[test]
    fn test_first_category_wins_on_overlap() {
        let mapper = CategoryMapper::new(vec![
            Category::new("First", [".dup"]),
            Category::new("Second", [".dup", ".two"]),
            Category::new("Misc", Vec::<String>::new()),
        ]);
        assert_eq!(mapper.resolve(".dup"), "First");
        assert_eq!(mapper.resolve(".two"), "Second");
        assert_eq!(mapper.catch_all_name(), "Misc");
    }

    #[test]
    fn test_missing_catch_all_is_appended() {
        let mapper = CategoryMapper::new(vec![Category::new("Images", ["png"])]);
        assert_eq!(mapper.catch_all_name(), CATCH_ALL);
        assert_eq!(mapper.resolve(".bin"), CATCH_ALL);
        assert_eq!(mapper.categories().len(), 2);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("/a/photo.PNG")), ".png");
        assert_eq!(extension_of(Path::new("archive.tar.gz")), ".gz");
        assert_eq!(extension_of(Path::new("README")), "");
        assert_eq!(extension_of(Path::new(".bashrc")), "");
    }

    #[test]
    fn test_resolve_path() {
        let mapper = CategoryMapper::default();
        assert_eq!(mapper.resolve_path(Path::new("x/notes.TXT")), "Documents");
        assert_eq!(mapper.resolve_path(Path::new("x/Makefile")), "Others");
    }
}
