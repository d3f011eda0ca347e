//! In-memory index over a library directory of route manifests.
//!
//! Every load is a full rescan: [`load`] turns the directory contents into a
//! [`LoadReport`], and [`RouteIndex`] only remembers the latest report next to
//! the directory it came from. Nothing in the index is derived from anything
//! but the files on disk.

use std::path::{Path, PathBuf};

use crate::error::{RouteError, Result};
use crate::fs::{self, LibraryFs};
use crate::manifest::ManifestDocument;
use crate::tags::parse_tag_text;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// `metadata.name`, or the file stem when the name is missing or empty.
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub filepath: PathBuf,
    pub raw: ManifestDocument,
}

impl IndexEntry {
    fn from_document(filepath: &Path, raw: ManifestDocument) -> Self {
        let name = match raw.name() {
            name if name.is_empty() => file_stem(filepath),
            name => name,
        };
        Self {
            id: name.clone(),
            name,
            tags: raw.tags(),
            filepath: filepath.to_path_buf(),
            raw,
        }
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|own| own == tag)
    }

    #[must_use]
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Outcome of one directory scan. Errors are human-readable and ordered
/// like the files that caused them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub entries: Vec<IndexEntry>,
    pub errors: Vec<String>,
}

pub fn load(directory: &Path) -> LoadReport {
    let library = LibraryFs::new(directory);
    let files = match library.list_manifest_files() {
        Ok(files) => files,
        Err(err) => {
            let message = match err {
                RouteError::NotFound(message) => message,
                other => format!("failed to list {}: {other}", directory.display()),
            };
            tracing::warn!(library = %directory.display(), "{message}");
            return LoadReport {
                entries: Vec::new(),
                errors: vec![message],
            };
        }
    };

    let mut report = LoadReport::default();
    for path in files {
        match load_entry(&path) {
            Ok(entry) => {
                tracing::debug!(path = %path.display(), id = %entry.id, "loaded manifest");
                report.entries.push(entry);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping manifest");
                report
                    .errors
                    .push(format!("failed to load {}: {err}", path.display()));
            }
        }
    }
    report
}

fn load_entry(path: &Path) -> Result<IndexEntry> {
    let text = fs::read_text(path)?;
    let raw = ManifestDocument::parse(&text)?;
    Ok(IndexEntry::from_document(path, raw))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Filters combined with AND. `None`, an empty tag list and an empty
/// substring all mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub tags: Option<Vec<String>>,
    pub name_contains: Option<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    /// An entry matches the tag filter only if it carries every requested tag.
    #[must_use]
    pub fn matches(&self, entry: &IndexEntry) -> bool {
        let tags = self.tags.as_deref().unwrap_or_default();
        let needle = self.name_contains.as_deref().unwrap_or_default();
        tags.iter().all(|tag| entry.has_tag(tag)) && entry.name_contains(needle)
    }
}

#[derive(Debug, Clone)]
pub struct RouteIndex {
    library_path: PathBuf,
    report: LoadReport,
}

impl RouteIndex {
    /// Scans `library_path` right away; problems end up in [`Self::errors`].
    pub fn open(library_path: impl Into<PathBuf>) -> Self {
        let library_path = library_path.into();
        let report = load(&library_path);
        Self {
            library_path,
            report,
        }
    }

    pub fn reload(&mut self) {
        self.report = load(&self.library_path);
    }

    #[must_use]
    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.report.entries
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.report.errors
    }

    #[must_use]
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&IndexEntry> {
        self.entries().iter().find(|entry| entry.id == id)
    }

    #[must_use]
    pub fn get_by_path(&self, filepath: &Path) -> Option<&IndexEntry> {
        self.entries()
            .iter()
            .find(|entry| entry.filepath == filepath)
    }

    #[must_use]
    pub fn filter_by_tag(&self, tag: &str) -> Vec<&IndexEntry> {
        self.entries()
            .iter()
            .filter(|entry| entry.has_tag(tag))
            .collect()
    }

    #[must_use]
    pub fn filter_by_name_contains(&self, needle: &str) -> Vec<&IndexEntry> {
        self.entries()
            .iter()
            .filter(|entry| entry.name_contains(needle))
            .collect()
    }

    #[must_use]
    pub fn search(&self, query: &SearchQuery) -> Vec<&IndexEntry> {
        self.entries()
            .iter()
            .filter(|entry| query.matches(entry))
            .collect()
    }

    /// Rewrites the tags of one manifest file. The cached entries are left
    /// as they are; call [`Self::reload`] to pick the change up.
    pub fn save_tags(&self, filepath: &Path, tags: &[String]) -> Result<()> {
        save_tags(filepath, tags)
    }

    /// Applies comma-separated tag text to the entry with `id`, then reloads.
    /// On failure the index is not touched.
    pub fn update_tags_from_text(&mut self, id: &str, tag_text: &str) -> Result<PathBuf> {
        let filepath = self
            .get_by_id(id)
            .map(|entry| entry.filepath.clone())
            .ok_or_else(|| RouteError::NotFound(format!("route id: {id}")))?;
        save_tags(&filepath, &parse_tag_text(tag_text))?;
        self.reload();
        Ok(filepath)
    }
}

/// Re-reads `filepath` from disk, replaces `metadata.tags` and writes the
/// whole document back with its key order intact.
pub fn save_tags(filepath: &Path, tags: &[String]) -> Result<()> {
    let text = fs::read_text(filepath)?;
    let mut document = ManifestDocument::parse(&text)?;
    document.set_tags(tags)?;
    fs::write_atomic(filepath, &document.to_yaml()?)?;
    tracing::info!(path = %filepath.display(), tags = ?tags, "saved manifest tags");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn manifest_text(name: &str, tags: &[&str]) -> String {
        format!(
            "apiVersion: bikerouter.de/v1\nkind: Route\nmetadata:\n  name: {name}\n  description: test route\n  tags: [{}]\nspec:\n  layers: [standard]\n  waypoints:\n  - lon: 10.0\n    lat: 53.5\n  profile: gravel\n  pois: []\n",
            tags.join(", ")
        )
    }

    fn write(dir: &Path, file: &str, text: &str) -> PathBuf {
        let path = dir.join(file);
        fs::write(&path, text).expect("write manifest");
        path
    }

    fn sample_library(dir: &Path) {
        write(dir, "a-elbe.yaml", &manifest_text("Elbe Gravel", &["gravel", "scenic"]));
        write(dir, "b-harbour.yml", &manifest_text("Harbour Sprint", &["road"]));
        write(dir, "c-heath.yaml", &manifest_text("Heath Loop", &["gravel"]));
        write(dir, "d-dike.yaml", &manifest_text("Dike Ride", &["scenic", "gravel", "road"]));
    }

    fn ids(entries: &[&IndexEntry]) -> Vec<String> {
        entries.iter().map(|entry| entry.id.clone()).collect()
    }

    #[test]
    fn load_keeps_valid_file_and_reports_invalid_one() {
        let temp = tempdir().expect("tempdir");
        write(temp.path(), "good.yaml", &manifest_text("Good", &["gravel"]));
        let bad = write(temp.path(), "bad.yaml", "metadata: [unclosed\n");

        let report = load(temp.path());

        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains(&bad.display().to_string()));

        let entry = &report.entries[0];
        assert_eq!(entry.id, "Good");
        assert_eq!(entry.name, "Good");
        assert_eq!(entry.tags, vec!["gravel"]);
        assert_eq!(entry.filepath, temp.path().join("good.yaml"));
        let manifest = entry.raw.manifest().expect("typed view");
        assert_eq!(manifest.spec.profile, "gravel");
        assert_eq!(manifest.metadata.description, "test route");
    }

    #[test]
    fn load_orders_by_file_name_and_ignores_other_files() {
        let temp = tempdir().expect("tempdir");
        write(temp.path(), "z.yaml", &manifest_text("Zed", &[]));
        write(temp.path(), "m.yml", &manifest_text("Em", &[]));
        write(temp.path(), "a.json", "{}");
        write(temp.path(), "readme.md", "# library");

        let report = load(temp.path());

        assert!(report.errors.is_empty(), "{:?}", report.errors);
        let names = report
            .entries
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Em", "Zed"]);
    }

    #[test]
    fn load_reports_missing_directory_once() {
        let temp = tempdir().expect("tempdir");
        let missing = temp.path().join("library");

        let report = load(&missing);

        assert!(report.entries.is_empty());
        assert_eq!(
            report.errors,
            vec![format!("library path does not exist: {}", missing.display())]
        );
    }

    #[test]
    fn load_rejects_non_mapping_manifest() {
        let temp = tempdir().expect("tempdir");
        let path = write(temp.path(), "list.yaml", "- just\n- a list\n");

        let report = load(temp.path());

        assert!(report.entries.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains(&path.display().to_string()));
        assert!(report.errors[0].contains("mapping"));
    }

    #[test]
    fn id_falls_back_to_file_stem() {
        let temp = tempdir().expect("tempdir");
        write(temp.path(), "nameless.yaml", "kind: Route\nmetadata:\n  name: ''\n");
        write(temp.path(), "no-metadata.yml", "kind: Route\n");
        write(temp.path(), "odd-metadata.yaml", "metadata: 7\n");

        let report = load(temp.path());

        let ids = report
            .entries
            .iter()
            .map(|entry| (entry.id.as_str(), entry.name.as_str(), entry.tags.len()))
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                ("nameless", "nameless", 0),
                ("no-metadata", "no-metadata", 0),
                ("odd-metadata", "odd-metadata", 0),
            ]
        );
    }

    #[test]
    fn get_by_id_returns_first_match() {
        let temp = tempdir().expect("tempdir");
        write(temp.path(), "1.yaml", &manifest_text("Twin", &["first"]));
        write(temp.path(), "2.yaml", &manifest_text("Twin", &["second"]));

        let index = RouteIndex::open(temp.path());

        let entry = index.get_by_id("Twin").expect("entry");
        assert_eq!(entry.tags, vec!["first"]);
        assert!(index.get_by_id("twin").is_none());
    }

    #[test]
    fn filter_by_tag_is_exact() {
        let temp = tempdir().expect("tempdir");
        sample_library(temp.path());
        write(temp.path(), "e.yaml", &manifest_text("Shouting", &["GRAVEL"]));

        let index = RouteIndex::open(temp.path());

        assert_eq!(
            ids(&index.filter_by_tag("gravel")),
            vec!["Elbe Gravel", "Heath Loop", "Dike Ride"]
        );
        assert!(index.filter_by_tag("grav").is_empty());
    }

    #[test]
    fn filter_by_name_is_case_insensitive_substring() {
        let temp = tempdir().expect("tempdir");
        sample_library(temp.path());

        let index = RouteIndex::open(temp.path());

        assert_eq!(
            ids(&index.filter_by_name_contains("LOOP")),
            vec!["Heath Loop"]
        );
        assert_eq!(
            ids(&index.filter_by_name_contains("r")),
            vec!["Elbe Gravel", "Harbour Sprint", "Dike Ride"]
        );
    }

    #[test]
    fn search_requires_every_requested_tag() {
        let temp = tempdir().expect("tempdir");
        sample_library(temp.path());

        let index = RouteIndex::open(temp.path());
        let query = SearchQuery::new().with_tags(["gravel", "scenic"]);

        assert_eq!(ids(&index.search(&query)), vec!["Elbe Gravel", "Dike Ride"]);
    }

    #[test]
    fn search_combines_filters_with_and() {
        let temp = tempdir().expect("tempdir");
        sample_library(temp.path());

        let index = RouteIndex::open(temp.path());
        let query = SearchQuery::new()
            .with_tags(["gravel"])
            .with_name_contains("ride");

        assert_eq!(ids(&index.search(&query)), vec!["Dike Ride"]);
    }

    #[test]
    fn empty_search_returns_everything_in_load_order() {
        let temp = tempdir().expect("tempdir");
        sample_library(temp.path());

        let index = RouteIndex::open(temp.path());

        let all = ids(&index.search(&SearchQuery::new()));
        assert_eq!(
            all,
            vec!["Elbe Gravel", "Harbour Sprint", "Heath Loop", "Dike Ride"]
        );
        let blank = SearchQuery::new().with_tags(Vec::<String>::new()).with_name_contains("");
        assert_eq!(ids(&index.search(&blank)), all);
    }

    #[test]
    fn save_tags_then_reload_updates_only_tags() {
        let temp = tempdir().expect("tempdir");
        let path = write(
            temp.path(),
            "route.yaml",
            &manifest_text("Route", &["old", "old"]),
        );
        let mut index = RouteIndex::open(temp.path());
        let before = index.get_by_id("Route").expect("entry").raw.clone();

        index
            .save_tags(&path, &parse_tag_text("a, b"))
            .expect("save tags");
        assert_eq!(index.get_by_id("Route").expect("cached").tags, vec!["old", "old"]);

        index.reload();
        let after = index.get_by_id("Route").expect("reloaded");
        assert_eq!(after.tags, vec!["a", "b"]);

        let mut expected = before;
        expected
            .set_tags(&["a".to_string(), "b".to_string()])
            .expect("set tags");
        assert_eq!(after.raw, expected);
    }

    #[test]
    fn save_tags_keeps_unknown_keys_and_unicode() {
        let temp = tempdir().expect("tempdir");
        let path = write(
            temp.path(),
            "route.yaml",
            "kind: Route\nmetadata:\n  name: Köhlbrand\n  note: über\nx-extra: true\n",
        );

        save_tags(&path, &["brücke".to_string()]).expect("save tags");

        let text = fs::read_to_string(&path).expect("read back");
        assert!(text.contains("Köhlbrand"), "{text}");
        assert!(text.contains("brücke"), "{text}");
        assert!(text.contains("note: über"), "{text}");
        assert!(text.contains("x-extra: true"), "{text}");
    }

    #[test]
    fn save_tags_on_missing_file_fails_without_touching_index() {
        let temp = tempdir().expect("tempdir");
        let path = write(temp.path(), "route.yaml", &manifest_text("Route", &["keep"]));
        let mut index = RouteIndex::open(temp.path());
        fs::remove_file(&path).expect("remove");

        let err = index
            .update_tags_from_text("Route", "new")
            .expect_err("must fail");

        assert!(matches!(err, RouteError::NotFound(_)));
        assert_eq!(index.get_by_id("Route").expect("still cached").tags, vec!["keep"]);
    }

    fn make_read_only(path: &Path) {
        let mut permissions = fs::metadata(path).expect("metadata").permissions();
        permissions.set_readonly(true);
        fs::set_permissions(path, permissions).expect("set read-only");
    }

    #[test]
    fn update_tags_on_read_only_file_fails_without_touching_index() {
        let temp = tempdir().expect("tempdir");
        let path = write(temp.path(), "route.yaml", &manifest_text("Route", &["keep"]));
        let before = fs::read_to_string(&path).expect("read");
        make_read_only(&path);
        let mut index = RouteIndex::open(temp.path());

        let err = index
            .update_tags_from_text("Route", "new")
            .expect_err("must fail");

        assert_eq!(err.code(), "IO_ERROR");
        assert_eq!(index.get_by_id("Route").expect("still cached").tags, vec!["keep"]);
        assert_eq!(fs::read_to_string(&path).expect("read"), before);
    }

    #[cfg(unix)]
    #[test]
    fn update_tags_through_symlink_rewrites_target() {
        let temp = tempdir().expect("tempdir");
        let outside = temp.path().join("outside");
        let library = temp.path().join("library");
        fs::create_dir(&outside).expect("mkdir outside");
        fs::create_dir(&library).expect("mkdir library");
        let real = write(&outside, "real.yaml", &manifest_text("Linked", &["old"]));
        let link = library.join("linked.yaml");
        std::os::unix::fs::symlink(&real, &link).expect("symlink");
        let mut index = RouteIndex::open(&library);

        let path = index
            .update_tags_from_text("Linked", "new")
            .expect("update");

        assert_eq!(path, link);
        assert!(
            fs::symlink_metadata(&link)
                .expect("link metadata")
                .file_type()
                .is_symlink()
        );
        let target = ManifestDocument::parse(&fs::read_to_string(&real).expect("read real"))
            .expect("parse real");
        assert_eq!(target.tags(), vec!["new"]);
        assert_eq!(index.get_by_id("Linked").expect("entry").tags, vec!["new"]);
    }

    #[cfg(unix)]
    #[test]
    fn update_tags_through_symlink_to_read_only_file_fails() {
        let temp = tempdir().expect("tempdir");
        let outside = temp.path().join("outside");
        let library = temp.path().join("library");
        fs::create_dir(&outside).expect("mkdir outside");
        fs::create_dir(&library).expect("mkdir library");
        let real = write(&outside, "real.yaml", &manifest_text("Linked", &["old"]));
        make_read_only(&real);
        let link = library.join("linked.yaml");
        std::os::unix::fs::symlink(&real, &link).expect("symlink");
        let mut index = RouteIndex::open(&library);

        assert!(index.update_tags_from_text("Linked", "new").is_err());

        assert!(
            fs::symlink_metadata(&link)
                .expect("link metadata")
                .file_type()
                .is_symlink()
        );
        assert_eq!(index.get_by_id("Linked").expect("entry").tags, vec!["old"]);
    }

    #[test]
    fn update_tags_from_text_rejects_unknown_id() {
        let temp = tempdir().expect("tempdir");
        sample_library(temp.path());
        let mut index = RouteIndex::open(temp.path());

        let err = index
            .update_tags_from_text("Nowhere", "a")
            .expect_err("must fail");
        assert!(matches!(err, RouteError::NotFound(_)));
    }

    #[test]
    fn update_tags_from_text_reloads_on_success() {
        let temp = tempdir().expect("tempdir");
        sample_library(temp.path());
        let mut index = RouteIndex::open(temp.path());

        let path = index
            .update_tags_from_text("Heath Loop", "gravel, , scenic,")
            .expect("update");

        let entry = index.get_by_path(&path).expect("entry");
        assert_eq!(entry.tags, vec!["gravel", "scenic"]);
        assert_eq!(
            ids(&index.search(&SearchQuery::new().with_tags(["gravel", "scenic"]))),
            vec!["Elbe Gravel", "Heath Loop", "Dike Ride"]
        );
    }

    #[test]
    fn reload_replaces_entries_and_errors() {
        let temp = tempdir().expect("tempdir");
        let bad = write(temp.path(), "bad.yaml", "[");
        let mut index = RouteIndex::open(temp.path());
        assert_eq!(index.errors().len(), 1);
        assert!(index.entries().is_empty());

        fs::remove_file(bad).expect("remove");
        write(temp.path(), "fresh.yaml", &manifest_text("Fresh", &[]));
        index.reload();

        assert!(index.errors().is_empty());
        assert_eq!(index.entries().len(), 1);
        assert_eq!(index.report(), &load(temp.path()));
    }
}
