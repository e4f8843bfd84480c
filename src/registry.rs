//! Schema Registry
//!
//! The byte-level contract a registry transport has to honor, two local
//! implementations of it, and a typed facade that runs payloads through the
//! codec.
//!
//! ```text
//! registry/
//! ├── hello.json
//! ├── hello.json.sha256
//! ├── clicks.json
//! └── clicks.json.sha256
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use dashmap::DashMap;
use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::checksum::Checksum;
use crate::codec;
use crate::error::{Result, SchemaError};
use crate::schema::Schema;

const PAYLOAD_EXTENSION: &str = "json";
const CHECKSUM_EXTENSION: &str = "json.sha256";
const TEMP_SUFFIX: &str = "tmp";

/// Raw access to a schema registry
///
/// Implementations move opaque bytes; they never interpret them. Transport,
/// authentication and retry policy are up to the implementation.
pub trait RegistryClient {
    /// Fetch the payload published under `name`
    fn fetch(&self, name: &str) -> Result<Vec<u8>>;

    /// Publish `payload` under `name`, replacing any previous payload
    fn publish(&self, name: &str, payload: &[u8]) -> Result<()>;

    /// Names of all published schemas, sorted
    fn list(&self) -> Result<Vec<String>>;
}

/// In-memory registry for tests and local tooling
pub struct MemoryRegistry {
    /// Payloads by schema name
    payloads: DashMap<String, Vec<u8>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            payloads: DashMap::new(),
        }
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryClient for MemoryRegistry {
    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        self.payloads
            .get(name)
            .map(|p| p.clone())
            .ok_or_else(|| SchemaError::NotFound { name: name.to_string() })
    }

    fn publish(&self, name: &str, payload: &[u8]) -> Result<()> {
        self.payloads.insert(name.to_string(), payload.to_vec());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.payloads.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("static pattern"))
}

/// Registry backed by a directory of JSON payloads
///
/// Each schema lives in `<root>/<name>.json` next to a `<name>.json.sha256`
/// sidecar written on publish.
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    root: PathBuf,
    verify_checksums: bool,
}

impl DirectoryRegistry {
    /// Open a registry directory, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            verify_checksums: true,
        })
    }

    /// Enable or disable sidecar verification on fetch
    pub fn with_checksum_verification(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Get the root path of the registry
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn payload_path(&self, name: &str) -> Result<PathBuf> {
        if !name_pattern().is_match(name) {
            return Err(SchemaError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{}.{}", name, PAYLOAD_EXTENSION)))
    }

    fn checksum_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, CHECKSUM_EXTENSION))
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

impl RegistryClient for DirectoryRegistry {
    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.payload_path(name)?;
        if !path.is_file() {
            return Err(SchemaError::NotFound { name: name.to_string() });
        }
        let payload = fs::read(&path)?;

        let checksum_path = self.checksum_path(name);
        if self.verify_checksums && checksum_path.is_file() {
            let expected = Checksum::parse(&fs::read_to_string(&checksum_path)?);
            if !expected.verify(&payload) {
                let actual = Checksum::from_bytes(&payload);
                warn!("Checksum mismatch for {}: expected {}, got {}", name, expected, actual);
                return Err(SchemaError::ChecksumMismatch {
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }

        debug!("Fetched {} ({} bytes) from {:?}", name, payload.len(), path);
        Ok(payload)
    }

    fn publish(&self, name: &str, payload: &[u8]) -> Result<()> {
        let path = self.payload_path(name)?;
        let checksum_path = self.checksum_path(name);
        let checksum = Checksum::from_bytes(payload);

        // Both files are staged before either one replaces the published pair
        let payload_tmp = temp_path(&path);
        let checksum_tmp = temp_path(&checksum_path);
        let staged = fs::write(&payload_tmp, payload).and_then(|_| {
            fs::write(
                &checksum_tmp,
                format!("{}  {}.{}\n", checksum, name, PAYLOAD_EXTENSION),
            )
        });
        if let Err(e) = staged {
            let _ = fs::remove_file(&payload_tmp);
            let _ = fs::remove_file(&checksum_tmp);
            return Err(e.into());
        }

        fs::rename(&payload_tmp, &path)?;
        if let Err(e) = fs::rename(&checksum_tmp, &checksum_path) {
            // A stale sidecar would make every later fetch fail
            warn!("Could not replace checksum for {}: {}", name, e);
            let _ = fs::remove_file(&checksum_path);
            let _ = fs::remove_file(&checksum_tmp);
            return Err(e.into());
        }

        info!("Published {} to {:?} ({})", name, path, checksum);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().map(|e| e != PAYLOAD_EXTENSION).unwrap_or(true) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if name_pattern().is_match(stem) => names.push(stem.to_string()),
                _ => debug!("Skipping {:?}: not a valid schema name", path),
            }
        }
        names.sort();
        Ok(names)
    }
}

/// A fuzzy search hit over schema names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub name: String,
    pub score: i64,
}

/// Typed access to a registry: fetch + decode, encode + publish
pub struct SchemaStore<C> {
    client: C,
}

impl<C: RegistryClient> SchemaStore<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch and decode the schema published under `name`
    pub fn load(&self, name: &str) -> Result<Schema> {
        let payload = self.client.fetch(name)?;
        codec::decode(&payload)
    }

    /// Encode a schema and publish it under its own name
    pub fn save(&self, schema: &Schema) -> Result<()> {
        self.save_as(schema.name(), schema)
    }

    /// Encode a schema and publish it under `name`
    ///
    /// Use this to write back a schema obtained from `load(name)`: the name
    /// inside a payload does not have to match the entry it is stored under.
    pub fn save_as(&self, name: &str, schema: &Schema) -> Result<()> {
        if name != schema.name() {
            debug!("Publishing schema {} under {}", schema.name(), name);
        }
        let payload = codec::encode(schema)?;
        self.client.publish(name, &payload)
    }

    /// Names of all published schemas
    pub fn names(&self) -> Result<Vec<String>> {
        self.client.list()
    }

    /// Search schema names (fuzzy), best match first
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let matcher = SkimMatcherV2::default();
        let mut results: Vec<SearchResult> = self
            .client
            .list()?
            .into_iter()
            .filter_map(|name| {
                matcher
                    .fuzzy_match(&name, query)
                    .map(|score| SearchResult { name, score })
            })
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        results.truncate(limit);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{SchemaField, SqlHint};
    use tempfile::tempdir;

    fn sample(name: &str) -> Schema {
        Schema::new(
            name,
            vec![
                SchemaField::new(2, "flag", "bool", "", SqlHint::new("boolean")),
                SchemaField::new(1, "user", "string", "user id", SqlHint::new("varchar").with_length(64)),
            ],
        )
    }

    #[test]
    fn test_memory_round_trip() {
        let store = SchemaStore::new(MemoryRegistry::new());
        store.save(&sample("hello")).unwrap();

        let loaded = store.load("hello").unwrap();
        assert_eq!(loaded.fields(), sample("hello").fields());
        assert_eq!(loaded.sink_add_info(), Some(""));
    }

    #[test]
    fn test_memory_fetch_unknown() {
        let registry = MemoryRegistry::new();
        assert!(matches!(registry.fetch("nope"), Err(SchemaError::NotFound { .. })));
    }

    #[test]
    fn test_memory_rejects_malformed_payload() {
        let registry = MemoryRegistry::new();
        registry.publish("broken", b"{\"name\":").unwrap();
        let store = SchemaStore::new(registry);
        assert!(store.load("broken").unwrap_err().is_malformed());
    }

    #[test]
    fn test_directory_publish_writes_sidecar() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        let store = SchemaStore::new(registry);
        store.save(&sample("clicks")).unwrap();

        assert!(dir.path().join("clicks.json").is_file());
        let sidecar = fs::read_to_string(dir.path().join("clicks.json.sha256")).unwrap();
        let payload = fs::read(dir.path().join("clicks.json")).unwrap();
        assert!(Checksum::parse(&sidecar).verify(&payload));

        assert_eq!(store.load("clicks").unwrap().len(), 2);
        assert_eq!(store.names().unwrap(), vec!["clicks".to_string()]);
    }

    #[test]
    fn test_directory_detects_tampering() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        registry.publish("hello", br#"{"name":"hello","schema":[]}"#).unwrap();
        fs::write(dir.path().join("hello.json"), br#"{"name":"evil","schema":[]}"#).unwrap();

        assert!(matches!(registry.fetch("hello"), Err(SchemaError::ChecksumMismatch { .. })));

        let lenient = registry.with_checksum_verification(false);
        assert!(lenient.fetch("hello").is_ok());
    }

    #[test]
    fn test_directory_rejects_unsafe_names() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        for name in ["../escape", "", ".hidden", "a/b"] {
            assert!(matches!(registry.publish(name, b"{}"), Err(SchemaError::InvalidName(_))));
        }
    }

    #[test]
    fn test_directory_fetch_unknown() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        assert!(matches!(registry.fetch("missing"), Err(SchemaError::NotFound { .. })));
    }

    #[test]
    fn test_edit_is_written_back_to_loaded_entry() {
        let registry = MemoryRegistry::new();
        registry.publish("hello", br#"{"name":"other","schema":[]}"#).unwrap();
        let store = SchemaStore::new(registry);

        let mut schema = store.load("hello").unwrap();
        schema.add_field(SchemaField::new(1, "a", "string", "", SqlHint::new("nvarchar")));
        store.save_as("hello", &schema).unwrap();

        let reloaded = store.load("hello").unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.name(), "other");
        assert_eq!(store.names().unwrap(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_directory_list_skips_unfetchable_names() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        registry.publish("good", br#"{"name":"good","schema":[]}"#).unwrap();
        fs::write(dir.path().join("bad name.json"), br#"{"name":"bad","schema":[]}"#).unwrap();
        fs::write(dir.path().join(".hidden.json"), br#"{"name":"h","schema":[]}"#).unwrap();

        let names = registry.list().unwrap();
        assert_eq!(names, vec!["good".to_string()]);
        for name in &names {
            assert!(registry.fetch(name).is_ok());
        }
    }

    #[test]
    fn test_directory_failed_publish_keeps_previous_pair() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        let original = br#"{"name":"hello","schema":[]}"#;
        registry.publish("hello", original).unwrap();

        // Block the staged sidecar so the second publish cannot complete
        fs::create_dir(dir.path().join("hello.json.sha256.tmp")).unwrap();
        let result = registry.publish("hello", br#"{"name":"hello2","schema":[]}"#);
        assert!(matches!(result, Err(SchemaError::Io(_))));

        assert_eq!(registry.fetch("hello").unwrap(), original.to_vec());
        assert!(!dir.path().join("hello.json.tmp").exists());
    }

    #[test]
    fn test_directory_publish_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        registry.publish("hello", br#"{"name":"hello","schema":[]}"#).unwrap();
        registry.publish("hello", br#"{"name":"hello","schema":[],"sinkAddInfo":"x"}"#).unwrap();

        let mut files: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        assert_eq!(files, vec!["hello.json".to_string(), "hello.json.sha256".to_string()]);
        assert!(registry.fetch("hello").is_ok());
    }

    #[test]
    fn test_verification_can_be_forced_back_on() {
        let dir = tempdir().unwrap();
        let lenient = DirectoryRegistry::open(dir.path())
            .unwrap()
            .with_checksum_verification(false);
        lenient.publish("hello", br#"{"name":"hello","schema":[]}"#).unwrap();
        fs::write(dir.path().join("hello.json"), br#"{"name":"evil","schema":[]}"#).unwrap();
        assert!(lenient.fetch("hello").is_ok());

        let strict = lenient.clone().with_checksum_verification(true);
        assert!(matches!(strict.fetch("hello"), Err(SchemaError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_search_ranks_matches() {
        let store = SchemaStore::new(MemoryRegistry::new());
        for name in ["page_views", "clicks", "purchases"] {
            store.save(&sample(name)).unwrap();
        }

        let results = store.search("clk", 10).unwrap();
        assert_eq!(results.first().map(|r| r.name.as_str()), Some("clicks"));
        assert!(results.iter().all(|r| r.name != "page_views"));

        assert!(store.search("zzz", 10).unwrap().is_empty());
        assert_eq!(store.search("s", 1).unwrap().len(), 1);
    }
}
