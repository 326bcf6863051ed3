//! Completion outputs.
//!
//! When the intro finishes, a ready flag is written to the session store and
//! the follow-on view is requested once. The flag records that the intro has
//! played in this login session; later runs in the same session read it to
//! skip straight ahead. It lives in the runtime dir, which is cleared at
//! logout, or in memory when there is none.
//! Navigation is best effort: a failure is logged and not retried.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::error::{NavigationError, SessionError};

const APP_NAME: &str = "particle-globe";

/// Value written under the flag key.
pub const FLAG_SET: &str = "true";

/// String key/value storage scoped to a session.
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
}

/// Moves the user on to another view.
pub trait Navigator {
    fn navigate(&mut self, target: &str) -> Result<(), NavigationError>;
}

/// `<runtime dir>/particle-globe/session.json`
fn session_path_in(runtime_dir: Option<PathBuf>) -> Option<PathBuf> {
    runtime_dir.map(|dir| dir.join(APP_NAME).join("session.json"))
}

/// Where the ready flag is kept for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

impl StoreLocation {
    /// Pick the store for a run.
    ///
    /// An explicit path always wins unless `ephemeral` is set. Without one,
    /// headless runs stay in memory so an offline render never marks the
    /// intro as played, and windowed runs use the runtime dir.
    pub fn choose(
        explicit: Option<PathBuf>,
        ephemeral: bool,
        headless: bool,
        runtime_dir: Option<PathBuf>,
    ) -> Self {
        if ephemeral {
            return StoreLocation::Memory;
        }
        let path = match explicit {
            Some(path) => Some(path),
            None if headless => None,
            None => session_path_in(runtime_dir),
        };
        path.map_or(StoreLocation::Memory, StoreLocation::File)
    }

    /// [`StoreLocation::choose`] against this platform's runtime dir.
    pub fn resolve(explicit: Option<PathBuf>, ephemeral: bool, headless: bool) -> Self {
        Self::choose(explicit, ephemeral, headless, dirs::runtime_dir())
    }

    pub fn open(self) -> Box<dyn SessionStore> {
        match self {
            StoreLocation::File(path) => {
                info!("session file: {}", path.display());
                Box::new(FileSessionStore::new(path))
            }
            StoreLocation::Memory => {
                info!("session flag kept in memory");
                Box::new(MemorySessionStore::new())
            }
        }
    }
}

/// Session store persisted as a JSON object.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&entries)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory store. Clones share entries.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Records the requested view so the launcher can open it after the window
/// closes. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct HandoffNavigator {
    target: Rc<RefCell<Option<String>>>,
}

impl HandoffNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The view requested so far, if any.
    pub fn target(&self) -> Option<String> {
        self.target.borrow().clone()
    }
}

impl Navigator for HandoffNavigator {
    fn navigate(&mut self, target: &str) -> Result<(), NavigationError> {
        let mut slot = self.target.borrow_mut();
        if let Some(existing) = slot.as_deref() {
            if existing != target {
                return Err(NavigationError::Unavailable {
                    target: target.to_string(),
                    reason: format!("already handed off to {existing}"),
                });
            }
        }
        *slot = Some(target.to_string());
        Ok(())
    }
}

/// Navigator that only logs. Used for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&mut self, target: &str) -> Result<(), NavigationError> {
        info!(view = target, "navigate");
        Ok(())
    }
}

/// Runs the completion outputs at most once.
pub struct Completion {
    store: Box<dyn SessionStore>,
    navigator: Box<dyn Navigator>,
    flag_key: String,
    next_view: String,
    done: bool,
}

impl Completion {
    pub fn new(
        config: &SessionConfig,
        store: Box<dyn SessionStore>,
        navigator: Box<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            navigator,
            flag_key: config.flag_key.clone(),
            next_view: config.next_view.clone(),
            done: false,
        }
    }

    /// Whether a previous run already set the ready flag.
    pub fn already_loaded(&self) -> bool {
        match self.store.get(&self.flag_key) {
            Ok(value) => value.as_deref() == Some(FLAG_SET),
            Err(e) => {
                warn!("could not read session flag {}: {e}", self.flag_key);
                false
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Set the flag, then navigate. Returns `false` if it already ran.
    pub fn complete(&mut self) -> bool {
        if self.done {
            return false;
        }
        self.done = true;

        if let Err(e) = self.store.set(&self.flag_key, FLAG_SET) {
            warn!("failed to set session flag {}: {e}", self.flag_key);
        }
        self.navigate();
        true
    }

    /// Skip the intro: the flag is already set, so only navigate.
    pub fn skip(&mut self) -> bool {
        if self.done {
            return false;
        }
        self.done = true;
        self.navigate();
        true
    }

    fn navigate(&mut self) {
        match self.navigator.navigate(&self.next_view) {
            Ok(()) => info!("handing off to {}", self.next_view),
            Err(e) => warn!("navigation failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, SessionError> {
            Err(std::io::Error::other("unavailable").into())
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), SessionError> {
            Err(std::io::Error::other("unavailable").into())
        }
    }

    fn completion(store: Box<dyn SessionStore>, nav: HandoffNavigator) -> Completion {
        Completion::new(&SessionConfig::default(), store, Box::new(nav))
    }

    #[test]
    fn test_completes_once() {
        let store = MemorySessionStore::new();
        let nav = HandoffNavigator::new();
        let mut c = completion(Box::new(store.clone()), nav.clone());

        assert!(!c.already_loaded());
        assert!(c.complete());
        assert!(!c.complete());
        assert!(c.is_done());
        assert_eq!(
            store.get("afraica-loaded").unwrap().as_deref(),
            Some(FLAG_SET)
        );
        assert_eq!(nav.target().as_deref(), Some("./main.html"));
    }

    #[test]
    fn test_navigation_still_happens_when_flag_write_fails() {
        let nav = HandoffNavigator::new();
        let mut c = completion(Box::new(BrokenStore), nav.clone());
        assert!(!c.already_loaded());
        assert!(c.complete());
        assert_eq!(nav.target().as_deref(), Some("./main.html"));
    }

    #[test]
    fn test_handoff_rejects_a_second_target() {
        let mut nav = HandoffNavigator::new();
        nav.navigate("./main.html").unwrap();
        nav.navigate("./main.html").unwrap();
        assert!(nav.navigate("./other.html").is_err());
        assert_eq!(nav.target().as_deref(), Some("./main.html"));
    }

    #[test]
    fn test_file_store_round_trips_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let mut store = FileSessionStore::new(&path);

        assert_eq!(store.get("afraica-loaded").unwrap(), None);
        store.set("other", "1").unwrap();
        store.set("afraica-loaded", FLAG_SET).unwrap();

        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.get("afraica-loaded").unwrap().as_deref(), Some("true"));
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_corrupt_file_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        let store = FileSessionStore::new(&path);
        assert!(matches!(store.get("k"), Err(SessionError::Format(_))));
    }

    #[test]
    fn test_already_loaded_reads_flag() {
        let mut store = MemorySessionStore::new();
        store.set("afraica-loaded", FLAG_SET).unwrap();
        let c = completion(Box::new(store), HandoffNavigator::new());
        assert!(c.already_loaded());
    }

    #[test]
    fn test_skip_navigates_without_writing() {
        let store = MemorySessionStore::new();
        let nav = HandoffNavigator::new();
        let mut c = completion(Box::new(store.clone()), nav.clone());
        assert!(c.skip());
        assert!(!c.complete());
        assert_eq!(store.get("afraica-loaded").unwrap(), None);
        assert_eq!(nav.target().as_deref(), Some("./main.html"));
    }

    #[test]
    fn test_default_store_lives_in_runtime_dir() {
        let runtime = PathBuf::from("/run/user/1000");
        assert_eq!(
            StoreLocation::choose(None, false, false, Some(runtime)),
            StoreLocation::File(PathBuf::from("/run/user/1000/particle-globe/session.json"))
        );
        assert_eq!(
            StoreLocation::choose(None, false, false, None),
            StoreLocation::Memory
        );
    }

    #[test]
    fn test_headless_runs_default_to_memory() {
        let runtime = Some(PathBuf::from("/run/user/1000"));
        assert_eq!(
            StoreLocation::choose(None, false, true, runtime.clone()),
            StoreLocation::Memory
        );
        let explicit = PathBuf::from("/tmp/render-session.json");
        assert_eq!(
            StoreLocation::choose(Some(explicit.clone()), false, true, runtime.clone()),
            StoreLocation::File(explicit.clone())
        );
        assert_eq!(
            StoreLocation::choose(Some(explicit), true, false, runtime),
            StoreLocation::Memory
        );
    }

    #[test]
    fn test_memory_store_forgets_between_runs() {
        let mut first = StoreLocation::Memory.open();
        first.set("afraica-loaded", FLAG_SET).unwrap();
        let second = StoreLocation::Memory.open();
        assert_eq!(second.get("afraica-loaded").unwrap(), None);
    }
}
