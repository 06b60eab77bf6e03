//! Opportunistic key-value storage seam
//!
//! Mirrors browser local storage: string keys, string values, no versioning.
//! Implementations should never fail loudly; a store that cannot persist
//! simply forgets.

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str);

    fn remove(&mut self, key: &str);

    /// Read a `"true"`/`"false"` flag. Anything else counts as absent.
    fn get_flag(&self, key: &str) -> Option<bool> {
        let raw = self.get(key)?;
        match raw.trim() {
            "true" => Some(true),
            "false" => Some(false),
            other => {
                log::warn!("Ignoring non-boolean value {other:?} for {key}");
                None
            }
        }
    }

    fn set_flag(&mut self, key: &str, value: bool) {
        self.set(key, if value { "true" } else { "false" });
    }
}
