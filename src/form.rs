use serde::Serialize;

/// Ordered `application/x-www-form-urlencoded` request body.
///
/// Setting an existing key replaces its value in place, so the caller's field
/// order survives the credential and CSRF merges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormBody(Vec<(String, String)>);

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `key`, overwriting the value if it is already present.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Builder form of [`Self::set`].
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Adds a boolean field, rendered as `True`/`False`.
    #[must_use]
    pub fn flag(self, key: impl Into<String>, value: bool) -> Self {
        self.field(key, if value { "True" } else { "False" })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<K, V> FromIterator<(K, V)> for FormBody
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (key, value) in iter {
            form.set(key, value);
        }
        form
    }
}
