#![forbid(unsafe_code)]

//! Insertion-ordered, type-checked collection of keys.

use crate::key::Key;
use samlsig_core::Error;
use std::any::Any;

/// An ordered sequence of [`Key`]s.
///
/// Duplicates are kept; callers may rely on positions.
#[derive(Debug, Clone, Default)]
pub struct KeyCollection {
    keys: Vec<Key>,
}

impl KeyCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value that must be a [`Key`].
    ///
    /// Any other type fails with `Error::InvalidArgument` and the collection
    /// is left untouched.
    pub fn add<T: Any>(&mut self, value: T) -> Result<(), Error> {
        self.add_boxed(Box::new(value))
    }

    /// Add a type-erased value that must be a [`Key`].
    pub fn add_boxed(&mut self, value: Box<dyn Any>) -> Result<(), Error> {
        match value.downcast::<Key>() {
            Ok(key) => {
                self.keys.push(*key);
                Ok(())
            }
            Err(_) => Err(Error::InvalidArgument(
                "KeyCollection only accepts Key values".into(),
            )),
        }
    }

    /// Append a key.
    pub fn push(&mut self, key: Key) {
        self.keys.push(key);
    }

    /// All keys in insertion order.
    pub fn all(&self) -> &[Key] {
        &self.keys
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.keys.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// A new collection holding the keys that match `predicate`, order kept.
    pub fn filter<P>(&self, mut predicate: P) -> KeyCollection
    where
        P: FnMut(&Key) -> bool,
    {
        self.keys.iter().filter(|k| predicate(*k)).cloned().collect()
    }
}

impl FromIterator<Key> for KeyCollection {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl Extend<Key> for KeyCollection {
    fn extend<I: IntoIterator<Item = Key>>(&mut self, iter: I) {
        self.keys.extend(iter);
    }
}

impl IntoIterator for KeyCollection {
    type Item = Key;
    type IntoIter = std::vec::IntoIter<Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl<'a> IntoIterator for &'a KeyCollection {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{loader, KeyUsage};
    use samlsig_core::algorithm;

    fn cert_key(name: &str) -> Key {
        let pem = std::fs::read(format!("../../test-data/keys/{name}.crt.pem")).unwrap();
        loader::load_x509_cert_pem(&pem, algorithm::RSA_SHA256, KeyUsage::Signing)
            .unwrap()
            .with_name(name)
    }

    #[test]
    fn non_keys_are_rejected_without_mutation() {
        let mut keys = KeyCollection::new();
        keys.push(cert_key("idp"));

        assert!(matches!(keys.add("not a key"), Err(Error::InvalidArgument(_))));
        assert!(matches!(keys.add(42u32), Err(Error::InvalidArgument(_))));
        assert!(matches!(keys.add(vec![cert_key("idp")]), Err(Error::InvalidArgument(_))));
        assert!(matches!(keys.add(Some(cert_key("idp"))), Err(Error::InvalidArgument(_))));
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn boxed_key_is_accepted() {
        let mut keys = KeyCollection::new();
        let boxed: Box<dyn Any> = Box::new(cert_key("idp"));
        keys.add_boxed(boxed).unwrap();
        assert_eq!(keys.len(), 1);

        let boxed: Box<dyn Any> = Box::new("nope");
        assert!(keys.add_boxed(boxed).is_err());
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn insertion_order_and_duplicates_are_preserved() {
        let mut keys = KeyCollection::new();
        keys.add(cert_key("idp")).unwrap();
        keys.add(cert_key("unrelated")).unwrap();
        keys.add(cert_key("idp")).unwrap();

        let names: Vec<_> = keys.iter().map(|k| k.name().unwrap()).collect();
        assert_eq!(names, ["idp", "unrelated", "idp"]);
        // Iteration restarts from the beginning.
        let again: Vec<_> = keys.all().iter().map(|k| k.name().unwrap()).collect();
        assert_eq!(names, again);
        assert_eq!(keys.get(1).and_then(Key::name), Some("unrelated"));
    }

    #[test]
    fn filter_keeps_order() {
        let keys: KeyCollection = ["idp", "unrelated", "idp-rollover"]
            .into_iter()
            .map(cert_key)
            .collect();
        let idp = keys.filter(|k| k.name().unwrap_or("").starts_with("idp"));
        let names: Vec<_> = (&idp).into_iter().map(|k| k.name().unwrap()).collect();
        assert_eq!(names, ["idp", "idp-rollover"]);
        assert_eq!(keys.len(), 3);
    }
}
