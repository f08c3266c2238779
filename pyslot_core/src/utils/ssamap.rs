use std::{convert::TryFrom, marker::PhantomData};

type SSAKey = usize;

/// A write-once arena keyed by dense indices.
///
/// Slots may be skipped (left vacant) to pin later insertions to fixed keys,
/// but a key, once written, is never rewritten or removed.
#[derive(Debug, Clone)]
pub struct SSAMap<K, V> {
    inner: Vec<Option<V>>,
    _k: PhantomData<fn() -> K>,
}

impl<K, V> Default for SSAMap<K, V>
where
    K: TryFrom<SSAKey> + Into<SSAKey>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SSAMap<K, V>
where
    K: TryFrom<SSAKey> + Into<SSAKey>,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: vec![],
            _k: PhantomData,
        }
    }

    /// The key the next insertion will be given.
    #[inline]
    pub fn next_free(&self) -> SSAKey {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.iter().all(Option::is_none)
    }

    /// Number of occupied keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.iter().filter(|v| v.is_some()).count()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.inner.iter().enumerate().filter_map(|(idx, value)| {
            value
                .as_ref()
                .and_then(|v| K::try_from(idx).ok().map(|k| (k, v)))
        })
    }

    /// Leave every key up to (but excluding) `pos` vacant.
    ///
    /// Fails with the current position if it is already past `pos`.
    #[inline]
    pub fn skip_to_nth(&mut self, pos: SSAKey) -> Result<(), SSAKey> {
        let current = self.next_free();

        if pos < current {
            Err(current)
        } else {
            self.inner.resize_with(pos, || None);
            Ok(())
        }
    }

    #[inline]
    pub fn insert(&mut self, value: impl Into<V>) -> Result<K, <K as TryFrom<SSAKey>>::Error> {
        let key = K::try_from(self.next_free())?;
        self.inner.push(Some(value.into()));
        Ok(key)
    }

    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        self.get_raw(key.into())
    }

    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.get_raw_mut(key.into())
    }

    #[inline]
    pub fn get_raw(&self, key: SSAKey) -> Option<&V> {
        self.inner.get(key)?.as_ref()
    }

    #[inline]
    pub fn get_raw_mut(&mut self, key: SSAKey) -> Option<&mut V> {
        self.inner.get_mut(key)?.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeId;

    #[test]
    fn skipped_keys_stay_vacant() {
        let mut map = SSAMap::<TypeId, &str>::new();

        assert!(map.insert("zero").is_err(), "TypeId cannot be zero");
        map.skip_to_nth(4).unwrap();

        let k = map.insert("four").unwrap();
        assert_eq!(usize::from(k), 4);
        assert_eq!(map.get(k), Some(&"four"));
        assert_eq!(map.get_raw(2), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn cannot_skip_backwards() {
        let mut map = SSAMap::<TypeId, u8>::new();
        map.skip_to_nth(10).unwrap();
        map.insert(1).unwrap();
        assert_eq!(map.skip_to_nth(3), Err(11));
    }

    #[test]
    fn iter_yields_keys_in_order() {
        let mut map = SSAMap::<TypeId, u8>::new();
        map.skip_to_nth(1).unwrap();
        map.insert(1).unwrap();
        map.skip_to_nth(5).unwrap();
        map.insert(5).unwrap();

        let keys: Vec<usize> = map.iter().map(|(k, _)| k.into()).collect();
        assert_eq!(keys, vec![1, 5]);
    }
}
