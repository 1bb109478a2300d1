//! Index keys for entries in the model registry.
use itertools::Itertools;
use std::fmt;
use std::rc::Rc;

/// A single element of an index tuple (e.g. a generator ID or a timepoint)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexElement {
    /// A string label, such as a load zone or generation project ID
    Label(Rc<str>),
    /// A numeric label, such as a timepoint, day or period
    Number(u32),
}

impl fmt::Display for IndexElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => write!(f, "{label}"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// The index of an entry within a registry block (e.g. `(g, t)` for `DispatchGen[g, t]`)
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexKey(Vec<IndexElement>);

impl IndexKey {
    /// Create a new [`IndexKey`] from its elements
    pub fn new(elements: Vec<IndexElement>) -> Self {
        Self(elements)
    }

    /// The number of elements in the key
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key has no elements
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the elements of the key
    pub fn iter(&self) -> impl Iterator<Item = &IndexElement> {
        self.0.iter()
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

/// Build an [`IndexKey`] from anything which converts into an [`IndexElement`]
macro_rules! index_key {
    ($($element:expr),* $(,)?) => {
        $crate::registry::IndexKey::new(vec![
            $($crate::registry::IndexElement::from($element)),*
        ])
    };
}
pub(crate) use index_key;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_zone::ZoneID;
    use crate::timescale::TimepointID;

    #[test]
    fn test_index_key_display() {
        let zone: ZoneID = "North".into();
        let key = index_key!(&zone, TimepointID(3));
        assert_eq!(key.to_string(), "[North, 3]");
        assert_eq!(key.len(), 2);
    }

    #[test]
    fn test_index_key_equality() {
        let zone: ZoneID = "North".into();
        assert_eq!(index_key!(&zone, TimepointID(3)), index_key!(&zone, TimepointID(3)));
        assert_ne!(index_key!(&zone, TimepointID(3)), index_key!(&zone, TimepointID(4)));
    }
}
