use std::fmt;

/// Stable identifier of an element across frames.
///
/// Explicit ids are hashed from a label, so the same label yields the same id
/// every frame. Anonymous elements get ids derived from their parent id and
/// sibling position. The zero value is reserved and never produced by hashing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ElementId(u32);

impl ElementId {
    pub const NONE: ElementId = ElementId(0);

    pub const fn new(label: &str) -> Self {
        Self(hash_label(label, 0))
    }

    /// Id for the `index`-th item of a repeated element, e.g. list rows.
    pub const fn indexed(label: &str, index: u32) -> Self {
        Self(hash_label(label, index))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub(crate) const fn child_of(parent: ElementId, sibling_index: u32) -> Self {
        Self(mix(parent.0 ^ 0x5bd1_e995, sibling_index))
    }

    /// Id of a synthetic command owned by this element (scissor, separators).
    pub(crate) const fn derived(self, number: u32) -> Self {
        Self(mix(self.0, number))
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({:#010x})", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

// Jenkins one-at-a-time.
const fn hash_label(label: &str, offset: u32) -> u32 {
    let bytes = label.as_bytes();
    let mut hash: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        hash = hash.wrapping_add(bytes[i] as u32);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
        i += 1;
    }
    mix(hash, offset)
}

const fn mix(base: u32, number: u32) -> u32 {
    let mut hash = base.wrapping_add(number);
    hash = hash.wrapping_add(hash << 10);
    hash ^= hash >> 6;
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);
    // 0 is the null id
    match hash.wrapping_add(1) {
        0 => 1,
        hash => hash,
    }
}

#[cfg(test)]
mod tests {
    use super::ElementId;

    #[test]
    fn labels_hash_deterministically() {
        assert_eq!(ElementId::new("sidebar"), ElementId::new("sidebar"));
        assert_ne!(ElementId::new("sidebar"), ElementId::new("content"));
    }

    #[test]
    fn indexed_ids_differ_per_index() {
        let a = ElementId::indexed("row", 0);
        let b = ElementId::indexed("row", 1);
        assert_ne!(a, b);
        assert_eq!(ElementId::indexed("row", 0), ElementId::new("row"));
    }

    #[test]
    fn hashing_never_yields_the_null_id() {
        assert!(!ElementId::new("").is_none());
        let parent = ElementId::new("list");
        for i in 0..64 {
            assert!(!ElementId::child_of(parent, i).is_none());
        }
    }

    #[test]
    fn derived_ids_do_not_collide_with_owner() {
        let owner = ElementId::new("panel");
        assert_ne!(owner.derived(10), owner);
        assert_ne!(owner.derived(10), owner.derived(11));
    }
}
