use vrkit_common::EntityId;

/// Keys that have a null-equivalent value collections must ignore.
pub trait NullEquivalent {
    fn is_null_equivalent(&self) -> bool;
}

impl<T> NullEquivalent for Option<T> {
    fn is_null_equivalent(&self) -> bool {
        self.is_none()
    }
}

impl NullEquivalent for EntityId {
    fn is_null_equivalent(&self) -> bool {
        self.is_nil()
    }
}

impl NullEquivalent for String {
    fn is_null_equivalent(&self) -> bool {
        self.is_empty()
    }
}

impl NullEquivalent for &str {
    fn is_null_equivalent(&self) -> bool {
        self.is_empty()
    }
}
