/// Index-addressed entity identifiers.
///
/// The original model tangles tasks, categories and physicians together
/// through back-references; per DESIGN.md we flatten that into arena
/// tables keyed by these small integer ids, so `y`'s key is a 4-tuple of
/// cheap-to-hash values instead of a graph of `Rc`/`RefCell`.
macro_rules! index_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

index_id!(CategoryId);
index_id!(TaskId);
index_id!(PhysicianId);
