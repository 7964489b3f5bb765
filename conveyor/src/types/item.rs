use std::fmt;

/// Position of an item in the production order, starting at 1.
pub type Sequence = u64;

/// The two kinds of items the producers emit.
///
/// Exactly one producer exists per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    First,
    Second,
}

impl ItemKind {
    /// Every kind, in the order producers are spawned.
    pub const ALL: [ItemKind; 2] = [ItemKind::First, ItemKind::Second];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::First => "first",
            ItemKind::Second => "second",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a transformer, in `0..transformers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformerId(u16);

impl TransformerId {
    pub fn new(id: u16) -> Self {
        Self(id)
    }
}

impl fmt::Display for TransformerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of work flowing through both stages.
///
/// Items are created unlabeled by a producer and receive the identifier of the transformer that
/// moved them from stage A to stage B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
    pub sequence: Sequence,
    pub kind: ItemKind,
    pub label: Option<TransformerId>,
}

impl Item {
    pub fn new(sequence: Sequence, kind: ItemKind) -> Self {
        Self {
            sequence,
            kind,
            label: None,
        }
    }

    /// Returns the item labeled with `id`.
    ///
    /// An item is relabeled exactly once on its way through the pipeline.
    pub fn relabel(self, id: TransformerId) -> Self {
        debug_assert!(self.label.is_none(), "item {} relabeled twice", self.sequence);

        Self {
            label: Some(id),
            ..self
        }
    }

    pub fn is_labeled(&self) -> bool {
        self.label.is_some()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            Some(label) => write!(f, "#{} ({}, transformer {label})", self.sequence, self.kind),
            None => write!(f, "#{} ({})", self.sequence, self.kind),
        }
    }
}
