#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolymerKind {
    Protein,
    Nucleic,
    Other,
}

/// Entity classification as recorded in mmCIF `entity.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Polymer(PolymerKind),
    Branched,
    NonPolymer,
    Water,
}

impl EntityType {
    pub fn is_polymer(self) -> bool {
        matches!(self, Self::Polymer(_))
    }
}
