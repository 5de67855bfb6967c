use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// The algorithms available to compute a cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum CoverMethod {
    /// Incremental search through an optimization oracle.
    Optimization,
    /// Compatibility graph construction followed by a clique cover.
    Cliques,
}
