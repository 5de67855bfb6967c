use std::fmt::Display;

const LEAF_PREFIX: &str = "el";
const INTERNAL_PREFIX: &str = "e";

/// The boolean variable bound to an event.
///
/// The variable name is derived from the event identifier and its leaf status:
/// leaf events are named `el<id>` while other events are named `e<id>`.
/// The same event thus always maps to the same variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventVar {
    event_id: usize,
    leaf: bool,
}

impl EventVar {
    /// Builds the variable for an event.
    pub fn new(event_id: usize, leaf: bool) -> Self {
        Self { event_id, leaf }
    }

    /// Returns the identifier of the event.
    pub fn event_id(&self) -> usize {
        self.event_id
    }

    /// Returns `true` iff the event is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Returns the name of the variable.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Recovers an event variable from its name.
    ///
    /// Returns `None` if the name does not follow the event variable naming scheme.
    ///
    /// # Example
    ///
    /// ```
    /// # use escover::formula::EventVar;
    /// assert_eq!(Some(EventVar::new(3, true)), EventVar::from_name("el3"));
    /// assert_eq!(Some(EventVar::new(3, false)), EventVar::from_name("e3"));
    /// assert_eq!(None, EventVar::from_name("elephant"));
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let (leaf, digits) = if let Some(d) = name.strip_prefix(LEAF_PREFIX) {
            (true, d)
        } else if let Some(d) = name.strip_prefix(INTERNAL_PREFIX) {
            (false, d)
        } else {
            return None;
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<usize>().ok().map(|id| Self::new(id, leaf))
    }
}

impl Display for EventVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = if self.leaf {
            LEAF_PREFIX
        } else {
            INTERNAL_PREFIX
        };
        write!(f, "{}{}", prefix, self.event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!("el12", EventVar::new(12, true).name());
        assert_eq!("e12", EventVar::new(12, false).name());
    }

    #[test]
    fn test_from_name_rejects_malformed() {
        assert_eq!(None, EventVar::from_name("el"));
        assert_eq!(None, EventVar::from_name("e"));
        assert_eq!(None, EventVar::from_name("x1"));
        assert_eq!(None, EventVar::from_name("el-1"));
        assert_eq!(None, EventVar::from_name("el1a"));
    }

    #[test]
    fn test_name_is_stable() {
        let v = EventVar::new(42, true);
        assert_eq!(Some(v), EventVar::from_name(&v.name()));
    }
}
