//! Interned element identifiers.
//!
//! BPMN documents reference elements by their `id` attribute everywhere:
//! diagram-interchange records point at semantic elements, planes point at
//! their root, live nodes are registered under the id of the element they
//! render. [`Id`] interns those strings once so that they are `Copy` and
//! cheap to compare and hash.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by every [`Id`].
///
/// # Thread Safety
///
/// Access goes through a `Mutex`; identifiers may be created from any thread.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Identifier of a semantic element, DI element, plane or diagram.
///
/// # Examples
///
/// ```
/// use subplane_core::identifier::Id;
///
/// let task = Id::new("Task_1");
/// let di = task.with_suffix("_di");
///
/// assert_eq!(task, "Task_1");
/// assert_eq!(di, "Task_1_di");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from its string form.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Derives a new identifier by appending `suffix` to this one.
    ///
    /// Used for ids the engine fabricates from an element id, such as the
    /// `_label` node of an element or the `_di` record of a shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use subplane_core::identifier::Id;
    ///
    /// let label = Id::new("StartEvent_1").with_suffix("_label");
    /// assert_eq!(label, "StartEvent_1_label");
    /// ```
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let mut interner = interner();
        let base = interner
            .resolve(self.0)
            .expect("Base ID should exist in interner");
        let derived = format!("{base}{suffix}");
        Self(interner.get_or_intern(&derived))
    }

    /// Prepends `prefix` to this identifier.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let mut interner = interner();
        let base = interner
            .resolve(self.0)
            .expect("Base ID should exist in interner");
        let derived = format!("{prefix}{base}");
        Self(interner.get_or_intern(&derived))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f.write_str(value)
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Compares against the string form: `id == "Task_1"`.
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner
            .resolve(self.0)
            .is_some_and(|value| value == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
