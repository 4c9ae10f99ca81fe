use kanban_core::KanbanResult;

/// Change to a nullable field in an update patch.
///
/// - `NoChange`: keep the current value
/// - `Set(value)`: replace it
/// - `Clear`: set it to `None`
///
/// # Example
///
/// ```
/// use kanban_domain::FieldUpdate;
///
/// let mut assignee = Some("ana".to_string());
/// FieldUpdate::Set("bruno".to_string()).apply_to(&mut assignee);
/// assert_eq!(assignee.as_deref(), Some("bruno"));
///
/// FieldUpdate::<String>::Clear.apply_to(&mut assignee);
/// assert_eq!(assignee, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    NoChange,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::NoChange)
    }

    pub fn as_ref(&self) -> FieldUpdate<&T> {
        match self {
            FieldUpdate::NoChange => FieldUpdate::NoChange,
            FieldUpdate::Set(value) => FieldUpdate::Set(value),
            FieldUpdate::Clear => FieldUpdate::Clear,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            FieldUpdate::NoChange => FieldUpdate::NoChange,
            FieldUpdate::Set(value) => FieldUpdate::Set(f(value)),
            FieldUpdate::Clear => FieldUpdate::Clear,
        }
    }

    /// Run a fallible normalization over a `Set` value. A normalization that
    /// yields `None` turns the update into `Clear`.
    pub fn try_and_then(
        self,
        f: impl FnOnce(T) -> KanbanResult<Option<T>>,
    ) -> KanbanResult<FieldUpdate<T>> {
        match self {
            FieldUpdate::Set(value) => Ok(f(value)?.into()),
            FieldUpdate::NoChange => Ok(FieldUpdate::NoChange),
            FieldUpdate::Clear => Ok(FieldUpdate::Clear),
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::KanbanError;

    #[test]
    fn test_no_change_keeps_value() {
        let mut field = Some(3);
        FieldUpdate::NoChange.apply_to(&mut field);
        assert_eq!(field, Some(3));
    }

    #[test]
    fn test_map_and_as_ref() {
        let update = FieldUpdate::Set(2);
        assert_eq!(update.as_ref(), FieldUpdate::Set(&2));
        assert_eq!(update.map(|v| v * 10), FieldUpdate::Set(20));
        assert_eq!(FieldUpdate::<i32>::Clear.map(|v| v + 1), FieldUpdate::Clear);
    }

    #[test]
    fn test_try_and_then() {
        let cleared = FieldUpdate::Set("  ".to_string())
            .try_and_then(|s| Ok((!s.trim().is_empty()).then_some(s)))
            .unwrap();
        assert_eq!(cleared, FieldUpdate::Clear);

        let failed = FieldUpdate::Set(1)
            .try_and_then(|_| Err(KanbanError::Validation("nope".to_string())));
        assert!(failed.is_err());

        let untouched = FieldUpdate::<i32>::NoChange
            .try_and_then(|_| unreachable!())
            .unwrap();
        assert_eq!(untouched, FieldUpdate::NoChange);
    }
}
