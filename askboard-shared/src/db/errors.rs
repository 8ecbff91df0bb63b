/// Classification of PostgreSQL constraint failures
///
/// Write paths lean on the schema's constraints rather than checking first,
/// so callers need to tell "row already exists" and "referenced row is
/// missing" apart from genuine storage failures.

/// Constraint failures the application reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// A unique constraint rejected the write
    Unique(Option<String>),

    /// A foreign key pointed at a row that does not exist
    ForeignKey(Option<String>),
}

impl ConstraintViolation {
    /// Name of the violated constraint, when the server reported one
    pub fn constraint(&self) -> Option<&str> {
        match self {
            ConstraintViolation::Unique(name) | ConstraintViolation::ForeignKey(name) => {
                name.as_deref()
            }
        }
    }
}

/// Inspects an error for a unique or foreign-key violation
///
/// Returns `None` for every other error, including non-database ones.
pub fn constraint_violation(err: &sqlx::Error) -> Option<ConstraintViolation> {
    let db_err = err.as_database_error()?;
    let name = db_err.constraint().map(str::to_string);

    if db_err.is_unique_violation() {
        Some(ConstraintViolation::Unique(name))
    } else if db_err.is_foreign_key_violation() {
        Some(ConstraintViolation::ForeignKey(name))
    } else {
        None
    }
}

/// True if `err` is a unique-constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(constraint_violation(err), Some(ConstraintViolation::Unique(_)))
}
