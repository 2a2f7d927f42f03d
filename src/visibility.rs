//! Visibility evaluator.
//! Pure functions of the schema and the current form state.

use crate::form::FormState;
use crate::schema::{FieldDescriptor, Schema};

/// A field without a clause is always visible; otherwise the value of its
/// dependency must be one of the allowed values. An unset dependency hides it.
pub fn is_visible(field: &FieldDescriptor, values: &FormState) -> bool {
    match &field.visibility {
        None => true,
        Some(vis) => values
            .get(&vis.depends_on)
            .is_some_and(|current| vis.allows(current)),
    }
}

/// Fields that are active for the given state, in schema order.
pub fn visible_fields<'a>(
    schema: &'a Schema,
    values: &'a FormState,
) -> impl Iterator<Item = &'a FieldDescriptor> + 'a {
    schema.fields().iter().filter(move |f| is_visible(f, values))
}
