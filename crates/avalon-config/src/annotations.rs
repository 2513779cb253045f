use std::any::type_name;

use documented::{Documented, DocumentedFields};
use toml_edit::{ArrayOfTables, Decor, Item, RawString, Table};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Appends `docs` to the comment prefix of `decor`, one `#` line per doc line.
///
/// An existing prefix is kept, separated from the new lines by an empty `#` line.
pub fn append_docs_as_toml_comments(decor: &mut Decor, docs: &str) {
    let old_prefix = decor.prefix().and_then(RawString::as_str);

    let comments: String = docs
        .lines()
        .map(|l| {
            if l.is_empty() {
                "#\n".into()
            } else {
                format!("# {l}\n")
            }
        })
        .collect();

    let new_prefix = match old_prefix {
        None | Some("") => comments,
        Some(prefix) if prefix.ends_with('\n') && !prefix.trim().starts_with('#') => {
            format!("{prefix}{comments}")
        }
        Some(prefix) if prefix.ends_with('\n') => format!("{prefix}#\n{comments}"),
        Some(prefix) => format!("{prefix}\n{comments}"),
    };
    decor.set_prefix(new_prefix);
}

/// Annotates each key of `table` with the field docs of `T`.
///
/// Non-root tables also receive the container docs of `T`. Keys without a
/// matching field are left alone.
pub fn annotate_toml_table<T>(table: &mut Table, is_root: bool) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if !is_root {
        append_docs_as_toml_comments(table.decor_mut(), T::DOCS);
    }

    for (mut key_mut, value_item) in table.iter_mut() {
        let key_str = key_mut.get().to_string();
        let Ok(docs) = T::get_field_docs(&key_str) else {
            warn!(
                "Field '{}' has no documentation in '{}'",
                key_str,
                type_name::<T>()
            );
            continue;
        };

        match value_item {
            Item::None => return Err(ConfigError::UnexpectedTomlItem(key_str)),
            Item::Value(_) => append_docs_as_toml_comments(key_mut.leaf_decor_mut(), docs),
            Item::Table(sub_table) => append_docs_as_toml_comments(sub_table.decor_mut(), docs),
            Item::ArrayOfTables(array) => {
                let first_table = array
                    .iter_mut()
                    .next()
                    .ok_or_else(|| ConfigError::AnnotateFirstTable(key_str.clone()))?;
                append_docs_as_toml_comments(first_table.decor_mut(), docs);
            }
        }
    }

    Ok(())
}

/// Annotates only the first table of `array`; the rest share its shape.
pub fn annotate_toml_array_of_tables<T>(array: &mut ArrayOfTables) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if let Some(first_table) = array.iter_mut().next() {
        annotate_toml_table::<T>(first_table, false)
            .map_err(|err| ConfigError::AnnotateFirstTable(err.to_string()))?;
    }
    Ok(())
}
