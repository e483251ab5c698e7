//! Config-field glue: raw TOML values in, string arrays out

use crate::block::BlockList;
use crate::entity::EntityList;
use crate::lazy::LazyRegistryEntryList;
use crate::registry_list::RegistryEntryList;
use crate::report::FieldContext;
use crate::value_list::RegistryEntryValueList;
use crate::ListError;

/// Lists that persist as an ordered array of lines
pub trait StringList {
    fn to_string_list(&self) -> Vec<String>;
}

macro_rules! impl_string_list {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StringList for $ty {
                fn to_string_list(&self) -> Vec<String> {
                    <$ty>::to_string_list(self)
                }
            }
        )*
    };
}

impl_string_list!(
    BlockList,
    RegistryEntryList,
    LazyRegistryEntryList,
    RegistryEntryValueList,
);

impl<C: Clone + PartialEq> StringList for EntityList<C> {
    fn to_string_list(&self) -> Vec<String> {
        EntityList::to_string_list(self)
    }
}

/// A named list field: a default value plus whatever was loaded over it
#[derive(Debug, Clone)]
pub struct ListField<L> {
    ctx: FieldContext,
    default: L,
    value: Option<L>,
}

impl<L: StringList> ListField<L> {
    pub fn new(ctx: FieldContext, default: L) -> Self {
        ListField {
            ctx,
            default,
            value: None,
        }
    }

    pub fn key(&self) -> &str {
        self.ctx.key()
    }

    pub fn context(&self) -> &FieldContext {
        &self.ctx
    }

    /// Loaded value, or the default when nothing was loaded
    pub fn get(&self) -> &L {
        self.value.as_ref().unwrap_or(&self.default)
    }

    pub fn default_value(&self) -> &L {
        &self.default
    }

    /// Load the field from its raw config value
    ///
    /// A missing value keeps the default. Arrays are read element by element
    /// and a lone string is read as one line. Anything else is reported and
    /// replaced with the default.
    pub fn load<F>(&mut self, raw: Option<&toml::Value>, parse: F) -> Result<(), ListError>
    where
        F: FnOnce(&FieldContext, &[String]) -> Result<L, ListError>,
    {
        self.value = match raw {
            None => None,
            Some(raw) => match parse_string_list(&self.ctx, raw) {
                Some(lines) => Some(parse(&self.ctx, &lines)?),
                None => None,
            },
        };
        Ok(())
    }

    /// Current value as a TOML string array
    pub fn to_toml(&self) -> toml::Value {
        toml::Value::Array(
            self.get()
                .to_string_list()
                .into_iter()
                .map(toml::Value::String)
                .collect(),
        )
    }
}

/// Read the lines of a list from a raw TOML value
///
/// Returns `None` when the value cannot hold a list at all.
pub fn parse_string_list(ctx: &FieldContext, raw: &toml::Value) -> Option<Vec<String>> {
    match raw {
        toml::Value::String(line) => Some(vec![line.clone()]),
        toml::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    toml::Value::String(line) => Some(line.clone()),
                    other => {
                        ctx.warn("Invalid list element! Deleting element", &other.to_string());
                        None
                    }
                })
                .collect(),
        ),
        other => {
            ctx.warn(
                "Invalid value! Expected a list of strings. Replacing with default value",
                &other.to_string(),
            );
            None
        }
    }
}

/// Explanation of the line format shared by value lists, for field comments
pub fn value_list_description() -> Vec<String> {
    [
        "List entries are in the format \"namespace:registry_name value1 value2 ...\".",
        "  Tags may be used as \"#namespace:path value1 value2 ...\".",
        "  Every entry in a namespace may be matched with \"namespace:* value1 value2 ...\".",
        "  Entries not matched by anything else may be given \"default value1 value2 ...\".",
        "  When several entries apply, exact entries are used first, then tags, then namespaces, then the default.",
        "  Entity entries also apply to subtypes; prefix with \"~\" (e.g. \"~minecraft:zombie\") to match only that type.",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect()
}
