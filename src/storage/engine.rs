use crate::core::{Entity, ImpexError, Result, Value};

/// Query port onto the backing store.
///
/// Instance loaders and relational widgets only ever need these two
/// lookups, so any backend that can answer them can sit behind an import.
pub trait Repository: Send + Sync {
    /// All entities of `model` whose attributes equal every `(name, value)` pair.
    fn filter(&self, model: &str, params: &[(String, Value)]) -> Result<Vec<Entity>>;

    /// All entities of `model` whose `field` is one of `keys`.
    fn filter_in(&self, model: &str, field: &str, keys: &[Value]) -> Result<Vec<Entity>>;

    /// Zero-or-one lookup. More than one match is an error, not a choice.
    fn get(&self, model: &str, params: &[(String, Value)]) -> Result<Option<Entity>> {
        let mut found = self.filter(model, params)?;
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            _ => Err(ImpexError::MultipleObjectsReturned {
                model: model.to_string(),
                params: describe_params(params),
            }),
        }
    }
}

pub(crate) fn describe_params(params: &[(String, Value)]) -> String {
    params
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}
