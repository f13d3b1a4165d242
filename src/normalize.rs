//! Raw provider record -> `Item`

use serde_json::Value;

use crate::state::{Item, ItemStat};

/// Image reference used when a record carries no usable artwork.
pub const FALLBACK_IMAGE: &str = "placeholder.png";

const IMAGE_POINTERS: [&str; 2] = [
    "/sprites/other/official-artwork/front_default",
    "/sprites/front_default",
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("record missing")]
    Missing,
    #[error("record has no valid id")]
    InvalidId,
    #[error("record {id} has no name")]
    MissingName { id: u32 },
    #[error("record {id} has no usable type")]
    MissingTypes { id: u32 },
}

/// Turn one detail record into an `Item`, or report why it was dropped.
pub fn normalize(raw: Option<&Value>) -> Result<Item, NormalizeError> {
    let raw = raw.ok_or(NormalizeError::Missing)?;

    let id = raw
        .get("id")
        .and_then(Value::as_u64)
        .filter(|id| *id > 0)
        .and_then(|id| u32::try_from(id).ok())
        .ok_or(NormalizeError::InvalidId)?;

    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(NormalizeError::MissingName { id })?
        .to_string();

    let types = slot_names(raw, "types", "type");
    if types.is_empty() {
        return Err(NormalizeError::MissingTypes { id });
    }

    Ok(Item {
        id,
        name,
        image_ref: image_ref(raw),
        types,
        abilities: slot_names(raw, "abilities", "ability"),
        stats: stats(raw),
        height: unsigned(raw.get("height")),
        weight: unsigned(raw.get("weight")),
    })
}

fn image_ref(raw: &Value) -> String {
    IMAGE_POINTERS
        .iter()
        .find_map(|pointer| pointer_string(raw, pointer))
        .unwrap_or_else(|| FALLBACK_IMAGE.to_string())
}

/// `[{"slot": n, "<inner>": {"name": ..}}, ..]` -> names ordered by slot,
/// skipping entries without a string name. Entries without a slot keep their
/// array order after the slotted ones.
fn slot_names(raw: &Value, list: &str, inner: &str) -> Vec<String> {
    let Some(entries) = raw.get(list).and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut named: Vec<(u64, &str)> = entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get(inner)?.get("name")?.as_str()?;
            let slot = entry.get("slot").and_then(Value::as_u64).unwrap_or(u64::MAX);
            Some((slot, name))
        })
        .filter(|(_, name)| !name.is_empty())
        .collect();
    named.sort_by_key(|(slot, _)| *slot);
    named.into_iter().map(|(_, name)| name.to_string()).collect()
}

fn stats(raw: &Value) -> Vec<ItemStat> {
    let Some(entries) = raw.get("stats").and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("stat")?.get("name")?.as_str()?;
            let value = entry.get("base_stat")?.as_u64()?;
            if name.is_empty() {
                return None;
            }
            Some(ItemStat {
                name: name.to_string(),
                value: u32::try_from(value).ok()?,
            })
        })
        .collect()
}

fn unsigned(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

fn pointer_string(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
