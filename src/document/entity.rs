use super::ids::EntityId;
use super::solid::Solid;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A single I/O connection from one entity to another.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub output: String,
    pub target: String,
    pub input: String,
}

impl Output {
    pub fn new(output: impl Into<String>, target: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            target: target.into(),
            input: input.into(),
        }
    }
}

/// A point or brush entity. Keys are matched case-insensitively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub classname: SmolStr,
    pub keys: Vec<(SmolStr, String)>,
    pub fixup: Vec<(SmolStr, String)>,
    pub outputs: Vec<Output>,
    pub solids: Vec<Solid>,
}

impl Entity {
    /// Create a detached entity; the document assigns the real id on insertion.
    pub fn new(classname: impl Into<SmolStr>) -> Self {
        Entity {
            id: EntityId(0),
            classname: classname.into(),
            keys: Vec::new(),
            fixup: Vec::new(),
            outputs: Vec::new(),
            solids: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_fixup(mut self, key: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.fixup.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some((_, v)) => *v = value,
            None => self.fixup.push((key, value)),
        }
        self
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn set(&mut self, key: impl Into<SmolStr>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        for (k, v) in &mut self.keys {
            if k.eq_ignore_ascii_case(&key) {
                *v = value;
                return;
            }
        }
        self.keys.push((key, value));
    }

    pub fn fixup(&self, key: &str) -> Option<&str> {
        self.fixup
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn targetname(&self) -> &str {
        self.get_or("targetname", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut ent = Entity::new("func_instance").with_key("TargetName", "marker_1");
        assert_eq!(ent.get("targetname"), Some("marker_1"));
        assert_eq!(ent.targetname(), "marker_1");

        ent.set("TARGETNAME", "marker_2");
        assert_eq!(ent.keys.len(), 1);
        assert_eq!(ent.targetname(), "marker_2");
        assert_eq!(ent.get_or("angles", "0 0 0"), "0 0 0");
    }

    #[test]
    fn test_fixup_values() {
        let ent = Entity::new("func_instance")
            .with_fixup("$connectioncount", "1")
            .with_fixup("$ConnectionCount", "0");
        assert_eq!(ent.fixup.len(), 1);
        assert_eq!(ent.fixup("$connectioncount"), Some("0"));
    }
}
