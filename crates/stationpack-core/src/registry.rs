use crate::id::*;
use crate::spec::StationSpec;
use slotmap::SlotMap;
use std::collections::HashMap;
use tracing::debug;

/// Maximum number of station classes.
pub const MAX_STATION_CLASSES: usize = 255;

/// A class of station specs, e.g. all waypoints of a pack.
///
/// Entries are `None` for the built-in default spec of the class.
#[derive(Debug, Clone)]
pub struct StationClass {
    pub label: ClassLabel,
    pub name: String,
    specs: Vec<Option<SpecId>>,
}

impl StationClass {
    fn new(label: ClassLabel) -> Self {
        Self {
            label,
            name: label.to_string(),
            specs: Vec::new(),
        }
    }

    pub fn spec_count(&self) -> usize {
        self.specs.len()
    }

    /// The spec at `index`. `Some(None)` is the built-in default entry.
    pub fn spec(&self, index: usize) -> Option<Option<SpecId>> {
        self.specs.get(index).copied()
    }

    pub fn specs(&self) -> impl Iterator<Item = Option<SpecId>> + '_ {
        self.specs.iter().copied()
    }

    pub fn is_waypoint(&self) -> bool {
        self.label == ClassLabel::WAYPOINT
    }
}

/// Builder for constructing an immutable [`SpecRegistry`].
/// Three-phase lifecycle: registration -> mutation -> finalization.
#[derive(Debug)]
pub struct SpecRegistryBuilder {
    classes: Vec<StationClass>,
    class_by_label: HashMap<ClassLabel, StationClassId>,
    specs: SlotMap<SpecId, StationSpec>,
    by_pack: HashMap<(PackId, u16), SpecId>,
}

impl Default for SpecRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecRegistryBuilder {
    /// A builder holding the default station and waypoint classes, each with
    /// its built-in default entry at index 0.
    pub fn new() -> Self {
        let mut builder = Self {
            classes: Vec::new(),
            class_by_label: HashMap::new(),
            specs: SlotMap::with_key(),
            by_pack: HashMap::new(),
        };
        for (label, name) in [
            (ClassLabel::DEFAULT, "Default station"),
            (ClassLabel::WAYPOINT, "Waypoints"),
        ] {
            let id = StationClassId(builder.classes.len() as u16);
            let mut class = StationClass::new(label);
            class.name = name.to_string();
            class.specs.push(None);
            builder.classes.push(class);
            builder.class_by_label.insert(label, id);
        }
        builder
    }

    /// Phase 1: find or create the class with `label`.
    pub fn allocate_class(&mut self, label: ClassLabel) -> Result<StationClassId, RegistryError> {
        if let Some(&id) = self.class_by_label.get(&label) {
            return Ok(id);
        }
        if self.classes.len() >= MAX_STATION_CLASSES {
            return Err(RegistryError::ClassTableFull(label));
        }
        let id = StationClassId(self.classes.len() as u16);
        self.classes.push(StationClass::new(label));
        self.class_by_label.insert(label, id);
        debug!(%label, class = id.0, "allocated station class");
        Ok(id)
    }

    /// Phase 1: rename a class.
    pub fn set_class_name(&mut self, label: ClassLabel, name: &str) -> Result<(), RegistryError> {
        let id = self
            .class_by_label
            .get(&label)
            .ok_or(RegistryError::UnknownClass(label))?;
        self.classes[id.0 as usize].name = name.to_string();
        Ok(())
    }

    /// Phase 1: register a spec into the class with `label`. Returns its ID.
    pub fn register_spec(
        &mut self,
        label: ClassLabel,
        mut spec: StationSpec,
    ) -> Result<SpecId, RegistryError> {
        let key = (spec.pack.id, spec.local_id);
        if self.by_pack.contains_key(&key) {
            return Err(RegistryError::DuplicateSpec {
                pack: spec.pack.id,
                local_id: spec.local_id,
            });
        }
        let class = self.allocate_class(label)?;
        spec.class = class;
        let id = self.specs.insert(spec);
        self.classes[class.0 as usize].specs.push(Some(id));
        self.by_pack.insert(key, id);
        Ok(id)
    }

    /// Phase 2: mutate a registered spec.
    pub fn mutate_spec<F>(&mut self, id: SpecId, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut StationSpec),
    {
        let spec = self.specs.get_mut(id).ok_or(RegistryError::UnknownSpec)?;
        f(spec);
        Ok(())
    }

    pub fn class_id(&self, label: ClassLabel) -> Option<StationClassId> {
        self.class_by_label.get(&label).copied()
    }

    /// Phase 3: finalize into the immutable registry.
    pub fn build(self) -> SpecRegistry {
        debug!(
            classes = self.classes.len(),
            specs = self.specs.len(),
            "station spec registry built"
        );
        SpecRegistry {
            classes: self.classes,
            class_by_label: self.class_by_label,
            specs: self.specs,
            by_pack: self.by_pack,
        }
    }
}

/// Immutable spec registry. Owns every [`StationSpec`]; stations refer to
/// specs by [`SpecId`].
#[derive(Debug)]
pub struct SpecRegistry {
    classes: Vec<StationClass>,
    class_by_label: HashMap<ClassLabel, StationClassId>,
    specs: SlotMap<SpecId, StationSpec>,
    by_pack: HashMap<(PackId, u16), SpecId>,
}

impl SpecRegistry {
    pub fn get(&self, id: SpecId) -> Option<&StationSpec> {
        self.specs.get(id)
    }

    pub fn class(&self, id: StationClassId) -> Option<&StationClass> {
        self.classes.get(id.0 as usize)
    }

    pub fn class_id(&self, label: ClassLabel) -> Option<StationClassId> {
        self.class_by_label.get(&label).copied()
    }

    /// Look up the spec at `index` of the class with `label`.
    ///
    /// Returns `None` for unknown classes and out-of-range indices, and also
    /// for the built-in default entry (which has no spec).
    pub fn lookup(&self, label: ClassLabel, index: usize) -> Option<SpecId> {
        let class = self.class(self.class_id(label)?)?;
        class.spec(index).flatten()
    }

    /// Find a spec by the pack that defined it and its pack-local id.
    pub fn find_by_pack(&self, pack: PackId, local_id: u16) -> Option<SpecId> {
        self.by_pack.get(&(pack, local_id)).copied()
    }

    pub fn classes(&self) -> impl Iterator<Item = &StationClass> {
        self.classes.iter()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn spec_count(&self) -> usize {
        self.specs.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("station class table is full, cannot add {0}")]
    ClassTableFull(ClassLabel),
    #[error("unknown station class: {0}")]
    UnknownClass(ClassLabel),
    #[error("unknown spec id")]
    UnknownSpec,
    #[error("duplicate spec {local_id} in pack {:08X}", .pack.0)]
    DuplicateSpec { pack: PackId, local_id: u16 },
}
