//! Resolution pipeline: reads pack files, resolves group names, builds the
//! registry.
//!
//! Provides format detection (RON/JSON/TOML), deserialization, and the
//! name resolution that turns a pack's flat list of named groups into
//! shared sprite-group trees.

use crate::schema::{GroupData, PackData, RootKeyData, SpecData};
use serde::de::DeserializeOwned;
use stationpack_core::cargo::{CargoTranslation, CargoType, CargoTypes};
use stationpack_core::id::{ClassLabel, PackId, SpecId, StationClassId};
use stationpack_core::registry::{RegistryError, SpecRegistry, SpecRegistryBuilder};
use stationpack_core::spec::{AnimationInfo, CargoKey, PackFile, StationSpec};
use stationpack_core::sprite_group::{
    Adjust, DeterministicGroup, GroupRange, RandomizedGroup, RealGroup, SpriteGroup, TriggerMatch,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// A group refers back to itself.
    #[error("group '{name}' in {file} refers to itself")]
    CyclicRef { file: PathBuf, name: String },

    /// A value is out of range.
    #[error("invalid value in {file}: {detail}")]
    InvalidValue { file: PathBuf, detail: String },

    /// The registry refused a class or spec.
    #[error("registry error in {file}: {source}")]
    Registry {
        file: PathBuf,
        #[source]
        source: RegistryError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    let parse_err = |detail: String| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_err(e.to_string())),
    }
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

fn invalid(file: &Path, detail: String) -> DataLoadError {
    DataLoadError::InvalidValue {
        file: file.to_path_buf(),
        detail,
    }
}

/// Parse a class label of one to four ASCII characters.
pub fn parse_class_label(label: &str, file: &Path) -> Result<ClassLabel, DataLoadError> {
    if label.is_empty() || label.len() > 4 || !label.is_ascii() {
        return Err(invalid(file, format!("class label '{label}' must be 1-4 ASCII characters")));
    }
    Ok(ClassLabel::from_str_padded(label))
}

// ===========================================================================
// Group resolution
// ===========================================================================

/// Builds shared trees out of a pack's named groups. Every group is built
/// once; groups referenced from several places share one `Arc`.
struct GroupResolver<'p> {
    file: &'p Path,
    defs: HashMap<String, &'p GroupData>,
    built: HashMap<String, Arc<SpriteGroup>>,
    in_progress: HashSet<String>,
}

impl<'p> GroupResolver<'p> {
    fn new(pack: &'p PackData, file: &'p Path) -> Result<Self, DataLoadError> {
        let mut defs = HashMap::new();
        for named in &pack.groups {
            check_duplicate(&defs, &named.name, file)?;
            defs.insert(named.name.clone(), &named.group);
        }
        Ok(Self {
            file,
            defs,
            built: HashMap::new(),
            in_progress: HashSet::new(),
        })
    }

    fn resolve(&mut self, name: &str) -> Result<Arc<SpriteGroup>, DataLoadError> {
        if let Some(group) = self.built.get(name) {
            return Ok(Arc::clone(group));
        }
        let def = *resolve_name(&self.defs, name, self.file, "sprite group")?;
        if !self.in_progress.insert(name.to_string()) {
            return Err(DataLoadError::CyclicRef {
                file: self.file.to_path_buf(),
                name: name.to_string(),
            });
        }
        let group = Arc::new(self.build(name, def)?);
        self.in_progress.remove(name);
        self.built.insert(name.to_string(), Arc::clone(&group));
        Ok(group)
    }

    fn resolve_opt(&mut self, name: Option<&String>) -> Result<Option<Arc<SpriteGroup>>, DataLoadError> {
        name.map(|n| self.resolve(n)).transpose()
    }

    fn build(&mut self, name: &str, def: &GroupData) -> Result<SpriteGroup, DataLoadError> {
        Ok(match def {
            GroupData::Callback(result) => SpriteGroup::CallbackResult(result & 0x7FFF),
            GroupData::Sprites { sprite, count } => SpriteGroup::Result {
                sprite: *sprite,
                num_sprites: *count,
            },
            GroupData::Real { loaded, loading } => SpriteGroup::Real(RealGroup {
                loaded: loaded.iter().map(|n| self.resolve(n)).collect::<Result<_, _>>()?,
                loading: loading.iter().map(|n| self.resolve(n)).collect::<Result<_, _>>()?,
            }),
            GroupData::Deterministic {
                scope,
                adjusts,
                ranges,
                default,
            } => {
                let ranges = ranges
                    .iter()
                    .map(|r| {
                        Ok(GroupRange {
                            low: r.low,
                            high: r.high,
                            group: self.resolve_opt(r.group.as_ref())?,
                        })
                    })
                    .collect::<Result<_, DataLoadError>>()?;
                SpriteGroup::Deterministic(DeterministicGroup {
                    scope: *scope,
                    adjusts: adjusts
                        .iter()
                        .map(|a| {
                            Adjust::new(a.op, a.variable)
                                .with_parameter(a.parameter)
                                .with_shift_mask(a.shift, a.mask)
                        })
                        .collect(),
                    ranges,
                    default: self.resolve_opt(default.as_ref())?,
                })
            }
            GroupData::Randomized {
                scope,
                triggers,
                match_all,
                lowest_bit,
                groups,
            } => {
                if !groups.len().is_power_of_two() {
                    return Err(invalid(
                        self.file,
                        format!("randomized group '{name}' needs a power-of-two number of children"),
                    ));
                }
                if *lowest_bit >= 32 {
                    return Err(invalid(self.file, format!("randomized group '{name}' starts past bit 31")));
                }
                SpriteGroup::Randomized(RandomizedGroup {
                    scope: *scope,
                    triggers: *triggers,
                    cmp_mode: if *match_all { TriggerMatch::All } else { TriggerMatch::Any },
                    lowest_randbit: *lowest_bit,
                    groups: groups
                        .iter()
                        .map(|g| self.resolve_opt(g.as_ref()))
                        .collect::<Result<_, _>>()?,
                })
            }
        })
    }
}

// ===========================================================================
// Pack registration
// ===========================================================================

/// Add every class and spec of `pack` to `builder`. `file` names the source
/// in errors. Returns the ids of the registered specs in file order.
pub fn register_pack(
    builder: &mut SpecRegistryBuilder,
    pack: &PackData,
    file: &Path,
) -> Result<Vec<SpecId>, DataLoadError> {
    let registry_err = |source| DataLoadError::Registry {
        file: file.to_path_buf(),
        source,
    };

    let translation = if pack.cargo_table.is_empty() {
        CargoTranslation::identity()
    } else {
        CargoTranslation::from_table(
            pack.cargo_table
                .iter()
                .map(|c| c.map(CargoType).filter(|c| c.is_valid()))
                .collect(),
        )
    };
    let pack_file = Arc::new(PackFile::new(PackId(pack.id), pack.format_version).with_cargo_translation(translation));

    for class in &pack.classes {
        let label = parse_class_label(&class.label, file)?;
        builder.allocate_class(label).map_err(registry_err)?;
        builder.set_class_name(label, &class.name).map_err(registry_err)?;
    }

    let mut groups = GroupResolver::new(pack, file)?;
    let mut ids = Vec::with_capacity(pack.specs.len());
    for data in &pack.specs {
        let label = match &data.class {
            Some(label) => parse_class_label(label, file)?,
            None => ClassLabel::DEFAULT,
        };
        let spec = build_spec(data, &pack_file, &mut groups)?;
        ids.push(builder.register_spec(label, spec).map_err(registry_err)?);
    }

    debug!(
        pack = format_args!("{:08X}", pack.id),
        file = %file.display(),
        specs = ids.len(),
        groups = pack.groups.len(),
        "registered pack"
    );
    Ok(ids)
}

fn build_spec(
    data: &SpecData,
    pack: &Arc<PackFile>,
    groups: &mut GroupResolver<'_>,
) -> Result<StationSpec, DataLoadError> {
    let mut spec = StationSpec::new(&data.name, StationClassId(0), data.local_id, Arc::clone(pack));
    spec.flags = data.flags.iter().copied().collect();
    spec.callback_mask = data.callbacks.iter().copied().collect();
    spec.cargo_threshold = data.cargo_threshold;

    let translation = &pack.cargo_translation;
    let mut cargo_triggers = CargoTypes::EMPTY;
    for &local in &data.cargo_triggers {
        match translation.to_global(local) {
            Some(cargo) => cargo_triggers.insert(cargo),
            None => warn!(spec = %data.name, local, "cargo trigger names an unknown cargo"),
        }
    }
    spec.cargo_triggers = cargo_triggers;

    if let Some(anim) = &data.animation {
        spec.animation = AnimationInfo {
            frames: anim.frames,
            status: anim.status,
            speed: anim.speed,
            triggers: anim.triggers.iter().copied().collect(),
        };
    }

    for root in &data.sprites {
        let key = match root.key {
            RootKeyData::Cargo(local) => match translation.to_global(local) {
                Some(cargo) => CargoKey::Cargo(cargo),
                None => {
                    warn!(spec = %data.name, local, "sprite root names an unknown cargo");
                    continue;
                }
            },
            RootKeyData::Default => CargoKey::Default,
            RootKeyData::DefaultNoCargo => CargoKey::DefaultNoCargo,
            RootKeyData::Purchase => CargoKey::Purchase,
        };
        let group = groups.resolve(&root.group)?;
        spec.sprite_groups.insert(key, group);
    }
    Ok(spec)
}

// ===========================================================================
// Entry points
// ===========================================================================

/// Load a single pack file into a fresh registry.
pub fn load_pack_file(path: &Path) -> Result<SpecRegistry, DataLoadError> {
    let pack: PackData = deserialize_file(path)?;
    let mut builder = SpecRegistryBuilder::new();
    register_pack(&mut builder, &pack, path)?;
    Ok(builder.build())
}

/// Load every pack file of a directory, in file name order, into one
/// registry. Files with other extensions are ignored.
pub fn load_pack_dir(dir: &Path) -> Result<SpecRegistry, DataLoadError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    files.retain(|p| p.is_file() && detect_format(p).is_ok());
    files.sort();

    let mut stems: HashMap<String, PathBuf> = HashMap::new();
    for file in &files {
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(existing) = stems.get(&stem) {
            return Err(DataLoadError::ConflictingFormats {
                a: existing.clone(),
                b: file.clone(),
            });
        }
        stems.insert(stem, file.clone());
    }

    let mut builder = SpecRegistryBuilder::new();
    let mut pack_ids: HashMap<String, PathBuf> = HashMap::new();
    for file in &files {
        let pack: PackData = deserialize_file(file)?;
        let id = format!("{:08X}", pack.id);
        check_duplicate(&pack_ids, &id, file)?;
        pack_ids.insert(id, file.clone());
        register_pack(&mut builder, &pack, file)?;
    }
    debug!(dir = %dir.display(), packs = files.len(), "loaded pack directory");
    Ok(builder.build())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stationpack_core::callback::StationCallback;
    use stationpack_core::spec::AnimationStatus;
    use stationpack_core::trigger::StationAnimationTrigger;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "stationpack_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const PACK_RON: &str = r#"
        (
            id: 0x53544E31,
            cargo_table: [Some(0), Some(2)],
            classes: [(label: "RAIL", name: "Rail stations")],
            groups: [
                (name: "empty", group: Sprites(sprite: 1100, count: 8)),
                (name: "full", group: Sprites(sprite: 1200, count: 8)),
                (name: "cargo", group: Real(loaded: ["empty", "full"], loading: ["empty"])),
                (name: "pick", group: Deterministic(
                    adjusts: [(op: Add, variable: 0x40, shift: 4, mask: 0xF)],
                    ranges: [(low: 0, high: 0, group: Some("empty"))],
                    default: Some("cargo"),
                )),
                (name: "ok", group: Callback(0x400)),
            ],
            specs: [
                (
                    name: "Glass roof",
                    class: Some("RAIL"),
                    local_id: 0,
                    callbacks: [SlopeCheck],
                    cargo_triggers: [1],
                    animation: Some((frames: 3, status: Looping, speed: 2, triggers: [Built])),
                    sprites: [
                        (key: Cargo(1), group: "cargo"),
                        (key: Default, group: "pick"),
                        (key: Purchase, group: "ok"),
                    ],
                ),
                (name: "Plain", local_id: 1, sprites: [(key: Default, group: "empty")]),
            ],
        )
    "#;

    fn pack_from_ron(ron: &str) -> PackData {
        ron::from_str(ron).unwrap()
    }

    // -----------------------------------------------------------------------
    // detect_format / deserialize_file
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("pack.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("pack.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("pack.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("pack.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("pack")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn deserialize_file_parse_error() {
        let dir = make_test_dir("parse_err");
        let path = dir.join("bad.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let result: Result<PackData, _> = deserialize_file(&path);
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_missing_is_io() {
        let result: Result<PackData, _> = deserialize_file(Path::new("/nonexistent/pack.ron"));
        assert!(matches!(result, Err(DataLoadError::Io(_))));
    }

    // -----------------------------------------------------------------------
    // register_pack
    // -----------------------------------------------------------------------

    #[test]
    fn register_pack_builds_specs() {
        let pack = pack_from_ron(PACK_RON);
        let mut builder = SpecRegistryBuilder::new();
        let ids = register_pack(&mut builder, &pack, Path::new("pack.ron")).unwrap();
        let registry = builder.build();
        assert_eq!(ids.len(), 2);

        let roof = registry.get(ids[0]).unwrap();
        assert_eq!(roof.name, "Glass roof");
        assert_eq!(roof.pack.id, PackId(0x5354_4E31));
        assert!(roof.has_callback(StationCallback::SlopeCheck));
        assert_eq!(roof.animation.status, AnimationStatus::Looping);
        assert_eq!(roof.animation.speed, 2);
        assert!(roof.animation.triggers.contains(StationAnimationTrigger::Built));
        // Local cargo 1 is global cargo 2.
        assert!(roof.cargo_triggers.contains(CargoType(2)));
        assert!(roof.sprite_groups.get(CargoKey::Cargo(CargoType(2))).is_some());
        assert!(roof.sprite_groups.get(CargoKey::Purchase).is_some());

        let rail = registry.class_id(parse_class_label("RAIL", Path::new("x")).unwrap()).unwrap();
        assert_eq!(roof.class, rail);
        assert_eq!(registry.class(rail).unwrap().name, "Rail stations");

        let plain = registry.get(ids[1]).unwrap();
        assert_eq!(plain.class, registry.class_id(ClassLabel::DEFAULT).unwrap());
    }

    #[test]
    fn shared_groups_are_built_once() {
        let pack = pack_from_ron(PACK_RON);
        let mut builder = SpecRegistryBuilder::new();
        let ids = register_pack(&mut builder, &pack, Path::new("pack.ron")).unwrap();
        let registry = builder.build();

        let roof = registry.get(ids[0]).unwrap();
        let plain = registry.get(ids[1]).unwrap();
        let cargo_root = roof.sprite_groups.get(CargoKey::Cargo(CargoType(2))).unwrap();
        let SpriteGroup::Real(real) = &**cargo_root else {
            panic!("expected a real group");
        };
        let plain_root = plain.sprite_groups.get(CargoKey::Default).unwrap();
        assert!(Arc::ptr_eq(&real.loaded[0], plain_root));
        assert!(Arc::ptr_eq(&real.loaded[0], &real.loading[0]));
    }

    #[test]
    fn unresolved_group_is_reported() {
        let pack = pack_from_ron(
            r#"(id: 1, specs: [(name: "x", local_id: 0, sprites: [(key: Default, group: "missing")])])"#,
        );
        let mut builder = SpecRegistryBuilder::new();
        let result = register_pack(&mut builder, &pack, Path::new("pack.ron"));
        assert!(matches!(
            result,
            Err(DataLoadError::UnresolvedRef { ref name, expected_kind: "sprite group", .. }) if name == "missing"
        ));
    }

    #[test]
    fn duplicate_group_names_are_rejected() {
        let pack = pack_from_ron(
            r#"(id: 1, groups: [(name: "a", group: Callback(1)), (name: "a", group: Callback(2))])"#,
        );
        let mut builder = SpecRegistryBuilder::new();
        assert!(matches!(
            register_pack(&mut builder, &pack, Path::new("pack.ron")),
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "a"
        ));
    }

    #[test]
    fn cycles_are_rejected() {
        let pack = pack_from_ron(
            r#"(
                id: 1,
                groups: [
                    (name: "a", group: Deterministic(adjusts: [], default: Some("b"))),
                    (name: "b", group: Real(loaded: ["a"])),
                ],
                specs: [(name: "x", local_id: 0, sprites: [(key: Default, group: "a")])],
            )"#,
        );
        let mut builder = SpecRegistryBuilder::new();
        assert!(matches!(
            register_pack(&mut builder, &pack, Path::new("pack.ron")),
            Err(DataLoadError::CyclicRef { ref name, .. }) if name == "a"
        ));
    }

    #[test]
    fn randomized_child_count_must_be_power_of_two() {
        let pack = pack_from_ron(
            r#"(
                id: 1,
                groups: [
                    (name: "leaf", group: Callback(0)),
                    (name: "r", group: Randomized(groups: [Some("leaf"), Some("leaf"), None])),
                ],
                specs: [(name: "x", local_id: 0, sprites: [(key: Default, group: "r")])],
            )"#,
        );
        let mut builder = SpecRegistryBuilder::new();
        assert!(matches!(
            register_pack(&mut builder, &pack, Path::new("pack.ron")),
            Err(DataLoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn bad_class_labels_are_rejected() {
        assert!(parse_class_label("", Path::new("p")).is_err());
        assert!(parse_class_label("TOOLONG", Path::new("p")).is_err());
        assert_eq!(
            parse_class_label("AB", Path::new("p")).unwrap(),
            ClassLabel(*b"AB  ")
        );
    }

    #[test]
    fn duplicate_specs_surface_registry_errors() {
        let pack = pack_from_ron(
            r#"(
                id: 1,
                groups: [(name: "cb", group: Callback(0))],
                specs: [
                    (name: "x", local_id: 4, sprites: [(key: Default, group: "cb")]),
                    (name: "y", local_id: 4, sprites: [(key: Default, group: "cb")]),
                ],
            )"#,
        );
        let mut builder = SpecRegistryBuilder::new();
        assert!(matches!(
            register_pack(&mut builder, &pack, Path::new("pack.ron")),
            Err(DataLoadError::Registry {
                source: RegistryError::DuplicateSpec { local_id: 4, .. },
                ..
            })
        ));
    }

    // -----------------------------------------------------------------------
    // load_pack_file / load_pack_dir
    // -----------------------------------------------------------------------

    #[test]
    fn load_pack_file_ron() {
        let dir = make_test_dir("file_ron");
        let path = dir.join("roofs.ron");
        fs::write(&path, PACK_RON).unwrap();

        let registry = load_pack_file(&path).unwrap();
        assert_eq!(registry.spec_count(), 2);
        assert!(registry.find_by_pack(PackId(0x5354_4E31), 1).is_some());

        cleanup(&dir);
    }

    #[test]
    fn load_pack_dir_mixes_formats() {
        let dir = make_test_dir("dir_mixed");
        fs::write(dir.join("a.ron"), PACK_RON).unwrap();
        fs::write(
            dir.join("b.json"),
            r#"{
                "id": 2,
                "groups": [{"name": "cb", "group": {"Callback": 5}}],
                "specs": [{"name": "j", "local_id": 0, "sprites": [{"key": "Default", "group": "cb"}]}]
            }"#,
        )
        .unwrap();
        fs::write(
            dir.join("c.toml"),
            r#"
                id = 3

                [[groups]]
                name = "cb"
                group = { Callback = 6 }

                [[specs]]
                name = "t"
                local_id = 0
                sprites = [{ key = "Default", group = "cb" }]
            "#,
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let registry = load_pack_dir(&dir).unwrap();
        assert_eq!(registry.spec_count(), 4);
        assert!(registry.find_by_pack(PackId(2), 0).is_some());
        assert!(registry.find_by_pack(PackId(3), 0).is_some());

        cleanup(&dir);
    }

    #[test]
    fn load_pack_dir_conflicting_formats() {
        let dir = make_test_dir("dir_conflict");
        fs::write(dir.join("a.ron"), "(id: 1)").unwrap();
        fs::write(dir.join("a.json"), r#"{"id": 2}"#).unwrap();

        assert!(matches!(
            load_pack_dir(&dir),
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    #[test]
    fn load_pack_dir_duplicate_pack_ids() {
        let dir = make_test_dir("dir_dup");
        fs::write(dir.join("a.ron"), "(id: 7)").unwrap();
        fs::write(dir.join("b.ron"), "(id: 7)").unwrap();

        assert!(matches!(
            load_pack_dir(&dir),
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "00000007"
        ));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Error display messages
    // -----------------------------------------------------------------------

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::UnresolvedRef {
            file: PathBuf::from("roofs.ron"),
            name: "lit".to_string(),
            expected_kind: "sprite group",
        };
        let msg = format!("{e}");
        assert!(msg.contains("lit"));
        assert!(msg.contains("sprite group"));

        let e = DataLoadError::CyclicRef {
            file: PathBuf::from("roofs.ron"),
            name: "loop".to_string(),
        };
        assert!(format!("{e}").contains("loop"));

        let e = DataLoadError::Registry {
            file: PathBuf::from("roofs.ron"),
            source: RegistryError::UnknownSpec,
        };
        assert!(format!("{e}").contains("roofs.ron"));
    }
}
