//! Activity type profiles and the lookup table the engine reads from

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Minutes per unit applied to activity types missing from the table
pub const DEFAULT_UNIT_DURATION_MINUTES: f64 = 1.0;

/// What an activity's quantity counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityUnit {
    #[default]
    Pallets,
    Units,
}

impl QuantityUnit {
    pub fn label(&self, quantity: u32) -> &'static str {
        match (self, quantity) {
            (QuantityUnit::Pallets, 1) => "pallet",
            (QuantityUnit::Pallets, _) => "pallets",
            (QuantityUnit::Units, 1) => "unit",
            (QuantityUnit::Units, _) => "units",
        }
    }
}

impl fmt::Display for QuantityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(0))
    }
}

/// How the planned duration of one activity type is computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTypeProfile {
    pub type_name: String,
    /// Minutes per unit, or the whole duration when `is_fixed_duration` is set
    pub unit_duration_minutes: f64,
    #[serde(default)]
    pub is_fixed_duration: bool,
    #[serde(default)]
    pub unit: QuantityUnit,
}

/// Profile used for type names the table does not know
static DEFAULT_PROFILE: ActivityTypeProfile = ActivityTypeProfile {
    type_name: String::new(),
    unit_duration_minutes: DEFAULT_UNIT_DURATION_MINUTES,
    is_fixed_duration: false,
    unit: QuantityUnit::Pallets,
};

impl ActivityTypeProfile {
    pub fn per_unit(type_name: &str, minutes: f64) -> Self {
        Self {
            type_name: type_name.to_string(),
            unit_duration_minutes: minutes,
            is_fixed_duration: false,
            unit: QuantityUnit::Pallets,
        }
    }

    pub fn fixed(type_name: &str, minutes: f64) -> Self {
        Self {
            is_fixed_duration: true,
            ..Self::per_unit(type_name, minutes)
        }
    }

    pub fn counting_units(mut self) -> Self {
        self.unit = QuantityUnit::Units;
        self
    }

    /// The fallback profile for unknown activity types
    pub fn default_profile() -> &'static ActivityTypeProfile {
        &DEFAULT_PROFILE
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.type_name.trim().is_empty() {
            return Err(ConfigError::InvalidProfile {
                name: self.type_name.clone(),
                reason: "type name is empty".to_string(),
            });
        }
        if !self.unit_duration_minutes.is_finite() || self.unit_duration_minutes < 0.0 {
            return Err(ConfigError::InvalidProfile {
                name: self.type_name.clone(),
                reason: format!(
                    "duration must be a non-negative number of minutes, got {}",
                    self.unit_duration_minutes
                ),
            });
        }
        Ok(())
    }
}

/// Immutable mapping from activity type name to profile.
///
/// Built once at start-up and handed to the engine; insertion order is kept
/// so listings follow the order the types were defined in.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: Vec<ActivityTypeProfile>,
    index: HashMap<String, usize>,
}

impl ProfileTable {
    /// Builds a table, rejecting duplicate names and invalid durations
    pub fn from_profiles(profiles: Vec<ActivityTypeProfile>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(profiles.len());
        for (position, profile) in profiles.iter().enumerate() {
            profile.validate()?;
            let key = profile.type_name.trim().to_string();
            if index.insert(key, position).is_some() {
                return Err(ConfigError::DuplicateProfile(profile.type_name.clone()));
            }
        }
        Ok(Self { profiles, index })
    }

    /// Loads a JSON array of profiles from disk
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|e| {
            ConfigError::ProfilesLoadFailed(format!("{}: {}", path.display(), e))
        })?;
        let profiles: Vec<ActivityTypeProfile> = serde_json::from_str(&data).map_err(|e| {
            ConfigError::ProfilesLoadFailed(format!("{}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), count = profiles.len(), "Loaded activity profiles");
        Self::from_profiles(profiles)
    }

    /// The built-in warehouse table
    pub fn builtin() -> Self {
        let profiles = vec![
            ActivityTypeProfile::per_unit("Picking - Área de Saída", 0.5).counting_units(),
            ActivityTypeProfile::per_unit("Picking - Reserva", 3.0),
            ActivityTypeProfile::per_unit("Picking - Cons", 2.0),
            ActivityTypeProfile::per_unit("Picking - Troca de Palete", 4.0),
            ActivityTypeProfile::per_unit("Conferência - Carga Fracionada", 1.0),
            ActivityTypeProfile::per_unit("Conferência - Carga Matriz", 1.5),
            ActivityTypeProfile::per_unit("Conferência - Carga Direta", 1.0),
            ActivityTypeProfile::fixed("Contagem Cega do Box", 20.0),
            ActivityTypeProfile::per_unit("Carregamento - Fracionado", 2.0),
            ActivityTypeProfile::per_unit("Carregamento - Transferência", 2.0),
            ActivityTypeProfile::fixed("Emissão de Nota Fiscal - Fracionado", 10.0),
            ActivityTypeProfile::fixed("Emissão de Nota Fiscal - Transferência", 10.0),
            ActivityTypeProfile::fixed("Emissão de Nota Fiscal - Carga Direta", 10.0),
            ActivityTypeProfile::per_unit("Pre. de carga exportação", 3.0),
            ActivityTypeProfile::per_unit("Carga fracionada -Etiquetagem", 1.25),
            ActivityTypeProfile::per_unit("END. Bertolini", 1.5),
            ActivityTypeProfile::per_unit("END. 97", 1.5),
            ActivityTypeProfile::per_unit("Armagenamento Bertolini", 2.0),
            ActivityTypeProfile::per_unit("Armagenamento 97", 2.0),
            ActivityTypeProfile::fixed("Vistoria de container", 30.0),
            ActivityTypeProfile::fixed("Invetário dos corredores", 45.0),
            ActivityTypeProfile::per_unit("Descarga Bertoline", 1.5),
            ActivityTypeProfile::fixed("Preenchimento Mapa Bertolini", 15.0),
            ActivityTypeProfile::fixed("Preenchimento RR Bertolini", 15.0),
            ActivityTypeProfile::fixed("Inspeção/Foto/Checklist/ container 40", 25.0),
            ActivityTypeProfile::fixed("Inspeção/Foto/Checklist/ container 20", 20.0),
            ActivityTypeProfile::fixed("Liberação de container/ Lacre / Foto", 10.0),
        ];

        match Self::from_profiles(profiles) {
            Ok(table) => table,
            // the literal table above is unique and non-negative
            Err(e) => unreachable!("built-in profile table is invalid: {}", e),
        }
    }

    /// Exact lookup; surrounding whitespace in `type_name` is ignored
    pub fn get(&self, type_name: &str) -> Option<&ActivityTypeProfile> {
        self.index
            .get(type_name.trim())
            .and_then(|&position| self.profiles.get(position))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.get(type_name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityTypeProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}
