//! TOML-based settings record.
//!
//! Stores user preferences including:
//! - Work interval (minutes) and break length (seconds)
//! - Dark mode and countdown visibility
//! - Active-hours window
//!
//! Settings are stored at `~/.config/visionbreak/config.toml`. Keys use
//! camelCase both on disk and in the dot-path accessors (`activeHours.start`).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::active_hours::ActiveHours;
use crate::error::{ConfigError, ValidationError};

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Minutes between breaks.
    #[serde(
        default = "default_work_interval",
        deserialize_with = "deserialize_interval"
    )]
    pub work_interval: u32,
    /// Seconds a break lasts.
    #[serde(
        default = "default_break_interval",
        deserialize_with = "deserialize_interval"
    )]
    pub break_interval: u32,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default = "default_true")]
    pub show_countdown: bool,
    /// Skip automatic breaks outside `active_hours`.
    #[serde(default)]
    pub enforce_active_hours: bool,
    /// End the break once `break_interval` has elapsed instead of waiting
    /// for the overlay to report it.
    #[serde(default)]
    pub auto_end_break: bool,
    // Kept last: TOML tables must follow plain values.
    #[serde(default)]
    pub active_hours: ActiveHours,
}

/// Partial settings for shallow merges. Absent fields are left unchanged;
/// `activeHours` replaces the whole window when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(
        deserialize_with = "deserialize_opt_interval",
        skip_serializing_if = "Option::is_none"
    )]
    pub work_interval: Option<u32>,
    #[serde(
        deserialize_with = "deserialize_opt_interval",
        skip_serializing_if = "Option::is_none"
    )]
    pub break_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_countdown: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce_active_hours: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_end_break: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_hours: Option<ActiveHours>,
}

// Default functions
fn default_work_interval() -> u32 {
    20
}
fn default_break_interval() -> u32 {
    20
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_interval: default_work_interval(),
            break_interval: default_break_interval(),
            dark_mode: false,
            show_countdown: true,
            enforce_active_hours: false,
            auto_end_break: false,
            active_hours: ActiveHours::default(),
        }
    }
}

// ── Interval coercion ────────────────────────────────────────────────

/// Raw interval as it may arrive from a form field or a hand-edited file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInterval {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Truncate to an integer and clamp to `1..=u32::MAX`.
pub fn clamp_interval(value: i64) -> u32 {
    value.clamp(1, i64::from(u32::MAX)) as u32
}

fn coerce_interval(raw: RawInterval) -> Result<u32, String> {
    match raw {
        RawInterval::Int(n) => Ok(clamp_interval(n)),
        RawInterval::Float(f) if f.is_finite() => Ok(clamp_interval(f.trunc() as i64)),
        RawInterval::Float(f) => Err(format!("{f} is not a finite number")),
        RawInterval::Text(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                Ok(clamp_interval(n))
            } else {
                match s.parse::<f64>() {
                    Ok(f) if f.is_finite() => Ok(clamp_interval(f.trunc() as i64)),
                    _ => Err(format!("'{s}' is not a number")),
                }
            }
        }
    }
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawInterval::deserialize(deserializer)?;
    coerce_interval(raw).map_err(D::Error::custom)
}

fn deserialize_opt_interval<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawInterval>::deserialize(deserializer)?
        .map(|raw| coerce_interval(raw).map_err(D::Error::custom))
        .transpose()
}

impl Settings {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .trim()
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let v = value.trim();
                        if let Ok(n) = v.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = v.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Get a settings value as string by dot-separated key.
    pub fn get_key(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a settings value by dot-separated key.
    ///
    /// Interval values go through the same coercion as a patch, so `"0"`
    /// becomes 1 and `"25.7"` becomes 25.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Settings =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }

    /// Shallow-merge `patch` into these settings.
    ///
    /// Nothing is modified when the patch carries a malformed active-hours
    /// window.
    pub fn merge(&mut self, patch: SettingsPatch) -> Result<(), ValidationError> {
        if let Some(ref hours) = patch.active_hours {
            hours.validate()?;
        }
        if let Some(v) = patch.work_interval {
            self.work_interval = v.max(1);
        }
        if let Some(v) = patch.break_interval {
            self.break_interval = v.max(1);
        }
        if let Some(v) = patch.dark_mode {
            self.dark_mode = v;
        }
        if let Some(v) = patch.show_countdown {
            self.show_countdown = v;
        }
        if let Some(v) = patch.enforce_active_hours {
            self.enforce_active_hours = v;
        }
        if let Some(v) = patch.auto_end_break {
            self.auto_end_break = v;
        }
        if let Some(hours) = patch.active_hours {
            self.active_hours = hours;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.active_hours.validate()
    }

    /// Length of a work period in seconds.
    pub fn work_duration_secs(&self) -> i64 {
        i64::from(self.work_interval.max(1)) * 60
    }

    /// Length of a break in seconds.
    pub fn break_duration_secs(&self) -> i64 {
        i64::from(self.break_interval.max(1))
    }
}
