//! Loads and validates `physicians.json` into the physician records of a
//! [`Registry`](crate::domain::Registry).

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{RegistryBuilder, UnavailabilityInterval};
use crate::error::{Result, SchedulerError};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UnavailabilityEntryDoc {
    Single(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl From<UnavailabilityEntryDoc> for UnavailabilityInterval {
    fn from(value: UnavailabilityEntryDoc) -> Self {
        match value {
            UnavailabilityEntryDoc::Single(d) => UnavailabilityInterval { start: d, end: d },
            UnavailabilityEntryDoc::Range(start, end) => UnavailabilityInterval { start, end },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PhysicianDoc {
    full_name: String,
    #[serde(default)]
    qualifications: HashSet<String>,
    #[serde(default)]
    exclusion_tasks: HashSet<String>,
    #[serde(default)]
    restricted_tasks: HashSet<String>,
    #[serde(default)]
    preferred_tasks: Vec<String>,
    #[serde(default)]
    desired_working_weeks: f64,
    #[serde(default)]
    discontinuity_preference: bool,
    #[serde(default)]
    unavailability: Vec<UnavailabilityEntryDoc>,
}

#[derive(Debug, Deserialize)]
struct PhysiciansDoc {
    physicians: Vec<PhysicianDoc>,
}

pub fn load(path: &Path, builder: &mut RegistryBuilder) -> Result<()> {
    let text = std::fs::read_to_string(path)?;
    let doc: PhysiciansDoc = serde_json::from_str(&text).map_err(|e| SchedulerError::ConfigurationError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    for p in doc.physicians {
        if !(0.0..=1.0).contains(&p.desired_working_weeks) {
            return Err(SchedulerError::ConfigurationError {
                path: path.to_path_buf(),
                reason: format!(
                    "physician '{}' has desired_working_weeks={} outside [0,1]",
                    p.full_name, p.desired_working_weeks
                ),
            });
        }
        builder.add_physician(|id| crate::domain::Physician {
            id,
            full_name: p.full_name,
            qualifications: p.qualifications,
            exclusion_tasks: p.exclusion_tasks,
            restricted_tasks: p.restricted_tasks,
            preferred_tasks: p.preferred_tasks,
            desired_working_weeks: p.desired_working_weeks,
            discontinuity_preference: p.discontinuity_preference,
            unavailability: p.unavailability.into_iter().map(Into::into).collect(),
        });
    }

    Ok(())
}
