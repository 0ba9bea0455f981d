use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordError {
    pub id: String,
    pub email: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordWarning {
    pub id: String,
    pub email: String,
    pub warning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantAddOns {
    pub registrant_id: String,
    pub add_on_ids: Vec<String>,
}

/// What happened to a single registrant.
#[derive(Debug, Clone, Default)]
pub(crate) struct RegistrantOutcome {
    pub id: String,
    pub email: String,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub add_on_ids: Vec<String>,
}

impl RegistrantOutcome {
    pub fn new(id: &str, email: &str) -> Self {
        Self {
            id: id.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }
}

/// Summary returned once a run finishes. A registrant counted in `success`
/// may also carry warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub success: usize,
    pub errors: Vec<RecordError>,
    pub warnings: Vec<RecordWarning>,
    /// Registrant/add-on associations, not distinct add-ons.
    pub add_ons_migrated: usize,
    pub registrant_add_ons: Vec<RegistrantAddOns>,
}

impl MigrationReport {
    pub(crate) fn record(&mut self, outcome: RegistrantOutcome) {
        let RegistrantOutcome {
            id,
            email,
            error,
            warnings,
            add_on_ids,
        } = outcome;

        self.warnings
            .extend(warnings.into_iter().map(|warning| RecordWarning {
                id: id.clone(),
                email: email.clone(),
                warning,
            }));

        if let Some(error) = error {
            self.errors.push(RecordError { id, email, error });
            return;
        }

        self.success += 1;
        if !add_on_ids.is_empty() {
            self.add_ons_migrated += add_on_ids.len();
            self.registrant_add_ons.push(RegistrantAddOns {
                registrant_id: id,
                add_on_ids,
            });
        }
    }
}
