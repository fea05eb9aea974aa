use serde::{Deserialize, Serialize};

/// Display identity of whoever performed an action on the tracker —
/// the activity actor or the report's original reporter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Actor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
}

/// One entry from the tracker's incremental activity feed.
///
/// The wire shape is JSON:API-style (`attributes` / `relationships` nesting);
/// the wrapper structs below mirror it verbatim so serde does the unwrapping.
/// Use [`Activity::actor`] instead of reaching through `relationships`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Activity {
    /// Activity kind, e.g. `activity-bug-triaged` or `activity-comment`.
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: ActivityAttributes,
    #[serde(default)]
    pub relationships: ActivityRelationships,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityAttributes {
    pub report_id: String,
    pub created_at: String,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityRelationships {
    #[serde(default)]
    pub actor: ActorEnvelope,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorEnvelope {
    #[serde(default)]
    pub data: ActorData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorData {
    #[serde(default)]
    pub attributes: Actor,
}

impl Activity {
    pub fn actor(&self) -> &Actor {
        &self.relationships.actor.data.attributes
    }
}

/// One page of the incremental activity feed plus the feed watermark hint.
#[derive(Debug, Clone, Default)]
pub struct ActivityPage {
    pub activities: Vec<Activity>,
    /// Highest `updated_at` across the returned page, as reported by the
    /// tracker. Empty when the tracker omits it.
    pub max_updated_at: String,
}

/// A vulnerability report snapshot. Fetched fresh on every poll cycle;
/// never cached across cycles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub attributes: ReportAttributes,
    #[serde(default)]
    pub relationships: ReportRelationships,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportAttributes {
    pub title: String,
    pub state: String,
    pub created_at: String,
    #[serde(default)]
    pub triaged_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub bounty_awarded_at: Option<String>,
    #[serde(default)]
    pub disclosed_at: Option<String>,
    #[serde(default)]
    pub swag_awarded_at: Option<String>,
    #[serde(rename = "vulnerability_information", default)]
    pub info: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRelationships {
    #[serde(default)]
    pub reporter: ActorEnvelope,
}

impl Report {
    pub fn reporter(&self) -> &Actor {
        &self.relationships.reporter.data.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_activity_wire_shape() {
        let json = r#"{
            "type": "activity-bug-triaged",
            "attributes": {
                "report_id": "1337",
                "created_at": "2021-09-02T14:29:04Z",
                "internal": false,
                "message": "looks legit"
            },
            "relationships": {
                "actor": {
                    "data": {
                        "attributes": { "name": "Ada", "username": "ada" }
                    }
                }
            }
        }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.kind, "activity-bug-triaged");
        assert_eq!(activity.attributes.report_id, "1337");
        assert_eq!(activity.actor().username, "ada");
    }

    #[test]
    fn decode_report_with_null_timestamps() {
        let json = r#"{
            "id": "42",
            "attributes": {
                "title": "XSS in search",
                "state": "new",
                "created_at": "2021-09-02T14:29:04Z",
                "triaged_at": null,
                "vulnerability_information": "steps to reproduce"
            },
            "relationships": {
                "reporter": {
                    "data": {
                        "attributes": { "name": "Grace", "username": "grace" }
                    }
                }
            }
        }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.attributes.state, "new");
        assert!(report.attributes.triaged_at.is_none());
        assert!(report.attributes.bounty_awarded_at.is_none());
        assert_eq!(report.reporter().name, "Grace");
        assert_eq!(report.attributes.info, "steps to reproduce");
    }

    #[test]
    fn missing_relationships_default_to_empty_actor() {
        let json = r#"{
            "type": "activity-comment",
            "attributes": { "report_id": "7", "created_at": "2021-01-01T00:00:00Z" }
        }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert!(activity.actor().username.is_empty());
        assert!(activity.attributes.message.is_empty());
    }
}
