//! Rendering of activities and reports into delivery payloads.
//!
//! The attachment shape follows the chat system's incoming-webhook format:
//! a titled card with short key/value fields, one card per report.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use huntrelay_core::types::{Activity, Report};

/// Public web UI base, used for report and profile links in rendered text.
const WEB_BASE: &str = "https://hackerone.com";

/// One key/value row inside an attachment. `short` rows render two-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// A rich message card sent alongside notification text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageAttachment {
    pub title: String,
    pub title_link: String,
    pub author_name: String,
    pub author_link: String,
    /// Raw RFC3339 creation time of the underlying report.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
}

/// Maps a tracker username to a chat handle, when a mapping is known.
///
/// Passed explicitly into the renderer instead of living in process-global
/// state, so tests (and alternative chat systems) can swap it.
pub trait UsernameMapper: Send + Sync {
    fn chat_handle(&self, tracker_username: &str) -> Option<String>;
}

/// Default mapper: nobody is mapped.
pub struct NoMapping;

impl UsernameMapper for NoMapping {
    fn chat_handle(&self, _tracker_username: &str) -> Option<String> {
        None
    }
}

/// RFC3339 → `Thu Sep 02 2021 2:29 PM`. Empty input renders as `-`;
/// anything unparsable is echoed unchanged.
pub fn format_timestamp(input: &str) -> String {
    if input.is_empty() {
        return "-".to_string();
    }
    match DateTime::parse_from_rfc3339(input) {
        Ok(t) => t.format("%a %b %d %Y %-I:%M %p").to_string(),
        Err(_) => input.to_string(),
    }
}

/// Human verb phrase for an activity kind. The `report` token is later
/// replaced with a linked report reference. Unknown kinds fall through
/// verbatim.
pub fn activity_verb(kind: &str) -> &str {
    match kind {
        "activity-agreed-on-going-public" => "agreed on going public on the report",
        "activity-bounty-awarded" => "awarded a bounty on the report",
        "activity-comment" => "commented on the report",
        "activity-bug-triaged" => "triaged the report",
        "activity-bug-resolved" => "resolved the report",
        "activity-bug-filed" => "filed a new report",
        "activity-bug-informative" => "closed the report as Informative",
        "activity-bug-needs-more-info" => "requested more info",
        "activity-bug-not-applicable" => "closed the report as Not Applicable",
        "activity-bug-reopened" => "reopened the report",
        "activity-cancelled-disclosure-request" => "cancelled the disclosure request",
        "activity-user-assigned-to-bug" => "assigned a user to the report",
        other => other,
    }
}

/// A quoted one-liner for an activity, plus a fenced block when the
/// activity carries a message:
///
/// ```text
/// > [Ada](…/ada) triaged the [report 1337](…/reports/1337) at Thu Sep 02 2021 2:29 PM
/// ```
pub fn activity_line(activity: &Activity, mapper: &dyn UsernameMapper) -> String {
    let actor = activity.actor();
    let mut actor_link = format!("[{}]({WEB_BASE}/{})", actor.name, actor.username);
    if let Some(handle) = mapper.chat_handle(&actor.username) {
        actor_link.push_str(&format!(" (@{handle})"));
    }

    let report_id = &activity.attributes.report_id;
    let report_link = format!("[report {report_id}]({WEB_BASE}/reports/{report_id})");
    let action = activity_verb(&activity.kind).replace("report", &report_link);

    let mut line = format!(
        "> {actor_link} {action} at {}\n",
        format_timestamp(&activity.attributes.created_at)
    );
    if !activity.attributes.message.is_empty() {
        line.push_str(&format!("\n```\n{}\n```\n", activity.attributes.message));
    }
    line
}

/// Build the attachment card for a report. Optional timestamps only get a
/// field when set; `detailed` additionally includes the full vulnerability
/// information.
pub fn report_attachment(report: &Report, detailed: bool) -> MessageAttachment {
    let attrs = &report.attributes;
    let mut fields = vec![
        field("Report Id", &report.id),
        field("State", &attrs.state),
        field("Created At", &format_timestamp(&attrs.created_at)),
    ];
    for (title, value) in [
        ("Triaged At", &attrs.triaged_at),
        ("Bounty Awarded At", &attrs.bounty_awarded_at),
        ("Closed At", &attrs.closed_at),
        ("Disclosed At", &attrs.disclosed_at),
    ] {
        if let Some(at) = value {
            fields.push(field(title, &format_timestamp(at)));
        }
    }
    if detailed {
        fields.push(AttachmentField {
            title: "Report Details".to_string(),
            value: attrs.info.clone(),
            short: false,
        });
    }

    let reporter = report.reporter();
    MessageAttachment {
        title: attrs.title.clone(),
        title_link: format!("{WEB_BASE}/reports/{}", report.id),
        author_name: reporter.name.clone(),
        author_link: format!("{WEB_BASE}/{}", reporter.username),
        timestamp: attrs.created_at.clone(),
        fields,
    }
}

fn field(title: &str, value: &str) -> AttachmentField {
    AttachmentField {
        title: title.to_string(),
        value: value.to_string(),
        short: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huntrelay_core::types::ReportAttributes;

    struct StaticMapper;
    impl UsernameMapper for StaticMapper {
        fn chat_handle(&self, tracker_username: &str) -> Option<String> {
            (tracker_username == "ada").then(|| "ada.l".to_string())
        }
    }

    fn activity(kind: &str, message: &str) -> Activity {
        let mut a = Activity {
            kind: kind.to_string(),
            ..Activity::default()
        };
        a.attributes.report_id = "1337".to_string();
        a.attributes.created_at = "2021-09-02T14:29:04.833Z".to_string();
        a.attributes.message = message.to_string();
        a.relationships.actor.data.attributes.name = "Ada".to_string();
        a.relationships.actor.data.attributes.username = "ada".to_string();
        a
    }

    fn report() -> Report {
        Report {
            id: "42".to_string(),
            attributes: ReportAttributes {
                title: "XSS in search".to_string(),
                state: "triaged".to_string(),
                created_at: "2021-09-02T14:29:04Z".to_string(),
                triaged_at: Some("2021-09-03T10:00:00Z".to_string()),
                info: "details".to_string(),
                ..ReportAttributes::default()
            },
            ..Report::default()
        }
    }

    #[test]
    fn timestamp_formatting_table() {
        assert_eq!(format_timestamp(""), "-");
        assert_eq!(
            format_timestamp("2021-09-02T14:29:04.833Z"),
            "Thu Sep 02 2021 2:29 PM"
        );
        // Unparsable inputs pass through untouched.
        assert_eq!(format_timestamp("2021-09-02"), "2021-09-02");
        assert_eq!(
            format_timestamp("2021-09-02T14:29:04Z07:00"),
            "2021-09-02T14:29:04Z07:00"
        );
    }

    #[test]
    fn verb_mapping_known_and_unknown() {
        assert_eq!(activity_verb("activity-bug-triaged"), "triaged the report");
        assert_eq!(activity_verb("activity-made-up"), "activity-made-up");
    }

    #[test]
    fn activity_line_links_actor_and_report() {
        let line = activity_line(&activity("activity-bug-triaged", ""), &NoMapping);
        assert!(line.starts_with("> [Ada](https://hackerone.com/ada) "));
        assert!(line.contains("[report 1337](https://hackerone.com/reports/1337)"));
        assert!(line.contains("at Thu Sep 02 2021 2:29 PM"));
        assert!(!line.contains("```"));
    }

    #[test]
    fn activity_line_includes_message_block_and_mention() {
        let line = activity_line(&activity("activity-comment", "hello there"), &StaticMapper);
        assert!(line.contains("(@ada.l)"));
        assert!(line.contains("```\nhello there\n```"));
    }

    #[test]
    fn report_attachment_skips_unset_timestamps() {
        let att = report_attachment(&report(), false);
        let titles: Vec<&str> = att.fields.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Report Id", "State", "Created At", "Triaged At"]
        );
        assert_eq!(att.title_link, "https://hackerone.com/reports/42");
    }

    #[test]
    fn detailed_attachment_adds_wide_info_field() {
        let att = report_attachment(&report(), true);
        let details = att.fields.last().unwrap();
        assert_eq!(details.title, "Report Details");
        assert_eq!(details.value, "details");
        assert!(!details.short);
    }
}
