//! Tests for model parsing, validation and request conversion.

use jiff::{
    civil::{date, Weekday},
    Timestamp,
};

use super::*;
use crate::{params, TrackerError};

fn create_test_template() -> RecurringTemplate {
    let ts = Timestamp::from_second(1_767_225_600).unwrap();
    RecurringTemplate {
        id: 1,
        owner_id: 1,
        project_id: None,
        name: "Pay rent".to_string(),
        description: None,
        priority: Priority::High,
        category: Some("finance".to_string()),
        due_time: None,
        start_date: date(2026, 1, 1),
        active: true,
        pattern: RecurrencePattern::monthly(1, 1),
        created_at: ts,
        updated_at: ts,
    }
}

fn create_template_params() -> params::CreateTemplate {
    params::CreateTemplate {
        owner_id: 1,
        project_id: None,
        name: "Gym".to_string(),
        description: None,
        priority: Some("low".to_string()),
        category: None,
        due_time: None,
        start_date: date(2026, 1, 5),
        active: true,
        frequency: "weekly".to_string(),
        interval: 1,
        weekdays: vec!["mon".to_string(), "Wednesday".to_string()],
        month_day: None,
        max_instances: None,
        end_date: None,
    }
}

fn invalid_field(result: crate::Result<impl std::fmt::Debug>) -> String {
    match result {
        Err(TrackerError::InvalidInput { field, .. }) => field,
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[test]
fn test_status_round_trip_through_strings() {
    for status in TaskStatus::ALL {
        assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
    }
    assert!("on_hold".parse::<TaskStatus>().is_err());
}

#[test]
fn test_legacy_status_mapping() {
    assert_eq!(TaskStatus::from_legacy("not_started"), TaskStatus::Todo);
    assert_eq!(TaskStatus::from_legacy("on_hold"), TaskStatus::Todo);
    assert_eq!(TaskStatus::from_legacy("In-Progress"), TaskStatus::InProgress);
    assert_eq!(TaskStatus::from_legacy("done"), TaskStatus::Completed);
    assert_eq!(TaskStatus::from_legacy("review"), TaskStatus::Review);
    assert_eq!(TaskStatus::from_legacy("something else"), TaskStatus::Todo);
}

#[test]
fn test_only_todo_is_ungated() {
    assert!(!TaskStatus::Todo.is_gated());
    assert!(TaskStatus::InProgress.is_gated());
    assert!(TaskStatus::Review.is_gated());
    assert!(TaskStatus::Completed.is_gated());
}

#[test]
fn test_status_serializes_snake_case() {
    let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
    assert_eq!(json, "\"in_progress\"");
}

#[test]
fn test_weekdays_parse_and_serialize() {
    let days: Weekdays = "fri, mon,wed".parse().unwrap();
    assert_eq!(days.len(), 3);
    assert!(days.contains(Weekday::Monday));
    assert!(!days.contains(Weekday::Tuesday));
    assert_eq!(days.names(), vec!["monday", "wednesday", "friday"]);
    assert_eq!(
        serde_json::to_string(&days).unwrap(),
        r#"["monday","wednesday","friday"]"#
    );

    let back: Weekdays = serde_json::from_str(r#"["friday","monday","wednesday"]"#).unwrap();
    assert_eq!(back, days);

    assert!("mo".parse::<Weekdays>().is_err());
    assert!("funday".parse::<Weekdays>().is_err());
}

#[test]
fn test_pattern_validation() {
    assert_eq!(invalid_field(RecurrencePattern::daily(0).validate()), "interval");
    assert_eq!(
        invalid_field(RecurrencePattern::custom(2, Weekdays::empty()).validate()),
        "weekdays"
    );

    let mut monthly = RecurrencePattern::monthly(1, 32);
    assert_eq!(invalid_field(monthly.validate()), "month_day");
    monthly.month_day = None;
    assert_eq!(invalid_field(monthly.validate()), "month_day");
    monthly.month_day = Some(31);
    assert!(monthly.validate().is_ok());

    assert_eq!(
        invalid_field(RecurrencePattern::daily(1).limited(0).validate()),
        "max_instances"
    );
    assert!(RecurrencePattern::daily(1).limited(1).validate().is_ok());
}

#[test]
fn test_limit_reached_counts_receipts() {
    let unlimited = RecurrencePattern::daily(1);
    assert!(!unlimited.limit_reached(u64::MAX));

    let limited = RecurrencePattern::daily(1).limited(3);
    assert!(!limited.limit_reached(2));
    assert!(limited.limit_reached(3));
    assert!(limited.limit_reached(4));
}

#[test]
fn test_template_end_before_start_rejected() {
    let mut template = create_test_template();
    template.pattern.end_date = Some(date(2025, 12, 31));
    assert_eq!(invalid_field(template.validate()), "end_date");
}

#[test]
fn test_new_template_from_params() {
    let template = NewTemplate::try_from(create_template_params()).unwrap();
    assert_eq!(template.pattern.frequency, Frequency::Weekly);
    assert_eq!(template.priority, Priority::Low);
    assert!(template.pattern.weekdays.contains(Weekday::Wednesday));

    let mut bad = create_template_params();
    bad.weekdays.clear();
    assert_eq!(invalid_field(NewTemplate::try_from(bad)), "weekdays");

    let mut bad = create_template_params();
    bad.frequency = "yearly".to_string();
    assert_eq!(invalid_field(NewTemplate::try_from(bad)), "frequency");

    let mut bad = create_template_params();
    bad.name = "  ".to_string();
    assert_eq!(invalid_field(NewTemplate::try_from(bad)), "name");
}

#[test]
fn test_new_task_requires_name() {
    let params = params::CreateTask {
        owner_id: 1,
        name: String::new(),
        ..params::CreateTask::default()
    };
    assert_eq!(invalid_field(NewTask::try_from(params)), "name");

    let params = params::CreateTask {
        owner_id: 1,
        name: "Call plumber".to_string(),
        priority: Some("urgent".to_string()),
        ..params::CreateTask::default()
    };
    assert_eq!(invalid_field(NewTask::try_from(params)), "priority");
}

#[test]
fn test_template_changes_apply_and_describe() {
    let mut template = create_test_template();
    let changes = TemplateChanges::try_from(params::UpdateTemplate {
        id: 1,
        name: Some("Pay rent and utilities".to_string()),
        month_day: Some(28),
        active: Some(false),
        ..params::UpdateTemplate::default()
    })
    .unwrap();

    let described = changes.apply_to(&mut template).unwrap();
    assert_eq!(template.name, "Pay rent and utilities");
    assert_eq!(template.pattern.month_day, Some(28));
    assert!(!template.active);
    assert_eq!(described.len(), 3);
}

#[test]
fn test_invalid_changes_leave_template_untouched() {
    let mut template = create_test_template();
    let before = template.clone();
    let changes = TemplateChanges::try_from(params::UpdateTemplate {
        id: 1,
        name: Some("Renamed".to_string()),
        frequency: Some("weekly".to_string()),
        ..params::UpdateTemplate::default()
    })
    .unwrap();

    assert_eq!(invalid_field(changes.apply_to(&mut template)), "weekdays");
    assert_eq!(template, before);
}

#[test]
fn test_clear_end_date() {
    let mut template = create_test_template();
    template.pattern.end_date = Some(date(2026, 6, 1));

    let changes = TemplateChanges::try_from(params::UpdateTemplate {
        id: 1,
        clear_end_date: true,
        ..params::UpdateTemplate::default()
    })
    .unwrap();
    assert!(!changes.is_empty());
    changes.apply_to(&mut template).unwrap();
    assert_eq!(template.pattern.end_date, None);

    let conflicting = TemplateChanges::try_from(params::UpdateTemplate {
        id: 1,
        clear_end_date: true,
        end_date: Some(date(2026, 7, 1)),
        ..params::UpdateTemplate::default()
    });
    assert_eq!(invalid_field(conflicting), "end_date");
}

#[test]
fn test_instance_limit_changes() {
    let mut template = create_test_template();

    let changes = TemplateChanges::try_from(params::UpdateTemplate {
        id: 1,
        max_instances: Some(12),
        ..params::UpdateTemplate::default()
    })
    .unwrap();
    let described = changes.apply_to(&mut template).unwrap();
    assert_eq!(described, vec!["Instance limit set to 12".to_string()]);
    assert_eq!(template.pattern.max_instances, Some(12));

    let conflicting = TemplateChanges::try_from(params::UpdateTemplate {
        id: 1,
        max_instances: Some(3),
        clear_max_instances: true,
        ..params::UpdateTemplate::default()
    });
    assert_eq!(invalid_field(conflicting), "max_instances");
}

#[test]
fn test_task_filter_rejects_unknown_status() {
    let filter = TaskFilter::try_from(params::ListTasks {
        status: Some("blocked".to_string()),
        ..params::ListTasks::default()
    });
    assert_eq!(invalid_field(filter), "status");
}
