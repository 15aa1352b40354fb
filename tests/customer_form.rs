//! End-to-end tests for the customer form

use customer_intake::customer::{
    ADDRESSES, CONFIRM_EMAIL, EMAIL, EMAIL_GROUP, FIRST_NAME, LAST_NAME, NOTIFICATION, PHONE,
    RATING, SEND_CATALOG, ZIP, test_data,
};
use customer_intake::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn quiet_config() -> FormConfig {
    FormConfig {
        prefill_enabled: false,
        ..FormConfig::default()
    }
}

fn form_with(config: FormConfig) -> (CustomerForm, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let form = CustomerForm::new(config, sink.clone());
    (form, sink)
}

fn fill_required(form: &CustomerForm) {
    form.set_value(FIRST_NAME, "Jack").unwrap();
    form.set_value(LAST_NAME, "Harkness").unwrap();
    form.set_value(EMAIL, "jack@torchwood.uk").unwrap();
}

#[tokio::test]
async fn test_new_form_is_invalid_and_pristine() {
    let (form, _) = form_with(quiet_config());
    assert_eq!(form.status(), Status::Invalid);
    assert!(form.read(|root| root.is_pristine() && !root.is_touched()));
}

#[tokio::test]
async fn test_required_fields_make_form_valid() {
    let (form, _) = form_with(quiet_config());
    fill_required(&form);
    assert_eq!(form.status(), Status::Valid);

    form.set_value(FIRST_NAME, "Ja").unwrap();
    assert_eq!(form.status(), Status::Invalid);
    assert!(form.read(|root| root.field(FIRST_NAME).unwrap().has_error(ErrorKey::MinLength)));
}

#[tokio::test]
async fn test_save_is_not_gated_on_validity() {
    let (form, sink) = form_with(quiet_config());

    let snapshot = form.save().unwrap();
    assert_eq!(snapshot.status, Status::Invalid);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.last().unwrap(), snapshot);
    assert_eq!(snapshot.value[SEND_CATALOG], json!(true));
}

#[tokio::test]
async fn test_save_reports_sink_failure() {
    let sink = Arc::new(|_: &FormSnapshot| -> customer_intake::Result<()> {
        Err(IntakeError::Sink("disk full".to_string()))
    });
    let form = CustomerForm::new(quiet_config(), sink);
    assert!(matches!(form.save(), Err(IntakeError::Sink(ref r)) if r == "disk full"));
}

#[tokio::test]
async fn test_email_match() {
    let (form, _) = form_with(quiet_config());
    let match_error = |form: &CustomerForm| {
        form.read(|root| {
            root.group(EMAIL_GROUP)
                .unwrap()
                .errors()
                .is_some_and(|e| e.contains(ErrorKey::Match))
        })
    };

    form.set_value(EMAIL, "jack@torchwood.uk").unwrap();
    assert!(!match_error(&form), "confirmation still pristine");

    form.set_value(CONFIRM_EMAIL, "jack@torchwood.org").unwrap();
    assert!(match_error(&form));

    form.set_value(CONFIRM_EMAIL, "jack@torchwood.uk").unwrap();
    assert!(!match_error(&form));
}

#[tokio::test]
async fn test_phone_required_only_for_text() {
    let (form, _) = form_with(quiet_config());
    fill_required(&form);

    form.set_value(NOTIFICATION, Notification::Text).unwrap();
    assert_eq!(form.status(), Status::Invalid);
    assert!(form.read(|root| root.field(PHONE).unwrap().has_error(ErrorKey::Required)));

    // running the reaction again changes nothing
    form.set_value(NOTIFICATION, Notification::Text).unwrap();
    assert_eq!(
        form.read(|root| root.field(PHONE).unwrap().validators().len()),
        1
    );

    form.set_value(PHONE, "555-0100").unwrap();
    assert_eq!(form.status(), Status::Valid);

    form.set_value(PHONE, "").unwrap();
    form.set_value(NOTIFICATION, Notification::Email).unwrap();
    assert_eq!(form.status(), Status::Valid);
    assert!(form.read(|root| root.field(PHONE).unwrap().errors().is_none()));
}

#[tokio::test]
async fn test_rating_range() {
    let (form, _) = form_with(quiet_config());
    let rating_ok = |form: &CustomerForm| form.read(|root| root.field(RATING).unwrap().is_valid());

    for accepted in [FieldValue::Number(1.0), 3.into(), 5.into(), FieldValue::Null] {
        form.set_value(RATING, accepted).unwrap();
        assert!(rating_ok(&form));
    }
    for rejected in [FieldValue::Number(0.0), 6.into(), "abc".into(), (-1).into()] {
        form.set_value(RATING, rejected).unwrap();
        assert!(!rating_ok(&form));
    }
}

#[tokio::test]
async fn test_addresses_append_and_remove() {
    let (form, _) = form_with(quiet_config());
    form.set_value("addresses.0.city", "Cardiff").unwrap();

    assert_eq!(form.append_address().unwrap(), 1);
    assert_eq!(form.append_address().unwrap(), 2);
    form.set_value("addresses.2.city", "London").unwrap();

    let cities = |form: &CustomerForm| -> Vec<String> {
        form.value()[ADDRESSES]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["city"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(cities(&form), vec!["Cardiff", "", "London"]);

    form.remove_address(1).unwrap();
    assert_eq!(cities(&form), vec!["Cardiff", "London"]);
    assert_eq!(
        form.read(|root| root.field("addresses.1.city").unwrap().value().clone()),
        FieldValue::text("London")
    );

    assert!(matches!(
        form.remove_address(5),
        Err(IntakeError::Form(FormError::OutOfRange { index: 5, len: 2 }))
    ));
}

#[tokio::test]
async fn test_new_addresses_default_to_home() {
    let (form, _) = form_with(quiet_config());
    form.set_value("addresses.0.addressType", "work").unwrap();
    let index = form.append_address().unwrap();
    assert_eq!(
        form.value()[ADDRESSES][index]["addressType"],
        json!("home")
    );
}

#[tokio::test]
async fn test_patch_with_wrong_shape_is_rejected() {
    let (form, _) = form_with(quiet_config());
    let err = form.patch_value(&json!({EMAIL_GROUP: "flat"})).unwrap_err();
    assert!(matches!(err, IntakeError::Form(FormError::InvalidPatch { .. })));
    assert!(form.read(|root| root.is_pristine()));
}

#[tokio::test]
async fn test_unknown_path_is_reported() {
    let (form, _) = form_with(quiet_config());
    assert!(matches!(
        form.set_value("middleName", "x"),
        Err(IntakeError::Form(FormError::NotFound(_)))
    ));
    assert!(form.mark_touched("emailGroup.nope").is_err());
}

#[tokio::test]
async fn test_populate_test_data_changes_only_patched_keys() {
    let (form, _) = form_with(quiet_config());
    form.set_value(ZIP, "CF10").unwrap();
    let before = form.value();

    form.populate_test_data(&test_data()).unwrap();
    let after = form.value();

    assert_eq!(after[FIRST_NAME], json!("Jack"));
    assert_eq!(after[LAST_NAME], json!("Harkness"));
    assert_eq!(after[SEND_CATALOG], json!(false));
    for key in [EMAIL_GROUP, PHONE, NOTIFICATION, RATING, ADDRESSES, ZIP] {
        assert_eq!(after[key], before[key], "{} changed", key);
    }
}

#[tokio::test(start_paused = true)]
async fn test_prefill_runs_once_after_delay() {
    let (form, _) = form_with(FormConfig::default());
    form.set_value(ZIP, "CF10").unwrap();

    tokio::time::sleep(Duration::from_millis(4999)).await;
    assert_eq!(form.value()[FIRST_NAME], json!(""));

    tokio::time::sleep(Duration::from_millis(2)).await;
    let value = form.value();
    assert_eq!(value[FIRST_NAME], json!("Jack"));
    assert_eq!(value[LAST_NAME], json!("Harkness"));
    assert_eq!(value[SEND_CATALOG], json!(false));
    assert_eq!(value[ZIP], json!("CF10"));

    // the user edits after the prefill; nothing overwrites it again
    form.set_value(FIRST_NAME, "Ianto").unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(form.value()[FIRST_NAME], json!("Ianto"));
}

#[tokio::test(start_paused = true)]
async fn test_reinitialize_restarts_prefill() {
    let (form, _) = form_with(FormConfig::default());
    form.set_value(ZIP, "CF10").unwrap();

    tokio::time::sleep(Duration::from_millis(1000)).await;
    form.reinitialize();
    assert_eq!(form.value()[ZIP], json!(""));
    assert!(form.read(|root| root.is_pristine()));

    // the first deadline passes without a prefill
    tokio::time::sleep(Duration::from_millis(4999)).await;
    assert_eq!(form.value()[FIRST_NAME], json!(""));

    // five seconds after the rebuild
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(form.value()[FIRST_NAME], json!("Jack"));
    assert_eq!(form.value()[ZIP], json!(""));

    tokio::time::sleep(Duration::from_secs(10)).await;
    form.set_value(FIRST_NAME, "Ianto").unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(form.value()[FIRST_NAME], json!("Ianto"));
}

#[tokio::test]
async fn test_debug_does_not_block_inside_read() {
    let (form, _) = form_with(quiet_config());
    let rendered = form.read(|_| format!("{:?}", form));
    assert!(rendered.starts_with("CustomerForm"));
    assert!(format!("{:?}", form).contains("Invalid"));
}

#[tokio::test]
async fn test_whole_numbers_save_as_integers() {
    let (form, _) = form_with(quiet_config());
    form.patch_value(&json!({RATING: 4})).unwrap();
    let snapshot = form.save().unwrap();
    assert_eq!(snapshot.value[RATING], json!(4));
    assert!(snapshot.to_json().unwrap().contains(r#""rating":4,"#));
}

#[tokio::test(start_paused = true)]
async fn test_reactions_survive_reinitialize() {
    let (form, _) = form_with(quiet_config());
    form.reinitialize();
    form.set_value(NOTIFICATION, Notification::Text).unwrap();
    assert!(form.read(|root| root.field(PHONE).unwrap().has_error(ErrorKey::Required)));
}

#[tokio::test(start_paused = true)]
async fn test_email_message_is_debounced() {
    let (form, _) = form_with(quiet_config());

    for typed in ["j", "ja", "jac", "jack"] {
        form.set_value(EMAIL, typed).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    assert_eq!(form.message(EMAIL), None, "still inside the quiet period");
    assert_eq!(form.message_refreshes(), 0);

    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(form.message_refreshes(), 1);
    assert_eq!(
        form.message(EMAIL).as_deref(),
        Some("Please enter a valid email address.")
    );

    for typed in ["jack@", "jack@torchwood", "jack@torchwood.uk"] {
        form.set_value(EMAIL, typed).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(form.message(EMAIL).is_some(), "old message kept until the burst settles");

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(form.message(EMAIL), None);
    assert_eq!(form.message_refreshes(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_email_message_uses_final_state() {
    let (form, _) = form_with(quiet_config());

    form.set_value(EMAIL, "not-an-email").unwrap();
    form.set_value(EMAIL, "").unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(form.message_refreshes(), 1);
    assert_eq!(
        form.message(EMAIL).as_deref(),
        Some("This field is required.")
    );
}

#[tokio::test]
async fn test_saved_value_reads_as_customer() {
    let (form, _) = form_with(quiet_config());
    form.populate_test_data(&test_data()).unwrap();
    form.set_value(RATING, 4).unwrap();

    let customer = form.save().unwrap().customer().unwrap();
    assert_eq!(customer.first_name, "Jack");
    assert_eq!(customer.rating, Some(4.0));
    assert!(!customer.send_catalog);
    assert_eq!(customer.notification, Notification::Email);
}
