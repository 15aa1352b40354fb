//! Customer schema
//!
//! The static shape of the intake form, the reaction that makes `phone`
//! required for text notifications, and a typed view of a saved value.

use intake_forms::{CollectionNode, FieldNode, GroupNode, ValueChange, toggle_validators};
use intake_validation::validators::{
    email, matching, max_length, min_length, one_of, range, required,
};
use intake_validation::FieldValue;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const EMAIL_GROUP: &str = "emailGroup";
pub const EMAIL: &str = "emailGroup.email";
pub const CONFIRM_EMAIL: &str = "emailGroup.confirmEmail";
pub const PHONE: &str = "phone";
pub const NOTIFICATION: &str = "notification";
pub const RATING: &str = "rating";
pub const SEND_CATALOG: &str = "sendCatalog";
pub const ADDRESSES: &str = "addresses";
pub const ZIP: &str = "zip";

/// How the customer wants to be contacted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Notification {
    #[default]
    Email,
    Text,
}

impl Notification {
    pub const ALL: [Notification; 2] = [Notification::Email, Notification::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Notification::Email => "email",
            Notification::Text => "text",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Notification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Notification::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| format!("Unknown notification preference: {}", s))
    }
}

impl From<Notification> for FieldValue {
    fn from(notification: Notification) -> Self {
        FieldValue::text(notification.as_str())
    }
}

/// One entry of the `addresses` collection
pub fn address_group() -> GroupNode {
    GroupNode::new()
        .with_control("addressType", FieldNode::new("home"))
        .with_control("street1", FieldNode::new(""))
        .with_control("street2", FieldNode::new(""))
        .with_control("city", FieldNode::new(""))
        .with_control("state", FieldNode::new(""))
        .with_control("zip", FieldNode::new(""))
}

/// Build a fresh customer tree
pub fn customer_schema() -> GroupNode {
    let notifications: Vec<&str> = Notification::ALL.iter().map(Notification::as_str).collect();

    GroupNode::new()
        .with_control(
            FIRST_NAME,
            FieldNode::with_validators("", vec![required(), min_length(3)]),
        )
        .with_control(
            LAST_NAME,
            FieldNode::with_validators("", vec![required(), max_length(40)]),
        )
        .with_control(
            EMAIL_GROUP,
            GroupNode::new()
                .with_control("email", FieldNode::with_validators("", vec![required(), email()]))
                .with_control("confirmEmail", FieldNode::new(""))
                .with_validators(vec![matching("email", "confirmEmail")]),
        )
        .with_control(PHONE, FieldNode::new(""))
        .with_control(
            NOTIFICATION,
            FieldNode::with_validators(Notification::default(), vec![one_of(&notifications)]),
        )
        .with_control(
            RATING,
            FieldNode::with_validators(FieldValue::Null, vec![range(1.0, 5.0)]),
        )
        .with_control(SEND_CATALOG, FieldNode::new(true))
        .with_control(ADDRESSES, CollectionNode::new(address_group).with_entries(1))
        .with_control(ZIP, FieldNode::new(""))
}

/// `phone` is required while notifications go by text
pub fn notification_reaction()
-> impl Fn(&ValueChange, &mut GroupNode) -> intake_forms::Result<()> + Send + Sync + 'static {
    toggle_validators(
        PHONE,
        |value: &Value| value.as_str() == Some(Notification::Text.as_str()),
        vec![required()],
    )
}

/// Patch applied by the delayed prefill
pub fn test_data() -> Value {
    json!({
        FIRST_NAME: "Jack",
        LAST_NAME: "Harkness",
        SEND_CATALOG: false
    })
}

/// Typed view of a saved customer value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email_group: EmailGroup,
    pub phone: String,
    pub notification: Notification,
    pub rating: Option<f64>,
    pub send_catalog: bool,
    pub addresses: Vec<Address>,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailGroup {
    pub email: String,
    pub confirm_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address_type: String,
    pub street1: String,
    pub street2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_forms::{RevalidationEngine, Status};
    use intake_validation::ErrorKey;

    #[test]
    fn test_schema_initial_value() {
        let form = customer_schema();
        assert_eq!(
            form.value(),
            json!({
                "firstName": "",
                "lastName": "",
                "emailGroup": {"email": "", "confirmEmail": ""},
                "phone": "",
                "notification": "email",
                "rating": null,
                "sendCatalog": true,
                "addresses": [{
                    "addressType": "home",
                    "street1": "",
                    "street2": "",
                    "city": "",
                    "state": "",
                    "zip": ""
                }],
                "zip": ""
            })
        );
        assert_eq!(form.status(), Status::Invalid);
        assert!(form.is_pristine());
    }

    #[test]
    fn test_initial_value_deserializes() {
        let customer: Customer = serde_json::from_value(customer_schema().value()).unwrap();
        assert_eq!(customer.notification, Notification::Email);
        assert_eq!(customer.rating, None);
        assert!(customer.send_catalog);
        assert_eq!(customer.addresses.len(), 1);
        assert_eq!(customer.addresses[0].address_type, "home");
    }

    #[test]
    fn test_notification_rejects_unknown_values() {
        let mut form = customer_schema();
        form.set_value(NOTIFICATION, "carrier pigeon").unwrap();
        assert!(form.field(NOTIFICATION).unwrap().has_error(ErrorKey::OneOf));
    }

    #[test]
    fn test_notification_reaction() {
        let mut form = customer_schema();
        let mut engine = RevalidationEngine::new();
        engine.watch(NOTIFICATION, notification_reaction());

        let change = form.set_value(NOTIFICATION, Notification::Text).unwrap();
        engine.dispatch(&change, &mut form).unwrap();
        assert!(form.field(PHONE).unwrap().has_error(ErrorKey::Required));

        form.set_value(PHONE, "555-0100").unwrap();
        assert!(form.field(PHONE).unwrap().is_valid());

        let change = form.set_value(NOTIFICATION, Notification::Email).unwrap();
        engine.dispatch(&change, &mut form).unwrap();
        assert!(form.field(PHONE).unwrap().validators().is_empty());
    }

    #[test]
    fn test_notification_parsing() {
        assert_eq!("text".parse::<Notification>().unwrap(), Notification::Text);
        assert!("fax".parse::<Notification>().is_err());
        assert_eq!(Notification::Email.to_string(), "email");
    }

    #[test]
    fn test_data_patch_keys() {
        let patch = test_data();
        let keys: Vec<&String> = patch.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["firstName", "lastName", "sendCatalog"]);
    }
}
