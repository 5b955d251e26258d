use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::auth::validate::FormErrors;

/// Account profile of the signed-in user. Every field is optional so the
/// same type doubles as the partial update body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationProvider {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub subscribe_name: String,
    pub topic_provider: String,
    #[serde(default)]
    pub topic_config: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAlarm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub target: Option<String>,
    pub target_id: Option<String>,
    pub state: Option<String>,
    /// Milliseconds since the epoch.
    pub create_time: Option<i64>,
}

impl DeviceAlarm {
    pub fn target_text(&self) -> String {
        match (&self.target, &self.target_id) {
            (Some(t), Some(id)) => format!("{t}: {id}"),
            (Some(t), None) => t.clone(),
            (None, Some(id)) => id.clone(),
            (None, None) => String::new(),
        }
    }

    pub fn state_text(&self) -> &str {
        self.state.as_deref().unwrap_or("unknown")
    }

    pub fn created_display(&self) -> String {
        self.create_time
            .and_then(DateTime::from_timestamp_millis)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub description: String,
    pub csrf_token: String,
}

impl ProfileForm {
    /// Validate and build the partial update. Empty optional fields are sent
    /// as empty strings so the backend can clear them.
    pub fn validate(&self) -> Result<UserDetail, Vec<String>> {
        let mut errors = FormErrors::new();
        errors.required("Name", &self.name, 64);
        errors.email(&self.email);
        errors.optional("Telephone", &self.telephone, 32);
        errors.optional("Description", &self.description, 255);
        errors.finish(UserDetail {
            name: Some(self.name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            telephone: Some(self.telephone.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            ..UserDetail::default()
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

impl PasswordForm {
    pub fn validate(&self) -> Result<PasswordChange, Vec<String>> {
        let mut errors = FormErrors::new();
        if self.old_password.is_empty() {
            errors.push("Current password is required");
        }
        errors.new_password(&self.new_password);
        if self.new_password != self.confirm_password {
            errors.push("New passwords do not match");
        }
        errors.finish(PasswordChange {
            old_password: self.old_password.clone(),
            new_password: self.new_password.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    pub subscribe_name: String,
    pub topic_provider: String,
    #[serde(default)]
    pub topic_config: String,
    pub csrf_token: String,
}

impl SubscribeForm {
    pub fn validate(&self) -> Result<Subscription, Vec<String>> {
        let mut errors = FormErrors::new();
        errors.required("Subscription name", &self.subscribe_name, 64);
        if self.topic_provider.trim().is_empty() {
            errors.push("Choose a notification provider");
        }
        let topic_config = match self.topic_config.trim() {
            "" => serde_json::json!({}),
            raw => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(v) if v.is_object() => v,
                _ => {
                    errors.push("Topic config must be a JSON object");
                    serde_json::Value::Null
                }
            },
        };
        errors.finish(Subscription {
            id: None,
            subscribe_name: self.subscribe_name.trim().to_string(),
            topic_provider: self.topic_provider.trim().to_string(),
            topic_config,
            state: Some("enabled".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_omits_absent_fields() {
        let partial = UserDetail { name: Some("Ada".into()), ..Default::default() };
        let json = serde_json::to_value(&partial).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Ada" }));
    }

    #[test]
    fn password_change_is_camel_case() {
        let pc = PasswordChange { old_password: "a".into(), new_password: "b".into() };
        let json = serde_json::to_value(&pc).unwrap();
        assert_eq!(json["oldPassword"], "a");
        assert_eq!(json["newPassword"], "b");
    }

    #[test]
    fn password_form_requires_matching_confirmation() {
        let form = PasswordForm {
            old_password: "old-secret".into(),
            new_password: "new-secret".into(),
            confirm_password: "new-secrez".into(),
            csrf_token: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors, vec!["New passwords do not match".to_string()]);
    }

    #[test]
    fn profile_form_checks_email() {
        let form = ProfileForm { name: "Ada".into(), email: "nope".into(), ..Default::default() };
        assert_eq!(form.validate().unwrap_err().len(), 1);
        let form = ProfileForm { name: "Ada".into(), ..Default::default() };
        assert_eq!(form.validate().unwrap().name.as_deref(), Some("Ada"));
    }

    #[test]
    fn subscribe_form_rejects_non_object_config() {
        let form = SubscribeForm {
            subscribe_name: "alarms".into(),
            topic_provider: "device_alarm".into(),
            topic_config: "42".into(),
            csrf_token: String::new(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn alarm_target_and_time() {
        let alarm: DeviceAlarm = serde_json::from_str(
            r#"{"id":"a1","name":"Overheat","target":"device","targetId":"dev-9","createTime":0}"#,
        )
        .unwrap();
        assert_eq!(alarm.target_text(), "device: dev-9");
        assert!(!alarm.created_display().is_empty());
        assert_eq!(alarm.state_text(), "unknown");
    }
}
