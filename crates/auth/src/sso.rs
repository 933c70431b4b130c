//! SSO configuration document served by the backend (or as a static file next to the
//! dashboard) and the access rules it carries.

use athena_api::{sso, RequestConfig, Role};

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SsoConfig {
	pub providers: Vec<SsoProvider>,
	pub branding: Branding,
	pub access_control: AccessControl,
	pub features: Features,
	pub security: Security,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
	Google,
	Microsoft,
	Oidc,
	Saml,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoProvider {
	pub id: String,
	pub name: String,
	#[serde(rename = "type")]
	pub kind: ProviderKind,
	#[serde(default = "enabled_by_default")]
	pub enabled: bool,
	#[serde(default)]
	pub client_id: Option<String>,
	/// Overrides the global domain list for logins through this provider
	#[serde(default)]
	pub allowed_domains: Vec<String>,
	#[serde(default)]
	pub button_text: Option<String>,
}

const fn enabled_by_default() -> bool {
	true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Branding {
	pub app_name: String,
	pub logo_url: Option<String>,
	pub primary_color: Option<String>,
	pub login_message: Option<String>,
}

impl Default for Branding {
	fn default() -> Self {
		Self {
			app_name: "Athena".to_string(),
			logo_url: None,
			primary_color: None,
			login_message: None,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessControl {
	pub allowed_domains: Vec<String>,
	/// Admitted regardless of their domain
	pub allowed_emails: Vec<String>,
	pub blocked_emails: Vec<String>,
	pub admin_emails: Vec<String>,
	pub super_admin_emails: Vec<String>,
	pub default_role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Features {
	pub sandbox_mode: bool,
	pub insurance_override: bool,
	pub reports: bool,
	pub remember_me: bool,
}

impl Default for Features {
	fn default() -> Self {
		Self {
			sandbox_mode: true,
			insurance_override: true,
			reports: true,
			remember_me: false,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Security {
	pub session_timeout_minutes: u32,
	pub require_https: bool,
	pub max_login_attempts: u32,
}

impl Default for Security {
	fn default() -> Self {
		Self {
			session_timeout_minutes: 480,
			require_https: true,
			max_login_attempts: 5,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "detail", rename_all = "lowercase")]
pub enum AccessDecision {
	Allowed(Role),
	Denied(String),
}

impl AccessDecision {
	#[must_use]
	pub const fn is_allowed(&self) -> bool {
		matches!(self, Self::Allowed(_))
	}
}

fn contains_email(list: &[String], email: &str) -> bool {
	list.iter().any(|e| e.trim().eq_ignore_ascii_case(email))
}

fn domain_allowed(domains: &[String], domain: &str) -> bool {
	domains.iter().any(|d| {
		d.trim()
			.trim_start_matches('@')
			.eq_ignore_ascii_case(domain)
	})
}

impl AccessControl {
	/// Decide whether `email` may sign in, optionally through a specific provider, and with
	/// which role. Block lists win over everything, explicit emails skip the domain check.
	#[must_use]
	pub fn evaluate(&self, email: &str, provider: Option<&SsoProvider>) -> AccessDecision {
		let email = email.trim().to_lowercase();

		let Some((_, domain)) = email.rsplit_once('@').filter(|(user, domain)| {
			!user.is_empty() && !domain.is_empty()
		}) else {
			return AccessDecision::Denied(format!("'{email}' is not a valid email address"));
		};

		if let Some(provider) = provider {
			if !provider.enabled {
				return AccessDecision::Denied(format!("{} sign-in is disabled", provider.name));
			}
		}

		if contains_email(&self.blocked_emails, &email) {
			return AccessDecision::Denied(format!("{email} is blocked"));
		}

		let domains = provider
			.map(|p| p.allowed_domains.as_slice())
			.filter(|d| !d.is_empty())
			.unwrap_or(self.allowed_domains.as_slice());

		if !domains.is_empty()
			&& !domain_allowed(domains, domain)
			&& !contains_email(&self.allowed_emails, &email)
		{
			return AccessDecision::Denied(format!("the {domain} domain is not allowed"));
		}

		let role = if contains_email(&self.super_admin_emails, &email) {
			Role::SuperAdmin
		} else if contains_email(&self.admin_emails, &email) {
			Role::Admin
		} else {
			self.default_role
		};

		AccessDecision::Allowed(role)
	}
}

impl SsoConfig {
	pub fn enabled_providers(&self) -> impl Iterator<Item = &SsoProvider> {
		self.providers.iter().filter(|p| p.enabled)
	}

	#[must_use]
	pub fn provider(&self, id: &str) -> Option<&SsoProvider> {
		self.providers.iter().find(|p| p.id == id)
	}

	#[must_use]
	pub fn evaluate(&self, email: &str, provider_id: Option<&str>) -> AccessDecision {
		match provider_id {
			Some(id) => match self.provider(id) {
				Some(provider) => self.access_control.evaluate(email, Some(provider)),
				None => AccessDecision::Denied(format!("unknown provider '{id}'")),
			},
			None => self.access_control.evaluate(email, None),
		}
	}
}

/// Load the SSO config from the API, falling back to the static `sso-config.json`
#[instrument(skip(config))]
pub async fn load(config: RequestConfig, static_origin: &str) -> Result<SsoConfig, athena_api::Error> {
	let client = config.client.clone();

	match sso::config(config).await {
		Ok(doc) => Ok(doc),
		Err(e) => {
			warn!(%e, "SSO config endpoint failed, trying the static file");
			sso::static_config(&client, static_origin).await
		}
	}
}
