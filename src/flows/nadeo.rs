//! Ticket-based flows minting the `NadeoServices` and `NadeoLiveServices` tokens.
//!
//! A refresh is two queued calls: the Ubisoft session endpoint turns the account credentials
//! into a short-lived ticket, and the Nadeo token endpoint exchanges that ticket for a token
//! scoped to one audience. The token's lifetime comes from its own `exp` claim.

// crates.io
use oauth2::http::{HeaderName, HeaderValue};
// self
use crate::{
	_prelude::*,
	auth::{ClaimsError, NadeoCredentials, Secret, TokenClaims, TokenFamily, TokenRecord},
	error::{ConfigError, DecodeError},
	flows::{Broker, common},
	http::HttpTransport,
};

const TICKET_CONTEXT: &str = "ubi_ticket";
const UBI_APP_ID_HEADER: HeaderName = HeaderName::from_static("ubi-appid");

/// Ubisoft session ticket, exchanged for Nadeo tokens.
#[derive(Clone, Debug, Deserialize)]
pub struct UbiTicket {
	/// Opaque ticket value.
	pub ticket: Secret,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NadeoTokenResponse {
	access_token: Option<String>,
	refresh_token: Option<String>,
}

impl<C> Broker<C>
where
	C: ?Sized + HttpTransport,
{
	/// Returns the `NadeoServices` token used by the Core services.
	pub async fn nadeo_services_token(&self) -> Result<Secret> {
		self.nadeo_token(TokenFamily::NadeoServices).await
	}

	/// Returns the `NadeoLiveServices` token used by the Live services.
	pub async fn nadeo_live_services_token(&self) -> Result<Secret> {
		self.nadeo_token(TokenFamily::NadeoLiveServices).await
	}

	/// Requests a fresh Ubisoft session ticket. Tickets are never cached.
	pub async fn ubi_ticket(&self) -> Result<UbiTicket> {
		let credentials =
			self.nadeo_credentials.as_ref().ok_or(ConfigError::MissingAccountCredentials)?;

		self.request_ticket(credentials).await
	}

	async fn nadeo_token(&self, family: TokenFamily) -> Result<Secret> {
		common::cached_or_refresh(self, family, || async move {
			let credentials = self
				.nadeo_credentials
				.as_ref()
				.ok_or(ConfigError::MissingCredentials { family })?;
			let ticket = self.request_ticket(credentials).await?;

			self.exchange_ticket(&ticket, family).await
		})
		.await
	}

	async fn request_ticket(&self, credentials: &NadeoCredentials) -> Result<UbiTicket> {
		let mut request = common::json_request(self, &self.endpoints.ubi_session)?;
		let app_id = HeaderValue::from_str(&self.endpoints.ubi_app_id)
			.map_err(|source| ConfigError::InvalidHeader { name: "Ubi-AppId", source })?;

		request.headers_mut().insert(UBI_APP_ID_HEADER, app_id);
		common::authorize(&mut request, &credentials.basic_authorization())?;

		let body = common::dispatch(self, TICKET_CONTEXT, request, Some(Vec::new())).await?;
		let ticket: UbiTicket = common::decode_json(TICKET_CONTEXT, &body)?;

		if ticket.ticket.is_empty() {
			return Err(
				DecodeError::MissingField { context: TICKET_CONTEXT.into(), field: "ticket" }.into()
			);
		}

		Ok(ticket)
	}

	async fn exchange_ticket(
		&self,
		ticket: &UbiTicket,
		family: TokenFamily,
	) -> Result<TokenRecord> {
		let context = family.refresh_context();
		let mut request = common::json_request(self, &self.endpoints.nadeo_token)?;

		common::authorize(&mut request, &format!("ubi_v1 t={}", ticket.ticket.expose()))?;

		let payload = serde_json::to_vec(&serde_json::json!({ "audience": family.audience() }))
			.map_err(|e| DecodeError::Unexpected {
				context: context.into(),
				message: e.to_string(),
			})?;
		let body = common::dispatch(self, context, request, Some(payload)).await?;
		let response: NadeoTokenResponse = common::decode_json(context, &body)?;

		token_record(context, family, response, OffsetDateTime::now_utc())
	}
}

fn token_record(
	context: &str,
	family: TokenFamily,
	response: NadeoTokenResponse,
	issued_at: OffsetDateTime,
) -> Result<TokenRecord> {
	let access_token =
		response.access_token.filter(|token| !token.is_empty()).ok_or_else(|| {
			DecodeError::MissingField { context: context.into(), field: "accessToken" }
		})?;
	let claims_error =
		|source: ClaimsError| DecodeError::Claims { context: context.into(), source };
	let claims = TokenClaims::decode(&access_token).map_err(claims_error)?;
	let expires_at = claims.expires_at().map_err(claims_error)?;
	let refresh_at = match family {
		TokenFamily::NadeoLiveServices => Some(claims.required_refresh_at().map_err(claims_error)?),
		_ => claims.refresh_at().map_err(claims_error)?,
	};
	let mut builder = TokenRecord::builder(family)
		.access_token(access_token)
		.issued_at(issued_at)
		.expires_at(expires_at)
		.refresh_at(refresh_at);

	if let Some(refresh_token) = response.refresh_token {
		builder = builder.refresh_token(refresh_token);
	}

	let record = builder
		.build()
		.map_err(|source| DecodeError::Record { context: context.into(), source })?;

	Ok(record)
}
